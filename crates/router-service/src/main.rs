//! Command-line entry point for the warehouse routing engine.
//!
//! Loads the service configuration, wires the configured storage backend and
//! assignment strategy into a routing engine, runs one command against a
//! routing scope and prints the result as JSON.

use clap::Parser;
use router_config::Config;
use router_core::{RoutingBuilder, RoutingEngine, RoutingFactories};
use std::path::PathBuf;

mod commands;

use commands::Command;
use router_planner::implementations::strategies::proximity::create_strategy as create_proximity_strategy;
use router_storage::implementations::file::create_storage as create_file_storage;
use router_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the routing service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "ROUTER_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// Logs go to stderr; stdout carries the JSON result.
	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.engine.id);

	let engine = build_engine(config)?;
	let output = commands::run(&engine, args.command).await?;
	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Builds the routing engine with every available implementation registered.
fn build_engine(config: Config) -> Result<RoutingEngine, Box<dyn std::error::Error>> {
	let builder = RoutingBuilder::new(config);

	let storage_factories = create_factory_map!(
		router_storage::StorageInterface,
		router_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	let strategy_factories = create_factory_map!(
		router_planner::AssignmentStrategy,
		router_planner::StrategyError,
		"proximity" => create_proximity_strategy,
	);

	let factories = RoutingFactories {
		storage_factories,
		strategy_factories,
	};

	Ok(builder.build(factories)?)
}
