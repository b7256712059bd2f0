//! Builder pattern for constructing routing engines.
//!
//! Composes a RoutingEngine from pluggable storage and assignment strategy
//! implementations using factory functions keyed by implementation name.

use crate::RoutingEngine;
use router_config::Config;
use router_planner::{AssignmentStrategy, PlannerService, StrategyError};
use router_storage::{StorageError, StorageInterface, StorageService};
use router_types::ConfigSchema;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions for each pluggable component, keyed by implementation
/// name.
pub struct RoutingFactories<SF, PF> {
	pub storage_factories: HashMap<String, SF>,
	pub strategy_factories: HashMap<String, PF>,
}

/// Builder for constructing a RoutingEngine with pluggable implementations.
pub struct RoutingBuilder {
	config: Config,
}

impl RoutingBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine, instantiating the primary implementation of each
	/// component.
	pub fn build<SF, PF>(self, factories: RoutingFactories<SF, PF>) -> Result<RoutingEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		PF: Fn(&toml::Value) -> Result<Box<dyn AssignmentStrategy>, StrategyError>,
	{
		let storage_backend = load_primary(
			"storage",
			&self.config.storage.primary,
			&self.config.storage.implementations,
			&factories.storage_factories,
		)?;
		let strategy = load_primary(
			"planner",
			&self.config.planner.primary,
			&self.config.planner.implementations,
			&factories.strategy_factories,
		)?;

		tracing::info!(
			component = "engine",
			engine_id = %self.config.engine.id,
			warehouses = self.config.warehouses.len(),
			"Routing engine ready"
		);

		Ok(RoutingEngine::new(
			self.config,
			Arc::new(StorageService::new(storage_backend)),
			Arc::new(PlannerService::new(strategy)),
		))
	}
}

/// Components that describe the configuration they accept.
trait Configurable {
	fn schema(&self) -> Box<dyn ConfigSchema>;
}

impl Configurable for dyn StorageInterface {
	fn schema(&self) -> Box<dyn ConfigSchema> {
		self.config_schema()
	}
}

impl Configurable for dyn AssignmentStrategy {
	fn schema(&self) -> Box<dyn ConfigSchema> {
		self.config_schema()
	}
}

fn load_primary<T, E, F>(
	component: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
	factories: &HashMap<String, F>,
) -> Result<Box<T>, BuilderError>
where
	T: ?Sized + Configurable,
	E: Display,
	F: Fn(&toml::Value) -> Result<Box<T>, E>,
{
	let config = implementations.get(primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"Primary {} '{}' has no configuration",
			component, primary
		))
	})?;
	let factory = factories
		.get(primary)
		.ok_or_else(|| BuilderError::MissingComponent(format!("{} '{}'", component, primary)))?;

	match factory(config) {
		Ok(implementation) => {
			implementation.schema().validate(config).map_err(|e| {
				tracing::error!(
					component,
					implementation = %primary,
					error = %e,
					"Invalid implementation configuration"
				);
				BuilderError::Config(format!(
					"Invalid configuration for {} implementation '{}': {}",
					component, primary, e
				))
			})?;
			tracing::info!(component, implementation = %primary, "Loaded");
			Ok(implementation)
		},
		Err(e) => {
			tracing::error!(
				component,
				implementation = %primary,
				error = %e,
				"Failed to create implementation"
			);
			Err(BuilderError::Config(format!(
				"Failed to create {} implementation '{}': {}",
				component, primary, e
			)))
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use router_planner::implementations::strategies::proximity::ProximityStrategy;
	use router_planner::{get_all_strategy_implementations, StrategyFactory};
	use router_storage::{get_all_implementations, StorageFactory};
	use router_types::RoutingMode;

	fn config(planner_table: &str) -> Config {
		format!(
			r#"
[engine]
id = "builder-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[planner]
primary = "proximity"
[planner.implementations.proximity]
{}
"#,
			planner_table
		)
		.parse()
		.unwrap()
	}

	fn factories() -> RoutingFactories<StorageFactory, StrategyFactory> {
		RoutingFactories {
			storage_factories: get_all_implementations()
				.into_iter()
				.map(|(name, f)| (name.to_string(), f))
				.collect(),
			strategy_factories: get_all_strategy_implementations()
				.into_iter()
				.map(|(name, f)| (name.to_string(), f))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_build_engine() {
		let engine = RoutingBuilder::new(config("")).build(factories()).unwrap();
		assert_eq!(engine.config().engine.id, "builder-test");

		let doc = engine.init("shop", RoutingMode::Advanced).await.unwrap();
		assert_eq!(doc.version, 1);
	}

	fn unchecked_strategy(
		_config: &toml::Value,
	) -> Result<Box<dyn AssignmentStrategy>, StrategyError> {
		Ok(Box::new(ProximityStrategy::default()))
	}

	#[test]
	fn test_schema_checked_after_construction() {
		let mut factories = factories();
		factories
			.strategy_factories
			.insert("proximity".to_string(), unchecked_strategy);

		let result = RoutingBuilder::new(config("country_code = \"USA\"")).build(factories);
		match result {
			Err(BuilderError::Config(message)) => {
				assert!(message.contains("Invalid configuration for planner"))
			},
			_ => panic!("expected configuration error"),
		}
	}

	#[test]
	fn test_missing_factory() {
		let mut factories = factories();
		factories.strategy_factories.clear();
		let result = RoutingBuilder::new(config("")).build(factories);
		assert!(matches!(result, Err(BuilderError::MissingComponent(_))));
	}

	#[test]
	fn test_invalid_implementation_config() {
		let result = RoutingBuilder::new(config("default_home_region = \"Atlantis\""))
			.build(factories());
		match result {
			Err(BuilderError::Config(message)) => assert!(message.contains("proximity")),
			_ => panic!("expected configuration error"),
		}
	}
}
