//! Configuration module for the warehouse routing service.
//!
//! The service reads a TOML file describing the engine instance, the storage
//! backend used as the routing config store, the assignment strategy, and
//! the warehouse directory the planner reads home states from.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["warehouses.toml"]` to pull in other config files
//! - Each top-level section must be unique across all files
//! - `${VAR}` and `${VAR:-default}` are replaced from the environment

mod loader;

pub use loader::ConfigLoader;

use regex::Regex;
use router_types::Warehouse;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the routing service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity and defaults for this engine instance.
	pub engine: EngineConfig,
	/// Backend used to persist routing configuration documents.
	pub storage: StorageConfig,
	/// Assignment strategy used by the planner.
	pub planner: PlannerConfig,
	/// Warehouse directory. Read-only; used to derive home regions.
	#[serde(default)]
	pub warehouses: Vec<Warehouse>,
}

/// Configuration specific to the engine instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
	/// Unique identifier for this engine instance.
	pub id: String,
	/// Country code assumed when a resolve request carries none.
	#[serde(default = "default_country_code")]
	pub default_country_code: String,
}

fn default_country_code() -> String {
	router_types::DOMESTIC_COUNTRY_CODE.to_string()
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the assignment planner.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlannerConfig {
	/// Which strategy implementation to use.
	pub primary: String,
	/// Map of strategy implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

fn env_var_pattern() -> Result<&'static Regex, ConfigError> {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	if let Some(re) = PATTERN.get() {
		return Ok(re);
	}
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;
	Ok(PATTERN.get_or_init(|| re))
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of VAR_NAME, or with the default in
/// `${VAR_NAME:-default}` when the variable is unset. Input is limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = env_var_pattern()?;
	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(name.as_str()), cap.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					name.as_str()
				)))
			},
		};
		result.push_str(&input[last..whole.start()]);
		result.push_str(&value);
		last = whole.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or_else(|| Path::new("."));
		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		ConfigLoader::new(base_dir).load_config(file_name).await
	}

	/// Looks up a warehouse in the directory by id.
	pub fn warehouse(&self, warehouse_id: &str) -> Option<&Warehouse> {
		self.warehouses.iter().find(|w| w.id == warehouse_id)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.engine.id.trim().is_empty() {
			return Err(ConfigError::Validation("Engine ID cannot be empty".into()));
		}
		let code = &self.engine.default_country_code;
		if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
			return Err(ConfigError::Validation(format!(
				"default_country_code must be a two-letter code, got '{}'",
				code
			)));
		}

		validate_selection("storage", &self.storage.primary, &self.storage.implementations)?;
		validate_selection("planner", &self.planner.primary, &self.planner.implementations)?;

		let mut seen = HashSet::new();
		for warehouse in &self.warehouses {
			if warehouse.id.trim().is_empty() {
				return Err(ConfigError::Validation(
					"Warehouse id cannot be empty".into(),
				));
			}
			if !seen.insert(warehouse.id.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate warehouse id '{}'",
					warehouse.id
				)));
			}
		}

		Ok(())
	}
}

fn validate_selection(
	section: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
) -> Result<(), ConfigError> {
	if implementations.is_empty() {
		return Err(ConfigError::Validation(format!(
			"At least one {} implementation must be configured",
			section
		)));
	}
	if primary.is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} primary implementation cannot be empty",
			section
		)));
	}
	if !implementations.contains_key(primary) {
		return Err(ConfigError::Validation(format!(
			"Primary {} '{}' not found in implementations",
			section, primary
		)));
	}
	Ok(())
}

/// Parses a configuration from TOML text.
///
/// Environment variables are resolved first and the result is validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
