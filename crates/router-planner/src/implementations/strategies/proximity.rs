//! Proximity-based auto-assignment strategy.
//!
//! Every state goes to the warehouse whose home region is closest by the
//! three-tier proximity score. Ties at the best score go to the lowest
//! priority value, then to the lowest warehouse id, then to input order, so
//! the result never depends on iteration order.

use router_regions::{home_region, proximity_score};
use router_types::{
	ConfigSchema, Field, FieldType, Region, RegionStates, Schema, ValidationError,
	WarehouseAssignment, WarehouseRef, DOMESTIC_COUNTRY, DOMESTIC_COUNTRY_CODE, US_STATES,
};

use crate::{AssignmentStrategy, StrategyError, StrategyFactory};

/// Region assumed for warehouses whose address state cannot be resolved.
///
/// This mirrors the dashboard's historical behaviour. It is a placeholder,
/// not a geographic choice.
pub const DEFAULT_HOME_REGION: Region = Region::Mountain;

/// Strategy that assigns each state to the nearest warehouse by region.
pub struct ProximityStrategy {
	/// Region used when a warehouse's home state is missing or unknown.
	default_home_region: Region,
	/// Country name written into planned region entries.
	country: String,
	/// Country code written into planned region entries.
	country_code: String,
}

impl ProximityStrategy {
	pub fn new(default_home_region: Region, country: String, country_code: String) -> Self {
		Self {
			default_home_region,
			country,
			country_code,
		}
	}

	/// Resolves a warehouse's home region, falling back to the default.
	fn home_region_for(&self, warehouse: &WarehouseRef) -> Region {
		match home_region(warehouse.home_state.as_deref()) {
			Some(region) => region,
			None => {
				tracing::warn!(
					component = "planner",
					warehouse_id = %warehouse.warehouse_id,
					home_state = ?warehouse.home_state,
					fallback = %self.default_home_region,
					"Warehouse has no resolvable home region, using fallback"
				);
				self.default_home_region
			},
		}
	}
}

impl Default for ProximityStrategy {
	fn default() -> Self {
		Self::new(
			DEFAULT_HOME_REGION,
			DOMESTIC_COUNTRY.to_string(),
			DOMESTIC_COUNTRY_CODE.to_string(),
		)
	}
}

/// Configuration schema for ProximityStrategy.
pub struct ProximityStrategySchema;

impl ConfigSchema for ProximityStrategySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			// Required fields
			vec![],
			// Optional fields
			vec![
				Field::new("default_home_region", FieldType::String).with_validator(|value| {
					let name = value.as_str().unwrap_or_default();
					name.parse::<Region>()
						.map(|_| ())
						.map_err(|e| e.to_string())
				}),
				Field::new("country", FieldType::String),
				Field::new("country_code", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(code) if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
							Ok(())
						},
						_ => Err("country_code must be a two-letter code".into()),
					}
				}),
			],
		);

		schema.validate(config)
	}
}

impl AssignmentStrategy for ProximityStrategy {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(ProximityStrategySchema)
	}

	fn plan(&self, warehouses: &[WarehouseRef]) -> Vec<WarehouseAssignment> {
		if warehouses.is_empty() {
			return Vec::new();
		}

		let homes: Vec<Region> = warehouses
			.iter()
			.map(|w| self.home_region_for(w))
			.collect();
		let mut planned: Vec<Vec<String>> = vec![Vec::new(); warehouses.len()];

		for state in US_STATES.iter() {
			let winner = (0..warehouses.len()).min_by_key(|&idx| {
				let candidate = &warehouses[idx];
				(
					proximity_score(state.code, homes[idx]),
					candidate.priority,
					candidate.warehouse_id.as_str(),
					idx,
				)
			});
			if let Some(idx) = winner {
				planned[idx].push(state.code.to_string());
			}
		}

		warehouses
			.iter()
			.zip(planned)
			.map(|(warehouse, mut states)| {
				states.sort_unstable();
				tracing::debug!(
					component = "planner",
					warehouse_id = %warehouse.warehouse_id,
					states = states.len(),
					"Assigned states"
				);
				WarehouseAssignment {
					id: warehouse.assignment_id.clone(),
					warehouse_id: warehouse.warehouse_id.clone(),
					warehouse_name: warehouse.warehouse_name.clone(),
					priority: warehouse.priority,
					regions: vec![RegionStates {
						country: self.country.clone(),
						country_code: self.country_code.clone(),
						states,
					}],
					is_active: true,
				}
			})
			.collect()
	}
}

/// Factory function to create the proximity strategy from configuration.
///
/// Configuration parameters:
/// - `default_home_region`: region for warehouses without a usable state (default: "Mountain")
/// - `country`: country name for planned entries (default: "United States")
/// - `country_code`: country code for planned entries (default: "US")
pub fn create_strategy(
	config: &toml::Value,
) -> Result<Box<dyn AssignmentStrategy>, StrategyError> {
	ProximityStrategySchema
		.validate(config)
		.map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;

	let default_home_region = match config.get("default_home_region").and_then(|v| v.as_str()) {
		Some(name) => name
			.parse::<Region>()
			.map_err(|e| StrategyError::InvalidConfig(e.to_string()))?,
		None => DEFAULT_HOME_REGION,
	};
	let country = config
		.get("country")
		.and_then(|v| v.as_str())
		.unwrap_or(DOMESTIC_COUNTRY)
		.to_string();
	let country_code = config
		.get("country_code")
		.and_then(|v| v.as_str())
		.unwrap_or(DOMESTIC_COUNTRY_CODE)
		.to_ascii_uppercase();

	Ok(Box::new(ProximityStrategy::new(
		default_home_region,
		country,
		country_code,
	)))
}

/// Registry for the proximity strategy implementation.
pub struct Registry;

impl router_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "proximity";
	type Factory = StrategyFactory;

	fn factory() -> Self::Factory {
		create_strategy
	}
}

impl crate::StrategyRegistry for Registry {}
