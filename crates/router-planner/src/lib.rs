//! Assignment planning for the warehouse routing system.
//!
//! This module decides which warehouse serves which US state. Automatic
//! planning is delegated to a pluggable `AssignmentStrategy`; the default
//! `proximity` strategy partitions all 50 states by region proximity with
//! priority tie-breaking. The `editor` module holds the manual operations
//! used interactively between planning runs.

use router_types::{
	ConfigSchema, ImplementationRegistry, RoutingConfig, Warehouse, WarehouseAssignment,
	WarehouseRef,
};
use thiserror::Error;

pub mod editor;

/// Re-export implementations
pub mod implementations {
	pub mod strategies {
		pub mod proximity;
	}
}

pub use editor::EditorError;

/// Errors that can occur during strategy creation.
#[derive(Debug, Error)]
pub enum StrategyError {
	/// Error that occurs when strategy configuration is invalid.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	/// Error that occurs when strategy implementation is not available.
	#[error("Implementation not available: {0}")]
	ImplementationNotAvailable(String),
}

/// Trait defining the interface for auto-assignment strategies.
///
/// A strategy receives the candidate warehouses and returns one assignment
/// per candidate. Implementations must be deterministic: identical input
/// yields identical output.
pub trait AssignmentStrategy: Send + Sync {
	/// Returns the configuration schema for this strategy implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Computes the state lists for the given warehouses.
	///
	/// Returns an empty list when `warehouses` is empty.
	fn plan(&self, warehouses: &[WarehouseRef]) -> Vec<WarehouseAssignment>;
}

/// Type alias for strategy factory functions.
pub type StrategyFactory = fn(&toml::Value) -> Result<Box<dyn AssignmentStrategy>, StrategyError>;

/// Registry trait for strategy implementations.
pub trait StrategyRegistry: ImplementationRegistry<Factory = StrategyFactory> {}

/// Get all registered strategy implementations.
///
/// Returns a vector of (name, factory) tuples for all available strategies.
pub fn get_all_strategy_implementations() -> Vec<(&'static str, StrategyFactory)> {
	use implementations::strategies::proximity;

	vec![(proximity::Registry::NAME, proximity::Registry::factory())]
}

/// Partitions all 50 states across `warehouses` using the default
/// proximity strategy.
pub fn plan_auto_assignment(warehouses: &[WarehouseRef]) -> Vec<WarehouseAssignment> {
	implementations::strategies::proximity::ProximityStrategy::default().plan(warehouses)
}

/// Service that applies the configured assignment strategy to routing
/// configurations.
pub struct PlannerService {
	strategy: Box<dyn AssignmentStrategy>,
}

impl PlannerService {
	/// Creates a new PlannerService with the given strategy.
	pub fn new(strategy: Box<dyn AssignmentStrategy>) -> Self {
		Self { strategy }
	}

	/// Runs the strategy over raw planner inputs.
	pub fn plan(&self, warehouses: &[WarehouseRef]) -> Vec<WarehouseAssignment> {
		self.strategy.plan(warehouses)
	}

	/// Re-plans the state lists of every active assignment in `config`.
	///
	/// Home states are read from `directory`. Assignment ids, names,
	/// priorities and flags are preserved; only state lists change. Inactive
	/// assignments lose their states so that every state ends up in exactly
	/// one list. With no active assignments the config is returned unchanged.
	pub fn plan_config(&self, config: &RoutingConfig, directory: &[Warehouse]) -> RoutingConfig {
		let candidates: Vec<WarehouseRef> = config
			.active_assignments()
			.map(|assignment| {
				let warehouse = directory.iter().find(|w| w.id == assignment.warehouse_id);
				if warehouse.is_none() {
					tracing::warn!(
						component = "planner",
						warehouse_id = %assignment.warehouse_id,
						"Warehouse not found in directory"
					);
				}
				WarehouseRef {
					assignment_id: assignment.id.clone(),
					warehouse_id: assignment.warehouse_id.clone(),
					warehouse_name: assignment.warehouse_name.clone(),
					priority: assignment.priority,
					home_state: warehouse.and_then(|w| w.address.state.clone()),
				}
			})
			.collect();

		if candidates.is_empty() {
			tracing::debug!(component = "planner", "No active assignments to plan");
			return config.clone();
		}

		let planned = self.strategy.plan(&candidates);
		let mut next = config.clone();
		for assignment in &mut next.assignments {
			match planned.iter().find(|p| p.id == assignment.id) {
				Some(plan) if assignment.is_active => assignment.regions = plan.regions.clone(),
				_ => assignment.clear_states(),
			}
		}

		tracing::info!(
			component = "planner",
			warehouses = candidates.len(),
			assigned = next.assigned_states().len(),
			"Planned region assignments"
		);
		next
	}
}
