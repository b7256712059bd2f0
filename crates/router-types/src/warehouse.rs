//! Warehouse types consumed by the routing engine.
//!
//! Warehouses are owned by the warehouse-management side of the system. The
//! router only ever reads them, and only cares about the address state, which
//! determines the warehouse's home region.

use serde::{Deserialize, Serialize};

/// A warehouse as provided by the warehouse directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
	/// Unique warehouse identifier.
	pub id: String,
	/// Human-readable warehouse name.
	pub name: String,
	/// Physical address of the warehouse.
	#[serde(default)]
	pub address: WarehouseAddress,
}

/// Address of a warehouse. Only `state` is significant for routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseAddress {
	/// State as entered in the directory (code or full name, any case).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub postal_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub country_code: Option<String>,
}

/// Planner input describing one candidate warehouse.
///
/// Carries the identity of the assignment being planned together with the
/// raw home state taken from the warehouse directory. The planner resolves
/// the home region itself so that fallbacks are applied in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseRef {
	/// Identifier of the assignment the planned states are written to.
	pub assignment_id: String,
	/// Identifier of the warehouse.
	pub warehouse_id: String,
	/// Display name of the warehouse.
	pub warehouse_name: String,
	/// Routing priority; lower values win ties.
	pub priority: u32,
	/// Raw state from the warehouse address, if known.
	pub home_state: Option<String>,
}

impl WarehouseRef {
	/// Creates a planner input for a warehouse with the given home state.
	///
	/// The assignment id defaults to the warehouse id.
	pub fn new(
		warehouse_id: impl Into<String>,
		warehouse_name: impl Into<String>,
		priority: u32,
		home_state: Option<&str>,
	) -> Self {
		let warehouse_id = warehouse_id.into();
		Self {
			assignment_id: warehouse_id.clone(),
			warehouse_id,
			warehouse_name: warehouse_name.into(),
			priority,
			home_state: home_state.map(str::to_string),
		}
	}

	/// Overrides the assignment id the planned states are written to.
	pub fn with_assignment_id(mut self, assignment_id: impl Into<String>) -> Self {
		self.assignment_id = assignment_id.into();
		self
	}
}
