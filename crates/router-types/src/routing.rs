//! Routing configuration types.
//!
//! A `RoutingConfig` is the unit of persistence and the unit the resolver
//! consumes. Field names serialize in camelCase so stored documents stay
//! interchangeable with the dashboard's warehouse configuration blob.

use crate::geography::{all_state_codes, state_by_code, DOMESTIC_COUNTRY, DOMESTIC_COUNTRY_CODE};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// How orders are routed to warehouses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
	/// Every order goes to the primary (or fallback) warehouse.
	#[default]
	Simple,
	/// Orders are routed by per-state warehouse assignments.
	Advanced,
}

impl RoutingMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			RoutingMode::Simple => "simple",
			RoutingMode::Advanced => "advanced",
		}
	}
}

impl fmt::Display for RoutingMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for RoutingMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"simple" => Ok(Self::Simple),
			"advanced" => Ok(Self::Advanced),
			other => Err(format!("Unknown routing mode: {}", other)),
		}
	}
}

/// The list of states an assignment serves within one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStates {
	pub country: String,
	pub country_code: String,
	#[serde(default)]
	pub states: Vec<String>,
}

impl RegionStates {
	/// Creates a domestic (US) region entry with the given states.
	pub fn domestic(states: Vec<String>) -> Self {
		Self {
			country: DOMESTIC_COUNTRY.to_string(),
			country_code: DOMESTIC_COUNTRY_CODE.to_string(),
			states,
		}
	}
}

/// Binds a warehouse to a routing priority and the set of states it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseAssignment {
	/// Unique assignment identifier.
	pub id: String,
	/// Identifier of the assigned warehouse.
	pub warehouse_id: String,
	/// Display name of the assigned warehouse.
	#[serde(default)]
	pub warehouse_name: String,
	/// Routing priority; lower value means higher priority.
	pub priority: u32,
	/// States served, stored as a single-entry list by convention.
	#[serde(default)]
	pub regions: Vec<RegionStates>,
	/// Inactive assignments are ignored by the resolver and the planner.
	#[serde(default = "default_active")]
	pub is_active: bool,
}

fn default_active() -> bool {
	true
}

impl WarehouseAssignment {
	/// Creates an active assignment with an empty domestic state list.
	pub fn new(
		id: impl Into<String>,
		warehouse_id: impl Into<String>,
		warehouse_name: impl Into<String>,
		priority: u32,
	) -> Self {
		Self {
			id: id.into(),
			warehouse_id: warehouse_id.into(),
			warehouse_name: warehouse_name.into(),
			priority,
			regions: vec![RegionStates::domestic(Vec::new())],
			is_active: true,
		}
	}

	/// Iterates over every state code held by this assignment.
	pub fn states(&self) -> impl Iterator<Item = &str> {
		self.regions
			.iter()
			.flat_map(|region| region.states.iter().map(String::as_str))
	}

	/// Returns true if any region entry holds the state code.
	pub fn holds_state(&self, state: &str) -> bool {
		self.states().any(|s| s == state)
	}

	/// Returns true if a region entry for `country_code` lists `state`.
	pub fn serves(&self, country_code: &str, state: &str) -> bool {
		self.regions.iter().any(|region| {
			region.country_code.eq_ignore_ascii_case(country_code)
				&& region.states.iter().any(|s| s == state)
		})
	}

	/// Removes the state from every region entry. Returns true if it was present.
	pub fn remove_state(&mut self, state: &str) -> bool {
		let mut removed = false;
		for region in &mut self.regions {
			let before = region.states.len();
			region.states.retain(|s| s != state);
			removed |= region.states.len() != before;
		}
		removed
	}

	/// Appends the state to the domestic region entry, creating it if needed.
	pub fn push_state(&mut self, state: &str) {
		if self.holds_state(state) {
			return;
		}
		let domestic = self
			.regions
			.iter()
			.position(|region| region.country_code.eq_ignore_ascii_case(DOMESTIC_COUNTRY_CODE));
		match domestic {
			Some(idx) => self.regions[idx].states.push(state.to_string()),
			None => self
				.regions
				.push(RegionStates::domestic(vec![state.to_string()])),
		}
	}

	/// Empties every region entry while keeping the entries themselves.
	pub fn clear_states(&mut self) {
		for region in &mut self.regions {
			region.states.clear();
		}
	}
}

/// Errors reported when a configuration breaks the partition property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
	/// A state is listed by more than one assignment.
	#[error("State {state} is assigned to both '{first}' and '{second}'")]
	OverlappingState {
		state: String,
		first: String,
		second: String,
	},
	/// An assignment lists a code outside the 50-state universe.
	#[error("Assignment '{assignment}' lists unknown state '{state}'")]
	UnknownState { assignment: String, state: String },
}

/// Warehouse routing configuration for one sales channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
	/// Routing mode.
	#[serde(default)]
	pub mode: RoutingMode,
	/// Warehouse used when no assignment matches.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub primary_warehouse_id: Option<String>,
	/// Warehouse used when no primary is configured.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fallback_warehouse_id: Option<String>,
	/// Whether per-state assignments are consulted in advanced mode.
	#[serde(default)]
	pub enable_region_routing: bool,
	/// Per-warehouse assignments.
	#[serde(default)]
	pub assignments: Vec<WarehouseAssignment>,
}

impl RoutingConfig {
	/// Creates an empty configuration in the given mode.
	pub fn new(mode: RoutingMode) -> Self {
		Self {
			mode,
			enable_region_routing: mode == RoutingMode::Advanced,
			..Self::default()
		}
	}

	/// The primary warehouse if set, else the fallback warehouse.
	///
	/// Blank identifiers count as unset.
	pub fn default_warehouse(&self) -> Option<&str> {
		non_blank(self.primary_warehouse_id.as_deref())
			.or_else(|| non_blank(self.fallback_warehouse_id.as_deref()))
	}

	/// Looks up an assignment by its id.
	pub fn assignment(&self, assignment_id: &str) -> Option<&WarehouseAssignment> {
		self.assignments.iter().find(|a| a.id == assignment_id)
	}

	/// Looks up an assignment by the warehouse it assigns.
	pub fn assignment_for_warehouse(&self, warehouse_id: &str) -> Option<&WarehouseAssignment> {
		self.assignments
			.iter()
			.find(|a| a.warehouse_id == warehouse_id)
	}

	/// Returns the assignments flagged active.
	pub fn active_assignments(&self) -> impl Iterator<Item = &WarehouseAssignment> {
		self.assignments.iter().filter(|a| a.is_active)
	}

	/// The union of every state held by any assignment.
	pub fn assigned_states(&self) -> BTreeSet<String> {
		self.assignments
			.iter()
			.flat_map(|a| a.states().map(str::to_string))
			.collect()
	}

	/// States held by no assignment.
	///
	/// Always derived from the current assignments, never stored.
	pub fn unassigned_states(&self) -> BTreeSet<&'static str> {
		let assigned = self.assigned_states();
		all_state_codes()
			.filter(|code| !assigned.contains(*code))
			.collect()
	}

	/// Checks that no state is listed twice and every listed state is known.
	pub fn check_partition(&self) -> Result<(), PartitionError> {
		let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
		for assignment in &self.assignments {
			for state in assignment.states() {
				if state_by_code(state).is_none() {
					return Err(PartitionError::UnknownState {
						assignment: assignment.id.clone(),
						state: state.to_string(),
					});
				}
				if let Some(first) = seen.insert(state, assignment.id.as_str()) {
					return Err(PartitionError::OverlappingState {
						state: state.to_string(),
						first: first.to_string(),
						second: assignment.id.clone(),
					});
				}
			}
		}
		Ok(())
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.trim().is_empty())
}

/// Outcome of routing a single order.
///
/// `Unresolved` is a normal result meaning the order should be held for
/// manual assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
	/// The order should be fulfilled from this warehouse.
	Resolved(String),
	/// No warehouse could be determined.
	Unresolved,
}

impl RoutingDecision {
	/// Returns the resolved warehouse id, if any.
	pub fn warehouse_id(&self) -> Option<&str> {
		match self {
			RoutingDecision::Resolved(id) => Some(id),
			RoutingDecision::Unresolved => None,
		}
	}
}

impl Serialize for RoutingDecision {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(1))?;
		match self {
			RoutingDecision::Resolved(id) => map.serialize_entry("warehouseId", id)?,
			RoutingDecision::Unresolved => map.serialize_entry("unresolved", &true)?,
		}
		map.end()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn assignment(id: &str, warehouse: &str, states: &[&str]) -> WarehouseAssignment {
		let mut a = WarehouseAssignment::new(id, warehouse, warehouse.to_uppercase(), 1);
		for state in states {
			a.push_state(state);
		}
		a
	}

	#[test]
	fn test_unassigned_is_complement_of_assigned() {
		let mut config = RoutingConfig::new(RoutingMode::Advanced);
		assert_eq!(config.unassigned_states().len(), 50);

		config.assignments.push(assignment("a1", "w1", &["CA", "NV"]));
		config.assignments.push(assignment("a2", "w2", &["TX"]));

		let unassigned = config.unassigned_states();
		assert_eq!(unassigned.len(), 47);
		assert!(!unassigned.contains("CA"));
		assert!(!unassigned.contains("TX"));

		// Mutating assignments is reflected without any cached state.
		config.assignments[0].remove_state("CA");
		assert!(config.unassigned_states().contains("CA"));
		assert_eq!(
			config.assigned_states().len() + config.unassigned_states().len(),
			50
		);
	}

	#[test]
	fn test_check_partition_detects_overlap() {
		let mut config = RoutingConfig::new(RoutingMode::Advanced);
		config.assignments.push(assignment("a1", "w1", &["CA"]));
		config.assignments.push(assignment("a2", "w2", &["OR", "CA"]));

		assert_eq!(
			config.check_partition(),
			Err(PartitionError::OverlappingState {
				state: "CA".into(),
				first: "a1".into(),
				second: "a2".into(),
			})
		);
	}

	#[test]
	fn test_check_partition_detects_unknown_state() {
		let mut config = RoutingConfig::new(RoutingMode::Advanced);
		config.assignments.push(assignment("a1", "w1", &["ON"]));

		let err = config.check_partition().unwrap_err();
		assert!(err.to_string().contains("unknown state 'ON'"));
	}

	#[test]
	fn test_push_state_creates_domestic_entry() {
		let mut a = assignment("a1", "w1", &[]);
		a.regions.clear();
		a.push_state("WA");
		a.push_state("WA");

		assert_eq!(a.regions.len(), 1);
		assert_eq!(a.regions[0].country_code, "US");
		assert_eq!(a.regions[0].states, vec!["WA".to_string()]);
		assert!(a.serves("us", "WA"));
		assert!(!a.serves("CA", "WA"));
	}

	#[test]
	fn test_default_warehouse_skips_blank_ids() {
		let mut config = RoutingConfig::default();
		assert_eq!(config.default_warehouse(), None);

		config.fallback_warehouse_id = Some("w2".into());
		config.primary_warehouse_id = Some("  ".into());
		assert_eq!(config.default_warehouse(), Some("w2"));

		config.primary_warehouse_id = Some("w1".into());
		assert_eq!(config.default_warehouse(), Some("w1"));
	}

	#[test]
	fn test_config_json_shape() {
		let json = r#"{
			"mode": "advanced",
			"primaryWarehouseId": "w1",
			"enableRegionRouting": true,
			"assignments": [{
				"id": "a1",
				"warehouseId": "w1",
				"warehouseName": "East",
				"priority": 1,
				"regions": [{"country": "United States", "countryCode": "US", "states": ["NY"]}]
			}]
		}"#;

		let config: RoutingConfig = serde_json::from_str(json).unwrap();
		assert_eq!(config.mode, RoutingMode::Advanced);
		assert!(config.assignments[0].is_active);
		assert_eq!(config.fallback_warehouse_id, None);

		let value = serde_json::to_value(&config).unwrap();
		assert_eq!(value["assignments"][0]["isActive"], true);
		assert_eq!(value["assignments"][0]["regions"][0]["countryCode"], "US");
		assert!(value.get("fallbackWarehouseId").is_none());
	}

	#[test]
	fn test_decision_serialization() {
		let resolved = serde_json::to_value(RoutingDecision::Resolved("w1".into())).unwrap();
		assert_eq!(resolved, serde_json::json!({ "warehouseId": "w1" }));

		let unresolved = serde_json::to_value(RoutingDecision::Unresolved).unwrap();
		assert_eq!(unresolved, serde_json::json!({ "unresolved": true }));
	}
}
