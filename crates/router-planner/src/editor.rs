//! Manual assignment editing.
//!
//! Interactive operations applied to an in-memory draft of a routing
//! configuration. Each operation takes the current config and returns a new
//! one, leaving the input untouched. Every operation preserves the partition
//! property: a state is held by at most one assignment.

use router_regions::normalize_state_code;
use router_types::{state_by_code, truncate_id, RoutingConfig, RoutingMode, WarehouseAssignment};
use thiserror::Error;

/// Errors that can occur while editing a routing configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
	/// The state is not one of the 50 US states.
	#[error("Unknown state: {0}")]
	UnknownState(String),
	/// No assignment exists for the target warehouse.
	#[error("Warehouse '{0}' is not part of this routing configuration")]
	UnknownWarehouse(String),
	/// No assignment exists with the given id.
	#[error("Assignment not found: {0}")]
	UnknownAssignment(String),
	/// The warehouse already has an assignment.
	#[error("Warehouse '{0}' is already part of this routing configuration")]
	DuplicateWarehouse(String),
	/// Priorities start at 1.
	#[error("Priority must be at least 1")]
	InvalidPriority,
}

/// Moves a state to `target_warehouse_id`, or leaves it unassigned when the
/// target is `None`.
///
/// The state is first removed from every assignment and then appended to the
/// target's list, so it can never end up in two lists.
pub fn apply_move(
	config: &RoutingConfig,
	state: &str,
	target_warehouse_id: Option<&str>,
) -> Result<RoutingConfig, EditorError> {
	let code = normalize_state_code(state);
	if state_by_code(&code).is_none() {
		return Err(EditorError::UnknownState(state.to_string()));
	}

	let target = match target_warehouse_id {
		Some(warehouse_id) => Some(
			config
				.assignments
				.iter()
				.position(|a| a.warehouse_id == warehouse_id)
				.ok_or_else(|| EditorError::UnknownWarehouse(warehouse_id.to_string()))?,
		),
		None => None,
	};

	let mut next = config.clone();
	for assignment in &mut next.assignments {
		assignment.remove_state(&code);
	}
	if let Some(idx) = target {
		next.assignments[idx].push_state(&code);
	}

	tracing::debug!(
		component = "editor",
		state = %code,
		destination = target_warehouse_id.unwrap_or("unassigned"),
		"Moved state"
	);
	Ok(next)
}

/// Adds a warehouse to routing with an empty state list.
///
/// The new assignment gets `priority = assignment count + 1`. The first
/// warehouse added also becomes the primary warehouse.
pub fn add_warehouse(
	config: &RoutingConfig,
	warehouse_id: &str,
	warehouse_name: &str,
) -> Result<RoutingConfig, EditorError> {
	if config.assignment_for_warehouse(warehouse_id).is_some() {
		return Err(EditorError::DuplicateWarehouse(warehouse_id.to_string()));
	}

	let mut next = config.clone();
	let priority = next.assignments.len() as u32 + 1;
	let assignment = WarehouseAssignment::new(
		uuid::Uuid::new_v4().to_string(),
		warehouse_id,
		warehouse_name,
		priority,
	);

	tracing::info!(
		component = "editor",
		assignment_id = %truncate_id(&assignment.id),
		warehouse_id = %warehouse_id,
		priority,
		"Added warehouse to routing"
	);

	if next.assignments.is_empty() {
		next.primary_warehouse_id = Some(warehouse_id.to_string());
	}
	next.assignments.push(assignment);
	Ok(next)
}

/// Removes an assignment. Its states become unassigned; nothing is
/// redistributed until the planner runs again.
pub fn remove_warehouse(
	config: &RoutingConfig,
	assignment_id: &str,
) -> Result<RoutingConfig, EditorError> {
	let mut next = config.clone();
	let idx = next
		.assignments
		.iter()
		.position(|a| a.id == assignment_id)
		.ok_or_else(|| EditorError::UnknownAssignment(assignment_id.to_string()))?;
	let removed = next.assignments.remove(idx);

	tracing::info!(
		component = "editor",
		assignment_id = %truncate_id(assignment_id),
		warehouse_id = %removed.warehouse_id,
		released = removed.states().count(),
		"Removed warehouse from routing"
	);
	Ok(next)
}

/// Changes the priority of an assignment.
pub fn set_priority(
	config: &RoutingConfig,
	assignment_id: &str,
	priority: u32,
) -> Result<RoutingConfig, EditorError> {
	if priority == 0 {
		return Err(EditorError::InvalidPriority);
	}
	edit_assignment(config, assignment_id, |a| a.priority = priority)
}

/// Activates or deactivates an assignment without touching its states.
pub fn set_active(
	config: &RoutingConfig,
	assignment_id: &str,
	active: bool,
) -> Result<RoutingConfig, EditorError> {
	edit_assignment(config, assignment_id, |a| a.is_active = active)
}

/// Switches between simple and advanced routing.
pub fn set_mode(config: &RoutingConfig, mode: RoutingMode) -> RoutingConfig {
	RoutingConfig {
		mode,
		..config.clone()
	}
}

/// Enables or disables region routing in advanced mode.
pub fn set_region_routing(config: &RoutingConfig, enabled: bool) -> RoutingConfig {
	RoutingConfig {
		enable_region_routing: enabled,
		..config.clone()
	}
}

fn edit_assignment(
	config: &RoutingConfig,
	assignment_id: &str,
	edit: impl FnOnce(&mut WarehouseAssignment),
) -> Result<RoutingConfig, EditorError> {
	let mut next = config.clone();
	let assignment = next
		.assignments
		.iter_mut()
		.find(|a| a.id == assignment_id)
		.ok_or_else(|| EditorError::UnknownAssignment(assignment_id.to_string()))?;
	edit(assignment);
	Ok(next)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn draft() -> RoutingConfig {
		let config = RoutingConfig::new(RoutingMode::Advanced);
		let config = add_warehouse(&config, "wa", "Warehouse A").unwrap();
		let config = add_warehouse(&config, "wb", "Warehouse B").unwrap();
		let mut config = config;
		config.assignments[0].push_state("TX");
		config.assignments[0].push_state("OK");
		config.assignments[1].push_state("CA");
		config
	}

	fn holders(config: &RoutingConfig, state: &str) -> Vec<String> {
		config
			.assignments
			.iter()
			.filter(|a| a.holds_state(state))
			.map(|a| a.warehouse_id.clone())
			.collect()
	}

	#[test]
	fn test_move_preserves_partition() {
		let config = draft();
		let moved = apply_move(&config, "TX", Some("wb")).unwrap();

		assert_eq!(holders(&moved, "TX"), vec!["wb".to_string()]);
		assert!(moved.check_partition().is_ok());
		// The input draft is left untouched.
		assert_eq!(holders(&config, "TX"), vec!["wa".to_string()]);
	}

	#[test]
	fn test_move_normalizes_state_input() {
		let moved = apply_move(&draft(), "california", Some("wa")).unwrap();
		assert_eq!(holders(&moved, "CA"), vec!["wa".to_string()]);
	}

	#[test]
	fn test_move_to_unassigned() {
		let config = draft();
		let moved = apply_move(&config, "TX", None).unwrap();

		assert!(holders(&moved, "TX").is_empty());
		assert!(moved.unassigned_states().contains("TX"));
		assert_eq!(moved.unassigned_states().len(), config.unassigned_states().len() + 1);
	}

	#[test]
	fn test_move_unassigned_state_into_warehouse() {
		let moved = apply_move(&draft(), "ME", Some("wb")).unwrap();
		assert_eq!(holders(&moved, "ME"), vec!["wb".to_string()]);
		assert!(!moved.unassigned_states().contains("ME"));
	}

	#[test]
	fn test_move_rejects_unknown_inputs() {
		let config = draft();
		assert_eq!(
			apply_move(&config, "Ontario", Some("wa")),
			Err(EditorError::UnknownState("Ontario".into()))
		);
		assert_eq!(
			apply_move(&config, "TX", Some("nope")),
			Err(EditorError::UnknownWarehouse("nope".into()))
		);
	}

	#[test]
	fn test_add_warehouse_priorities_and_primary() {
		let config = draft();
		assert_eq!(config.primary_warehouse_id.as_deref(), Some("wa"));
		assert_eq!(config.assignments[0].priority, 1);
		assert_eq!(config.assignments[1].priority, 2);
		assert!(config.assignments.iter().all(|a| a.is_active));

		let config = add_warehouse(&config, "wc", "Warehouse C").unwrap();
		assert_eq!(config.assignments[2].priority, 3);
		assert_eq!(config.assignments[2].states().count(), 0);
		assert_eq!(config.primary_warehouse_id.as_deref(), Some("wa"));
		assert_ne!(config.assignments[1].id, config.assignments[2].id);

		assert_eq!(
			add_warehouse(&config, "wa", "Again").unwrap_err(),
			EditorError::DuplicateWarehouse("wa".into())
		);
	}

	#[test]
	fn test_remove_warehouse_releases_states() {
		let config = draft();
		let assignment_id = config.assignments[0].id.clone();
		let removed = remove_warehouse(&config, &assignment_id).unwrap();

		assert_eq!(removed.assignments.len(), 1);
		let unassigned = removed.unassigned_states();
		assert!(unassigned.contains("TX"));
		assert!(unassigned.contains("OK"));
		assert!(!unassigned.contains("CA"));

		assert_eq!(
			remove_warehouse(&removed, &assignment_id).unwrap_err(),
			EditorError::UnknownAssignment(assignment_id)
		);
	}

	#[test]
	fn test_priority_and_active_edits() {
		let config = draft();
		let id = config.assignments[1].id.clone();

		let config = set_priority(&config, &id, 5).unwrap();
		assert_eq!(config.assignments[1].priority, 5);
		assert_eq!(set_priority(&config, &id, 0), Err(EditorError::InvalidPriority));

		let config = set_active(&config, &id, false).unwrap();
		assert!(!config.assignments[1].is_active);
		assert!(config.assignments[1].holds_state("CA"));
	}

	#[test]
	fn test_mode_switches() {
		let config = set_mode(&draft(), RoutingMode::Simple);
		assert_eq!(config.mode, RoutingMode::Simple);
		assert_eq!(config.assignments.len(), 2);

		let config = set_region_routing(&config, false);
		assert!(!config.enable_region_routing);
	}
}
