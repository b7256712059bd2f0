//! Runtime warehouse resolution for the routing system.
//!
//! `resolve_warehouse` is called once per incoming order with the order's
//! shipping state and country and the current routing configuration
//! snapshot. It is a pure function: no I/O, no shared state, and the config
//! is only read, so any number of orders can be resolved concurrently
//! against the same snapshot.

use router_regions::normalize_state_code;
use router_types::{RoutingConfig, RoutingDecision, RoutingMode, WarehouseAssignment};

/// Why a decision was reached. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionPath {
	/// No routing configuration exists.
	MissingConfig,
	/// Simple mode, region routing disabled, or no assignments.
	RegionRoutingBypassed,
	/// The shipping state was blank.
	BlankState,
	/// An active assignment serves the state.
	AssignmentMatch,
	/// No active assignment serves the state.
	NoAssignmentMatch,
}

impl DecisionPath {
	pub fn as_str(&self) -> &'static str {
		match self {
			DecisionPath::MissingConfig => "missing_config",
			DecisionPath::RegionRoutingBypassed => "region_routing_bypassed",
			DecisionPath::BlankState => "blank_state",
			DecisionPath::AssignmentMatch => "assignment_match",
			DecisionPath::NoAssignmentMatch => "no_assignment_match",
		}
	}
}

/// Resolves the warehouse that should fulfil an order.
///
/// Rules, first match wins:
/// 1. No config: unresolved.
/// 2. Simple mode, region routing disabled, or no assignments: the primary
///    warehouse, else the fallback warehouse, else unresolved.
/// 3. A blank shipping state falls back as in rule 2.
/// 4. The lowest-priority-value active assignment whose region entry for the
///    shipping country lists the normalized state.
/// 5. Otherwise the fallback chain of rule 2.
pub fn resolve_warehouse(
	shipping_state: &str,
	shipping_country_code: &str,
	config: Option<&RoutingConfig>,
) -> RoutingDecision {
	let (decision, path) = decide(shipping_state, shipping_country_code, config);
	tracing::debug!(
		component = "resolver",
		shipping_state,
		shipping_country_code,
		path = path.as_str(),
		warehouse_id = decision.warehouse_id().unwrap_or("-"),
		"Resolved warehouse"
	);
	decision
}

/// Same as [`resolve_warehouse`], also returning the rule that decided.
pub fn decide(
	shipping_state: &str,
	shipping_country_code: &str,
	config: Option<&RoutingConfig>,
) -> (RoutingDecision, DecisionPath) {
	let Some(config) = config else {
		return (RoutingDecision::Unresolved, DecisionPath::MissingConfig);
	};

	if config.mode == RoutingMode::Simple
		|| !config.enable_region_routing
		|| config.assignments.is_empty()
	{
		return (fallback(config), DecisionPath::RegionRoutingBypassed);
	}

	let state = normalize_state_code(shipping_state);
	if state.is_empty() {
		return (fallback(config), DecisionPath::BlankState);
	}

	let country_code = shipping_country_code.trim();
	let mut matches: Vec<&WarehouseAssignment> = config
		.assignments
		.iter()
		.filter(|a| a.is_active && a.serves(country_code, &state))
		.collect();
	matches.sort_by_key(|a| a.priority);

	match matches.first() {
		Some(assignment) => (
			RoutingDecision::Resolved(assignment.warehouse_id.clone()),
			DecisionPath::AssignmentMatch,
		),
		None => (fallback(config), DecisionPath::NoAssignmentMatch),
	}
}

fn fallback(config: &RoutingConfig) -> RoutingDecision {
	match config.default_warehouse() {
		Some(id) => RoutingDecision::Resolved(id.to_string()),
		None => RoutingDecision::Unresolved,
	}
}
