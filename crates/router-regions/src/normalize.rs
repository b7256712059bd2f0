//! State input normalization.

use router_types::{state_by_code, state_by_name, Region};

/// Maps free-form state input to a canonical two-letter code.
///
/// Accepts a code or a full English state name in any case. Input that
/// matches neither is returned uppercased and otherwise unchanged, so callers
/// see it as a code that simply fails to match any assignment. Surrounding
/// whitespace is ignored; blank input yields an empty string.
pub fn normalize_state_code(input: &str) -> String {
	let trimmed = input.trim();
	let upper = trimmed.to_ascii_uppercase();

	if let Some(state) = state_by_code(&upper) {
		return state.code.to_string();
	}
	if let Some(state) = state_by_name(trimmed) {
		return state.code.to_string();
	}

	trimmed.to_uppercase()
}

/// Resolves the region of a raw state value, if it names a known state.
pub fn home_region(state: Option<&str>) -> Option<Region> {
	let code = normalize_state_code(state?);
	state_by_code(&code).map(|s| s.region)
}
