//! Proximity scoring between a state and a warehouse's home region.
//!
//! The score is a three-tier lookup over the hand-authored adjacency
//! table, not a distance.

use router_types::{region_of, Region};

/// Coarse distance tier between a state and a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Proximity {
	/// The state lies in the warehouse's home region.
	SameRegion = 0,
	/// The state's region is adjacent to the home region.
	AdjacentRegion = 1,
	/// Anything else, including unknown state codes.
	Far = 2,
}

impl Proximity {
	/// Numeric score; lower is closer.
	pub fn score(self) -> u8 {
		self as u8
	}
}

/// Classifies a canonical state code against a warehouse home region.
pub fn proximity(state_code: &str, home: Region) -> Proximity {
	match region_of(state_code) {
		Some(region) if region == home => Proximity::SameRegion,
		Some(region) if home.is_adjacent_to(region) => Proximity::AdjacentRegion,
		_ => Proximity::Far,
	}
}

/// Returns 0 (same region), 1 (adjacent region) or 2 (far).
pub fn proximity_score(state_code: &str, home: Region) -> u8 {
	proximity(state_code, home).score()
}
