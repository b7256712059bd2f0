//! US geographic reference data for warehouse routing.
//!
//! The routing model is US-only: 50 states partitioned into nine named
//! regions, plus a hand-authored adjacency relation between regions. The
//! adjacency table is literal data and must not be derived from coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Country name written into generated region entries.
pub const DOMESTIC_COUNTRY: &str = "United States";

/// ISO country code written into generated region entries.
pub const DOMESTIC_COUNTRY_CODE: &str = "US";

/// One of the nine fixed groupings of US states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
	#[serde(rename = "New England")]
	NewEngland,
	#[serde(rename = "Mid-Atlantic")]
	MidAtlantic,
	#[serde(rename = "Southeast")]
	Southeast,
	#[serde(rename = "Great Lakes")]
	GreatLakes,
	#[serde(rename = "Plains")]
	Plains,
	#[serde(rename = "South Central")]
	SouthCentral,
	#[serde(rename = "Mountain")]
	Mountain,
	#[serde(rename = "Pacific Northwest")]
	PacificNorthwest,
	#[serde(rename = "Pacific")]
	Pacific,
}

impl Region {
	/// Returns the display name of the region.
	pub fn as_str(&self) -> &'static str {
		match self {
			Region::NewEngland => "New England",
			Region::MidAtlantic => "Mid-Atlantic",
			Region::Southeast => "Southeast",
			Region::GreatLakes => "Great Lakes",
			Region::Plains => "Plains",
			Region::SouthCentral => "South Central",
			Region::Mountain => "Mountain",
			Region::PacificNorthwest => "Pacific Northwest",
			Region::Pacific => "Pacific",
		}
	}

	/// Returns an iterator over all regions.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::NewEngland,
			Self::MidAtlantic,
			Self::Southeast,
			Self::GreatLakes,
			Self::Plains,
			Self::SouthCentral,
			Self::Mountain,
			Self::PacificNorthwest,
			Self::Pacific,
		]
		.into_iter()
	}

	/// Returns the regions considered geographically adjacent to this one.
	pub fn adjacent(&self) -> &'static [Region] {
		use Region::*;

		match self {
			NewEngland => &[MidAtlantic],
			MidAtlantic => &[NewEngland, Southeast, GreatLakes],
			Southeast => &[MidAtlantic, GreatLakes, SouthCentral],
			GreatLakes => &[MidAtlantic, Southeast, Plains],
			Plains => &[GreatLakes, SouthCentral, Mountain],
			SouthCentral => &[Southeast, Plains, Mountain],
			Mountain => &[Plains, SouthCentral, PacificNorthwest, Pacific],
			PacificNorthwest => &[Mountain, Pacific],
			Pacific => &[PacificNorthwest, Mountain],
		}
	}

	/// Returns true if `other` is listed in this region's adjacency set.
	pub fn is_adjacent_to(&self, other: Region) -> bool {
		self.adjacent().contains(&other)
	}
}

impl fmt::Display for Region {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a region name is not one of the nine known regions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown region: {0}")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
	type Err = UnknownRegion;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		Region::all()
			.find(|region| region.as_str().eq_ignore_ascii_case(trimmed))
			.ok_or_else(|| UnknownRegion(s.to_string()))
	}
}

/// A US state as static reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsState {
	/// Canonical two-letter uppercase code.
	pub code: &'static str,
	/// Full English name.
	pub name: &'static str,
	/// The region this state belongs to.
	pub region: Region,
}

const fn state(code: &'static str, name: &'static str, region: Region) -> UsState {
	UsState { code, name, region }
}

/// All 50 states, ordered by code.
pub static US_STATES: [UsState; 50] = [
	state("AK", "Alaska", Region::PacificNorthwest),
	state("AL", "Alabama", Region::Southeast),
	state("AR", "Arkansas", Region::SouthCentral),
	state("AZ", "Arizona", Region::Mountain),
	state("CA", "California", Region::Pacific),
	state("CO", "Colorado", Region::Mountain),
	state("CT", "Connecticut", Region::NewEngland),
	state("DE", "Delaware", Region::MidAtlantic),
	state("FL", "Florida", Region::Southeast),
	state("GA", "Georgia", Region::Southeast),
	state("HI", "Hawaii", Region::Pacific),
	state("IA", "Iowa", Region::Plains),
	state("ID", "Idaho", Region::Mountain),
	state("IL", "Illinois", Region::GreatLakes),
	state("IN", "Indiana", Region::GreatLakes),
	state("KS", "Kansas", Region::Plains),
	state("KY", "Kentucky", Region::Southeast),
	state("LA", "Louisiana", Region::SouthCentral),
	state("MA", "Massachusetts", Region::NewEngland),
	state("MD", "Maryland", Region::MidAtlantic),
	state("ME", "Maine", Region::NewEngland),
	state("MI", "Michigan", Region::GreatLakes),
	state("MN", "Minnesota", Region::Plains),
	state("MO", "Missouri", Region::Plains),
	state("MS", "Mississippi", Region::Southeast),
	state("MT", "Montana", Region::Mountain),
	state("NC", "North Carolina", Region::Southeast),
	state("ND", "North Dakota", Region::Plains),
	state("NE", "Nebraska", Region::Plains),
	state("NH", "New Hampshire", Region::NewEngland),
	state("NJ", "New Jersey", Region::MidAtlantic),
	state("NM", "New Mexico", Region::Mountain),
	state("NV", "Nevada", Region::Mountain),
	state("NY", "New York", Region::MidAtlantic),
	state("OH", "Ohio", Region::GreatLakes),
	state("OK", "Oklahoma", Region::SouthCentral),
	state("OR", "Oregon", Region::PacificNorthwest),
	state("PA", "Pennsylvania", Region::MidAtlantic),
	state("RI", "Rhode Island", Region::NewEngland),
	state("SC", "South Carolina", Region::Southeast),
	state("SD", "South Dakota", Region::Plains),
	state("TN", "Tennessee", Region::Southeast),
	state("TX", "Texas", Region::SouthCentral),
	state("UT", "Utah", Region::Mountain),
	state("VA", "Virginia", Region::Southeast),
	state("VT", "Vermont", Region::NewEngland),
	state("WA", "Washington", Region::PacificNorthwest),
	state("WI", "Wisconsin", Region::GreatLakes),
	state("WV", "West Virginia", Region::Southeast),
	state("WY", "Wyoming", Region::Mountain),
];

/// Looks up a state by its canonical uppercase code.
pub fn state_by_code(code: &str) -> Option<&'static UsState> {
	US_STATES
		.binary_search_by(|s| s.code.cmp(code))
		.ok()
		.map(|idx| &US_STATES[idx])
}

/// Looks up a state by full name, ignoring ASCII case.
pub fn state_by_name(name: &str) -> Option<&'static UsState> {
	US_STATES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Returns the region of a state code, if the code is known.
pub fn region_of(code: &str) -> Option<Region> {
	state_by_code(code).map(|s| s.region)
}

/// Returns the states belonging to a region.
pub fn states_in(region: Region) -> impl Iterator<Item = &'static UsState> {
	US_STATES.iter().filter(move |s| s.region == region)
}

/// Returns every state code in ascending order.
pub fn all_state_codes() -> impl Iterator<Item = &'static str> {
	US_STATES.iter().map(|s| s.code)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn test_state_table_is_sorted_and_unique() {
		let codes: Vec<_> = all_state_codes().collect();
		let mut sorted = codes.clone();
		sorted.sort_unstable();
		sorted.dedup();
		assert_eq!(codes, sorted);
		assert_eq!(codes.len(), 50);
	}

	#[test]
	fn test_every_region_has_states() {
		let total: usize = Region::all().map(|r| states_in(r).count()).sum();
		assert_eq!(total, 50);
		for region in Region::all() {
			assert!(states_in(region).count() > 0, "{} is empty", region);
		}
	}

	#[test]
	fn test_adjacency_is_symmetric() {
		for region in Region::all() {
			for neighbour in region.adjacent() {
				assert!(
					neighbour.is_adjacent_to(region),
					"{} lists {} but not the reverse",
					region,
					neighbour
				);
			}
			assert!(!region.is_adjacent_to(region));
		}
	}

	#[test]
	fn test_adjacency_table() {
		assert_eq!(Region::NewEngland.adjacent(), &[Region::MidAtlantic]);
		assert_eq!(
			Region::Mountain.adjacent().iter().collect::<HashSet<_>>(),
			[
				Region::Plains,
				Region::SouthCentral,
				Region::PacificNorthwest,
				Region::Pacific
			]
			.iter()
			.collect::<HashSet<_>>()
		);
		assert!(!Region::NewEngland.is_adjacent_to(Region::Southeast));
		assert!(!Region::Pacific.is_adjacent_to(Region::Plains));
	}

	#[test]
	fn test_lookups() {
		assert_eq!(state_by_code("CA").map(|s| s.name), Some("California"));
		assert_eq!(state_by_code("ca"), None);
		assert_eq!(state_by_name("new york").map(|s| s.code), Some("NY"));
		assert_eq!(region_of("TX"), Some(Region::SouthCentral));
		assert_eq!(region_of("DC"), None);
	}

	#[test]
	fn test_region_names_round_trip() {
		for region in Region::all() {
			assert_eq!(region.as_str().parse::<Region>(), Ok(region));
			let json = serde_json::to_string(&region).unwrap();
			assert_eq!(json, format!("\"{}\"", region.as_str()));
		}
		assert_eq!("pacific northwest".parse::<Region>(), Ok(Region::PacificNorthwest));
		assert!("Atlantis".parse::<Region>().is_err());
	}
}
