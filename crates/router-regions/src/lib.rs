//! Region lookups for the warehouse routing system.
//!
//! Provides the two pure functions every routing decision is built on:
//! normalizing free-form state input to a canonical code, and scoring how
//! close a state is to a warehouse's home region.

pub mod normalize;
pub mod proximity;

pub use normalize::{home_region, normalize_state_code};
pub use proximity::{proximity, proximity_score, Proximity};
