//! Utility functions for common formatting needs.

pub mod formatting;

pub use formatting::truncate_id;
