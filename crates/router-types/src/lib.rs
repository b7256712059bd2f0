//! Common types module for the warehouse routing system.
//!
//! This module defines the data model shared by every routing component:
//! the static US region reference data, warehouses as seen by the router,
//! per-warehouse state assignments and the routing configuration document
//! consumed at order time.

/// Static US state and region reference data.
pub mod geography;
/// Implementation registry trait for pluggable components.
pub mod registry;
/// Routing configuration documents, assignments and routing decisions.
pub mod routing;
/// Storage types for managing persistent data.
pub mod storage;
/// Utility functions for display formatting.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;
/// Warehouse directory entries and planner inputs.
pub mod warehouse;

// Re-export all types for convenient access
pub use geography::*;
pub use registry::*;
pub use routing::*;
pub use storage::*;
pub use utils::truncate_id;
pub use validation::*;
pub use warehouse::*;
