//! Storage-related types for the routing system.

/// Storage namespaces for persisted routing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Versioned routing configuration documents, one per routing scope.
	RoutingConfigs,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::RoutingConfigs => "routing_configs",
		}
	}
}
