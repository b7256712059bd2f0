//! Registry trait for self-registering implementations.
//!
//! Pluggable components (storage backends, assignment strategies) expose a
//! `Registry` type implementing this trait so the binary can wire them up by
//! the name used in the TOML configuration.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// For example "memory" for `storage.implementations.memory`, or
	/// "proximity" for `planner.implementations.proximity`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
