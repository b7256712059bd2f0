//! Core routing engine.
//!
//! Ties the versioned config store, the assignment planner, the manual
//! editor and the resolver together. Every edit loads the current document,
//! applies a pure transformation and saves the result against the version it
//! read, so two concurrent edits of the same scope cannot silently drop one
//! another inside a single engine.

pub mod builder;
pub mod store;

pub use builder::{BuilderError, RoutingBuilder, RoutingFactories};
pub use store::{ConfigStore, StoredRoutingConfig};

use router_config::Config;
use router_planner::{editor, EditorError, PlannerService};
use router_storage::StorageService;
use router_types::{RoutingConfig, RoutingDecision, RoutingMode};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error(transparent)]
	Editor(#[from] EditorError),
	#[error("No routing config for store '{0}'")]
	NotFound(String),
	#[error("Warehouse '{0}' is not in the warehouse directory")]
	UnknownWarehouse(String),
	#[error("Version conflict: expected {expected}, found {actual}")]
	VersionConflict { expected: u64, actual: u64 },
	#[error("Time error: {0}")]
	TimeError(String),
}

/// Derived view of a stored routing config, used for reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingSummary {
	pub store_id: String,
	pub version: u64,
	pub mode: RoutingMode,
	pub enable_region_routing: bool,
	pub assignments: usize,
	pub active_assignments: usize,
	pub assigned_states: usize,
	pub unassigned_states: Vec<&'static str>,
	/// Set when the config breaks the one-owner-per-state property.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub partition_error: Option<String>,
}

impl RoutingSummary {
	fn new(store_id: &str, doc: &StoredRoutingConfig) -> Self {
		let config = &doc.config;
		Self {
			store_id: store_id.to_string(),
			version: doc.version,
			mode: config.mode,
			enable_region_routing: config.enable_region_routing,
			assignments: config.assignments.len(),
			active_assignments: config.active_assignments().count(),
			assigned_states: config.assigned_states().len(),
			unassigned_states: config.unassigned_states().into_iter().collect(),
			partition_error: config.check_partition().err().map(|e| e.to_string()),
		}
	}

	pub fn is_consistent(&self) -> bool {
		self.partition_error.is_none()
	}
}

/// Routing engine over one service configuration.
pub struct RoutingEngine {
	config: Config,
	store: ConfigStore,
	planner: Arc<PlannerService>,
}

impl RoutingEngine {
	pub fn new(config: Config, storage: Arc<StorageService>, planner: Arc<PlannerService>) -> Self {
		Self {
			config,
			store: ConfigStore::new(storage),
			planner,
		}
	}

	/// Returns the service configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Loads the routing document for a scope, if any.
	pub async fn load_routing(
		&self,
		store_id: &str,
	) -> Result<Option<StoredRoutingConfig>, EngineError> {
		self.store.load(store_id).await
	}

	/// Loads the routing document for a scope, failing if there is none.
	pub async fn routing(&self, store_id: &str) -> Result<StoredRoutingConfig, EngineError> {
		self.store
			.load(store_id)
			.await?
			.ok_or_else(|| EngineError::NotFound(store_id.to_string()))
	}

	/// Replaces the routing document for a scope.
	#[instrument(skip_all, fields(store_id = %store_id))]
	pub async fn save_routing(
		&self,
		store_id: &str,
		config: RoutingConfig,
		expected_version: Option<u64>,
	) -> Result<StoredRoutingConfig, EngineError> {
		let doc = self.store.save(store_id, config, expected_version).await?;
		tracing::info!(version = doc.version, "Routing config saved");
		Ok(doc)
	}

	/// Creates an empty routing document. Fails if one already exists.
	#[instrument(skip_all, fields(store_id = %store_id, mode = %mode))]
	pub async fn init(
		&self,
		store_id: &str,
		mode: RoutingMode,
	) -> Result<StoredRoutingConfig, EngineError> {
		self.store
			.save(store_id, RoutingConfig::new(mode), Some(0))
			.await
	}

	/// Deletes the routing document. Resolution falls back to unresolved.
	#[instrument(skip_all, fields(store_id = %store_id))]
	pub async fn reset(&self, store_id: &str) -> Result<bool, EngineError> {
		let existed = self.store.delete(store_id).await?;
		tracing::info!(existed, "Routing config removed");
		Ok(existed)
	}

	/// Applies `edit` to the current document and saves the result against
	/// the version that was read.
	pub async fn edit<F>(&self, store_id: &str, edit: F) -> Result<StoredRoutingConfig, EngineError>
	where
		F: FnOnce(&RoutingConfig) -> Result<RoutingConfig, EditorError>,
	{
		let current = self.routing(store_id).await?;
		let next = edit(&current.config)?;
		self.store
			.save(store_id, next, Some(current.version))
			.await
	}

	/// Adds a warehouse from the directory to routing.
	#[instrument(skip_all, fields(store_id = %store_id, warehouse_id = %warehouse_id))]
	pub async fn add_warehouse(
		&self,
		store_id: &str,
		warehouse_id: &str,
	) -> Result<StoredRoutingConfig, EngineError> {
		let warehouse = self
			.config
			.warehouse(warehouse_id)
			.ok_or_else(|| EngineError::UnknownWarehouse(warehouse_id.to_string()))?;
		self.edit(store_id, |config| {
			editor::add_warehouse(config, &warehouse.id, &warehouse.name)
		})
		.await
	}

	/// Removes an assignment; its states become unassigned.
	#[instrument(skip_all, fields(store_id = %store_id))]
	pub async fn remove_warehouse(
		&self,
		store_id: &str,
		assignment_id: &str,
	) -> Result<StoredRoutingConfig, EngineError> {
		self.edit(store_id, |config| editor::remove_warehouse(config, assignment_id))
			.await
	}

	/// Moves a state to a warehouse, or to unassigned when `warehouse_id` is `None`.
	#[instrument(skip_all, fields(store_id = %store_id, state = %state))]
	pub async fn move_state(
		&self,
		store_id: &str,
		state: &str,
		warehouse_id: Option<&str>,
	) -> Result<StoredRoutingConfig, EngineError> {
		self.edit(store_id, |config| editor::apply_move(config, state, warehouse_id))
			.await
	}

	/// Re-plans all state lists from warehouse home states.
	#[instrument(skip_all, fields(store_id = %store_id))]
	pub async fn plan(&self, store_id: &str) -> Result<StoredRoutingConfig, EngineError> {
		let directory = &self.config.warehouses;
		self.edit(store_id, |config| Ok(self.planner.plan_config(config, directory)))
			.await
	}

	/// Reports derived state and partition consistency for a scope.
	pub async fn check(&self, store_id: &str) -> Result<RoutingSummary, EngineError> {
		let doc = self.routing(store_id).await?;
		let summary = RoutingSummary::new(store_id, &doc);
		if let Some(error) = &summary.partition_error {
			tracing::warn!(component = "engine", store_id, %error, "Routing config is inconsistent");
		}
		Ok(summary)
	}

	/// Resolves the warehouse for an order shipped to `state`.
	///
	/// A scope without a document resolves to `Unresolved`. Without a country
	/// code the engine default is used.
	pub async fn resolve(
		&self,
		store_id: &str,
		state: &str,
		country_code: Option<&str>,
	) -> Result<RoutingDecision, EngineError> {
		let doc = self.store.load(store_id).await?;
		let country_code = country_code.unwrap_or(&self.config.engine.default_country_code);
		Ok(router_resolver::resolve_warehouse(
			state,
			country_code,
			doc.as_ref().map(|d| &d.config),
		))
	}
}
