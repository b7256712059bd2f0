//! Versioned routing configuration documents.
//!
//! Each routing scope (`store_id`) owns exactly one document. Saves replace
//! the whole document and bump its version. Callers may pass the version
//! they last read to reject a save that would overwrite someone else's.

use crate::EngineError;
use router_storage::{StorageError, StorageService};
use router_types::{RoutingConfig, StorageKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// A routing configuration as persisted, with its version metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRoutingConfig {
	/// Starts at 1 and increments on every save.
	pub version: u64,
	/// Unix timestamp (seconds) of the last save.
	pub updated_at: u64,
	pub config: RoutingConfig,
}

/// Reads and writes routing documents through the storage service.
pub struct ConfigStore {
	storage: Arc<StorageService>,
	/// Serializes read-compare-write cycles within this process.
	write_lock: Mutex<()>,
}

impl ConfigStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			write_lock: Mutex::new(()),
		}
	}

	/// Loads the document for `store_id`, or `None` if there is none.
	pub async fn load(&self, store_id: &str) -> Result<Option<StoredRoutingConfig>, EngineError> {
		match self
			.storage
			.retrieve(StorageKey::RoutingConfigs, store_id)
			.await
		{
			Ok(doc) => Ok(Some(doc)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(EngineError::Storage(e.to_string())),
		}
	}

	/// Replaces the document for `store_id`.
	///
	/// With `expected_version` set, the save only goes through if the stored
	/// version matches; a missing document has version 0. Without it the
	/// last write wins.
	pub async fn save(
		&self,
		store_id: &str,
		config: RoutingConfig,
		expected_version: Option<u64>,
	) -> Result<StoredRoutingConfig, EngineError> {
		let _guard = self.write_lock.lock().await;

		let current = self.load(store_id).await?.map_or(0, |doc| doc.version);
		if let Some(expected) = expected_version {
			if expected != current {
				return Err(EngineError::VersionConflict {
					expected,
					actual: current,
				});
			}
		}

		let doc = StoredRoutingConfig {
			version: current + 1,
			updated_at: unix_now()?,
			config,
		};
		self.storage
			.store(StorageKey::RoutingConfigs, store_id, &doc)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;

		tracing::debug!(
			component = "store",
			store_id,
			version = doc.version,
			"Saved routing config"
		);
		Ok(doc)
	}

	/// Deletes the document. Returns whether one existed.
	pub async fn delete(&self, store_id: &str) -> Result<bool, EngineError> {
		let _guard = self.write_lock.lock().await;

		let existed = self
			.storage
			.exists(StorageKey::RoutingConfigs, store_id)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;
		if existed {
			self.storage
				.remove(StorageKey::RoutingConfigs, store_id)
				.await
				.map_err(|e| EngineError::Storage(e.to_string()))?;
		}
		Ok(existed)
	}
}

fn unix_now() -> Result<u64, EngineError> {
	Ok(SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_err(|e| EngineError::TimeError(e.to_string()))?
		.as_secs())
}
