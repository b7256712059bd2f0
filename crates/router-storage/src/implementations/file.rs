//! File-based storage backend.
//!
//! Each key is stored as one JSON file under a base directory. Writes go to
//! a temporary file that is then renamed over the target, so a reader never
//! observes a partially written document.

use crate::{StorageError, StorageFactory, StorageInterface};
use async_trait::async_trait;
use router_types::{ConfigSchema, Field, FieldType, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;

/// Default directory used when `storage_path` is not configured.
const DEFAULT_STORAGE_PATH: &str = "./data/routing";

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance rooted at `base_path`.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	///
	/// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so distinct keys
	/// always map to distinct files.
	fn get_file_path(&self, key: &str) -> PathBuf {
		self.base_path.join(format!("{}.json", encode_key(key)))
	}
}

fn encode_key(key: &str) -> String {
	let mut encoded = String::with_capacity(key.len());
	for byte in key.bytes() {
		match byte {
			b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => encoded.push(byte as char),
			other => encoded.push_str(&format!("%{:02X}", other)),
		}
	}
	encoded
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		tracing::debug!(component = "storage", path = ?path, "Wrote document");
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		fs::try_exists(self.get_file_path(key))
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("storage_path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(path) if !path.trim().is_empty() => Ok(()),
						_ => Err("storage_path cannot be empty".into()),
					}
				}),
			],
		);

		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for documents (default: "./data/routing")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl router_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_write_read_delete() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().join("nested"));

		let key = "routing_configs:shop/main";
		storage.set_bytes(key, b"{\"v\":1}".to_vec()).await.unwrap();

		assert!(storage.exists(key).await.unwrap());
		assert_eq!(storage.get_bytes(key).await.unwrap(), b"{\"v\":1}".to_vec());
		assert!(dir
			.path()
			.join("nested")
			.join("routing_configs%3Ashop%2Fmain.json")
			.exists());

		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());
		assert!(matches!(
			storage.get_bytes(key).await,
			Err(StorageError::NotFound)
		));
		// Deleting twice is fine.
		storage.delete(key).await.unwrap();
	}

	#[tokio::test]
	async fn test_overwrite_leaves_no_temp_file() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage.set_bytes("k", b"one".to_vec()).await.unwrap();
		storage.set_bytes("k", b"two".to_vec()).await.unwrap();

		assert_eq!(storage.get_bytes("k").await.unwrap(), b"two".to_vec());
		assert!(!dir.path().join("k.tmp").exists());
	}

	#[tokio::test]
	async fn test_similar_keys_stay_independent() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());
		let keys = [
			"routing_configs:shop.eu",
			"routing_configs:shop_eu",
			"routing_configs:shop/eu",
			"routing_configs:shop:eu",
			"routing_configs:shop%2Eeu",
		];

		storage.set_bytes(keys[0], b"dotted".to_vec()).await.unwrap();
		for key in &keys[1..] {
			assert!(!storage.exists(key).await.unwrap(), "{} collides", key);
		}

		for (i, key) in keys.iter().enumerate() {
			storage.set_bytes(key, vec![i as u8]).await.unwrap();
		}
		for (i, key) in keys.iter().enumerate() {
			assert_eq!(storage.get_bytes(key).await.unwrap(), vec![i as u8]);
		}
		assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), keys.len());
	}

	#[test]
	fn test_encode_key() {
		assert_eq!(encode_key("routing_configs:shop-1"), "routing_configs%3Ashop-1");
		assert_eq!(encode_key("a.b/c%"), "a%2Eb%2Fc%25");
		assert_eq!(encode_key("é"), "%C3%A9");
	}

	#[test]
	fn test_factory_validates_path() {
		let config: toml::Value = toml::from_str("storage_path = \"\"").unwrap();
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));

		let config: toml::Value = toml::from_str("storage_path = 7").unwrap();
		assert!(create_storage(&config).is_err());
	}
}
