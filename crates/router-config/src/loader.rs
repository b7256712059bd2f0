//! Multi-file configuration loading.
//!
//! A config file may name other files under a top-level `include` key,
//! either a single string or an array of strings. Paths are relative to the
//! including file. Included files may include further files. Each top-level
//! section may only be defined once across the whole set.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Loads a configuration and everything it includes.
pub struct ConfigLoader {
	/// Directory the root config path is resolved against.
	base_path: PathBuf,
	/// Canonical paths already read.
	loaded_files: HashSet<PathBuf>,
	/// Which file defined each top-level section.
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads `config_path` and all of its includes into a validated [`Config`].
	///
	/// A file reached through several include paths is read once. Only a file
	/// that includes itself, directly or through its own includes, is an error.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let root = canonical_path(&resolve_against(&self.base_path, config_path.as_ref())).await?;
		let mut merged = toml::Table::new();

		// Files whose includes are still being expanded, innermost last.
		let mut active: Vec<(PathBuf, VecDeque<PathBuf>)> = Vec::new();
		self.loaded_files.insert(root.clone());
		let includes = self.merge_file(&root, &mut merged).await?;
		active.push((root, includes));

		while let Some((path, pending)) = active.last_mut() {
			let Some(include) = pending.pop_front() else {
				active.pop();
				continue;
			};
			let including = path.clone();
			let dir = including.parent().unwrap_or(&self.base_path);
			let target = canonical_path(&resolve_against(dir, &include)).await?;

			if active.iter().any(|(open, _)| *open == target) {
				return Err(ConfigError::Validation(format!(
					"Circular include detected: {} includes {}",
					including.display(),
					target.display()
				)));
			}
			if !self.loaded_files.insert(target.clone()) {
				continue;
			}

			let includes = self.merge_file(&target, &mut merged).await?;
			active.push((target, includes));
		}

		let config: Config = toml::Value::Table(merged).try_into()?;
		config.validate()?;
		Ok(config)
	}

	/// Reads one file into `merged` and returns the includes it names.
	async fn merge_file(
		&mut self,
		path: &Path,
		merged: &mut toml::Table,
	) -> Result<VecDeque<PathBuf>, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		let resolved = resolve_env_vars(&content)?;
		let mut table: toml::Table = toml::from_str(&resolved)?;
		let includes = take_includes(&mut table)?;

		for (section, value) in table {
			if let Some(existing) = self.section_sources.get(&section) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}",
					section,
					existing.display(),
					path.display()
				)));
			}
			self.section_sources.insert(section.clone(), path.to_path_buf());
			merged.insert(section, value);
		}
		Ok(includes.into())
	}
}

async fn canonical_path(path: &Path) -> Result<PathBuf, ConfigError> {
	tokio::fs::canonicalize(path).await.map_err(|e| {
		ConfigError::Io(std::io::Error::new(
			e.kind(),
			format!("Cannot resolve path {}: {}", path.display(), e),
		))
	})
}

fn resolve_against(dir: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		dir.join(path)
	}
}

fn take_includes(table: &mut toml::Table) -> Result<Vec<PathBuf>, ConfigError> {
	match table.remove("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.into_iter()
			.map(|item| match item {
				toml::Value::String(path) => Ok(PathBuf::from(path)),
				_ => Err(ConfigError::Validation(
					"Include array must contain only strings".into(),
				)),
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const MAIN: &str = r#"
[engine]
id = "acme"

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	const PLANNER: &str = r#"
[planner]
primary = "proximity"
[planner.implementations.proximity]
"#;

	const WAREHOUSES: &str = r#"
[[warehouses]]
id = "wh-1"
name = "Reno"
address = { state = "NV" }
"#;

	#[tokio::test]
	async fn test_single_file() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("config.toml"), format!("{}{}", MAIN, PLANNER)).unwrap();

		let config = ConfigLoader::new(dir.path())
			.load_config("config.toml")
			.await
			.unwrap();
		assert_eq!(config.engine.id, "acme");
		assert!(config.warehouses.is_empty());
	}

	#[tokio::test]
	async fn test_includes_are_merged() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("config.toml"),
			format!("include = [\"planner.toml\", \"warehouses.toml\"]\n{}", MAIN),
		)
		.unwrap();
		fs::write(dir.path().join("planner.toml"), PLANNER).unwrap();
		fs::write(dir.path().join("warehouses.toml"), WAREHOUSES).unwrap();

		let config = ConfigLoader::new(dir.path())
			.load_config("config.toml")
			.await
			.unwrap();
		assert_eq!(config.planner.primary, "proximity");
		assert_eq!(config.warehouses.len(), 1);
		assert_eq!(config.warehouses[0].id, "wh-1");
	}

	#[tokio::test]
	async fn test_nested_include_relative_to_including_file() {
		let dir = TempDir::new().unwrap();
		fs::create_dir(dir.path().join("conf.d")).unwrap();
		fs::write(
			dir.path().join("config.toml"),
			format!("include = \"conf.d/planner.toml\"\n{}", MAIN),
		)
		.unwrap();
		fs::write(
			dir.path().join("conf.d/planner.toml"),
			format!("include = \"warehouses.toml\"\n{}", PLANNER),
		)
		.unwrap();
		fs::write(dir.path().join("conf.d/warehouses.toml"), WAREHOUSES).unwrap();

		let config = Config::from_file(dir.path().join("config.toml")).await.unwrap();
		assert_eq!(config.warehouses.len(), 1);
	}

	#[tokio::test]
	async fn test_duplicate_section_rejected() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("config.toml"),
			format!("include = [\"more.toml\"]\n{}{}", MAIN, PLANNER),
		)
		.unwrap();
		fs::write(dir.path().join("more.toml"), PLANNER).unwrap();

		let err = ConfigLoader::new(dir.path())
			.load_config("config.toml")
			.await
			.unwrap_err();
		assert!(err.to_string().contains("Duplicate section 'planner'"));
	}

	#[tokio::test]
	async fn test_circular_include_rejected() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("config.toml"),
			format!("include = \"planner.toml\"\n{}", MAIN),
		)
		.unwrap();
		fs::write(
			dir.path().join("planner.toml"),
			format!("include = \"config.toml\"\n{}", PLANNER),
		)
		.unwrap();

		let err = ConfigLoader::new(dir.path())
			.load_config("config.toml")
			.await
			.unwrap_err();
		assert!(err.to_string().contains("Circular include"));
	}

	#[tokio::test]
	async fn test_shared_include_loaded_once() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("config.toml"),
			format!("include = [\"planner.toml\", \"extra.toml\"]\n{}", MAIN),
		)
		.unwrap();
		fs::write(
			dir.path().join("planner.toml"),
			format!("include = \"warehouses.toml\"\n{}", PLANNER),
		)
		.unwrap();
		fs::write(dir.path().join("extra.toml"), "include = \"warehouses.toml\"\n").unwrap();
		fs::write(dir.path().join("warehouses.toml"), WAREHOUSES).unwrap();

		let config = ConfigLoader::new(dir.path())
			.load_config("config.toml")
			.await
			.unwrap();
		assert_eq!(config.warehouses.len(), 1);
		assert_eq!(config.warehouses[0].id, "wh-1");
	}

	#[tokio::test]
	async fn test_self_include_rejected() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("config.toml"),
			format!("include = \"./config.toml\"\n{}{}", MAIN, PLANNER),
		)
		.unwrap();

		let err = ConfigLoader::new(dir.path())
			.load_config("config.toml")
			.await
			.unwrap_err();
		assert!(err.to_string().contains("Circular include"));
	}

	#[tokio::test]
	async fn test_invalid_include_type() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("config.toml"),
			format!("include = 42\n{}{}", MAIN, PLANNER),
		)
		.unwrap();

		let err = ConfigLoader::new(dir.path())
			.load_config("config.toml")
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[tokio::test]
	async fn test_missing_include_is_io_error() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("config.toml"),
			format!("include = \"nope.toml\"\n{}{}", MAIN, PLANNER),
		)
		.unwrap();

		let err = ConfigLoader::new(dir.path())
			.load_config("config.toml")
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::Io(_)));
	}
}
