// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for insider group sync.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`INSIDER_SYNC_*`)
//!
//! # Usage
//!
//! ```ignore
//! use insider_sync_config::load_config;
//!
//! let config = load_config()?;
//! if config.sync.enabled {
//!     println!("syncing into {}", config.sync.insider_group);
//! }
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::InsiderSyncConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct InsiderSyncConfig {
	pub sync: SyncConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`INSIDER_SYNC_*`)
/// 2. Config file (`/etc/insider-sync/config.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<InsiderSyncConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<InsiderSyncConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<InsiderSyncConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = InsiderSyncConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: InsiderSyncConfigLayer) -> Result<InsiderSyncConfig, ConfigError> {
	let sync = layer.sync.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&sync)?;

	info!(
		sync_enabled = sync.enabled,
		verbose = sync.verbose,
		insider_group = %sync.insider_group,
		non_insider_group = %sync.non_insider_group,
		database = %database.url,
		"configuration loaded"
	);

	Ok(InsiderSyncConfig {
		sync,
		database,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(sync: &SyncConfig) -> Result<(), ConfigError> {
	if sync.insider_group.trim().is_empty() || sync.non_insider_group.trim().is_empty() {
		return Err(ConfigError::validation("group names must not be empty"));
	}

	if sync.insider_group == sync.non_insider_group {
		return Err(ConfigError::validation(format!(
			"insider and non-insider groups must differ (both are '{}')",
			sync.insider_group
		)));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	struct FixedSource(InsiderSyncConfigLayer, Precedence);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.1
		}

		fn load(&self) -> Result<InsiderSyncConfigLayer, ConfigError> {
			Ok(self.0.clone())
		}
	}

	fn sync_layer(enabled: bool) -> InsiderSyncConfigLayer {
		InsiderSyncConfigLayer {
			sync: Some(SyncConfigLayer {
				enabled: Some(enabled),
				..Default::default()
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_same_group_names_rejected() {
		let sync = SyncConfig {
			insider_group: "members".to_string(),
			non_insider_group: "members".to_string(),
			..Default::default()
		};
		let result = validate_config(&sync);
		assert!(result.unwrap_err().to_string().contains("must differ"));
	}

	#[test]
	fn test_blank_group_name_rejected() {
		let sync = SyncConfig {
			insider_group: "  ".to_string(),
			..Default::default()
		};
		assert!(validate_config(&sync).is_err());
	}

	#[test]
	fn test_defaults_are_valid() {
		assert!(validate_config(&SyncConfig::default()).is_ok());
	}

	#[test]
	fn test_environment_overrides_file() {
		// Listed out of order on purpose; sorting by precedence must fix it.
		let config = load_from_sources(vec![
			Box::new(FixedSource(sync_layer(false), Precedence::Environment)),
			Box::new(FixedSource(sync_layer(true), Precedence::ConfigFile)),
			Box::new(DefaultsSource),
		])
		.unwrap();
		assert!(!config.sync.enabled);
	}

	#[test]
	fn test_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[sync]\nenabled = true\n\n[database]\nurl = \"sqlite:/srv/sync.db\""
		)
		.unwrap();

		let config = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		])
		.unwrap();
		assert!(config.sync.enabled);
		assert_eq!(config.database.url, "sqlite:/srv/sync.db");
		assert_eq!(config.logging.level, "info");
	}
}
