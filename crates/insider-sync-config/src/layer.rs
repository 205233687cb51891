// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration as produced by a single source.

use serde::Deserialize;

use crate::sections::{DatabaseConfigLayer, LoggingConfigLayer, SyncConfigLayer};

/// One source's view of the configuration. Absent sections and fields defer
/// to lower-precedence sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsiderSyncConfigLayer {
	#[serde(default)]
	pub sync: Option<SyncConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl InsiderSyncConfigLayer {
	/// Merge `other` on top of `self`; fields set in `other` win.
	pub fn merge(&mut self, other: InsiderSyncConfigLayer) {
		merge_section(&mut self.sync, other.sync, SyncConfigLayer::merge);
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(target: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	let Some(other) = other else {
		return;
	};
	if let Some(existing) = target.as_mut() {
		merge(existing, other);
	} else {
		*target = Some(other);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_fills_missing_sections() {
		let mut base = InsiderSyncConfigLayer::default();
		base.merge(InsiderSyncConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite::memory:".to_string()),
			}),
			..Default::default()
		});
		assert_eq!(
			base.database.and_then(|d| d.url).as_deref(),
			Some("sqlite::memory:")
		);
		assert!(base.sync.is_none());
	}

	#[test]
	fn test_merge_combines_fields_within_section() {
		let mut base = InsiderSyncConfigLayer {
			sync: Some(SyncConfigLayer {
				enabled: Some(true),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(InsiderSyncConfigLayer {
			sync: Some(SyncConfigLayer {
				verbose: Some(true),
				..Default::default()
			}),
			..Default::default()
		});

		let sync = base.sync.unwrap();
		assert_eq!(sync.enabled, Some(true));
		assert_eq!(sync.verbose, Some(true));
	}

	#[test]
	fn test_parses_toml_sections() {
		let layer: InsiderSyncConfigLayer = toml::from_str(
			r#"
			[sync]
			enabled = true
			insider_group = "subscribers"

			[logging]
			level = "debug"
			"#,
		)
		.unwrap();

		let sync = layer.sync.unwrap();
		assert_eq!(sync.enabled, Some(true));
		assert_eq!(sync.insider_group.as_deref(), Some("subscribers"));
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
		assert!(layer.database.is_none());
	}
}
