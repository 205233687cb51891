// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group sync feature configuration.

use insider_sync_core::{SyncGroups, INSIDER_GROUP, NON_INSIDER_GROUP};
use serde::Deserialize;

/// Group sync configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
	/// Master switch. When off every entry point is a silent no-op.
	pub enabled: bool,
	/// Emit diagnostic and audit lines. Never changes behavior.
	pub verbose: bool,
	pub insider_group: String,
	pub non_insider_group: String,
}

impl SyncConfig {
	pub fn groups(&self) -> SyncGroups {
		SyncGroups::new(&self.insider_group, &self.non_insider_group)
	}
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			verbose: false,
			insider_group: INSIDER_GROUP.to_string(),
			non_insider_group: NON_INSIDER_GROUP.to_string(),
		}
	}
}

/// Group sync configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub verbose: Option<bool>,
	#[serde(default)]
	pub insider_group: Option<String>,
	#[serde(default)]
	pub non_insider_group: Option<String>,
}

impl SyncConfigLayer {
	pub fn merge(&mut self, other: SyncConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.verbose.is_some() {
			self.verbose = other.verbose;
		}
		if other.insider_group.is_some() {
			self.insider_group = other.insider_group;
		}
		if other.non_insider_group.is_some() {
			self.non_insider_group = other.non_insider_group;
		}
	}

	pub fn finalize(self) -> SyncConfig {
		SyncConfig {
			enabled: self.enabled.unwrap_or(false),
			verbose: self.verbose.unwrap_or(false),
			insider_group: self
				.insider_group
				.unwrap_or_else(|| INSIDER_GROUP.to_string()),
			non_insider_group: self
				.non_insider_group
				.unwrap_or_else(|| NON_INSIDER_GROUP.to_string()),
		}
	}
}
