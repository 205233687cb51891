// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Before/after record of a group sync.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::types::{User, UserId};

/// Audit record emitted after every applied sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAudit {
	pub user_id: UserId,
	pub username: String,
	pub active: bool,
	pub before: BTreeSet<String>,
	pub after: BTreeSet<String>,
}

impl SyncAudit {
	pub fn new(user: &User, active: bool, before: BTreeSet<String>, after: BTreeSet<String>) -> Self {
		Self {
			user_id: user.id,
			username: user.username.clone(),
			active,
			before,
			after,
		}
	}

	/// Human-readable subscription state.
	pub fn status_label(&self) -> &'static str {
		if self.active {
			"ACTIVE (status=1)"
		} else {
			"INACTIVE/NONE (status!=1 or missing)"
		}
	}

	/// Groups present after the sync that were not there before.
	pub fn added(&self) -> impl Iterator<Item = &String> {
		self.after.difference(&self.before)
	}

	/// Groups present before the sync that are gone after it.
	pub fn removed(&self) -> impl Iterator<Item = &String> {
		self.before.difference(&self.after)
	}

	pub fn changed(&self) -> bool {
		self.before != self.after
	}
}

/// Sorted, comma separated, `(none)` when empty.
pub fn format_group_list(groups: &BTreeSet<String>) -> String {
	if groups.is_empty() {
		"(none)".to_string()
	} else {
		groups.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
	}
}

impl fmt::Display for SyncAudit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"user {} (id={}), subscription {}, before: {}, after: {}",
			self.username,
			self.user_id,
			self.status_label(),
			format_group_list(&self.before),
			format_group_list(&self.after),
		)
	}
}
