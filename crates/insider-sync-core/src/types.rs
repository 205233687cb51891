// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions shared by the sync engine and its stores.
//!
//! - **ID newtypes**: [`UserId`] and [`GroupId`] wrap the host's numeric row ids
//!   so the two can never be mixed up at a call site.
//! - **Entities**: [`User`] and [`Group`] as seen by the reconciler.
//! - **Target groups**: [`SyncGroups`] names the insider / non-insider pair.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(i64);

		impl $name {
			/// Create a new ID from a raw row id.
			pub fn new(id: i64) -> Self {
				Self(id)
			}

			/// Get the raw row id.
			pub fn get(self) -> i64 {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<i64> for $name {
			fn from(id: i64) -> Self {
				Self(id)
			}
		}

		impl From<$name> for i64 {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Stable numeric identifier for a local user.");
define_id_type!(GroupId, "Stable numeric identifier for a group.");

// =============================================================================
// Entities
// =============================================================================

/// A local user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub username: String,
	/// Primary email, as stored by the host. Not normalized.
	pub email: Option<String>,
}

/// A named group. Names are unique within the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
	pub id: GroupId,
	pub name: String,
}

// =============================================================================
// Target groups
// =============================================================================

/// Default name of the group for users with an active subscription.
pub const INSIDER_GROUP: &str = "insider";

/// Default name of the group for everyone else.
pub const NON_INSIDER_GROUP: &str = "non-insider";

/// The pair of mutually exclusive groups driven by subscription status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncGroups {
	pub insider: String,
	pub non_insider: String,
}

impl SyncGroups {
	pub fn new(insider: impl Into<String>, non_insider: impl Into<String>) -> Self {
		Self {
			insider: insider.into(),
			non_insider: non_insider.into(),
		}
	}
}

impl Default for SyncGroups {
	fn default() -> Self {
		Self::new(INSIDER_GROUP, NON_INSIDER_GROUP)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_user_id_display_is_raw_number() {
		assert_eq!(UserId::new(42).to_string(), "42");
	}

	#[test]
	fn test_ids_serialize_transparently() {
		let json = serde_json::to_string(&GroupId::new(7)).unwrap();
		assert_eq!(json, "7");
		let id: UserId = serde_json::from_str("13").unwrap();
		assert_eq!(id.get(), 13);
	}

	#[test]
	fn test_default_groups_use_standard_names() {
		let groups = SyncGroups::default();
		assert_eq!(groups.insider, "insider");
		assert_eq!(groups.non_insider, "non-insider");
	}
}
