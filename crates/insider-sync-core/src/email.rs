// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Email normalization and the pending-signup key policy.

use serde::Serialize;
use std::fmt;

/// Namespace under which pending signups are stored.
pub const PENDING_NAMESPACE: &str = "insider_group_sync";

/// Prefix of every pending-signup key.
pub const PENDING_KEY_PREFIX: &str = "pending_";

/// An email address trimmed and lowercased.
///
/// Both the authentication side (provider `loginName`) and the signup side
/// (local account email) go through this type so their keys always agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
	/// Returns `None` when the address is blank.
	pub fn parse(raw: &str) -> Option<Self> {
		let normalized = raw.trim().to_lowercase();
		if normalized.is_empty() {
			None
		} else {
			Some(Self(normalized))
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Key of the pending-signup entry for this address.
	pub fn pending_key(&self) -> String {
		format!("{PENDING_KEY_PREFIX}{}", self.0)
	}

	/// Inverse of [`NormalizedEmail::pending_key`].
	pub fn from_pending_key(key: &str) -> Option<Self> {
		key.strip_prefix(PENDING_KEY_PREFIX).and_then(Self::parse)
	}
}

impl fmt::Display for NormalizedEmail {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for NormalizedEmail {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
