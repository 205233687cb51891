// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pending-signup cache.
//!
//! When a user authenticates before their local account exists, their
//! provider payload is parked in the plugin store under
//! `insider_group_sync / pending_<email>` until the account is created.
//! Entries never expire; orphans are listed and cleared by operators.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use insider_sync_core::{NormalizedEmail, WbUser, PENDING_KEY_PREFIX, PENDING_NAMESPACE};
use insider_sync_db::{PluginStore, PluginStoreRow};
use serde::Serialize;

use crate::error::Result;

/// A staged payload with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingSignup {
	pub email: NormalizedEmail,
	pub wb_user: WbUser,
	pub staged_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl PendingSignup {
	fn from_row(row: PluginStoreRow) -> Option<Self> {
		let email = NormalizedEmail::from_pending_key(&row.key)?;
		let Some(wb_user) = WbUser::from_value(row.value) else {
			tracing::warn!(key = %row.key, "pending entry is not an object, ignoring");
			return None;
		};

		Some(Self {
			email,
			wb_user,
			staged_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

#[derive(Clone)]
pub struct PendingSignupCache {
	store: Arc<dyn PluginStore>,
}

impl PendingSignupCache {
	pub fn new(store: Arc<dyn PluginStore>) -> Self {
		Self { store }
	}

	/// Park `wb_user` for `email`, replacing any earlier payload.
	#[tracing::instrument(skip(self, wb_user), fields(email = %email))]
	pub async fn stage(&self, email: &NormalizedEmail, wb_user: &WbUser) -> Result<()> {
		self
			.store
			.set(PENDING_NAMESPACE, &email.pending_key(), &wb_user.clone().into_value())
			.await?;
		Ok(())
	}

	/// The payload staged for `email`, left in place.
	#[tracing::instrument(skip(self), fields(email = %email))]
	pub async fn resolve(&self, email: &NormalizedEmail) -> Result<Option<WbUser>> {
		let value = self.store.get(PENDING_NAMESPACE, &email.pending_key()).await?;
		Ok(value.and_then(|value| {
			let wb_user = WbUser::from_value(value);
			if wb_user.is_none() {
				tracing::warn!("pending entry is not an object, ignoring");
			}
			wb_user
		}))
	}

	/// The staged entry for `email` including timestamps.
	#[tracing::instrument(skip(self), fields(email = %email))]
	pub async fn entry(&self, email: &NormalizedEmail) -> Result<Option<PendingSignup>> {
		let row = self
			.store
			.get_row(PENDING_NAMESPACE, &email.pending_key())
			.await?;
		Ok(row.and_then(PendingSignup::from_row))
	}

	/// Drop the entry for `email`. Returns `false` if there was none.
	#[tracing::instrument(skip(self), fields(email = %email))]
	pub async fn clear(&self, email: &NormalizedEmail) -> Result<bool> {
		Ok(self
			.store
			.remove(PENDING_NAMESPACE, &email.pending_key())
			.await?)
	}

	/// Every staged entry, ordered by email.
	#[tracing::instrument(skip(self))]
	pub async fn list(&self) -> Result<Vec<PendingSignup>> {
		let rows = self.store.list(PENDING_NAMESPACE, PENDING_KEY_PREFIX).await?;
		Ok(rows.into_iter().filter_map(PendingSignup::from_row).collect())
	}
}
