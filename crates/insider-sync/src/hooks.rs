// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lifecycle hooks for the host identity framework.
//!
//! The host calls three narrow interfaces:
//! - [`ExtraDataEnricher`] while building the authentication record, to carry
//!   the provider user object along as `wb_user`
//! - [`PostAuthenticateHook`] once the authentication record exists
//! - [`UserCreatedHook`] after a local account is created
//!
//! [`GroupSyncHooks`] implements both hooks. When the user already exists the
//! sync runs at authentication time; otherwise the payload is staged and
//! replayed when the account is created.
//!
//! The hook trait methods never fail the host flow. Errors are logged and the
//! authentication result passes through untouched. Callers that want the
//! outcome use [`GroupSyncHooks::on_authenticated`] and
//! [`GroupSyncHooks::on_signup`] directly.
//!
//! # Example
//!
//! ```ignore
//! let hooks = GroupSyncHooks::new(Arc::new(sync), PendingSignupCache::new(store));
//! let result = hooks.after_authenticate(auth_result).await;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use insider_sync_core::{wb_user_from_extra, ExtraData, NormalizedEmail, User};
use serde::Serialize;

use crate::error::Result;
use crate::pending::PendingSignupCache;
use crate::reconciler::{GroupSync, SkipReason, SyncOutcome};

pub use insider_sync_core::{ExtraDataEnricher, TokenParams, WbUserEnricher};

/// The host's authentication record as seen by the hooks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthResult {
	/// Extra data produced by the OAuth2 strategy, enriched with `wb_user`.
	pub extra: ExtraData,
	/// The matched local account, if one exists yet.
	pub user: Option<User>,
}

/// Called after the host finishes authenticating a user.
#[async_trait]
pub trait PostAuthenticateHook: Send + Sync {
	async fn after_authenticate(&self, result: AuthResult) -> AuthResult;
}

/// Called after the host creates a local account.
#[async_trait]
pub trait UserCreatedHook: Send + Sync {
	async fn on_user_created(&self, user: &User);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AuthSyncOutcome {
	Skipped(SkipReason),
	/// The user existed and was reconciled.
	Synced(SyncOutcome),
	/// The user does not exist yet; the payload waits for signup.
	Staged { email: NormalizedEmail },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SignupSyncOutcome {
	Skipped(SkipReason),
	/// Nothing was staged for this email.
	NoPending,
	/// A staged payload was applied and cleared.
	Synced(SyncOutcome),
}

/// Insider group sync wired into the host lifecycle.
#[derive(Clone)]
pub struct GroupSyncHooks {
	sync: Arc<GroupSync>,
	pending: PendingSignupCache,
}

impl GroupSyncHooks {
	pub fn new(sync: Arc<GroupSync>, pending: PendingSignupCache) -> Self {
		Self { sync, pending }
	}

	pub fn pending(&self) -> &PendingSignupCache {
		&self.pending
	}

	/// Sync an existing user or stage the payload for a future signup.
	#[tracing::instrument(
		skip(self, result),
		fields(user_id = ?result.user.as_ref().map(|u| u.id.get()))
	)]
	pub async fn on_authenticated(&self, result: &AuthResult) -> Result<AuthSyncOutcome> {
		if !self.sync.is_enabled() {
			return Ok(AuthSyncOutcome::Skipped(SkipReason::Disabled));
		}

		let Some(wb_user) = wb_user_from_extra(&result.extra) else {
			if self.sync.is_verbose() {
				tracing::info!("no wb_user in authentication extra data, skipping");
			}
			return Ok(AuthSyncOutcome::Skipped(SkipReason::NoPayload));
		};

		if let Some(user) = &result.user {
			let outcome = self.sync.sync(user, &wb_user).await?;
			if self.sync.is_verbose() {
				tracing::info!(
					user_id = %user.id,
					username = %user.username,
					applied = outcome.is_applied(),
					"synced existing user after authentication"
				);
			}
			return Ok(AuthSyncOutcome::Synced(outcome));
		}

		let Some(email) = wb_user.login_name().and_then(NormalizedEmail::parse) else {
			if self.sync.is_verbose() {
				tracing::info!("user not created yet and payload has no loginName, skipping");
			}
			return Ok(AuthSyncOutcome::Skipped(SkipReason::NoEmail));
		};

		self.pending.stage(&email, &wb_user).await?;
		if self.sync.is_verbose() {
			tracing::info!(email = %email, "user not created yet, payload staged for signup");
		}
		Ok(AuthSyncOutcome::Staged { email })
	}

	/// Replay a staged payload for a freshly created account.
	///
	/// The staged entry is cleared whether or not the sync succeeds. A sync
	/// error takes precedence over a clear error.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn on_signup(&self, user: &User) -> Result<SignupSyncOutcome> {
		if !self.sync.is_enabled() {
			return Ok(SignupSyncOutcome::Skipped(SkipReason::Disabled));
		}

		let Some(email) = user.email.as_deref().and_then(NormalizedEmail::parse) else {
			return Ok(SignupSyncOutcome::Skipped(SkipReason::NoEmail));
		};

		let Some(wb_user) = self.pending.resolve(&email).await? else {
			return Ok(SignupSyncOutcome::NoPending);
		};

		if self.sync.is_verbose() {
			tracing::info!(email = %email, "found staged payload for new user");
		}

		let synced = self.sync.sync(user, &wb_user).await;
		let cleared = self.pending.clear(&email).await;

		let outcome = synced?;
		cleared?;
		if self.sync.is_verbose() {
			tracing::info!(
				user_id = %user.id,
				email = %email,
				applied = outcome.is_applied(),
				"applied staged payload after signup"
			);
		}
		Ok(SignupSyncOutcome::Synced(outcome))
	}
}

#[async_trait]
impl PostAuthenticateHook for GroupSyncHooks {
	async fn after_authenticate(&self, result: AuthResult) -> AuthResult {
		match self.on_authenticated(&result).await {
			Ok(outcome) => tracing::debug!(?outcome, "post-authenticate group sync finished"),
			Err(e) => tracing::warn!(error = %e, "post-authenticate group sync failed"),
		}
		result
	}
}

#[async_trait]
impl UserCreatedHook for GroupSyncHooks {
	async fn on_user_created(&self, user: &User) {
		match self.on_signup(user).await {
			Ok(outcome) => tracing::debug!(?outcome, "signup group sync finished"),
			Err(e) => tracing::warn!(user_id = %user.id, error = %e, "signup group sync failed"),
		}
	}
}
