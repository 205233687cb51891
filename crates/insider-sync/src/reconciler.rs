// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group reconciler.
//!
//! [`GroupSync`] moves a user into exactly one of the insider / non-insider
//! groups based on the subscription status in their provider payload. It holds
//! no per-user state and is built once, then shared behind an `Arc`.
//!
//! A sync is a minimal diff: the target group is added only if missing and
//! the other group removed only if present. Both mutations commit in one
//! store transaction, so a failure never leaves the user half-moved.

use std::collections::BTreeSet;
use std::sync::Arc;

use insider_sync_config::SyncConfig;
use insider_sync_core::{
	format_group_list, is_active, plan_membership_change, MembershipChange, SyncAudit, User, WbUser,
};
use insider_sync_db::GroupStore;
use serde::Serialize;

use crate::error::Result;

/// Why a sync did not touch the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
	/// The feature switch is off.
	Disabled,
	/// One or both target groups do not exist. `true` marks a missing group.
	GroupsMissing { insider: bool, non_insider: bool },
	/// The authentication carried no provider user object.
	NoPayload,
	/// No usable email to key a pending signup on.
	NoEmail,
}

/// What an applied sync did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
	pub change: MembershipChange,
	pub audit: SyncAudit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
	Skipped(SkipReason),
	Applied(SyncReport),
}

impl SyncOutcome {
	pub fn is_applied(&self) -> bool {
		matches!(self, SyncOutcome::Applied(_))
	}

	pub fn report(&self) -> Option<&SyncReport> {
		match self {
			SyncOutcome::Applied(report) => Some(report),
			SyncOutcome::Skipped(_) => None,
		}
	}
}

/// Subscription-driven group reconciler.
pub struct GroupSync {
	groups: Arc<dyn GroupStore>,
	config: SyncConfig,
}

impl GroupSync {
	pub fn new(groups: Arc<dyn GroupStore>, config: SyncConfig) -> Self {
		Self { groups, config }
	}

	pub fn config(&self) -> &SyncConfig {
		&self.config
	}

	pub fn is_enabled(&self) -> bool {
		self.config.enabled
	}

	pub fn is_verbose(&self) -> bool {
		self.config.verbose
	}

	/// Reconcile `user`'s insider / non-insider membership with `wb_user`.
	///
	/// # Errors
	/// Returns `SyncError::Database` if a store call fails. The membership
	/// change is transactional, so nothing is half-applied.
	#[tracing::instrument(skip(self, user, wb_user), fields(user_id = %user.id))]
	pub async fn sync(&self, user: &User, wb_user: &WbUser) -> Result<SyncOutcome> {
		if !self.config.enabled {
			return Ok(SyncOutcome::Skipped(SkipReason::Disabled));
		}

		let names = self.config.groups();
		let insider = self.groups.get_group_by_name(&names.insider).await?;
		let non_insider = self.groups.get_group_by_name(&names.non_insider).await?;

		let (insider, non_insider) = match (insider, non_insider) {
			(Some(insider), Some(non_insider)) => (insider, non_insider),
			(insider, non_insider) => {
				if self.config.verbose {
					let existing: BTreeSet<String> = insider
						.iter()
						.chain(non_insider.iter())
						.map(|g| g.name.clone())
						.collect();
					tracing::info!(
						insider_group = %names.insider,
						non_insider_group = %names.non_insider,
						existing = %format_group_list(&existing),
						"sync groups missing, skipping"
					);
				}
				return Ok(SyncOutcome::Skipped(SkipReason::GroupsMissing {
					insider: insider.is_none(),
					non_insider: non_insider.is_none(),
				}));
			}
		};

		let active = is_active(&wb_user.subscriptions());
		let before = self.groups.group_names_for_user(user.id).await?;
		let change = plan_membership_change(&before, &insider, &non_insider, active);

		let after = if change.is_empty() {
			before.clone()
		} else {
			self.groups.apply_membership_change(user.id, &change).await?;
			self.groups.group_names_for_user(user.id).await?
		};

		let audit = SyncAudit::new(user, active, before, after);
		if self.config.verbose {
			let added: BTreeSet<String> = audit.added().cloned().collect();
			let removed: BTreeSet<String> = audit.removed().cloned().collect();
			tracing::info!(
				user_id = %audit.user_id,
				active = audit.active,
				operations = change.operation_count(),
				added = %format_group_list(&added),
				removed = %format_group_list(&removed),
				"{audit}"
			);
		}

		Ok(SyncOutcome::Applied(SyncReport { change, audit }))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::SyncError;
	use async_trait::async_trait;
	use insider_sync_core::{Group, GroupId, UserId};
	use insider_sync_db::testing::create_migrated_test_pool;
	use insider_sync_db::{DbError, GroupRepository, UserRepository};
	use serde_json::json;

	fn enabled() -> SyncConfig {
		SyncConfig {
			enabled: true,
			..Default::default()
		}
	}

	fn wb_user(value: serde_json::Value) -> WbUser {
		WbUser::from_value(value).unwrap()
	}

	fn active_payload() -> WbUser {
		wb_user(json!({"loginName": "a@x.com", "subscriptions": {"insider": [{"status": 1}]}}))
	}

	fn inactive_payload() -> WbUser {
		wb_user(json!({"loginName": "a@x.com", "subscriptions": {"insider": [{"status": 0}]}}))
	}

	fn names(list: &[&str]) -> BTreeSet<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	struct Fixture {
		groups: GroupRepository,
		user: User,
	}

	async fn fixture(create_groups: &[&str]) -> Fixture {
		let pool = create_migrated_test_pool().await;
		let groups = GroupRepository::new(pool.clone());
		for name in create_groups {
			groups.create_group(name).await.unwrap();
		}
		let user = UserRepository::new(pool)
			.create_user("alice", Some("a@x.com"))
			.await
			.unwrap();
		Fixture { groups, user }
	}

	fn reconciler(f: &Fixture, config: SyncConfig) -> GroupSync {
		GroupSync::new(Arc::new(f.groups.clone()), config)
	}

	#[tokio::test]
	async fn test_active_user_joins_insider() {
		let f = fixture(&["insider", "non-insider"]).await;
		let outcome = reconciler(&f, enabled())
			.sync(&f.user, &active_payload())
			.await
			.unwrap();

		let report = outcome.report().unwrap();
		assert!(report.audit.active);
		assert_eq!(report.audit.before, names(&[]));
		assert_eq!(report.audit.after, names(&["insider"]));
		assert_eq!(
			f.groups.group_names_for_user(f.user.id).await.unwrap(),
			names(&["insider"])
		);
	}

	#[tokio::test]
	async fn test_lapsed_insider_moves_to_non_insider() {
		let f = fixture(&["insider", "non-insider", "staff"]).await;
		let insider = f.groups.get_group_by_name("insider").await.unwrap().unwrap();
		let staff = f.groups.get_group_by_name("staff").await.unwrap().unwrap();
		for group in [insider, staff] {
			let change = MembershipChange {
				add: Some(group),
				remove: None,
			};
			f.groups.apply_membership_change(f.user.id, &change).await.unwrap();
		}

		let outcome = reconciler(&f, enabled())
			.sync(&f.user, &inactive_payload())
			.await
			.unwrap();

		let report = outcome.report().unwrap();
		assert_eq!(report.change.operation_count(), 2);
		assert_eq!(report.audit.after, names(&["non-insider", "staff"]));
		assert_eq!(report.audit.added().collect::<Vec<_>>(), vec!["non-insider"]);
		assert_eq!(report.audit.removed().collect::<Vec<_>>(), vec!["insider"]);
	}

	#[tokio::test]
	async fn test_second_sync_is_a_noop() {
		let f = fixture(&["insider", "non-insider"]).await;
		let sync = reconciler(&f, enabled());

		sync.sync(&f.user, &active_payload()).await.unwrap();
		let outcome = sync.sync(&f.user, &active_payload()).await.unwrap();

		let report = outcome.report().unwrap();
		assert!(report.change.is_empty());
		assert!(!report.audit.changed());
	}

	#[tokio::test]
	async fn test_malformed_payload_is_inactive() {
		let f = fixture(&["insider", "non-insider"]).await;
		let payload = wb_user(json!({"subscriptions": {"insider": "yes"}}));

		let outcome = reconciler(&f, enabled()).sync(&f.user, &payload).await.unwrap();
		assert_eq!(outcome.report().unwrap().audit.after, names(&["non-insider"]));
	}

	#[tokio::test]
	async fn test_disabled_never_touches_store() {
		let f = fixture(&["insider", "non-insider"]).await;
		let outcome = reconciler(&f, SyncConfig::default())
			.sync(&f.user, &active_payload())
			.await
			.unwrap();

		assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::Disabled));
		assert!(f.groups.group_names_for_user(f.user.id).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_missing_group_skips_without_mutation() {
		let f = fixture(&["insider"]).await;
		let outcome = reconciler(&f, enabled())
			.sync(&f.user, &active_payload())
			.await
			.unwrap();

		assert_eq!(
			outcome,
			SyncOutcome::Skipped(SkipReason::GroupsMissing {
				insider: false,
				non_insider: true,
			})
		);
		assert!(f.groups.group_names_for_user(f.user.id).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_configured_group_names_are_used() {
		let f = fixture(&["subscribers", "free"]).await;
		let config = SyncConfig {
			enabled: true,
			verbose: true,
			insider_group: "subscribers".to_string(),
			non_insider_group: "free".to_string(),
		};

		reconciler(&f, config)
			.sync(&f.user, &inactive_payload())
			.await
			.unwrap();
		assert_eq!(
			f.groups.group_names_for_user(f.user.id).await.unwrap(),
			names(&["free"])
		);
	}

	struct BrokenGroupStore;

	#[async_trait]
	impl GroupStore for BrokenGroupStore {
		async fn get_group_by_name(&self, name: &str) -> std::result::Result<Option<Group>, DbError> {
			let id = if name == "insider" { 1 } else { 2 };
			Ok(Some(Group {
				id: GroupId::new(id),
				name: name.to_string(),
			}))
		}

		async fn group_names_for_user(
			&self,
			_user_id: UserId,
		) -> std::result::Result<BTreeSet<String>, DbError> {
			Ok(BTreeSet::new())
		}

		async fn apply_membership_change(
			&self,
			_user_id: UserId,
			_change: &MembershipChange,
		) -> std::result::Result<(), DbError> {
			Err(DbError::Internal("unavailable".to_string()))
		}
	}

	#[tokio::test]
	async fn test_store_failure_propagates() {
		let sync = GroupSync::new(Arc::new(BrokenGroupStore), enabled());
		let user = User {
			id: UserId::new(7),
			username: "alice".to_string(),
			email: None,
		};

		let err = sync.sync(&user, &active_payload()).await.unwrap_err();
		assert!(matches!(err, SyncError::Database(DbError::Internal(_))));
	}
}
