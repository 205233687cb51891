// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end deferred signup flow: authenticate before the account exists,
//! then create the account and let the staged payload drive group sync.

use std::collections::BTreeSet;
use std::sync::Arc;

use insider_sync::{
	AuthResult, AuthSyncOutcome, ExtraDataEnricher, GroupSync, GroupSyncHooks, PendingSignupCache,
	PostAuthenticateHook, SignupSyncOutcome, SkipReason, SyncOutcome, UserCreatedHook,
	WbUserEnricher,
};
use insider_sync_config::SyncConfig;
use insider_sync_core::{NormalizedEmail, TokenParams};
use insider_sync_db::testing::create_migrated_test_pool;
use insider_sync_db::{GroupRepository, PluginStoreRepository, UserRepository};
use serde_json::{json, Value};

struct Host {
	hooks: GroupSyncHooks,
	groups: GroupRepository,
	users: UserRepository,
	enricher: WbUserEnricher,
}

async fn host(config: SyncConfig, create_groups: bool) -> Host {
	let pool = create_migrated_test_pool().await;
	let groups = GroupRepository::new(pool.clone());
	if create_groups {
		groups.create_group(&config.insider_group).await.unwrap();
		groups.create_group(&config.non_insider_group).await.unwrap();
	}

	let enricher = WbUserEnricher::new(config.verbose);
	let sync = Arc::new(GroupSync::new(Arc::new(groups.clone()), config));
	let pending = PendingSignupCache::new(Arc::new(PluginStoreRepository::new(pool.clone())));

	Host {
		hooks: GroupSyncHooks::new(sync, pending),
		groups,
		users: UserRepository::new(pool),
		enricher,
	}
}

fn enabled() -> SyncConfig {
	SyncConfig {
		enabled: true,
		verbose: true,
		..Default::default()
	}
}

fn token_params(login: &str, status: Value) -> TokenParams {
	match json!({
		"access_token": "token",
		"token_type": "bearer",
		"user": {
			"loginName": login,
			"displayName": "Someone",
			"subscriptions": {"insider": [{"status": status}]}
		}
	}) {
		Value::Object(map) => map,
		_ => unreachable!(),
	}
}

fn names(list: &[&str]) -> BTreeSet<String> {
	list.iter().map(|s| s.to_string()).collect()
}

impl Host {
	fn auth_result(&self, params: &TokenParams) -> AuthResult {
		let mut base = serde_json::Map::new();
		base.insert("provider".to_string(), json!("wb"));
		AuthResult {
			extra: self.enricher.enrich(Some(base), params),
			user: None,
		}
	}
}

#[tokio::test]
async fn test_deferred_signup_resolves_by_normalized_email() {
	let host = host(enabled(), true).await;
	let auth = host.auth_result(&token_params("E@X.com", json!(1)));
	assert_eq!(auth.extra.get("provider"), Some(&json!("wb")));

	let outcome = host.hooks.on_authenticated(&auth).await.unwrap();
	let email = NormalizedEmail::parse("e@x.com").unwrap();
	assert_eq!(outcome, AuthSyncOutcome::Staged { email: email.clone() });

	let user = host.users.create_user("e", Some("e@x.com")).await.unwrap();
	let outcome = host.hooks.on_signup(&user).await.unwrap();
	let SignupSyncOutcome::Synced(SyncOutcome::Applied(report)) = outcome else {
		panic!("expected an applied sync");
	};
	assert!(report.audit.active);

	assert_eq!(
		host.groups.group_names_for_user(user.id).await.unwrap(),
		names(&["insider"])
	);
	assert_eq!(host.hooks.pending().resolve(&email).await.unwrap(), None);
}

#[tokio::test]
async fn test_hook_traits_drive_the_same_flow() {
	let host = host(enabled(), true).await;
	let auth = host.auth_result(&token_params("late@x.com", json!("0")));

	let returned = host.hooks.after_authenticate(auth.clone()).await;
	assert_eq!(returned, auth);

	let user = host.users.create_user("late", Some("Late@X.com")).await.unwrap();
	host.hooks.on_user_created(&user).await;

	assert_eq!(
		host.groups.group_names_for_user(user.id).await.unwrap(),
		names(&["non-insider"])
	);
	assert!(host.hooks.pending().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_later_authentication_overwrites_staged_payload() {
	let host = host(enabled(), true).await;
	host.hooks
		.on_authenticated(&host.auth_result(&token_params("e@x.com", json!(0))))
		.await
		.unwrap();
	host.hooks
		.on_authenticated(&host.auth_result(&token_params("E@X.COM", json!(1))))
		.await
		.unwrap();

	let user = host.users.create_user("e", Some("e@x.com")).await.unwrap();
	host.hooks.on_signup(&user).await.unwrap();

	assert_eq!(
		host.groups.group_names_for_user(user.id).await.unwrap(),
		names(&["insider"])
	);
}

#[tokio::test]
async fn test_returning_user_flips_groups_idempotently() {
	let host = host(enabled(), true).await;
	let user = host.users.create_user("r", Some("r@x.com")).await.unwrap();

	for (status, expected) in [(json!(1), "insider"), (json!(1), "insider"), (json!(2), "non-insider")] {
		let mut auth = host.auth_result(&token_params("r@x.com", status));
		auth.user = Some(user.clone());
		host.hooks.on_authenticated(&auth).await.unwrap();

		assert_eq!(
			host.groups.group_names_for_user(user.id).await.unwrap(),
			names(&[expected])
		);
	}
}

#[tokio::test]
async fn test_disabled_feature_stages_nothing() {
	let host = host(SyncConfig::default(), true).await;
	let auth = host.auth_result(&token_params("e@x.com", json!(1)));

	let outcome = host.hooks.on_authenticated(&auth).await.unwrap();
	assert_eq!(outcome, AuthSyncOutcome::Skipped(SkipReason::Disabled));
	assert!(host.hooks.pending().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_groups_still_clear_the_pending_entry() {
	let host = host(enabled(), false).await;
	host.hooks
		.on_authenticated(&host.auth_result(&token_params("e@x.com", json!(1))))
		.await
		.unwrap();

	let user = host.users.create_user("e", Some("e@x.com")).await.unwrap();
	let outcome = host.hooks.on_signup(&user).await.unwrap();

	assert_eq!(
		outcome,
		SignupSyncOutcome::Synced(SyncOutcome::Skipped(SkipReason::GroupsMissing {
			insider: true,
			non_insider: true,
		}))
	);
	assert!(host.groups.group_names_for_user(user.id).await.unwrap().is_empty());
	assert!(host.hooks.pending().list().await.unwrap().is_empty());
}
