// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command handlers. Results are printed to stdout as JSON or plain lines.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use insider_sync::{AuthResult, GroupSync, GroupSyncHooks, PendingSignupCache};
use insider_sync_config::InsiderSyncConfig;
use insider_sync_core::{
	ExtraDataEnricher, NormalizedEmail, TokenParams, User, WbUser, WbUserEnricher,
};
use insider_sync_db::{
	create_pool, run_migrations, GroupRepository, PluginStoreRepository, UserRepository,
};
use serde_json::{Map, Value};
use tracing::{info, instrument};

/// Wired-up stores and services for one CLI invocation.
pub struct App {
	config: InsiderSyncConfig,
	users: UserRepository,
	groups: GroupRepository,
	sync: Arc<GroupSync>,
	hooks: GroupSyncHooks,
}

impl App {
	/// Connect to the configured database and apply migrations.
	pub async fn open(config: InsiderSyncConfig) -> Result<Self> {
		let pool = create_pool(&config.database.url)
			.await
			.with_context(|| format!("opening database {}", config.database.url))?;
		run_migrations(&pool).await.context("running migrations")?;

		let groups = GroupRepository::new(pool.clone());
		let sync = Arc::new(GroupSync::new(
			Arc::new(groups.clone()),
			config.sync.clone(),
		));
		let pending = PendingSignupCache::new(Arc::new(PluginStoreRepository::new(pool.clone())));

		Ok(Self {
			users: UserRepository::new(pool),
			hooks: GroupSyncHooks::new(sync.clone(), pending),
			groups,
			sync,
			config,
		})
	}

	async fn user_by_username(&self, username: &str) -> Result<User> {
		self
			.users
			.get_user_by_username(username)
			.await?
			.ok_or_else(|| anyhow!("no user named '{username}'"))
	}

	fn pending(&self) -> &PendingSignupCache {
		self.hooks.pending()
	}
}

pub fn migrate(app: &App) -> Result<()> {
	info!(database = %app.config.database.url, "migrations applied");
	println!("database schema is up to date");
	Ok(())
}

#[instrument(skip(app))]
pub async fn ensure_groups(app: &App) -> Result<()> {
	let names = app.config.sync.groups();
	for name in [&names.insider, &names.non_insider] {
		if app.groups.get_group_by_name(name).await?.is_some() {
			println!("{name}: exists");
		} else {
			let group = app.groups.create_group(name).await?;
			println!("{name}: created (id={})", group.id);
		}
	}
	Ok(())
}

#[instrument(skip(app, payload))]
pub async fn sync(app: &App, username: &str, payload: &Path) -> Result<()> {
	let user = app.user_by_username(username).await?;
	let wb_user = WbUser::from_value(Value::Object(read_json_object(payload)?))
		.ok_or_else(|| anyhow!("payload must be a JSON object"))?;

	let outcome = app.sync.sync(&user, &wb_user).await?;
	print_json(&outcome)
}

#[instrument(skip(app, token_params))]
pub async fn authenticate(app: &App, token_params: &Path, username: Option<&str>) -> Result<()> {
	let params: TokenParams = read_json_object(token_params)?;
	let user = match username {
		Some(username) => Some(app.user_by_username(username).await?),
		None => None,
	};

	let enricher = WbUserEnricher::new(app.config.sync.verbose);
	let result = AuthResult {
		extra: enricher.enrich(None, &params),
		user,
	};

	let outcome = app.hooks.on_authenticated(&result).await?;
	print_json(&outcome)
}

#[instrument(skip(app, email))]
pub async fn signup(app: &App, username: &str, email: &str) -> Result<()> {
	let user = app.users.create_user(username, Some(email.trim())).await?;
	info!(user_id = %user.id, "user created");

	let outcome = app.hooks.on_signup(&user).await?;
	print_json(&outcome)
}

pub async fn pending_list(app: &App) -> Result<()> {
	let entries = app.pending().list().await?;
	if entries.is_empty() {
		println!("no pending signups");
		return Ok(());
	}

	for entry in entries {
		println!(
			"{}\tstaged {}\tupdated {}",
			entry.email,
			entry.staged_at.to_rfc3339(),
			entry.updated_at.to_rfc3339()
		);
	}
	Ok(())
}

pub async fn pending_show(app: &App, email: &str) -> Result<()> {
	let email = parse_email(email)?;
	match app.pending().entry(&email).await? {
		Some(entry) => print_json(&entry),
		None => {
			println!("no pending signup for {email}");
			Ok(())
		}
	}
}

pub async fn pending_clear(app: &App, email: &str) -> Result<()> {
	let email = parse_email(email)?;
	if app.pending().clear(&email).await? {
		info!(email = %email, "pending signup cleared");
		println!("cleared pending signup for {email}");
	} else {
		println!("no pending signup for {email}");
	}
	Ok(())
}

fn parse_email(raw: &str) -> Result<NormalizedEmail> {
	NormalizedEmail::parse(raw).ok_or_else(|| anyhow!("email must not be blank"))
}

fn read_json_object(path: &Path) -> Result<Map<String, Value>> {
	let raw =
		std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
	match serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))? {
		Value::Object(map) => Ok(map),
		_ => bail!("{} must contain a JSON object", path.display()),
	}
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
