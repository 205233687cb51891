// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database schema.
//!
//! Statements are idempotent (`IF NOT EXISTS`) and run in order on startup.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

pub(crate) const CREATE_USERS: &str = r#"
	CREATE TABLE IF NOT EXISTS users (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		username TEXT NOT NULL UNIQUE,
		email TEXT UNIQUE COLLATE NOCASE,
		created_at TEXT NOT NULL
	)
"#;

pub(crate) const CREATE_USER_GROUPS: &str = r#"
	CREATE TABLE IF NOT EXISTS user_groups (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		name TEXT NOT NULL UNIQUE,
		created_at TEXT NOT NULL
	)
"#;

pub(crate) const CREATE_GROUP_MEMBERSHIPS: &str = r#"
	CREATE TABLE IF NOT EXISTS group_memberships (
		group_id INTEGER NOT NULL REFERENCES user_groups(id) ON DELETE CASCADE,
		user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
		created_at TEXT NOT NULL,
		PRIMARY KEY (group_id, user_id)
	)
"#;

pub(crate) const CREATE_GROUP_MEMBERSHIPS_USER_INDEX: &str =
	"CREATE INDEX IF NOT EXISTS idx_group_memberships_user_id ON group_memberships(user_id)";

pub(crate) const CREATE_PLUGIN_STORE_ROWS: &str = r#"
	CREATE TABLE IF NOT EXISTS plugin_store_rows (
		plugin_name TEXT NOT NULL,
		key TEXT NOT NULL,
		value TEXT NOT NULL,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL,
		PRIMARY KEY (plugin_name, key)
	)
"#;

const MIGRATIONS: &[&str] = &[
	CREATE_USERS,
	CREATE_USER_GROUPS,
	CREATE_GROUP_MEMBERSHIPS,
	CREATE_GROUP_MEMBERSHIPS_USER_INDEX,
	CREATE_PLUGIN_STORE_ROWS,
];

/// Create all tables and indexes if they do not exist yet.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for statement in MIGRATIONS {
		sqlx::query(statement).execute(pool).await?;
	}

	tracing::debug!(statements = MIGRATIONS.len(), "migrations applied");
	Ok(())
}
