// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group repository for database operations.
//!
//! This module provides database access for:
//! - Group lookup and creation by unique name
//! - A user's group-name set
//! - Applying a planned membership change atomically

use async_trait::async_trait;
use chrono::Utc;
use insider_sync_core::{Group, GroupId, MembershipChange, UserId};
use sqlx::{sqlite::SqlitePool, Row, Sqlite, Transaction};
use std::collections::BTreeSet;

use crate::error::DbError;

#[async_trait]
pub trait GroupStore: Send + Sync {
	async fn get_group_by_name(&self, name: &str) -> Result<Option<Group>, DbError>;
	async fn group_names_for_user(&self, user_id: UserId) -> Result<BTreeSet<String>, DbError>;
	async fn apply_membership_change(
		&self,
		user_id: UserId,
		change: &MembershipChange,
	) -> Result<(), DbError>;
}

/// Repository for group database operations.
#[derive(Clone)]
pub struct GroupRepository {
	pool: SqlitePool,
}

impl GroupRepository {
	/// Create a new repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a group.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if a group with this name exists.
	#[tracing::instrument(skip(self))]
	pub async fn create_group(&self, name: &str) -> Result<Group, DbError> {
		let now = Utc::now().to_rfc3339();
		let result = sqlx::query("INSERT INTO user_groups (name, created_at) VALUES (?, ?)")
			.bind(name)
			.bind(&now)
			.execute(&self.pool)
			.await
			.map_err(|e| match e {
				sqlx::Error::Database(ref db) if db.is_unique_violation() => {
					DbError::Conflict(format!("group '{name}' already exists"))
				}
				other => DbError::Sqlx(other),
			})?;

		let group = Group {
			id: GroupId::new(result.last_insert_rowid()),
			name: name.to_string(),
		};

		tracing::debug!(group_id = %group.id, name = %group.name, "group created");
		Ok(group)
	}

	/// Get a group by its unique name.
	///
	/// # Returns
	/// `None` if no group has this name.
	#[tracing::instrument(skip(self))]
	pub async fn get_group_by_name(&self, name: &str) -> Result<Option<Group>, DbError> {
		let row = sqlx::query("SELECT id, name FROM user_groups WHERE name = ?")
			.bind(name)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|r| Group {
			id: GroupId::new(r.get("id")),
			name: r.get("name"),
		}))
	}

	/// Names of every group the user belongs to.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn group_names_for_user(&self, user_id: UserId) -> Result<BTreeSet<String>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT g.name
			FROM group_memberships gm
			JOIN user_groups g ON g.id = gm.group_id
			WHERE gm.user_id = ?
			"#,
		)
		.bind(user_id.get())
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(|r| r.get::<String, _>("name")).collect())
	}

	/// Apply a planned add/remove pair in a single transaction.
	///
	/// Either both mutations persist or neither does. Adding an existing
	/// member or removing a non-member is not an error.
	#[tracing::instrument(
		skip(self, change),
		fields(
			user_id = %user_id,
			add = ?change.add.as_ref().map(|g| &g.name),
			remove = ?change.remove.as_ref().map(|g| &g.name),
		)
	)]
	pub async fn apply_membership_change(
		&self,
		user_id: UserId,
		change: &MembershipChange,
	) -> Result<(), DbError> {
		if change.is_empty() {
			return Ok(());
		}

		let mut tx = self.pool.begin().await?;
		if let Some(group) = &change.remove {
			delete_membership(&mut tx, group.id, user_id).await?;
		}
		if let Some(group) = &change.add {
			insert_membership(&mut tx, group.id, user_id).await?;
		}
		tx.commit().await?;

		tracing::debug!(user_id = %user_id, "membership change committed");
		Ok(())
	}
}

async fn insert_membership(
	tx: &mut Transaction<'_, Sqlite>,
	group_id: GroupId,
	user_id: UserId,
) -> Result<(), DbError> {
	let now = Utc::now().to_rfc3339();
	let result = sqlx::query(
		r#"
		INSERT INTO group_memberships (group_id, user_id, created_at)
		VALUES (?, ?, ?)
		ON CONFLICT (group_id, user_id) DO NOTHING
		"#,
	)
	.bind(group_id.get())
	.bind(user_id.get())
	.bind(&now)
	.execute(&mut **tx)
	.await?;

	if result.rows_affected() > 0 {
		tracing::debug!(group_id = %group_id, user_id = %user_id, "member added to group");
	}
	Ok(())
}

async fn delete_membership(
	tx: &mut Transaction<'_, Sqlite>,
	group_id: GroupId,
	user_id: UserId,
) -> Result<(), DbError> {
	let result = sqlx::query("DELETE FROM group_memberships WHERE group_id = ? AND user_id = ?")
		.bind(group_id.get())
		.bind(user_id.get())
		.execute(&mut **tx)
		.await?;

	if result.rows_affected() > 0 {
		tracing::debug!(group_id = %group_id, user_id = %user_id, "member removed from group");
	}
	Ok(())
}

#[async_trait]
impl GroupStore for GroupRepository {
	async fn get_group_by_name(&self, name: &str) -> Result<Option<Group>, DbError> {
		self.get_group_by_name(name).await
	}

	async fn group_names_for_user(&self, user_id: UserId) -> Result<BTreeSet<String>, DbError> {
		self.group_names_for_user(user_id).await
	}

	async fn apply_membership_change(
		&self,
		user_id: UserId,
		change: &MembershipChange,
	) -> Result<(), DbError> {
		self.apply_membership_change(user_id, change).await
	}
}
