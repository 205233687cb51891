// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository.
//!
//! Only what the operator tooling needs: create a user and look one up by
//! username. The sync engine itself takes users as plain values.

use chrono::Utc;
use insider_sync_core::{User, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a new user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the username or email is taken.
	#[tracing::instrument(skip(self, email), fields(username = %username))]
	pub async fn create_user(&self, username: &str, email: Option<&str>) -> Result<User, DbError> {
		let now = Utc::now().to_rfc3339();
		let result = sqlx::query(
			r#"
			INSERT INTO users (username, email, created_at)
			VALUES (?, ?, ?)
			"#,
		)
		.bind(username)
		.bind(email)
		.bind(&now)
		.execute(&self.pool)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref db) if db.is_unique_violation() => {
				DbError::Conflict(format!("user '{username}' or their email already exists"))
			}
			other => DbError::Sqlx(other),
		})?;

		let user = User {
			id: UserId::new(result.last_insert_rowid()),
			username: username.to_string(),
			email: email.map(str::to_string),
		};

		tracing::debug!(user_id = %user.id, "user created");
		Ok(user)
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query("SELECT id, username, email FROM users WHERE username = ?")
			.bind(username)
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|r| row_to_user(&r)))
	}
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
	User {
		id: UserId::new(row.get("id")),
		username: row.get("username"),
		email: row.get("email"),
	}
}
