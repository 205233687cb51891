// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Namespaced key/value store for plugin state.
//!
//! Values are JSON documents. Each `(namespace, key)` pair holds at most one
//! value; `set` overwrites and bumps `updated_at` while keeping `created_at`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

/// A stored value with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginStoreRow {
	pub namespace: String,
	pub key: String,
	pub value: Value,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait PluginStore: Send + Sync {
	async fn set(&self, namespace: &str, key: &str, value: &Value) -> Result<(), DbError>;
	async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, DbError>;
	async fn get_row(&self, namespace: &str, key: &str) -> Result<Option<PluginStoreRow>, DbError>;
	async fn remove(&self, namespace: &str, key: &str) -> Result<bool, DbError>;
	async fn list(&self, namespace: &str, prefix: &str) -> Result<Vec<PluginStoreRow>, DbError>;
}

/// Repository for plugin store rows.
#[derive(Clone)]
pub struct PluginStoreRepository {
	pool: SqlitePool,
}

impl PluginStoreRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert or overwrite the value at `(namespace, key)`.
	#[tracing::instrument(skip(self, value))]
	pub async fn set(&self, namespace: &str, key: &str, value: &Value) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		let encoded = serde_json::to_string(value)?;

		sqlx::query(
			r#"
			INSERT INTO plugin_store_rows (plugin_name, key, value, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?)
			ON CONFLICT (plugin_name, key) DO UPDATE SET
				value = excluded.value,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(namespace)
		.bind(key)
		.bind(&encoded)
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		tracing::debug!(namespace, key, "plugin store value set");
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, DbError> {
		Ok(self.get_row(namespace, key).await?.map(|row| row.value))
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_row(
		&self,
		namespace: &str,
		key: &str,
	) -> Result<Option<PluginStoreRow>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT plugin_name, key, value, created_at, updated_at
			FROM plugin_store_rows
			WHERE plugin_name = ? AND key = ?
			"#,
		)
		.bind(namespace)
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_entry(&r)).transpose()
	}

	/// Delete the value at `(namespace, key)`.
	///
	/// # Returns
	/// `false` if nothing was stored there.
	#[tracing::instrument(skip(self))]
	pub async fn remove(&self, namespace: &str, key: &str) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM plugin_store_rows WHERE plugin_name = ? AND key = ?")
			.bind(namespace)
			.bind(key)
			.execute(&self.pool)
			.await?;

		let removed = result.rows_affected() > 0;
		if removed {
			tracing::debug!(namespace, key, "plugin store value removed");
		}
		Ok(removed)
	}

	/// Rows in `namespace` whose key starts with `prefix`, ordered by key.
	///
	/// The prefix is matched literally; `%` and `_` carry no meaning.
	#[tracing::instrument(skip(self))]
	pub async fn list(&self, namespace: &str, prefix: &str) -> Result<Vec<PluginStoreRow>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT plugin_name, key, value, created_at, updated_at
			FROM plugin_store_rows
			WHERE plugin_name = ? AND substr(key, 1, length(?)) = ?
			ORDER BY key
			"#,
		)
		.bind(namespace)
		.bind(prefix)
		.bind(prefix)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_entry).collect()
	}
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<PluginStoreRow, DbError> {
	let value: String = row.get("value");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(PluginStoreRow {
		namespace: row.get("plugin_name"),
		key: row.get("key"),
		value: serde_json::from_str(&value)?,
		created_at: DateTime::parse_from_rfc3339(&created_at)
			.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
			.with_timezone(&Utc),
		updated_at: DateTime::parse_from_rfc3339(&updated_at)
			.map_err(|e| DbError::Internal(format!("Invalid updated_at: {e}")))?
			.with_timezone(&Utc),
	})
}

#[async_trait]
impl PluginStore for PluginStoreRepository {
	async fn set(&self, namespace: &str, key: &str, value: &Value) -> Result<(), DbError> {
		self.set(namespace, key, value).await
	}

	async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, DbError> {
		self.get(namespace, key).await
	}

	async fn get_row(&self, namespace: &str, key: &str) -> Result<Option<PluginStoreRow>, DbError> {
		self.get_row(namespace, key).await
	}

	async fn remove(&self, namespace: &str, key: &str) -> Result<bool, DbError> {
		self.remove(namespace, key).await
	}

	async fn list(&self, namespace: &str, prefix: &str) -> Result<Vec<PluginStoreRow>, DbError> {
		self.list(namespace, prefix).await
	}
}
