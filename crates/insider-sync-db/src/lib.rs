// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for insider group sync.
//!
//! Repositories are cheap `Clone` handles over a [`sqlx::SqlitePool`]. The
//! sync engine depends on two `async_trait` store traits:
//! - [`GroupStore`]: group lookup, a user's groups and atomic membership changes
//! - [`PluginStore`]: namespaced JSON key/value rows
//!
//! [`UserRepository`] is concrete; only operator tooling creates users.

pub mod error;
pub mod group;
pub mod plugin_store;
pub mod pool;
pub mod schema;
pub mod user;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{DbError, Result};
pub use group::{GroupRepository, GroupStore};
pub use plugin_store::{PluginStore, PluginStoreRepository, PluginStoreRow};
pub use pool::create_pool;
pub use schema::run_migrations;
pub use user::UserRepository;
