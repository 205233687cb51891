// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subscription-driven insider group sync.
//!
//! This crate provides:
//! - [`GroupSync`]: the reconciler that moves a user into exactly one of the
//!   insider / non-insider groups
//! - [`PendingSignupCache`]: payloads parked for users who authenticated
//!   before their account existed
//! - [`GroupSyncHooks`]: the two host lifecycle hooks built on both
//!
//! Pure payload logic lives in `insider-sync-core`; storage in
//! `insider-sync-db`.

pub mod error;
pub mod hooks;
pub mod pending;
pub mod reconciler;

pub use error::{Result, SyncError};
pub use hooks::{
	AuthResult, AuthSyncOutcome, ExtraDataEnricher, GroupSyncHooks, PostAuthenticateHook,
	SignupSyncOutcome, TokenParams, UserCreatedHook, WbUserEnricher,
};
pub use pending::{PendingSignup, PendingSignupCache};
pub use reconciler::{GroupSync, SkipReason, SyncOutcome, SyncReport};
