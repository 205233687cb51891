// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types and pure logic for insider group sync.
//!
//! This crate provides:
//! - [`payload`]: a lenient typed view over the provider's subscription payload
//! - [`evaluate`]: the active/inactive decision
//! - [`extract`]: pulling the provider user object out of a token response
//! - [`email`]: email normalization and the pending-signup key policy
//! - [`membership`]: the minimal add/remove plan for a decision
//! - [`audit`]: the before/after record of a sync
//!
//! Nothing here performs I/O; stores live in `insider-sync-db` and the
//! reconciler in `insider-sync`.

pub mod audit;
pub mod email;
pub mod evaluate;
pub mod extract;
pub mod membership;
pub mod payload;
pub mod types;

pub use audit::{format_group_list, SyncAudit};
pub use email::{NormalizedEmail, PENDING_KEY_PREFIX, PENDING_NAMESPACE};
pub use evaluate::{is_active, is_active_value, ACTIVE_STATUS};
pub use extract::{
	enrich_extra, extract_wb_user, wb_user_from_extra, ExtraData, ExtraDataEnricher, TokenParams,
	WbUserEnricher, WB_USER_KEY,
};
pub use membership::{plan_membership_change, MembershipChange};
pub use payload::{StatusValue, SubscriptionEntry, SubscriptionPayload, WbUser};
pub use types::{Group, GroupId, SyncGroups, User, UserId, INSIDER_GROUP, NON_INSIDER_GROUP};
