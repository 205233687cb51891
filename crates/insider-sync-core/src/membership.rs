// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Minimal membership diff between a user's current groups and the target
//! insider / non-insider assignment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::Group;

/// Add/remove operations needed to reach the target assignment.
///
/// At most one add and one remove; both `None` means the user is already in
/// the desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipChange {
	pub add: Option<Group>,
	pub remove: Option<Group>,
}

impl MembershipChange {
	pub fn is_empty(&self) -> bool {
		self.add.is_none() && self.remove.is_none()
	}

	/// Number of membership mutations this change performs.
	pub fn operation_count(&self) -> usize {
		usize::from(self.add.is_some()) + usize::from(self.remove.is_some())
	}
}

/// Plans the change that puts the user in exactly the target group.
///
/// `active` selects `insider` as the target, otherwise `non_insider`. The
/// target is added only when missing and the other group is removed only when
/// present.
pub fn plan_membership_change(
	current: &BTreeSet<String>,
	insider: &Group,
	non_insider: &Group,
	active: bool,
) -> MembershipChange {
	let (target, other) = if active {
		(insider, non_insider)
	} else {
		(non_insider, insider)
	};

	MembershipChange {
		add: (!current.contains(&target.name)).then(|| target.clone()),
		remove: current.contains(&other.name).then(|| other.clone()),
	}
}
