// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subscription evaluation.
//!
//! A subscription is active iff the first entry of the `insider` list has a
//! status that converts to exactly 1. Malformed payloads are inactive; this
//! module never errors.

use serde_json::Value;

use crate::payload::SubscriptionPayload;

/// The status value that marks an active subscription.
pub const ACTIVE_STATUS: i64 = 1;

/// Returns true iff the first insider entry has status 1.
pub fn is_active(subscriptions: &SubscriptionPayload) -> bool {
	subscriptions
		.first_entry()
		.and_then(|entry| entry.status.as_ref())
		.is_some_and(|status| status.to_integer() == ACTIVE_STATUS)
}

/// Evaluates a raw `subscriptions` value.
pub fn is_active_value(subscriptions: &Value) -> bool {
	is_active(&SubscriptionPayload::from_value(subscriptions))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_integer_one_is_active() {
		assert!(is_active_value(&json!({"insider": [{"status": 1}]})));
	}

	#[test]
	fn test_string_one_is_active() {
		assert!(is_active_value(&json!({"insider": [{"status": "1"}]})));
	}

	#[test]
	fn test_other_statuses_are_inactive() {
		assert!(!is_active_value(&json!({"insider": [{"status": 2}]})));
		assert!(!is_active_value(&json!({"insider": [{"status": 0}]})));
		assert!(!is_active_value(&json!({"insider": [{"status": "active"}]})));
		assert!(!is_active_value(&json!({"insider": [{"status": null}]})));
		assert!(!is_active_value(&json!({"insider": [{"status": true}]})));
	}

	#[test]
	fn test_empty_object_is_inactive() {
		assert!(!is_active_value(&json!({})));
	}

	#[test]
	fn test_non_object_is_inactive() {
		assert!(!is_active_value(&Value::Null));
		assert!(!is_active_value(&json!([{"status": 1}])));
		assert!(!is_active_value(&json!("insider")));
	}

	#[test]
	fn test_missing_or_malformed_insider_list_is_inactive() {
		assert!(!is_active_value(&json!({"insider": []})));
		assert!(!is_active_value(&json!({"insider": {"status": 1}})));
		assert!(!is_active_value(&json!({"insider": "1"})));
		assert!(!is_active_value(&json!({"other": [{"status": 1}]})));
	}

	#[test]
	fn test_only_first_entry_counts() {
		assert!(!is_active_value(&json!({"insider": [{"status": 0}, {"status": 1}]})));
		assert!(is_active_value(&json!({"insider": [{"status": 1}, {"status": 0}]})));
	}

	#[test]
	fn test_first_entry_without_status_is_inactive() {
		assert!(!is_active_value(&json!({"insider": [{}]})));
		assert!(!is_active_value(&json!({"insider": [1]})));
		assert!(!is_active_value(&json!({"insider": [[{"status": 1}]]})));
	}

	fn arb_key() -> impl Strategy<Value = String> {
		prop_oneof![
			Just("insider".to_string()),
			Just("status".to_string()),
			"[a-z]{1,6}",
		]
	}

	fn arb_json() -> impl Strategy<Value = Value> {
		let leaf = prop_oneof![
			Just(Value::Null),
			any::<bool>().prop_map(Value::Bool),
			any::<i64>().prop_map(|i| json!(i)),
			"[ 0-9a-z._+-]{0,8}".prop_map(Value::String),
		];
		leaf.prop_recursive(4, 32, 4, |inner| {
			prop_oneof![
				prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
				prop::collection::vec((arb_key(), inner), 0..4)
					.prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
			]
		})
	}

	proptest! {
		#[test]
		fn test_never_panics_on_arbitrary_json(value in arb_json()) {
			let _ = is_active_value(&value);
		}

		#[test]
		fn test_status_other_than_one_is_inactive(status in any::<i64>().prop_filter("not one", |s| *s != 1)) {
			let value = json!({"insider": [{"status": status}]});
			prop_assert!(!is_active_value(&value));
		}
	}
}
