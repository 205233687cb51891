// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Typed, lenient view over the provider's subscription payload.
//!
//! The provider attaches a `user` object to its token response. Its shape is
//! not guaranteed, so every type here is built from a [`serde_json::Value`]
//! without ever failing: anything unexpected becomes `None`.
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "loginName": "someone@example.com",
//!   "subscriptions": { "insider": [ { "status": 1 } ] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SUBSCRIPTIONS_KEY: &str = "subscriptions";
pub const INSIDER_KEY: &str = "insider";
pub const STATUS_KEY: &str = "status";
pub const LOGIN_NAME_KEY: &str = "loginName";

/// Raw status value from a subscription entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusValue {
	Integer(i64),
	Float(f64),
	Text(String),
	Bool(bool),
	/// Arrays and objects. Never numeric.
	Other,
}

impl StatusValue {
	/// Returns `None` for JSON `null`.
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Null => None,
			Value::Bool(b) => Some(Self::Bool(*b)),
			Value::Number(n) => Some(match n.as_i64() {
				Some(i) => Self::Integer(i),
				None => Self::Float(n.as_f64().unwrap_or_default()),
			}),
			Value::String(s) => Some(Self::Text(s.clone())),
			Value::Array(_) | Value::Object(_) => Some(Self::Other),
		}
	}

	/// Best-effort integer conversion.
	///
	/// Strings yield their leading integer (`" 1"`, `"1abc"` and `"1.0"` all
	/// give 1) and 0 when there is none. Floats truncate toward zero.
	/// Booleans and composite values are 0.
	pub fn to_integer(&self) -> i64 {
		match self {
			Self::Integer(i) => *i,
			Self::Float(f) => f.trunc() as i64,
			Self::Text(s) => leading_integer(s),
			Self::Bool(_) | Self::Other => 0,
		}
	}
}

fn leading_integer(s: &str) -> i64 {
	let s = s.trim_start();
	let (negative, digits) = match s.as_bytes().first() {
		Some(b'-') => (true, &s[1..]),
		Some(b'+') => (false, &s[1..]),
		_ => (false, s),
	};

	let mut value: i64 = 0;
	let mut prev_digit = false;
	let mut chars = digits.chars().peekable();
	while let Some(c) = chars.next() {
		match c {
			'0'..='9' => {
				let d = i64::from(c as u8 - b'0');
				value = value.saturating_mul(10).saturating_add(d);
				prev_digit = true;
			}
			// Underscore separators are accepted between digits only.
			'_' if prev_digit && chars.peek().is_some_and(char::is_ascii_digit) => {
				prev_digit = false;
			}
			_ => break,
		}
	}

	if negative {
		-value
	} else {
		value
	}
}

/// One entry of the `insider` subscription list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionEntry {
	pub status: Option<StatusValue>,
}

impl SubscriptionEntry {
	/// Non-object entries have no status.
	pub fn from_value(value: &Value) -> Self {
		let status = value
			.as_object()
			.and_then(|obj| obj.get(STATUS_KEY))
			.and_then(StatusValue::from_value);
		Self { status }
	}
}

/// The `subscriptions` object of the provider's user payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionPayload {
	/// `None` when the key is missing or not a list.
	pub insider: Option<Vec<SubscriptionEntry>>,
}

impl SubscriptionPayload {
	pub fn from_value(value: &Value) -> Self {
		let insider = value
			.as_object()
			.and_then(|obj| obj.get(INSIDER_KEY))
			.and_then(Value::as_array)
			.map(|entries| entries.iter().map(SubscriptionEntry::from_value).collect());
		Self { insider }
	}

	/// The entry that decides the subscription state.
	pub fn first_entry(&self) -> Option<&SubscriptionEntry> {
		self.insider.as_ref().and_then(|entries| entries.first())
	}
}

/// The provider's user object (`wb_user`), kept verbatim.
///
/// This is what gets staged for pending signups, so unknown fields survive
/// the round trip through storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WbUser(Map<String, Value>);

impl WbUser {
	pub fn new(map: Map<String, Value>) -> Self {
		Self(map)
	}

	/// Returns `None` unless `value` is a JSON object.
	pub fn from_value(value: Value) -> Option<Self> {
		match value {
			Value::Object(map) => Some(Self(map)),
			_ => None,
		}
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}

	pub fn subscriptions(&self) -> SubscriptionPayload {
		self
			.0
			.get(SUBSCRIPTIONS_KEY)
			.map(SubscriptionPayload::from_value)
			.unwrap_or_default()
	}

	/// The provider login, which is the user's email address.
	pub fn login_name(&self) -> Option<&str> {
		self.0.get(LOGIN_NAME_KEY).and_then(Value::as_str)
	}
}

impl From<Map<String, Value>> for WbUser {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}
