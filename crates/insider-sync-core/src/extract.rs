// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Extraction of the provider user object from an OAuth2 token response.
//!
//! The provider returns its user object as a `user` field next to the access
//! token. The base authentication flow produces its own "extra" data for the
//! session; [`enrich_extra`] adds the provider object to it under `wb_user`
//! without touching anything else.

use serde_json::{Map, Value};

use crate::payload::WbUser;

/// Key of the provider user object in the raw token parameters.
pub const TOKEN_USER_KEY: &str = "user";

/// Key under which the provider user object is added to the extra data.
pub const WB_USER_KEY: &str = "wb_user";

/// Raw parameters of the provider's token response.
pub type TokenParams = Map<String, Value>;

/// Free-form extra data produced by the authentication flow.
pub type ExtraData = Map<String, Value>;

/// Pulls the provider user object out of the token parameters.
///
/// Objects are taken as is. A list of `[key, value]` pairs is coerced into an
/// object. Anything else is treated as absent.
pub fn extract_wb_user(params: &TokenParams) -> Option<WbUser> {
	match params.get(TOKEN_USER_KEY)? {
		Value::Object(map) => Some(WbUser::new(map.clone())),
		Value::Array(items) => pairs_to_map(items).map(WbUser::new),
		_ => None,
	}
}

fn pairs_to_map(items: &[Value]) -> Option<Map<String, Value>> {
	items
		.iter()
		.map(|item| match item.as_array().map(Vec::as_slice) {
			Some([Value::String(key), value]) => Some((key.clone(), value.clone())),
			_ => None,
		})
		.collect()
}

/// Merges the provider user object into the base extra data.
///
/// Existing fields are kept; only `wb_user` is written, and only when the
/// token response carries a usable user object.
pub fn enrich_extra(base: Option<ExtraData>, params: &TokenParams) -> ExtraData {
	let mut data = base.unwrap_or_default();
	if let Some(wb_user) = extract_wb_user(params) {
		data.insert(WB_USER_KEY.to_string(), wb_user.into_value());
	}
	data
}

/// Reads the provider user object back out of enriched extra data.
pub fn wb_user_from_extra(extra: &ExtraData) -> Option<WbUser> {
	extra
		.get(WB_USER_KEY)
		.cloned()
		.and_then(WbUser::from_value)
}

/// Hook for the host's OAuth2 strategy to enrich its extra data.
///
/// The host calls this after computing its own extra data and stores the
/// result on the authentication record.
pub trait ExtraDataEnricher: Send + Sync {
	fn enrich(&self, base: Option<ExtraData>, params: &TokenParams) -> ExtraData;
}

/// Adds `wb_user` to the extra data.
#[derive(Debug, Clone, Default)]
pub struct WbUserEnricher {
	verbose: bool,
}

impl WbUserEnricher {
	/// `verbose` enables a diagnostic line per extraction.
	pub fn new(verbose: bool) -> Self {
		Self { verbose }
	}
}

impl ExtraDataEnricher for WbUserEnricher {
	fn enrich(&self, base: Option<ExtraData>, params: &TokenParams) -> ExtraData {
		let data = enrich_extra(base, params);
		if self.verbose {
			if data.contains_key(WB_USER_KEY) {
				tracing::info!("wb_user extracted from token params");
			} else {
				tracing::info!("wb_user missing in token params");
			}
		}
		data
	}
}
