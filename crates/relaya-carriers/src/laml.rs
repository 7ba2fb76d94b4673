// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared LaML/TwiML helpers for Twilio-compatible carriers.
//!
//! Twilio and SignalWire sign webhook callbacks the same way: the full
//! request URL is concatenated with every POST parameter as `key` then
//! `value`, keys sorted ascending, and the result is HMAC-SHA1'd with
//! the account's auth token, base64-encoded.

use std::collections::BTreeMap;

use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Empty LaML document acknowledging a callback without instructions.
pub const EMPTY_RESPONSE: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>";

/// Compute the expected callback signature for `url` and `params`.
///
/// `params` is a sorted map, which gives the sorted-key traversal the
/// scheme requires for free.
pub fn compute_signature(
    auth_token: &str,
    url: &str,
    params: &BTreeMap<String, String>,
) -> String {
    let mut payload = url.to_string();
    for (key, value) in params {
        payload.push_str(key);
        payload.push_str(value);
    }
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// Check a presented signature against the expected one.
///
/// Uses the Mac verifier, so the comparison is constant-time.
pub fn verify_signature(
    auth_token: &str,
    url: &str,
    params: &BTreeMap<String, String>,
    signature: &str,
) -> bool {
    let Ok(presented) = BASE64_STANDARD.decode(signature) else {
        return false;
    };
    let mut payload = url.to_string();
    for (key, value) in params {
        payload.push_str(key);
        payload.push_str(value);
    }
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());
    mac.verify_slice(&presented).is_ok()
}
