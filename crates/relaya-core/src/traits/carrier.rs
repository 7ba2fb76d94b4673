// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carrier adapter trait: the seam between dispatch and vendor APIs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RelayaError;
use crate::types::{Provider, SendOutcome, SendRequest};

/// One upstream SMS carrier, wrapped behind a normalized send contract.
///
/// Implementations perform exactly one synchronous HTTP call per `send`
/// and never signal ordinary delivery failure through the error channel:
/// a rejected or timed-out attempt comes back as
/// [`SendOutcome::Rejected`]. `Err` is reserved for configuration
/// problems detected before the wire call (missing credentials, no
/// resolvable sender).
#[async_trait]
pub trait SmsCarrier: Send + Sync {
    /// Stable carrier name this adapter serves ("telnyx", "twilio", ...).
    fn name(&self) -> &str;

    /// Deliver one message through the carrier's API.
    async fn send(&self, request: &SendRequest) -> Result<SendOutcome, RelayaError>;
}

/// Maps a provider row to the adapter that speaks its carrier protocol.
///
/// The dispatch worker holds this as a trait object so tests can inject
/// stub carriers; the production implementation lives in relaya-carriers.
pub trait CarrierFactory: Send + Sync {
    fn carrier_for(&self, provider: &Provider) -> Result<Arc<dyn SmsCarrier>, RelayaError>;
}
