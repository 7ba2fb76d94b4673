// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carrier adapters for the Relaya SMS dispatch core.
//!
//! Each adapter implements [`SmsCarrier`] over a carrier's HTTP API and
//! normalizes the result into a [`SendOutcome`]: acceptance with the
//! carrier's message ID, or rejection with a retryability hint. Adapter
//! construction fails fast on missing credentials; send failures never
//! surface as errors.

pub mod laml;
pub mod signalwire;
pub mod telnyx;
pub mod twilio;

use std::sync::Arc;
use std::time::Duration;

use relaya_core::traits::{CarrierFactory, SmsCarrier};
use relaya_core::types::Provider;
use relaya_core::RelayaError;

pub use signalwire::SignalwireCarrier;
pub use telnyx::TelnyxCarrier;
pub use twilio::TwilioCarrier;

/// Builds adapters for the carriers this crate knows about, sharing one
/// HTTP client (and its timeout) across all of them.
pub struct DefaultCarrierFactory {
    http: reqwest::Client,
}

impl DefaultCarrierFactory {
    pub fn new(http_timeout: Duration) -> Result<Self, RelayaError> {
        let http = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| RelayaError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self { http })
    }
}

impl CarrierFactory for DefaultCarrierFactory {
    fn carrier_for(&self, provider: &Provider) -> Result<Arc<dyn SmsCarrier>, RelayaError> {
        match provider.name.as_str() {
            "telnyx" => Ok(Arc::new(TelnyxCarrier::from_provider(
                self.http.clone(),
                provider,
            )?)),
            "twilio" => Ok(Arc::new(TwilioCarrier::from_provider(
                self.http.clone(),
                provider,
            )?)),
            "signalwire" => Ok(Arc::new(SignalwireCarrier::from_provider(
                self.http.clone(),
                provider,
            )?)),
            other => Err(RelayaError::UnknownCarrier {
                name: other.to_string(),
            }),
        }
    }
}
