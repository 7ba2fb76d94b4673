// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook normalizer for the Relaya SMS dispatch core.
//!
//! Receives carrier callbacks for inbound messages, verifies their
//! signatures (Ed25519 for Telnyx, HMAC-SHA1 for the Twilio-compatible
//! carriers), and normalizes them into inbound message records. Carriers
//! always get the acknowledgement shape they expect: an empty 200 for
//! Telnyx, an empty TwiML document for the others.

mod inbound;
mod laml;
pub mod server;
pub mod signalwire;
pub mod telnyx;
pub mod twilio;

pub use server::{start_server, webhook_router, WebhookState};
