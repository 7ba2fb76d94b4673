// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Relaya SMS dispatch core.
//!
//! This crate provides the error type, domain types (providers, messages,
//! campaigns, send intents), and the carrier trait seam used throughout
//! the Relaya workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RelayaError;
pub use traits::{CarrierFactory, SmsCarrier};
pub use types::{
    Campaign, Credentials, DistributionSlice, MediaAttachment, Message, MessageDirection,
    MessageStatus, Provider, RejectionKind, RoutingStrategy, SendIntent, SendOutcome,
    SendRequest,
};
