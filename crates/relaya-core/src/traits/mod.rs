// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the dispatch core and carrier implementations.

pub mod carrier;

pub use carrier::{CarrierFactory, SmsCarrier};
