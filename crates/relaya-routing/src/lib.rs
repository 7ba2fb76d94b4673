// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider selection for outbound dispatch.
//!
//! Resolves which carrier account a message goes out through, honoring
//! the campaign's routing strategy (single, distribute, failover) and
//! falling back to the account default when no campaign is in play.

pub mod selector;

pub use selector::{next_candidate, select_provider};
