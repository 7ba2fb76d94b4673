// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound dispatch worker for the Relaya SMS dispatch core.
//!
//! Claims send intents off the queue, resolves a provider through the
//! routing selector, drives the carrier adapter, and records the
//! terminal-or-retry outcome. Retries re-enqueue the intent with a
//! pinned failover candidate and an escalating deferral window.

pub mod worker;

pub use worker::DispatchWorker;
