// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Relaya SMS dispatch core.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for
//! providers, campaigns, messages, and the send-intent queue.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod registry;

pub use database::Database;
pub use models::*;
pub use registry::ProviderRegistry;
