// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Relaya SMS dispatch core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Relaya configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayaConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dispatch worker settings (retry policy, timeouts, pool size).
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Inbound webhook server settings.
    #[serde(default)]
    pub webhooks: WebhookConfig,

    /// Telnyx webhook verification settings.
    #[serde(default)]
    pub telnyx: TelnyxConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "relaya".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("relaya").join("relaya.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("relaya.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Dispatch worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Maximum delivery attempts per message before terminal failure.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Escalating re-enqueue delays in seconds, indexed by attempt number.
    /// The last entry applies to all later attempts.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: Vec<u64>,

    /// Per-call timeout for carrier HTTP requests, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Idle poll interval for the intent queue, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of parallel dispatch workers.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            workers: default_workers(),
        }
    }
}

impl DispatchConfig {
    /// Re-enqueue delay for the given attempt number (1-based).
    ///
    /// Attempts past the end of the table reuse the last configured delay.
    pub fn backoff_for_attempt(&self, attempt: u32) -> u64 {
        let idx = attempt.saturating_sub(1) as usize;
        self.backoff_secs
            .get(idx)
            .or_else(|| self.backoff_secs.last())
            .copied()
            .unwrap_or(30)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_secs() -> Vec<u64> {
    vec![30, 60, 120]
}

fn default_http_timeout_secs() -> u64 {
    15
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_workers() -> usize {
    4
}

/// Inbound webhook server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Host address to bind.
    #[serde(default = "default_webhook_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_webhook_port")]
    pub port: u16,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: default_webhook_host(),
            port: default_webhook_port(),
        }
    }
}

fn default_webhook_host() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_port() -> u16 {
    8085
}

/// Telnyx webhook verification configuration.
///
/// Telnyx publishes one Ed25519 public key per account; it belongs to the
/// deployment, not to the provider credential bag. When unset,
/// verification is skipped (permissive default, preserved from the
/// source system -- operators wanting strict posture must set it).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelnyxConfig {
    /// Base64-encoded Ed25519 public key for webhook signatures.
    #[serde(default)]
    pub public_key: Option<String>,
}
