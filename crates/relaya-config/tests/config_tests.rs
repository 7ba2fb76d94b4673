// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Relaya configuration system.

use relaya_config::model::RelayaConfig;
use relaya_config::{load_config_from_str, validate};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_relaya_config() {
    let toml = r#"
[service]
name = "relaya-test"
log_level = "debug"

[storage]
database_path = "/tmp/relaya-test.db"
wal_mode = false

[dispatch]
max_attempts = 5
backoff_secs = [10, 20, 40]
http_timeout_secs = 10
poll_interval_ms = 250
workers = 2

[webhooks]
host = "0.0.0.0"
port = 9090

[telnyx]
public_key = "c2FtcGxlLWtleQ=="
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "relaya-test");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/relaya-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.dispatch.max_attempts, 5);
    assert_eq!(config.dispatch.backoff_secs, vec![10, 20, 40]);
    assert_eq!(config.dispatch.http_timeout_secs, 10);
    assert_eq!(config.dispatch.poll_interval_ms, 250);
    assert_eq!(config.dispatch.workers, 2);
    assert_eq!(config.webhooks.host, "0.0.0.0");
    assert_eq!(config.webhooks.port, 9090);
    assert_eq!(config.telnyx.public_key.as_deref(), Some("c2FtcGxlLWtleQ=="));
}

/// Empty TOML yields compiled defaults, including the retry table from
/// the source system (3 tries, 30/60/120s backoff).
#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.service.name, "relaya");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.dispatch.max_attempts, 3);
    assert_eq!(config.dispatch.backoff_secs, vec![30, 60, 120]);
    assert_eq!(config.webhooks.host, "127.0.0.1");
    assert!(config.telnyx.public_key.is_none());
    assert!(config.storage.wal_mode);
}

/// Unknown keys are rejected rather than silently ignored.
#[test]
fn unknown_field_is_rejected() {
    let toml = r#"
[dispatch]
max_atempts = 3
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Unknown sections are rejected too.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[dispach]
workers = 2
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Backoff lookup escalates by attempt and saturates at the last entry.
#[test]
fn backoff_escalates_and_saturates() {
    let config = RelayaConfig::default();
    assert_eq!(config.dispatch.backoff_for_attempt(1), 30);
    assert_eq!(config.dispatch.backoff_for_attempt(2), 60);
    assert_eq!(config.dispatch.backoff_for_attempt(3), 120);
    assert_eq!(config.dispatch.backoff_for_attempt(7), 120);
}

/// Validation rejects degenerate dispatch settings.
#[test]
fn validate_rejects_zero_attempts_and_workers() {
    let mut config = RelayaConfig::default();
    config.dispatch.max_attempts = 0;
    assert!(validate(&config).is_err());

    let mut config = RelayaConfig::default();
    config.dispatch.workers = 0;
    assert!(validate(&config).is_err());

    let mut config = RelayaConfig::default();
    config.dispatch.backoff_secs.clear();
    assert!(validate(&config).is_err());

    assert!(validate(&RelayaConfig::default()).is_ok());
}
