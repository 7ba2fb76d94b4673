// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Relaya SMS dispatch core.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{DispatchConfig, RelayaConfig, TelnyxConfig, WebhookConfig};

use relaya_core::RelayaError;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<RelayaConfig, RelayaError> {
    let config =
        loader::load_config().map_err(|e| RelayaError::Config(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Post-deserialization validation for values serde cannot express.
pub fn validate(config: &RelayaConfig) -> Result<(), RelayaError> {
    if config.dispatch.max_attempts == 0 {
        return Err(RelayaError::Config(
            "dispatch.max_attempts must be at least 1".into(),
        ));
    }
    if config.dispatch.backoff_secs.is_empty() {
        return Err(RelayaError::Config(
            "dispatch.backoff_secs must not be empty".into(),
        ));
    }
    if config.dispatch.workers == 0 {
        return Err(RelayaError::Config(
            "dispatch.workers must be at least 1".into(),
        ));
    }
    Ok(())
}
