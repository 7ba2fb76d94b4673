// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Values merge from compiled defaults, then `/etc/relaya/relaya.toml`,
//! the user config directory, `./relaya.toml`, and finally `RELAYA_`
//! environment variables. Later layers win.

#![allow(clippy::result_large_err)] // figment::Error is returned unboxed

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RelayaConfig;

/// Load configuration from the standard file hierarchy plus `RELAYA_`
/// environment overrides.
pub fn load_config() -> Result<RelayaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelayaConfig::default()))
        .merge(Toml::file("/etc/relaya/relaya.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("relaya/relaya.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("relaya.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only, with no file lookup or
/// environment overrides.
pub fn load_config_from_str(toml_content: &str) -> Result<RelayaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelayaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, still honoring `RELAYA_`
/// environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<RelayaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RelayaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

fn env_provider() -> Env {
    Env::prefixed("RELAYA_").map(|key| section_key(key.as_str()).into())
}

/// Map a prefix-stripped, lowercased environment key onto its config
/// path. Only the leading section name becomes a dot; key names keep
/// their underscores, so `storage_database_path` stays
/// `storage.database_path` and never `storage.database.path`.
fn section_key(key: &str) -> String {
    key.replacen("service_", "service.", 1)
        .replacen("storage_", "storage.", 1)
        .replacen("dispatch_", "dispatch.", 1)
        .replacen("webhooks_", "webhooks.", 1)
        .replacen("telnyx_", "telnyx.", 1)
}
