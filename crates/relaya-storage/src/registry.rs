// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry facade.
//!
//! Routing and dispatch resolve providers through this handle rather
//! than touching the query layer directly, which keeps the lookup
//! surface small and mockable in tests.

use relaya_core::RelayaError;

use crate::database::Database;
use crate::models::Provider;
use crate::queries::providers;

/// Read/write access to the provider configuration table.
#[derive(Clone)]
pub struct ProviderRegistry {
    db: Database,
}

impl ProviderRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Look up a provider by its stable name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Provider>, RelayaError> {
        providers::find_by_name(&self.db, name).await
    }

    /// All active providers, ordered by (priority desc, name asc).
    pub async fn find_active(&self) -> Result<Vec<Provider>, RelayaError> {
        providers::find_active(&self.db).await
    }

    /// The provider dispatch falls back to when nothing else decides:
    /// the active provider flagged default, or the highest-priority
    /// active one if no flag is set.
    pub async fn find_default(&self) -> Result<Option<Provider>, RelayaError> {
        providers::find_default(&self.db).await
    }

    /// Make `name` the single default provider.
    pub async fn set_default(&self, name: &str) -> Result<(), RelayaError> {
        providers::set_default(&self.db, name).await
    }

    /// Toggle a provider's active flag.
    pub async fn set_active(&self, name: &str, active: bool) -> Result<(), RelayaError> {
        providers::set_active(&self.db, name, active).await
    }

    /// Insert or replace a provider configuration.
    pub async fn upsert(&self, provider: &Provider) -> Result<(), RelayaError> {
        providers::upsert_provider(&self.db, provider).await
    }
}
