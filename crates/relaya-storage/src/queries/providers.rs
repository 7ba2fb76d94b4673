// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider configuration operations.

use relaya_core::types::Credentials;
use relaya_core::RelayaError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Provider;

const PROVIDER_COLUMNS: &str =
    "name, display_name, is_active, is_default, priority, credentials";

fn provider_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Provider> {
    let credentials_json: String = row.get(5)?;
    let credentials: Credentials =
        serde_json::from_str(&credentials_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
    Ok(Provider {
        name: row.get(0)?,
        display_name: row.get(1)?,
        is_active: row.get(2)?,
        is_default: row.get(3)?,
        priority: row.get(4)?,
        credentials,
    })
}

/// Insert a provider, or replace its configuration if the name exists.
pub async fn upsert_provider(db: &Database, provider: &Provider) -> Result<(), RelayaError> {
    let provider = provider.clone();
    db.connection()
        .call(move |conn| {
            let credentials_json = serde_json::to_string(&provider.credentials)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            conn.execute(
                "INSERT INTO providers (name, display_name, is_active, is_default, priority, credentials)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(name) DO UPDATE SET
                     display_name = excluded.display_name,
                     is_active = excluded.is_active,
                     is_default = excluded.is_default,
                     priority = excluded.priority,
                     credentials = excluded.credentials,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    provider.name,
                    provider.display_name,
                    provider.is_active,
                    provider.is_default,
                    provider.priority,
                    credentials_json,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a provider by its stable name.
pub async fn find_by_name(db: &Database, name: &str) -> Result<Option<Provider>, RelayaError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROVIDER_COLUMNS} FROM providers WHERE name = ?1"
            ))?;
            match stmt.query_row(params![name], provider_from_row) {
                Ok(provider) => Ok(Some(provider)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All active providers, ordered by (priority desc, name asc).
pub async fn find_active(db: &Database) -> Result<Vec<Provider>, RelayaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROVIDER_COLUMNS} FROM providers
                 WHERE is_active = 1
                 ORDER BY priority DESC, name ASC"
            ))?;
            let rows = stmt.query_map([], provider_from_row)?;
            let mut providers = Vec::new();
            for row in rows {
                providers.push(row?);
            }
            Ok(providers)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The active provider flagged default, or the highest-priority active
/// provider if none is flagged.
pub async fn find_default(db: &Database) -> Result<Option<Provider>, RelayaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROVIDER_COLUMNS} FROM providers
                 WHERE is_active = 1
                 ORDER BY is_default DESC, priority DESC, name ASC
                 LIMIT 1"
            ))?;
            match stmt.query_row([], provider_from_row) {
                Ok(provider) => Ok(Some(provider)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag a provider as the default, clearing the flag on every other
/// provider in the same transaction so at most one default ever exists.
pub async fn set_default(db: &Database, name: &str) -> Result<(), RelayaError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("UPDATE providers SET is_default = 0 WHERE name != ?1", params![name])?;
            let changed = tx.execute(
                "UPDATE providers SET is_default = 1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE name = ?1",
                params![name],
            )?;
            if changed == 0 {
                return Err(tokio_rusqlite::Error::Other(
                    format!("provider {name} not found").into(),
                ));
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Toggle a provider's active flag.
pub async fn set_active(db: &Database, name: &str, active: bool) -> Result<(), RelayaError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE providers SET is_active = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE name = ?1",
                params![name, active],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
