// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use relaya_core::RelayaError;

/// Handle to the SQLite database.
///
/// Wraps a single `tokio_rusqlite::Connection`; cloning is cheap and all
/// clones share the one background writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode enabled and
    /// run all pending migrations.
    pub async fn open(path: &str) -> Result<Self, RelayaError> {
        Self::open_with(path, true).await
    }

    /// Open (or create) the database at `path`, optionally enabling WAL.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, RelayaError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RelayaError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_tr_err)?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            crate::migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        tracing::debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying connection; query modules go through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush and close the background connection.
    pub async fn close(&self) -> Result<(), RelayaError> {
        self.conn.clone().close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> RelayaError {
    RelayaError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema_and_reopens() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open_test.db");
        let path = db_path.to_str().unwrap();

        let db = Database::open(path).await.unwrap();
        let count: i64 = db
            .connection()
            .call(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('providers', 'campaigns', 'messages', 'send_intents')",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(count, 4);
        db.close().await.unwrap();

        // Reopen: migrations must be idempotent.
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/relaya.db");
        let db = Database::open(nested.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
