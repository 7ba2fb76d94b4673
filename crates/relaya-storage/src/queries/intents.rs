// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send-intent queue operations.
//!
//! The queue gives every message a single-owner claim: `claim_next`
//! atomically selects the oldest eligible pending intent and marks it
//! `processing` in one transaction, so two workers can never hold the
//! same message. `not_before` is a deliver-not-before scheduling hint
//! honored at claim time, which is how retry backoff is implemented.

use relaya_core::RelayaError;
use rusqlite::params;

use crate::database::Database;
use crate::models::SendIntent;

const INTENT_COLUMNS: &str =
    "id, message_id, pinned_provider, status, attempts, not_before, created_at, updated_at";

fn intent_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SendIntent> {
    Ok(SendIntent {
        id: row.get(0)?,
        message_id: row.get(1)?,
        pinned_provider: row.get(2)?,
        status: row.get(3)?,
        attempts: row.get(4)?,
        not_before: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Enqueue a send intent for a message. Returns the intent ID.
pub async fn enqueue(
    db: &Database,
    message_id: &str,
    pinned_provider: Option<&str>,
    not_before: Option<&str>,
) -> Result<i64, RelayaError> {
    let message_id = message_id.to_string();
    let pinned_provider = pinned_provider.map(str::to_string);
    let not_before = not_before.map(str::to_string);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO send_intents (message_id, pinned_provider, not_before)
                 VALUES (?1, ?2, ?3)",
                params![message_id, pinned_provider, not_before],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim the next eligible pending intent.
///
/// Atomically selects the oldest pending intent whose `not_before` has
/// passed, marks it `processing`, and increments its attempt counter --
/// the returned intent's `attempts` is the 1-based number of the attempt
/// now underway. Returns `None` if nothing is eligible.
pub async fn claim_next(db: &Database) -> Result<Option<SendIntent>, RelayaError> {
    db.connection()
        .call(|conn| {
            let tx = conn.transaction()?;

            let result = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {INTENT_COLUMNS} FROM send_intents
                     WHERE status = 'pending'
                       AND (not_before IS NULL
                            OR not_before <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ORDER BY id ASC
                     LIMIT 1"
                ))?;
                stmt.query_row([], intent_from_row)
            };

            match result {
                Ok(intent) => {
                    tx.execute(
                        "UPDATE send_intents SET status = 'processing',
                         attempts = attempts + 1,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![intent.id],
                    )?;
                    tx.commit()?;
                    Ok(Some(SendIntent {
                        status: "processing".to_string(),
                        attempts: intent.attempts + 1,
                        ..intent
                    }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Put a claimed intent back on the queue for another attempt, pinning a
/// provider and deferring it until `not_before`. The attempt counter is
/// preserved (it advances at claim time).
pub async fn reenqueue(
    db: &Database,
    id: i64,
    pinned_provider: &str,
    not_before: &str,
) -> Result<(), RelayaError> {
    let pinned_provider = pinned_provider.to_string();
    let not_before = not_before.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE send_intents SET status = 'pending',
                 pinned_provider = ?2,
                 not_before = ?3,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id, pinned_provider, not_before],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Put a claimed intent back on the queue without changing its pin,
/// deferring it until `not_before`. Used when an attempt was lost to an
/// unexpected error rather than a carrier verdict.
pub async fn defer(db: &Database, id: i64, not_before: &str) -> Result<(), RelayaError> {
    let not_before = not_before.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE send_intents SET status = 'pending',
                 not_before = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id, not_before],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark an intent completed (its message reached a sent state).
pub async fn complete(db: &Database, id: i64) -> Result<(), RelayaError> {
    set_status(db, id, "completed").await
}

/// Mark an intent failed (attempts exhausted or terminal error).
pub async fn fail(db: &Database, id: i64) -> Result<(), RelayaError> {
    set_status(db, id, "failed").await
}

async fn set_status(db: &Database, id: i64, status: &'static str) -> Result<(), RelayaError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE send_intents SET status = ?2,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id, status],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Release intents stranded in `processing` back to `pending`.
///
/// Run once at startup: a crash mid-send leaves its claimed intents in
/// `processing` with no owner, and nothing else will ever touch them.
pub async fn release_processing(db: &Database) -> Result<usize, RelayaError> {
    db.connection()
        .call(|conn| {
            let changed = conn.execute(
                "UPDATE send_intents SET status = 'pending',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE status = 'processing'",
                [],
            )?;
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an intent by ID.
pub async fn get_intent(db: &Database, id: i64) -> Result<Option<SendIntent>, RelayaError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {INTENT_COLUMNS} FROM send_intents WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], intent_from_row) {
                Ok(intent) => Ok(Some(intent)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::messages::{insert_message, tests::make_outbound};
    use tempfile::tempdir;

    async fn setup_db_with_message(id: &str) -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        insert_message(&db, &make_outbound(id)).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn claim_marks_processing_and_counts_the_attempt() {
        let (db, _dir) = setup_db_with_message("m1").await;

        let id = enqueue(&db, "m1", None, None).await.unwrap();
        assert!(id > 0);

        let intent = claim_next(&db).await.unwrap().unwrap();
        assert_eq!(intent.id, id);
        assert_eq!(intent.message_id, "m1");
        assert_eq!(intent.status, "processing");
        assert_eq!(intent.attempts, 1);
        assert!(intent.pinned_provider.is_none());

        // Claimed: nothing else is eligible.
        assert!(claim_next(&db).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn not_before_defers_claims() {
        let (db, _dir) = setup_db_with_message("m1").await;

        // An intent parked in the future is not claimable.
        enqueue(&db, "m1", None, Some("2999-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        assert!(claim_next(&db).await.unwrap().is_none());

        // One parked in the past is.
        insert_message(&db, &make_outbound("m2")).await.unwrap();
        enqueue(&db, "m2", Some("twilio"), Some("2001-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        let intent = claim_next(&db).await.unwrap().unwrap();
        assert_eq!(intent.message_id, "m2");
        assert_eq!(intent.pinned_provider.as_deref(), Some("twilio"));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reenqueue_pins_provider_and_keeps_attempts() {
        let (db, _dir) = setup_db_with_message("m1").await;

        let id = enqueue(&db, "m1", None, None).await.unwrap();
        let intent = claim_next(&db).await.unwrap().unwrap();
        assert_eq!(intent.attempts, 1);

        reenqueue(&db, id, "signalwire", "2001-01-01T00:00:00.000Z")
            .await
            .unwrap();

        let intent = claim_next(&db).await.unwrap().unwrap();
        assert_eq!(intent.id, id);
        assert_eq!(intent.pinned_provider.as_deref(), Some("signalwire"));
        // Second claim = second attempt.
        assert_eq!(intent.attempts, 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn defer_reschedules_without_touching_the_pin() {
        let (db, _dir) = setup_db_with_message("m1").await;

        let id = enqueue(&db, "m1", Some("twilio"), None).await.unwrap();
        claim_next(&db).await.unwrap().unwrap();

        defer(&db, id, "2001-01-01T00:00:00.000Z").await.unwrap();

        let intent = claim_next(&db).await.unwrap().unwrap();
        assert_eq!(intent.id, id);
        assert_eq!(intent.pinned_provider.as_deref(), Some("twilio"));
        assert_eq!(intent.attempts, 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn completed_and_failed_leave_the_queue() {
        let (db, _dir) = setup_db_with_message("m1").await;

        let id = enqueue(&db, "m1", None, None).await.unwrap();
        claim_next(&db).await.unwrap().unwrap();
        complete(&db, id).await.unwrap();
        assert!(claim_next(&db).await.unwrap().is_none());
        assert_eq!(get_intent(&db, id).await.unwrap().unwrap().status, "completed");

        insert_message(&db, &make_outbound("m2")).await.unwrap();
        let id2 = enqueue(&db, "m2", None, None).await.unwrap();
        claim_next(&db).await.unwrap().unwrap();
        fail(&db, id2).await.unwrap();
        assert!(claim_next(&db).await.unwrap().is_none());
        assert_eq!(get_intent(&db, id2).await.unwrap().unwrap().status, "failed");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn release_returns_orphaned_claims_to_the_queue() {
        let (db, _dir) = setup_db_with_message("m1").await;

        let id = enqueue(&db, "m1", None, None).await.unwrap();
        claim_next(&db).await.unwrap().unwrap();
        assert!(claim_next(&db).await.unwrap().is_none());

        // Simulated restart: the processing claim has no owner.
        assert_eq!(release_processing(&db).await.unwrap(), 1);
        let intent = claim_next(&db).await.unwrap().unwrap();
        assert_eq!(intent.id, id);
        assert_eq!(intent.attempts, 2);

        // Settled intents are not released.
        complete(&db, id).await.unwrap();
        assert_eq!(release_processing(&db).await.unwrap(), 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claims_come_off_in_fifo_order() {
        let (db, _dir) = setup_db_with_message("m1").await;
        insert_message(&db, &make_outbound("m2")).await.unwrap();

        enqueue(&db, "m1", None, None).await.unwrap();
        enqueue(&db, "m2", None, None).await.unwrap();

        assert_eq!(claim_next(&db).await.unwrap().unwrap().message_id, "m1");
        assert_eq!(claim_next(&db).await.unwrap().unwrap().message_id, "m2");
        db.close().await.unwrap();
    }
}
