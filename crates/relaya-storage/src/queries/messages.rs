// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD and guarded status transitions.
//!
//! Transition updates carry a `WHERE status = ...` guard so a terminal
//! row can never move again, even if two workers race: the loser's
//! UPDATE matches zero rows and the caller sees `false`.

use std::str::FromStr;

use relaya_core::types::{MessageDirection, MessageStatus};
use relaya_core::RelayaError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Message;

const MESSAGE_COLUMNS: &str = "id, account_id, campaign_id, contact_id, provider, direction, \
     recipient, sender, body, is_unicode, status, provider_message_id, error_message, cost, \
     metadata, sent_at, delivered_at, received_at, created_at";

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let direction_str: String = row.get(5)?;
    let status_str: String = row.get(10)?;
    let direction = MessageDirection::from_str(&direction_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let status = MessageStatus::from_str(&status_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Message {
        id: row.get(0)?,
        account_id: row.get(1)?,
        campaign_id: row.get(2)?,
        contact_id: row.get(3)?,
        provider: row.get(4)?,
        direction,
        to: row.get(6)?,
        from: row.get(7)?,
        body: row.get(8)?,
        is_unicode: row.get(9)?,
        status,
        provider_message_id: row.get(11)?,
        error_message: row.get(12)?,
        cost: row.get(13)?,
        metadata: row.get(14)?,
        sent_at: row.get(15)?,
        delivered_at: row.get(16)?,
        received_at: row.get(17)?,
        created_at: row.get(18)?,
    })
}

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), RelayaError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, account_id, campaign_id, contact_id, provider,
                     direction, recipient, sender, body, is_unicode, status,
                     provider_message_id, error_message, cost, metadata,
                     sent_at, delivered_at, received_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19)",
                params![
                    msg.id,
                    msg.account_id,
                    msg.campaign_id,
                    msg.contact_id,
                    msg.provider,
                    msg.direction.to_string(),
                    msg.to,
                    msg.from,
                    msg.body,
                    msg.is_unicode,
                    msg.status.to_string(),
                    msg.provider_message_id,
                    msg.error_message,
                    msg.cost,
                    msg.metadata,
                    msg.sent_at,
                    msg.delivered_at,
                    msg.received_at,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a message by ID.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<Message>, RelayaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], message_from_row) {
                Ok(msg) => Ok(Some(msg)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition pending -> sent, recording the provider, the carrier's
/// message id, and the raw response. Returns false if the message was not
/// in `pending` (transition refused, row untouched).
pub async fn mark_sent(
    db: &Database,
    id: &str,
    provider: &str,
    provider_message_id: Option<String>,
    raw_response: Option<String>,
) -> Result<bool, RelayaError> {
    let id = id.to_string();
    let provider = provider.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages SET status = 'sent',
                     provider = ?2,
                     provider_message_id = ?3,
                     metadata = ?4,
                     sent_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'pending'",
                params![id, provider, provider_message_id, raw_response],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a non-terminal message to `failed` with a human-readable
/// error. Returns false if the message was already terminal.
pub async fn mark_failed(db: &Database, id: &str, error: &str) -> Result<bool, RelayaError> {
    let id = id.to_string();
    let error = error.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages SET status = 'failed', error_message = ?2
                 WHERE id = ?1 AND status IN ('pending', 'sent')",
                params![id, error],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition sent -> delivered (delivery receipt path). Returns false if
/// the message was not in `sent`.
pub async fn mark_delivered(db: &Database, id: &str) -> Result<bool, RelayaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages SET status = 'delivered',
                     delivered_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'sent'",
                params![id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
