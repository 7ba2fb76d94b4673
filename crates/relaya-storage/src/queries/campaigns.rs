// SPDX-FileCopyrightText: 2026 Relaya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign reads and counter side effects.
//!
//! Campaigns are created and managed outside this core; dispatch only
//! reads their routing config and bumps counters. Counter updates are
//! single-statement `SET x = x + 1` increments so parallel workers never
//! lose updates to a read-modify-write race.

use std::str::FromStr;

use relaya_core::types::{DistributionSlice, RoutingStrategy};
use relaya_core::RelayaError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Campaign;

const CAMPAIGN_COLUMNS: &str = "id, name, routing_strategy, provider, distribution, \
     failover_order, sender_id, is_unicode, sent_count, delivered_count, failed_count, created_at";

fn campaign_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Campaign> {
    let strategy_str: String = row.get(2)?;
    let routing_strategy = RoutingStrategy::from_str(&strategy_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let distribution_json: Option<String> = row.get(4)?;
    let distribution: Vec<DistributionSlice> = match distribution_json {
        Some(json) => serde_json::from_str(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        None => Vec::new(),
    };
    let failover_json: Option<String> = row.get(5)?;
    let failover_order: Vec<String> = match failover_json {
        Some(json) => serde_json::from_str(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        None => Vec::new(),
    };
    Ok(Campaign {
        id: row.get(0)?,
        name: row.get(1)?,
        routing_strategy,
        provider: row.get(3)?,
        distribution,
        failover_order,
        sender_id: row.get(6)?,
        is_unicode: row.get(7)?,
        sent_count: row.get(8)?,
        delivered_count: row.get(9)?,
        failed_count: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Insert a new campaign.
pub async fn insert_campaign(db: &Database, campaign: &Campaign) -> Result<(), RelayaError> {
    let campaign = campaign.clone();
    db.connection()
        .call(move |conn| {
            let distribution = if campaign.distribution.is_empty() {
                None
            } else {
                Some(
                    serde_json::to_string(&campaign.distribution)
                        .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?,
                )
            };
            let failover_order = if campaign.failover_order.is_empty() {
                None
            } else {
                Some(
                    serde_json::to_string(&campaign.failover_order)
                        .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?,
                )
            };
            conn.execute(
                "INSERT INTO campaigns (id, name, routing_strategy, provider, distribution,
                     failover_order, sender_id, is_unicode, sent_count, delivered_count,
                     failed_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    campaign.id,
                    campaign.name,
                    campaign.routing_strategy.to_string(),
                    campaign.provider,
                    distribution,
                    failover_order,
                    campaign.sender_id,
                    campaign.is_unicode,
                    campaign.sent_count,
                    campaign.delivered_count,
                    campaign.failed_count,
                    campaign.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a campaign by ID.
pub async fn get_campaign(db: &Database, id: &str) -> Result<Option<Campaign>, RelayaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], campaign_from_row) {
                Ok(campaign) => Ok(Some(campaign)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

async fn increment(db: &Database, id: &str, column: &'static str) -> Result<(), RelayaError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!("UPDATE campaigns SET {column} = {column} + 1 WHERE id = ?1"),
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically bump the sent counter.
pub async fn increment_sent(db: &Database, id: &str) -> Result<(), RelayaError> {
    increment(db, id, "sent_count").await
}

/// Atomically bump the delivered counter.
pub async fn increment_delivered(db: &Database, id: &str) -> Result<(), RelayaError> {
    increment(db, id, "delivered_count").await
}

/// Atomically bump the failed counter.
pub async fn increment_failed(db: &Database, id: &str) -> Result<(), RelayaError> {
    increment(db, id, "failed_count").await
}
