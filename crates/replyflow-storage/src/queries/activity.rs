// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only activity log access.

use rusqlite::params;

use replyflow_core::ReplyflowError;
use replyflow_core::types::{ActivityEntry, ActivityRecord, BusinessId};

use crate::database::Database;
use crate::queries::parse_ts;

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRecord> {
    let business_id: Option<String> = row.get(1)?;
    let metadata: Option<String> = row.get(4)?;
    let created_at: String = row.get(5)?;

    let metadata = metadata
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(ActivityRecord {
        id: row.get(0)?,
        business_id: business_id.map(BusinessId),
        entry_type: row.get(2)?,
        description: row.get(3)?,
        metadata,
        created_at: parse_ts(5, &created_at)?,
    })
}

/// Append one activity entry.
pub async fn append(db: &Database, entry: &ActivityEntry) -> Result<(), ReplyflowError> {
    let entry = entry.clone();
    let metadata = entry
        .metadata
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| ReplyflowError::Storage { source: Box::new(e) })?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO activity_log (business_id, entry_type, description, metadata, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.business_id.as_ref().map(|b| b.0.as_str()),
                    entry.entry_type,
                    entry.description,
                    metadata,
                    chrono::Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent entries, newest first, optionally scoped to one business.
pub async fn recent(
    db: &Database,
    business_id: Option<&BusinessId>,
    limit: usize,
) -> Result<Vec<ActivityRecord>, ReplyflowError> {
    let business_id = business_id.map(|b| b.0.clone());
    db.connection()
        .call(move |conn| {
            let rows = match business_id {
                Some(id) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, business_id, entry_type, description, metadata, created_at \
                         FROM activity_log WHERE business_id = ?1 \
                         ORDER BY id DESC LIMIT ?2",
                    )?;
                    let rows = stmt
                        .query_map(params![id, limit as i64], row_to_record)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, business_id, entry_type, description, metadata, created_at \
                         FROM activity_log ORDER BY id DESC LIMIT ?1",
                    )?;
                    let rows = stmt
                        .query_map(params![limit as i64], row_to_record)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
            };
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
