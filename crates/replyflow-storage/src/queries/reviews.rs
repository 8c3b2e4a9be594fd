// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review row CRUD and lifecycle-flag updates.
//!
//! Every update here is scoped to a single review id; the approval
//! transition carries its `status = 'pending'` guard in SQL so the
//! pending -> approved write is atomic.

use chrono::{DateTime, Utc};
use rusqlite::params;

use replyflow_core::types::{BusinessId, Review, ReviewId, ReviewStatus, ToneLabel};
use replyflow_core::ReplyflowError;

use crate::database::Database;
use crate::queries::{parse_enum, parse_ts};

const REVIEW_COLUMNS: &str = "id, business_id, source_id, rating, body, customer_name, \
     reviewed_at, generated_reply, final_reply, reply_tone, published_at, posted_reply, \
     automated_reply, automation_failed, automation_error, auto_approved, status";

fn row_to_review(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    let reviewed_at: String = row.get(6)?;
    let reply_tone: Option<String> = row.get(9)?;
    let published_at: Option<String> = row.get(10)?;
    let status: String = row.get(16)?;

    Ok(Review {
        id: ReviewId(row.get(0)?),
        business_id: BusinessId(row.get(1)?),
        source_id: row.get(2)?,
        rating: row.get(3)?,
        body: row.get(4)?,
        customer_name: row.get(5)?,
        reviewed_at: parse_ts(6, &reviewed_at)?,
        generated_reply: row.get(7)?,
        final_reply: row.get(8)?,
        reply_tone: reply_tone
            .as_deref()
            .map(|t| parse_enum::<ToneLabel>(9, t))
            .transpose()?,
        published_at: published_at
            .as_deref()
            .map(|t| parse_ts(10, t))
            .transpose()?,
        posted_reply: row.get(11)?,
        automated_reply: row.get(12)?,
        automation_failed: row.get(13)?,
        automation_error: row.get(14)?,
        auto_approved: row.get(15)?,
        status: parse_enum::<ReviewStatus>(16, &status)?,
    })
}

/// Insert a new review row. Used by the sync boundary and test fixtures.
pub async fn insert_review(db: &Database, review: &Review) -> Result<(), ReplyflowError> {
    let review = review.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reviews (id, business_id, source_id, rating, body, customer_name, \
                 reviewed_at, generated_reply, final_reply, reply_tone, published_at, posted_reply, \
                 automated_reply, automation_failed, automation_error, auto_approved, status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    review.id.0,
                    review.business_id.0,
                    review.source_id,
                    review.rating,
                    review.body,
                    review.customer_name,
                    review.reviewed_at.to_rfc3339(),
                    review.generated_reply,
                    review.final_reply,
                    review.reply_tone.map(|t| t.to_string()),
                    review.published_at.map(|t| t.to_rfc3339()),
                    review.posted_reply,
                    review.automated_reply,
                    review.automation_failed,
                    review.automation_error,
                    review.auto_approved,
                    review.status.to_string(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a review by id.
pub async fn get_review(db: &Database, id: &ReviewId) -> Result<Option<Review>, ReplyflowError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_review);
            match result {
                Ok(review) => Ok(Some(review)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reviews eligible for a scheduled run: pending, never auto-replied, not
/// flagged as failed.
pub async fn unprocessed_reviews(
    db: &Database,
    business_id: &BusinessId,
) -> Result<Vec<Review>, ReplyflowError> {
    let business_id = business_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews \
                 WHERE business_id = ?1 AND status = 'pending' \
                   AND automated_reply = 0 AND automation_failed = 0 \
                 ORDER BY reviewed_at ASC"
            ))?;
            let rows = stmt.query_map(params![business_id], row_to_review)?;
            let mut reviews = Vec::new();
            for row in rows {
                reviews.push(row?);
            }
            Ok(reviews)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reviews whose generation failed in a prior run, oldest first.
pub async fn failed_reviews(
    db: &Database,
    business_id: &BusinessId,
    limit: usize,
) -> Result<Vec<Review>, ReplyflowError> {
    let business_id = business_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews \
                 WHERE business_id = ?1 AND automation_failed = 1 \
                 ORDER BY reviewed_at ASC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![business_id, limit as i64], row_to_review)?;
            let mut reviews = Vec::new();
            for row in rows {
                reviews.push(row?);
            }
            Ok(reviews)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Approved reviews holding a reply that was never published.
pub async fn approved_unposted_reviews(
    db: &Database,
    business_id: &BusinessId,
) -> Result<Vec<Review>, ReplyflowError> {
    let business_id = business_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews \
                 WHERE business_id = ?1 AND status = 'approved' AND published_at IS NULL \
                   AND (final_reply IS NOT NULL OR generated_reply IS NOT NULL) \
                 ORDER BY reviewed_at ASC"
            ))?;
            let rows = stmt.query_map(params![business_id], row_to_review)?;
            let mut reviews = Vec::new();
            for row in rows {
                reviews.push(row?);
            }
            Ok(reviews)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The N most recent generated replies, newest first. Feeds the
/// anti-repetition tracker.
pub async fn recent_generated_replies(
    db: &Database,
    business_id: &BusinessId,
    limit: usize,
) -> Result<Vec<String>, ReplyflowError> {
    let business_id = business_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT generated_reply FROM reviews \
                 WHERE business_id = ?1 AND generated_reply IS NOT NULL \
                 ORDER BY updated_at DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![business_id, limit as i64], |row| row.get(0))?;
            let mut replies = Vec::new();
            for row in rows {
                replies.push(row?);
            }
            Ok(replies)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist a successful generation, clearing any stale failure flags.
pub async fn store_generated_reply(
    db: &Database,
    id: &ReviewId,
    text: &str,
    tone: ToneLabel,
) -> Result<(), ReplyflowError> {
    let id = id.0.clone();
    let text = text.to_string();
    let tone = tone.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reviews SET generated_reply = ?1, reply_tone = ?2, \
                 automated_reply = 1, automation_failed = 0, automation_error = NULL, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 WHERE id = ?3",
                params![text, tone, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist a failed generation. The reply fields stay untouched.
pub async fn mark_generation_failed(
    db: &Database,
    id: &ReviewId,
    error: &str,
) -> Result<(), ReplyflowError> {
    let id = id.0.clone();
    let error = error.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reviews SET automation_failed = 1, automation_error = ?1, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 WHERE id = ?2",
                params![error, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomic pending -> approved transition; sets `auto_approved` in the same
/// write and is a no-op if the status moved underneath us.
pub async fn approve_review(db: &Database, id: &ReviewId) -> Result<(), ReplyflowError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reviews SET status = 'approved', auto_approved = 1, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 WHERE id = ?1 AND status = 'pending'",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Approved -> posted transition with published timestamp and audit copy.
pub async fn mark_posted(
    db: &Database,
    id: &ReviewId,
    at: DateTime<Utc>,
    posted_text: &str,
) -> Result<(), ReplyflowError> {
    let id = id.0.clone();
    let at = at.to_rfc3339();
    let posted_text = posted_text.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reviews SET status = 'posted', published_at = ?1, posted_reply = ?2, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 WHERE id = ?3",
                params![at, posted_text, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
