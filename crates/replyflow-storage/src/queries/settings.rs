// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business settings row access.
//!
//! The settings row is read once per run as an immutable snapshot; the only
//! pipeline writes are `last_automation_run` and the bounded JSON
//! `recent_errors` list.

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

use replyflow_core::ReplyflowError;
use replyflow_core::types::{
    ApprovalMode, AutomationError, BrandVoice, BusinessId, BusinessInfo, BusinessProfile,
    BusinessSettings, VoicePreset,
};

use crate::database::Database;
use crate::queries::{parse_enum, parse_ts};

/// Maximum entries retained in the recent-errors list.
pub const MAX_RECENT_ERRORS: usize = 10;

/// Errors older than this are pruned whenever the list is written.
pub const ERROR_RETENTION_HOURS: i64 = 24;

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<BusinessProfile> {
    let voice_preset: String = row.get(5)?;
    let approval_mode: String = row.get(14)?;
    let last_run: Option<String> = row.get(16)?;
    let errors_json: String = row.get(17)?;

    let recent_errors: Vec<AutomationError> =
        serde_json::from_str(&errors_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(17, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(BusinessProfile {
        business_id: BusinessId(row.get(0)?),
        info: BusinessInfo {
            name: row.get(1)?,
            industry: row.get(2)?,
            support_email: row.get(3)?,
            support_phone: row.get(4)?,
        },
        settings: BusinessSettings {
            brand_voice: BrandVoice {
                preset: parse_enum::<VoicePreset>(5, &voice_preset)?,
                formality: row.get(6)?,
                warmth: row.get(7)?,
                brevity: row.get(8)?,
                custom_instruction: row.get(9)?,
            },
            auto_sync_enabled: row.get(10)?,
            auto_reply_enabled: row.get(11)?,
            auto_post_enabled: row.get(12)?,
            email_notifications_enabled: row.get(13)?,
            approval_mode: parse_enum::<ApprovalMode>(14, &approval_mode)?,
            sync_slot: row.get(15)?,
            last_automation_run: last_run.as_deref().map(|t| parse_ts(16, t)).transpose()?,
            recent_errors,
        },
    })
}

const PROFILE_COLUMNS: &str = "business_id, name, industry, support_email, support_phone, \
     voice_preset, formality, warmth, brevity, custom_instruction, \
     auto_sync_enabled, auto_reply_enabled, auto_post_enabled, email_notifications_enabled, \
     approval_mode, sync_slot, last_automation_run, recent_errors";

/// Fetch one business's settings and identity.
pub async fn get_profile(
    db: &Database,
    business_id: &BusinessId,
) -> Result<Option<BusinessProfile>, ReplyflowError> {
    let business_id = business_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROFILE_COLUMNS} FROM business_settings WHERE business_id = ?1"
            ))?;
            let result = stmt.query_row(params![business_id], row_to_profile);
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace a business profile. Used by provisioning and tests.
pub async fn upsert_profile(db: &Database, profile: &BusinessProfile) -> Result<(), ReplyflowError> {
    let profile = profile.clone();
    let errors_json = serde_json::to_string(&profile.settings.recent_errors)
        .map_err(|e| ReplyflowError::Storage { source: Box::new(e) })?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO business_settings \
                 (business_id, name, industry, support_email, support_phone, \
                  voice_preset, formality, warmth, brevity, custom_instruction, \
                  auto_sync_enabled, auto_reply_enabled, auto_post_enabled, \
                  email_notifications_enabled, approval_mode, sync_slot, \
                  last_automation_run, recent_errors) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                params![
                    profile.business_id.0,
                    profile.info.name,
                    profile.info.industry,
                    profile.info.support_email,
                    profile.info.support_phone,
                    profile.settings.brand_voice.preset.to_string(),
                    profile.settings.brand_voice.formality,
                    profile.settings.brand_voice.warmth,
                    profile.settings.brand_voice.brevity,
                    profile.settings.brand_voice.custom_instruction,
                    profile.settings.auto_sync_enabled,
                    profile.settings.auto_reply_enabled,
                    profile.settings.auto_post_enabled,
                    profile.settings.email_notifications_enabled,
                    profile.settings.approval_mode.to_string(),
                    profile.settings.sync_slot,
                    profile.settings.last_automation_run.map(|t| t.to_rfc3339()),
                    errors_json,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record when the automation pipeline last ran.
pub async fn update_last_run(
    db: &Database,
    business_id: &BusinessId,
    at: DateTime<Utc>,
) -> Result<(), ReplyflowError> {
    let business_id = business_id.0.clone();
    let at = at.to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE business_settings SET last_automation_run = ?1 WHERE business_id = ?2",
                params![at, business_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append one error to the bounded recent-errors list.
///
/// Read-modify-write inside a single connection call; the list is pruned to
/// the retention window and capped at [`MAX_RECENT_ERRORS`] newest entries.
pub async fn push_automation_error(
    db: &Database,
    business_id: &BusinessId,
    error: &AutomationError,
) -> Result<(), ReplyflowError> {
    let business_id = business_id.0.clone();
    let error = error.clone();
    db.connection()
        .call(move |conn| {
            let current: String = conn.query_row(
                "SELECT recent_errors FROM business_settings WHERE business_id = ?1",
                params![business_id],
                |row| row.get(0),
            )?;
            let mut errors: Vec<AutomationError> = serde_json::from_str(&current)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

            errors.push(error);
            bound_errors(&mut errors, Utc::now());

            let json = serde_json::to_string(&errors)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            conn.execute(
                "UPDATE business_settings SET recent_errors = ?1 WHERE business_id = ?2",
                params![json, business_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Drop recent errors older than the cutoff.
pub async fn prune_automation_errors(
    db: &Database,
    business_id: &BusinessId,
    cutoff: DateTime<Utc>,
) -> Result<(), ReplyflowError> {
    let business_id = business_id.0.clone();
    db.connection()
        .call(move |conn| {
            let current: String = conn.query_row(
                "SELECT recent_errors FROM business_settings WHERE business_id = ?1",
                params![business_id],
                |row| row.get(0),
            )?;
            let mut errors: Vec<AutomationError> = serde_json::from_str(&current)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

            errors.retain(|e| e.timestamp >= cutoff);

            let json = serde_json::to_string(&errors)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            conn.execute(
                "UPDATE business_settings SET recent_errors = ?1 WHERE business_id = ?2",
                params![json, business_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply the retention window and size cap, keeping the newest entries.
fn bound_errors(errors: &mut Vec<AutomationError>, now: DateTime<Utc>) {
    let cutoff = now - Duration::hours(ERROR_RETENTION_HOURS);
    errors.retain(|e| e.timestamp >= cutoff);
    if errors.len() > MAX_RECENT_ERRORS {
        let excess = errors.len() - MAX_RECENT_ERRORS;
        errors.drain(..excess);
    }
}
