// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `status` subcommand: storage health, recent activity, and the
//! bounded recent-errors list for one business.

use std::sync::Arc;

use replyflow_config::ReplyflowConfig;
use replyflow_core::ReplyflowError;
use replyflow_core::traits::{PluginAdapter, StorageAdapter};
use replyflow_core::types::{BusinessId, HealthStatus};
use replyflow_storage::SqliteStorage;

const ACTIVITY_LIMIT: usize = 20;

pub async fn status_command(
    config: &ReplyflowConfig,
    business_id: Option<String>,
) -> Result<(), ReplyflowError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.database_path.clone()));
    storage.initialize().await?;

    match storage.health_check().await? {
        HealthStatus::Healthy => println!("storage: healthy ({})", config.storage.database_path),
        HealthStatus::Degraded(reason) => println!("storage: degraded ({reason})"),
        HealthStatus::Unhealthy(reason) => println!("storage: unhealthy ({reason})"),
    }

    let business = business_id.map(BusinessId);
    if let Some(business) = &business {
        match storage.get_profile(business).await? {
            Some(profile) => {
                println!("business: {} ({})", profile.info.name, business.0);
                println!(
                    "  auto_reply={} auto_post={} notifications={} approval_mode={}",
                    profile.settings.auto_reply_enabled,
                    profile.settings.auto_post_enabled,
                    profile.settings.email_notifications_enabled,
                    profile.settings.approval_mode
                );
                match profile.settings.last_automation_run {
                    Some(at) => println!("  last run: {at}"),
                    None => println!("  last run: never"),
                }
                if profile.settings.recent_errors.is_empty() {
                    println!("  recent errors: none");
                } else {
                    println!("  recent errors:");
                    for error in &profile.settings.recent_errors {
                        println!(
                            "    [{} {} {}] {}",
                            error.timestamp, error.step, error.severity, error.message
                        );
                    }
                }
            }
            None => println!("business {} not found", business.0),
        }
    }

    let activity = storage.recent_activity(business.as_ref(), ACTIVITY_LIMIT).await?;
    if activity.is_empty() {
        println!("activity: none");
    } else {
        println!("activity (most recent first):");
        for record in &activity {
            let scope = record
                .business_id
                .as_ref()
                .map(|b| b.0.as_str())
                .unwrap_or("-");
            println!(
                "  {} [{}] {} {}",
                record.created_at, scope, record.entry_type, record.description
            );
        }
    }

    storage.close().await
}
