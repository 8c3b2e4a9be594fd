// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run summary construction and the default log-backed notifier.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use replyflow_core::ReplyflowError;
use replyflow_core::traits::{NotifyAdapter, PluginAdapter};
use replyflow_core::types::{
    AdapterType, ApprovalMode, AutomationError, HealthStatus, PendingSummary, PostedSummary,
    Review, ReviewStatus, RunContext, RunSummary,
};
use replyflow_policy::pending_reason;

const EXCERPT_WORDS: usize = 12;

fn excerpt(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= EXCERPT_WORDS {
        text.to_string()
    } else {
        format!("{}...", words[..EXCERPT_WORDS].join(" "))
    }
}

/// Build the single per-run summary from the final state of the worked set.
///
/// Posted reviews are listed with a reply excerpt; reviews still pending
/// with a reply are listed with the reason they are pending.
pub fn build_summary(
    ctx: &RunContext,
    mode: ApprovalMode,
    reviews: &[Review],
    generated: usize,
    approved: usize,
    started_at: DateTime<Utc>,
) -> RunSummary {
    let posted = reviews
        .iter()
        .filter(|r| r.status == ReviewStatus::Posted)
        .map(|r| PostedSummary {
            review_id: r.id.clone(),
            rating: r.rating,
            customer_name: r.customer_name.clone(),
            reply_excerpt: excerpt(r.reply_text().unwrap_or_default()),
        })
        .collect();

    let pending = reviews
        .iter()
        .filter(|r| r.status == ReviewStatus::Pending && r.reply_text().is_some())
        .map(|r| PendingSummary {
            review_id: r.id.clone(),
            rating: r.rating,
            customer_name: r.customer_name.clone(),
            reason: pending_reason(mode, r.rating),
        })
        .collect();

    RunSummary {
        business_id: ctx.business_id.clone(),
        user_id: ctx.user_id.clone(),
        slot_id: ctx.slot_id.clone(),
        generated,
        approved,
        posted,
        pending,
        started_at,
        finished_at: Utc::now(),
    }
}

/// Notifier that writes summaries to the log instead of sending email.
///
/// Used when no delivery backend is wired up; delivery itself is an
/// external collaborator.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl PluginAdapter for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplyflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl NotifyAdapter for LogNotifier {
    async fn send_summary(&self, summary: &RunSummary) -> Result<(), ReplyflowError> {
        info!(
            business_id = %summary.business_id.0,
            generated = summary.generated,
            approved = summary.approved,
            posted = summary.posted.len(),
            pending = summary.pending.len(),
            "automation run summary"
        );
        for item in &summary.pending {
            info!(
                review_id = %item.review_id.0,
                rating = item.rating,
                reason = %item.reason,
                "reply awaiting approval"
            );
        }
        Ok(())
    }

    async fn notify_admin(&self, error: &AutomationError) -> Result<(), ReplyflowError> {
        warn!(
            step = %error.step,
            severity = %error.severity,
            message = %error.message,
            "admin attention required"
        );
        Ok(())
    }
}
