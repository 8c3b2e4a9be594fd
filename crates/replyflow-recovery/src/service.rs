// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery service: persists classified errors and escalates critical ones.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, warn};

use replyflow_core::ReplyflowError;
use replyflow_core::traits::{NotifyAdapter, StorageAdapter};
use replyflow_core::types::{ActivityEntry, AutomationError, BusinessId, Severity};

/// Activity entry type written for errors requiring a human fix.
pub const ADMIN_ACTION_ENTRY: &str = "requires_admin_action";

pub struct RecoveryService {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    notifier: Arc<dyn NotifyAdapter + Send + Sync>,
}

impl RecoveryService {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        notifier: Arc<dyn NotifyAdapter + Send + Sync>,
    ) -> Self {
        Self { storage, notifier }
    }

    /// Persist one classified error on the business's bounded error list,
    /// escalating to an administrator when it is critical.
    ///
    /// Escalation happens here, at the single point every error passes
    /// through, so each critical error escalates exactly once.
    pub async fn record(
        &self,
        business_id: &BusinessId,
        error: &AutomationError,
    ) -> Result<(), ReplyflowError> {
        // Escalate even when the per-business list cannot be written (the
        // settings row may be the very thing that is broken).
        let persisted = self.storage.push_automation_error(business_id, error).await;
        if error.severity == Severity::Critical {
            self.escalate(business_id, error).await;
        }
        persisted
    }

    /// Best-effort admin escalation: a process-wide activity entry plus an
    /// admin notification. Its own failures are logged, never raised.
    async fn escalate(&self, business_id: &BusinessId, err: &AutomationError) {
        error!(
            business_id = %business_id.0,
            step = %err.step,
            message = %err.message,
            "critical automation error, escalating"
        );

        let entry = ActivityEntry {
            business_id: None,
            entry_type: ADMIN_ACTION_ENTRY.to_string(),
            description: format!(
                "Critical {} failure for business {}: {}",
                err.step, business_id.0, err.message
            ),
            metadata: Some(json!({
                "business_id": business_id.0,
                "step": err.step.to_string(),
                "review_id": err.review_id.as_ref().map(|r| r.0.clone()),
            })),
        };
        if let Err(e) = self.storage.append_activity(&entry).await {
            warn!(error = %e, "failed to write admin-action activity entry");
        }
        if let Err(e) = self.notifier.notify_admin(err).await {
            warn!(error = %e, "failed to deliver admin notification");
        }
    }

    /// Drop recorded errors older than 24 hours.
    pub async fn prune_stale(&self, business_id: &BusinessId) -> Result<(), ReplyflowError> {
        let cutoff = Utc::now() - Duration::hours(24);
        self.storage
            .prune_automation_errors(business_id, cutoff)
            .await
    }
}
