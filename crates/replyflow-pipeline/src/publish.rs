// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication wrapper: the external publish call plus its side effects.
//!
//! The status transition and the activity-log append happen here so every
//! caller (scheduled run or on-demand retry) gets identical semantics.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::time::timeout;
use tracing::{debug, info};

use replyflow_core::ReplyflowError;
use replyflow_core::traits::{PublishAdapter, StorageAdapter};
use replyflow_core::types::{ActivityEntry, PublishRequest, Review};

/// Outcome of a publication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Posted,
    /// The review already carried a published timestamp; nothing was sent.
    AlreadyPosted,
}

pub struct Publication {
    publisher: Arc<dyn PublishAdapter + Send + Sync>,
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    call_timeout: Duration,
}

impl Publication {
    pub fn new(
        publisher: Arc<dyn PublishAdapter + Send + Sync>,
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            publisher,
            storage,
            call_timeout,
        }
    }

    /// Publish one review's reply.
    ///
    /// Idempotent: a review that already has a published timestamp is a
    /// no-op, so a concurrent manual approval racing a scheduled run cannot
    /// double-post. On success the review transitions to `posted` with an
    /// immutable audit copy of the text that was sent.
    pub async fn post(
        &self,
        review: &Review,
        user_id: &str,
        automated: bool,
    ) -> Result<PostOutcome, ReplyflowError> {
        if review.published_at.is_some() {
            debug!(review_id = %review.id.0, "already published, skipping");
            return Ok(PostOutcome::AlreadyPosted);
        }

        let reply_text = review
            .reply_text()
            .ok_or_else(|| ReplyflowError::Publish {
                message: format!("review {} has no reply to publish", review.id.0),
                source: None,
            })?
            .to_string();

        let request = PublishRequest {
            review_id: review.id.clone(),
            business_id: review.business_id.clone(),
            user_id: user_id.to_string(),
            reply_text: reply_text.clone(),
            automated,
        };

        timeout(self.call_timeout, self.publisher.publish(&request))
            .await
            .map_err(|_| ReplyflowError::Timeout {
                duration: self.call_timeout,
            })??;

        let posted_at = Utc::now();
        self.storage
            .mark_posted(&review.id, posted_at, &reply_text)
            .await?;
        self.storage
            .append_activity(&ActivityEntry {
                business_id: Some(review.business_id.clone()),
                entry_type: "reply_posted".to_string(),
                description: format!(
                    "Posted {} reply to {}-star review from {}",
                    if automated { "automated" } else { "manual" },
                    review.rating,
                    review.customer_name
                ),
                metadata: Some(json!({
                    "review_id": review.id.0,
                    "rating": review.rating,
                    "automated": automated,
                })),
            })
            .await?;

        info!(review_id = %review.id.0, automated, "reply published");
        Ok(PostOutcome::Posted)
    }
}
