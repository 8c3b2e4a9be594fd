// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-demand recovery entry point.
//!
//! Independent of the scheduled run: re-attempts generation for reviews
//! flagged as failed, re-attempts posting for approved-but-unposted
//! reviews, and prunes stale entries from the bounded error list.

use serde_json::json;
use tracing::{info, warn};

use replyflow_core::types::{AutomationResult, AutomationStep, ReviewStatus, RunContext};
use replyflow_engine::extract_avoid_phrases;
use replyflow_recovery::classify;

use crate::orchestrator::Orchestrator;
use crate::publish::PostOutcome;

/// Bounded batch for one retry invocation.
pub const RETRY_BATCH_SIZE: usize = 20;

impl Orchestrator {
    /// Re-attempt failed generations and stalled publications.
    ///
    /// Idempotent: regenerating clears the failure flags, so a review fixed
    /// by one invocation is not picked up by the next; posting is guarded
    /// by the published timestamp.
    pub async fn retry_failed_automation(&self, ctx: &RunContext) -> AutomationResult {
        let mut result = AutomationResult::default();

        let profile = match self.storage().get_profile(&ctx.business_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(business_id = %ctx.business_id.0, "retry requested for unknown business");
                return result;
            }
            Err(e) => {
                let err = classify(AutomationStep::Pipeline, &e.to_string(), None);
                result.errors.push(err);
                return result;
            }
        };
        let settings = profile.settings;
        let info = profile.info;

        let failed = match self
            .storage()
            .failed_reviews(&ctx.business_id, RETRY_BATCH_SIZE)
            .await
        {
            Ok(failed) => failed,
            Err(e) => {
                let err = classify(AutomationStep::Pipeline, &e.to_string(), None);
                result.errors.push(err);
                return result;
            }
        };
        result.processed = failed.len();
        info!(
            business_id = %ctx.business_id.0,
            failed = failed.len(),
            "retrying failed automation"
        );

        let avoid = match self
            .storage()
            .recent_generated_replies(&ctx.business_id, self.config().recent_reply_window)
            .await
        {
            Ok(replies) => extract_avoid_phrases(&replies),
            Err(_) => Vec::new(),
        };

        for review in &failed {
            // A stored failure that classifies as non-retryable needs a
            // human fix first.
            if let Some(previous) = &review.automation_error {
                let class = classify(
                    AutomationStep::GenerateReply,
                    previous,
                    Some(review.id.clone()),
                );
                if !class.retryable {
                    continue;
                }
            }

            let draft = self
                .generator()
                .generate(review, &settings.brand_voice, &info, &avoid)
                .await;
            match draft.failure {
                None => {
                    match self
                        .storage()
                        .store_generated_reply(&review.id, &draft.text, draft.tone)
                        .await
                    {
                        Ok(()) => result.generated += 1,
                        Err(e) => {
                            self.record_error(
                                ctx,
                                &mut result,
                                AutomationStep::GenerateReply,
                                &e.to_string(),
                                Some(review.id.clone()),
                            )
                            .await;
                        }
                    }
                }
                Some(message) => {
                    if let Err(e) = self
                        .storage()
                        .mark_generation_failed(&review.id, &message)
                        .await
                    {
                        warn!(review_id = %review.id.0, error = %e, "could not update failure flag");
                    }
                    self.record_error(
                        ctx,
                        &mut result,
                        AutomationStep::GenerateReply,
                        &message,
                        Some(review.id.clone()),
                    )
                    .await;
                }
            }
        }

        // Approved reviews whose publication never went through.
        if settings.auto_post_enabled {
            let stalled = match self
                .storage()
                .approved_unposted_reviews(&ctx.business_id)
                .await
            {
                Ok(stalled) => stalled,
                Err(e) => {
                    self.record_error(
                        ctx,
                        &mut result,
                        AutomationStep::PostReply,
                        &e.to_string(),
                        None,
                    )
                    .await;
                    Vec::new()
                }
            };
            for review in &stalled {
                debug_assert_eq!(review.status, ReviewStatus::Approved);
                match self.publication().post(review, &ctx.user_id, true).await {
                    Ok(PostOutcome::Posted) => result.posted += 1,
                    Ok(PostOutcome::AlreadyPosted) => {}
                    Err(e) => {
                        self.record_error(
                            ctx,
                            &mut result,
                            AutomationStep::PostReply,
                            &e.to_string(),
                            Some(review.id.clone()),
                        )
                        .await;
                    }
                }
            }
        }

        if let Err(e) = self.recovery().prune_stale(&ctx.business_id).await {
            warn!(error = %e, "could not prune stale automation errors");
        }

        self.log_activity(
            ctx,
            "automation_retry_completed",
            format!(
                "Retry completed: {} regenerated, {} posted",
                result.generated, result.posted
            ),
            json!({
                "regenerated": result.generated,
                "posted": result.posted,
                "errors": result.errors.len(),
            }),
        )
        .await;

        result.success = true;
        result
    }
}
