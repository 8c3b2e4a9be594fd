// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The automation orchestrator.
//!
//! Sequences generation, approval, publication, and notification over one
//! business's unprocessed reviews. Each step is toggle-gated and each
//! review is fault-isolated: a failure on one review never aborts its
//! siblings. Idempotency comes from the per-review flags checked by the
//! `unprocessed_reviews` query, so a partially completed run is safe to
//! resume on the next invocation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde_json::json;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use replyflow_config::AutomationConfig;
use replyflow_core::traits::{NotifyAdapter, ProviderAdapter, PublishAdapter, StorageAdapter};
use replyflow_core::types::{
    ActivityEntry, ApprovalMode, AutomationResult, AutomationStep, ReviewId, ReviewStatus,
    RunContext,
};
use replyflow_engine::{ReplyGenerator, RunPhraseSet, extract_avoid_phrases};
use replyflow_policy::should_auto_approve;
use replyflow_recovery::{RecoveryService, classify};

use crate::notify::build_summary;
use crate::publish::{PostOutcome, Publication};

pub struct Orchestrator {
    storage: Arc<dyn StorageAdapter + Send + Sync>,
    generator: ReplyGenerator,
    publication: Publication,
    notifier: Arc<dyn NotifyAdapter + Send + Sync>,
    recovery: RecoveryService,
    config: AutomationConfig,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        storage: Arc<dyn StorageAdapter + Send + Sync>,
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
        publisher: Arc<dyn PublishAdapter + Send + Sync>,
        notifier: Arc<dyn NotifyAdapter + Send + Sync>,
        config: AutomationConfig,
        max_tokens: u32,
    ) -> Self {
        let generator = ReplyGenerator::new(
            provider,
            Duration::from_secs(config.provider_timeout_secs),
            max_tokens,
        );
        let publication = Publication::new(
            publisher,
            storage.clone(),
            Duration::from_secs(config.publish_timeout_secs),
        );
        let recovery = RecoveryService::new(storage.clone(), notifier.clone());
        Self {
            storage,
            generator,
            publication,
            notifier,
            recovery,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops new batches from starting when cancelled. In-flight
    /// review processing is allowed to finish.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Execute one automation run for the business in `ctx`.
    ///
    /// Never returns an error: whole-run failures come back as a result
    /// with `success == false` and a critical entry in `errors`.
    pub async fn run(&self, ctx: &RunContext) -> AutomationResult {
        let started_at = Utc::now();
        let deadline = Instant::now() + Duration::from_secs(self.config.run_deadline_secs);
        let mut result = AutomationResult::default();

        let profile = match self.storage.get_profile(&ctx.business_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                let message = format!("business settings not found for {}", ctx.business_id.0);
                return self.abort_run(ctx, result, &message).await;
            }
            Err(e) => return self.abort_run(ctx, result, &e.to_string()).await,
        };
        let settings = profile.settings;
        let info = profile.info;

        self.log_activity(
            ctx,
            "automation_run_started",
            format!("Automation run started for {}", info.name),
            json!({ "slot_id": ctx.slot_id, "user_id": ctx.user_id }),
        )
        .await;

        let mut reviews = match self.storage.unprocessed_reviews(&ctx.business_id).await {
            Ok(reviews) => reviews,
            Err(e) => return self.abort_run(ctx, result, &e.to_string()).await,
        };
        result.processed = reviews.len();
        info!(
            business_id = %ctx.business_id.0,
            unprocessed = reviews.len(),
            "automation run started"
        );

        // Step 1: generation, in bounded concurrent batches.
        if settings.auto_reply_enabled && !reviews.is_empty() {
            let persisted_avoid = match self
                .storage
                .recent_generated_replies(&ctx.business_id, self.config.recent_reply_window)
                .await
            {
                Ok(replies) => extract_avoid_phrases(&replies),
                Err(e) => {
                    warn!(error = %e, "could not load recent replies, generating without avoid list");
                    Vec::new()
                }
            };
            let run_phrases = RunPhraseSet::new();
            let batch_size = self.config.batch_size.max(1);
            let total = reviews.len();
            let mut index = 0;

            while index < total {
                if Instant::now() >= deadline || self.cancel.is_cancelled() {
                    warn!(
                        remaining = total - index,
                        "run deadline reached, returning partial result"
                    );
                    break;
                }
                if index > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
                }
                let end = (index + batch_size).min(total);
                let avoid = run_phrases.merged_with(&persisted_avoid).await;

                let drafts = join_all(reviews[index..end].iter().map(|review| {
                    self.generator
                        .generate(review, &settings.brand_voice, &info, &avoid)
                }))
                .await;

                for (offset, draft) in drafts.into_iter().enumerate() {
                    let review = &mut reviews[index + offset];
                    match draft.failure {
                        None => {
                            if let Err(e) = self
                                .storage
                                .store_generated_reply(&review.id, &draft.text, draft.tone)
                                .await
                            {
                                self.record_error(
                                    ctx,
                                    &mut result,
                                    AutomationStep::GenerateReply,
                                    &e.to_string(),
                                    Some(review.id.clone()),
                                )
                                .await;
                                continue;
                            }
                            run_phrases.record(&draft.text).await;
                            review.generated_reply = Some(draft.text);
                            review.reply_tone = Some(draft.tone);
                            review.automated_reply = true;
                            result.generated += 1;
                        }
                        Some(message) => {
                            // The template fallback text is deliberately not
                            // persisted: the review stays reply-less and
                            // flagged for the retry path.
                            if let Err(e) = self
                                .storage
                                .mark_generation_failed(&review.id, &message)
                                .await
                            {
                                warn!(review_id = %review.id.0, error = %e, "could not flag failed generation");
                            }
                            review.automation_failed = true;
                            review.automation_error = Some(message.clone());
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
                index = end;
            }

            self.log_activity(
                ctx,
                "replies_generated",
                format!("Generated {} replies", result.generated),
                json!({ "generated": result.generated, "failed": result.errors.len() }),
            )
            .await;
        }

        // Step 2: auto-approval.
        if settings.approval_mode != ApprovalMode::Manual {
            for review in reviews.iter_mut() {
                if !should_auto_approve(settings.approval_mode, review) {
                    continue;
                }
                match self.storage.approve_review(&review.id).await {
                    Ok(()) => {
                        review.status = ReviewStatus::Approved;
                        review.auto_approved = true;
                        result.approved += 1;
                    }
                    Err(e) => {
                        // Held back, still pending; the summary will show it.
                        warn!(review_id = %review.id.0, error = %e, "approval write failed");
                    }
                }
            }
        }

        // Step 3: publication.
        if settings.auto_post_enabled {
            // A publish failure in an earlier run leaves the review approved
            // and unposted. Those stalled reviews are picked up here too, so
            // the scheduled path heals itself without the retry entry point.
            match self
                .storage
                .approved_unposted_reviews(&ctx.business_id)
                .await
            {
                Ok(stalled) => {
                    for review in stalled {
                        if !reviews.iter().any(|r| r.id == review.id) {
                            reviews.push(review);
                        }
                    }
                }
                Err(e) => {
                    self.record_error(
                        ctx,
                        &mut result,
                        AutomationStep::PostReply,
                        &e.to_string(),
                        None,
                    )
                    .await;
                }
            }
            for review in reviews.iter_mut() {
                if review.status != ReviewStatus::Approved || review.reply_text().is_none() {
                    continue;
                }
                match self.publication.post(review, &ctx.user_id, true).await {
                    Ok(PostOutcome::Posted) => {
                        review.status = ReviewStatus::Posted;
                        review.published_at = Some(Utc::now());
                        result.posted += 1;
                    }
                    Ok(PostOutcome::AlreadyPosted) => {}
                    Err(e) => {
                        // Review stays approved, eligible for the next run.
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

        // Step 4: one summary notification for the whole run.
        let pending_with_reply = reviews
            .iter()
            .filter(|r| r.status == ReviewStatus::Pending && r.reply_text().is_some())
            .count();
        if settings.email_notifications_enabled && (result.posted > 0 || pending_with_reply > 0) {
            let summary = build_summary(
                ctx,
                settings.approval_mode,
                &reviews,
                result.generated,
                result.approved,
                started_at,
            );
            let notify_timeout = Duration::from_secs(self.config.notify_timeout_secs);
            match timeout(notify_timeout, self.notifier.send_summary(&summary)).await {
                Ok(Ok(())) => result.notified = 1,
                Ok(Err(e)) => {
                    self.record_error(
                        ctx,
                        &mut result,
                        AutomationStep::SendNotification,
                        &e.to_string(),
                        None,
                    )
                    .await;
                }
                Err(_) => {
                    self.record_error(
                        ctx,
                        &mut result,
                        AutomationStep::SendNotification,
                        &format!("notification timed out after {notify_timeout:?}"),
                        None,
                    )
                    .await;
                }
            }
        }

        if let Err(e) = self.storage.update_last_run(&ctx.business_id, Utc::now()).await {
            warn!(error = %e, "could not update last automation run timestamp");
        }
        self.log_activity(
            ctx,
            "automation_run_completed",
            format!(
                "Run completed: {} processed, {} generated, {} approved, {} posted",
                result.processed, result.generated, result.approved, result.posted
            ),
            json!({
                "processed": result.processed,
                "generated": result.generated,
                "approved": result.approved,
                "posted": result.posted,
                "errors": result.errors.len(),
            }),
        )
        .await;

        result.success = true;
        result
    }

    /// Whole-run failure: classify as a pipeline error, escalate, terminate.
    async fn abort_run(
        &self,
        ctx: &RunContext,
        mut result: AutomationResult,
        message: &str,
    ) -> AutomationResult {
        warn!(business_id = %ctx.business_id.0, message, "automation run aborted");
        let err = classify(AutomationStep::Pipeline, message, None);
        if let Err(e) = self.recovery.record(&ctx.business_id, &err).await {
            warn!(error = %e, "could not persist pipeline error");
        }
        result.errors.push(err);
        self.log_activity(
            ctx,
            "automation_run_failed",
            format!("Automation run failed: {message}"),
            json!({ "message": message }),
        )
        .await;
        result.success = false;
        result
    }

    pub(crate) async fn record_error(
        &self,
        ctx: &RunContext,
        result: &mut AutomationResult,
        step: AutomationStep,
        message: &str,
        review_id: Option<ReviewId>,
    ) {
        let err = classify(step, message, review_id);
        if let Err(e) = self.recovery.record(&ctx.business_id, &err).await {
            warn!(error = %e, "could not persist automation error");
        }
        result.errors.push(err);
    }

    pub(crate) async fn log_activity(
        &self,
        ctx: &RunContext,
        entry_type: &str,
        description: String,
        metadata: serde_json::Value,
    ) {
        let entry = ActivityEntry {
            business_id: Some(ctx.business_id.clone()),
            entry_type: entry_type.to_string(),
            description,
            metadata: Some(metadata),
        };
        if let Err(e) = self.storage.append_activity(&entry).await {
            warn!(entry_type, error = %e, "could not append activity entry");
        }
    }

    pub(crate) fn storage(&self) -> &Arc<dyn StorageAdapter + Send + Sync> {
        &self.storage
    }

    pub(crate) fn generator(&self) -> &ReplyGenerator {
        &self.generator
    }

    pub(crate) fn publication(&self) -> &Publication {
        &self.publication
    }

    pub(crate) fn recovery(&self) -> &RecoveryService {
        &self.recovery
    }

    pub(crate) fn config(&self) -> &AutomationConfig {
        &self.config
    }
}
