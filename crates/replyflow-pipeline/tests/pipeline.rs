// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end orchestrator runs against a real SQLite store with mock
//! provider, publisher, and notifier adapters.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use replyflow_config::AutomationConfig;
use replyflow_core::ReplyflowError;
use replyflow_core::traits::{PluginAdapter, ProviderAdapter, StorageAdapter};
use replyflow_core::types::{
    AdapterType, ApprovalMode, AutomationStep, BusinessId, BusinessProfile, CompletionRequest,
    CompletionResponse, HealthStatus, PendingReason, ReviewStatus, RunContext, Severity,
};
use replyflow_pipeline::Orchestrator;
use replyflow_storage::SqliteStorage;
use replyflow_storage::queries::reviews as review_queries;
use replyflow_storage::queries::settings as settings_queries;
use replyflow_test_utils::{MockNotifier, MockProvider, MockPublisher, profile, review};
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn fast_config() -> AutomationConfig {
    AutomationConfig {
        batch_size: 5,
        batch_delay_ms: 0,
        run_deadline_secs: 60,
        provider_timeout_secs: 5,
        publish_timeout_secs: 5,
        notify_timeout_secs: 5,
        recent_reply_window: 10,
    }
}

fn automated_profile() -> BusinessProfile {
    let mut profile = profile("biz-1");
    profile.settings.auto_reply_enabled = true;
    profile.settings.auto_post_enabled = true;
    profile.settings.email_notifications_enabled = true;
    profile.settings.approval_mode = ApprovalMode::Auto4Plus;
    profile
}

fn ctx() -> RunContext {
    RunContext {
        business_id: BusinessId("biz-1".into()),
        user_id: "user-1".into(),
        slot_id: Some("morning".into()),
    }
}

struct Harness {
    storage: Arc<SqliteStorage>,
    publisher: Arc<MockPublisher>,
    notifier: Arc<MockNotifier>,
    _dir: tempfile::TempDir,
}

async fn setup(
    profile: &BusinessProfile,
    provider: Arc<dyn ProviderAdapter + Send + Sync>,
) -> (Orchestrator, Harness) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pipeline.db");
    let storage = Arc::new(SqliteStorage::new(path.to_str().unwrap()));
    storage.initialize().await.unwrap();
    settings_queries::upsert_profile(storage.database().unwrap(), profile)
        .await
        .unwrap();

    let publisher = Arc::new(MockPublisher::new());
    let notifier = Arc::new(MockNotifier::new());
    let orchestrator = Orchestrator::new(
        storage.clone(),
        provider,
        publisher.clone(),
        notifier.clone(),
        fast_config(),
        512,
    );
    (
        orchestrator,
        Harness {
            storage,
            publisher,
            notifier,
            _dir: dir,
        },
    )
}

#[tokio::test]
async fn five_star_review_is_generated_approved_posted_and_notified() {
    let provider = Arc::new(MockProvider::with_default(
        "Hi Jordan, thanks for the wonderful words about the team!",
    ));
    let (orchestrator, h) = setup(&automated_profile(), provider).await;

    let r = review("r-1", "biz-1", 5);
    review_queries::insert_review(h.storage.database().unwrap(), &r)
        .await
        .unwrap();

    let result = orchestrator.run(&ctx()).await;
    assert!(result.success);
    assert_eq!(result.processed, 1);
    assert_eq!(result.generated, 1);
    assert_eq!(result.approved, 1);
    assert_eq!(result.posted, 1);
    assert_eq!(result.notified, 1);
    assert!(result.errors.is_empty());

    let stored = h.storage.get_review(&r.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReviewStatus::Posted);
    assert!(stored.auto_approved);
    assert!(stored.automated_reply);
    assert!(stored.generated_reply.is_some());
    assert!(stored.published_at.is_some());

    let summaries = h.notifier.summaries.lock().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].posted.len(), 1);
    assert!(summaries[0].pending.is_empty());

    let profile = h.storage.get_profile(&ctx().business_id).await.unwrap().unwrap();
    assert!(profile.settings.last_automation_run.is_some());
}

#[tokio::test]
async fn two_star_review_stays_pending_with_low_rating_reason() {
    let provider = Arc::new(MockProvider::with_default(
        "Hi Jordan, we're sorry about the mix-up and would like to make it right.",
    ));
    let (orchestrator, h) = setup(&automated_profile(), provider).await;

    let r = review("r-1", "biz-1", 2);
    review_queries::insert_review(h.storage.database().unwrap(), &r)
        .await
        .unwrap();

    let result = orchestrator.run(&ctx()).await;
    assert!(result.success);
    assert_eq!(result.generated, 1);
    assert_eq!(result.approved, 0);
    assert_eq!(result.posted, 0);

    let stored = h.storage.get_review(&r.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReviewStatus::Pending);
    assert!(!stored.auto_approved);
    assert!(stored.generated_reply.is_some());

    let summaries = h.notifier.summaries.lock().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].pending.len(), 1);
    assert_eq!(summaries[0].pending[0].reason, PendingReason::LowRating);
}

#[tokio::test]
async fn generation_failure_flags_review_without_persisting_fallback() {
    let provider = Arc::new(MockProvider::always_failing("upstream exploded"));
    let (orchestrator, h) = setup(&automated_profile(), provider).await;

    let r = review("r-1", "biz-1", 5);
    review_queries::insert_review(h.storage.database().unwrap(), &r)
        .await
        .unwrap();

    let result = orchestrator.run(&ctx()).await;
    assert!(result.success);
    assert_eq!(result.generated, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].step, AutomationStep::GenerateReply);
    assert_eq!(result.errors[0].step.to_string(), "generate_ai_reply");

    let stored = h.storage.get_review(&r.id).await.unwrap().unwrap();
    assert!(!stored.automated_reply);
    assert!(stored.automation_failed);
    assert!(
        stored
            .automation_error
            .as_deref()
            .unwrap()
            .contains("upstream exploded")
    );
    assert!(stored.generated_reply.is_none());
    assert_eq!(stored.status, ReviewStatus::Pending);
}

#[tokio::test]
async fn second_run_changes_nothing() {
    let provider = Arc::new(MockProvider::with_default("Hi Jordan, thanks a lot!"));
    let (orchestrator, h) = setup(&automated_profile(), provider.clone()).await;

    review_queries::insert_review(h.storage.database().unwrap(), &review("r-1", "biz-1", 5))
        .await
        .unwrap();
    review_queries::insert_review(h.storage.database().unwrap(), &review("r-2", "biz-1", 2))
        .await
        .unwrap();

    let first = orchestrator.run(&ctx()).await;
    assert_eq!(first.processed, 2);
    let calls_after_first = provider.call_count();
    let snapshot_1 = h
        .storage
        .get_review(&review("r-1", "biz-1", 5).id)
        .await
        .unwrap()
        .unwrap();
    let snapshot_2 = h
        .storage
        .get_review(&review("r-2", "biz-1", 2).id)
        .await
        .unwrap()
        .unwrap();

    let second = orchestrator.run(&ctx()).await;
    assert!(second.success);
    assert_eq!(second.processed, 0);
    assert_eq!(second.generated, 0);
    assert_eq!(second.posted, 0);
    assert_eq!(provider.call_count(), calls_after_first);

    let after_1 = h.storage.get_review(&snapshot_1.id).await.unwrap().unwrap();
    let after_2 = h.storage.get_review(&snapshot_2.id).await.unwrap().unwrap();
    assert_eq!(after_1.status, snapshot_1.status);
    assert_eq!(after_1.generated_reply, snapshot_1.generated_reply);
    assert_eq!(after_2.status, snapshot_2.status);
    assert_eq!(after_2.generated_reply, snapshot_2.generated_reply);
}

#[tokio::test]
async fn manual_mode_generates_but_never_approves() {
    let provider = Arc::new(MockProvider::with_default("Hi Jordan, thank you!"));
    let mut profile = automated_profile();
    profile.settings.approval_mode = ApprovalMode::Manual;
    let (orchestrator, h) = setup(&profile, provider).await;

    review_queries::insert_review(h.storage.database().unwrap(), &review("r-1", "biz-1", 5))
        .await
        .unwrap();

    let result = orchestrator.run(&ctx()).await;
    assert_eq!(result.generated, 1);
    assert_eq!(result.approved, 0);
    assert_eq!(result.posted, 0);

    let summaries = h.notifier.summaries.lock().await;
    assert_eq!(summaries[0].pending[0].reason, PendingReason::ManualApproval);
}

#[tokio::test]
async fn publish_failure_keeps_review_approved_and_retry_posts_it() {
    let provider = Arc::new(MockProvider::with_default("Hi Jordan, thanks!"));
    let dir = tempdir().unwrap();
    let path = dir.path().join("retrypost.db");
    let storage = Arc::new(SqliteStorage::new(path.to_str().unwrap()));
    storage.initialize().await.unwrap();
    settings_queries::upsert_profile(storage.database().unwrap(), &automated_profile())
        .await
        .unwrap();
    review_queries::insert_review(storage.database().unwrap(), &review("r-1", "biz-1", 5))
        .await
        .unwrap();

    // First run with a broken publisher.
    let failing = Orchestrator::new(
        storage.clone(),
        provider.clone(),
        Arc::new(MockPublisher::always_failing("rate limit hit")),
        Arc::new(MockNotifier::new()),
        fast_config(),
        512,
    );
    let result = failing.run(&ctx()).await;
    assert!(result.success);
    assert_eq!(result.posted, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].step, AutomationStep::PostReply);
    assert_eq!(result.errors[0].severity, Severity::High);

    let stored = storage
        .get_review(&review("r-1", "biz-1", 5).id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReviewStatus::Approved);
    assert!(stored.published_at.is_none());

    // Retry entry point with a working publisher.
    let publisher = Arc::new(MockPublisher::new());
    let working = Orchestrator::new(
        storage.clone(),
        provider,
        publisher.clone(),
        Arc::new(MockNotifier::new()),
        fast_config(),
        512,
    );
    let retry = working.retry_failed_automation(&ctx()).await;
    assert!(retry.success);
    assert_eq!(retry.posted, 1);

    let stored = storage
        .get_review(&review("r-1", "biz-1", 5).id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReviewStatus::Posted);
    assert_eq!(publisher.published_ids().await.len(), 1);
}

#[tokio::test]
async fn next_scheduled_run_posts_reviews_stalled_by_publish_failure() {
    let provider = Arc::new(MockProvider::with_default("Hi Jordan, thanks!"));
    let dir = tempdir().unwrap();
    let path = dir.path().join("stalled.db");
    let storage = Arc::new(SqliteStorage::new(path.to_str().unwrap()));
    storage.initialize().await.unwrap();
    settings_queries::upsert_profile(storage.database().unwrap(), &automated_profile())
        .await
        .unwrap();
    review_queries::insert_review(storage.database().unwrap(), &review("r-1", "biz-1", 5))
        .await
        .unwrap();

    let failing = Orchestrator::new(
        storage.clone(),
        provider.clone(),
        Arc::new(MockPublisher::always_failing("rate limit hit")),
        Arc::new(MockNotifier::new()),
        fast_config(),
        512,
    );
    let first = failing.run(&ctx()).await;
    assert_eq!(first.posted, 0);
    let stored = storage
        .get_review(&review("r-1", "biz-1", 5).id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReviewStatus::Approved);

    // The next scheduled run must pick the stalled review up on its own,
    // without anyone invoking the retry entry point.
    let publisher = Arc::new(MockPublisher::new());
    let working = Orchestrator::new(
        storage.clone(),
        provider,
        publisher.clone(),
        Arc::new(MockNotifier::new()),
        fast_config(),
        512,
    );
    let second = working.run(&ctx()).await;
    assert!(second.success);
    assert_eq!(second.processed, 0);
    assert_eq!(second.generated, 0);
    assert_eq!(second.posted, 1);

    let stored = storage
        .get_review(&review("r-1", "biz-1", 5).id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReviewStatus::Posted);
    assert!(stored.published_at.is_some());
    assert_eq!(publisher.published_ids().await.len(), 1);
}

#[tokio::test]
async fn retry_regenerates_failed_reviews() {
    let provider = Arc::new(MockProvider::new());
    provider.push_failure("temporary outage").await;
    provider
        .push_response("Hi Jordan, thanks for your patience with us!")
        .await;
    let (orchestrator, h) = setup(&automated_profile(), provider).await;

    let r = review("r-1", "biz-1", 4);
    review_queries::insert_review(h.storage.database().unwrap(), &r)
        .await
        .unwrap();

    let first = orchestrator.run(&ctx()).await;
    assert_eq!(first.generated, 0);
    let stored = h.storage.get_review(&r.id).await.unwrap().unwrap();
    assert!(stored.automation_failed);

    let retry = orchestrator.retry_failed_automation(&ctx()).await;
    assert!(retry.success);
    assert_eq!(retry.generated, 1);

    let stored = h.storage.get_review(&r.id).await.unwrap().unwrap();
    assert!(!stored.automation_failed);
    assert!(stored.automation_error.is_none());
    assert!(stored.automated_reply);
    assert!(stored.generated_reply.is_some());
}

#[tokio::test]
async fn retry_skips_non_retryable_failures() {
    let provider = Arc::new(MockProvider::always_failing("invalid API key"));
    let (orchestrator, h) = setup(&automated_profile(), provider.clone()).await;

    let r = review("r-1", "biz-1", 5);
    review_queries::insert_review(h.storage.database().unwrap(), &r)
        .await
        .unwrap();

    orchestrator.run(&ctx()).await;
    let calls = provider.call_count();

    let retry = orchestrator.retry_failed_automation(&ctx()).await;
    assert!(retry.success);
    assert_eq!(retry.generated, 0);
    // The critical failure was not re-attempted.
    assert_eq!(provider.call_count(), calls);
}

#[tokio::test]
async fn notification_failure_is_low_severity_and_does_not_abort() {
    let provider = Arc::new(MockProvider::with_default("Hi Jordan, thanks!"));
    let dir = tempdir().unwrap();
    let path = dir.path().join("notify.db");
    let storage = Arc::new(SqliteStorage::new(path.to_str().unwrap()));
    storage.initialize().await.unwrap();
    settings_queries::upsert_profile(storage.database().unwrap(), &automated_profile())
        .await
        .unwrap();
    review_queries::insert_review(storage.database().unwrap(), &review("r-1", "biz-1", 5))
        .await
        .unwrap();

    let orchestrator = Orchestrator::new(
        storage.clone(),
        provider,
        Arc::new(MockPublisher::new()),
        Arc::new(MockNotifier::always_failing("smtp refused")),
        fast_config(),
        512,
    );
    let result = orchestrator.run(&ctx()).await;
    assert!(result.success);
    assert_eq!(result.posted, 1);
    assert_eq!(result.notified, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].step, AutomationStep::SendNotification);
    assert_eq!(result.errors[0].severity, Severity::Low);
}

#[tokio::test]
async fn missing_business_settings_aborts_with_critical_error() {
    let provider = Arc::new(MockProvider::with_default("unused"));
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.db");
    let storage = Arc::new(SqliteStorage::new(path.to_str().unwrap()));
    storage.initialize().await.unwrap();

    let orchestrator = Orchestrator::new(
        storage,
        provider,
        Arc::new(MockPublisher::new()),
        Arc::new(MockNotifier::new()),
        fast_config(),
        512,
    );
    let result = orchestrator.run(&ctx()).await;
    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].step, AutomationStep::Pipeline);
    assert_eq!(result.errors[0].severity, Severity::Critical);
}

/// Provider that picks the first canned reply whose opener is not already
/// named in the system prompt's avoid list.
struct AvoidAwareProvider {
    replies: Vec<&'static str>,
}

#[async_trait]
impl PluginAdapter for AvoidAwareProvider {
    fn name(&self) -> &str {
        "avoid-aware"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplyflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for AvoidAwareProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ReplyflowError> {
        let system = request.system.to_lowercase();
        for reply in &self.replies {
            let opener = reply
                .split_whitespace()
                .take(4)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            if !system.contains(&opener) {
                return Ok(CompletionResponse {
                    text: reply.to_string(),
                });
            }
        }
        Err(ReplyflowError::Provider {
            message: "no unused opener left".into(),
            source: None,
        })
    }
}

#[tokio::test]
async fn replies_in_one_run_do_not_share_openers() {
    let provider = Arc::new(AvoidAwareProvider {
        replies: vec![
            "Thank you for visiting us this week, we loved having you in!",
            "We appreciate you taking the time to share this lovely review!",
            "It was great to hear the espresso hit the spot for you!",
        ],
    });
    let mut profile = automated_profile();
    profile.settings.auto_post_enabled = false;
    let (orchestrator, h) = {
        let dir = tempdir().unwrap();
        let path = dir.path().join("openers.db");
        let storage = Arc::new(SqliteStorage::new(path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        settings_queries::upsert_profile(storage.database().unwrap(), &profile)
            .await
            .unwrap();
        let publisher = Arc::new(MockPublisher::new());
        let notifier = Arc::new(MockNotifier::new());
        let mut config = fast_config();
        // Sequential generation so each call sees the openers before it.
        config.batch_size = 1;
        let orchestrator = Orchestrator::new(
            storage.clone(),
            provider,
            publisher.clone(),
            notifier.clone(),
            config,
            512,
        );
        (
            orchestrator,
            Harness {
                storage,
                publisher,
                notifier,
                _dir: dir,
            },
        )
    };

    for i in 0..3 {
        review_queries::insert_review(
            h.storage.database().unwrap(),
            &review(&format!("r-{i}"), "biz-1", 5),
        )
        .await
        .unwrap();
    }

    let result = orchestrator.run(&ctx()).await;
    assert_eq!(result.generated, 3);

    let mut openers = Vec::new();
    for i in 0..3 {
        let stored = h
            .storage
            .get_review(&review(&format!("r-{i}"), "biz-1", 5).id)
            .await
            .unwrap()
            .unwrap();
        let opener = stored
            .generated_reply
            .unwrap()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        openers.push(opener);
    }
    openers.sort();
    openers.dedup();
    assert_eq!(openers.len(), 3, "openers must be pairwise distinct");
}

/// Provider that cancels the run's token as a side effect of a successful
/// call, simulating an operator shutdown while a batch is in flight.
struct CancellingProvider {
    token: OnceLock<CancellationToken>,
}

#[async_trait]
impl PluginAdapter for CancellingProvider {
    fn name(&self) -> &str {
        "cancelling"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplyflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for CancellingProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ReplyflowError> {
        if let Some(token) = self.token.get() {
            token.cancel();
        }
        Ok(CompletionResponse {
            text: "Hi Jordan, thanks for stopping by to see us!".into(),
        })
    }
}

#[tokio::test]
async fn cancellation_stops_new_batches_and_returns_partial_result() {
    let provider = Arc::new(CancellingProvider {
        token: OnceLock::new(),
    });
    let mut profile = automated_profile();
    profile.settings.auto_post_enabled = false;
    profile.settings.email_notifications_enabled = false;

    let dir = tempdir().unwrap();
    let path = dir.path().join("cancel.db");
    let storage = Arc::new(SqliteStorage::new(path.to_str().unwrap()));
    storage.initialize().await.unwrap();
    settings_queries::upsert_profile(storage.database().unwrap(), &profile)
        .await
        .unwrap();
    for i in 0..2 {
        review_queries::insert_review(
            storage.database().unwrap(),
            &review(&format!("r-{i}"), "biz-1", 5),
        )
        .await
        .unwrap();
    }

    let mut config = fast_config();
    config.batch_size = 1;
    let orchestrator = Orchestrator::new(
        storage.clone(),
        provider.clone(),
        Arc::new(MockPublisher::new()),
        Arc::new(MockNotifier::new()),
        config,
        512,
    );
    provider
        .token
        .set(orchestrator.cancellation_token())
        .unwrap();

    let result = orchestrator.run(&ctx()).await;
    assert!(result.success);
    assert_eq!(result.processed, 2);
    // The in-flight batch finished; the next batch never started.
    assert_eq!(result.generated, 1);

    let mut with_reply = 0;
    for i in 0..2 {
        let stored = storage
            .get_review(&review(&format!("r-{i}"), "biz-1", 5).id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.automation_failed);
        if stored.generated_reply.is_some() {
            with_reply += 1;
        } else {
            assert_eq!(stored.status, ReviewStatus::Pending);
        }
    }
    assert_eq!(with_reply, 1);
}

#[tokio::test]
async fn expired_deadline_returns_partial_result_without_new_batches() {
    let provider = Arc::new(MockProvider::with_default("Hi Jordan, thanks!"));
    let dir = tempdir().unwrap();
    let path = dir.path().join("deadline.db");
    let storage = Arc::new(SqliteStorage::new(path.to_str().unwrap()));
    storage.initialize().await.unwrap();
    settings_queries::upsert_profile(storage.database().unwrap(), &automated_profile())
        .await
        .unwrap();
    for i in 0..2 {
        review_queries::insert_review(
            storage.database().unwrap(),
            &review(&format!("r-{i}"), "biz-1", 5),
        )
        .await
        .unwrap();
    }

    let mut config = fast_config();
    config.run_deadline_secs = 0;
    let orchestrator = Orchestrator::new(
        storage.clone(),
        provider.clone(),
        Arc::new(MockPublisher::new()),
        Arc::new(MockNotifier::new()),
        config,
        512,
    );

    let result = orchestrator.run(&ctx()).await;
    assert!(result.success);
    assert_eq!(result.processed, 2);
    assert_eq!(result.generated, 0);
    assert_eq!(result.posted, 0);
    assert_eq!(provider.call_count(), 0);

    for i in 0..2 {
        let stored = storage
            .get_review(&review(&format!("r-{i}"), "biz-1", 5).id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ReviewStatus::Pending);
        assert!(stored.generated_reply.is_none());
        assert!(!stored.automation_failed);
    }
}
