// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters and fixtures shared across replyflow test suites.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use replyflow_core::ReplyflowError;
use replyflow_core::traits::{NotifyAdapter, PluginAdapter, ProviderAdapter, PublishAdapter};
use replyflow_core::types::{
    AdapterType, AutomationError, BusinessId, BusinessInfo, BusinessProfile, BusinessSettings,
    CompletionRequest, CompletionResponse, HealthStatus, PublishRequest, Review, ReviewId,
    ReviewStatus, RunSummary,
};

/// Scripted language-generation provider.
///
/// Responses are consumed FIFO; when the queue is empty the default response
/// is returned, or an error if no default was set.
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String, String>>>,
    default_response: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that answers every call with `text`.
    pub fn with_default(text: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response: Some(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that fails every call with `message`.
    pub fn always_failing(message: impl Into<String>) -> Self {
        let provider = Self::new();
        let message = message.into();
        {
            let mut queue = provider.responses.try_lock().expect("fresh mock");
            for _ in 0..64 {
                queue.push_back(Err(message.clone()));
            }
        }
        provider
    }

    pub async fn push_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(text.into()));
    }

    pub async fn push_failure(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
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
impl ProviderAdapter for MockProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ReplyflowError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().await.pop_front();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse { text }),
            Some(Err(message)) => Err(ReplyflowError::Provider {
                message,
                source: None,
            }),
            None => match &self.default_response {
                Some(text) => Ok(CompletionResponse { text: text.clone() }),
                None => Err(ReplyflowError::Provider {
                    message: "mock provider exhausted".to_string(),
                    source: None,
                }),
            },
        }
    }
}

/// Recording publisher; optionally fails every call.
pub struct MockPublisher {
    pub published: Mutex<Vec<PublishRequest>>,
    failure: Option<String>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    pub fn always_failing(message: impl Into<String>) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub async fn published_ids(&self) -> Vec<ReviewId> {
        self.published
            .lock()
            .await
            .iter()
            .map(|r| r.review_id.clone())
            .collect()
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPublisher {
    fn name(&self) -> &str {
        "mock-publisher"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publisher
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplyflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PublishAdapter for MockPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<(), ReplyflowError> {
        if let Some(message) = &self.failure {
            return Err(ReplyflowError::Publish {
                message: message.clone(),
                source: None,
            });
        }
        self.published.lock().await.push(request.clone());
        Ok(())
    }
}

/// Recording notifier; captures run summaries and admin escalations.
pub struct MockNotifier {
    pub summaries: Mutex<Vec<RunSummary>>,
    pub admin_alerts: Mutex<Vec<AutomationError>>,
    failure: Option<String>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            summaries: Mutex::new(Vec::new()),
            admin_alerts: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    pub fn always_failing(message: impl Into<String>) -> Self {
        Self {
            summaries: Mutex::new(Vec::new()),
            admin_alerts: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub async fn summary_count(&self) -> usize {
        self.summaries.lock().await.len()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
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
impl NotifyAdapter for MockNotifier {
    async fn send_summary(&self, summary: &RunSummary) -> Result<(), ReplyflowError> {
        if let Some(message) = &self.failure {
            return Err(ReplyflowError::Notify(message.clone()));
        }
        self.summaries.lock().await.push(summary.clone());
        Ok(())
    }

    async fn notify_admin(&self, error: &AutomationError) -> Result<(), ReplyflowError> {
        if let Some(message) = &self.failure {
            return Err(ReplyflowError::Notify(message.clone()));
        }
        self.admin_alerts.lock().await.push(error.clone());
        Ok(())
    }
}

/// A pending, unprocessed review fixture with sensible defaults.
pub fn review(id: &str, business_id: &str, rating: u8) -> Review {
    Review {
        id: ReviewId(id.to_string()),
        business_id: BusinessId(business_id.to_string()),
        source_id: None,
        rating,
        body: "Great service, the staff went out of their way to help.".to_string(),
        customer_name: "Jordan Miles".to_string(),
        reviewed_at: Utc::now(),
        generated_reply: None,
        final_reply: None,
        reply_tone: None,
        published_at: None,
        posted_reply: None,
        automated_reply: false,
        automation_failed: false,
        automation_error: None,
        auto_approved: false,
        status: ReviewStatus::Pending,
    }
}

/// A business profile fixture with all automation toggles off.
pub fn profile(business_id: &str) -> BusinessProfile {
    BusinessProfile {
        business_id: BusinessId(business_id.to_string()),
        info: BusinessInfo {
            name: "Harbor Coffee".to_string(),
            industry: "coffee shop".to_string(),
            support_email: Some("hello@harborcoffee.test".to_string()),
            support_phone: None,
        },
        settings: BusinessSettings::default(),
    }
}
