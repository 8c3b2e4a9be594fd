// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for the review automation pipeline.
//!
//! These types cross adapter trait boundaries and are the only shapes the
//! orchestrator, policy engine, and recovery service agree on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier for a customer review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub String);

/// Opaque identifier for a business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Identifies the type of adapter behind a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Provider,
    Storage,
    Publisher,
    Notifier,
}

/// Lifecycle status of a review's response.
///
/// `pending -> approved -> posted`; `pending -> needs_edit`; `pending -> skipped`.
/// `posted` and `skipped` are terminal for automation; `approved` and
/// `needs_edit` are only revisited by a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Posted,
    NeedsEdit,
    Skipped,
}

/// Business-level policy controlling which ratings may skip human sign-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum ApprovalMode {
    #[strum(serialize = "manual")]
    #[serde(rename = "manual")]
    Manual,
    #[strum(serialize = "auto_4_plus")]
    #[serde(rename = "auto_4_plus")]
    Auto4Plus,
    #[strum(serialize = "auto_except_low")]
    #[serde(rename = "auto_except_low")]
    AutoExceptLow,
}

/// Brand voice preset selecting the base register of generated replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VoicePreset {
    Friendly,
    Professional,
    Playful,
    Custom,
}

impl VoicePreset {
    /// The tone label recorded on replies generated under this preset.
    ///
    /// `custom` has no dedicated template family and falls back to friendly.
    pub fn tone_label(self) -> ToneLabel {
        match self {
            VoicePreset::Friendly | VoicePreset::Custom => ToneLabel::Friendly,
            VoicePreset::Professional => ToneLabel::Professional,
            VoicePreset::Playful => ToneLabel::Playful,
        }
    }
}

/// Tone label stamped on a generated reply; keys the template fallback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ToneLabel {
    Friendly,
    Professional,
    Playful,
}

/// Pipeline step an automation error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AutomationStep {
    #[strum(serialize = "generate_ai_reply")]
    #[serde(rename = "generate_ai_reply")]
    GenerateReply,
    #[strum(serialize = "post_reply")]
    #[serde(rename = "post_reply")]
    PostReply,
    #[strum(serialize = "send_notification")]
    #[serde(rename = "send_notification")]
    SendNotification,
    #[strum(serialize = "automation_pipeline")]
    #[serde(rename = "automation_pipeline")]
    Pipeline,
}

/// Severity of a classified automation error. Ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Why a reviewed item is still pending after an automation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PendingReason {
    LowRating,
    ManualApproval,
}

/// One customer review and its response lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub business_id: BusinessId,
    /// Identifier on the external reputation platform, when known.
    pub source_id: Option<String>,
    /// Star rating, 1-5.
    pub rating: u8,
    pub body: String,
    pub customer_name: String,
    pub reviewed_at: DateTime<Utc>,
    pub generated_reply: Option<String>,
    /// Human-edited reply; overrides `generated_reply` when present.
    pub final_reply: Option<String>,
    pub reply_tone: Option<ToneLabel>,
    pub published_at: Option<DateTime<Utc>>,
    /// Immutable audit copy of whichever text was actually sent at publication.
    pub posted_reply: Option<String>,
    pub automated_reply: bool,
    pub automation_failed: bool,
    pub automation_error: Option<String>,
    pub auto_approved: bool,
    pub status: ReviewStatus,
}

impl Review {
    /// The reply text that would be published: the human edit when present,
    /// otherwise the generated draft.
    pub fn reply_text(&self) -> Option<&str> {
        self.final_reply
            .as_deref()
            .or(self.generated_reply.as_deref())
    }
}

/// Tunable tone profile applied to every generated reply for a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandVoice {
    pub preset: VoicePreset,
    /// 1 = very casual, 5 = very formal.
    pub formality: u8,
    /// 1 = reserved, 5 = very warm.
    pub warmth: u8,
    /// 1 = expansive, 5 = very brief.
    pub brevity: u8,
    pub custom_instruction: Option<String>,
}

impl Default for BrandVoice {
    fn default() -> Self {
        Self {
            preset: VoicePreset::Friendly,
            formality: 3,
            warmth: 3,
            brevity: 3,
            custom_instruction: None,
        }
    }
}

/// Per-business automation settings, read as an immutable snapshot per run.
///
/// Only `last_automation_run` and `recent_errors` are written back by the
/// pipeline, each through its own storage operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSettings {
    pub auto_sync_enabled: bool,
    pub auto_reply_enabled: bool,
    pub auto_post_enabled: bool,
    pub email_notifications_enabled: bool,
    pub approval_mode: ApprovalMode,
    pub sync_slot: Option<String>,
    pub brand_voice: BrandVoice,
    pub last_automation_run: Option<DateTime<Utc>>,
    /// Bounded to the most recent 24 hours / 10 entries.
    pub recent_errors: Vec<AutomationError>,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            auto_sync_enabled: false,
            auto_reply_enabled: false,
            auto_post_enabled: false,
            email_notifications_enabled: false,
            approval_mode: ApprovalMode::Manual,
            sync_slot: None,
            brand_voice: BrandVoice::default(),
            last_automation_run: None,
            recent_errors: Vec::new(),
        }
    }
}

/// Immutable-per-run business identity, used verbatim in prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessInfo {
    pub name: String,
    pub industry: String,
    pub support_email: Option<String>,
    pub support_phone: Option<String>,
}

/// Settings plus identity for one business, as fetched at the start of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessProfile {
    pub business_id: BusinessId,
    pub info: BusinessInfo,
    pub settings: BusinessSettings,
}

/// A classified failure produced by the error recovery service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationError {
    pub step: AutomationStep,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub review_id: Option<ReviewId>,
    pub severity: Severity,
    pub retryable: bool,
}

/// Run-scoped summary returned by the orchestrator. Never persisted as a row.
#[derive(Debug, Clone, Default)]
pub struct AutomationResult {
    pub success: bool,
    pub processed: usize,
    pub generated: usize,
    pub approved: usize,
    pub posted: usize,
    pub notified: usize,
    pub errors: Vec<AutomationError>,
}

/// Scheduler-supplied context for one orchestrator invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub business_id: BusinessId,
    pub user_id: String,
    pub slot_id: Option<String>,
}

/// A posted review line in the run summary notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedSummary {
    pub review_id: ReviewId,
    pub rating: u8,
    pub customer_name: String,
    pub reply_excerpt: String,
}

/// A still-pending review line in the run summary notification, with the
/// reason it is pending for the recipient's benefit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSummary {
    pub review_id: ReviewId,
    pub rating: u8,
    pub customer_name: String,
    pub reason: PendingReason,
}

/// The single summary notification emitted per orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub business_id: BusinessId,
    pub user_id: String,
    pub slot_id: Option<String>,
    pub generated: usize,
    pub approved: usize,
    pub posted: Vec<PostedSummary>,
    pub pending: Vec<PendingSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// An append-only activity log entry. `business_id` is `None` for
/// process-wide entries such as admin escalations.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub business_id: Option<BusinessId>,
    pub entry_type: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
}

/// A persisted activity log row.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub id: i64,
    pub business_id: Option<BusinessId>,
    pub entry_type: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// A request to the language-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A response from the language-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub text: String,
}

/// A request to publish a reply to the external review source.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub review_id: ReviewId,
    pub business_id: BusinessId,
    pub user_id: String,
    pub reply_text: String,
    pub automated: bool,
}
