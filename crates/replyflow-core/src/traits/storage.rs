// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait: the narrow query interface over the persistent store.
//!
//! Every write is scoped to a single review or a single business-settings
//! row and is last-writer-wins; the orchestrator's idempotency flags make
//! that safe (one concurrent run per business).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ReplyflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ActivityEntry, ActivityRecord, AutomationError, BusinessId, BusinessProfile, Review, ReviewId,
    ToneLabel,
};

/// Adapter over the relational store holding reviews, settings, and the
/// activity log.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Opens the backend and runs pending migrations.
    async fn initialize(&self) -> Result<(), ReplyflowError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), ReplyflowError>;

    // --- Business settings ---

    /// Fetches one business's settings and identity as an immutable snapshot.
    async fn get_profile(
        &self,
        business_id: &BusinessId,
    ) -> Result<Option<BusinessProfile>, ReplyflowError>;

    /// Records when the automation pipeline last ran for this business.
    async fn update_last_run(
        &self,
        business_id: &BusinessId,
        at: DateTime<Utc>,
    ) -> Result<(), ReplyflowError>;

    /// Appends one error to the bounded recent-errors list, pruning entries
    /// older than 24 hours and keeping at most the 10 most recent.
    async fn push_automation_error(
        &self,
        business_id: &BusinessId,
        error: &AutomationError,
    ) -> Result<(), ReplyflowError>;

    /// Drops recent errors older than the cutoff.
    async fn prune_automation_errors(
        &self,
        business_id: &BusinessId,
        cutoff: DateTime<Utc>,
    ) -> Result<(), ReplyflowError>;

    // --- Reviews ---

    async fn get_review(&self, id: &ReviewId) -> Result<Option<Review>, ReplyflowError>;

    /// Reviews eligible for this run: `pending` status, not already
    /// auto-replied, not flagged as failed by a prior run.
    async fn unprocessed_reviews(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<Review>, ReplyflowError>;

    /// Reviews flagged `automation_failed`, oldest first, bounded.
    async fn failed_reviews(
        &self,
        business_id: &BusinessId,
        limit: usize,
    ) -> Result<Vec<Review>, ReplyflowError>;

    /// Approved reviews that have a reply but no published timestamp.
    async fn approved_unposted_reviews(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<Review>, ReplyflowError>;

    /// The N most recent non-null generated replies, newest first. Feeds
    /// the anti-repetition tracker.
    async fn recent_generated_replies(
        &self,
        business_id: &BusinessId,
        limit: usize,
    ) -> Result<Vec<String>, ReplyflowError>;

    /// Persists a successful generation: reply text, tone, sets
    /// `automated_reply` and clears any failure flags.
    async fn store_generated_reply(
        &self,
        id: &ReviewId,
        text: &str,
        tone: ToneLabel,
    ) -> Result<(), ReplyflowError>;

    /// Persists a failed generation: sets `automation_failed` and the
    /// error text, leaves the reply fields untouched.
    async fn mark_generation_failed(
        &self,
        id: &ReviewId,
        error: &str,
    ) -> Result<(), ReplyflowError>;

    /// Transitions `pending -> approved`, setting `auto_approved` in the
    /// same write.
    async fn approve_review(&self, id: &ReviewId) -> Result<(), ReplyflowError>;

    /// Transitions `approved -> posted`: sets the published timestamp and
    /// the immutable audit copy of the text that was sent.
    async fn mark_posted(
        &self,
        id: &ReviewId,
        at: DateTime<Utc>,
        posted_text: &str,
    ) -> Result<(), ReplyflowError>;

    // --- Activity log ---

    /// Appends one activity entry. `business_id` may be `None` for
    /// process-wide entries.
    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), ReplyflowError>;

    /// Most recent activity entries, newest first, optionally scoped to a
    /// business.
    async fn recent_activity(
        &self,
        business_id: Option<&BusinessId>,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, ReplyflowError>;
}
