// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed [`StorageAdapter`] implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::info;

use replyflow_core::ReplyflowError;
use replyflow_core::traits::{PluginAdapter, StorageAdapter};
use replyflow_core::types::{
    ActivityEntry, ActivityRecord, AdapterType, AutomationError, BusinessId, BusinessProfile,
    HealthStatus, Review, ReviewId, ToneLabel,
};

use crate::database::Database;
use crate::queries;

/// Storage adapter over a single SQLite database file.
///
/// `initialize` must run before any query method; the connection is opened
/// once and shared for the process lifetime.
pub struct SqliteStorage {
    path: String,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ReplyflowError> {
        self.db
            .get()
            .ok_or_else(|| ReplyflowError::Internal("storage used before initialize".to_string()))
    }

    /// Direct handle for query modules not exposed through the trait
    /// (seeding, review ingestion).
    pub fn database(&self) -> Result<&Database, ReplyflowError> {
        self.db()
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplyflowError> {
        let db = match self.db.get() {
            Some(db) => db,
            None => return Ok(HealthStatus::Unhealthy("not initialized".to_string())),
        };
        let result = db
            .connection()
            .call(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            })
            .await;
        match result {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ReplyflowError> {
        self.db
            .get_or_try_init(|| async { Database::open(&self.path).await })
            .await?;
        info!(path = %self.path, "sqlite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ReplyflowError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }

    async fn get_profile(
        &self,
        business_id: &BusinessId,
    ) -> Result<Option<BusinessProfile>, ReplyflowError> {
        queries::settings::get_profile(self.db()?, business_id).await
    }

    async fn update_last_run(
        &self,
        business_id: &BusinessId,
        at: DateTime<Utc>,
    ) -> Result<(), ReplyflowError> {
        queries::settings::update_last_run(self.db()?, business_id, at).await
    }

    async fn push_automation_error(
        &self,
        business_id: &BusinessId,
        error: &AutomationError,
    ) -> Result<(), ReplyflowError> {
        queries::settings::push_automation_error(self.db()?, business_id, error).await
    }

    async fn prune_automation_errors(
        &self,
        business_id: &BusinessId,
        cutoff: DateTime<Utc>,
    ) -> Result<(), ReplyflowError> {
        queries::settings::prune_automation_errors(self.db()?, business_id, cutoff).await
    }

    async fn get_review(&self, id: &ReviewId) -> Result<Option<Review>, ReplyflowError> {
        queries::reviews::get_review(self.db()?, id).await
    }

    async fn unprocessed_reviews(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<Review>, ReplyflowError> {
        queries::reviews::unprocessed_reviews(self.db()?, business_id).await
    }

    async fn failed_reviews(
        &self,
        business_id: &BusinessId,
        limit: usize,
    ) -> Result<Vec<Review>, ReplyflowError> {
        queries::reviews::failed_reviews(self.db()?, business_id, limit).await
    }

    async fn approved_unposted_reviews(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<Review>, ReplyflowError> {
        queries::reviews::approved_unposted_reviews(self.db()?, business_id).await
    }

    async fn recent_generated_replies(
        &self,
        business_id: &BusinessId,
        limit: usize,
    ) -> Result<Vec<String>, ReplyflowError> {
        queries::reviews::recent_generated_replies(self.db()?, business_id, limit).await
    }

    async fn store_generated_reply(
        &self,
        id: &ReviewId,
        text: &str,
        tone: ToneLabel,
    ) -> Result<(), ReplyflowError> {
        queries::reviews::store_generated_reply(self.db()?, id, text, tone).await
    }

    async fn mark_generation_failed(
        &self,
        id: &ReviewId,
        error: &str,
    ) -> Result<(), ReplyflowError> {
        queries::reviews::mark_generation_failed(self.db()?, id, error).await
    }

    async fn approve_review(&self, id: &ReviewId) -> Result<(), ReplyflowError> {
        queries::reviews::approve_review(self.db()?, id).await
    }

    async fn mark_posted(
        &self,
        id: &ReviewId,
        at: DateTime<Utc>,
        posted_text: &str,
    ) -> Result<(), ReplyflowError> {
        queries::reviews::mark_posted(self.db()?, id, at, posted_text).await
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), ReplyflowError> {
        queries::activity::append(self.db()?, entry).await
    }

    async fn recent_activity(
        &self,
        business_id: Option<&BusinessId>,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, ReplyflowError> {
        queries::activity::recent(self.db()?, business_id, limit).await
    }
}
