// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log-backed publish adapter.
//!
//! The real review-source connector is an external integration; until one
//! is wired in, published replies are written to the log so the rest of
//! the pipeline can be exercised end to end.

use async_trait::async_trait;
use tracing::info;

use replyflow_core::ReplyflowError;
use replyflow_core::traits::{PluginAdapter, PublishAdapter};
use replyflow_core::types::{AdapterType, HealthStatus, PublishRequest};

#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl PluginAdapter for LogPublisher {
    fn name(&self) -> &str {
        "log"
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
impl PublishAdapter for LogPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<(), ReplyflowError> {
        info!(
            review_id = %request.review_id.0,
            business_id = %request.business_id.0,
            automated = request.automated,
            reply = %request.reply_text,
            "reply published"
        );
        Ok(())
    }
}
