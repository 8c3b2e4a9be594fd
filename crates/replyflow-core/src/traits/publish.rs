// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publish adapter trait for the external review-source connector.

use async_trait::async_trait;

use crate::error::ReplyflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::PublishRequest;

/// Adapter posting a reply to the external reputation platform.
///
/// The side effect on the review source happens only when `publish`
/// returns `Ok`. Implementations should treat re-posting an already
/// published reply as a no-op; the pipeline additionally guards on
/// `published_at` before calling.
#[async_trait]
pub trait PublishAdapter: PluginAdapter {
    async fn publish(&self, request: &PublishRequest) -> Result<(), ReplyflowError>;
}
