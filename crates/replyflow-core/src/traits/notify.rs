// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notify adapter trait for outbound owner and admin notifications.

use async_trait::async_trait;

use crate::error::ReplyflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AutomationError, RunSummary};

/// Adapter delivering notifications.
///
/// Fire-and-forget from the pipeline's perspective: a delivery failure is
/// classified and recorded but never rolls back or blocks prior steps.
#[async_trait]
pub trait NotifyAdapter: PluginAdapter {
    /// Sends the single per-run summary to the business owner.
    async fn send_summary(&self, summary: &RunSummary) -> Result<(), ReplyflowError>;

    /// Alerts an administrator about a critical, non-retryable failure.
    async fn notify_admin(&self, error: &AutomationError) -> Result<(), ReplyflowError>;
}
