// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by all adapter implementations.

use async_trait::async_trait;

use crate::error::ReplyflowError;
use crate::types::{AdapterType, HealthStatus};

/// Identity and lifecycle surface common to every adapter.
#[async_trait]
pub trait PluginAdapter {
    /// Short machine-friendly adapter name (e.g. "sqlite", "anthropic").
    fn name(&self) -> &str;

    /// Adapter implementation version.
    fn version(&self) -> semver::Version;

    /// Which boundary this adapter implements.
    fn adapter_type(&self) -> AdapterType;

    /// Checks whether the adapter's backing service is reachable.
    async fn health_check(&self) -> Result<HealthStatus, ReplyflowError>;
}
