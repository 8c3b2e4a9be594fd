// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the language-generation service.

use async_trait::async_trait;

use crate::error::ReplyflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for the external text-generation API.
///
/// The pipeline owns the prompt and the response validation; the adapter
/// owns transport, authentication, and transient-error retry. Calls are
/// synchronous request/response and must respect the caller's timeout.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the generated text.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ReplyflowError>;
}
