// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reply generation engine.
//!
//! `generate` never returns an error to the caller: on any provider
//! failure it degrades to the static template fallback and reports the
//! failure through [`DraftReply::failure`] so the orchestrator can decide
//! what to persist.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use replyflow_core::traits::ProviderAdapter;
use replyflow_core::types::{BrandVoice, BusinessInfo, CompletionRequest, Review, ToneLabel};

use crate::prompt::build_prompt;
use crate::templates::fallback_reply;

/// Outcome of one generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftReply {
    pub text: String,
    pub tone: ToneLabel,
    /// True when the text came from the static template table.
    pub used_fallback: bool,
    /// The provider failure that forced the fallback, when one occurred.
    pub failure: Option<String>,
}

pub struct ReplyGenerator {
    provider: Arc<dyn ProviderAdapter + Send + Sync>,
    call_timeout: Duration,
    max_tokens: u32,
}

impl ReplyGenerator {
    pub fn new(
        provider: Arc<dyn ProviderAdapter + Send + Sync>,
        call_timeout: Duration,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            call_timeout,
            max_tokens,
        }
    }

    /// Draft a reply for one review.
    pub async fn generate(
        &self,
        review: &Review,
        voice: &BrandVoice,
        info: &BusinessInfo,
        avoid_phrases: &[String],
    ) -> DraftReply {
        let tone = voice.preset.tone_label();
        let parts = build_prompt(review, voice, info, avoid_phrases);
        let request = CompletionRequest {
            system: parts.system,
            prompt: parts.user,
            temperature: parts.temperature,
            max_tokens: self.max_tokens,
        };

        let outcome = match timeout(self.call_timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => {
                let text = scrub_dashes(response.text.trim());
                if text.is_empty() {
                    Err("provider returned an empty completion".to_string())
                } else {
                    Ok(text)
                }
            }
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "generation timed out after {}s",
                self.call_timeout.as_secs()
            )),
        };

        match outcome {
            Ok(text) => {
                debug!(review_id = %review.id.0, words = text.split_whitespace().count(), "reply generated");
                DraftReply {
                    text,
                    tone,
                    used_fallback: false,
                    failure: None,
                }
            }
            Err(message) => {
                warn!(review_id = %review.id.0, error = %message, "generation failed, using template fallback");
                DraftReply {
                    text: fallback_reply(tone, review.rating, &review.customer_name),
                    tone,
                    used_fallback: true,
                    failure: Some(message),
                }
            }
        }
    }
}

/// Replace em and en dashes, which the model is told not to use but
/// occasionally emits anyway.
pub fn scrub_dashes(text: &str) -> String {
    text.replace(" — ", ", ")
        .replace('—', ", ")
        .replace('–', "-")
}
