// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed per-step error classification.
//!
//! Deterministic over (step, error text): call sites never invent their own
//! severity, they route everything through [`classify`].

use chrono::Utc;

use replyflow_core::types::{AutomationError, AutomationStep, ReviewId, Severity};

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a raw error into severity and retryability.
pub fn classify(
    step: AutomationStep,
    raw_error: &str,
    review_id: Option<ReviewId>,
) -> AutomationError {
    let lowered = raw_error.to_lowercase();
    let (severity, retryable) = match step {
        AutomationStep::GenerateReply => {
            // Throttling is checked before auth: a throttled call is worth
            // retrying even when the message also mentions authentication.
            if contains_any(&lowered, &["rate limit", "quota"]) {
                (Severity::High, true)
            } else if contains_any(&lowered, &["authentication", "api key"]) {
                (Severity::Critical, false)
            } else {
                (Severity::Medium, true)
            }
        }
        AutomationStep::PostReply => {
            if contains_any(&lowered, &["authentication", "credentials"]) {
                (Severity::Critical, false)
            } else if lowered.contains("rate limit") {
                (Severity::High, true)
            } else {
                (Severity::Medium, true)
            }
        }
        AutomationStep::SendNotification => (Severity::Low, true),
        AutomationStep::Pipeline => (Severity::Critical, false),
    };

    AutomationError {
        step,
        message: raw_error.to_string(),
        timestamp: Utc::now(),
        review_id,
        severity,
        retryable,
    }
}

/// Attempt cap per step.
pub fn max_attempts(step: AutomationStep) -> u32 {
    match step {
        AutomationStep::GenerateReply => 2,
        AutomationStep::PostReply => 3,
        AutomationStep::SendNotification => 1,
        AutomationStep::Pipeline => 2,
    }
}

/// Whether another attempt is allowed. Critical errors are never retried.
pub fn should_retry(error: &AutomationError, retry_count: u32) -> bool {
    error.retryable
        && error.severity != Severity::Critical
        && retry_count < max_attempts(error.step)
}
