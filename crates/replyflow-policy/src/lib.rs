// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-approval policy engine.
//!
//! Pure decision functions with no I/O; the orchestrator owns persisting
//! the transitions these decide.

use replyflow_core::types::{ApprovalMode, PendingReason, Review, ReviewStatus};

/// Whether a review's generated reply may be approved without human
/// sign-off.
///
/// Preconditions before the mode table applies: a reply (generated or
/// final) must exist and the review must still be `pending`; otherwise the
/// answer is unconditionally no.
pub fn should_auto_approve(mode: ApprovalMode, review: &Review) -> bool {
    if review.reply_text().is_none() || review.status != ReviewStatus::Pending {
        return false;
    }
    match mode {
        ApprovalMode::Manual => false,
        ApprovalMode::Auto4Plus => review.rating >= 4,
        ApprovalMode::AutoExceptLow => review.rating >= 3,
    }
}

/// Why a reviewed item is still pending, for the owner's summary
/// notification.
pub fn pending_reason(mode: ApprovalMode, rating: u8) -> PendingReason {
    match mode {
        ApprovalMode::Manual => PendingReason::ManualApproval,
        ApprovalMode::Auto4Plus if rating < 4 => PendingReason::LowRating,
        ApprovalMode::AutoExceptLow if rating < 3 => PendingReason::LowRating,
        // A pending review under an auto mode whose rating cleared the bar
        // is waiting on something other than the rating.
        _ => PendingReason::ManualApproval,
    }
}
