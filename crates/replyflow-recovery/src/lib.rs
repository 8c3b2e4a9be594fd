// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure classification and recovery.
//!
//! Every error the pipeline encounters is routed through [`classify`] so
//! severity and retryability are decided in exactly one place, then through
//! [`RecoveryService::record`] so critical failures escalate exactly once.

pub mod classify;
pub mod service;

pub use classify::{classify, max_attempts, should_retry};
pub use service::RecoveryService;
