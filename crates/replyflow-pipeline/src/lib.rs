// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automation pipeline: orchestration of generation, approval,
//! publication, and notification for one business per run.

pub mod notify;
pub mod orchestrator;
pub mod publish;
pub mod retry;

pub use notify::LogNotifier;
pub use orchestrator::Orchestrator;
pub use publish::{PostOutcome, Publication};
pub use retry::RETRY_BATCH_SIZE;
