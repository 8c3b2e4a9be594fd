// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Replyflow review automation pipeline.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain model used throughout the Replyflow workspace. The pipeline,
//! engine, and recovery crates build on these; concrete adapters (SQLite,
//! Anthropic, publishers, notifiers) implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ReplyflowError;
pub use types::{
    AdapterType, ApprovalMode, AutomationError, AutomationResult, AutomationStep, BrandVoice,
    BusinessId, BusinessInfo, BusinessProfile, BusinessSettings, HealthStatus, PendingReason,
    Review, ReviewId, ReviewStatus, RunContext, Severity, ToneLabel, VoicePreset,
};

pub use traits::{NotifyAdapter, PluginAdapter, ProviderAdapter, PublishAdapter, StorageAdapter};
