// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Replyflow's external collaborators.
//!
//! The pipeline core talks only to these traits; concrete integrations
//! (SQLite, Anthropic, review-source publisher, notification sender) live
//! in their own crates.

pub mod adapter;
pub mod notify;
pub mod provider;
pub mod publish;
pub mod storage;

pub use adapter::PluginAdapter;
pub use notify::NotifyAdapter;
pub use provider::ProviderAdapter;
pub use publish::PublishAdapter;
pub use storage::StorageAdapter;
