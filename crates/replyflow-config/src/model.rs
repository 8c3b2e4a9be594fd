// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Replyflow pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Replyflow configuration.
///
/// Loaded from `replyflow.toml` (local directory, then XDG config dir),
/// with `REPLYFLOW_*` environment variable overrides. All sections are
/// optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyflowConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Anthropic API settings for the reply generation provider.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Pipeline batching, timeout, and deadline settings.
    #[serde(default)]
    pub automation: AutomationConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in log output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

/// Anthropic Messages API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// API key. Usually supplied via `REPLYFLOW_ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// API version header value.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Model identifier for reply generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum output tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_version: default_api_version(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Pipeline batching, timeout, and deadline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AutomationConfig {
    /// Reviews generated concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between generation batches, in milliseconds. Respects the
    /// generation service's rate limits.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Whole-run deadline in seconds; no new batch starts after expiry.
    #[serde(default = "default_run_deadline_secs")]
    pub run_deadline_secs: u64,

    /// Per-call timeout for the generation service, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Per-call timeout for publication, in seconds.
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,

    /// Per-call timeout for notification delivery, in seconds.
    #[serde(default = "default_notify_timeout_secs")]
    pub notify_timeout_secs: u64,

    /// How many recent generated replies feed the anti-repetition tracker.
    #[serde(default = "default_recent_reply_window")]
    pub recent_reply_window: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            run_deadline_secs: default_run_deadline_secs(),
            provider_timeout_secs: default_provider_timeout_secs(),
            publish_timeout_secs: default_publish_timeout_secs(),
            notify_timeout_secs: default_notify_timeout_secs(),
            recent_reply_window: default_recent_reply_window(),
        }
    }
}

fn default_service_name() -> String {
    "replyflow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_database_path() -> String {
    "replyflow.db".to_string()
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_run_deadline_secs() -> u64 {
    300
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_publish_timeout_secs() -> u64 {
    15
}

fn default_notify_timeout_secs() -> u64 {
    10
}

fn default_recent_reply_window() -> usize {
    10
}
