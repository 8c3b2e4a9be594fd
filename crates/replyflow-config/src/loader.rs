// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order: compiled defaults, then `~/.config/replyflow/replyflow.toml`,
//! then `./replyflow.toml`, then `REPLYFLOW_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ReplyflowConfig;

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<ReplyflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReplyflowConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("replyflow/replyflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("replyflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ReplyflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReplyflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ReplyflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReplyflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so keys that contain
/// underscores (e.g. `REPLYFLOW_ANTHROPIC_API_KEY`) resolve unambiguously.
fn env_provider() -> Env {
    Env::prefixed("REPLYFLOW_").map(|key| {
        let key = key.as_str().to_lowercase();
        for section in ["service", "anthropic", "storage", "automation"] {
            if let Some(rest) = key.strip_prefix(&format!("{section}_")) {
                return format!("{section}.{rest}").into();
            }
        }
        key.into()
    })
}
