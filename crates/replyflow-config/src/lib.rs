// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Replyflow pipeline.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), file hierarchy lookup, and environment variable
//! overrides via the `REPLYFLOW_` prefix.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    AnthropicConfig, AutomationConfig, ReplyflowConfig, ServiceConfig, StorageConfig,
};
pub use validation::{ConfigError, validate_config};

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<ReplyflowConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::InvalidValue {
            field: "<config>".into(),
            reason: err.to_string(),
        }]),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ReplyflowConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::InvalidValue {
            field: "<config>".into(),
            reason: err.to_string(),
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_catches_both_layers() {
        // Parse error surfaces as a ConfigError.
        assert!(load_and_validate_str("automation = 3").is_err());
        // Validation error surfaces too.
        assert!(
            load_and_validate_str(
                r#"
                [automation]
                batch_size = 0
                "#
            )
            .is_err()
        );
        // Valid config passes.
        assert!(load_and_validate_str("").is_ok());
    }
}
