// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for loaded configuration.

use thiserror::Error;

use crate::model::ReplyflowConfig;

/// A configuration value that deserialized but is not usable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Validates cross-field constraints figment cannot express.
pub fn validate_config(config: &ReplyflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.automation.batch_size == 0 {
        errors.push(ConfigError::InvalidValue {
            field: "automation.batch_size".into(),
            reason: "must be at least 1".into(),
        });
    }
    if config.automation.batch_size > 20 {
        errors.push(ConfigError::InvalidValue {
            field: "automation.batch_size".into(),
            reason: "must be at most 20 to respect provider rate limits".into(),
        });
    }
    if config.automation.provider_timeout_secs == 0 {
        errors.push(ConfigError::InvalidValue {
            field: "automation.provider_timeout_secs".into(),
            reason: "external calls require an explicit non-zero timeout".into(),
        });
    }
    if config.automation.publish_timeout_secs == 0 {
        errors.push(ConfigError::InvalidValue {
            field: "automation.publish_timeout_secs".into(),
            reason: "external calls require an explicit non-zero timeout".into(),
        });
    }
    if config.automation.run_deadline_secs == 0 {
        errors.push(ConfigError::InvalidValue {
            field: "automation.run_deadline_secs".into(),
            reason: "the run deadline must be non-zero".into(),
        });
    }
    if config.anthropic.max_tokens == 0 {
        errors.push(ConfigError::InvalidValue {
            field: "anthropic.max_tokens".into(),
            reason: "must be at least 1".into(),
        });
    }
    if !matches!(
        config.service.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ConfigError::InvalidValue {
            field: "service.log_level".into(),
            reason: format!(
                "'{}' is not one of trace, debug, info, warn, error",
                config.service.log_level
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ReplyflowConfig::default()).is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = ReplyflowConfig::default();
        config.automation.batch_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("automation.batch_size"));
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let mut config = ReplyflowConfig::default();
        config.automation.batch_size = 50;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let mut config = ReplyflowConfig::default();
        config.automation.provider_timeout_secs = 0;
        config.automation.publish_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn bogus_log_level_is_rejected() {
        let mut config = ReplyflowConfig::default();
        config.service.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("log_level"));
    }
}
