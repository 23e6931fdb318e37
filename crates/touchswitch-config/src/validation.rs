// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent and within valid ranges.

use crate::{ConfigError, ConfigResult, TouchSwitchConfig};

/// Upper bound for the per-byte read timeout
pub const MAX_READ_TIMEOUT_MS: u32 = 10_000;

/// Upper bound for the idle sleep of the bridge loop
pub const MAX_IDLE_POLL_INTERVAL_MS: u64 = 1_000;

/// Accepted log level names
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl core::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Required fields
/// - Valid value ranges
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &TouchSwitchConfig) -> ConfigResult<()> {
    let errors = collect_validation_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Run every check and return all problems found
pub fn collect_validation_errors(config: &TouchSwitchConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_uart(config, &mut errors);
    validate_protocol(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_uart(config: &TouchSwitchConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.uart.port.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "uart.port".to_string(),
        });
    }
    if config.uart.baud_rate == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "uart.baud_rate".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    if let (Some(rx), Some(tx)) = (config.uart.rx_pin, config.uart.tx_pin) {
        if rx == tx {
            errors.push(ConfigValidationError::InvalidValue {
                field: "uart.rx_pin".to_string(),
                reason: format!("rx and tx cannot share pin {}", rx),
            });
        }
    }
}

fn validate_protocol(config: &TouchSwitchConfig, errors: &mut Vec<ConfigValidationError>) {
    let protocol = &config.protocol;
    if protocol.read_timeout_ms == 0 || protocol.read_timeout_ms > MAX_READ_TIMEOUT_MS {
        errors.push(ConfigValidationError::InvalidValue {
            field: "protocol.read_timeout_ms".to_string(),
            reason: format!("must be in 1..={}", MAX_READ_TIMEOUT_MS),
        });
    }
    if protocol.on_power_level == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "protocol.on_power_level".to_string(),
            reason: "an \"on\" channel cannot use power level 0".to_string(),
        });
    }
    if protocol.idle_poll_interval_ms > MAX_IDLE_POLL_INTERVAL_MS {
        errors.push(ConfigValidationError::InvalidValue {
            field: "protocol.idle_poll_interval_ms".to_string(),
            reason: format!("must be at most {}", MAX_IDLE_POLL_INTERVAL_MS),
        });
    }
}

fn validate_logging(config: &TouchSwitchConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        });
    }
    if config.logging.retention_runs == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.retention_runs".to_string(),
            reason: "must keep at least the current run".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TouchSwitchConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = TouchSwitchConfig::default();
        config.protocol.read_timeout_ms = 0;
        let errors = collect_validation_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("protocol.read_timeout_ms"));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = TouchSwitchConfig::default();
        config.uart.baud_rate = 0;
        config.protocol.on_power_level = 0;
        config.logging.level = "loud".to_string();

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("uart.baud_rate"));
        assert!(err.contains("protocol.on_power_level"));
        assert!(err.contains("logging.level"));
    }

    #[test]
    fn test_shared_uart_pins_rejected() {
        let mut config = TouchSwitchConfig::default();
        config.uart.rx_pin = Some(16);
        config.uart.tx_pin = Some(16);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = TouchSwitchConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_retained_runs_rejected() {
        let mut config = TouchSwitchConfig::default();
        config.logging.retention_runs = 0;
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("logging.retention_runs"));
    }
}
