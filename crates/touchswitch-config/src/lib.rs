// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Touch-switch Configuration System
//!
//! Type-safe configuration loader for the serial touch-switch link with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use touchswitch_config::{load_config, TouchSwitchConfig};
//!
//! // Load configuration with automatic file discovery and overrides
//! let config = load_config(None, None).expect("Failed to load config");
//!
//! println!("UART: {} @ {}", config.uart.port, config.uart.baud_rate);
//! println!("Read timeout: {} ms", config.protocol.read_timeout_ms);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;

pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    load_config_or_default, CONFIG_FILE_NAME, CONFIG_PATH_ENV,
};

pub use types::*;
pub use validation::{collect_validation_errors, validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_types_compile() {
        let config = TouchSwitchConfig::default();
        assert_eq!(config.switches.effects.len(), SWITCH_COUNT);
    }

    #[test]
    fn test_config_error_is_std_error() {
        fn boxed(err: ConfigError) -> Box<dyn std::error::Error> {
            Box::new(err)
        }
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(boxed(ConfigError::from(io)).source().is_some());
        assert_eq!(
            boxed(ConfigError::ValidationError("uart.baud_rate".to_string())).to_string(),
            "Validation failed: uart.baud_rate"
        );
    }
}
