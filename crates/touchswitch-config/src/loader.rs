// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, TouchSwitchConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "touchswitch.toml";

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "TOUCHSWITCH_CONFIG_PATH";

/// Find the configuration file
///
/// Search order:
/// 1. `TOUCHSWITCH_CONFIG_PATH` environment variable
/// 2. Current working directory: `./touchswitch.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    // 1. Check environment variable first
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by {} not found: {}",
                CONFIG_PATH_ENV,
                path.display()
            )));
        }
    }

    // 2. Search in common locations
    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Returns
///
/// Complete, validated `TouchSwitchConfig` with all overrides applied
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<TouchSwitchConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: TouchSwitchConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

/// Load the configuration file if one exists, otherwise start from defaults
///
/// Overrides and validation apply either way. A file that exists but cannot
/// be parsed is still an error.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<TouchSwitchConfig> {
    match load_config(config_path, cli_args) {
        Err(ConfigError::FileNotFound(_)) => {
            let mut config = TouchSwitchConfig::default();
            apply_environment_overrides(&mut config);
            if let Some(cli) = cli_args {
                apply_cli_overrides(&mut config, cli);
            }
            validate_config(&config)?;
            Ok(config)
        }
        other => other,
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `TOUCHSWITCH_UART_PORT` -> `uart.port`
/// - `TOUCHSWITCH_UART_BAUD_RATE` -> `uart.baud_rate`
/// - `TOUCHSWITCH_READ_TIMEOUT_MS` -> `protocol.read_timeout_ms`
/// - `TOUCHSWITCH_ON_POWER_LEVEL` -> `protocol.on_power_level`
/// - `TOUCHSWITCH_MUTUAL_EXCLUSION` -> `protocol.mutual_exclusion`
/// - `TOUCHSWITCH_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut TouchSwitchConfig) {
    // UART settings
    if let Ok(value) = env::var("TOUCHSWITCH_UART_PORT") {
        config.uart.port = value;
    }
    if let Ok(value) = env::var("TOUCHSWITCH_UART_BAUD_RATE") {
        if let Ok(baud) = value.parse::<u32>() {
            config.uart.baud_rate = baud;
        }
    }

    // Protocol settings
    if let Ok(value) = env::var("TOUCHSWITCH_READ_TIMEOUT_MS") {
        if let Ok(timeout) = value.parse::<u32>() {
            config.protocol.read_timeout_ms = timeout;
        }
    }
    if let Ok(value) = env::var("TOUCHSWITCH_ON_POWER_LEVEL") {
        if let Ok(level) = value.parse::<u8>() {
            config.protocol.on_power_level = level;
        }
    }
    if let Ok(value) = env::var("TOUCHSWITCH_MUTUAL_EXCLUSION") {
        config.protocol.mutual_exclusion = parse_flag(&value);
    }

    // Logging
    if let Ok(value) = env::var("TOUCHSWITCH_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"uart_port": "/dev/ttyACM0", "baud_rate": "19200"}`)
pub fn apply_cli_overrides(config: &mut TouchSwitchConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("uart_port") {
        config.uart.port = value.clone();
    }
    if let Some(value) = cli_args.get("baud_rate") {
        if let Ok(baud) = value.parse::<u32>() {
            config.uart.baud_rate = baud;
        }
    }
    if let Some(value) = cli_args.get("read_timeout_ms") {
        if let Ok(timeout) = value.parse::<u32>() {
            config.protocol.read_timeout_ms = timeout;
        }
    }
    if let Some(value) = cli_args.get("on_power_level") {
        if let Ok(level) = value.parse::<u8>() {
            config.protocol.on_power_level = level;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
