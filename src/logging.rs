// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Maps the `[logging]` section of `touchswitch.toml` onto observability settings

use crate::config::{self, TouchSwitchConfig};
use crate::observability::{LogFormat, LoggingConfig};

/// Logging settings for `init_console_logging` / `init_logging`
pub fn logging_config(config: &TouchSwitchConfig) -> LoggingConfig {
    let logging = &config.logging;
    LoggingConfig {
        level: logging.level.clone(),
        format: match logging.format {
            config::LogFormat::Text => LogFormat::Text,
            config::LogFormat::Compact => LogFormat::Compact,
        },
        log_dir: logging.log_dir.clone(),
        retention_days: logging.retention_days,
        retention_runs: logging.retention_runs,
    }
}
