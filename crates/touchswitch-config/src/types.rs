// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `touchswitch.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of logical switch channels on the panel
pub const SWITCH_COUNT: usize = 8;

/// Effect identifiers assigned to channels 1..=8 out of the box
///
/// Rainbow, Breath, Fire Flicker, Dual Scan, Color Wipe, Theater Chase,
/// Strobe, Breath.
pub const FACTORY_SWITCH_EFFECTS: [u8; SWITCH_COUNT] = [8, 2, 45, 11, 3, 13, 23, 2];

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TouchSwitchConfig {
    pub uart: UartConfig,
    pub protocol: ProtocolConfig,
    pub switches: SwitchesConfig,
    pub logging: LoggingConfig,
}

/// UART link settings
///
/// Only consumed by whatever opens the port; the protocol never looks at it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UartConfig {
    /// Host device path (bridge binary only)
    pub port: String,
    pub baud_rate: u32,
    pub rx_pin: Option<u8>,
    pub tx_pin: Option<u8>,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            rx_pin: None,
            tx_pin: None,
        }
    }
}

/// What a per-byte timeout inside a frame payload does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Store a 0xFF placeholder and keep reading (panel firmware compatibility)
    Sentinel,
    /// Abandon the frame in progress
    Abandon,
}

/// What a declared length larger than the frame buffer does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Read and discard the declared bytes so the next start byte lines up
    Drain,
    /// Give up right after the length byte
    Abandon,
}

/// Frame handling and switch behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Per-byte read timeout in milliseconds
    pub read_timeout_ms: u32,
    /// Power level applied when a channel turns on
    pub on_power_level: u8,
    /// Force every other channel off when one is toggled
    pub mutual_exclusion: bool,
    /// Send a status frame for every channel that changed
    pub notify_panel: bool,
    /// Require the last payload byte to be the sum of the preceding ones
    pub verify_inbound_checksum: bool,
    pub timeout_policy: TimeoutPolicy,
    pub overflow_policy: OverflowPolicy,
    /// Sleep between polls while the link is idle (bridge loop)
    pub idle_poll_interval_ms: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 300,
            on_power_level: 128,
            mutual_exclusion: true,
            notify_panel: true,
            verify_inbound_checksum: false,
            timeout_policy: TimeoutPolicy::Sentinel,
            overflow_policy: OverflowPolicy::Drain,
            idle_poll_interval_ms: 5,
        }
    }
}

/// Per-channel effect assignment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SwitchesConfig {
    pub effects: [u8; SWITCH_COUNT],
}

impl Default for SwitchesConfig {
    fn default() -> Self {
        Self {
            effects: FACTORY_SWITCH_EFFECTS,
        }
    }
}

/// Console log layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
    /// Base directory for run folders (file logging only)
    pub log_dir: PathBuf,
    /// Delete run folders older than this many days
    pub retention_days: u64,
    /// Keep at most this many run folders
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_panel_firmware() {
        let config = TouchSwitchConfig::default();
        assert_eq!(config.uart.baud_rate, 9600);
        assert_eq!(config.protocol.read_timeout_ms, 300);
        assert_eq!(config.protocol.on_power_level, 128);
        assert!(config.protocol.mutual_exclusion);
        assert_eq!(config.switches.effects, FACTORY_SWITCH_EFFECTS);
    }

    #[test]
    fn test_policies_serialize_lowercase() {
        let json = serde_json::to_string(&ProtocolConfig::default()).unwrap();
        assert!(json.contains("\"timeout_policy\":\"sentinel\""));
        assert!(json.contains("\"overflow_policy\":\"drain\""));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: TouchSwitchConfig =
            serde_json::from_str(r#"{"protocol": {"read_timeout_ms": 50}}"#).unwrap();
        assert_eq!(config.protocol.read_timeout_ms, 50);
        assert_eq!(config.protocol.on_power_level, 128);
        assert_eq!(config.uart, UartConfig::default());
    }

    #[test]
    fn test_logging_section_reads_run_folder_settings() {
        let config: TouchSwitchConfig = toml::from_str(
            "[logging]\nformat = \"compact\"\nlog_dir = \"/var/log/panel\"\nretention_runs = 3\n",
        )
        .unwrap();
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.logging.log_dir, PathBuf::from("/var/log/panel"));
        assert_eq!(config.logging.retention_runs, 3);
        assert_eq!(config.logging.retention_days, 30);
        assert_eq!(config.logging.level, "info");
    }
}
