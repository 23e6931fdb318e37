//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-touchswitch-protocol`, `--debug-touchswitch-hal`, etc.
//! to enable debug logging per crate.

use std::collections::HashMap;
use std::env;

use crate::KNOWN_CRATES;

/// Environment variable holding comma-separated crate names to debug
pub const DEBUG_ENV: &str = "TOUCHSWITCH_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use touchswitch_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(std::env::args());
/// if flags.is_enabled("touchswitch-protocol") {
///     // Enable debug logging for the protocol crate
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut enabled_crates = HashMap::new();
        let mut debug_all = false;

        for arg in args {
            if arg == "--debug-all" {
                debug_all = true;
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                enabled_crates.insert(crate_name.to_string(), true);
            }
        }

        if debug_all {
            for crate_name in KNOWN_CRATES {
                enabled_crates.insert(crate_name.to_string(), true);
            }
        }

        CrateDebugFlags { enabled_crates }
    }

    /// Merge crate names from the `TOUCHSWITCH_DEBUG` value format
    ///
    /// Accepts `all` or a comma-separated list of crate names.
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            for crate_name in KNOWN_CRATES {
                self.enabled_crates.insert(crate_name.to_string(), true);
            }
            return;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                self.enabled_crates.insert(crate_name.to_string(), true);
            }
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains_key(crate_name)
    }

    /// Get all enabled crates
    pub fn enabled_crates(&self) -> Vec<&String> {
        self.enabled_crates.keys().collect()
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Get log level for a crate
    ///
    /// Returns `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Create a tracing filter from debug flags
    ///
    /// Crate names are turned into tracing targets (`-` becomes `_`).
    /// Format: "touchswitch_protocol=debug,info", or just the default level if none enabled.
    pub fn to_filter_string_with_default(&self, default_level: &str) -> String {
        let mut crate_names: Vec<&String> = self.enabled_crates.keys().collect();
        crate_names.sort();

        let mut filters: Vec<String> = crate_names
            .into_iter()
            .map(|crate_name| format!("{}=debug", crate_name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_lowercase());
        filters.join(",")
    }

    /// Same as [`Self::to_filter_string_with_default`] with `info` as the default
    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with_default("info")
    }
}

/// Parse debug flags from the process arguments and environment
///
/// Checks both command-line arguments and the `TOUCHSWITCH_DEBUG` environment variable.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var(DEBUG_ENV) {
        flags.merge_env_value(&env_var);
    }

    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  TOUCHSWITCH_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  TOUCHSWITCH_DEBUG=all                             Enable debug for all crates

Examples:
  --debug-touchswitch-protocol
  --debug-touchswitch-protocol --debug-touchswitch-hal
  TOUCHSWITCH_DEBUG=touchswitch-protocol,touchswitch-hal
"#,
        KNOWN_CRATES.join(", ")
    )
}
