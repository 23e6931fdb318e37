// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # touchswitch-observability
//!
//! Unified logging setup for the touch-switch crates.
//!
//! Provides consistent observability patterns across all crates with
//! per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: File-based log rotation (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "touchswitch",
    "touchswitch-hal",
    "touchswitch-config",
    "touchswitch-protocol",
];
