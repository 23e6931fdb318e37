// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # touchswitch - serial touch-switch panel link
//!
//! An eight-channel capacitive touch panel talks to a lighting controller over
//! a UART. Each press toggles a channel; the controller answers with status
//! frames and switches the active lighting effect and brightness.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! touchswitch = "0.1"  # Default: host UART bridge support
//! ```
//!
//! ## Feature Flags
//!
//! - **`bridge`** (default): host serial ports and the `touchswitch-bridge` binary
//! - **`file-logging`**: timestamped run folders with rolling log files
//!
//! ## Usage
//!
//! ```rust
//! use touchswitch::prelude::*;
//!
//! let mut serial = MemorySerial::new();
//! serial.push_rx(&[0x7B, 0x04, 0x04, 0x03, 0x01, 0x08]);
//!
//! let mut module = SerialTouchSwitch::new(serial, RecordingHost::new());
//! let PollOutcome::Toggled(report) = module.poll() else { unreachable!() };
//!
//! assert!(report.now_on);
//! assert_eq!(module.host().effect(), Some(45));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: touchswitch-config, touchswitch-observability│
//! │  (TOML + overrides, logging)                            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Platform: touchswitch-hal                              │
//! │  (SerialIO, TimedRead, MemorySerial, SerialPortDevice)  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Protocol: touchswitch-protocol                         │
//! │  (framing, decoding, switch state, status frames)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use touchswitch_config as config;
pub use touchswitch_hal as hal;
pub use touchswitch_observability as observability;
pub use touchswitch_protocol as protocol;

pub mod logging;
pub mod runner;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{TouchSwitchConfig, SWITCH_COUNT};
    pub use crate::hal::{MemorySerial, SerialIO, StdClock, TimeProvider, TimedRead};
    pub use crate::protocol::{
        Channel, Command, DropReason, EffectAssignments, HostModule, LightHost, PollOutcome,
        RecordingHost, SerialTouchSwitch, ToggleReport,
    };
    pub use crate::runner::PollStats;

    #[cfg(feature = "bridge")]
    pub use crate::hal::SerialPortDevice;
}

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let _bank_size = SWITCH_COUNT;
        let _effects = EffectAssignments::factory();
    }
}
