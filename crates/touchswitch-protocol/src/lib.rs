// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # touchswitch-protocol
//!
//! Link protocol of an eight-channel capacitive touch panel on a UART.
//!
//! - [`reader`] - bounded-wait frame assembly with resynchronization
//! - [`decoder`] - command classification
//! - [`switches`] - channel state machine with optional exclusivity
//! - [`writer`] - status frames with a wrapping sequence number
//! - [`effects`] - per-channel effect assignments and their JSON form
//! - [`usermod`] - the module a lighting host polls
//!
//! ## Example
//!
//! ```rust
//! use touchswitch_hal::MemorySerial;
//! use touchswitch_protocol::{HostModule, PollOutcome, RecordingHost, SerialTouchSwitch};
//!
//! let serial = MemorySerial::with_rx(&[0x7B, 0x03, 0x04, 0x02, 0x01]);
//! let mut module = SerialTouchSwitch::new(serial, RecordingHost::new());
//!
//! assert!(matches!(module.poll(), PollOutcome::Toggled(_)));
//! assert_eq!(module.host().effect(), Some(2));
//! ```

pub mod decoder;
pub mod effects;
pub mod error;
pub mod frame;
pub mod host;
pub mod reader;
pub mod switches;
pub mod usermod;
pub mod writer;

pub use touchswitch_config::SWITCH_COUNT;

pub use decoder::{decode, Command, SwitchStatus};
pub use effects::{EffectAssignments, CONFIG_KEY};
pub use error::{FrameStage, ImportError, ReadError, StatusFrameError, WriteError};
pub use frame::{checksum, Frame, StatusFrame, FRAME_BUFFER_CAPACITY, START_BYTE};
pub use host::{classic_effect_name, HostCall, LightHost, RecordingHost};
pub use reader::{FrameReader, ReaderOptions};
pub use switches::{Channel, SwitchBank, ToggleOutcome};
pub use usermod::{
    DropReason, HostModule, PollOutcome, SerialTouchSwitch, SwitchOptions, ToggleReport,
    MODULE_ID, MODULE_NAME,
};
pub use writer::FrameWriter;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
