// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hardware Abstraction Layer (HAL) trait definitions
//!
//! This module defines the platform-agnostic traits every platform must
//! provide for the touch-switch link:
//! - Time management (TimeProvider)
//! - Serial I/O (SerialIO, TimedRead)

/// Serial input/output traits for UART-style communication.
pub mod serial;
/// Timekeeping abstractions (monotonic timers, delays).
pub mod time;

// Re-export trait types
pub use serial::{write_bytewise, PolledSerial, SerialIO, TimedRead};
pub use time::TimeProvider;

#[cfg(feature = "std")]
pub use time::StdClock;
