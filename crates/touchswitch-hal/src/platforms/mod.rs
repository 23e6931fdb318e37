// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Platform implementations
//!
//! Each platform module implements the HAL traits defined in `crate::hal`.
//!
//! Available platforms:
//! - In-memory scripted link (`std`)
//! - Host serial ports through the `serialport` crate (`serialport`)
//!
//! MCU ports with non-blocking UART drivers get timed reads by wrapping the
//! driver in [`crate::hal::PolledSerial`].

#[cfg(feature = "std")]
pub mod memory;

#[cfg(feature = "serialport")]
pub mod serial_port;

// Re-export platform types
#[cfg(feature = "std")]
pub use memory::{MemorySerial, MemorySerialError};

#[cfg(feature = "serialport")]
pub use serial_port::SerialPortDevice;
