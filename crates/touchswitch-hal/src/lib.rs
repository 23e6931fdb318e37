// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! # Touch-switch HAL
//!
//! Platform abstraction for the serial touch-switch link.
//!
//! This crate provides:
//! - **HAL traits** (`hal` module) - `SerialIO`, `TimedRead`, `TimeProvider`
//! - **Platform implementations** (`platforms` module) - in-memory link, host serial ports
//!
//! ## Feature Flags
//!
//! - `std` (default) - in-memory link and `StdClock`
//! - `serialport` - host UART through the `serialport` crate

/// Hardware abstraction traits shared by all platforms.
pub mod hal;

/// Concrete platform implementations.
pub mod platforms;

// Re-export commonly used types
pub use hal::{write_bytewise, PolledSerial, SerialIO, TimeProvider, TimedRead};

#[cfg(feature = "std")]
pub use hal::StdClock;

#[cfg(feature = "std")]
pub use platforms::{MemorySerial, MemorySerialError};

#[cfg(feature = "serialport")]
pub use platforms::SerialPortDevice;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
