// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::hal::time::TimeProvider;

/// Serial I/O abstraction for UART-style links
pub trait SerialIO {
    /// Platform-specific error type
    type Error: core::fmt::Debug;

    /// Write bytes to serial port
    ///
    /// # Arguments
    /// * `data` - Bytes to write
    ///
    /// # Returns
    /// Number of bytes written or error
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read bytes from serial port (non-blocking)
    ///
    /// # Arguments
    /// * `buffer` - Buffer to read into
    ///
    /// # Returns
    /// Number of bytes read (0 if nothing is pending) or error
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;

    /// Flush output buffer
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available to read
    ///
    /// # Returns
    /// True if at least one byte can be read without waiting
    fn available(&self) -> Result<bool, Self::Error> {
        // Default implementation - platforms can override
        Ok(false)
    }
}

/// Bounded-blocking single byte reads
///
/// The frame reader pulls the link one byte at a time and must never wait
/// longer than `timeout_ms` for any single byte.
pub trait TimedRead: SerialIO {
    /// Read one byte, waiting at most `timeout_ms` milliseconds
    ///
    /// # Returns
    /// - `Ok(Some(byte))` when a byte arrived in time
    /// - `Ok(None)` when the timeout expired
    /// - `Err(e)` on a transport failure
    fn timed_read(&mut self, timeout_ms: u32) -> Result<Option<u8>, Self::Error>;
}

/// Write every byte of `data`, one single-byte write at a time
///
/// Returns `Ok(false)` if the port accepted zero bytes for one of the writes.
pub fn write_bytewise<S: SerialIO + ?Sized>(serial: &mut S, data: &[u8]) -> Result<bool, S::Error> {
    for byte in data {
        if serial.write(core::slice::from_ref(byte))? == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Timed reads on top of a non-blocking port
///
/// Busy-waits on `read()` and yields to the platform between attempts until a
/// byte arrives or the deadline passes. Use this for ports that only expose
/// non-blocking reads (most MCU UART drivers).
pub struct PolledSerial<S, T> {
    serial: S,
    clock: T,
    /// Delay between two empty reads
    yield_us: u32,
}

impl<S: SerialIO, T: TimeProvider> PolledSerial<S, T> {
    /// Default pause between polls
    pub const DEFAULT_YIELD_US: u32 = 100;

    /// Wrap a non-blocking port
    pub fn new(serial: S, clock: T) -> Self {
        Self {
            serial,
            clock,
            yield_us: Self::DEFAULT_YIELD_US,
        }
    }

    /// Change the pause between two empty reads
    pub fn with_yield_us(mut self, yield_us: u32) -> Self {
        self.yield_us = yield_us;
        self
    }

    /// Borrow the wrapped port
    pub fn inner(&self) -> &S {
        &self.serial
    }

    /// Mutably borrow the wrapped port
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Unwrap into port and clock
    pub fn into_parts(self) -> (S, T) {
        (self.serial, self.clock)
    }
}

impl<S: SerialIO, T: TimeProvider> SerialIO for PolledSerial<S, T> {
    type Error = S::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.serial.write(data)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.serial.read(buffer)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.serial.flush()
    }

    fn available(&self) -> Result<bool, Self::Error> {
        self.serial.available()
    }
}

impl<S: SerialIO, T: TimeProvider> TimedRead for PolledSerial<S, T> {
    fn timed_read(&mut self, timeout_ms: u32) -> Result<Option<u8>, Self::Error> {
        let mut byte = [0u8; 1];
        let start_us = self.clock.get_time_us();
        let timeout_us = u64::from(timeout_ms) * 1000;
        loop {
            if self.serial.read(&mut byte)? == 1 {
                return Ok(Some(byte[0]));
            }
            if timeout_ms == 0 {
                return Ok(None);
            }
            self.clock.delay_us(self.yield_us);
            if self.clock.get_time_us().saturating_sub(start_us) >= timeout_us {
                return Ok(None);
            }
        }
    }
}
