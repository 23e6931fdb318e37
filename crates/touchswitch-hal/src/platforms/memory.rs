// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory serial link
//!
//! A scripted UART: bytes queued with [`MemorySerial::push_rx`] are handed out
//! by reads, and every written byte is captured for inspection. A timed read
//! on an empty queue expires immediately, so protocol code can be driven
//! deterministically without real waiting.

use std::collections::VecDeque;

use crate::hal::{SerialIO, TimedRead};

/// Errors raised by [`MemorySerial`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySerialError {
    /// The link was closed with [`MemorySerial::close`]
    Closed,
}

impl core::fmt::Display for MemorySerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Closed => write!(f, "memory serial link is closed"),
        }
    }
}

impl std::error::Error for MemorySerialError {}

/// Scripted in-memory UART
#[derive(Debug, Default)]
pub struct MemorySerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    write_calls: usize,
    bytes_consumed: usize,
    expired_reads: usize,
    closed: bool,
}

impl MemorySerial {
    /// Create an empty, open link
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a link with `bytes` already waiting to be read
    pub fn with_rx(bytes: &[u8]) -> Self {
        let mut serial = Self::new();
        serial.push_rx(bytes);
        serial
    }

    /// Simulate the remote end sending bytes
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Bytes still waiting to be read
    pub fn rx_pending(&self) -> usize {
        self.rx.len()
    }

    /// Everything written so far
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    /// Take everything written so far, leaving the capture empty
    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    /// Number of `write()` calls performed
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    /// Number of bytes handed out by reads
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Number of timed reads that expired without data
    pub fn expired_reads(&self) -> usize {
        self.expired_reads
    }

    /// Close the link; every further operation fails
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn ensure_open(&self) -> Result<(), MemorySerialError> {
        if self.closed {
            Err(MemorySerialError::Closed)
        } else {
            Ok(())
        }
    }
}

impl SerialIO for MemorySerial {
    type Error = MemorySerialError;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.ensure_open()?;
        self.write_calls += 1;
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        self.ensure_open()?;
        let mut count = 0;
        while count < buffer.len() {
            match self.rx.pop_front() {
                Some(byte) => {
                    buffer[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        self.bytes_consumed += count;
        Ok(count)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.ensure_open()
    }

    fn available(&self) -> Result<bool, Self::Error> {
        self.ensure_open()?;
        Ok(!self.rx.is_empty())
    }
}

impl TimedRead for MemorySerial {
    fn timed_read(&mut self, _timeout_ms: u32) -> Result<Option<u8>, Self::Error> {
        self.ensure_open()?;
        match self.rx.pop_front() {
            Some(byte) => {
                self.bytes_consumed += 1;
                Ok(Some(byte))
            }
            None => {
                self.expired_reads += 1;
                Ok(None)
            }
        }
    }
}
