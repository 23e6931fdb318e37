// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host UART implementation backed by the `serialport` crate
//!
//! Used by the desktop bridge and bench rigs where the touch panel is wired
//! to a USB-UART adapter (e.g. `/dev/ttyUSB0`, `COM3`).

use std::io::{self, Read, Write};
use std::time::Duration;

use crate::hal::{SerialIO, TimedRead};

/// A host serial port
pub struct SerialPortDevice {
    port: Box<dyn serialport::SerialPort>,
    port_name: String,
    /// Timeout currently programmed into the driver
    current_timeout_ms: u32,
}

impl SerialPortDevice {
    /// Timeout programmed at open time
    pub const DEFAULT_TIMEOUT_MS: u32 = 300;

    /// Open a serial port
    ///
    /// # Arguments
    ///
    /// * `port_name` - Serial port name (e.g., "/dev/ttyUSB0" or "COM3")
    /// * `baud_rate` - Baud rate (the touch panel talks at 9600)
    ///
    /// # Errors
    ///
    /// Returns error if port cannot be opened
    pub fn open(port_name: &str, baud_rate: u32) -> io::Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(u64::from(Self::DEFAULT_TIMEOUT_MS)))
            .open()?;

        tracing::info!(
            "[SERIAL] opened {} at {} baud",
            port_name,
            baud_rate
        );

        Ok(Self {
            port,
            port_name: port_name.to_string(),
            current_timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        })
    }

    /// List available serial ports
    #[must_use]
    pub fn list_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }

    /// Name the port was opened with
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    fn program_timeout(&mut self, timeout_ms: u32) -> io::Result<()> {
        if self.current_timeout_ms != timeout_ms {
            self.port
                .set_timeout(Duration::from_millis(u64::from(timeout_ms)))?;
            self.current_timeout_ms = timeout_ms;
        }
        Ok(())
    }
}

impl SerialIO for SerialPortDevice {
    type Error = io::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.port.write(data)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        let pending = self.port.bytes_to_read()? as usize;
        if pending == 0 || buffer.is_empty() {
            return Ok(0);
        }
        let len = pending.min(buffer.len());
        self.port.read(&mut buffer[..len])
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port.flush()
    }

    fn available(&self) -> Result<bool, Self::Error> {
        Ok(self.port.bytes_to_read()? > 0)
    }
}

impl TimedRead for SerialPortDevice {
    fn timed_read(&mut self, timeout_ms: u32) -> Result<Option<u8>, Self::Error> {
        self.program_timeout(timeout_ms)?;
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}
