// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Wire format
//!
//! ## Inbound switch-event frame
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬─────────┐
//! │ Start    │ Length L │ Command  │ Switch   │ Status   │ ...     │
//! │ 0x7B     │ (1 byte) │ 0x04     │ 1..=8    │ 0x01=on  │         │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴─────────┘
//!              └─ L bytes follow the length byte ─────────────────┘
//! ```
//!
//! The reader strips the start and length bytes. A [`Frame`] only holds the
//! `L` payload bytes, so wire offset `n` is payload offset `n - 2`.
//!
//! ## Outbound status frame
//!
//! ```text
//! [0x7B] [0x04] [seq] [0x05] [switch] [state] [checksum]
//!                └──── summed mod 256 ─────┘
//! ```

use heapless::Vec;

use crate::error::StatusFrameError;
use crate::switches::Channel;

/// Frame boundary marker
pub const START_BYTE: u8 = 0x7B;

/// Capacity of the inbound payload buffer
pub const FRAME_BUFFER_CAPACITY: usize = 128;

/// Inbound command family: switch status event
pub const SWITCH_EVENT_COMMAND: u8 = 0x04;

/// Outbound command type: switch status report
pub const STATUS_COMMAND: u8 = 0x05;

/// Length byte of every status frame
pub const STATUS_FRAME_LEN: u8 = 0x04;

/// Total size of a status frame on the wire
pub const STATUS_FRAME_SIZE: usize = 7;

/// Switch status byte: pressed / on
pub const SWITCH_PRESSED: u8 = 0x01;

/// Switch status byte: released / off
pub const SWITCH_RELEASED: u8 = 0x00;

/// Stored in place of a payload byte that never arrived
pub const TIMEOUT_SENTINEL: u8 = 0xFF;

/// Sum of `bytes` modulo 256
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte))
}

/// A materialized inbound frame (payload only)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    payload: Vec<u8, FRAME_BUFFER_CAPACITY>,
    timed_out_bytes: usize,
}

impl Frame {
    /// Build a frame from payload bytes
    ///
    /// Returns `None` if the payload does not fit the frame buffer.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        Some(Self {
            payload: Vec::from_slice(payload).ok()?,
            timed_out_bytes: 0,
        })
    }

    /// Append one received byte; `false` if the buffer is full
    pub(crate) fn push(&mut self, byte: u8) -> bool {
        self.payload.push(byte).is_ok()
    }

    /// Append a placeholder for a byte that timed out
    pub(crate) fn push_sentinel(&mut self) -> bool {
        self.timed_out_bytes += 1;
        self.push(TIMEOUT_SENTINEL)
    }

    /// Payload bytes (everything after the length byte)
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of payload bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True for a zero-length frame
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Payload byte at `offset`
    pub fn byte(&self, offset: usize) -> Option<u8> {
        self.payload.get(offset).copied()
    }

    /// How many payload bytes were filled with [`TIMEOUT_SENTINEL`]
    pub fn timed_out_bytes(&self) -> usize {
        self.timed_out_bytes
    }

    /// Checksum carried in the last payload byte, and the one computed over the rest
    ///
    /// `None` for an empty frame.
    pub fn trailing_checksum(&self) -> Option<(u8, u8)> {
        let (last, body) = self.payload.split_last()?;
        Some((*last, checksum(body)))
    }
}

/// Outbound switch status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFrame {
    pub sequence: u8,
    pub channel: Channel,
    pub on: bool,
}

impl StatusFrame {
    /// Serialize to the 7 wire bytes
    pub fn to_bytes(&self) -> [u8; STATUS_FRAME_SIZE] {
        let state = if self.on { SWITCH_PRESSED } else { SWITCH_RELEASED };
        let mut bytes = [
            START_BYTE,
            STATUS_FRAME_LEN,
            self.sequence,
            STATUS_COMMAND,
            self.channel.number(),
            state,
            0,
        ];
        bytes[6] = checksum(&bytes[2..6]);
        bytes
    }

    /// Parse a status frame, as the panel would
    pub fn parse(bytes: &[u8]) -> Result<Self, StatusFrameError> {
        if bytes.len() != STATUS_FRAME_SIZE {
            return Err(StatusFrameError::WrongSize(bytes.len()));
        }
        if bytes[0] != START_BYTE {
            return Err(StatusFrameError::BadStartByte(bytes[0]));
        }
        if bytes[1] != STATUS_FRAME_LEN {
            return Err(StatusFrameError::BadLength(bytes[1]));
        }
        if bytes[3] != STATUS_COMMAND {
            return Err(StatusFrameError::BadCommand(bytes[3]));
        }
        let expected = checksum(&bytes[2..6]);
        if bytes[6] != expected {
            return Err(StatusFrameError::ChecksumMismatch {
                expected,
                actual: bytes[6],
            });
        }
        let channel = Channel::new(bytes[4]).ok_or(StatusFrameError::BadChannel(bytes[4]))?;
        let on = match bytes[5] {
            SWITCH_PRESSED => true,
            SWITCH_RELEASED => false,
            other => return Err(StatusFrameError::BadState(other)),
        };
        Ok(Self {
            sequence: bytes[2],
            channel,
            on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(number: u8) -> Channel {
        Channel::new(number).unwrap()
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x01, 0x05, 0x03, 0x01]), 0x0A);
        assert_eq!(checksum(&[0xFF, 0x05, 0x08, 0x01]), 0x0D);
    }

    #[test]
    fn test_status_frame_layout() {
        let frame = StatusFrame {
            sequence: 0,
            channel: channel(3),
            on: true,
        };
        assert_eq!(frame.to_bytes(), [0x7B, 0x04, 0x00, 0x05, 0x03, 0x01, 0x09]);

        let frame = StatusFrame {
            sequence: 0xFE,
            channel: channel(8),
            on: false,
        };
        // 0xFE + 0x05 + 0x08 + 0x00 = 0x10B
        assert_eq!(frame.to_bytes(), [0x7B, 0x04, 0xFE, 0x05, 0x08, 0x00, 0x0B]);
    }

    #[test]
    fn test_status_frame_parse_rejects_corruption() {
        let mut bytes = StatusFrame {
            sequence: 7,
            channel: channel(2),
            on: true,
        }
        .to_bytes();
        bytes[6] = bytes[6].wrapping_add(1);
        assert!(matches!(
            StatusFrame::parse(&bytes),
            Err(StatusFrameError::ChecksumMismatch { .. })
        ));
        assert_eq!(
            StatusFrame::parse(&bytes[..6]),
            Err(StatusFrameError::WrongSize(6))
        );
    }

    #[test]
    fn test_frame_from_payload_bounds() {
        assert!(Frame::from_payload(&[0u8; FRAME_BUFFER_CAPACITY]).is_some());
        assert!(Frame::from_payload(&[0u8; FRAME_BUFFER_CAPACITY + 1]).is_none());
    }

    #[test]
    fn test_trailing_checksum() {
        let frame = Frame::from_payload(&[0x04, 0x03, 0x01, 0x08]).unwrap();
        assert_eq!(frame.trailing_checksum(), Some((0x08, 0x08)));
        assert_eq!(Frame::default().trailing_checksum(), None);
    }
}
