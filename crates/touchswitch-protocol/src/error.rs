// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the touch-switch protocol

use core::fmt::{self, Debug};

use thiserror::Error;

/// Where the frame reader was when it gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    /// Waiting for the start byte
    StartByte,
    /// Waiting for the length byte
    Length,
    /// Inside the payload, after `received` bytes
    Payload { received: usize },
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartByte => write!(f, "start byte"),
            Self::Length => write!(f, "length byte"),
            Self::Payload { received } => write!(f, "payload byte {}", received),
        }
    }
}

/// Why no frame came out of a read attempt
#[derive(Debug, Error)]
pub enum ReadError<E: Debug> {
    /// First byte was not the start byte; exactly that byte was consumed
    #[error("Expected start byte 0x7B, got 0x{0:02X}")]
    Desync(u8),

    /// A byte did not arrive in time
    #[error("Timed out waiting for {0}")]
    Timeout(FrameStage),

    /// Declared length exceeds the frame buffer
    #[error("Declared length {declared} exceeds buffer capacity {capacity} ({drained} bytes drained)")]
    LengthOverflow {
        declared: u8,
        capacity: usize,
        drained: usize,
    },

    /// Trailing payload byte did not match the computed sum
    #[error("Checksum mismatch: frame carries 0x{carried:02X}, computed 0x{computed:02X}")]
    ChecksumMismatch { carried: u8, computed: u8 },

    /// Underlying link failure
    #[error("Transport error: {0:?}")]
    Transport(E),
}

/// Why a status frame could not be delivered
#[derive(Debug, Error)]
pub enum WriteError<E: Debug> {
    /// The port accepted zero bytes of a single-byte write
    #[error("Serial port stalled while writing status frame")]
    Stalled,

    /// Underlying link failure
    #[error("Transport error: {0:?}")]
    Transport(E),
}

/// Malformed status frame (panel side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusFrameError {
    #[error("Status frame must be 7 bytes, got {0}")]
    WrongSize(usize),

    #[error("Bad start byte 0x{0:02X}")]
    BadStartByte(u8),

    #[error("Bad length byte 0x{0:02X}")]
    BadLength(u8),

    #[error("Bad command byte 0x{0:02X}")]
    BadCommand(u8),

    #[error("Switch number {0} out of range")]
    BadChannel(u8),

    #[error("Bad state byte 0x{0:02X}")]
    BadState(u8),

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// Rejected effect-assignment import
///
/// Whenever one of these is returned, all assignments have been reset to 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// No `switchEffects` entry
    #[error("Missing switchEffects entry")]
    Missing,

    /// Entry is not a JSON array
    #[error("switchEffects must be an array, got {0}")]
    NotAnArray(&'static str),

    /// Array does not have one entry per channel
    #[error("switchEffects must have {expected} entries, got {found}")]
    WrongLength { expected: usize, found: usize },

    /// Entry is not an integer in 0..=255
    #[error("switchEffects[{index}] is not an effect id: {value}")]
    InvalidEntry { index: usize, value: String },
}
