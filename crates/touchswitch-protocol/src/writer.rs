// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Outbound status frames

use touchswitch_hal::{write_bytewise, SerialIO};
use tracing::{debug, warn};

use crate::error::WriteError;
use crate::frame::StatusFrame;
use crate::switches::Channel;

/// Builds and sends status frames, stamping each with a wrapping sequence number
#[derive(Debug, Clone, Default)]
pub struct FrameWriter {
    next_sequence: u8,
}

impl FrameWriter {
    /// Sequence starts at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given sequence number
    pub fn with_sequence(next_sequence: u8) -> Self {
        Self { next_sequence }
    }

    /// Sequence number the next frame will carry
    pub fn next_sequence(&self) -> u8 {
        self.next_sequence
    }

    /// Build the next status frame; consumes one sequence number
    pub fn build(&mut self, channel: Channel, on: bool) -> StatusFrame {
        let frame = StatusFrame {
            sequence: self.next_sequence,
            channel,
            on,
        };
        self.next_sequence = self.next_sequence.wrapping_add(1);
        frame
    }

    /// Send a status frame for `channel`
    ///
    /// The sequence number is consumed even if the write fails.
    pub fn notify<S: SerialIO + ?Sized>(
        &mut self,
        serial: &mut S,
        channel: Channel,
        on: bool,
    ) -> Result<StatusFrame, WriteError<S::Error>> {
        let frame = self.build(channel, on);
        let bytes = frame.to_bytes();

        match write_bytewise(serial, &bytes) {
            Ok(true) => {
                debug!(
                    "[FRAME-WRITER] Sent status seq={} switch={} on={}",
                    frame.sequence, channel, on
                );
                Ok(frame)
            }
            Ok(false) => {
                warn!("[FRAME-WRITER] Port stalled sending status for switch {}", channel);
                Err(WriteError::Stalled)
            }
            Err(e) => {
                warn!("[FRAME-WRITER] Failed to send status for switch {}: {:?}", channel, e);
                Err(WriteError::Transport(e))
            }
        }
    }
}
