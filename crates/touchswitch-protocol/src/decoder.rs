// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command decoding
//!
//! Pure classification of a [`Frame`] into a [`Command`]. Only a pressed
//! switch event on a valid channel leads to a state change.

use crate::frame::{Frame, SWITCH_EVENT_COMMAND, SWITCH_PRESSED, SWITCH_RELEASED};
use crate::switches::Channel;

/// Payload offset of the command type (wire offset 2)
pub const COMMAND_OFFSET: usize = 0;
/// Payload offset of the switch number (wire offset 3)
pub const CHANNEL_OFFSET: usize = 1;
/// Payload offset of the switch status (wire offset 4)
pub const STATUS_OFFSET: usize = 2;

/// Switch status byte of a switch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchStatus {
    Released,
    Pressed,
    Other(u8),
}

impl From<u8> for SwitchStatus {
    fn from(byte: u8) -> Self {
        match byte {
            SWITCH_PRESSED => Self::Pressed,
            SWITCH_RELEASED => Self::Released,
            other => Self::Other(other),
        }
    }
}

/// Decoded inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch event on a valid channel
    SwitchEvent { channel: Channel, status: SwitchStatus },
    /// Switch event naming a switch outside 1..=8
    InvalidChannel { switch_number: u8, status: SwitchStatus },
    /// Any other command family
    Unknown { command_type: u8 },
    /// Too short to carry a switch event
    Truncated { len: usize },
}

impl Command {
    /// Channel to toggle, if this command toggles one
    pub fn toggle_target(&self) -> Option<Channel> {
        match self {
            Self::SwitchEvent {
                channel,
                status: SwitchStatus::Pressed,
            } => Some(*channel),
            _ => None,
        }
    }
}

/// Classify a frame
pub fn decode(frame: &Frame) -> Command {
    let Some(command_type) = frame.byte(COMMAND_OFFSET) else {
        return Command::Truncated { len: 0 };
    };
    if command_type != SWITCH_EVENT_COMMAND {
        return Command::Unknown { command_type };
    }

    let (Some(switch_number), Some(status)) = (frame.byte(CHANNEL_OFFSET), frame.byte(STATUS_OFFSET))
    else {
        return Command::Truncated { len: frame.len() };
    };
    let status = SwitchStatus::from(status);

    match Channel::new(switch_number) {
        Some(channel) => Command::SwitchEvent { channel, status },
        None => Command::InvalidChannel {
            switch_number,
            status,
        },
    }
}
