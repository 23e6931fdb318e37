// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Eight-channel switch state machine

use core::fmt;

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::SWITCH_COUNT;

/// Channel number on the panel (1-based, 1..=8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Channel(u8);

impl Channel {
    /// Lowest valid channel number
    pub const FIRST: u8 = 1;
    /// Highest valid channel number
    pub const LAST: u8 = SWITCH_COUNT as u8;

    /// `None` unless `number` is in `1..=8`
    pub const fn new(number: u8) -> Option<Self> {
        if number >= Self::FIRST && number <= Self::LAST {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Channel for a zero-based state index
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index + 1).ok().and_then(Self::new)
    }

    /// 1-based number as it appears on the wire
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Zero-based index into state and effect tables
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Every channel in ascending order
    pub fn all() -> impl Iterator<Item = Channel> {
        (Self::FIRST..=Self::LAST).map(Channel)
    }
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number).ok_or(number)
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a single toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// The addressed channel
    pub channel: Channel,
    /// Its state after the toggle
    pub now_on: bool,
    /// Channels that were on and got forced off, ascending
    pub forced_off: Vec<Channel, SWITCH_COUNT>,
}

impl ToggleOutcome {
    /// Every state change in notification order: forced-off channels first, then the addressed one
    pub fn changes(&self) -> impl Iterator<Item = (Channel, bool)> + '_ {
        self.forced_off
            .iter()
            .map(|channel| (*channel, false))
            .chain(core::iter::once((self.channel, self.now_on)))
    }
}

/// On/off state of the eight channels
///
/// All channels start off. With exclusivity enabled at most one channel is
/// on after any toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchBank {
    states: [bool; SWITCH_COUNT],
}

impl SwitchBank {
    /// All channels off
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `channel` is on
    pub fn is_on(&self, channel: Channel) -> bool {
        self.states[channel.index()]
    }

    /// Snapshot of all states, index 0 is channel 1
    pub fn states(&self) -> [bool; SWITCH_COUNT] {
        self.states
    }

    /// Lowest channel that is on
    pub fn active(&self) -> Option<Channel> {
        self.states
            .iter()
            .position(|on| *on)
            .and_then(Channel::from_index)
    }

    /// Number of channels that are on
    pub fn on_count(&self) -> usize {
        self.states.iter().filter(|on| **on).count()
    }

    /// Invert `channel`
    ///
    /// With `exclusive` set, every other channel that was on is turned off
    /// first and reported in [`ToggleOutcome::forced_off`].
    pub fn toggle(&mut self, channel: Channel, exclusive: bool) -> ToggleOutcome {
        let mut forced_off = Vec::new();
        if exclusive {
            for other in Channel::all().filter(|other| *other != channel) {
                if self.states[other.index()] {
                    self.states[other.index()] = false;
                    // At most SWITCH_COUNT - 1 entries
                    let _ = forced_off.push(other);
                }
            }
        }

        let index = channel.index();
        self.states[index] = !self.states[index];

        ToggleOutcome {
            channel,
            now_on: self.states[index],
            forced_off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ch(number: u8) -> Channel {
        Channel::new(number).unwrap()
    }

    #[test]
    fn test_channel_range() {
        assert!(Channel::new(0).is_none());
        assert!(Channel::new(9).is_none());
        assert_eq!(Channel::try_from(8), Ok(ch(8)));
        assert_eq!(Channel::try_from(200), Err(200));
        assert_eq!(ch(1).index(), 0);
        assert_eq!(Channel::from_index(7), Some(ch(8)));
        assert_eq!(Channel::from_index(8), None);
        assert_eq!(Channel::all().count(), SWITCH_COUNT);
    }

    #[test]
    fn test_channel_serde() {
        assert_eq!(serde_json::to_string(&ch(4)).unwrap(), "4");
        assert_eq!(serde_json::from_str::<Channel>("2").unwrap(), ch(2));
        assert!(serde_json::from_str::<Channel>("0").is_err());
    }

    #[test]
    fn test_exclusive_toggle_forces_others_off() {
        let mut bank = SwitchBank::new();
        bank.toggle(ch(2), true);

        let outcome = bank.toggle(ch(5), true);
        assert!(outcome.now_on);
        assert_eq!(outcome.forced_off.as_slice(), &[ch(2)]);
        assert_eq!(bank.active(), Some(ch(5)));
        assert_eq!(bank.on_count(), 1);

        let changes: std::vec::Vec<_> = outcome.changes().collect();
        assert_eq!(changes, vec![(ch(2), false), (ch(5), true)]);
    }

    #[test]
    fn test_exclusive_toggle_of_active_channel_turns_all_off() {
        let mut bank = SwitchBank::new();
        bank.toggle(ch(3), true);

        let outcome = bank.toggle(ch(3), true);
        assert!(!outcome.now_on);
        assert!(outcome.forced_off.is_empty());
        assert_eq!(bank.on_count(), 0);
    }

    #[test]
    fn test_independent_toggles() {
        let mut bank = SwitchBank::new();
        bank.toggle(ch(1), false);
        bank.toggle(ch(8), false);
        assert_eq!(bank.on_count(), 2);

        // Switching to exclusive mode clears every other lit channel, ascending
        let mut lit = bank.clone();
        lit.toggle(ch(4), false);
        let outcome = lit.toggle(ch(6), true);
        assert_eq!(outcome.forced_off.as_slice(), &[ch(1), ch(4), ch(8)]);
    }

    proptest! {
        #[test]
        fn prop_exclusive_never_more_than_one_on(presses in prop::collection::vec(1u8..=8, 0..64)) {
            let mut bank = SwitchBank::new();
            for number in presses {
                bank.toggle(ch(number), true);
                prop_assert!(bank.on_count() <= 1);
            }
        }

        #[test]
        fn prop_double_toggle_restores_independent_bank(
            presses in prop::collection::vec(1u8..=8, 0..32),
            target in 1u8..=8,
        ) {
            let mut bank = SwitchBank::new();
            for number in presses {
                bank.toggle(ch(number), false);
            }
            let before = bank.clone();
            bank.toggle(ch(target), false);
            bank.toggle(ch(target), false);
            prop_assert_eq!(bank, before);
        }
    }
}
