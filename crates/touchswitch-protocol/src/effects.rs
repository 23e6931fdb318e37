// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-channel effect assignments

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ImportError;
use crate::switches::Channel;
use crate::SWITCH_COUNT;
use touchswitch_config::FACTORY_SWITCH_EFFECTS;

/// Key of the assignment array in the persisted configuration
pub const CONFIG_KEY: &str = "switchEffects";

/// Effect id every channel falls back to after a rejected import
pub const RESET_EFFECT: u8 = 0;

/// Effect id activated by each channel, index 0 is channel 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectAssignments([u8; SWITCH_COUNT]);

impl Default for EffectAssignments {
    fn default() -> Self {
        Self::factory()
    }
}

impl EffectAssignments {
    pub fn new(effects: [u8; SWITCH_COUNT]) -> Self {
        Self(effects)
    }

    /// Factory assignments
    pub fn factory() -> Self {
        Self(FACTORY_SWITCH_EFFECTS)
    }

    /// Every channel on effect 0
    pub fn zeroed() -> Self {
        Self([RESET_EFFECT; SWITCH_COUNT])
    }

    pub fn effect_for(&self, channel: Channel) -> u8 {
        self.0[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, effect_id: u8) {
        self.0[channel.index()] = effect_id;
    }

    pub fn as_array(&self) -> [u8; SWITCH_COUNT] {
        self.0
    }

    /// Channels paired with their effect, ascending
    pub fn iter(&self) -> impl Iterator<Item = (Channel, u8)> + '_ {
        Channel::all().map(move |channel| (channel, self.effect_for(channel)))
    }

    /// JSON array of the eight effect ids
    pub fn to_json(&self) -> Value {
        Value::from(self.0.to_vec())
    }

    /// Validate a persisted assignment array
    pub fn parse(value: Option<&Value>) -> Result<Self, ImportError> {
        let value = value.ok_or(ImportError::Missing)?;
        let entries = value
            .as_array()
            .ok_or_else(|| ImportError::NotAnArray(json_kind(value)))?;
        if entries.len() != SWITCH_COUNT {
            return Err(ImportError::WrongLength {
                expected: SWITCH_COUNT,
                found: entries.len(),
            });
        }

        let mut effects = [RESET_EFFECT; SWITCH_COUNT];
        for (index, (slot, entry)) in effects.iter_mut().zip(entries).enumerate() {
            *slot = entry
                .as_u64()
                .and_then(|id| u8::try_from(id).ok())
                .ok_or_else(|| ImportError::InvalidEntry {
                    index,
                    value: entry.to_string(),
                })?;
        }
        Ok(Self(effects))
    }

    /// Replace the assignments from a persisted array
    ///
    /// Anything malformed resets every channel to effect 0.
    pub fn import(&mut self, value: Option<&Value>) -> Result<(), ImportError> {
        match Self::parse(value) {
            Ok(parsed) => {
                *self = parsed;
                Ok(())
            }
            Err(e) => {
                warn!("[TOUCH-SWITCH] Rejected effect assignments ({}), resetting to 0", e);
                *self = Self::zeroed();
                Err(e)
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
