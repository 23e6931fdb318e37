// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lighting host seam
//!
//! The touch-switch module never renders anything itself. It tells the host
//! which effect to run, how bright, and when to apply the change.

/// Lighting controller driven by switch presses
pub trait LightHost {
    /// Select the effect to run
    fn set_active_effect(&mut self, effect_id: u8);

    /// Set output power (0 = off)
    fn set_power_level(&mut self, level: u8);

    /// Apply pending changes, once per processed toggle
    fn notify_direct_change(&mut self);

    /// Human-readable effect name, if the host knows one
    fn effect_name(&self, _effect_id: u8) -> Option<String> {
        None
    }
}

impl<T: LightHost + ?Sized> LightHost for &mut T {
    fn set_active_effect(&mut self, effect_id: u8) {
        (**self).set_active_effect(effect_id)
    }

    fn set_power_level(&mut self, level: u8) {
        (**self).set_power_level(level)
    }

    fn notify_direct_change(&mut self) {
        (**self).notify_direct_change()
    }

    fn effect_name(&self, effect_id: u8) -> Option<String> {
        (**self).effect_name(effect_id)
    }
}

/// Names of the classic effect ids 0..=45
pub const CLASSIC_EFFECT_NAMES: [&str; 46] = [
    "Solid",
    "Blink",
    "Breathe",
    "Wipe",
    "Wipe Random",
    "Random Colors",
    "Sweep",
    "Dynamic",
    "Rainbow",
    "Rainbow Cycle",
    "Scan",
    "Scan Dual",
    "Fade",
    "Theater",
    "Theater Rainbow",
    "Running",
    "Saw",
    "Twinkle",
    "Dissolve",
    "Dissolve Random",
    "Sparkle",
    "Sparkle Dark",
    "Sparkle+",
    "Strobe",
    "Strobe Rainbow",
    "Strobe Mega",
    "Blink Rainbow",
    "Android",
    "Chase",
    "Chase Random",
    "Chase Rainbow",
    "Chase Flash",
    "Chase Flash Random",
    "Rainbow Runner",
    "Colorful",
    "Traffic Light",
    "Sweep Random",
    "Chase 2",
    "Aurora",
    "Stream",
    "Scanner",
    "Lighthouse",
    "Fireworks",
    "Rain",
    "Tetrix",
    "Fire Flicker",
];

/// Look up a classic effect name
pub fn classic_effect_name(effect_id: u8) -> Option<&'static str> {
    CLASSIC_EFFECT_NAMES.get(usize::from(effect_id)).copied()
}

/// Call received by a [`RecordingHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    SetActiveEffect(u8),
    SetPowerLevel(u8),
    NotifyDirectChange,
}

/// In-memory host that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    effect: Option<u8>,
    power_level: u8,
    named: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer [`LightHost::effect_name`] from [`CLASSIC_EFFECT_NAMES`]
    pub fn with_classic_names() -> Self {
        Self {
            named: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Last effect selected
    pub fn effect(&self) -> Option<u8> {
        self.effect
    }

    pub fn power_level(&self) -> u8 {
        self.power_level
    }

    /// Number of `notify_direct_change` calls
    pub fn direct_changes(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, HostCall::NotifyDirectChange))
            .count()
    }
}

impl LightHost for RecordingHost {
    fn set_active_effect(&mut self, effect_id: u8) {
        self.effect = Some(effect_id);
        self.calls.push(HostCall::SetActiveEffect(effect_id));
    }

    fn set_power_level(&mut self, level: u8) {
        self.power_level = level;
        self.calls.push(HostCall::SetPowerLevel(level));
    }

    fn notify_direct_change(&mut self) {
        self.calls.push(HostCall::NotifyDirectChange);
    }

    fn effect_name(&self, effect_id: u8) -> Option<String> {
        if !self.named {
            return None;
        }
        classic_effect_name(effect_id).map(str::to_string)
    }
}
