// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Serial touch-switch host module
//!
//! Ties the pipeline together:
//!
//! ```text
//! link → FrameReader → decode → SwitchBank → FrameWriter (status frames) → LightHost
//! ```
//!
//! [`SerialTouchSwitch::poll`] processes at most one frame per call and never
//! fails; every failure is folded into a [`PollOutcome`].

use std::collections::BTreeMap;

use heapless::Vec;
use serde_json::{Map, Value};
use touchswitch_config::{ProtocolConfig, TouchSwitchConfig};
use touchswitch_hal::TimedRead;
use tracing::{debug, info, trace, warn};

use crate::decoder::{decode, Command};
use crate::effects::{EffectAssignments, CONFIG_KEY};
use crate::error::{ImportError, ReadError};
use crate::frame::{Frame, StatusFrame};
use crate::host::LightHost;
use crate::reader::{FrameReader, ReaderOptions};
use crate::switches::{Channel, SwitchBank};
use crate::writer::FrameWriter;
use crate::SWITCH_COUNT;

/// Registered module id
pub const MODULE_ID: u16 = 0x7B;

/// Registered module name, also the key of the status section
pub const MODULE_NAME: &str = "SerialTouchSwitch";

/// Lifecycle hooks a lighting host drives a module through
pub trait HostModule {
    fn id(&self) -> u16;

    fn name(&self) -> &'static str;

    /// Process at most one pending frame
    fn poll(&mut self) -> PollOutcome;

    /// Current effect assignments
    fn export_config(&self) -> EffectAssignments;

    /// Replace effect assignments; malformed or missing input resets them to 0
    fn import_config(&mut self, effects: Option<&Value>) -> Result<(), ImportError>;

    /// `"Switch N"` → effect name, for N in 1..=8
    fn status(&self) -> BTreeMap<String, String>;

    /// Write this module's section into a configuration document
    fn add_to_config(&self, root: &mut Map<String, Value>) {
        root.insert(CONFIG_KEY.to_string(), self.export_config().to_json());
    }

    /// Read this module's section from a configuration document
    fn read_from_config(&mut self, root: &Value) -> Result<(), ImportError> {
        self.import_config(root.get(CONFIG_KEY))
    }

    /// Write this module's status section into an info document
    fn add_to_info(&self, root: &mut Map<String, Value>) {
        let status: Map<String, Value> = self
            .status()
            .into_iter()
            .map(|(key, name)| (key, Value::String(name)))
            .collect();
        root.insert(self.name().to_string(), Value::Object(status));
    }
}

/// Behaviour switches of the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchOptions {
    /// Power level applied when a channel turns on
    pub on_power_level: u8,
    /// Force every other channel off when one is toggled
    pub mutual_exclusion: bool,
    /// Send a status frame for every channel that changed
    pub notify_panel: bool,
}

impl Default for SwitchOptions {
    fn default() -> Self {
        Self::from(&ProtocolConfig::default())
    }
}

impl From<&ProtocolConfig> for SwitchOptions {
    fn from(config: &ProtocolConfig) -> Self {
        Self {
            on_power_level: config.on_power_level,
            mutual_exclusion: config.mutual_exclusion,
            notify_panel: config.notify_panel,
        }
    }
}

impl SwitchOptions {
    /// Independent channels, no status frames
    pub fn simple() -> Self {
        Self {
            mutual_exclusion: false,
            notify_panel: false,
            ..Self::default()
        }
    }
}

/// Why a read attempt produced no frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Stray byte skipped while hunting for a start byte
    Desync { byte: u8 },
    /// Start, length or payload byte did not arrive in time
    Timeout,
    /// Declared length larger than the frame buffer
    LengthOverflow { declared: u8 },
    /// Trailing checksum did not match
    ChecksumMismatch,
    /// Link failure while polling or reading
    Transport,
}

impl<E: core::fmt::Debug> From<&ReadError<E>> for DropReason {
    fn from(error: &ReadError<E>) -> Self {
        match error {
            ReadError::Desync(byte) => Self::Desync { byte: *byte },
            ReadError::Timeout(_) => Self::Timeout,
            ReadError::LengthOverflow { declared, .. } => Self::LengthOverflow {
                declared: *declared,
            },
            ReadError::ChecksumMismatch { .. } => Self::ChecksumMismatch,
            ReadError::Transport(_) => Self::Transport,
        }
    }
}

/// Everything a processed toggle caused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleReport {
    pub channel: Channel,
    pub now_on: bool,
    /// Channels forced off by exclusivity, ascending
    pub forced_off: Vec<Channel, SWITCH_COUNT>,
    /// Status frames delivered to the panel, in send order
    pub frames_sent: Vec<StatusFrame, SWITCH_COUNT>,
    /// Status frames that could not be delivered
    pub frames_failed: usize,
    /// Effect activated, when the channel turned on
    pub effect_id: Option<u8>,
}

/// Result of one [`HostModule::poll`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing pending on the link
    Idle,
    /// Bytes were consumed but no frame came out
    Dropped(DropReason),
    /// A frame was decoded but changes nothing
    Ignored(Command),
    /// A switch was toggled
    Toggled(ToggleReport),
}

/// Eight-channel serial touch panel driving a lighting host
pub struct SerialTouchSwitch<S, H> {
    serial: S,
    host: H,
    reader: FrameReader,
    writer: FrameWriter,
    switches: SwitchBank,
    effects: EffectAssignments,
    options: SwitchOptions,
}

impl<S: TimedRead, H: LightHost> SerialTouchSwitch<S, H> {
    /// Module with default protocol settings and factory effects
    pub fn new(serial: S, host: H) -> Self {
        Self::with_options(
            serial,
            host,
            ReaderOptions::default(),
            SwitchOptions::default(),
            EffectAssignments::factory(),
        )
    }

    pub fn with_options(
        serial: S,
        host: H,
        reader: ReaderOptions,
        options: SwitchOptions,
        effects: EffectAssignments,
    ) -> Self {
        info!(
            "[TOUCH-SWITCH] Initialized: exclusive={} notify_panel={} on_level={} timeout={}ms",
            options.mutual_exclusion, options.notify_panel, options.on_power_level, reader.timeout_ms
        );
        Self {
            serial,
            host,
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(),
            switches: SwitchBank::new(),
            effects,
            options,
        }
    }

    /// Module configured from a loaded configuration
    pub fn from_config(serial: S, host: H, config: &TouchSwitchConfig) -> Self {
        Self::with_options(
            serial,
            host,
            ReaderOptions::from(&config.protocol),
            SwitchOptions::from(&config.protocol),
            EffectAssignments::new(config.switches.effects),
        )
    }

    pub fn transport(&self) -> &S {
        &self.serial
    }

    pub fn transport_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn options(&self) -> &SwitchOptions {
        &self.options
    }

    pub fn switches(&self) -> &SwitchBank {
        &self.switches
    }

    pub fn is_on(&self, channel: Channel) -> bool {
        self.switches.is_on(channel)
    }

    pub fn effects(&self) -> &EffectAssignments {
        &self.effects
    }

    /// Sequence number of the next status frame
    pub fn next_sequence(&self) -> u8 {
        self.writer.next_sequence()
    }

    /// Unwrap into link and host
    pub fn into_parts(self) -> (S, H) {
        (self.serial, self.host)
    }

    /// Act on a frame obtained elsewhere
    pub fn handle_frame(&mut self, frame: &Frame) -> PollOutcome {
        let command = decode(frame);
        match command.toggle_target() {
            Some(channel) => PollOutcome::Toggled(self.toggle(channel)),
            None => {
                debug!("[TOUCH-SWITCH] Ignoring {:?}", command);
                PollOutcome::Ignored(command)
            }
        }
    }

    /// Toggle by raw switch number; `None` outside 1..=8
    pub fn toggle_switch(&mut self, switch_number: u8) -> Option<ToggleReport> {
        Channel::new(switch_number).map(|channel| self.toggle(channel))
    }

    /// Toggle a channel and carry out every consequence
    ///
    /// Order: state change, status frames (forced-off channels ascending, then
    /// the addressed channel), host effect and power, one direct-change notice.
    pub fn toggle(&mut self, channel: Channel) -> ToggleReport {
        let outcome = self.switches.toggle(channel, self.options.mutual_exclusion);
        info!(
            "[TOUCH-SWITCH] Switch {} {}",
            channel,
            if outcome.now_on { "ON" } else { "OFF" }
        );
        for forced in &outcome.forced_off {
            debug!("[TOUCH-SWITCH] Switch {} forced OFF", forced);
        }

        let mut frames_sent = Vec::new();
        let mut frames_failed = 0;
        if self.options.notify_panel {
            for (changed, on) in outcome.changes() {
                match self.writer.notify(&mut self.serial, changed, on) {
                    Ok(frame) => {
                        // One frame per changed channel, at most SWITCH_COUNT
                        let _ = frames_sent.push(frame);
                    }
                    Err(_) => frames_failed += 1,
                }
            }
        }
        if frames_failed > 0 {
            warn!(
                "[TOUCH-SWITCH] {} status frame(s) for switch {} not delivered",
                frames_failed, channel
            );
        }

        let effect_id = if outcome.now_on {
            let effect_id = self.effects.effect_for(channel);
            self.host.set_active_effect(effect_id);
            self.host.set_power_level(self.options.on_power_level);
            Some(effect_id)
        } else {
            self.host.set_power_level(0);
            None
        };
        self.host.notify_direct_change();

        ToggleReport {
            channel,
            now_on: outcome.now_on,
            forced_off: outcome.forced_off,
            frames_sent,
            frames_failed,
            effect_id,
        }
    }

    fn effect_label(&self, effect_id: u8) -> String {
        self.host
            .effect_name(effect_id)
            .unwrap_or_else(|| format!("Effect {}", effect_id))
    }

    /// Status section as JSON: `{"SerialTouchSwitch": {"Switch 1": ..., ...}}`
    pub fn status_json(&self) -> Value {
        let mut root = Map::new();
        self.add_to_info(&mut root);
        Value::Object(root)
    }
}

impl<S: TimedRead, H: LightHost> HostModule for SerialTouchSwitch<S, H> {
    fn id(&self) -> u16 {
        MODULE_ID
    }

    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn poll(&mut self) -> PollOutcome {
        match self.serial.available() {
            Ok(false) => return PollOutcome::Idle,
            Ok(true) => {}
            Err(e) => {
                warn!("[TOUCH-SWITCH] Link check failed: {:?}", e);
                return PollOutcome::Dropped(DropReason::Transport);
            }
        }

        match self.reader.read_frame(&mut self.serial) {
            Ok(frame) => self.handle_frame(&frame),
            Err(e) => {
                match &e {
                    ReadError::Desync(_) => trace!("[TOUCH-SWITCH] {}", e),
                    ReadError::Transport(_) => warn!("[TOUCH-SWITCH] {}", e),
                    _ => debug!("[TOUCH-SWITCH] Frame dropped: {}", e),
                }
                PollOutcome::Dropped(DropReason::from(&e))
            }
        }
    }

    fn export_config(&self) -> EffectAssignments {
        self.effects
    }

    fn import_config(&mut self, effects: Option<&Value>) -> Result<(), ImportError> {
        self.effects.import(effects)?;
        debug!(
            "[TOUCH-SWITCH] Effect assignments loaded: {:?}",
            self.effects.as_array()
        );
        Ok(())
    }

    fn status(&self) -> BTreeMap<String, String> {
        self.effects
            .iter()
            .map(|(channel, effect_id)| {
                (format!("Switch {}", channel), self.effect_label(effect_id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};
    use serde_json::json;
    use touchswitch_hal::MemorySerial;

    fn ch(number: u8) -> Channel {
        Channel::new(number).unwrap()
    }

    fn press(number: u8) -> [u8; 5] {
        [0x7B, 0x03, 0x04, number, 0x01]
    }

    fn module() -> SerialTouchSwitch<MemorySerial, RecordingHost> {
        SerialTouchSwitch::new(MemorySerial::new(), RecordingHost::new())
    }

    #[test]
    fn test_idle_when_nothing_pending() {
        let mut module = module();
        assert_eq!(module.poll(), PollOutcome::Idle);
        assert!(module.host().calls().is_empty());
    }

    #[test]
    fn test_press_turns_channel_on() {
        let mut module = module();
        module.transport_mut().push_rx(&press(3));

        let PollOutcome::Toggled(report) = module.poll() else {
            panic!("expected a toggle");
        };
        assert!(report.now_on);
        assert_eq!(report.effect_id, Some(45));
        assert!(module.is_on(ch(3)));
        assert_eq!(
            module.host().calls(),
            &[
                HostCall::SetActiveEffect(45),
                HostCall::SetPowerLevel(128),
                HostCall::NotifyDirectChange
            ]
        );
        assert_eq!(
            module.transport().tx(),
            &[0x7B, 0x04, 0x00, 0x05, 0x03, 0x01, 0x09]
        );
    }

    #[test]
    fn test_second_press_turns_channel_off() {
        let mut module = module();
        module.transport_mut().push_rx(&press(3));
        module.transport_mut().push_rx(&press(3));
        module.poll();
        module.host_mut().take_calls();
        module.transport_mut().take_tx();

        let PollOutcome::Toggled(report) = module.poll() else {
            panic!("expected a toggle");
        };
        assert!(!report.now_on);
        assert_eq!(report.effect_id, None);
        assert_eq!(
            module.host().calls(),
            &[HostCall::SetPowerLevel(0), HostCall::NotifyDirectChange]
        );
        assert_eq!(
            module.transport().tx(),
            &[0x7B, 0x04, 0x01, 0x05, 0x03, 0x00, 0x09]
        );
    }

    #[test]
    fn test_exclusive_switch_over_reports_forced_off_first() {
        let mut module = module();
        module.toggle(ch(2));
        module.transport_mut().take_tx();

        let report = module.toggle(ch(6));
        assert_eq!(report.forced_off.as_slice(), &[ch(2)]);
        let frames: std::vec::Vec<(u8, bool)> = report
            .frames_sent
            .iter()
            .map(|frame| (frame.channel.number(), frame.on))
            .collect();
        assert_eq!(frames, vec![(2, false), (6, true)]);
        assert_eq!(module.switches().on_count(), 1);
        assert_eq!(module.next_sequence(), 3);
    }

    #[test]
    fn test_simple_mode() {
        let mut module = SerialTouchSwitch::with_options(
            MemorySerial::new(),
            RecordingHost::new(),
            ReaderOptions::default(),
            SwitchOptions::simple(),
            EffectAssignments::factory(),
        );
        module.toggle(ch(1));
        module.toggle(ch(2));
        assert!(module.is_on(ch(1)) && module.is_on(ch(2)));
        assert!(module.transport().tx().is_empty());
        assert_eq!(module.host().direct_changes(), 2);
    }

    #[test]
    fn test_ignored_frames() {
        let mut module = module();
        module
            .transport_mut()
            .push_rx(&[0x7B, 0x03, 0x04, 0x03, 0x00, 0x7B, 0x03, 0x04, 0x09, 0x01]);
        assert!(matches!(module.poll(), PollOutcome::Ignored(Command::SwitchEvent { .. })));
        assert!(matches!(
            module.poll(),
            PollOutcome::Ignored(Command::InvalidChannel { switch_number: 9, .. })
        ));
        assert!(module.host().calls().is_empty());
        assert_eq!(module.switches().on_count(), 0);
    }

    #[test]
    fn test_desync_then_recover() {
        let mut module = module();
        module.transport_mut().push_rx(&[0x00]);
        module.transport_mut().push_rx(&press(1));
        assert_eq!(
            module.poll(),
            PollOutcome::Dropped(DropReason::Desync { byte: 0x00 })
        );
        assert!(matches!(module.poll(), PollOutcome::Toggled(_)));
    }

    #[test]
    fn test_closed_link_is_a_transport_drop() {
        let mut module = module();
        module.transport_mut().close();
        assert_eq!(module.poll(), PollOutcome::Dropped(DropReason::Transport));
    }

    #[test]
    fn test_undelivered_status_still_updates_host() {
        let mut module = module();
        module.transport_mut().close();
        let report = module.toggle(ch(4));
        assert!(report.now_on);
        assert_eq!(report.frames_failed, 1);
        assert!(report.frames_sent.is_empty());
        assert_eq!(module.host().direct_changes(), 1);
    }

    #[test]
    fn test_toggle_switch_range() {
        let mut module = module();
        assert!(module.toggle_switch(0).is_none());
        assert!(module.toggle_switch(9).is_none());
        assert!(module.toggle_switch(8).is_some());
    }

    #[test]
    fn test_config_round_trip() {
        let mut module = module();
        let mut root = Map::new();
        module.add_to_config(&mut root);
        assert_eq!(
            Value::Object(root.clone()),
            json!({"switchEffects": [8, 2, 45, 11, 3, 13, 23, 2]})
        );

        module
            .read_from_config(&json!({"switchEffects": [1, 1, 1, 1, 2, 2, 2, 2]}))
            .unwrap();
        assert_eq!(module.export_config().as_array(), [1, 1, 1, 1, 2, 2, 2, 2]);

        assert_eq!(
            module.read_from_config(&json!({"other": 1})),
            Err(ImportError::Missing)
        );
        assert_eq!(module.export_config(), EffectAssignments::zeroed());
    }

    #[test]
    fn test_import_does_not_touch_states() {
        let mut module = module();
        module.toggle(ch(5));
        let _ = module.import_config(Some(&json!("bad")));
        assert!(module.is_on(ch(5)));
    }

    #[test]
    fn test_status_names() {
        let named = SerialTouchSwitch::new(MemorySerial::new(), RecordingHost::with_classic_names());
        let status = named.status();
        assert_eq!(status.len(), 8);
        assert_eq!(status["Switch 1"], "Rainbow");
        assert_eq!(status["Switch 3"], "Fire Flicker");

        let unnamed = module().status_json();
        assert_eq!(unnamed["SerialTouchSwitch"]["Switch 2"], json!("Effect 2"));
    }

    #[test]
    fn test_identity() {
        let module = module();
        assert_eq!(module.id(), MODULE_ID);
        assert_eq!(module.name(), "SerialTouchSwitch");
    }
}
