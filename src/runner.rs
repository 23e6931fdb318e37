// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host-side poll loop
//!
//! Drives a [`HostModule`] the way a lighting host's main loop would: poll
//! until the link runs dry, then sleep for the idle interval.

use touchswitch_hal::TimeProvider;
use touchswitch_protocol::{DropReason, HostModule, PollOutcome};
use tracing::{debug, info};

/// Polls per cycle of [`run`] before `keep_running` is checked again
pub const POLLS_PER_CYCLE: usize = 64;

/// Counters over every poll outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub polls: u64,
    pub idle: u64,
    pub toggles: u64,
    pub ignored: u64,
    pub dropped: u64,
    pub transport_errors: u64,
}

impl PollStats {
    pub fn record(&mut self, outcome: &PollOutcome) {
        self.polls += 1;
        match outcome {
            PollOutcome::Idle => self.idle += 1,
            PollOutcome::Toggled(_) => self.toggles += 1,
            PollOutcome::Ignored(_) => self.ignored += 1,
            PollOutcome::Dropped(DropReason::Transport) => {
                self.dropped += 1;
                self.transport_errors += 1;
            }
            PollOutcome::Dropped(_) => self.dropped += 1,
        }
    }
}

/// Poll until the module reports [`PollOutcome::Idle`] or a transport failure
///
/// `max_polls` bounds the work done in one call. Returns the number of
/// non-idle polls.
pub fn drain<M: HostModule + ?Sized>(module: &mut M, stats: &mut PollStats, max_polls: usize) -> usize {
    let mut busy = 0;
    for _ in 0..max_polls {
        let outcome = module.poll();
        stats.record(&outcome);
        match outcome {
            PollOutcome::Idle | PollOutcome::Dropped(DropReason::Transport) => break,
            _ => busy += 1,
        }
    }
    busy
}

/// Poll loop
///
/// Runs until `keep_running` returns false; it is checked once per cycle, and a
/// cycle is at most [`POLLS_PER_CYCLE`] polls even on a link that never goes quiet.
/// Sleeps `idle_interval_ms` on `clock` whenever a cycle found nothing to do.
pub fn run<M, T, F>(module: &mut M, clock: &T, idle_interval_ms: u32, mut keep_running: F) -> PollStats
where
    M: HostModule + ?Sized,
    T: TimeProvider,
    F: FnMut(&PollStats) -> bool,
{
    info!(
        "[RUNNER] Polling {} (id {}) with {}ms idle interval",
        module.name(),
        module.id(),
        idle_interval_ms
    );
    let mut stats = PollStats::default();
    while keep_running(&stats) {
        if drain(module, &mut stats, POLLS_PER_CYCLE) == 0 {
            clock.delay_ms(idle_interval_ms);
        }
    }
    debug!("[RUNNER] Stopped: {:?}", stats);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use touchswitch_hal::MemorySerial;
    use touchswitch_protocol::{RecordingHost, SerialTouchSwitch};

    /// Records requested sleeps instead of sleeping
    #[derive(Default)]
    struct FakeClock {
        now_us: Cell<u64>,
        sleeps: Cell<u32>,
    }

    impl TimeProvider for FakeClock {
        fn get_time_us(&self) -> u64 {
            self.now_us.get()
        }

        fn delay_us(&self, us: u32) {
            self.sleeps.set(self.sleeps.get() + 1);
            self.now_us.set(self.now_us.get() + u64::from(us));
        }
    }

    #[test]
    fn test_drain_stops_at_idle() {
        let serial = MemorySerial::with_rx(&[0xAA, 0x7B, 0x03, 0x04, 0x01, 0x01]);
        let mut module = SerialTouchSwitch::new(serial, RecordingHost::new());
        let mut stats = PollStats::default();

        assert_eq!(drain(&mut module, &mut stats, 16), 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.toggles, 1);
        assert_eq!(stats.idle, 1);
    }

    #[test]
    fn test_run_sleeps_when_idle() {
        let serial = MemorySerial::with_rx(&[0x7B, 0x03, 0x04, 0x02, 0x01]);
        let mut module = SerialTouchSwitch::new(serial, RecordingHost::new());
        let clock = FakeClock::default();

        let stats = run(&mut module, &clock, 5, |stats| stats.polls < 4);

        assert_eq!(stats.toggles, 1);
        // Cycle 1 toggles then goes idle, cycles 2 and 3 are idle only
        assert_eq!(clock.sleeps.get(), 2);
        assert_eq!(clock.get_time_ms(), 10);
    }

    #[test]
    fn test_stop_request_honoured_on_busy_link() {
        let serial = MemorySerial::with_rx(&[0x00; 200]);
        let mut module = SerialTouchSwitch::new(serial, RecordingHost::new());
        let clock = FakeClock::default();

        let stats = run(&mut module, &clock, 5, |stats| stats.polls == 0);

        assert_eq!(stats.polls, POLLS_PER_CYCLE as u64);
        assert_eq!(stats.dropped, POLLS_PER_CYCLE as u64);
        assert_eq!(module.transport().rx_pending(), 200 - POLLS_PER_CYCLE);
        assert_eq!(clock.sleeps.get(), 0);
    }

    #[test]
    fn test_transport_failure_counts() {
        let mut serial = MemorySerial::new();
        serial.close();
        let mut module = SerialTouchSwitch::new(serial, RecordingHost::new());
        let mut stats = PollStats::default();
        assert_eq!(drain(&mut module, &mut stats, 16), 0);
        assert_eq!(stats.transport_errors, 1);
    }
}
