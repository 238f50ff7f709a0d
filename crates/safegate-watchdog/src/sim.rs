//! Simulated companion for hardware-free environments and tests.

use crate::link::{CompanionState, TriggerPhase, WatchdogLink};

/// In-memory companion watchdog.
///
/// Records trigger pulses and serves a scripted companion state. Used by the
/// coordinator tests and by integration environments without the physical
/// companion processor.
#[derive(Debug)]
pub struct SimulatedCompanion {
    state: CompanionState,
    poll_failures: u32,
    trigger_count: u32,
    last_phase: Option<TriggerPhase>,
}

impl SimulatedCompanion {
    /// Create a companion reporting [`CompanionState::Standby`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CompanionState::Standby,
            poll_failures: 0,
            trigger_count: 0,
            last_phase: None,
        }
    }

    /// Script the state the companion reports on the next polls.
    pub fn set_state(&mut self, state: CompanionState) {
        self.state = state;
    }

    /// Make the next `count` polls fail (report `Unknown`).
    pub fn fail_next_polls(&mut self, count: u32) {
        self.poll_failures = count;
    }

    /// Number of trigger pulses received.
    #[must_use]
    pub fn trigger_count(&self) -> u32 {
        self.trigger_count
    }

    /// Phase of the last received trigger.
    #[must_use]
    pub fn last_phase(&self) -> Option<TriggerPhase> {
        self.last_phase
    }
}

impl Default for SimulatedCompanion {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchdogLink for SimulatedCompanion {
    fn send_trigger(&mut self, phase: TriggerPhase) {
        self.trigger_count = self.trigger_count.saturating_add(1);
        self.last_phase = Some(phase);
    }

    fn poll_companion_state(&mut self) -> CompanionState {
        if self.poll_failures > 0 {
            self.poll_failures -= 1;
            return CompanionState::Unknown;
        }
        self.state
    }
}
