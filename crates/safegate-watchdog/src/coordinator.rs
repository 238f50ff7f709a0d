//! Per-cycle watchdog trigger coordination.

use crate::link::{CompanionState, CompanionStateCell, TriggerPhase, WatchdogLink};
use crate::window::TriggerWindow;

/// Timing violations detected by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogFault {
    /// The main side missed its own trigger window.
    SelfMonitoring,
    /// The companion failed to trigger within its window.
    ViceVersa,
}

/// Result of one coordination cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing to do this cycle.
    Idle,
    /// A trigger pulse was sent inside the window.
    Triggered,
    /// A timing violation was detected; the caller must route it down the
    /// fatal path.
    Fault(WatchdogFault),
}

/// Counters and timing information for trigger coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerStats {
    /// Total trigger pulses sent.
    pub trigger_count: u64,
    /// Periods in which the window was missed.
    pub missed_count: u64,
    /// Vice-versa violations detected.
    pub vice_versa_count: u64,
    /// Timestamp of the last trigger sent, microseconds.
    pub last_trigger_us: Option<u64>,
    /// Largest observed interval between consecutive triggers, microseconds.
    pub max_trigger_interval_us: u64,
}

impl TriggerStats {
    /// Record a sent trigger.
    pub fn record_trigger(&mut self, now_us: u64) {
        if let Some(last) = self.last_trigger_us {
            let interval = now_us.saturating_sub(last);
            if interval > self.max_trigger_interval_us {
                self.max_trigger_interval_us = interval;
            }
        }
        self.last_trigger_us = Some(now_us);
        self.trigger_count = self.trigger_count.saturating_add(1);
    }

    /// Record a missed window.
    pub fn record_missed(&mut self) {
        self.missed_count = self.missed_count.saturating_add(1);
    }

    /// Record a vice-versa violation.
    pub fn record_vice_versa(&mut self) {
        self.vice_versa_count = self.vice_versa_count.saturating_add(1);
    }
}

/// Drives the trigger protocol against the companion watchdog.
///
/// The coordinator is clocked once per task cycle via [`run_cycle`]; all
/// timing is expressed in absolute cycle-relative microseconds supplied by
/// the caller. Periods are anchored at the first cycle.
///
/// [`run_cycle`]: WatchdogCoordinator::run_cycle
#[derive(Debug)]
pub struct WatchdogCoordinator<L: WatchdogLink> {
    link: L,
    window: TriggerWindow,
    companion: CompanionStateCell,
    anchor_us: Option<u64>,
    period_index: u64,
    triggered: bool,
    excused: bool,
    faulted: bool,
    phase: TriggerPhase,
    companion_seen_us: u64,
    stats: TriggerStats,
}

impl<L: WatchdogLink> WatchdogCoordinator<L> {
    /// Create a coordinator over a computed window and a companion link.
    #[must_use]
    pub fn new(window: TriggerWindow, link: L) -> Self {
        Self {
            link,
            window,
            companion: CompanionStateCell::new(),
            anchor_us: None,
            period_index: 0,
            triggered: false,
            excused: false,
            faulted: false,
            phase: TriggerPhase::Rising,
            companion_seen_us: 0,
            stats: TriggerStats::default(),
        }
    }

    /// The computed trigger window.
    #[must_use]
    pub fn window(&self) -> &TriggerWindow {
        &self.window
    }

    /// Snapshot of the coordination statistics.
    #[must_use]
    pub fn stats(&self) -> TriggerStats {
        self.stats
    }

    /// The last polled companion state.
    ///
    /// [`CompanionState::Unknown`] before the first cycle.
    #[must_use]
    pub fn companion_state(&self) -> CompanionState {
        self.companion.load()
    }

    /// Access the underlying link.
    #[must_use]
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutable access to the underlying link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Record a trigger observed from the companion side.
    ///
    /// Resets the vice-versa silence timer.
    pub fn record_companion_trigger(&mut self, now_us: u64) {
        self.companion_seen_us = now_us;
    }

    /// Run one coordination cycle.
    ///
    /// `suppress` withholds the trigger for the current period without
    /// raising a self-monitoring fault; it is set by the caller when a fatal
    /// fault was confirmed earlier in the same cycle. Fault classification
    /// and filtering always complete before this runs, so a just-confirmed
    /// fatal can still suppress a trigger that would otherwise fire.
    pub fn run_cycle(&mut self, now_us: u64, suppress: bool) -> CycleOutcome {
        let anchor = match self.anchor_us {
            Some(anchor) => anchor,
            None => {
                self.anchor_us = Some(now_us);
                self.companion_seen_us = now_us;
                now_us
            }
        };

        let state = self.link.poll_companion_state();
        self.companion.store(state);

        let period = u64::from(self.window.period_us);
        let elapsed = now_us.saturating_sub(anchor);
        let index = elapsed / period;

        if index > self.period_index {
            let missed = !self.triggered && !self.excused && !self.faulted;
            self.period_index = index;
            self.triggered = false;
            self.excused = false;
            self.faulted = false;
            if missed {
                self.stats.record_missed();
                return CycleOutcome::Fault(WatchdogFault::SelfMonitoring);
            }
        }

        if suppress {
            self.excused = true;
            return CycleOutcome::Idle;
        }

        // Vice-versa: the companion is held to the same command period.
        let silence = now_us.saturating_sub(self.companion_seen_us);
        if silence > period.saturating_add(u64::from(self.window.slack_us)) {
            self.companion_seen_us = now_us;
            self.stats.record_vice_versa();
            return CycleOutcome::Fault(WatchdogFault::ViceVersa);
        }

        let offset = u32::try_from(elapsed - index * period).unwrap_or(u32::MAX);

        if !self.triggered && self.window.contains_offset(offset) {
            self.link.send_trigger(self.phase);
            self.phase = self.phase.toggled();
            self.triggered = true;
            self.stats.record_trigger(now_us);
            return CycleOutcome::Triggered;
        }

        if !self.triggered && !self.faulted && offset > self.window.close_offset_us() {
            self.faulted = true;
            self.stats.record_missed();
            return CycleOutcome::Fault(WatchdogFault::SelfMonitoring);
        }

        CycleOutcome::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedCompanion;
    use crate::window::WindowSize;

    fn quarter_coordinator() -> WatchdogCoordinator<SimulatedCompanion> {
        let window = TriggerWindow::compute(10_000, WindowSize::Quarter).expect("valid window");
        WatchdogCoordinator::new(window, SimulatedCompanion::new())
    }

    #[test]
    fn test_trigger_inside_window() {
        let mut coordinator = quarter_coordinator();

        assert_eq!(coordinator.run_cycle(0, false), CycleOutcome::Idle);
        assert_eq!(coordinator.run_cycle(5_000, false), CycleOutcome::Triggered);
        assert_eq!(coordinator.link().trigger_count(), 1);
    }

    #[test]
    fn test_one_trigger_per_period() {
        let mut coordinator = quarter_coordinator();

        assert_eq!(coordinator.run_cycle(0, false), CycleOutcome::Idle);
        assert_eq!(coordinator.run_cycle(5_000, false), CycleOutcome::Triggered);
        // Still inside the same period and window: no second pulse.
        assert_eq!(coordinator.run_cycle(6_000, false), CycleOutcome::Idle);

        coordinator.record_companion_trigger(10_000);
        assert_eq!(
            coordinator.run_cycle(15_000, false),
            CycleOutcome::Triggered
        );
        assert_eq!(coordinator.link().trigger_count(), 2);
    }

    #[test]
    fn test_missed_window_is_self_monitoring_fault() {
        let mut coordinator = quarter_coordinator();

        assert_eq!(coordinator.run_cycle(0, false), CycleOutcome::Idle);
        // First cycle after the window closed, never triggered.
        assert_eq!(
            coordinator.run_cycle(7_000, false),
            CycleOutcome::Fault(WatchdogFault::SelfMonitoring)
        );
        // Raised once per period, not every cycle.
        assert_eq!(coordinator.run_cycle(8_000, false), CycleOutcome::Idle);
        assert_eq!(coordinator.stats().missed_count, 1);
    }

    #[test]
    fn test_missed_period_detected_at_rollover() {
        let mut coordinator = quarter_coordinator();

        assert_eq!(coordinator.run_cycle(0, false), CycleOutcome::Idle);
        // The next call is already in period 1; period 0 never triggered.
        assert_eq!(
            coordinator.run_cycle(12_000, false),
            CycleOutcome::Fault(WatchdogFault::SelfMonitoring)
        );
    }

    #[test]
    fn test_suppression_withholds_without_fault() {
        let mut coordinator = quarter_coordinator();

        assert_eq!(coordinator.run_cycle(0, false), CycleOutcome::Idle);
        // Fatal confirmed this cycle: no trigger, no fault.
        assert_eq!(coordinator.run_cycle(5_000, true), CycleOutcome::Idle);
        assert_eq!(coordinator.run_cycle(7_000, true), CycleOutcome::Idle);
        assert_eq!(coordinator.link().trigger_count(), 0);
        assert_eq!(coordinator.stats().missed_count, 0);
    }

    #[test]
    fn test_vice_versa_on_companion_silence() {
        let mut coordinator = quarter_coordinator();

        assert_eq!(coordinator.run_cycle(0, false), CycleOutcome::Idle);
        coordinator.record_companion_trigger(5_000);
        assert_eq!(coordinator.run_cycle(5_000, false), CycleOutcome::Triggered);

        // Companion silent for more than a period plus slack.
        assert_eq!(
            coordinator.run_cycle(16_500, false),
            CycleOutcome::Fault(WatchdogFault::ViceVersa)
        );
        assert_eq!(coordinator.stats().vice_versa_count, 1);
    }

    #[test]
    fn test_phase_alternates() {
        let mut coordinator = quarter_coordinator();

        let _ = coordinator.run_cycle(0, false);
        let _ = coordinator.run_cycle(5_000, false);
        assert_eq!(
            coordinator.link().last_phase(),
            Some(TriggerPhase::Rising)
        );

        coordinator.record_companion_trigger(10_000);
        let _ = coordinator.run_cycle(15_000, false);
        assert_eq!(
            coordinator.link().last_phase(),
            Some(TriggerPhase::Falling)
        );
    }

    #[test]
    fn test_companion_state_follows_poll() {
        let mut coordinator = quarter_coordinator();
        assert_eq!(coordinator.companion_state(), CompanionState::Unknown);

        coordinator.link_mut().set_state(CompanionState::Active);
        let _ = coordinator.run_cycle(0, false);
        assert_eq!(coordinator.companion_state(), CompanionState::Active);
    }
}
