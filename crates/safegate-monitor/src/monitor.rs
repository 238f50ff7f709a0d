//! The safety monitor: diagnostic state machine, fault routing and the
//! cycle-level glue between classifier, glitch filter, watchdog and
//! application callbacks.
//!
//! All core logic runs synchronously inside a fixed-period task cycle with
//! explicit [`begin_cycle`](SafetyMonitor::begin_cycle) /
//! [`end_cycle`](SafetyMonitor::end_cycle) boundaries. Within one cycle,
//! classification and filtering always complete before the trigger decision,
//! so a fatal fault confirmed mid-cycle suppresses the trigger that period.

use crate::callbacks::SafetyHandler;
use crate::config::SafetyConfig;
use crate::error::MonitorResult;
use crate::reaction::{Reaction, ShutoffMask};
use crate::reset::{Decision, ResetBudgetManager};
use crate::state::DiagnosticState;
use safegate_faults::codes::{
    DEVICE_COMPANION, DEVICE_CORE, ERROR_CALLBACK_RECURSION, WD_SELF_MONITORING,
    WD_VICE_VERSA_MONITORING, classify,
};
use safegate_faults::{FaultRecord, GlitchFilter};
use safegate_watchdog::{
    CompanionState, CycleOutcome, TriggerWindow, WatchdogCoordinator, WatchdogFault, WatchdogLink,
};

/// Central coordination object of the safety core.
///
/// Constructed once with the safety configuration and the link to the
/// companion watchdog processor. A `None` configuration disables all
/// checking: every reported fault then forces an unconditional safe
/// transition with no callback negotiation.
pub struct SafetyMonitor<L: WatchdogLink> {
    config: Option<SafetyConfig>,
    state: DiagnosticState,
    filter: GlitchFilter,
    watchdog: Option<WatchdogCoordinator<L>>,
    budget: ResetBudgetManager,
    handler: Option<Box<dyn SafetyHandler<L>>>,
    shutoff: ShutoffMask,
    active_fault: Option<FaultRecord>,
    last_decision: Option<Decision>,
    in_callback: bool,
    fatal_this_cycle: bool,
    now_us: u64,
}

impl<L: WatchdogLink> std::fmt::Debug for SafetyMonitor<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyMonitor")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("budget", &self.budget)
            .field("handler", &self.handler.is_some())
            .field("shutoff", &self.shutoff)
            .field("active_fault", &self.active_fault)
            .field("in_callback", &self.in_callback)
            .finish_non_exhaustive()
    }
}

impl<L: WatchdogLink> SafetyMonitor<L> {
    /// Create a monitor in the `Disabled` state.
    ///
    /// With a configuration present, the trigger window is computed here;
    /// a window whose slack falls below the precision floor rejects the
    /// whole configuration and no monitor is constructed, so the system
    /// never leaves `Disabled`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration ranges are invalid or the
    /// watchdog window cannot be resolved with the required precision.
    pub fn new(config: Option<SafetyConfig>, link: L) -> MonitorResult<Self> {
        let budget = ResetBudgetManager::new(
            config.map_or(crate::config::ResetBudget::Disabled, |cfg| cfg.reset_budget),
        );
        Self::new_after_reset(config, link, budget)
    }

    /// Recreate the monitor after a companion-issued reset, carrying the
    /// reset accounting over.
    ///
    /// The reset counter and the permanent safe lock survive companion
    /// resets; only a full re-initialization through [`new`](Self::new)
    /// starts fresh accounting.
    ///
    /// # Errors
    ///
    /// Same conditions as [`new`](Self::new).
    pub fn new_after_reset(
        config: Option<SafetyConfig>,
        link: L,
        budget: ResetBudgetManager,
    ) -> MonitorResult<Self> {
        let (filter, watchdog) = match &config {
            Some(cfg) => {
                cfg.validate()?;
                let window = TriggerWindow::compute(cfg.command_period_us, cfg.window_size)?;
                let filter = GlitchFilter::from_millis(u32::from(cfg.glitch_filter_time_ms))?;
                (filter, Some(WatchdogCoordinator::new(window, link)))
            }
            None => {
                tracing::warn!("No safety configuration, every fault will force the safe state");
                (GlitchFilter::new(0), None)
            }
        };
        Ok(Self {
            config,
            state: DiagnosticState::Disabled,
            filter,
            watchdog,
            budget,
            handler: None,
            shutoff: ShutoffMask::new(),
            active_fault: None,
            last_decision: None,
            in_callback: false,
            fatal_this_cycle: false,
            now_us: 0,
        })
    }

    /// Register the application callback handler.
    pub fn register_handler(&mut self, handler: Box<dyn SafetyHandler<L>>) {
        self.handler = Some(handler);
    }

    /// Advance `Disabled -> Init`.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor is not in `Disabled`.
    pub fn enter_init(&mut self) -> MonitorResult<()> {
        self.advance(DiagnosticState::Init)
    }

    /// Advance `Init -> Config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor is not in `Init`.
    pub fn enter_config(&mut self) -> MonitorResult<()> {
        self.advance(DiagnosticState::Config)
    }

    /// Advance `Config -> Main`.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor is not in `Config`.
    pub fn enter_main(&mut self) -> MonitorResult<()> {
        self.advance(DiagnosticState::Main)
    }

    /// Open a task cycle at the given cycle-relative time.
    pub fn begin_cycle(&mut self, now_us: u64) {
        if self.guard_reentry() {
            return;
        }
        self.now_us = now_us;
        self.fatal_this_cycle = false;
    }

    /// Close the task cycle: poll the companion and make the trigger
    /// decision for this period.
    ///
    /// A fatal fault confirmed earlier in the same cycle, or an already
    /// active safe state, withholds the trigger. Watchdog timing faults
    /// detected here are routed through the regular fatal path.
    pub fn end_cycle(&mut self, now_us: u64) {
        if self.guard_reentry() {
            return;
        }
        self.now_us = now_us;
        let suppress = self.fatal_this_cycle || self.state.is_safe();
        let Some(watchdog) = self.watchdog.as_mut() else {
            return;
        };
        match watchdog.run_cycle(now_us, suppress) {
            CycleOutcome::Idle | CycleOutcome::Triggered => {}
            CycleOutcome::Fault(WatchdogFault::SelfMonitoring) => {
                let record = classify(WD_SELF_MONITORING, DEVICE_CORE, 0, now_us);
                self.process_fault(record);
            }
            CycleOutcome::Fault(WatchdogFault::ViceVersa) => {
                let record = classify(WD_VICE_VERSA_MONITORING, DEVICE_COMPANION, 0, now_us);
                self.process_fault(record);
            }
        }
    }

    /// Report a peripheral fault detection.
    ///
    /// The code is classified, run through the glitch filter and, once
    /// confirmed, routed down the fatal or non-fatal path. Failures are
    /// absorbed fail-safe; this entry point never rejects a report.
    pub fn report_fault(&mut self, code: u16, device: u16, faulty_value: u32) {
        if self.guard_reentry() {
            return;
        }
        if self.state.is_safe() {
            return;
        }
        let record = classify(code, device, faulty_value, self.now_us);
        if self.config.is_none() {
            self.enter_safe(record);
            return;
        }
        match self.filter.report(record, self.now_us) {
            Ok(Some(confirmed)) => self.process_fault(confirmed),
            Ok(None) => {}
            Err(err) => {
                // Cannot track the fault, so treat the report as confirmed.
                tracing::error!(
                    code = record.code,
                    device = record.device,
                    error = %err,
                    "Glitch filter rejected report, failing safe"
                );
                self.fatal_path(record, true);
            }
        }
    }

    /// Signal that a previously reported fault condition has resolved.
    ///
    /// Drops a pending glitch-filter timer for the device; a confirmed
    /// fault is not retracted.
    pub fn fault_cleared(&mut self, device: u16) {
        if self.guard_reentry() {
            return;
        }
        if self.config.is_none() || self.state.is_safe() {
            return;
        }
        self.filter.fault_cleared(device);
    }

    /// Record a trigger observed from the companion processor.
    pub fn record_companion_trigger(&mut self, now_us: u64) {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.record_companion_trigger(now_us);
        }
    }

    /// Current diagnostic and companion state.
    ///
    /// The companion reads `Unknown` before the first poll or when no
    /// watchdog coordination is configured.
    #[must_use]
    pub fn status(&self) -> (DiagnosticState, CompanionState) {
        (self.state, self.companion_state())
    }

    /// Current diagnostic state.
    #[must_use]
    pub fn state(&self) -> DiagnosticState {
        self.state
    }

    /// Last polled companion state.
    #[must_use]
    pub fn companion_state(&self) -> CompanionState {
        self.watchdog
            .as_ref()
            .map_or(CompanionState::Unknown, WatchdogCoordinator::companion_state)
    }

    /// Current output shut-off mask.
    #[must_use]
    pub fn shutoff(&self) -> ShutoffMask {
        self.shutoff
    }

    /// The fault that drove the most recent state change, if any.
    #[must_use]
    pub fn active_fault(&self) -> Option<&FaultRecord> {
        self.active_fault.as_ref()
    }

    /// Companion resets counted so far.
    #[must_use]
    pub fn reset_count(&self) -> u8 {
        self.budget.count()
    }

    /// Verdict of the most recent fatal fault, if one occurred.
    ///
    /// `AllowReset` tells the embedding that the companion may restart the
    /// main processor; the accounting is then carried into the next run via
    /// [`new_after_reset`](Self::new_after_reset) with
    /// [`budget`](Self::budget).
    #[must_use]
    pub fn last_decision(&self) -> Option<Decision> {
        self.last_decision
    }

    /// Snapshot of the reset accounting, for carry-over across a reset.
    #[must_use]
    pub fn budget(&self) -> ResetBudgetManager {
        self.budget
    }

    /// Whether the permanent safe lock has engaged.
    #[must_use]
    pub fn is_safe_locked(&self) -> bool {
        self.budget.is_locked()
    }

    /// The configuration the monitor runs with, if any.
    #[must_use]
    pub fn config(&self) -> Option<&SafetyConfig> {
        self.config.as_ref()
    }

    /// The companion link, when watchdog coordination is configured.
    #[must_use]
    pub fn link(&self) -> Option<&L> {
        self.watchdog.as_ref().map(WatchdogCoordinator::link)
    }

    /// Mutable access to the companion link.
    pub fn link_mut(&mut self) -> Option<&mut L> {
        self.watchdog.as_mut().map(WatchdogCoordinator::link_mut)
    }

    fn advance(&mut self, target: DiagnosticState) -> MonitorResult<()> {
        if self.in_callback {
            // A state transition requested from inside a callback is a
            // re-entry; the synthesized fault drops us to Safe and the
            // normal validation below rejects the request.
            self.synthesize_recursion();
        }
        if !self.state.can_advance_to(target) {
            return Err(crate::error::MonitorError::invalid_transition(
                self.state, target,
            ));
        }
        tracing::info!(from = %self.state, to = %target, "Diagnostic state advanced");
        self.state = target;
        Ok(())
    }

    /// True when the call arrived from inside a callback. The recursion
    /// fault has then already been routed; the caller must bail out.
    fn guard_reentry(&mut self) -> bool {
        if self.in_callback {
            self.synthesize_recursion();
            return true;
        }
        false
    }

    fn synthesize_recursion(&mut self) {
        tracing::error!("Core entry point re-entered from a callback");
        let record = classify(ERROR_CALLBACK_RECURSION, DEVICE_CORE, 0, self.now_us);
        // No dispatch: another callback invocation is exactly what the
        // guard exists to prevent.
        self.fatal_path(record, false);
    }

    fn process_fault(&mut self, record: FaultRecord) {
        if record.class.is_fatal() {
            self.fatal_path(record, true);
        } else {
            self.nonfatal_path(record);
        }
    }

    /// Fatal route: safe state first, then the reset budget, then the
    /// informational notify. The callback fires after the safe state is
    /// already active and cannot veto it.
    fn fatal_path(&mut self, record: FaultRecord, dispatch: bool) {
        let state_at_fault = self.state;
        let companion = self.companion_state();
        self.enter_safe(record);
        let decision = self.budget.on_fatal();
        self.last_decision = Some(decision);
        if decision == Decision::SafeLock {
            tracing::error!(
                resets = self.budget.count(),
                "Reset budget exhausted, permanent safe lock"
            );
        }
        if dispatch
            && let Some(mut handler) = self.handler.take()
        {
            self.in_callback = true;
            handler.on_notify(state_at_fault, companion, &record);
            self.in_callback = false;
            self.handler = Some(handler);
        }
    }

    /// Non-fatal route: negotiate with the error callback and apply the
    /// validated reaction. No registered handler means unconditional safe.
    fn nonfatal_path(&mut self, record: FaultRecord) {
        let state_at_fault = self.state;
        let companion = self.companion_state();
        tracing::warn!(
            code = record.code,
            device = record.device,
            class = record.class.as_str(),
            "Non-fatal fault confirmed"
        );
        let Some(mut handler) = self.handler.take() else {
            self.enter_safe(record);
            return;
        };
        self.in_callback = true;
        let reaction = handler.on_error(self, state_at_fault, companion, &record);
        self.in_callback = false;
        self.handler = Some(handler);

        if self.state.is_safe() {
            // A recursion fault inside the callback already resolved this.
            return;
        }
        if !reaction.is_valid() {
            tracing::error!(
                bits = reaction.bits(),
                "Invalid reaction from error callback, failing safe"
            );
            self.enter_safe(record);
            return;
        }
        if reaction.requests_safestate() {
            self.enter_safe(record);
            return;
        }
        if reaction != Reaction::NO_ACTION {
            self.shutoff.apply(reaction);
            tracing::warn!(bits = reaction.bits(), "Shut-off reaction applied");
        }
        self.active_fault = Some(record);
    }

    /// Enter the safe state: terminal, all outputs off, fault table purged.
    fn enter_safe(&mut self, record: FaultRecord) {
        if self.state.is_safe() {
            return;
        }
        let from = self.state;
        self.state = DiagnosticState::Safe;
        self.shutoff.force_all_off();
        self.filter.purge();
        self.active_fault = Some(record);
        self.fatal_this_cycle = true;
        tracing::error!(
            from = %from,
            code = record.code,
            device = record.device,
            "Safe state entered, all outputs shut off"
        );
    }
}
