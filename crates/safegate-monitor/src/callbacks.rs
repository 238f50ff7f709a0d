//! Application callbacks for fault negotiation and notification.

use crate::monitor::SafetyMonitor;
use crate::reaction::Reaction;
use crate::state::DiagnosticState;
use safegate_faults::FaultRecord;
use safegate_watchdog::{CompanionState, WatchdogLink};

/// Application hooks invoked by the monitor.
///
/// `on_error` negotiates non-fatal faults: it receives the monitor itself
/// so the application can inspect status, and returns a [`Reaction`]
/// bitmask the monitor then validates and applies. `on_notify` is
/// informational only; when it fires for a fatal fault the safe state is
/// already active and nothing the handler does can veto it.
///
/// Both hooks run synchronously inside the task cycle that confirmed the
/// fault. Calling back into the monitor's fault or cycle entry points from
/// inside a hook is itself a fatal fault (`ERROR_CALLBACK_RECURSION`).
pub trait SafetyHandler<L: WatchdogLink> {
    /// Negotiate a non-fatal fault.
    fn on_error(
        &mut self,
        monitor: &mut SafetyMonitor<L>,
        diag: DiagnosticState,
        companion: CompanionState,
        fault: &FaultRecord,
    ) -> Reaction;

    /// Observe a fatal fault after the safe state is already active.
    ///
    /// `diag` is the state the monitor was in when the fault confirmed,
    /// not the (by now active) safe state.
    fn on_notify(
        &mut self,
        diag: DiagnosticState,
        companion: CompanionState,
        fault: &FaultRecord,
    ) {
        let _ = (diag, companion, fault);
    }
}
