//! Prelude for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use safegate_watchdog::prelude::*;
//! ```

pub use crate::{
    CompanionState, CompanionStateCell, CycleOutcome, SimulatedCompanion, TriggerPhase,
    TriggerStats, TriggerWindow, WatchdogCoordinator, WatchdogError, WatchdogFault, WatchdogLink,
    WatchdogResult, WindowSize, MIN_SLACK_US,
};
