//! Prelude for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use safegate_monitor::prelude::*;
//! ```

pub use crate::{
    Decision, DiagnosticState, MonitorError, MonitorResult, Reaction, ResetBudget,
    ResetBudgetManager, SafetyConfig, SafetyConfigBuilder, SafetyHandler, SafetyMonitor,
    ShutoffMask,
};

pub use safegate_faults::{FaultClass, FaultRecord};
pub use safegate_watchdog::{CompanionState, WindowSize};
