//! # safegate-monitor
//!
//! Diagnostic state machine, safety configuration and callback dispatch
//! for the Safegate safety core.
//!
//! This crate ties the lower layers together: fault reports from
//! peripherals run through `safegate-faults` classification and glitch
//! filtering, confirmed faults drive the diagnostic state machine and the
//! application callbacks, and the `safegate-watchdog` coordinator makes
//! one trigger decision per task cycle.
//!
//! ## Architecture
//!
//! - [`monitor`] - The [`SafetyMonitor`] coordination object and fault routing
//! - [`state`] - Diagnostic state machine (`Disabled` through `Safe`)
//! - [`config`] - Safety configuration and the companion reset budget
//! - [`reaction`] - Error-callback reactions and the output shut-off mask
//! - [`callbacks`] - The [`SafetyHandler`] application hook trait
//! - [`reset`] - Reset budget accounting
//! - [`error`] - Monitor-specific error types
//!
//! ## Safety Guarantees
//!
//! - The safe state is terminal: once entered, no sequence of reports,
//!   callbacks or transitions leaves it short of constructing a new monitor
//! - Fatal faults shut all outputs off *before* the notify callback fires
//! - A callback re-entering the core resolves to a single synthesized
//!   fatal fault, never a nested dispatch
//!
//! ## Example
//!
//! ```rust
//! use safegate_monitor::prelude::*;
//! use safegate_watchdog::SimulatedCompanion;
//!
//! let config = SafetyConfig::builder()
//!     .glitch_filter_time_ms(30)
//!     .command_period_us(10_000)
//!     .window_size(WindowSize::Quarter)
//!     .reset_budget(ResetBudget::Disabled)
//!     .build()?;
//! let mut monitor = SafetyMonitor::new(Some(config), SimulatedCompanion::new())?;
//!
//! monitor.enter_init()?;
//! monitor.enter_config()?;
//! monitor.enter_main()?;
//! assert_eq!(monitor.state(), DiagnosticState::Main);
//! # Ok::<(), safegate_monitor::MonitorError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod callbacks;
pub mod config;
pub mod error;
pub mod monitor;
pub mod reaction;
pub mod reset;
pub mod state;

pub mod prelude;

pub use callbacks::SafetyHandler;
pub use config::{ResetBudget, SafetyConfig, SafetyConfigBuilder};
pub use error::{MonitorError, MonitorResult};
pub use monitor::SafetyMonitor;
pub use reaction::{Reaction, ShutoffMask};
pub use reset::{Decision, ResetBudgetManager};
pub use state::DiagnosticState;
