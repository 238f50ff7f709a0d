//! # safegate-watchdog
//!
//! Companion watchdog coordination for the Safegate safety core.
//!
//! A companion watchdog processor independently verifies that the main
//! processor is alive and well-behaved. The main side must issue exactly one
//! trigger per command period, landing inside a configured tolerance window
//! around the period midpoint; the companion does the same in the opposite
//! direction. This crate computes the window from the configured period and
//! window-size code, drives the trigger decision once per task cycle, and
//! detects both directions of timing violation.
//!
//! ## Safety Guarantees
//!
//! - **No heap allocations** after initialization
//! - **No blocking operations**: the coordinator never waits for the
//!   companion; it is polled once per cycle
//! - **Deterministic execution** with bounded work per cycle
//!
//! ## Window model
//!
//! ```text
//! period n                              period n+1
//! |────────────────┬───────────────────|──────────
//!                midpoint
//!          [ mid−slack , mid+slack ]   ← trigger must land here
//! ```
//!
//! The configured window-size code selects a nominal fraction of the command
//! period; the effective window is distorted by the companion's internal
//! timing (see [`WindowSize::actual_percent`]). Configurations whose absolute
//! slack would fall below 700µs are rejected outright.
//!
//! ## Example
//!
//! ```rust
//! use safegate_watchdog::prelude::*;
//!
//! let window = TriggerWindow::compute(10_000, WindowSize::Quarter)
//!     .expect("25% of 10ms leaves enough slack");
//! let mut coordinator = WatchdogCoordinator::new(window, SimulatedCompanion::new());
//!
//! // Midpoint of the first period: the trigger fires.
//! assert_eq!(coordinator.run_cycle(0, false), CycleOutcome::Idle);
//! assert_eq!(coordinator.run_cycle(5_000, false), CycleOutcome::Triggered);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    missing_docs,
    missing_debug_implementations
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod coordinator;
mod error;
mod link;
mod sim;
mod window;

pub mod prelude;

pub use coordinator::{CycleOutcome, TriggerStats, WatchdogCoordinator, WatchdogFault};
pub use error::{WatchdogError, WatchdogResult};
pub use link::{CompanionState, CompanionStateCell, TriggerPhase, WatchdogLink};
pub use sim::SimulatedCompanion;
pub use window::{TriggerWindow, WindowSize, MIN_SLACK_US};
