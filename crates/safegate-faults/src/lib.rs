//! # safegate-faults
//!
//! Fault classification and glitch filtering for the Safegate safety core.
//!
//! Peripheral channel drivers report raw detections (device id, fault code,
//! faulty value) into this crate. Classification turns a detection into a
//! canonical [`FaultRecord`] tagged with one of four [`FaultClass`]es; the
//! [`GlitchFilter`] debounces the temporary classes so that a transient
//! condition which clears itself within the configured settle time is never
//! surfaced to the application.
//!
//! ## Safety Guarantees
//!
//! - **No heap allocations**: the filter table is a bounded `heapless::Vec`
//! - **No blocking operations**: every call completes in bounded time
//! - **Fail safe by default**: unknown fault codes classify as
//!   persistent-fatal
//!
//! ## Fault taxonomy
//!
//! ```text
//!                 Fatal                NonFatal
//! Persistent   forwarded at once    forwarded at once
//! Temporary    debounced, promoted  debounced, promoted
//!              to PersistentFatal   to PersistentNonFatal
//! ```
//!
//! ## Example
//!
//! ```rust
//! use safegate_faults::{classify, codes, FaultClass, GlitchFilter};
//!
//! let mut filter = GlitchFilter::new(30_000); // 30ms settle time
//!
//! // A persistent-fatal detection bypasses the filter entirely.
//! let record = classify(codes::VMON_SUPPLY_SHORT, codes::DEVICE_UBAT, 17_950, 0);
//! assert_eq!(record.class, FaultClass::PersistentFatal);
//! assert!(filter.report(record, 0).expect("table has room").is_some());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    missing_docs,
    missing_debug_implementations
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod codes;
mod error;
mod faults;
mod filter;

pub mod prelude;

pub use codes::classify;
pub use error::{FilterError, FilterResult};
pub use faults::{FaultClass, FaultRecord};
pub use filter::{GlitchFilter, SlotState};
