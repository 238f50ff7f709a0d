//! Prelude for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use safegate_faults::prelude::*;
//! ```

pub use crate::{
    classify, codes, FaultClass, FaultRecord, FilterError, FilterResult, GlitchFilter, SlotState,
};
