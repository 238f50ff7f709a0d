//! Error types for fault classification and filtering.

use core::fmt;

/// Errors that can occur while filtering fault reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    /// The per-device filter table is full.
    ///
    /// The caller must treat this as fatal: a detection that cannot be
    /// tracked cannot be debounced safely.
    TableFull {
        /// Device id whose report could not be tracked.
        device: u16,
    },
    /// The configured settle time is outside 1..=180 milliseconds.
    InvalidSettleTime {
        /// Rejected value in milliseconds.
        millis: u32,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::TableFull { device } => {
                write!(f, "filter table full, cannot track device {device:#06x}")
            }
            FilterError::InvalidSettleTime { millis } => {
                write!(f, "settle time {millis}ms outside 1..=180ms")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FilterError {}

/// A specialized `Result` type for filter operations.
pub type FilterResult<T> = core::result::Result<T, FilterError>;
