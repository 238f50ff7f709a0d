//! Error types for watchdog configuration and coordination.

use core::fmt;

/// Errors that can occur while configuring the watchdog coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogError {
    /// The command period is outside 1000..=50000 microseconds.
    InvalidPeriod {
        /// Rejected period in microseconds.
        period_us: u32,
    },
    /// The raw window-size code is not one of the six defined values.
    InvalidWindowCode {
        /// Rejected raw code.
        code: u8,
    },
    /// The computed trigger slack is too small to be met reliably.
    ///
    /// Safety configuration is rejected outright; the system never leaves
    /// the disabled state.
    Precision {
        /// Computed slack in microseconds.
        slack_us: u32,
        /// Minimum acceptable slack in microseconds.
        required_us: u32,
    },
}

impl fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchdogError::InvalidPeriod { period_us } => {
                write!(f, "command period {period_us}us outside 1000..=50000us")
            }
            WatchdogError::InvalidWindowCode { code } => {
                write!(f, "window-size code {code} outside 0..=5")
            }
            WatchdogError::Precision {
                slack_us,
                required_us,
            } => {
                write!(
                    f,
                    "trigger slack {slack_us}us below required {required_us}us"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WatchdogError {}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = core::result::Result<T, WatchdogError>;
