//! Error types for monitor configuration and state transitions.

use thiserror::Error;

use crate::state::DiagnosticState;
use safegate_faults::FilterError;
use safegate_watchdog::WatchdogError;

/// Errors that can occur while configuring or driving the safety monitor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MonitorError {
    /// Glitch filter settle time outside 1..=180 ms.
    #[error("Glitch filter time {millis} ms outside 1..=180 ms")]
    InvalidGlitchTime {
        /// The rejected settle time.
        millis: u32,
    },

    /// Command period outside 1000..=50000 microseconds.
    #[error("Command period {period_us} us outside 1000..=50000 us")]
    InvalidPeriod {
        /// The rejected period.
        period_us: u32,
    },

    /// The trigger window slack fell below the precision floor.
    #[error("Window slack {slack_us} us below the required {required_us} us")]
    WatchdogPrecision {
        /// The computed slack.
        slack_us: u32,
        /// The minimum slack the trigger hardware can resolve.
        required_us: u32,
    },

    /// A diagnostic state transition that is not permitted.
    #[error("Invalid transition {from} -> {to}")]
    InvalidTransition {
        /// State the monitor was in.
        from: DiagnosticState,
        /// State that was requested.
        to: DiagnosticState,
    },

    /// The glitch filter has no free slot for another device.
    #[error("Fault table full, cannot track device {device:#06x}")]
    FaultTableFull {
        /// The device that could not be tracked.
        device: u16,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl MonitorError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create an invalid transition error.
    #[must_use]
    pub fn invalid_transition(from: DiagnosticState, to: DiagnosticState) -> Self {
        Self::InvalidTransition { from, to }
    }
}

impl From<WatchdogError> for MonitorError {
    fn from(err: WatchdogError) -> Self {
        match err {
            WatchdogError::InvalidPeriod { period_us } => Self::InvalidPeriod { period_us },
            WatchdogError::InvalidWindowCode { code } => {
                Self::InvalidConfiguration(format!("window code {code} has no mapping"))
            }
            WatchdogError::Precision {
                slack_us,
                required_us,
            } => Self::WatchdogPrecision {
                slack_us,
                required_us,
            },
        }
    }
}

impl From<FilterError> for MonitorError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::TableFull { device } => Self::FaultTableFull { device },
            FilterError::InvalidSettleTime { millis } => Self::InvalidGlitchTime { millis },
        }
    }
}

/// A specialized `Result` type for monitor operations.
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;
