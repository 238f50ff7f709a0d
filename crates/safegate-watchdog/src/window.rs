//! Trigger window sizes and the window computation.

use crate::error::{WatchdogError, WatchdogResult};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum acceptable absolute trigger slack in microseconds.
///
/// Below this the main side cannot reliably land a trigger inside the
/// window; configuration is rejected at initialization time. The boundary is
/// inclusive: exactly 700µs passes.
pub const MIN_SLACK_US: u32 = 700;

/// Configured window size as a fraction of the command period.
///
/// The raw codes are fixed by the companion's register interface and must
/// not change. The *effective* window differs from the nominal fraction
/// because of the companion's internal timing; see [`actual_percent`].
///
/// [`actual_percent`]: WindowSize::actual_percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum WindowSize {
    /// Nominal 100% of the command period (code 0).
    Full = 0,
    /// Nominal 50% (code 1).
    Half = 1,
    /// Nominal 25% (code 2).
    Quarter = 2,
    /// Nominal 12.5% (code 3).
    Eighth = 3,
    /// Nominal 6.25% (code 4).
    Sixteenth = 4,
    /// Nominal 3.125% (code 5).
    ThirtySecond = 5,
}

impl WindowSize {
    /// Convert from a raw window-size code.
    #[must_use]
    pub fn from_raw(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Full),
            1 => Some(Self::Half),
            2 => Some(Self::Quarter),
            3 => Some(Self::Eighth),
            4 => Some(Self::Sixteenth),
            5 => Some(Self::ThirtySecond),
            _ => None,
        }
    }

    /// Convert to the raw window-size code.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Nominal window size as a percentage of the command period.
    #[must_use]
    pub fn nominal_percent(self) -> f64 {
        100.0 / f64::from(1u32 << self.to_raw())
    }

    /// Effective window size after the companion's timing distortion.
    ///
    /// `actual = 200 / (2^(code+1) - 1)`, clamped to 100% for code 0 since a
    /// window cannot exceed its period. This reproduces the documented
    /// table: 100, 66.67, 28.57, 13.33, 6.45, 3.17.
    #[must_use]
    pub fn actual_percent(self) -> f64 {
        let divisor = (1u32 << (self.to_raw() + 1)) - 1;
        let actual = 200.0 / f64::from(divisor);
        actual.min(100.0)
    }

    /// Half of the effective window, the ± tolerance around the midpoint.
    #[must_use]
    pub fn margin_percent(self) -> f64 {
        self.actual_percent() / 2.0
    }

    fn slack_divisor(self) -> u32 {
        match self {
            // 100% effective window: the margin is half the period.
            Self::Full => 2,
            other => (1u32 << (other.to_raw() + 1)) - 1,
        }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% window (code {})", self.nominal_percent(), self.to_raw())
    }
}

/// Computed trigger window for one command period.
///
/// The trigger must land within `period_midpoint ± slack_us`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriggerWindow {
    /// Command period in microseconds.
    pub period_us: u32,
    /// Absolute tolerance around the period midpoint, microseconds.
    pub slack_us: u32,
    /// The window-size code this was computed from.
    pub window_size: WindowSize,
}

impl TriggerWindow {
    /// Compute the trigger window for a command period and window size.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::InvalidPeriod`] for a period outside
    /// 1000..=50000µs and [`WatchdogError::Precision`] if the computed slack
    /// falls below [`MIN_SLACK_US`].
    pub fn compute(period_us: u32, window_size: WindowSize) -> WatchdogResult<Self> {
        if !(1_000..=50_000).contains(&period_us) {
            return Err(WatchdogError::InvalidPeriod { period_us });
        }

        let slack_us = period_us / window_size.slack_divisor();
        if slack_us < MIN_SLACK_US {
            return Err(WatchdogError::Precision {
                slack_us,
                required_us: MIN_SLACK_US,
            });
        }

        Ok(Self {
            period_us,
            slack_us,
            window_size,
        })
    }

    /// Offset of the window opening inside a period, microseconds.
    #[must_use]
    pub fn open_offset_us(&self) -> u32 {
        (self.period_us / 2).saturating_sub(self.slack_us)
    }

    /// Offset of the window closing inside a period, microseconds.
    #[must_use]
    pub fn close_offset_us(&self) -> u32 {
        (self.period_us / 2).saturating_add(self.slack_us)
    }

    /// Whether an offset into a period lands inside the window.
    #[must_use]
    pub fn contains_offset(&self, offset_us: u32) -> bool {
        (self.open_offset_us()..=self.close_offset_us()).contains(&offset_us)
    }
}
