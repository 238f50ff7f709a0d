//! Safety configuration, consumed once at start-up.

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};
use safegate_watchdog::WindowSize;

/// Smallest accepted glitch filter settle time in milliseconds.
pub const MIN_GLITCH_TIME_MS: u8 = 1;
/// Largest accepted glitch filter settle time in milliseconds.
pub const MAX_GLITCH_TIME_MS: u8 = 180;
/// Smallest accepted command period in microseconds.
pub const MIN_COMMAND_PERIOD_US: u32 = 1_000;
/// Largest accepted command period in microseconds.
pub const MAX_COMMAND_PERIOD_US: u32 = 50_000;

/// Number of companion resets tolerated before the monitor locks into the
/// safe state.
///
/// The ten codes mirror the configuration word of the companion processor:
/// `Disabled` never permits a reset, `Resets1`..`Resets9` permit that many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResetBudget {
    /// Every fatal fault locks into the safe state immediately.
    #[default]
    Disabled = 0,
    /// One reset permitted.
    Resets1 = 1,
    /// Two resets permitted.
    Resets2 = 2,
    /// Three resets permitted.
    Resets3 = 3,
    /// Four resets permitted.
    Resets4 = 4,
    /// Five resets permitted.
    Resets5 = 5,
    /// Six resets permitted.
    Resets6 = 6,
    /// Seven resets permitted.
    Resets7 = 7,
    /// Eight resets permitted.
    Resets8 = 8,
    /// Nine resets permitted.
    Resets9 = 9,
}

impl ResetBudget {
    /// Convert a raw configuration code to a reset budget.
    #[must_use]
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Resets1),
            2 => Some(Self::Resets2),
            3 => Some(Self::Resets3),
            4 => Some(Self::Resets4),
            5 => Some(Self::Resets5),
            6 => Some(Self::Resets6),
            7 => Some(Self::Resets7),
            8 => Some(Self::Resets8),
            9 => Some(Self::Resets9),
            _ => None,
        }
    }

    /// Raw configuration code.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Number of resets this budget permits, `None` when resets are
    /// disabled outright.
    #[must_use]
    pub fn limit(self) -> Option<u8> {
        match self {
            Self::Disabled => None,
            other => Some(other as u8),
        }
    }
}

/// Safety configuration for the monitor.
///
/// Supplied once when the monitor is constructed and immutable for the
/// process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Settle time a temporary fault must persist before promotion (ms).
    pub glitch_filter_time_ms: u8,
    /// Watchdog command period (microseconds).
    pub command_period_us: u32,
    /// Trigger window size code.
    pub window_size: WindowSize,
    /// Companion reset budget.
    pub reset_budget: ResetBudget,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            glitch_filter_time_ms: 30,
            command_period_us: 10_000,
            window_size: WindowSize::Quarter,
            reset_budget: ResetBudget::Disabled,
        }
    }
}

impl SafetyConfig {
    /// Validate the configuration ranges.
    ///
    /// The watchdog precision floor is checked separately when the monitor
    /// computes the trigger window.
    ///
    /// # Errors
    ///
    /// Returns an error if the glitch filter time or command period is out
    /// of range.
    pub fn validate(&self) -> MonitorResult<()> {
        if !(MIN_GLITCH_TIME_MS..=MAX_GLITCH_TIME_MS).contains(&self.glitch_filter_time_ms) {
            return Err(MonitorError::InvalidGlitchTime {
                millis: u32::from(self.glitch_filter_time_ms),
            });
        }
        if !(MIN_COMMAND_PERIOD_US..=MAX_COMMAND_PERIOD_US).contains(&self.command_period_us) {
            return Err(MonitorError::InvalidPeriod {
                period_us: self.command_period_us,
            });
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> SafetyConfigBuilder {
        SafetyConfigBuilder::default()
    }
}

/// Builder for `SafetyConfig`.
#[derive(Debug, Default)]
pub struct SafetyConfigBuilder {
    config: SafetyConfig,
}

impl SafetyConfigBuilder {
    /// Set the glitch filter settle time in milliseconds.
    #[must_use]
    pub fn glitch_filter_time_ms(mut self, millis: u8) -> Self {
        self.config.glitch_filter_time_ms = millis;
        self
    }

    /// Set the watchdog command period in microseconds.
    #[must_use]
    pub fn command_period_us(mut self, period_us: u32) -> Self {
        self.config.command_period_us = period_us;
        self
    }

    /// Set the trigger window size.
    #[must_use]
    pub fn window_size(mut self, size: WindowSize) -> Self {
        self.config.window_size = size;
        self
    }

    /// Set the companion reset budget.
    #[must_use]
    pub fn reset_budget(mut self, budget: ResetBudget) -> Self {
        self.config.reset_budget = budget;
        self
    }

    /// Validate and produce the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is out of range.
    pub fn build(self) -> MonitorResult<SafetyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        SafetyConfig::default()
            .validate()
            .expect("Default configuration should validate");
    }

    #[test]
    fn test_glitch_time_range() {
        let too_low = SafetyConfig {
            glitch_filter_time_ms: 0,
            ..SafetyConfig::default()
        };
        assert_eq!(
            too_low.validate(),
            Err(MonitorError::InvalidGlitchTime { millis: 0 })
        );

        let too_high = SafetyConfig {
            glitch_filter_time_ms: 181,
            ..SafetyConfig::default()
        };
        assert_eq!(
            too_high.validate(),
            Err(MonitorError::InvalidGlitchTime { millis: 181 })
        );

        for boundary in [1, 180] {
            let config = SafetyConfig {
                glitch_filter_time_ms: boundary,
                ..SafetyConfig::default()
            };
            config.validate().expect("Boundary values should validate");
        }
    }

    #[test]
    fn test_period_range() {
        for (period_us, ok) in [(999, false), (1_000, true), (50_000, true), (50_001, false)] {
            let config = SafetyConfig {
                command_period_us: period_us,
                ..SafetyConfig::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "period {period_us}");
        }
    }

    #[test]
    fn test_builder_round_trip() {
        let config = SafetyConfig::builder()
            .glitch_filter_time_ms(50)
            .command_period_us(20_000)
            .window_size(WindowSize::Half)
            .reset_budget(ResetBudget::Resets3)
            .build()
            .expect("Valid fields should build");
        assert_eq!(config.glitch_filter_time_ms, 50);
        assert_eq!(config.command_period_us, 20_000);
        assert_eq!(config.window_size, WindowSize::Half);
        assert_eq!(config.reset_budget, ResetBudget::Resets3);
    }

    #[test]
    fn test_builder_rejects_bad_period() {
        let err = SafetyConfig::builder()
            .command_period_us(100)
            .build()
            .expect_err("Out-of-range period should be rejected");
        assert_eq!(err, MonitorError::InvalidPeriod { period_us: 100 });
    }

    #[test]
    fn test_reset_budget_codes() {
        for raw in 0..=9 {
            let budget = ResetBudget::from_raw(raw).expect("Codes 0..=9 are valid");
            assert_eq!(budget.to_raw(), raw);
        }
        assert_eq!(ResetBudget::from_raw(10), None);

        assert_eq!(ResetBudget::Disabled.limit(), None);
        assert_eq!(ResetBudget::Resets1.limit(), Some(1));
        assert_eq!(ResetBudget::Resets9.limit(), Some(9));
    }
}
