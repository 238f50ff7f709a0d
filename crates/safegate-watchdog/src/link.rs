//! The cross-processor link to the companion watchdog.

use core::fmt;
use portable_atomic::{AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Operating state reported by the companion watchdog processor.
///
/// Consumed read-only; the main side never commands companion transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum CompanionState {
    /// Companion is powered but not yet monitoring.
    Standby = 0,
    /// Companion is driving a reset of the main processor.
    Reset = 1,
    /// Companion is running its own self-diagnosis.
    Diagnostic = 2,
    /// Companion is actively monitoring.
    Active = 3,
    /// Companion has latched its own safe state.
    Safe = 4,
    /// State could not be obtained.
    #[default]
    Unknown = 5,
}

impl CompanionState {
    /// Convert from a raw `u8` value.
    #[must_use]
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Standby),
            1 => Some(Self::Reset),
            2 => Some(Self::Diagnostic),
            3 => Some(Self::Active),
            4 => Some(Self::Safe),
            5 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Convert to a raw `u8` value.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Get the state as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standby => "Standby",
            Self::Reset => "Reset",
            Self::Diagnostic => "Diagnostic",
            Self::Active => "Active",
            Self::Safe => "Safe",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CompanionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phase marker carried by a trigger pulse.
///
/// Triggers alternate phases period by period so a stuck line is
/// distinguishable from a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPhase {
    /// Rising edge of the trigger line.
    Rising,
    /// Falling edge of the trigger line.
    Falling,
}

impl TriggerPhase {
    /// The opposite phase.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Rising => Self::Falling,
            Self::Falling => Self::Rising,
        }
    }
}

/// Abstract bus to the companion watchdog processor.
///
/// The real companion is a separate physical core with only indirect
/// observability; coordination logic is written against this trait so it can
/// be exercised against a simulated companion.
pub trait WatchdogLink {
    /// Send one trigger pulse with the given phase.
    fn send_trigger(&mut self, phase: TriggerPhase);

    /// Poll the companion's reported state.
    ///
    /// Must not block; returns [`CompanionState::Unknown`] when the state
    /// cannot currently be obtained.
    fn poll_companion_state(&mut self) -> CompanionState;
}

/// Lock-free cell holding the last polled companion state.
///
/// The coordinator updates it once per cycle; status queries read it without
/// exclusive access.
#[derive(Debug)]
pub struct CompanionStateCell {
    raw: AtomicU8,
}

impl CompanionStateCell {
    /// Create a cell holding [`CompanionState::Unknown`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: AtomicU8::new(CompanionState::Unknown.to_raw()),
        }
    }

    /// Read the stored state.
    #[must_use]
    pub fn load(&self) -> CompanionState {
        CompanionState::from_raw(self.raw.load(Ordering::Acquire))
            .unwrap_or(CompanionState::Unknown)
    }

    /// Store a new state.
    pub fn store(&self, state: CompanionState) {
        self.raw.store(state.to_raw(), Ordering::Release);
    }
}

impl Default for CompanionStateCell {
    fn default() -> Self {
        Self::new()
    }
}
