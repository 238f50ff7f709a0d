//! Fault classes and canonical fault records.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification of a detected fault.
///
/// The class decides how the record travels through the core: persistent
/// classes are forwarded to the diagnostic state machine immediately,
/// temporary classes are held by the glitch filter until they either clear
/// themselves or persist long enough to be promoted to their persistent
/// counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FaultClass {
    /// Permanent condition that forces the safe state unconditionally.
    PersistentFatal = 0,
    /// Permanent condition; the application negotiates the reaction.
    PersistentNonFatal = 1,
    /// Transient condition that becomes `PersistentFatal` if it persists.
    TemporaryFatal = 2,
    /// Transient condition that becomes `PersistentNonFatal` if it persists.
    TemporaryNonFatal = 3,
}

impl FaultClass {
    /// Convert from a raw `u8` value.
    #[must_use]
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::PersistentFatal),
            1 => Some(Self::PersistentNonFatal),
            2 => Some(Self::TemporaryFatal),
            3 => Some(Self::TemporaryNonFatal),
            _ => None,
        }
    }

    /// Convert to a raw `u8` value.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Returns true if this class forces the safe state once it reaches the
    /// diagnostic state machine.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::PersistentFatal | Self::TemporaryFatal)
    }

    /// Returns true if this class is subject to glitch filtering.
    #[must_use]
    pub fn is_temporary(self) -> bool {
        matches!(self, Self::TemporaryFatal | Self::TemporaryNonFatal)
    }

    /// The persistent counterpart of this class.
    ///
    /// Persistent classes map to themselves; this is what the glitch filter
    /// applies on promotion.
    #[must_use]
    pub fn to_persistent(self) -> Self {
        match self {
            Self::TemporaryFatal => Self::PersistentFatal,
            Self::TemporaryNonFatal => Self::PersistentNonFatal,
            other => other,
        }
    }

    /// Get the class as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PersistentFatal => "PersistentFatal",
            Self::PersistentNonFatal => "PersistentNonFatal",
            Self::TemporaryFatal => "TemporaryFatal",
            Self::TemporaryNonFatal => "TemporaryNonFatal",
        }
    }
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical record of a detected fault.
///
/// Created by [`classify`](crate::classify) when a peripheral reports a
/// detection. The record is owned by the glitch filter while a temporary
/// fault is pending and is destroyed on resolution or on safe-state entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaultRecord {
    /// Canonical fault code (see [`codes`](crate::codes)).
    pub code: u16,
    /// Device id of the reporting peripheral channel.
    pub device: u16,
    /// Raw faulty value captured at detection time.
    pub faulty_value: u32,
    /// Fault classification.
    pub class: FaultClass,
    /// Absolute cycle-relative timestamp of first detection, microseconds.
    pub first_seen_us: u64,
}

impl FaultRecord {
    /// Create a record with an explicit class.
    #[must_use]
    pub fn new(code: u16, device: u16, faulty_value: u32, class: FaultClass, now_us: u64) -> Self {
        Self {
            code,
            device,
            faulty_value,
            class,
            first_seen_us: now_us,
        }
    }

    /// Copy of this record reclassified to its persistent counterpart.
    #[must_use]
    pub fn promoted(&self) -> Self {
        Self {
            class: self.class.to_persistent(),
            ..*self
        }
    }

    /// Returns true if this record forces the safe state.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.class.is_fatal()
    }
}

impl fmt::Display for FaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fault {} on device {:#06x} ({}, value {:#010x})",
            self.code, self.device, self.class, self.faulty_value
        )
    }
}
