//! Error-callback reactions and the output shut-off mask.
//!
//! A non-fatal fault is negotiated with the application: the error callback
//! returns a [`Reaction`] bitmask telling the monitor which output groups or
//! individual outputs to disable, or to enter the safe state outright. The
//! mask is validated at the boundary; a reaction the monitor cannot make
//! sense of is treated as a request for the safe state.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Action bitmask returned by the error callback.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Reaction: u16 {
        /// Acknowledge the fault, change nothing. Exclusive.
        const NO_ACTION = 0x0001;
        /// Enter the safe state. Exclusive.
        const SAFESTATE = 0x0002;
        /// Disable output group 0.
        const DISABLE_GROUP0 = 0x0004;
        /// Disable output group 1.
        const DISABLE_GROUP1 = 0x0008;
        /// Disable output group 2.
        const DISABLE_GROUP2 = 0x0010;
        /// Disable output 0.
        const DISABLE_OUTPUT0 = 0x0020;
        /// Disable output 1.
        const DISABLE_OUTPUT1 = 0x0040;
        /// Disable output 2.
        const DISABLE_OUTPUT2 = 0x0080;
        /// Disable output 3.
        const DISABLE_OUTPUT3 = 0x0100;
        /// Disable output 4.
        const DISABLE_OUTPUT4 = 0x0200;
        /// Disable output 5.
        const DISABLE_OUTPUT5 = 0x0400;
        /// Disable output 6.
        const DISABLE_OUTPUT6 = 0x0800;
        /// Disable output 7.
        const DISABLE_OUTPUT7 = 0x1000;
    }
}

impl Reaction {
    /// The flag disabling individual output `n` (0..=7).
    #[must_use]
    pub fn disable_output(n: u8) -> Option<Self> {
        if n < 8 {
            Self::from_bits(Self::DISABLE_OUTPUT0.bits() << n)
        } else {
            None
        }
    }

    /// The flag disabling output group `n` (0..=2).
    #[must_use]
    pub fn disable_group(n: u8) -> Option<Self> {
        if n < 3 {
            Self::from_bits(Self::DISABLE_GROUP0.bits() << n)
        } else {
            None
        }
    }

    /// Whether the mask is well-formed.
    ///
    /// `NO_ACTION` and `SAFESTATE` are exclusive: each must stand alone.
    /// Any combination of group and output disable bits is valid. An empty
    /// mask and unknown bits are invalid.
    #[must_use]
    pub fn is_valid(self) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.contains(Self::NO_ACTION) {
            return self == Self::NO_ACTION;
        }
        if self.contains(Self::SAFESTATE) {
            return self == Self::SAFESTATE;
        }
        true
    }

    /// Whether the mask requests the safe state.
    #[must_use]
    pub fn requests_safestate(self) -> bool {
        self.contains(Self::SAFESTATE)
    }
}

/// Output shut-off state, mutated only by the monitor.
///
/// Peripherals consume this mask after each cycle and gate their outputs
/// accordingly. Bits only ever get set during a run; entering the safe
/// state forces everything off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShutoffMask {
    groups: u8,
    outputs: u8,
}

impl ShutoffMask {
    /// All three group bits.
    const ALL_GROUPS: u8 = 0b0000_0111;

    /// Mask with everything enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask with every group and output disabled.
    #[must_use]
    pub fn all_off() -> Self {
        Self {
            groups: Self::ALL_GROUPS,
            outputs: 0xff,
        }
    }

    /// Whether output group `n` is disabled.
    #[must_use]
    pub fn is_group_disabled(&self, n: u8) -> bool {
        n < 3 && self.groups & (1 << n) != 0
    }

    /// Whether individual output `n` is disabled.
    #[must_use]
    pub fn is_output_disabled(&self, n: u8) -> bool {
        n < 8 && self.outputs & (1 << n) != 0
    }

    /// Whether every group and output is disabled.
    #[must_use]
    pub fn all_disabled(&self) -> bool {
        self.groups == Self::ALL_GROUPS && self.outputs == 0xff
    }

    /// Apply the disable bits of a validated reaction.
    ///
    /// Group bits sit at 0x0004..0x0010 and output bits at 0x0020..0x1000,
    /// so both unpack with a shift and mask.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn apply(&mut self, reaction: Reaction) {
        self.groups |= ((reaction.bits() >> 2) & u16::from(Self::ALL_GROUPS)) as u8;
        self.outputs |= ((reaction.bits() >> 5) & 0xff) as u8;
    }

    pub(crate) fn force_all_off(&mut self) {
        *self = Self::all_off();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_bits_reject_combination() {
        assert!(Reaction::NO_ACTION.is_valid());
        assert!(Reaction::SAFESTATE.is_valid());
        assert!(!(Reaction::NO_ACTION | Reaction::SAFESTATE).is_valid());
        assert!(!(Reaction::NO_ACTION | Reaction::DISABLE_GROUP0).is_valid());
        assert!(!(Reaction::SAFESTATE | Reaction::DISABLE_OUTPUT3).is_valid());
    }

    #[test]
    fn test_disable_combinations_are_valid() {
        let mask = Reaction::DISABLE_GROUP0 | Reaction::DISABLE_GROUP2 | Reaction::DISABLE_OUTPUT5;
        assert!(mask.is_valid());
        assert!(!mask.requests_safestate());
    }

    #[test]
    fn test_empty_and_unknown_bits_are_invalid() {
        assert!(!Reaction::empty().is_valid());
        assert_eq!(Reaction::from_bits(0x2000), None);
        assert_eq!(Reaction::from_bits(0x8000), None);
    }

    #[test]
    fn test_output_flag_positions() {
        assert_eq!(
            Reaction::disable_output(0),
            Some(Reaction::DISABLE_OUTPUT0)
        );
        assert_eq!(
            Reaction::disable_output(7),
            Some(Reaction::DISABLE_OUTPUT7)
        );
        assert_eq!(Reaction::disable_output(8), None);
        assert_eq!(Reaction::disable_group(2), Some(Reaction::DISABLE_GROUP2));
        assert_eq!(Reaction::disable_group(3), None);
    }

    #[test]
    fn test_shutoff_apply_accumulates() {
        let mut mask = ShutoffMask::new();
        assert!(!mask.is_group_disabled(1));

        mask.apply(Reaction::DISABLE_GROUP1 | Reaction::DISABLE_OUTPUT2);
        assert!(mask.is_group_disabled(1));
        assert!(mask.is_output_disabled(2));
        assert!(!mask.is_group_disabled(0));

        mask.apply(Reaction::DISABLE_GROUP0);
        assert!(mask.is_group_disabled(0));
        assert!(mask.is_group_disabled(1));
    }

    #[test]
    fn test_force_all_off() {
        let mut mask = ShutoffMask::new();
        assert!(!mask.all_disabled());
        mask.force_all_off();
        assert!(mask.all_disabled());
        for n in 0..3 {
            assert!(mask.is_group_disabled(n));
        }
        for n in 0..8 {
            assert!(mask.is_output_disabled(n));
        }
    }
}
