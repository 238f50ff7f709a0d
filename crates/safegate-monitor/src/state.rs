//! Diagnostic state of the safety core.
//!
//! The state only ever moves forward through the start-up sequence
//! (`Disabled -> Init -> Config -> Main`); any state may drop to `Safe`,
//! and `Safe` is terminal for the run. Leaving `Safe` requires tearing the
//! monitor down and constructing a new one.

use serde::{Deserialize, Serialize};

/// Global diagnostic state of the safety core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiagnosticState {
    /// Power-on value, no safety checking configured yet.
    Disabled = 0,
    /// Self-tests and peripheral bring-up.
    Init = 1,
    /// Safety configuration consumed, watchdog window computed.
    Config = 2,
    /// Normal cyclic operation.
    Main = 3,
    /// All outputs shut off. Terminal.
    Safe = 4,
}

impl DiagnosticState {
    /// Convert a raw state code to a diagnostic state.
    #[must_use]
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Init),
            2 => Some(Self::Config),
            3 => Some(Self::Main),
            4 => Some(Self::Safe),
            _ => None,
        }
    }

    /// Raw state code.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Human-readable state name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Init => "Init",
            Self::Config => "Config",
            Self::Main => "Main",
            Self::Safe => "Safe",
        }
    }

    /// Whether a transition from `self` to `target` is permitted.
    ///
    /// The start-up sequence advances one step at a time; `Safe` is
    /// reachable from every state and never left.
    #[must_use]
    pub fn can_advance_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Safe, _) => false,
            (_, Self::Safe) => true,
            (Self::Disabled, Self::Init)
            | (Self::Init, Self::Config)
            | (Self::Config, Self::Main) => true,
            _ => false,
        }
    }

    /// Whether this state is terminal.
    #[must_use]
    pub fn is_safe(self) -> bool {
        self == Self::Safe
    }
}

impl std::fmt::Display for DiagnosticState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        for raw in 0..=4 {
            let state = DiagnosticState::from_raw(raw).expect("Codes 0..=4 are valid");
            assert_eq!(state.to_raw(), raw);
        }
        assert_eq!(DiagnosticState::from_raw(5), None);
        assert_eq!(DiagnosticState::from_raw(0xff), None);
    }

    #[test]
    fn test_forward_only_progression() {
        use DiagnosticState::{Config, Disabled, Init, Main};

        assert!(Disabled.can_advance_to(Init));
        assert!(Init.can_advance_to(Config));
        assert!(Config.can_advance_to(Main));

        // No skipping and no regression.
        assert!(!Disabled.can_advance_to(Config));
        assert!(!Disabled.can_advance_to(Main));
        assert!(!Init.can_advance_to(Main));
        assert!(!Main.can_advance_to(Config));
        assert!(!Main.can_advance_to(Init));
        assert!(!Config.can_advance_to(Init));
    }

    #[test]
    fn test_safe_reachable_from_everywhere_and_terminal() {
        use DiagnosticState::{Config, Disabled, Init, Main, Safe};

        for state in [Disabled, Init, Config, Main] {
            assert!(state.can_advance_to(Safe), "{state} must reach Safe");
        }
        for target in [Disabled, Init, Config, Main, Safe] {
            assert!(!Safe.can_advance_to(target), "Safe must not leave to {target}");
        }
    }
}
