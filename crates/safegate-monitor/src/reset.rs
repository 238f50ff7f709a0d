//! Companion reset budget accounting.

use crate::config::ResetBudget;

/// Verdict on a fatal fault: may the companion restart the main processor,
/// or does the monitor lock into the safe state for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The companion may reset the main processor.
    AllowReset,
    /// Permanent safe lock. No further resets, ever.
    SafeLock,
}

/// Counts companion resets against the configured budget.
///
/// The lock is sticky: once `SafeLock` has been returned, every later fatal
/// fault yields `SafeLock` again, regardless of the counter. Only
/// constructing a fresh manager (full re-initialization) clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetBudgetManager {
    budget: ResetBudget,
    count: u8,
    locked: bool,
}

impl ResetBudgetManager {
    /// Manager with a fresh counter for the given budget.
    #[must_use]
    pub fn new(budget: ResetBudget) -> Self {
        Self {
            budget,
            count: 0,
            locked: false,
        }
    }

    /// Account for a fatal fault and decide whether a reset is permitted.
    pub fn on_fatal(&mut self) -> Decision {
        if self.locked {
            return Decision::SafeLock;
        }
        self.count = self.count.saturating_add(1);
        match self.budget.limit() {
            Some(limit) if self.count <= limit => Decision::AllowReset,
            _ => {
                self.locked = true;
                Decision::SafeLock
            }
        }
    }

    /// Resets counted so far.
    #[must_use]
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Whether the permanent safe lock has engaged.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
