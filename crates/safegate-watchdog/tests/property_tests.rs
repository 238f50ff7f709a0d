//! Property-based tests for trigger coordination invariants.

#![cfg(test)]

use proptest::prelude::*;
use safegate_watchdog::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_at_most_one_trigger_per_period(
        period_us in 5_000u32..=50_000,
        cycles in 10usize..200,
    ) {
        let window = TriggerWindow::compute(period_us, WindowSize::Half)
            .map_err(|_| proptest::test_runner::TestCaseError::fail("50% window always passes"))?;
        let mut coordinator = WatchdogCoordinator::new(window, SimulatedCompanion::new());

        // Clock the coordinator at a 1ms task cycle, feeding companion
        // triggers so vice-versa never interferes.
        let mut triggers_before = 0;
        for i in 0..cycles as u64 {
            let now = i * 1_000;
            coordinator.record_companion_trigger(now);
            let outcome = coordinator.run_cycle(now, false);
            let triggers = coordinator.link().trigger_count();
            if outcome == CycleOutcome::Triggered {
                prop_assert_eq!(triggers, triggers_before + 1);
            } else {
                prop_assert_eq!(triggers, triggers_before);
            }
            triggers_before = triggers;
        }

        // Never more triggers than elapsed periods plus the one in flight.
        let elapsed_periods = (cycles as u64 * 1_000) / u64::from(period_us) + 1;
        prop_assert!(u64::from(triggers_before) <= elapsed_periods);
    }

    #[test]
    fn prop_suppressed_periods_never_fault(
        period_us in 5_000u32..=50_000,
        cycles in 10usize..100,
    ) {
        let window = TriggerWindow::compute(period_us, WindowSize::Half)
            .map_err(|_| proptest::test_runner::TestCaseError::fail("50% window always passes"))?;
        let mut coordinator = WatchdogCoordinator::new(window, SimulatedCompanion::new());

        for i in 0..cycles as u64 {
            let now = i * 1_000;
            coordinator.record_companion_trigger(now);
            let outcome = coordinator.run_cycle(now, true);
            prop_assert_eq!(outcome, CycleOutcome::Idle);
        }

        prop_assert_eq!(coordinator.link().trigger_count(), 0);
        prop_assert_eq!(coordinator.stats().missed_count, 0);
    }

    #[test]
    fn prop_precision_gate_is_exact(
        period_us in 1_000u32..=50_000,
        code in 0u8..6,
    ) {
        let size = WindowSize::from_raw(code)
            .ok_or_else(|| proptest::test_runner::TestCaseError::fail("valid code"))?;
        match TriggerWindow::compute(period_us, size) {
            Ok(window) => prop_assert!(window.slack_us >= MIN_SLACK_US),
            Err(WatchdogError::Precision { slack_us, required_us }) => {
                prop_assert_eq!(required_us, MIN_SLACK_US);
                prop_assert!(slack_us < MIN_SLACK_US);
            }
            Err(other) => {
                return Err(proptest::test_runner::TestCaseError::fail(
                    format!("unexpected error: {other}"),
                ));
            }
        }
    }

    #[test]
    fn prop_window_is_symmetric_about_midpoint(
        period_us in 2_000u32..=50_000,
    ) {
        if let Ok(window) = TriggerWindow::compute(period_us, WindowSize::Quarter) {
            let mid = period_us / 2;
            prop_assert_eq!(mid - window.open_offset_us(), window.slack_us);
            prop_assert_eq!(window.close_offset_us() - mid, window.slack_us);
            prop_assert!(window.contains_offset(mid));
        }
    }
}
