//! Per-device glitch filter (debounce) for temporary fault classes.
//!
//! A temporary fault is held pending until it has been asserted continuously
//! for the configured settle time, then promoted to its persistent
//! counterpart and forwarded. A fault that clears before the settle time
//! elapses is dropped without ever becoming externally visible.

use crate::error::{FilterError, FilterResult};
use crate::faults::FaultRecord;

/// Maximum number of devices the filter can track concurrently.
pub const MAX_TRACKED_DEVICES: usize = 32;

/// Debounce state of one device.
///
/// ```text
/// Clear ──temporary report──► Pending(deadline)
///   ▲                              │         │
///   │ fault_cleared                │ repeat  │ now >= deadline
///   └──────────────────────────────┘         ▼
///                                        Confirmed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No fault asserted on this device.
    Clear,
    /// A temporary fault is asserted and waiting out the settle time.
    ///
    /// The deadline is measured from first detection and is never refreshed
    /// by repeated reports.
    Pending {
        /// Absolute deadline in microseconds.
        deadline_us: u64,
        /// The record captured at first detection.
        record: FaultRecord,
    },
    /// The fault persisted past the deadline and was forwarded.
    Confirmed,
}

/// Per-device debounce filter.
///
/// Persistent-class records bypass the filter entirely; temporary-class
/// records arm a per-device timer. A device never holds two concurrent
/// timers: repeated reports while pending coalesce into the existing one.
#[derive(Debug)]
pub struct GlitchFilter {
    settle_time_us: u64,
    slots: heapless::Vec<(u16, SlotState), MAX_TRACKED_DEVICES>,
}

impl GlitchFilter {
    /// Create a filter with the given settle time in microseconds.
    #[must_use]
    pub fn new(settle_time_us: u64) -> Self {
        Self {
            settle_time_us,
            slots: heapless::Vec::new(),
        }
    }

    /// Create a filter from a settle time in milliseconds (1..=180).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidSettleTime`] if `millis` is outside the
    /// configurable range.
    pub fn from_millis(millis: u32) -> FilterResult<Self> {
        if !(1..=180).contains(&millis) {
            return Err(FilterError::InvalidSettleTime { millis });
        }
        Ok(Self::new(u64::from(millis) * 1000))
    }

    /// The configured settle time in microseconds.
    #[must_use]
    pub fn settle_time_us(&self) -> u64 {
        self.settle_time_us
    }

    /// Feed one fault report into the filter.
    ///
    /// Returns `Ok(Some(record))` when the record must be forwarded to the
    /// diagnostic state machine: immediately for persistent classes, or on
    /// promotion (reclassified to the persistent counterpart) once a
    /// temporary fault has persisted past its deadline. Returns `Ok(None)`
    /// while a temporary fault is still settling.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::TableFull`] if a new device cannot be tracked;
    /// the caller must treat this as fatal.
    pub fn report(&mut self, record: FaultRecord, now_us: u64) -> FilterResult<Option<FaultRecord>> {
        if !record.class.is_temporary() {
            return Ok(Some(record));
        }

        let deadline_us = now_us.saturating_add(self.settle_time_us);
        match self.slot(record.device) {
            Some(state) => match *state {
                SlotState::Clear => {
                    *state = SlotState::Pending { deadline_us, record };
                    Ok(None)
                }
                SlotState::Pending {
                    deadline_us,
                    record: pending,
                } => {
                    if now_us >= deadline_us {
                        *state = SlotState::Confirmed;
                        Ok(Some(pending.promoted()))
                    } else {
                        // Coalesce: the deadline runs from first detection.
                        Ok(None)
                    }
                }
                SlotState::Confirmed => Ok(None),
            },
            None => {
                self.slots
                    .push((record.device, SlotState::Pending { deadline_us, record }))
                    .map_err(|_| FilterError::TableFull {
                        device: record.device,
                    })?;
                Ok(None)
            }
        }
    }

    /// Signal that the fault on `device` is no longer asserted.
    ///
    /// A pending record is discarded silently; no callback ever fires for a
    /// fault that cleared inside the settle window. The device's slot is
    /// released, so a later recurrence debounces from scratch and cleared
    /// devices never count against the table capacity.
    pub fn fault_cleared(&mut self, device: u16) {
        if let Some(index) = self.slots.iter().position(|(d, _)| *d == device) {
            let _ = self.slots.swap_remove(index);
        }
    }

    /// Current debounce state of a device.
    #[must_use]
    pub fn state_of(&self, device: u16) -> SlotState {
        self.slots
            .iter()
            .find(|(d, _)| *d == device)
            .map_or(SlotState::Clear, |(_, s)| *s)
    }

    /// Number of devices currently holding a pending timer.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|(_, s)| matches!(s, SlotState::Pending { .. }))
            .count()
    }

    /// Destroy all tracked records.
    ///
    /// Invoked on safe-state entry; every pending record is dropped.
    pub fn purge(&mut self) {
        self.slots.clear();
    }

    fn slot(&mut self, device: u16) -> Option<&mut SlotState> {
        self.slots
            .iter_mut()
            .find(|(d, _)| *d == device)
            .map(|(_, s)| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;
    use crate::faults::FaultClass;

    fn temporary(device: u16, now_us: u64) -> FaultRecord {
        crate::classify(codes::PWD_EDGE_TIMEOUT, device, 0, now_us)
    }

    #[test]
    fn test_persistent_bypasses_filter() {
        let mut filter = GlitchFilter::new(30_000);
        let record = crate::classify(codes::VMON_SUPPLY_SHORT, codes::DEVICE_UBAT, 0, 0);

        let out = filter.report(record, 0).expect("table has room");
        assert_eq!(out, Some(record));
        assert_eq!(filter.pending_count(), 0);
    }

    #[test]
    fn test_temporary_held_until_deadline() {
        let mut filter = GlitchFilter::new(30_000);
        let record = temporary(codes::DEVICE_PWD, 0);

        assert_eq!(filter.report(record, 0).expect("table has room"), None);
        assert_eq!(
            filter.report(record, 29_999).expect("table has room"),
            None
        );

        let out = filter.report(record, 30_000).expect("table has room");
        let promoted = out.expect("promotion at deadline");
        assert_eq!(promoted.class, FaultClass::PersistentNonFatal);
        assert_eq!(promoted.first_seen_us, 0);
    }

    #[test]
    fn test_deadline_not_refreshed_by_repeats() {
        let mut filter = GlitchFilter::new(30_000);
        let record = temporary(codes::DEVICE_PWD, 0);

        assert_eq!(filter.report(record, 0).expect("table has room"), None);
        // Repeated reports inside the window do not push the deadline out.
        for now in [5_000, 10_000, 20_000, 29_000] {
            assert_eq!(filter.report(record, now).expect("table has room"), None);
        }
        assert!(
            filter
                .report(record, 30_000)
                .expect("table has room")
                .is_some()
        );
    }

    #[test]
    fn test_promotion_happens_once() {
        let mut filter = GlitchFilter::new(30_000);
        let record = temporary(codes::DEVICE_PWD, 0);

        let _ = filter.report(record, 0).expect("table has room");
        assert!(
            filter
                .report(record, 31_000)
                .expect("table has room")
                .is_some()
        );
        // The device is confirmed; further reports are absorbed.
        assert_eq!(filter.report(record, 32_000).expect("table has room"), None);
        assert_eq!(filter.state_of(codes::DEVICE_PWD), SlotState::Confirmed);
    }

    #[test]
    fn test_self_clearing_fault_is_silent() {
        let mut filter = GlitchFilter::new(30_000);
        let record = temporary(codes::DEVICE_PWD, 0);

        assert_eq!(filter.report(record, 0).expect("table has room"), None);
        filter.fault_cleared(codes::DEVICE_PWD);
        assert_eq!(filter.state_of(codes::DEVICE_PWD), SlotState::Clear);

        // A later recurrence starts a fresh window.
        let record = temporary(codes::DEVICE_PWD, 40_000);
        assert_eq!(filter.report(record, 40_000).expect("table has room"), None);
        assert_eq!(
            filter.report(record, 69_999).expect("table has room"),
            None
        );
        assert!(
            filter
                .report(record, 70_000)
                .expect("table has room")
                .is_some()
        );
    }

    #[test]
    fn test_one_timer_per_device() {
        let mut filter = GlitchFilter::new(30_000);
        let first = temporary(codes::DEVICE_PWD, 0);
        let second = crate::classify(codes::PWD_PERIOD_OUT_OF_RANGE, codes::DEVICE_PWD, 7, 5_000);

        let _ = filter.report(first, 0).expect("table has room");
        let _ = filter.report(second, 5_000).expect("table has room");
        assert_eq!(filter.pending_count(), 1);

        // The coalesced timer still carries the first detection.
        let out = filter.report(second, 30_000).expect("table has room");
        let promoted = out.expect("promotion at deadline");
        assert_eq!(promoted.code, codes::PWD_EDGE_TIMEOUT);
    }

    #[test]
    fn test_table_capacity_is_enforced() {
        let mut filter = GlitchFilter::new(30_000);
        for device in 0..MAX_TRACKED_DEVICES as u16 {
            let record = temporary(device, 0);
            assert_eq!(filter.report(record, 0).expect("table has room"), None);
        }

        let overflow = temporary(MAX_TRACKED_DEVICES as u16, 0);
        assert_eq!(
            filter.report(overflow, 0),
            Err(FilterError::TableFull {
                device: MAX_TRACKED_DEVICES as u16
            })
        );
    }

    #[test]
    fn test_cleared_devices_release_their_slots() {
        let mut filter = GlitchFilter::new(30_000);
        for device in 0..MAX_TRACKED_DEVICES as u16 {
            let record = temporary(device, 0);
            assert_eq!(filter.report(record, 0).expect("table has room"), None);
            filter.fault_cleared(device);
        }
        assert_eq!(filter.pending_count(), 0);

        // Every slot was released, so a brand-new device still fits.
        let fresh = temporary(MAX_TRACKED_DEVICES as u16, 0);
        assert_eq!(filter.report(fresh, 0).expect("slots reclaimed"), None);
        assert!(matches!(
            filter.state_of(MAX_TRACKED_DEVICES as u16),
            SlotState::Pending { .. }
        ));
    }

    #[test]
    fn test_purge_drops_everything() {
        let mut filter = GlitchFilter::new(30_000);
        let _ = filter
            .report(temporary(codes::DEVICE_PWD, 0), 0)
            .expect("table has room");
        let _ = filter
            .report(temporary(codes::DEVICE_CAN, 0), 0)
            .expect("table has room");
        assert_eq!(filter.pending_count(), 2);

        filter.purge();
        assert_eq!(filter.pending_count(), 0);
        assert_eq!(filter.state_of(codes::DEVICE_PWD), SlotState::Clear);
    }

    #[test]
    fn test_from_millis_range() {
        assert!(GlitchFilter::from_millis(0).is_err());
        assert!(GlitchFilter::from_millis(181).is_err());
        let filter = GlitchFilter::from_millis(30).expect("30ms is valid");
        assert_eq!(filter.settle_time_us(), 30_000);
    }
}
