//! Two-slot snapshot store.
//!
//! Holds the raw tables of every counter family together with the sample
//! timestamps of each family's measurement window.

use serde::Serialize;

use crate::counters::{CpuTable, Family, NiTable, Slot, TcpTable, SNAPSHOT_SLOTS};
use crate::error::{CollectorError, Result};

/// Progress of one family's measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPhase {
    /// No window opened yet.
    Ready,
    /// First snapshot taken, last snapshot still missing.
    SnapshotPending,
    /// Both snapshots taken; statistics can be computed.
    SnapshotsComplete,
}

/// Timestamps and written-state of one family's two slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleWindow {
    timestamps: [f64; SNAPSHOT_SLOTS],
    taken: [bool; SNAPSHOT_SLOTS],
}

impl SampleWindow {
    /// Records a completed snapshot.
    ///
    /// Retaking the first slot opens a new window, so the last slot must be
    /// taken again before statistics are available.
    pub fn record(&mut self, slot: Slot, ticks: f64) {
        self.timestamps[slot.index()] = ticks;
        self.taken[slot.index()] = true;
        if slot == Slot::First {
            self.taken[Slot::Last.index()] = false;
        }
    }

    pub fn timestamp(&self, slot: Slot) -> Option<f64> {
        self.taken[slot.index()].then_some(self.timestamps[slot.index()])
    }

    pub fn phase(&self) -> SnapshotPhase {
        match (self.taken[Slot::First.index()], self.taken[Slot::Last.index()]) {
            (true, true) => SnapshotPhase::SnapshotsComplete,
            (true, false) => SnapshotPhase::SnapshotPending,
            (false, _) => SnapshotPhase::Ready,
        }
    }

    /// Elapsed ticks between the two snapshots, `None` unless both were taken.
    pub fn time_diff(&self) -> Option<f64> {
        match self.phase() {
            SnapshotPhase::SnapshotsComplete => Some(
                self.timestamps[Slot::Last.index()] - self.timestamps[Slot::First.index()],
            ),
            _ => None,
        }
    }
}

/// Raw counter storage for all families.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    pub cpu: CpuTable,
    pub ni: NiTable,
    pub tcp: TcpTable,
    windows: [SampleWindow; 3],
}

impl SnapshotStore {
    /// Creates a zeroed store sized for `processor_count` processors.
    pub fn new(processor_count: usize) -> Self {
        Self {
            cpu: CpuTable::new(processor_count),
            ni: NiTable::new(),
            tcp: TcpTable::new(),
            windows: [SampleWindow::default(); 3],
        }
    }

    pub fn window(&self, family: Family) -> &SampleWindow {
        &self.windows[family.index()]
    }

    pub fn window_mut(&mut self, family: Family) -> &mut SampleWindow {
        &mut self.windows[family.index()]
    }

    /// Returns the time base for `family`, or a precondition error when the
    /// window is incomplete.
    pub fn ready_time_diff(&self, family: Family) -> Result<f64> {
        let window = self.window(family);
        window.time_diff().ok_or_else(|| {
            CollectorError::PreconditionViolation(format!(
                "{} statistics requested in phase {:?}; both snapshots are required",
                family,
                window.phase()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_phases() {
        let mut window = SampleWindow::default();
        assert_eq!(window.phase(), SnapshotPhase::Ready);

        window.record(Slot::First, 10.0);
        assert_eq!(window.phase(), SnapshotPhase::SnapshotPending);
        assert_eq!(window.time_diff(), None);

        window.record(Slot::Last, 25.0);
        assert_eq!(window.phase(), SnapshotPhase::SnapshotsComplete);
        assert_eq!(window.time_diff(), Some(15.0));

        // Re-arming with a new first snapshot invalidates the last one
        window.record(Slot::First, 30.0);
        assert_eq!(window.phase(), SnapshotPhase::SnapshotPending);
        assert_eq!(window.timestamp(Slot::Last), None);
    }

    #[test]
    fn test_last_without_first_stays_ready() {
        let mut window = SampleWindow::default();
        window.record(Slot::Last, 5.0);
        assert_eq!(window.phase(), SnapshotPhase::Ready);
        assert_eq!(window.timestamp(Slot::Last), Some(5.0));
    }

    #[test]
    fn test_retaking_last_moves_window_end() {
        let mut window = SampleWindow::default();
        window.record(Slot::First, 0.0);
        window.record(Slot::Last, 10.0);
        window.record(Slot::Last, 40.0);
        assert_eq!(window.time_diff(), Some(40.0));
    }

    #[test]
    fn test_ready_time_diff_requires_both_slots() {
        let mut store = SnapshotStore::new(1);
        let err = store.ready_time_diff(Family::Cpu).unwrap_err();
        assert!(matches!(err, CollectorError::PreconditionViolation(_)));

        store.window_mut(Family::Cpu).record(Slot::First, 1.0);
        store.window_mut(Family::Cpu).record(Slot::Last, 3.0);
        assert_eq!(store.ready_time_diff(Family::Cpu).unwrap(), 2.0);
        assert!(store.ready_time_diff(Family::Tcp).is_err());
    }
}
