//! Raw counter data model.
//!
//! Each counter family keeps its raw values in a dense table indexed by
//! `[row][stat][slot]`, where the slot dimension always has exactly two
//! positions: the first and the last snapshot of a measurement window.

use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of snapshot positions kept per counter.
pub const SNAPSHOT_SLOTS: usize = 2;
/// Number of CPU stat kinds.
pub const CPU_STATS: usize = 4;
/// Number of network interface stat kinds.
pub const NI_STATS: usize = 3;
/// Number of TCP stat kinds.
pub const TCP_STATS: usize = 1;

/// Counter family, one per group of related raw counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Cpu,
    NetworkInterface,
    Tcp,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Cpu, Family::NetworkInterface, Family::Tcp];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Family::Cpu => "cpu",
            Family::NetworkInterface => "network interface",
            Family::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot position inside a measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    First,
    Last,
}

impl Slot {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn other(self) -> Slot {
        match self {
            Slot::First => Slot::Last,
            Slot::Last => Slot::First,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::First => f.write_str("first"),
            Slot::Last => f.write_str("last"),
        }
    }
}

/// Per-processor stat kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuStat {
    /// Ticks spent in user mode.
    User,
    /// Ticks spent in kernel mode, interrupt handlers included.
    Privileged,
    /// All non-idle ticks.
    Total,
    /// Interrupts serviced.
    Irq,
}

impl CpuStat {
    pub const ALL: [CpuStat; CPU_STATS] = [
        CpuStat::User,
        CpuStat::Privileged,
        CpuStat::Total,
        CpuStat::Irq,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Utilization kinds are reported as percentages, the interrupt kind as a rate.
    pub const fn is_utilization(self) -> bool {
        !matches!(self, CpuStat::Irq)
    }

    pub const fn name(self) -> &'static str {
        match self {
            CpuStat::User => "user",
            CpuStat::Privileged => "privileged",
            CpuStat::Total => "total",
            CpuStat::Irq => "irq",
        }
    }
}

/// Per-interface stat kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NiStat {
    InErrors,
    OutErrors,
    Packets,
}

impl NiStat {
    pub const ALL: [NiStat; NI_STATS] = [NiStat::InErrors, NiStat::OutErrors, NiStat::Packets];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            NiStat::InErrors => "in_errors",
            NiStat::OutErrors => "out_errors",
            NiStat::Packets => "packets",
        }
    }
}

/// System-wide TCP stat kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TcpStat {
    SegmentsResent,
}

impl TcpStat {
    pub const ALL: [TcpStat; TCP_STATS] = [TcpStat::SegmentsResent];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            TcpStat::SegmentsResent => "segments_resent",
        }
    }
}

/// Raw CPU counters, `[processor][stat][slot]`.
///
/// The processor dimension is fixed when the table is created.
#[derive(Debug, Clone)]
pub struct CpuTable {
    rows: Vec<[[u64; SNAPSHOT_SLOTS]; CPU_STATS]>,
}

impl CpuTable {
    pub fn new(processor_count: usize) -> Self {
        Self {
            rows: vec![[[0; SNAPSHOT_SLOTS]; CPU_STATS]; processor_count],
        }
    }

    pub fn processor_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, cpu: usize, stat: CpuStat, slot: Slot) -> Option<u64> {
        self.rows
            .get(cpu)
            .map(|row| row[stat.index()][slot.index()])
    }

    /// Stores a value; returns `false` when `cpu` is outside the table.
    pub fn set(&mut self, cpu: usize, stat: CpuStat, slot: Slot, value: u64) -> bool {
        match self.rows.get_mut(cpu) {
            Some(row) => {
                row[stat.index()][slot.index()] = value;
                true
            }
            None => false,
        }
    }

    /// Zeroes one slot for every processor.
    pub fn clear_slot(&mut self, slot: Slot) {
        for row in &mut self.rows {
            for stat in row.iter_mut() {
                stat[slot.index()] = 0;
            }
        }
    }
}

/// One interface's counters as read from the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceReading {
    pub name: String,
    pub values: [u64; NI_STATS],
}

impl InterfaceReading {
    pub fn new(name: impl Into<String>, values: [u64; NI_STATS]) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Raw network interface counters, `[interface][stat][slot]`.
///
/// Rows are keyed by interface name. A value is `None` when the interface
/// was not present at the time that slot was written.
#[derive(Debug, Clone, Default)]
pub struct NiTable {
    names: Vec<String>,
    rows: Vec<[[Option<u64>; SNAPSHOT_SLOTS]; NI_STATS]>,
}

impl NiTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interfaces seen by the latest acquisition.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, interface: usize, stat: NiStat, slot: Slot) -> Option<u64> {
        self.rows
            .get(interface)
            .and_then(|row| row[stat.index()][slot.index()])
    }

    /// Writes one slot from a fresh acquisition.
    ///
    /// If the interface set differs from the current one, the table is
    /// re-keyed to the new set: the other slot keeps its values for
    /// interfaces that still exist and becomes `None` for new ones.
    /// Returns `true` when the table was re-keyed.
    pub fn write_slot(&mut self, slot: Slot, readings: Vec<InterfaceReading>) -> bool {
        let same_set = readings.len() == self.names.len()
            && readings
                .iter()
                .zip(&self.names)
                .all(|(reading, name)| &reading.name == name);

        if same_set {
            for (row, reading) in self.rows.iter_mut().zip(&readings) {
                for (stat, value) in row.iter_mut().zip(reading.values) {
                    stat[slot.index()] = Some(value);
                }
            }
            return false;
        }

        let previous: HashMap<&str, usize> = self
            .names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        let other = slot.other().index();

        let mut rows = Vec::with_capacity(readings.len());
        for reading in &readings {
            let mut row = [[None; SNAPSHOT_SLOTS]; NI_STATS];
            let old_row = previous.get(reading.name.as_str()).map(|&idx| &self.rows[idx]);
            for (stat, value) in reading.values.iter().enumerate() {
                row[stat][slot.index()] = Some(*value);
                row[stat][other] = old_row.and_then(|old| old[stat][other]);
            }
            rows.push(row);
        }

        self.names = readings.into_iter().map(|reading| reading.name).collect();
        self.rows = rows;
        true
    }
}

/// Raw TCP counters, `[stat][slot]`.
#[derive(Debug, Clone, Default)]
pub struct TcpTable {
    values: [[u64; SNAPSHOT_SLOTS]; TCP_STATS],
}

impl TcpTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: TcpStat, slot: Slot) -> u64 {
        self.values[stat.index()][slot.index()]
    }

    pub fn set(&mut self, stat: TcpStat, slot: Slot, value: u64) {
        self.values[stat.index()][slot.index()] = value;
    }
}
