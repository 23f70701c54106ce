//! Zero-filled acquirer for platforms without a counter source.

use crate::acquire::CounterAcquirer;
use crate::counters::{CpuTable, NiTable, Slot, TcpStat, TcpTable};
use crate::error::AcquireError;

/// Writes zeros for every processor and TCP counter and reports no
/// network interfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAcquirer;

impl CounterAcquirer for NullAcquirer {
    fn acquire_cpu(&self, table: &mut CpuTable, slot: Slot) -> Result<(), AcquireError> {
        table.clear_slot(slot);
        Ok(())
    }

    fn acquire_network_interface(
        &self,
        table: &mut NiTable,
        slot: Slot,
    ) -> Result<(), AcquireError> {
        table.write_slot(slot, Vec::new());
        Ok(())
    }

    fn acquire_tcp(&self, table: &mut TcpTable, slot: Slot) -> Result<(), AcquireError> {
        for stat in TcpStat::ALL {
            table.set(stat, slot, 0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::CpuStat;

    #[test]
    fn test_null_acquirer_zero_fills() {
        let mut cpu = CpuTable::new(2);
        cpu.set(1, CpuStat::Total, Slot::First, 77);
        NullAcquirer.acquire_cpu(&mut cpu, Slot::First).unwrap();
        assert_eq!(cpu.get(1, CpuStat::Total, Slot::First), Some(0));

        let mut ni = NiTable::new();
        NullAcquirer.acquire_network_interface(&mut ni, Slot::Last).unwrap();
        assert!(ni.is_empty());

        let mut tcp = TcpTable::new();
        tcp.set(TcpStat::SegmentsResent, Slot::Last, 9);
        NullAcquirer.acquire_tcp(&mut tcp, Slot::Last).unwrap();
        assert_eq!(tcp.get(TcpStat::SegmentsResent, Slot::Last), 0);
    }
}
