//! Linux counter acquisition from the /proc filesystem.
//!
//! Sources:
//! - `/proc/stat`: per-CPU time in clock ticks (and the `intr` total)
//! - `/proc/interrupts`: per-CPU interrupt counts
//! - `/proc/net/dev`: per-interface packet and error counters
//! - `/proc/net/snmp`: TCP retransmitted segments

use ahash::AHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::acquire::CounterAcquirer;
use crate::counters::{
    CpuStat, CpuTable, InterfaceReading, NiStat, NiTable, Slot, TcpStat, TcpTable, NI_STATS,
};
use crate::error::AcquireError;

/// CPU time counters of one processor, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Calculate total CPU time (all fields).
    pub fn total(&self) -> u64 {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add)
    }

    /// Calculate non-active time (idle + iowait).
    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }

    /// User-mode ticks, niced processes included.
    pub fn user_total(&self) -> u64 {
        self.user.saturating_add(self.nice)
    }

    /// Kernel-mode ticks, interrupt handlers included.
    pub fn privileged(&self) -> u64 {
        self.system
            .saturating_add(self.irq)
            .saturating_add(self.softirq)
    }

    pub fn busy(&self) -> u64 {
        self.total().saturating_sub(self.idle_total())
    }
}

/// Packet and error counters of one interface from /proc/net/dev.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetDevStats {
    pub interface: String,
    pub receive_packets: u64,
    pub receive_errs: u64,
    pub transmit_packets: u64,
    pub transmit_errs: u64,
}

impl NetDevStats {
    fn reading(&self) -> InterfaceReading {
        let mut values = [0; NI_STATS];
        values[NiStat::InErrors.index()] = self.receive_errs;
        values[NiStat::OutErrors.index()] = self.transmit_errs;
        values[NiStat::Packets.index()] =
            self.receive_packets.saturating_add(self.transmit_packets);
        InterfaceReading::new(self.interface.clone(), values)
    }
}

/// TCP counters from /proc/net/snmp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpCounters {
    pub retrans_segs: u64,
}

/// Parses the per-CPU lines of /proc/stat.
///
/// Returns `(cpu_id, times)` pairs; the aggregate `cpu` line is skipped.
/// Format: "cpu0 user nice system idle iowait irq softirq steal guest guest_nice"
pub fn parse_cpu_times(content: &str) -> Result<Vec<(usize, CpuTimes)>, String> {
    let mut cpus = Vec::new();

    for line in content.lines() {
        // Aggregate line has no id: "cpu  123 ..."
        let Some(rest) = line
            .strip_prefix("cpu")
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        else {
            continue;
        };
        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some(Ok(cpu_id)) = parts.first().map(|id| id.parse::<usize>()) else {
            continue;
        };
        if parts.len() < 8 {
            return Err(format!(
                "cpu{} line has {} fields, expected at least 7",
                cpu_id,
                parts.len() - 1
            ));
        }

        let field = |idx: usize| parts.get(idx).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
        cpus.push((
            cpu_id,
            CpuTimes {
                user: field(1),
                nice: field(2),
                system: field(3),
                idle: field(4),
                iowait: field(5),
                irq: field(6),
                softirq: field(7),
                steal: field(8),
            },
        ));
    }

    if cpus.is_empty() {
        return Err("no per-CPU lines found".to_string());
    }
    Ok(cpus)
}

/// Parses the total interrupt count from the `intr` line of /proc/stat.
pub fn parse_intr_total(content: &str) -> Option<u64> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("intr "))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|total| total.parse().ok())
}

/// Sums /proc/interrupts per CPU.
///
/// The header names the online CPUs ("CPU0 CPU1 CPU3"); rows that do not
/// carry one count per CPU (ERR, MIS) are skipped.
pub fn parse_interrupts(content: &str) -> Result<Vec<(usize, u64)>, String> {
    let mut lines = content.lines().skip_while(|line| line.trim().is_empty());
    let header = lines.next().ok_or("empty file")?;

    let cpu_ids = header
        .split_whitespace()
        .map(|col| {
            col.strip_prefix("CPU")
                .and_then(|id| id.parse::<usize>().ok())
                .ok_or_else(|| format!("unexpected header column '{}'", col))
        })
        .collect::<Result<Vec<usize>, String>>()?;
    if cpu_ids.is_empty() {
        return Err("header lists no CPUs".to_string());
    }

    let mut sums = vec![0u64; cpu_ids.len()];
    for line in lines {
        let Some((_, counts)) = line.split_once(':') else {
            continue;
        };
        let values: Vec<u64> = counts
            .split_whitespace()
            .take(cpu_ids.len())
            .map_while(|v| v.parse().ok())
            .collect();
        if values.len() != cpu_ids.len() {
            continue;
        }
        for (sum, value) in sums.iter_mut().zip(values) {
            *sum = sum.wrapping_add(value);
        }
    }

    Ok(cpu_ids.into_iter().zip(sums).collect())
}

/// Parses /proc/net/dev, keeping the kernel's interface order.
pub fn parse_netdev(content: &str) -> Vec<NetDevStats> {
    let mut stats = Vec::new();

    // Skip the two header lines
    for line in content.lines().skip(2) {
        let Some((interface, counters)) = line.split_once(':') else {
            continue;
        };

        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 16 {
            continue; // Skip malformed lines
        }

        stats.push(NetDevStats {
            interface: interface.trim().to_string(),
            receive_packets: values[1].parse().unwrap_or(0),
            receive_errs: values[2].parse().unwrap_or(0),
            transmit_packets: values[9].parse().unwrap_or(0),
            transmit_errs: values[10].parse().unwrap_or(0),
        });
    }

    stats
}

/// Parses the TCP section of /proc/net/snmp.
///
/// The section is a header line of field names followed by a line of values,
/// both prefixed with "Tcp:".
pub fn parse_snmp_tcp(content: &str) -> Result<TcpCounters, String> {
    let mut tcp_lines = content.lines().filter_map(|line| line.strip_prefix("Tcp:"));
    let header = tcp_lines.next().ok_or("Tcp section not found")?;
    let values = tcp_lines.next().ok_or("Tcp values line missing")?;

    let position = header
        .split_whitespace()
        .position(|name| name == "RetransSegs")
        .ok_or("RetransSegs field not found")?;
    let retrans_segs = values
        .split_whitespace()
        .nth(position)
        .ok_or("RetransSegs value missing")?
        .parse::<u64>()
        .map_err(|e| format!("Failed to parse RetransSegs: {}", e))?;

    Ok(TcpCounters { retrans_segs })
}

/// Reads counters from a proc filesystem rooted at `proc_root`.
#[derive(Debug, Clone)]
pub struct ProcfsAcquirer {
    proc_root: PathBuf,
    skip_loopback: bool,
}

impl ProcfsAcquirer {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            skip_loopback: false,
        }
    }

    pub fn skip_loopback(mut self, skip: bool) -> Self {
        self.skip_loopback = skip;
        self
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    fn read(&self, relative: &str) -> Result<(PathBuf, String), AcquireError> {
        let path = self.proc_root.join(relative);
        match fs::read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(source) => Err(AcquireError::Io { path, source }),
        }
    }

    /// Per-CPU interrupt counts keyed by kernel CPU id, or `None` when
    /// /proc/interrupts cannot be used.
    fn read_interrupts(&self) -> Option<Vec<(usize, u64)>> {
        let parsed = self.read("interrupts").and_then(|(path, content)| {
            parse_interrupts(&content).map_err(|detail| AcquireError::Format { path, detail })
        });

        match parsed {
            Ok(counts) => Some(counts),
            Err(e) => {
                debug!("Per-CPU interrupts unavailable ({}), using intr total", e);
                None
            }
        }
    }
}

impl CounterAcquirer for ProcfsAcquirer {
    fn acquire_cpu(&self, table: &mut CpuTable, slot: Slot) -> Result<(), AcquireError> {
        let (path, content) = self.read("stat")?;
        let cpus =
            parse_cpu_times(&content).map_err(|detail| AcquireError::Format { path, detail })?;

        // Rows are dense: kernel ids skip offline CPUs, so the n-th listed
        // CPU fills row n.
        let rows: AHashMap<usize, usize> = cpus
            .iter()
            .enumerate()
            .map(|(row, (cpu_id, _))| (*cpu_id, row))
            .collect();

        table.clear_slot(slot);
        for (row, (cpu_id, times)) in cpus.iter().enumerate() {
            if !table.set(row, CpuStat::User, slot, times.user_total()) {
                debug!("Ignoring cpu{} beyond discovered processor count", cpu_id);
                continue;
            }
            table.set(row, CpuStat::Privileged, slot, times.privileged());
            table.set(row, CpuStat::Total, slot, times.busy());
        }

        match self.read_interrupts() {
            Some(interrupts) => {
                for (cpu_id, count) in interrupts {
                    match rows.get(&cpu_id) {
                        Some(&row) => {
                            table.set(row, CpuStat::Irq, slot, count);
                        }
                        None => debug!("No /proc/stat entry for interrupt column CPU{}", cpu_id),
                    }
                }
            }
            None => {
                if let Some(total) = parse_intr_total(&content) {
                    table.set(0, CpuStat::Irq, slot, total);
                }
            }
        }

        trace!(%slot, processors = table.processor_count(), "CPU counters acquired");
        Ok(())
    }

    fn acquire_network_interface(
        &self,
        table: &mut NiTable,
        slot: Slot,
    ) -> Result<(), AcquireError> {
        let (_, content) = self.read("net/dev")?;
        let readings: Vec<InterfaceReading> = parse_netdev(&content)
            .iter()
            .filter(|stats| !(self.skip_loopback && stats.interface == "lo"))
            .map(NetDevStats::reading)
            .collect();

        if table.write_slot(slot, readings) {
            debug!(
                interfaces = ?table.names(),
                "Network interface set changed, table re-keyed"
            );
        }
        Ok(())
    }

    fn acquire_tcp(&self, table: &mut TcpTable, slot: Slot) -> Result<(), AcquireError> {
        let (path, content) = self.read("net/snmp")?;
        let counters =
            parse_snmp_tcp(&content).map_err(|detail| AcquireError::Format { path, detail })?;

        table.set(TcpStat::SegmentsResent, slot, counters.retrans_segs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  300 20 150 5000 30 5 5 0 0 0\n\
                        cpu0 200 10 100 2000 10 3 2 1 0 0\n\
                        cpu1 100 10 50 3000 20 2 3 0 0 0\n\
                        intr 98765 44 9 0 0\n\
                        ctxt 123456\n\
                        btime 1700000000\n";

    const INTERRUPTS: &str = "           CPU0       CPU1       \n  \
                              0:         44          0   IO-APIC   2-edge      timer\n  \
                              1:          0          9   IO-APIC   1-edge      i8042\n\
                              LOC:       1000       2000   Local timer interrupts\n\
                              ERR:          0\n\
                              MIS:          0\n";

    const NETDEV: &str = "Inter-|   Receive                                                |  Transmit\n \
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n    \
    lo:  1000      10    0    0    0     0          0         0     1000      10    0    0    0     0       0          0\n  \
  eth0: 50000     400    3    0    0     0          0         0    20000     300    1    0    0     0       0          0\n";

    const SNMP: &str = "Ip: Forwarding DefaultTTL\nIp: 1 64\n\
                        Tcp: RtoAlgorithm RtoMin RtoMax MaxConn ActiveOpens PassiveOpens AttemptFails EstabResets CurrEstab InSegs OutSegs RetransSegs InErrs OutRsts InCsumErrors\n\
                        Tcp: 1 200 120000 -1 100 50 3 7 5 10000 9000 42 0 12 0\n\
                        Udp: InDatagrams NoPorts\nUdp: 5 0\n";

    #[test]
    fn test_parse_cpu_times() {
        let cpus = parse_cpu_times(STAT).unwrap();
        assert_eq!(cpus.len(), 2);
        let (id, cpu0) = cpus[0];
        assert_eq!(id, 0);
        assert_eq!(cpu0.user_total(), 210);
        assert_eq!(cpu0.privileged(), 105);
        assert_eq!(cpu0.total(), 2326);
        assert_eq!(cpu0.busy(), 2326 - 2010);
    }

    #[test]
    fn test_parse_cpu_times_without_steal() {
        // Pre-2.6.11 kernels only report seven fields
        let cpus = parse_cpu_times("cpu0 1 2 3 4 5 6 7\n").unwrap();
        assert_eq!(cpus[0].1.steal, 0);
        assert_eq!(cpus[0].1.softirq, 7);
    }

    #[test]
    fn test_parse_cpu_times_rejects_empty() {
        assert!(parse_cpu_times("intr 5\nctxt 1\n").is_err());
        assert!(parse_cpu_times("cpu0 1 2\n").is_err());
    }

    #[test]
    fn test_parse_intr_total() {
        assert_eq!(parse_intr_total(STAT), Some(98765));
        assert_eq!(parse_intr_total("cpu0 1 2 3\n"), None);
    }

    #[test]
    fn test_parse_interrupts_per_cpu() {
        let counts = parse_interrupts(INTERRUPTS).unwrap();
        assert_eq!(counts, vec![(0, 1044), (1, 2009)]);
    }

    #[test]
    fn test_parse_interrupts_with_offline_cpu() {
        let content = "      CPU0   CPU2\n  0:   5   7   timer\n";
        let counts = parse_interrupts(content).unwrap();
        assert_eq!(counts, vec![(0, 5), (2, 7)]);
    }

    #[test]
    fn test_parse_interrupts_bad_header() {
        assert!(parse_interrupts("").is_err());
        assert!(parse_interrupts("  0:  5  timer\n").is_err());
    }

    #[test]
    fn test_parse_netdev_keeps_order() {
        let stats = parse_netdev(NETDEV);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].interface, "lo");
        assert_eq!(stats[1].interface, "eth0");
        assert_eq!(stats[1].receive_packets, 400);
        assert_eq!(stats[1].receive_errs, 3);
        assert_eq!(stats[1].transmit_packets, 300);
        assert_eq!(stats[1].transmit_errs, 1);

        let reading = stats[1].reading();
        assert_eq!(reading.values, [3, 1, 700]);
    }

    #[test]
    fn test_parse_snmp_tcp() {
        let counters = parse_snmp_tcp(SNMP).unwrap();
        assert_eq!(counters.retrans_segs, 42);
    }

    #[test]
    fn test_parse_snmp_tcp_missing_section() {
        assert!(parse_snmp_tcp("Ip: Forwarding\nIp: 1\n").is_err());
        assert!(parse_snmp_tcp("Tcp: RtoAlgorithm\nTcp: 1\n").is_err());
    }

    #[test]
    fn test_acquire_from_fake_root() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("net")).unwrap();
        fs::write(dir.path().join("stat"), STAT).unwrap();
        fs::write(dir.path().join("interrupts"), INTERRUPTS).unwrap();
        fs::write(dir.path().join("net/dev"), NETDEV).unwrap();
        fs::write(dir.path().join("net/snmp"), SNMP).unwrap();

        let acquirer = ProcfsAcquirer::new(dir.path()).skip_loopback(true);

        let mut cpu = CpuTable::new(2);
        acquirer.acquire_cpu(&mut cpu, Slot::First).unwrap();
        assert_eq!(cpu.get(1, CpuStat::User, Slot::First), Some(110));
        assert_eq!(cpu.get(1, CpuStat::Irq, Slot::First), Some(2009));

        let mut ni = NiTable::new();
        acquirer.acquire_network_interface(&mut ni, Slot::First).unwrap();
        assert_eq!(ni.names(), &["eth0".to_string()]);

        let mut tcp = TcpTable::new();
        acquirer.acquire_tcp(&mut tcp, Slot::Last).unwrap();
        assert_eq!(tcp.get(TcpStat::SegmentsResent, Slot::Last), 42);
    }

    #[test]
    fn test_acquire_cpu_falls_back_to_intr_total() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("stat"), STAT).unwrap();

        let mut cpu = CpuTable::new(2);
        ProcfsAcquirer::new(dir.path())
            .acquire_cpu(&mut cpu, Slot::Last)
            .unwrap();
        assert_eq!(cpu.get(0, CpuStat::Irq, Slot::Last), Some(98765));
        assert_eq!(cpu.get(1, CpuStat::Irq, Slot::Last), Some(0));
    }

    #[test]
    fn test_acquire_cpu_with_offline_cpu_fills_dense_rows() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(
            dir.path().join("stat"),
            "cpu  600 0 0 0 0 0 0 0 0 0
             cpu0 100 0 10 900 0 0 0 0 0 0
             cpu2 500 0 20 500 0 0 0 0 0 0
             intr 10 0
",
        )
        .unwrap();
        fs::write(
            dir.path().join("interrupts"),
            "           CPU0       CPU2       
               0:          4          7   IO-APIC   2-edge      timer
",
        )
        .unwrap();

        let mut cpu = CpuTable::new(2);
        ProcfsAcquirer::new(dir.path())
            .acquire_cpu(&mut cpu, Slot::First)
            .unwrap();

        assert_eq!(cpu.get(0, CpuStat::User, Slot::First), Some(100));
        assert_eq!(cpu.get(1, CpuStat::User, Slot::First), Some(500));
        assert_eq!(cpu.get(1, CpuStat::Privileged, Slot::First), Some(20));
        assert_eq!(cpu.get(0, CpuStat::Irq, Slot::First), Some(4));
        assert_eq!(cpu.get(1, CpuStat::Irq, Slot::First), Some(7));
    }

    #[test]
    fn test_counter_sums_saturate() {
        let times = CpuTimes {
            user: u64::MAX,
            nice: 1,
            idle: u64::MAX,
            ..CpuTimes::default()
        };
        assert_eq!(times.total(), u64::MAX);
        assert_eq!(times.user_total(), u64::MAX);
        assert_eq!(times.busy(), 0);

        let stats = NetDevStats {
            interface: "eth0".to_string(),
            receive_packets: u64::MAX,
            receive_errs: 0,
            transmit_packets: 5,
            transmit_errs: 0,
        };
        assert_eq!(stats.reading().values[NiStat::Packets.index()], u64::MAX);
    }

    #[test]
    fn test_acquire_failure_leaves_slot_untouched() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut tcp = TcpTable::new();
        tcp.set(TcpStat::SegmentsResent, Slot::First, 17);

        let err = ProcfsAcquirer::new(dir.path())
            .acquire_tcp(&mut tcp, Slot::First)
            .unwrap_err();
        assert!(matches!(err, AcquireError::Io { .. }));
        assert_eq!(tcp.get(TcpStat::SegmentsResent, Slot::First), 17);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_host_stat() {
        let content = fs::read_to_string("/proc/stat").expect("Failed to read /proc/stat");
        let cpus = parse_cpu_times(&content).unwrap();
        assert!(!cpus.is_empty(), "No CPU statistics found");
    }
}
