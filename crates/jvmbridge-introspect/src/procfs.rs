//! Process CPU time from `/proc/<pid>/stat`.
//!
//! Busy time is `utime + stime` converted from clock ticks to nanoseconds
//! and divided by the number of online CPUs, so a process saturating every
//! core reads as 1.0 against wall-clock time. Wall-clock time is measured
//! from a monotonic origin taken at construction.

use std::path::PathBuf;
use std::time::Instant;

use jvmbridge_core::{BridgeError, BridgeResult};

use crate::types::{CpuSample, CpuTimeSource};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// CPU time of one process, read from procfs.
#[derive(Debug)]
pub struct ProcCpuTime {
    stat_path: PathBuf,
    clk_tck: u64,
    cpus: u64,
    origin: Instant,
}

impl ProcCpuTime {
    /// Resolve the CPU-time source for `pid`.
    ///
    /// Fails with [`BridgeError::Unsupported`] when procfs is unavailable or
    /// the process cannot be read.
    pub fn new(pid: u32) -> BridgeResult<Self> {
        let source = Self {
            stat_path: PathBuf::from(format!("/proc/{pid}/stat")),
            clk_tck: sysconf_or(libc::_SC_CLK_TCK, 100),
            cpus: sysconf_or(libc::_SC_NPROCESSORS_ONLN, 1),
            origin: Instant::now(),
        };
        source.busy_ticks().map_err(|e| {
            BridgeError::Unsupported(format!("process cpu time for pid {pid}: {e}"))
        })?;
        Ok(source)
    }

    /// CPU time of the current process.
    pub fn current_process() -> BridgeResult<Self> {
        Self::new(std::process::id())
    }

    fn busy_ticks(&self) -> BridgeResult<u64> {
        let content = std::fs::read_to_string(&self.stat_path).map_err(|e| {
            BridgeError::TransientSample(format!("reading {}: {e}", self.stat_path.display()))
        })?;
        parse_busy_ticks(&content).ok_or_else(|| {
            BridgeError::TransientSample(format!("malformed {}", self.stat_path.display()))
        })
    }
}

impl CpuTimeSource for ProcCpuTime {
    fn sample(&self) -> BridgeResult<CpuSample> {
        let ticks = self.busy_ticks()?;
        let busy = u128::from(ticks) * NANOS_PER_SEC / u128::from(self.clk_tck * self.cpus);
        let wall = self.origin.elapsed().as_nanos();
        Ok(CpuSample::new(
            u64::try_from(busy).unwrap_or(u64::MAX),
            u64::try_from(wall).unwrap_or(u64::MAX),
        ))
    }
}

/// Extract `utime + stime` (fields 14 and 15) from a `/proc/<pid>/stat` line.
///
/// The command name (field 2) is parenthesised and may itself contain spaces
/// or parentheses, so fields are counted from the last `)`.
fn parse_busy_ticks(stat: &str) -> Option<u64> {
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace();
    // `rest` starts at field 3 (state); utime is field 14.
    let utime: u64 = fields.nth(11)?.parse().ok()?;
    let stime: u64 = fields.next()?.parse().ok()?;
    Some(utime + stime)
}

fn sysconf_or(name: libc::c_int, fallback: u64) -> u64 {
    // SAFETY: `sysconf` only reads a system constant.
    let value = unsafe { libc::sysconf(name) };
    if value > 0 { value as u64 } else { fallback }
}
