//! ProcStatusProbe - resident memory from `/proc/self/status`.

use std::fs;

use crate::ports::MemoryProbe;

const STATUS_PATH: &str = "/proc/self/status";

/// Reads `VmRSS`. Returns `None` off Linux or when procfs is unreadable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcStatusProbe;

impl MemoryProbe for ProcStatusProbe {
    fn resident_mb(&self) -> Option<f64> {
        let status = fs::read_to_string(STATUS_PATH).ok()?;
        parse_vm_rss_mb(&status)
    }
}

/// `VmRSS:   123456 kB` -> megabytes.
fn parse_vm_rss_mb(status: &str) -> Option<f64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: f64 = line
        .trim_start_matches("VmRSS:")
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    Some(kb / 1024.0)
}
