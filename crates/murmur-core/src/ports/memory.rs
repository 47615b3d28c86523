//! MemoryProbe port.

/// Measures resident memory of this process in megabytes.
///
/// `None` means the facility is unavailable or the measurement failed.
pub trait MemoryProbe: Send + Sync {
    fn resident_mb(&self) -> Option<f64>;
}

/// Probe for platforms without a measurement facility.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn resident_mb(&self) -> Option<f64> {
        None
    }
}
