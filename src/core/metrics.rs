//! File adapter metrics for observability
//!
//! Counters are written only by the adapter's writer thread and read from
//! anywhere, so relaxed atomics are enough.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Metrics for one file adapter
///
/// # Example
///
/// ```
/// use rust_log_engine::core::AdapterMetrics;
///
/// let metrics = AdapterMetrics::new();
/// metrics.record_written(3);
/// metrics.record_rotation();
///
/// assert_eq!(metrics.records_written(), 3);
/// assert_eq!(metrics.rotations(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AdapterMetrics {
    /// Records formatted into the file
    records_written: AtomicU64,

    /// Physical writes or flushes that failed
    write_errors: AtomicU64,

    /// Successful rotations
    rotations: AtomicU64,

    /// Rotation attempts that could not move the file aside
    rotation_failures: AtomicU64,

    /// Rotated files removed by the retention sweep
    files_deleted: AtomicU64,

    /// Lines in the active file since it was opened
    current_lines: AtomicU64,

    /// Bytes in the active file
    current_bytes: AtomicU64,

    /// Sequence number of the last rotated file
    current_sequence: AtomicU32,
}

impl AdapterMetrics {
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            files_deleted: AtomicU64::new(0),
            current_lines: AtomicU64::new(0),
            current_bytes: AtomicU64::new(0),
            current_sequence: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn files_deleted(&self) -> u64 {
        self.files_deleted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn current_lines(&self) -> u64 {
        self.current_lines.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn current_bytes(&self) -> u64 {
        self.current_bytes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn current_sequence(&self) -> u32 {
        self.current_sequence.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self, count: u64) -> u64 {
        self.records_written.fetch_add(count, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_error(&self) -> u64 {
        self.write_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation_failure(&self) -> u64 {
        self.rotation_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_deleted(&self) -> u64 {
        self.files_deleted.fetch_add(1, Ordering::Relaxed)
    }

    /// Publish the active file's counters
    pub fn set_position(&self, lines: u64, bytes: u64, sequence: u32) {
        self.current_lines.store(lines, Ordering::Relaxed);
        self.current_bytes.store(bytes, Ordering::Relaxed);
        self.current_sequence.store(sequence, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = AdapterMetrics::new();
        assert_eq!(metrics.records_written(), 0);
        assert_eq!(metrics.write_errors(), 0);
        assert_eq!(metrics.rotations(), 0);
        assert_eq!(metrics.rotation_failures(), 0);
        assert_eq!(metrics.files_deleted(), 0);
    }

    #[test]
    fn test_set_position() {
        let metrics = AdapterMetrics::new();
        metrics.set_position(2, 64, 1);
        assert_eq!(metrics.current_lines(), 2);
        assert_eq!(metrics.current_bytes(), 64);
        assert_eq!(metrics.current_sequence(), 1);
    }

    #[test]
    fn test_fetch_add_returns_previous() {
        let metrics = AdapterMetrics::new();
        assert_eq!(metrics.record_deleted(), 0);
        assert_eq!(metrics.record_deleted(), 1);
        assert_eq!(metrics.files_deleted(), 2);
    }
}
