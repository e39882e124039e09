//! In-memory capture adapter

use crate::core::{format_line, AdapterEnv, ConfigSection, LogAdapter, LogRecord, Severity};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Captured {
    lines: Mutex<Vec<String>>,
    flushes: AtomicUsize,
    closes: AtomicUsize,
}

/// Keeps formatted lines in memory
///
/// Clones share the same buffer, so a handle kept by the caller sees what
/// the registered copy captured.
///
/// # Example
///
/// ```
/// use rust_log_engine::adapters::MemoryAdapter;
/// use rust_log_engine::core::{AdapterEnv, LogAdapter, LogRecord, Severity};
///
/// let adapter = MemoryAdapter::new("Memory", AdapterEnv::default());
/// let handle = adapter.clone();
/// adapter.write(LogRecord::new(Severity::Info, "captured"));
/// assert!(handle.lines()[0].ends_with("[I] captured"));
/// ```
#[derive(Clone)]
pub struct MemoryAdapter {
    name: String,
    env: AdapterEnv,
    level: Severity,
    captured: Arc<Captured>,
}

impl MemoryAdapter {
    pub fn new(name: impl Into<String>, env: AdapterEnv) -> Self {
        Self {
            name: name.into(),
            env,
            level: Severity::Debug,
            captured: Arc::new(Captured::default()),
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.captured.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.captured.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.captured.lines.lock().clear();
    }

    pub fn flush_count(&self) -> usize {
        self.captured.flushes.load(Ordering::Relaxed)
    }

    pub fn close_count(&self) -> usize {
        self.captured.closes.load(Ordering::Relaxed)
    }
}

impl LogAdapter for MemoryAdapter {
    fn init(&mut self, section: &ConfigSection<'_>) -> Severity {
        self.level = section.get_severity("Level", Severity::Debug);
        self.level
    }

    fn write(&self, record: LogRecord) {
        let line = format_line(&record);
        self.captured.lines.lock().push(line);
        self.env.pool.give_back(record);
    }

    fn flush(&self) {
        self.captured.flushes.fetch_add(1, Ordering::Relaxed);
    }

    fn close(&self) {
        self.captured.closes.fetch_add(1, Ordering::Relaxed);
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.level
    }
}
