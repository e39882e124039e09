//! Adapter contract for log output destinations

use super::clock::{SharedClock, SystemClock};
use super::config::ConfigSection;
use super::error::{stderr_fallback, FallbackHandler, LoggerError};
use super::record::{LogRecord, RecordPool};
use super::severity::Severity;
use std::sync::Arc;

/// What every output destination implements
///
/// `init` returns the severity the adapter accepts; `Undefined` means the
/// adapter is effectively disabled. `write` takes ownership of the record
/// and is responsible for handing it back to the pool once consumed.
pub trait LogAdapter: Send + Sync {
    fn init(&mut self, section: &ConfigSection<'_>) -> Severity;
    fn write(&self, record: LogRecord);
    fn flush(&self);
    fn close(&self);
    fn name(&self) -> &str;
    fn severity(&self) -> Severity;

    /// Should this adapter receive `record`
    fn accepts(&self, record: &LogRecord) -> bool {
        record.forced || record.severity.passes(self.severity())
    }
}

/// Shared services handed to every adapter
#[derive(Clone)]
pub struct AdapterEnv {
    pub pool: Arc<RecordPool>,
    pub clock: SharedClock,
    pub fallback: FallbackHandler,
}

impl AdapterEnv {
    pub fn new(pool: Arc<RecordPool>, clock: SharedClock, fallback: FallbackHandler) -> Self {
        Self {
            pool,
            clock,
            fallback,
        }
    }

    /// Report an internal failure without going through any adapter
    pub fn report(&self, err: &LoggerError) {
        (self.fallback)(err);
    }
}

impl Default for AdapterEnv {
    fn default() -> Self {
        Self::new(
            Arc::new(RecordPool::default()),
            Arc::new(SystemClock),
            stderr_fallback(),
        )
    }
}
