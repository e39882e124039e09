//! Log record structure

use super::pool::{Pool, Poolable};
use super::severity::Severity;
use chrono::{DateTime, Local};

/// Pool that records are checked out from before dispatch
pub type RecordPool = Pool<LogRecord>;

/// One log call, captured for the adapters
///
/// Records are short-lived and recycled through a [`RecordPool`]; every field
/// is reset on return, and string buffers keep their capacity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    pub severity: Severity,
    /// Set when the call bypassed the engine's ceiling
    pub forced: bool,
    pub payload: String,
    pub args: Vec<String>,
    /// Rendered tag text, `[k=v, ...]` or empty
    pub tag: String,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
}

impl LogRecord {
    pub fn new(severity: Severity, payload: impl Into<String>) -> Self {
        Self {
            severity,
            payload: payload.into(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Overwrite every field with `other`'s, reusing this record's buffers
    pub fn copy_from(&mut self, other: &LogRecord) {
        self.severity = other.severity;
        self.forced = other.forced;
        self.payload.clone_from(&other.payload);
        self.args.clone_from(&other.args);
        self.tag.clone_from(&other.tag);
        self.timestamp_ms = other.timestamp_ms;
    }

    /// Check out a copy of this record from `pool`
    pub fn clone_into_pool(&self, pool: &RecordPool) -> LogRecord {
        let mut copy = pool.checkout();
        copy.copy_from(self);
        copy
    }

    /// Timestamp in local time
    pub fn local_time(&self) -> DateTime<Local> {
        super::clock::millis_to_local(self.timestamp_ms)
    }

    /// Payload with its args substituted, sanitized to a single line
    pub fn message(&self) -> String {
        super::format::render_message(&self.payload, &self.args)
    }
}

impl Poolable for LogRecord {
    fn reset(&mut self) {
        self.severity = Severity::Undefined;
        self.forced = false;
        self.payload.clear();
        self.args.clear();
        self.tag.clear();
        self.timestamp_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let record = LogRecord::new(Severity::Error, "failed {}")
            .with_args(["disk"])
            .with_tag("[user=42]")
            .with_timestamp(1_000);
        assert_eq!(record.severity, Severity::Error);
        assert_eq!(record.message(), "failed disk");
        assert_eq!(record.tag, "[user=42]");
        assert_eq!(record.timestamp_ms, 1_000);
    }

    #[test]
    fn test_pool_reset_leaves_no_residue() {
        let pool = RecordPool::new(4);
        let mut record = pool.checkout();
        record.severity = Severity::Alert;
        record.forced = true;
        record.payload.push_str("secret payload");
        record.args.push("arg".to_string());
        record.tag.push_str("[k=v]");
        record.timestamp_ms = 99;
        pool.give_back(record);

        let reissued = pool.checkout();
        assert_eq!(reissued, LogRecord::default());
        assert!(reissued.payload.capacity() >= "secret payload".len());
    }

    #[test]
    fn test_clone_into_pool_is_independent() {
        let pool = RecordPool::new(4);
        let original = LogRecord::new(Severity::Info, "hello").with_args(["a", "b"]);
        let mut copy = original.clone_into_pool(&pool);
        assert_eq!(copy, original);

        copy.args.push("c".to_string());
        assert_eq!(original.args.len(), 2);
    }
}
