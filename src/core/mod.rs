//! Core engine types and traits

pub mod adapter;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod metrics;
pub mod pool;
pub mod record;
pub mod severity;
pub mod tag;

pub use adapter::{AdapterEnv, LogAdapter};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{Config, ConfigSection};
pub use context::{Gate, LogArg, LoggerContext, LoggerContextBuilder};
pub use error::{stderr_fallback, FallbackHandler, LoggerError, Result};
pub use format::{format_line, format_line_colored, format_timestamp, render_message, sanitize};
pub use metrics::AdapterMetrics;
pub use pool::{Pool, Poolable};
pub use record::{LogRecord, RecordPool};
pub use severity::Severity;
pub use tag::{Tag, TagHandle, TagPair, TagRegistry};
