//! # Rust Log Engine
//!
//! A multi-severity logging engine with per-thread tags and pluggable
//! output adapters.
//!
//! ## Features
//!
//! - **Severity Gating**: eight syslog-style severities, checked before any
//!   record is built
//! - **Tag Context**: ordered key/value annotations bound to the calling
//!   thread, with per-tag severity overrides
//! - **Rotating Files**: a background writer per file with line, size,
//!   daily and hourly rotation plus age-based retention
//! - **Pooled Records**: records and tags are recycled instead of
//!   reallocated on every call
//!
//! ## Example
//!
//! ```
//! use rust_log_engine::prelude::*;
//! use rust_log_engine::info;
//!
//! let ctx = LoggerContext::new();
//! ctx.setup(&Config::new().with("Log/Memory/Level", "Info"));
//!
//! ctx.current([("user", "42")]);
//! info!(ctx, "signed in from {}", "10.0.0.1");
//! ctx.release();
//! ```

pub mod adapters;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::adapters::{Adapter, ConsoleAdapter, FileAdapter, FileSettings, MemoryAdapter};
    pub use crate::core::{
        AdapterMetrics, Config, ConfigSection, LogAdapter, LogArg, LogRecord, LoggerContext,
        LoggerError, Result, Severity, Tag, TagHandle, TagPair,
    };
}

pub use crate::adapters::{Adapter, ConsoleAdapter, FileAdapter, FileSettings, MemoryAdapter};
pub use crate::core::{
    AdapterMetrics, Config, ConfigSection, LogAdapter, LogArg, LogRecord, LoggerContext,
    LoggerContextBuilder, LoggerError, Result, Severity, Tag, TagHandle, TagPair,
};
