//! Logging macros for ergonomic log message formatting.
//!
//! Every macro gates first and only runs `format!` when the call will
//! produce a record, so disabled calls cost one atomic load and a tag
//! lookup.
//!
//! # Examples
//!
//! ```
//! use rust_log_engine::prelude::*;
//! use rust_log_engine::{info, warning};
//!
//! let ctx = LoggerContext::new();
//! ctx.setup(&Config::new().with("Log/Memory/Level", "Debug"));
//!
//! // Basic logging
//! info!(ctx, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(ctx, "Server listening on port {}", port);
//!
//! // With an explicit tag
//! let tag = Tag::from_pairs([("conn", "7")]);
//! warning!(ctx, tag = tag, "slow handshake: {} ms", 950);
//! ```

/// Log a message at an explicit severity.
///
/// # Examples
///
/// ```
/// # use rust_log_engine::prelude::*;
/// # let ctx = LoggerContext::new();
/// # ctx.setup(&Config::new().with("Log/Memory/Level", "Debug"));
/// use rust_log_engine::log;
/// log!(ctx, Severity::Info, "Simple message");
/// log!(ctx, Severity::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($ctx:expr, tag = $tag:expr, $severity:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        let severity = $severity;
        let gate = ctx.gate(severity, ::std::vec![$crate::core::LogArg::from(&$tag)]);
        if gate.able {
            let message = ::std::format!($($arg)+);
            ctx.print(severity, gate.forced, gate.tag.as_deref(), Some(message.as_str()), &[]);
        }
    }};
    ($ctx:expr, $severity:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        let severity = $severity;
        let gate = ctx.gate(severity, ::std::vec::Vec::new());
        if gate.able {
            let message = ::std::format!($($arg)+);
            ctx.print(severity, gate.forced, gate.tag.as_deref(), Some(message.as_str()), &[]);
        }
    }};
}

/// Log an emergency-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_engine::prelude::*;
/// # let ctx = LoggerContext::new();
/// # ctx.setup(&Config::new().with("Log/Memory/Level", "Debug"));
/// use rust_log_engine::emergency;
/// emergency!(ctx, "Storage unavailable");
/// ```
#[macro_export]
macro_rules! emergency {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $crate::log!($ctx, tag = $tag, $crate::Severity::Emergency, $($arg)+)
    };
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::Severity::Emergency, $($arg)+)
    };
}

/// Log an alert-level message.
#[macro_export]
macro_rules! alert {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $crate::log!($ctx, tag = $tag, $crate::Severity::Alert, $($arg)+)
    };
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::Severity::Alert, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $crate::log!($ctx, tag = $tag, $crate::Severity::Critical, $($arg)+)
    };
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::Severity::Critical, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_engine::prelude::*;
/// # let ctx = LoggerContext::new();
/// # ctx.setup(&Config::new().with("Log/Memory/Level", "Debug"));
/// use rust_log_engine::error;
/// error!(ctx, "Failed to connect to database");
/// error!(ctx, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! error {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $crate::log!($ctx, tag = $tag, $crate::Severity::Error, $($arg)+)
    };
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::Severity::Error, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_engine::prelude::*;
/// # let ctx = LoggerContext::new();
/// # ctx.setup(&Config::new().with("Log/Memory/Level", "Debug"));
/// use rust_log_engine::warning;
/// warning!(ctx, "Low disk space");
/// warning!(ctx, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $crate::log!($ctx, tag = $tag, $crate::Severity::Warning, $($arg)+)
    };
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::Severity::Warning, $($arg)+)
    };
}

/// Log a notice-level message.
#[macro_export]
macro_rules! notice {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $crate::log!($ctx, tag = $tag, $crate::Severity::Notice, $($arg)+)
    };
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::Severity::Notice, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_engine::prelude::*;
/// # let ctx = LoggerContext::new();
/// # ctx.setup(&Config::new().with("Log/Memory/Level", "Debug"));
/// use rust_log_engine::info;
/// info!(ctx, "Application started");
/// info!(ctx, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $crate::log!($ctx, tag = $tag, $crate::Severity::Info, $($arg)+)
    };
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::Severity::Info, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($ctx:expr, tag = $tag:expr, $($arg:tt)+) => {
        $crate::log!($ctx, tag = $tag, $crate::Severity::Debug, $($arg)+)
    };
    ($ctx:expr, $($arg:tt)+) => {
        $crate::log!($ctx, $crate::Severity::Debug, $($arg)+)
    };
}
