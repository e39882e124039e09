//! Error types for the logging engine

use std::sync::Arc;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Sink for the engine's own failures.
///
/// The file adapter never reports into the file it is failing to write;
/// everything it cannot handle locally goes here instead.
pub type FallbackHandler = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Fallback handler that prints to stderr
pub fn stderr_fallback() -> FallbackHandler {
    Arc::new(|err: &LoggerError| {
        eprintln!("[LOGGER ERROR] {}", err);
    })
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration document could not be parsed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unknown severity name
    #[error("Invalid severity: '{0}'")]
    InvalidSeverity(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// No adapter variant matches the configured name
    #[error("Unknown adapter '{0}'")]
    UnknownAdapter(String),

    /// File adapter error with path
    #[error("File adapter error for '{path}': {message}")]
    FileAdapterError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Every sequence number up to the configured maximum is taken
    #[error("File rotation exhausted for '{path}': no free sequence number up to {max_file}")]
    RotationExhausted { path: String, max_file: u32 },

    /// Failure while finalizing an adapter
    #[error("Shutdown of '{path}' failed: {message}")]
    ShutdownError { path: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file adapter error
    pub fn file_adapter(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAdapterError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn rotation_exhausted(path: impl Into<String>, max_file: u32) -> Self {
        LoggerError::RotationExhausted {
            path: path.into(),
            max_file,
        }
    }

    pub fn shutdown(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ShutdownError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("File", "MaxFile must be positive");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_adapter("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileAdapterError { .. }));

        let err = LoggerError::rotation_exhausted("/var/log/app.log", 3);
        assert!(matches!(err, LoggerError::RotationExhausted { max_file: 3, .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = LoggerError::rotation_exhausted("app.log", 100);
        assert_eq!(
            err.to_string(),
            "File rotation exhausted for 'app.log': no free sequence number up to 100"
        );

        let err = LoggerError::InvalidSeverity("loud".to_string());
        assert_eq!(err.to_string(), "Invalid severity: 'loud'");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }

    #[test]
    fn test_fallback_handler_receives_error() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        let handler: FallbackHandler = Arc::new(move |_err| {
            seen_clone.fetch_add(1, Ordering::Relaxed);
        });

        handler(&LoggerError::other("boom"));
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }
}
