//! Adapter implementations
//!
//! The set of destinations is closed: [`Adapter`] is the only type the
//! dispatcher stores, and it forwards to one of the concrete variants.

pub mod console;
pub mod file;
pub mod memory;
pub mod rotation;

pub use console::{ConsoleAdapter, ConsoleSettings};
pub use file::{AdapterState, FileAdapter};
pub use memory::MemoryAdapter;
pub use rotation::{FileSettings, PathParts, RotatingFile};

pub use crate::core::LogAdapter;

use crate::core::{AdapterEnv, ConfigSection, LogRecord, LoggerError, Result, Severity};

/// Every output destination the engine knows about
pub enum Adapter {
    Console(ConsoleAdapter),
    File(FileAdapter),
    Memory(MemoryAdapter),
}

impl Adapter {
    /// Build an unconfigured adapter from a kind name
    ///
    /// Accepts `Std`/`Console`, `File` and `Memory`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::UnknownAdapter`] for any other name
    pub fn from_kind(kind: &str, name: &str, env: AdapterEnv) -> Result<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "std" | "console" | "stdout" => Ok(Adapter::Console(ConsoleAdapter::new(name, env))),
            "file" => Ok(Adapter::File(FileAdapter::new(name, env))),
            "memory" => Ok(Adapter::Memory(MemoryAdapter::new(name, env))),
            _ => Err(LoggerError::UnknownAdapter(kind.to_string())),
        }
    }

    /// Build from a `Log/<Name>` section: the `Type` key wins over the name
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::UnknownAdapter`] when neither names a variant
    pub fn from_section(section: &ConfigSection<'_>, env: AdapterEnv) -> Result<Self> {
        let kind = section.get_str("Type", section.name());
        Self::from_kind(&kind, section.name(), env)
    }

    pub fn is_console(&self) -> bool {
        matches!(self, Adapter::Console(_))
    }

    fn inner(&self) -> &dyn LogAdapter {
        match self {
            Adapter::Console(a) => a,
            Adapter::File(a) => a,
            Adapter::Memory(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn LogAdapter {
        match self {
            Adapter::Console(a) => a,
            Adapter::File(a) => a,
            Adapter::Memory(a) => a,
        }
    }
}

impl LogAdapter for Adapter {
    fn init(&mut self, section: &ConfigSection<'_>) -> Severity {
        self.inner_mut().init(section)
    }

    fn write(&self, record: LogRecord) {
        self.inner().write(record)
    }

    fn flush(&self) {
        self.inner().flush()
    }

    fn close(&self) {
        self.inner().close()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn severity(&self) -> Severity {
        self.inner().severity()
    }
}

impl From<ConsoleAdapter> for Adapter {
    fn from(adapter: ConsoleAdapter) -> Self {
        Adapter::Console(adapter)
    }
}

impl From<FileAdapter> for Adapter {
    fn from(adapter: FileAdapter) -> Self {
        Adapter::File(adapter)
    }
}

impl From<MemoryAdapter> for Adapter {
    fn from(adapter: MemoryAdapter) -> Self {
        Adapter::Memory(adapter)
    }
}
