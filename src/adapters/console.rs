//! Console adapter implementation

use crate::core::{
    format_line, format_line_colored, AdapterEnv, ConfigSection, LogAdapter, LogRecord, Severity,
};
use std::io::Write;

/// Settings read from a `Log/Std` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub level: Severity,
    pub color: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            level: Severity::Debug,
            color: true,
        }
    }
}

impl ConsoleSettings {
    pub fn from_section(section: &ConfigSection<'_>) -> Self {
        let defaults = Self::default();
        Self {
            level: section.get_severity("Level", defaults.level),
            color: section.get_bool("Color", defaults.color),
        }
    }
}

/// Synchronous stdout/stderr output
///
/// Emergency through Error go to stderr, everything else to stdout.
pub struct ConsoleAdapter {
    name: String,
    env: AdapterEnv,
    settings: ConsoleSettings,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>, env: AdapterEnv) -> Self {
        Self {
            name: name.into(),
            env,
            settings: ConsoleSettings::default(),
        }
    }

    /// Console adapter at `level` without reading configuration
    #[must_use]
    pub fn with_level(mut self, level: Severity) -> Self {
        self.settings.level = level;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, color: bool) -> Self {
        self.settings.color = color;
        self
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    /// Format `record` the way this adapter prints it
    pub fn render(&self, record: &LogRecord) -> String {
        if self.settings.color {
            format_line_colored(record)
        } else {
            format_line(record)
        }
    }
}

impl LogAdapter for ConsoleAdapter {
    fn init(&mut self, section: &ConfigSection<'_>) -> Severity {
        self.settings = ConsoleSettings::from_section(section);
        self.settings.level
    }

    fn write(&self, record: LogRecord) {
        let line = self.render(&record);
        if record.severity.is_error_or_worse() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
        self.env.pool.give_back(record);
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }

    fn close(&self) {}

    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.settings.level
    }
}
