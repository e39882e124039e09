//! Asynchronous rotating file adapter
//!
//! `write` only enqueues; one dedicated writer thread per adapter formats
//! records, owns the file handle and runs rotation and retention.
//!
//! ```text
//! Stopped --init--> Running --close--> Draining --join--> Stopped
//! ```

use super::rotation::{FileSettings, RotatingFile};
use crate::core::{
    format_line, AdapterEnv, AdapterMetrics, ConfigSection, LogAdapter, LogRecord, LoggerError,
    RecordPool, Result, Severity,
};
use crossbeam_channel::{bounded, unbounded, Receiver, SendError, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of a file adapter's writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdapterState {
    Stopped = 0,
    Running = 1,
    Draining = 2,
}

impl AdapterState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => AdapterState::Running,
            2 => AdapterState::Draining,
            _ => AdapterState::Stopped,
        }
    }
}

enum Command {
    Record(LogRecord),
    /// Write and sync everything queued before this marker, then acknowledge
    Flush(Sender<()>),
}

/// Rotating file output with a background writer
///
/// # Example
///
/// ```no_run
/// use rust_log_engine::adapters::{FileAdapter, FileSettings};
/// use rust_log_engine::core::{AdapterEnv, LogAdapter, LogRecord, Severity};
///
/// let adapter = FileAdapter::start(
///     "File",
///     AdapterEnv::default(),
///     FileSettings::new("logs/app.log").with_max_line(10_000),
/// )?;
/// adapter.write(LogRecord::new(Severity::Info, "service started"));
/// adapter.flush();
/// adapter.close();
/// # Ok::<(), rust_log_engine::LoggerError>(())
/// ```
pub struct FileAdapter {
    name: String,
    env: AdapterEnv,
    settings: FileSettings,
    sender: RwLock<Option<Sender<Command>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    state: AtomicU8,
    metrics: Arc<AdapterMetrics>,
}

impl FileAdapter {
    /// A stopped adapter; `init` configures and starts it
    pub fn new(name: impl Into<String>, env: AdapterEnv) -> Self {
        Self {
            name: name.into(),
            env,
            settings: FileSettings::default(),
            sender: RwLock::new(None),
            worker: Mutex::new(None),
            state: AtomicU8::new(AdapterState::Stopped as u8),
            metrics: Arc::new(AdapterMetrics::new()),
        }
    }

    /// Create and start an adapter without going through configuration
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be opened or the writer thread
    /// cannot be spawned
    pub fn start(name: impl Into<String>, env: AdapterEnv, settings: FileSettings) -> Result<Self> {
        let mut adapter = Self::new(name, env);
        adapter.settings = settings;
        adapter.spawn_writer()?;
        Ok(adapter)
    }

    pub fn settings(&self) -> &FileSettings {
        &self.settings
    }

    pub fn state(&self) -> AdapterState {
        AdapterState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Counters published by the writer thread
    pub fn metrics(&self) -> Arc<AdapterMetrics> {
        Arc::clone(&self.metrics)
    }

    fn spawn_writer(&mut self) -> Result<()> {
        let file = RotatingFile::open(
            self.settings.clone(),
            Arc::clone(&self.env.clock),
            Arc::clone(&self.env.fallback),
            Arc::clone(&self.metrics),
        )?;

        let (tx, rx) = unbounded();
        let pool = Arc::clone(&self.env.pool);
        let handle = thread::Builder::new()
            .name(format!("log-writer-{}", self.name))
            .spawn(move || run_writer(file, rx, pool))
            .map_err(|e| {
                LoggerError::io_operation(
                    "spawn writer thread",
                    format!("Failed to start writer for '{}'", self.settings.path.display()),
                    e,
                )
            })?;

        *self.sender.write() = Some(tx);
        *self.worker.lock() = Some(handle);
        self.state.store(AdapterState::Running as u8, Ordering::Release);
        Ok(())
    }
}

/// Writer thread body
///
/// Each cycle blocks for one command, then takes whatever else was queued at
/// that moment. The loop ends once every sender is gone and the queue is empty.
fn run_writer(mut file: RotatingFile, rx: Receiver<Command>, pool: Arc<RecordPool>) {
    while let Ok(first) = rx.recv() {
        let pending = rx.len();
        file.begin_cycle();

        for command in std::iter::once(first).chain(rx.try_iter().take(pending)) {
            match command {
                Command::Record(record) => {
                    let line = format_line(&record);
                    pool.give_back(record);
                    file.append_line(&line);
                }
                Command::Flush(ack) => {
                    file.end_cycle();
                    file.sync();
                    let _ = ack.send(());
                }
            }
        }

        file.end_cycle();
    }

    file.close();
}

impl LogAdapter for FileAdapter {
    fn init(&mut self, section: &ConfigSection<'_>) -> Severity {
        if self.state() != AdapterState::Stopped {
            self.close();
        }
        self.settings = FileSettings::from_section(section);

        match self.spawn_writer() {
            Ok(()) => self.settings.level,
            Err(e) => {
                self.env.report(&e);
                Severity::Undefined
            }
        }
    }

    fn write(&self, record: LogRecord) {
        let sender = self.sender.read();
        let Some(tx) = sender.as_ref() else {
            self.env.pool.give_back(record);
            return;
        };
        if let Err(SendError(Command::Record(record))) = tx.send(Command::Record(record)) {
            self.env.pool.give_back(record);
        }
    }

    fn flush(&self) {
        if self.state() != AdapterState::Running {
            return;
        }
        let (ack_tx, ack_rx) = bounded(1);
        {
            let sender = self.sender.read();
            let Some(tx) = sender.as_ref() else {
                return;
            };
            if tx.send(Command::Flush(ack_tx)).is_err() {
                return;
            }
        }
        // Err means the writer dropped the marker while exiting
        let _ = ack_rx.recv();
    }

    fn close(&self) {
        if self
            .state
            .compare_exchange(
                AdapterState::Running as u8,
                AdapterState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return;
        }

        // Producers holding the read lock finish their send first
        drop(self.sender.write().take());

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                self.env.report(&LoggerError::shutdown(
                    self.settings.path.display().to_string(),
                    "writer thread panicked",
                ));
            }
        }
        self.state.store(AdapterState::Stopped as u8, Ordering::Release);
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.settings.level
    }
}

impl Drop for FileAdapter {
    fn drop(&mut self) {
        self.close();
    }
}
