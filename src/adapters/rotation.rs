//! Rotation engine for the file adapter
//!
//! This module provides:
//! - `FileSettings`: thresholds and retention windows read from `Log/File`
//! - `PathParts`: the active path split into directory, prefix and extension
//! - `RotatingFile`: the writer-owned handle, counters, rotation and
//!   retention sweep
//!
//! Rotated files are named `<prefix>.<time>.<seq:000><ext>` when daily or
//! hourly rotation is on, `<prefix>.<seq:000><ext>` otherwise; without a
//! prefix the leading `<prefix>.` is dropped.

use crate::core::clock::millis_to_local;
use crate::core::{
    AdapterMetrics, ConfigSection, FallbackHandler, LoggerError, Result, Severity, SharedClock,
};
use chrono::Timelike;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Configuration of one file adapter
///
/// A threshold of zero disables that trigger.
///
/// # Examples
///
/// ```
/// use rust_log_engine::adapters::FileSettings;
///
/// let settings = FileSettings::new("logs/app.log")
///     .with_max_line(1_000)
///     .with_daily(false);
/// assert!(!settings.time_based());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FileSettings {
    pub level: Severity,
    pub path: PathBuf,
    pub rotate: bool,
    pub daily: bool,
    pub max_day: u64,
    pub hourly: bool,
    pub max_hour: u64,
    pub max_file: u32,
    pub max_line: u64,
    pub max_size: u64,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            path: PathBuf::from(Self::DEFAULT_PATH),
            rotate: true,
            daily: true,
            max_day: 7,
            hourly: false,
            max_hour: 168,
            max_file: 100,
            max_line: 1_000_000,
            max_size: 128 * 1024 * 1024,
        }
    }
}

impl FileSettings {
    pub const DEFAULT_PATH: &'static str = "logs/app.log";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn from_section(section: &ConfigSection<'_>) -> Self {
        let d = Self::default();
        Self {
            level: section.get_severity("Level", d.level),
            path: PathBuf::from(section.get_str("Path", Self::DEFAULT_PATH)),
            rotate: section.get_bool("Rotate", d.rotate),
            daily: section.get_bool("Daily", d.daily),
            max_day: section.get_u64("MaxDay", d.max_day),
            hourly: section.get_bool("Hourly", d.hourly),
            max_hour: section.get_u64("MaxHour", d.max_hour),
            max_file: u32::try_from(section.get_u64("MaxFile", u64::from(d.max_file)))
                .unwrap_or(u32::MAX),
            max_line: section.get_u64("MaxLine", d.max_line),
            max_size: section.get_u64("MaxSize", d.max_size),
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rotate(mut self, rotate: bool) -> Self {
        self.rotate = rotate;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_daily(mut self, daily: bool) -> Self {
        self.daily = daily;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_hourly(mut self, hourly: bool) -> Self {
        self.hourly = hourly;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_day(mut self, days: u64) -> Self {
        self.max_day = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_hour(mut self, hours: u64) -> Self {
        self.max_hour = hours;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_file(mut self, count: u32) -> Self {
        self.max_file = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_line(mut self, lines: u64) -> Self {
        self.max_line = lines;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Daily or hourly rotation is on
    pub fn time_based(&self) -> bool {
        self.daily || self.hourly
    }

    /// strftime pattern for the time part of rotated names; hourly wins
    pub fn time_format(&self) -> Option<&'static str> {
        if self.hourly {
            Some("%Y-%m-%d-%H")
        } else if self.daily {
            Some("%Y-%m-%d")
        } else {
            None
        }
    }

    /// Age after which rotated files are deleted
    pub fn retention(&self) -> Option<Duration> {
        let ms = if self.hourly {
            self.max_hour.saturating_mul(MS_PER_HOUR)
        } else if self.daily {
            self.max_day.saturating_mul(MS_PER_DAY)
        } else {
            return None;
        };
        (ms > 0).then(|| Duration::from_millis(ms))
    }
}

/// The active path split for building rotated names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    pub dir: PathBuf,
    pub prefix: String,
    /// Extension including its leading dot, or empty
    pub ext: String,
}

impl PathParts {
    /// `logs/app.log` → (`logs`, `app`, `.log`); `logs/.log` → (`logs`, ``, `.log`)
    pub fn from_path(path: &Path) -> Self {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (prefix, ext) = match file_name.rfind('.') {
            Some(dot) => (file_name[..dot].to_string(), file_name[dot..].to_string()),
            None => (file_name, String::new()),
        };
        Self { dir, prefix, ext }
    }

    /// File name for sequence `seq`, with `time` when rotating by time
    pub fn rotated_name(&self, time: Option<&str>, seq: u32) -> String {
        match (self.prefix.is_empty(), time) {
            (false, Some(t)) => format!("{}.{}.{:03}{}", self.prefix, t, seq, self.ext),
            (false, None) => format!("{}.{:03}{}", self.prefix, seq, self.ext),
            (true, Some(t)) => format!("{}.{:03}{}", t, seq, self.ext),
            (true, None) => format!("{:03}{}", seq, self.ext),
        }
    }

    /// Does `name` look like a file produced by [`PathParts::rotated_name`]
    pub fn is_rotated_name(&self, name: &str) -> bool {
        let Some(core) = name.strip_suffix(self.ext.as_str()) else {
            return false;
        };
        let core = if self.prefix.is_empty() {
            core
        } else {
            match core
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
            {
                Some(rest) => rest,
                None => return false,
            }
        };
        match core.rsplit_once('.') {
            Some((time, seq)) => is_sequence(seq) && is_period(time),
            None => is_sequence(core),
        }
    }
}

fn is_sequence(s: &str) -> bool {
    s.len() >= 3 && s.bytes().all(|b| b.is_ascii_digit())
}

/// `YYYY-MM-DD` or `YYYY-MM-DD-HH`
fn is_period(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    let widths: &[usize] = match groups.len() {
        3 => &[4, 2, 2],
        4 => &[4, 2, 2, 2],
        _ => return false,
    };
    groups
        .iter()
        .zip(widths)
        .all(|(g, w)| g.len() == *w && g.bytes().all(|b| b.is_ascii_digit()))
}

/// The active log file as seen by the writer thread
///
/// Owns the handle, the pending buffer and the counters. Only the writer
/// thread touches it; the rest of the process reads the published
/// [`AdapterMetrics`].
pub struct RotatingFile {
    settings: FileSettings,
    parts: PathParts,
    file: Option<File>,
    buffer: Vec<u8>,
    /// Lines in `buffer` not yet written
    pending: u64,
    lines: u64,
    bytes: u64,
    sequence: u32,
    opened_ms: i64,
    last_period: Option<String>,
    clock: SharedClock,
    fallback: FallbackHandler,
    metrics: Arc<AdapterMetrics>,
}

impl RotatingFile {
    /// Open (or create) the active file
    ///
    /// # Errors
    ///
    /// Returns error if the directory or the file cannot be created
    pub fn open(
        settings: FileSettings,
        clock: SharedClock,
        fallback: FallbackHandler,
        metrics: Arc<AdapterMetrics>,
    ) -> Result<Self> {
        let parts = PathParts::from_path(&settings.path);
        fs::create_dir_all(&parts.dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parts.dir.display()),
                e,
            )
        })?;

        let file = open_append(&settings.path)?;
        let now = clock.now_millis();
        let (bytes, opened_ms) = match file.metadata() {
            Ok(meta) if meta.len() > 0 => {
                // An existing file belongs to the period it was last written in
                let modified = meta.modified().ok().and_then(system_time_millis).unwrap_or(now);
                (meta.len(), modified.min(now))
            }
            _ => (0, now),
        };

        let rotating = Self {
            settings,
            parts,
            file: Some(file),
            buffer: Vec::with_capacity(8 * 1024),
            pending: 0,
            lines: 0,
            bytes,
            sequence: 0,
            opened_ms,
            last_period: None,
            clock,
            fallback,
            metrics,
        };
        rotating.publish();
        Ok(rotating)
    }

    pub fn path(&self) -> &Path {
        &self.settings.path
    }

    pub fn settings(&self) -> &FileSettings {
        &self.settings
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Start of a drain cycle: close out the previous period before any of
    /// this cycle's records land in its file
    pub fn begin_cycle(&mut self) {
        self.roll_period();
    }

    /// Buffer one formatted line; writes and rotates as soon as a line or
    /// size threshold is reached
    pub fn append_line(&mut self, line: &str) {
        self.buffer.extend_from_slice(line.as_bytes());
        self.buffer.push(b'\n');
        self.lines += 1;
        self.bytes += line.len() as u64 + 1;
        self.pending += 1;

        if self.settings.rotate && self.count_limit_reached() {
            self.write_buffer();
            self.rotate();
        }
    }

    /// End of a drain cycle: one physical write, then a threshold check
    pub fn end_cycle(&mut self) {
        self.write_buffer();
        if self.settings.rotate && self.count_limit_reached() {
            self.rotate();
        } else {
            self.roll_period();
        }
    }

    /// Rotate on a period change; an empty active file just moves into the
    /// new period
    fn roll_period(&mut self) {
        let now = self.clock.now_millis();
        if !self.settings.rotate || !self.period_changed(now) {
            return;
        }
        if self.bytes > 0 {
            self.rotate();
        } else {
            self.opened_ms = now;
        }
    }

    /// Write pending lines and push them to durable storage
    pub fn sync(&mut self) {
        self.write_buffer();
        if let Some(file) = self.file.as_mut() {
            let result = file.flush().and_then(|_| file.sync_data());
            if let Err(e) = result {
                self.metrics.record_write_error();
                self.report(LoggerError::file_adapter(
                    self.settings.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                ));
            }
        }
    }

    /// Final flush and handle release
    pub fn close(&mut self) {
        self.write_buffer();
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush().and_then(|_| file.sync_all()) {
                self.report(LoggerError::shutdown(
                    self.settings.path.display().to_string(),
                    e.to_string(),
                ));
            }
        }
    }

    fn count_limit_reached(&self) -> bool {
        (self.settings.max_line > 0 && self.lines >= self.settings.max_line)
            || (self.settings.max_size > 0 && self.bytes >= self.settings.max_size)
    }

    fn period_changed(&self, now_ms: i64) -> bool {
        if !self.settings.time_based() {
            return false;
        }
        let now = millis_to_local(now_ms);
        let opened = millis_to_local(self.opened_ms);
        if now.date_naive() != opened.date_naive() {
            return true;
        }
        self.settings.hourly && now.hour() != opened.hour()
    }

    /// One physical write of everything buffered
    fn write_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        if self.file.is_none() {
            self.reopen();
        }
        let pending = std::mem::take(&mut self.pending);
        let Some(file) = self.file.as_mut() else {
            // Still no handle: the buffered lines are lost, the writer goes on
            self.metrics.record_write_error();
            self.buffer.clear();
            return;
        };
        match file.write_all(&self.buffer) {
            Ok(()) => {
                self.metrics.record_written(pending);
            }
            Err(e) => {
                self.metrics.record_write_error();
                self.report(LoggerError::file_adapter(
                    self.settings.path.display().to_string(),
                    format!("Failed to write log entries: {}", e),
                ));
            }
        }
        self.buffer.clear();
        self.publish();
    }

    /// Move the active file aside, reopen a fresh one and sweep old files
    ///
    /// Never fails: problems are reported and logging continues at the
    /// original path.
    pub fn rotate(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.sync_all() {
                self.report(LoggerError::file_rotation(
                    self.settings.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                ));
            }
        }

        let now = self.clock.now_millis();
        let period = self
            .settings
            .time_format()
            .map(|f| millis_to_local(self.opened_ms).format(f).to_string());
        if period != self.last_period {
            self.sequence = 0;
            self.last_period = period.clone();
        }

        match self.next_free_sequence(period.as_deref()) {
            Some((seq, target)) => match fs::rename(&self.settings.path, &target) {
                Ok(()) => {
                    self.sequence = seq;
                    self.metrics.record_rotation();
                }
                Err(e) => {
                    self.metrics.record_rotation_failure();
                    self.report(LoggerError::file_rotation(
                        self.settings.path.display().to_string(),
                        format!("Failed to move to '{}': {}", target.display(), e),
                    ));
                }
            },
            None => {
                self.metrics.record_rotation_failure();
                self.report(LoggerError::rotation_exhausted(
                    self.settings.path.display().to_string(),
                    self.settings.max_file,
                ));
            }
        }

        // On failure the same file keeps growing; resetting the counters
        // keeps us from retrying on every line.
        self.lines = 0;
        self.bytes = 0;
        self.opened_ms = now;
        self.reopen();
        self.publish();
        self.sweep(now);
    }

    fn next_free_sequence(&self, period: Option<&str>) -> Option<(u32, PathBuf)> {
        let start = self.sequence.checked_add(1)?;
        (start..=self.settings.max_file).find_map(|seq| {
            let candidate = self.parts.dir.join(self.parts.rotated_name(period, seq));
            (!candidate.exists()).then_some((seq, candidate))
        })
    }

    fn reopen(&mut self) {
        match open_append(&self.settings.path) {
            Ok(file) => self.file = Some(file),
            Err(e) => {
                self.file = None;
                self.report(e);
            }
        }
    }

    /// Delete rotated files older than the retention window
    pub fn sweep(&self, now_ms: i64) {
        let Some(window) = self.settings.retention() else {
            return;
        };
        let cutoff_ms = now_ms.saturating_sub(window.as_millis() as i64);
        let cutoff = match u64::try_from(cutoff_ms) {
            Ok(ms) => UNIX_EPOCH + Duration::from_millis(ms),
            Err(_) => return,
        };

        let entries = match fs::read_dir(&self.parts.dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.report(LoggerError::io_operation(
                    "retention sweep",
                    format!("Failed to list '{}'", self.parts.dir.display()),
                    e,
                ));
                return;
            }
        };

        let active = self.settings.path.file_name();
        for entry in entries.flatten() {
            let name = entry.file_name();
            if Some(name.as_os_str()) == active {
                continue;
            }
            let Some(name) = name.to_str() else {
                continue;
            };
            if !self.parts.is_rotated_name(name) {
                continue;
            }
            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(_) => continue,
            };
            if modified >= cutoff {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    self.metrics.record_deleted();
                }
                Err(e) => self.report(LoggerError::io_operation(
                    "retention sweep",
                    format!("Failed to remove '{}'", entry.path().display()),
                    e,
                )),
            }
        }
    }

    fn publish(&self) {
        self.metrics.set_position(self.lines, self.bytes, self.sequence);
    }

    fn report(&self, err: LoggerError) {
        (self.fallback)(&err);
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggerError::file_adapter(path.display().to_string(), format!("Failed to open: {}", e)))
}

fn system_time_millis(time: SystemTime) -> Option<i64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
}
