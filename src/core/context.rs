//! The dispatcher: adapter registry, severity gating and fan-out
//!
//! A [`LoggerContext`] is an explicit value. Create one, call
//! [`LoggerContext::setup`] with a configuration, and share it by reference
//! (or behind an `Arc`) with every thread that logs.

use super::adapter::{AdapterEnv, LogAdapter};
use super::clock::{SharedClock, SystemClock};
use super::config::{Config, ConfigSection};
use super::error::{stderr_fallback, FallbackHandler, LoggerError};
use super::pool::Pool;
use super::record::RecordPool;
use super::severity::Severity;
use super::tag::{Tag, TagHandle, TagPair, TagRegistry};
use crate::adapters::{Adapter, ConsoleAdapter};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI8, Ordering};
use std::sync::Arc;

/// One argument of a log call
///
/// A leading `Tag` becomes the call's tag; every other argument is
/// substituted into the payload's placeholders.
#[derive(Debug, Clone)]
pub enum LogArg {
    Tag(TagHandle),
    Value(String),
}

impl LogArg {
    pub fn value(value: impl fmt::Display) -> Self {
        LogArg::Value(value.to_string())
    }

    fn into_text(self) -> String {
        match self {
            LogArg::Value(s) => s,
            LogArg::Tag(tag) => tag.text().to_string(),
        }
    }
}

impl From<TagHandle> for LogArg {
    fn from(tag: TagHandle) -> Self {
        LogArg::Tag(tag)
    }
}

impl From<&TagHandle> for LogArg {
    fn from(tag: &TagHandle) -> Self {
        LogArg::Tag(Arc::clone(tag))
    }
}

impl From<String> for LogArg {
    fn from(value: String) -> Self {
        LogArg::Value(value)
    }
}

impl From<&String> for LogArg {
    fn from(value: &String) -> Self {
        LogArg::Value(value.clone())
    }
}

impl From<&str> for LogArg {
    fn from(value: &str) -> Self {
        LogArg::Value(value.to_string())
    }
}

macro_rules! log_arg_from_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for LogArg {
                fn from(value: $t) -> Self {
                    LogArg::Value(value.to_string())
                }
            }
        )*
    };
}

log_arg_from_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
);

/// Outcome of gating one call
#[derive(Debug, Clone)]
pub struct Gate {
    /// The call should produce a record
    pub able: bool,
    /// The record bypasses per-adapter levels
    pub forced: bool,
    pub tag: Option<TagHandle>,
    pub args: Vec<String>,
}

/// Registry of adapters plus the per-thread tag context
///
/// # Example
///
/// ```
/// use rust_log_engine::adapters::MemoryAdapter;
/// use rust_log_engine::core::{Config, LogAdapter, LoggerContext, Severity};
///
/// let ctx = LoggerContext::new();
/// let memory = MemoryAdapter::new("Memory", ctx.env());
/// let captured = memory.clone();
/// ctx.register(memory, &Config::new().with("Log/Memory/Level", "Info").section("Log/Memory"));
///
/// ctx.info("service ready");
/// ctx.debug("filtered out");
/// assert_eq!(captured.len(), 1);
/// ```
pub struct LoggerContext {
    adapters: RwLock<Vec<Adapter>>,
    ceiling: AtomicI8,
    interactive: AtomicBool,
    tags: TagRegistry,
    env: AdapterEnv,
    /// Receives records while no adapter is registered
    console: ConsoleAdapter,
}

impl LoggerContext {
    /// A context with no adapters; calls up to Debug go to the console
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LoggerContextBuilder {
        LoggerContextBuilder::new()
    }

    /// Services handed to adapters built for this context
    pub fn env(&self) -> AdapterEnv {
        self.env.clone()
    }

    pub fn record_pool(&self) -> &RecordPool {
        &self.env.pool
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// (Re)build the adapter registry from the `Log` section of `config`
    ///
    /// Existing adapters are flushed and closed first. Each child of `Log`
    /// becomes one adapter, chosen by its `Type` key or its own name.
    pub fn setup(&self, config: &Config) {
        let mut adapters = self.adapters.write();
        shutdown_all(&mut adapters);

        let log = config.section("Log");
        for section in log.children() {
            match Adapter::from_section(&section, self.env.clone()) {
                Ok(adapter) => {
                    self.install(&mut adapters, adapter, &section);
                }
                Err(e) => self.env.report(&e),
            }
        }

        let wants_console = self.is_interactive() && !adapters.iter().any(Adapter::is_console);
        if adapters.is_empty() || wants_console {
            adapters.push(Adapter::Console(
                ConsoleAdapter::new("Std", self.env.clone()).with_level(Severity::Debug),
            ));
        }

        self.ceiling.store(loosest(&adapters).as_i8(), Ordering::Release);
    }

    /// Initialize `adapter` from `section` and add it to the registry
    ///
    /// Returns the level the adapter reported; an adapter that reports
    /// `Undefined` is closed and not registered.
    pub fn register(&self, adapter: impl Into<Adapter>, section: &ConfigSection<'_>) -> Severity {
        let mut adapters = self.adapters.write();
        let level = self.install(&mut adapters, adapter.into(), section);
        self.ceiling.store(loosest(&adapters).as_i8(), Ordering::Release);
        level
    }

    /// Register an adapter of kind `kind` named after `section`
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::UnknownAdapter`] if `kind` names no variant
    pub fn register_kind(
        &self,
        kind: &str,
        section: &ConfigSection<'_>,
    ) -> super::Result<Severity> {
        let adapter = Adapter::from_kind(kind, section.name(), self.env.clone())?;
        Ok(self.register(adapter, section))
    }

    /// Add an already configured adapter as is
    pub fn attach(&self, adapter: impl Into<Adapter>) {
        let mut adapters = self.adapters.write();
        adapters.push(adapter.into());
        self.ceiling.store(loosest(&adapters).as_i8(), Ordering::Release);
    }

    fn install(
        &self,
        adapters: &mut Vec<Adapter>,
        mut adapter: Adapter,
        section: &ConfigSection<'_>,
    ) -> Severity {
        let level = adapter.init(section);
        if level.is_defined() {
            adapters.push(adapter);
        } else {
            self.env.report(&LoggerError::config(
                section.name(),
                "adapter reported no usable level and was skipped",
            ));
            adapter.close();
        }
        level
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.read().len()
    }

    pub fn adapter_names(&self) -> Vec<String> {
        self.adapters
            .read()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Flush every adapter; the registry is kept
    pub fn flush(&self) {
        for adapter in self.adapters.read().iter() {
            adapter.flush();
        }
    }

    /// Close every adapter and empty the registry
    pub fn close(&self) {
        let mut adapters = self.adapters.write();
        if adapters.is_empty() {
            return;
        }
        for adapter in adapters.iter() {
            adapter.close();
        }
        adapters.clear();
    }

    /// Loosest severity any registered adapter accepts
    pub fn effective_severity(&self) -> Severity {
        Severity::from_i8(self.ceiling.load(Ordering::Acquire))
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive.load(Ordering::Acquire)
    }

    /// Interactive mode lets every call through and forces it past adapter levels
    pub fn set_interactive(&self, on: bool) {
        self.interactive.store(on, Ordering::Release);
    }

    /// Decide whether a call at `severity` produces a record
    pub fn gate(&self, severity: Severity, args: Vec<LogArg>) -> Gate {
        let mut args = args.into_iter().peekable();
        let tag = match args.next_if(|a| matches!(a, LogArg::Tag(_))) {
            Some(LogArg::Tag(tag)) => Some(tag),
            _ => self.tags.ambient(),
        };
        let args: Vec<String> = args.map(LogArg::into_text).collect();

        let override_level = tag
            .as_ref()
            .map(|t| t.severity())
            .filter(|s| s.is_defined());

        let (able, forced) = if self.is_interactive() {
            (true, true)
        } else if let Some(level) = override_level {
            (severity.passes(level), true)
        } else {
            (severity.passes(self.effective_severity()), false)
        };

        Gate {
            able,
            forced,
            tag,
            args,
        }
    }

    /// Build a record and hand a copy to every adapter that accepts it
    ///
    /// Does nothing when `payload` is `None`.
    pub fn print(
        &self,
        severity: Severity,
        forced: bool,
        tag: Option<&Tag>,
        payload: Option<&str>,
        args: &[String],
    ) {
        let Some(payload) = payload else {
            return;
        };

        let mut record = self.env.pool.checkout();
        record.severity = severity;
        record.forced = forced;
        record.payload.push_str(payload);
        record.args.extend(args.iter().cloned());
        if let Some(tag) = tag {
            record.tag.push_str(&tag.text());
        }
        record.timestamp_ms = self.env.clock.now_millis();

        let adapters = self.adapters.read();
        if adapters.is_empty() {
            if self.console.accepts(&record) {
                self.console.write(record);
            } else {
                self.env.pool.give_back(record);
            }
            return;
        }

        for adapter in adapters.iter() {
            if !adapter.accepts(&record) {
                continue;
            }
            let copy = record.clone_into_pool(&self.env.pool);
            let result =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| adapter.write(copy)));
            if let Err(panic_info) = result {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                self.env.report(&LoggerError::other(format!(
                    "Adapter '{}' panicked: {}. Other adapters continue to function.",
                    adapter.name(),
                    panic_msg
                )));
            }
        }
        self.env.pool.give_back(record);
    }

    /// Gate and print in one step
    pub fn log(&self, severity: Severity, payload: &str, args: Vec<LogArg>) {
        let gate = self.gate(severity, args);
        if gate.able {
            self.print(
                severity,
                gate.forced,
                gate.tag.as_deref(),
                Some(payload),
                &gate.args,
            );
        }
    }

    pub fn emergency(&self, message: &str) {
        self.log(Severity::Emergency, message, Vec::new());
    }

    pub fn alert(&self, message: &str) {
        self.log(Severity::Alert, message, Vec::new());
    }

    pub fn critical(&self, message: &str) {
        self.log(Severity::Critical, message, Vec::new());
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message, Vec::new());
    }

    pub fn warning(&self, message: &str) {
        self.log(Severity::Warning, message, Vec::new());
    }

    pub fn notice(&self, message: &str) {
        self.log(Severity::Notice, message, Vec::new());
    }

    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message, Vec::new());
    }

    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message, Vec::new());
    }

    /// Bind `tag` (or a fresh one) to the calling thread
    pub fn associate(&self, tag: Option<TagHandle>) -> TagHandle {
        self.tags.associate(tag)
    }

    /// The calling thread's tag, created if needed, with `pairs` applied
    pub fn current<I, P>(&self, pairs: I) -> TagHandle
    where
        I: IntoIterator<Item = P>,
        P: Into<TagPair>,
    {
        let tag = self.tags.associate(None);
        tag.apply(pairs);
        tag
    }

    /// Detach the calling thread's tag
    pub fn release(&self) {
        self.tags.release();
    }

    /// A pooled tag that is not bound to any thread
    pub fn create_tag<I, P>(&self, pairs: I) -> TagHandle
    where
        I: IntoIterator<Item = P>,
        P: Into<TagPair>,
    {
        let tag = self.tags.create();
        tag.apply(pairs);
        tag
    }
}

impl Default for LoggerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LoggerContext {
    fn drop(&mut self) {
        self.close();
        self.tags.clear();
    }
}

fn shutdown_all(adapters: &mut Vec<Adapter>) {
    for adapter in adapters.iter() {
        adapter.flush();
    }
    for adapter in adapters.iter() {
        adapter.close();
    }
    adapters.clear();
}

fn loosest(adapters: &[Adapter]) -> Severity {
    adapters
        .iter()
        .map(LogAdapter::severity)
        .max()
        .unwrap_or(Severity::Debug)
}

/// Builder for [`LoggerContext`]
///
/// # Example
///
/// ```
/// use rust_log_engine::core::{LoggerContext, LoggerError, ManualClock};
/// use std::sync::Arc;
///
/// let ctx = LoggerContext::builder()
///     .clock(Arc::new(ManualClock::new(0)))
///     .record_pool_capacity(64)
///     .fallback(Arc::new(|err: &LoggerError| eprintln!("logging failed: {}", err)))
///     .build();
/// assert!(!ctx.is_interactive());
/// ```
pub struct LoggerContextBuilder {
    clock: SharedClock,
    fallback: FallbackHandler,
    record_pool_capacity: usize,
    tag_pool_capacity: usize,
    interactive: bool,
}

impl LoggerContextBuilder {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            fallback: stderr_fallback(),
            record_pool_capacity: RecordPool::DEFAULT_CAPACITY,
            tag_pool_capacity: Pool::<TagHandle>::DEFAULT_CAPACITY,
            interactive: false,
        }
    }

    #[must_use]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Where the engine reports its own failures
    #[must_use]
    pub fn fallback(mut self, fallback: FallbackHandler) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn record_pool_capacity(mut self, capacity: usize) -> Self {
        self.record_pool_capacity = capacity;
        self
    }

    #[must_use]
    pub fn tag_pool_capacity(mut self, capacity: usize) -> Self {
        self.tag_pool_capacity = capacity;
        self
    }

    #[must_use]
    pub fn interactive(mut self, on: bool) -> Self {
        self.interactive = on;
        self
    }

    pub fn build(self) -> LoggerContext {
        let env = AdapterEnv::new(
            Arc::new(RecordPool::new(self.record_pool_capacity)),
            self.clock,
            self.fallback,
        );
        LoggerContext {
            adapters: RwLock::new(Vec::new()),
            ceiling: AtomicI8::new(Severity::Debug.as_i8()),
            interactive: AtomicBool::new(self.interactive),
            tags: TagRegistry::new(self.tag_pool_capacity),
            console: ConsoleAdapter::new("Std", env.clone()).with_level(Severity::Debug),
            env,
        }
    }
}

impl Default for LoggerContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryAdapter;
    use crate::core::ManualClock;
    use parking_lot::Mutex;

    fn with_memory(level: &str) -> (LoggerContext, MemoryAdapter) {
        let ctx = LoggerContext::new();
        let memory = MemoryAdapter::new("Memory", ctx.env());
        let handle = memory.clone();
        let config = Config::new().with("Log/Memory/Level", level);
        ctx.register(memory, &config.section("Log/Memory"));
        (ctx, handle)
    }

    #[test]
    fn test_gating_against_ceiling() {
        let (ctx, memory) = with_memory("Warning");
        assert_eq!(ctx.effective_severity(), Severity::Warning);

        ctx.error("kept");
        ctx.warning("kept too");
        ctx.notice("dropped");
        ctx.debug("dropped");
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_gate_extracts_leading_tag() {
        let ctx = LoggerContext::new();
        let tag = ctx.create_tag([("user", "42")]);
        let gate = ctx.gate(
            Severity::Info,
            vec![LogArg::from(&tag), LogArg::from(7), LogArg::from("x")],
        );
        assert!(gate.able);
        assert!(!gate.forced);
        assert!(Arc::ptr_eq(gate.tag.as_ref().unwrap(), &tag));
        assert_eq!(gate.args, ["7", "x"]);
    }

    #[test]
    fn test_tag_override_forces_through_adapter_levels() {
        let (ctx, memory) = with_memory("Error");
        let tag = ctx.create_tag([("trace", "on")]);
        tag.set_severity(Severity::Debug);

        let gate = ctx.gate(Severity::Debug, vec![LogArg::from(&tag)]);
        assert!(gate.able && gate.forced);

        ctx.log(Severity::Debug, "deep detail", vec![LogArg::from(&tag)]);
        let lines = memory.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("[D] [trace=on] deep detail"));

        // An override can also narrow
        tag.set_severity(Severity::Critical);
        assert!(!ctx.gate(Severity::Error, vec![LogArg::from(&tag)]).able);
    }

    #[test]
    fn test_ambient_tag_is_used() {
        let (ctx, memory) = with_memory("Debug");
        ctx.current([("request", "abc")]);
        ctx.info("handled");
        ctx.release();
        ctx.info("untagged");

        let lines = memory.lines();
        assert!(lines[0].ends_with("[I] [request=abc] handled"));
        assert!(lines[1].ends_with("[I] untagged"));
    }

    #[test]
    fn test_interactive_mode_forces_everything() {
        let (ctx, memory) = with_memory("Emergency");
        ctx.set_interactive(true);
        ctx.debug("visible");
        assert_eq!(memory.len(), 1);

        ctx.set_interactive(false);
        ctx.debug("hidden");
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_print_without_payload_is_noop() {
        let (ctx, memory) = with_memory("Debug");
        ctx.print(Severity::Error, false, None, None, &[]);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_records_return_to_pool() {
        let (ctx, _memory) = with_memory("Debug");
        ctx.info("one");
        // The template record and the adapter's copy both came back
        assert_eq!(ctx.record_pool().available(), 2);
        ctx.info("two");
        assert_eq!(ctx.record_pool().available(), 2);
    }

    #[test]
    fn test_setup_builds_adapters_in_order() {
        let ctx = LoggerContext::new();
        let config = Config::new()
            .with("Log/Capture/Type", "Memory")
            .with("Log/Capture/Level", "Notice")
            .with("Log/Std/Level", "Error");
        ctx.setup(&config);

        assert_eq!(ctx.adapter_names(), ["Capture", "Std"]);
        assert_eq!(ctx.effective_severity(), Severity::Notice);
    }

    #[test]
    fn test_setup_skips_unknown_adapters_and_installs_default() {
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        let ctx = LoggerContext::builder()
            .fallback(Arc::new(move |e: &LoggerError| sink.lock().push(e.to_string())))
            .build();

        ctx.setup(&Config::new().with("Log/Syslog/Level", "Info"));

        assert_eq!(ctx.adapter_names(), ["Std"]);
        assert_eq!(ctx.effective_severity(), Severity::Debug);
        assert!(reported.lock()[0].contains("Syslog"));
    }

    #[test]
    fn test_interactive_setup_adds_console() {
        let ctx = LoggerContext::builder().interactive(true).build();
        ctx.setup(&Config::new().with("Log/Memory/Level", "Error"));
        assert_eq!(ctx.adapter_names(), ["Memory", "Std"]);
    }

    #[test]
    fn test_setup_twice_replaces_registry() {
        let ctx = LoggerContext::new();
        let memory = MemoryAdapter::new("Old", ctx.env());
        let old = memory.clone();
        ctx.attach(memory);

        ctx.setup(&Config::new().with("Log/Memory/Level", "Info"));
        assert_eq!(old.flush_count(), 1);
        assert_eq!(old.close_count(), 1);
        assert_eq!(ctx.adapter_names(), ["Memory"]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let (ctx, memory) = with_memory("Debug");
        ctx.close();
        ctx.close();
        assert_eq!(memory.close_count(), 1);
        assert_eq!(ctx.adapter_count(), 0);
    }

    #[test]
    fn test_adapter_level_filters_per_adapter() {
        let ctx = LoggerContext::new();
        let loud = MemoryAdapter::new("Loud", ctx.env()).with_level(Severity::Debug);
        let quiet = MemoryAdapter::new("Quiet", ctx.env()).with_level(Severity::Error);
        let (loud_lines, quiet_lines) = (loud.clone(), quiet.clone());
        ctx.attach(loud);
        ctx.attach(quiet);

        ctx.info("only loud");
        ctx.critical("both");
        assert_eq!(loud_lines.len(), 2);
        assert_eq!(quiet_lines.len(), 1);
    }

    #[test]
    fn test_timestamp_comes_from_clock() {
        let clock = Arc::new(ManualClock::new(1_700_000_000_123));
        let ctx = LoggerContext::builder().clock(clock).build();
        let memory = MemoryAdapter::new("Memory", ctx.env());
        let handle = memory.clone();
        ctx.attach(memory);

        ctx.info("stamped");
        let expected = crate::core::format_timestamp(&crate::core::clock::millis_to_local(
            1_700_000_000_123,
        ));
        assert!(handle.lines()[0].starts_with(&format!("[{}]", expected)));
    }
}
