//! Integration tests for the logging engine
//!
//! These tests verify:
//! - Log injection prevention
//! - Configuration-driven setup with console, file and memory adapters
//! - End-to-end line format with tags
//! - File rotation and retention through the dispatcher
//! - Flush and close behavior

use rust_log_engine::adapters::{FileAdapter, FileSettings, MemoryAdapter};
use rust_log_engine::core::{Config, LogArg, LogRecord, LoggerContext, LoggerError, Severity};
use rust_log_engine::{error, info, LogAdapter};
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn file_config(path: &Path) -> Config {
    Config::new()
        .with("Log/File/Path", path.to_str().unwrap())
        .with("Log/File/Level", "Debug")
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read log file")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection_test.log");

    let ctx = LoggerContext::new();
    ctx.setup(&file_config(&log_file));

    let malicious_message = "User login\n[01/01 00:00:00.000] [E] Fake error injected\ttail";
    ctx.info(malicious_message);
    ctx.flush();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("\\n"));
    assert!(content.contains("\\t"));
    assert_eq!(content.lines().count(), 1, "Log should be a single line");
}

#[test]
fn test_round_trip_format_with_tag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("format.log");

    let ctx = LoggerContext::new();
    ctx.setup(&file_config(&log_file));

    let tag = ctx.create_tag([("user", "42")]);
    ctx.log(Severity::Error, "failed", vec![LogArg::from(&tag)]);
    ctx.flush();

    let lines = read_lines(&log_file);
    let matching: Vec<&String> = lines
        .iter()
        .filter(|line| {
            line.starts_with('[')
                && line.contains("] [E] [user=42] failed")
                && line.ends_with("failed")
        })
        .collect();
    assert_eq!(matching.len(), 1);

    // `[MM/dd HH:mm:ss.fff]`
    let stamp = &matching[0][1..19];
    assert_eq!(stamp.len(), 18);
    assert_eq!(&stamp[2..3], "/");
    assert_eq!(&stamp[14..15], ".");
}

#[test]
fn test_setup_from_json_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("json.log");
    let document = format!(
        r#"{{
            "Log": {{
                "File": {{ "Path": {path:?}, "Level": "Notice", "MaxLine": "1000" }},
                "Audit": {{ "Type": "Memory", "Level": "Error" }}
            }}
        }}"#,
        path = log_file.to_str().unwrap()
    );
    let config = Config::from_json_str(&document).expect("valid config");

    let ctx = LoggerContext::new();
    ctx.setup(&config);
    assert_eq!(ctx.adapter_names(), ["File", "Audit"]);
    assert_eq!(ctx.effective_severity(), Severity::Notice);

    info!(ctx, "below every adapter");
    error!(ctx, "reaches file and audit");
    ctx.flush();

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("[E] reaches file and audit"));
}

#[test]
fn test_format_args_are_substituted() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("args.log");

    let ctx = LoggerContext::new();
    ctx.setup(&file_config(&log_file));
    ctx.log(
        Severity::Warning,
        "{1} retries left for {0}, {{literal}} {9}",
        vec![LogArg::from("db"), LogArg::from(3)],
    );
    ctx.flush();

    let lines = read_lines(&log_file);
    assert!(lines[0].ends_with("[W] 3 retries left for db, {literal} {9}"));
}

#[test]
fn test_line_rotation_through_dispatcher() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");
    let config = file_config(&log_file)
        .with("Log/File/Daily", false)
        .with("Log/File/MaxLine", 3);

    let ctx = LoggerContext::new();
    ctx.setup(&config);
    for i in 0..5 {
        ctx.log(Severity::Info, "message {}", vec![LogArg::from(i)]);
    }
    ctx.flush();

    let rotated = read_lines(&temp_dir.path().join("app.001.log"));
    assert_eq!(rotated.len(), 3);
    assert!(rotated[2].ends_with("message 2"));
    assert_eq!(read_lines(&log_file).len(), 2);
}

#[test]
fn test_records_before_close_are_persisted() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("close.log");

    let ctx = LoggerContext::new();
    ctx.setup(&file_config(&log_file));
    for i in 0..250 {
        ctx.log(Severity::Debug, "entry {}", vec![LogArg::from(i)]);
    }
    ctx.close();
    ctx.close();

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 250);
    assert!(lines[249].ends_with("entry 249"));
    assert_eq!(ctx.adapter_count(), 0);
}

#[test]
fn test_setup_again_reopens_adapters() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let first = temp_dir.path().join("first.log");
    let second = temp_dir.path().join("second.log");

    let ctx = LoggerContext::new();
    ctx.setup(&file_config(&first));
    ctx.info("to first");
    ctx.setup(&file_config(&second));
    ctx.info("to second");
    ctx.flush();

    assert_eq!(read_lines(&first).len(), 1);
    assert_eq!(read_lines(&second).len(), 1);
}

#[test]
fn test_file_error_goes_to_fallback_not_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let reported = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&reported);
    let ctx = LoggerContext::builder()
        .fallback(Arc::new(move |e: &LoggerError| sink.lock().push(e.to_string())))
        .build();

    let config = Config::new().with("Log/File/Path", blocker.join("app.log").to_str().unwrap());
    ctx.setup(&config);

    // The broken file adapter is skipped, so the default console takes over
    assert_eq!(ctx.adapter_names(), ["Std"]);
    assert!(!reported.lock().is_empty());
    ctx.info("still logging");
}

#[test]
fn test_memory_and_file_share_record_fields() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("shared.log");

    let ctx = LoggerContext::new();
    let memory = MemoryAdapter::new("Memory", ctx.env());
    let captured = memory.clone();
    ctx.attach(memory);
    ctx.attach(
        FileAdapter::start("File", ctx.env(), FileSettings::new(&log_file).with_level(Severity::Debug))
            .expect("Failed to start file adapter"),
    );

    ctx.current([("job", "nightly")]);
    ctx.notice("export done");
    ctx.release();
    ctx.flush();

    let from_file = read_lines(&log_file);
    let from_memory = captured.lines();
    assert_eq!(from_file, from_memory);
    assert!(from_file[0].ends_with("[N] [job=nightly] export done"));
}

#[test]
fn test_adapter_used_directly() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("direct.log");
    let adapter = FileAdapter::start(
        "Direct",
        Default::default(),
        FileSettings::new(&log_file).with_daily(false),
    )
    .expect("Failed to start file adapter");

    adapter.write(LogRecord::new(Severity::Alert, "direct write"));
    adapter.close();
    assert!(read_lines(&log_file)[0].ends_with("[A] direct write"));
}
