//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - No record is lost with many producers feeding one file writer
//! - Tags stay isolated between threads
//! - Rotation stays consistent under concurrent load
//! - Writes racing a close never panic

use rust_log_engine::adapters::MemoryAdapter;
use rust_log_engine::core::{Config, LogArg, LoggerContext, Severity};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

#[test]
fn test_concurrent_producers_lose_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent.log");

    let ctx = Arc::new(LoggerContext::new());
    ctx.setup(
        &Config::new()
            .with("Log/File/Path", log_file.to_str().unwrap())
            .with("Log/File/Level", "Debug"),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    ctx.log(
                        Severity::Info,
                        "thread {} message {}",
                        vec![LogArg::from(t), LogArg::from(i)],
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }
    ctx.close();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD);

    // Per-thread order is preserved by the FIFO queue
    for t in 0..THREADS {
        let marker = format!("thread {} message ", t);
        let sequence: Vec<usize> = lines
            .iter()
            .filter_map(|line| line.split_once(&marker).map(|(_, n)| n.parse().unwrap()))
            .collect();
        assert_eq!(sequence, (0..PER_THREAD).collect::<Vec<_>>());
    }
}

#[test]
fn test_tag_isolation_between_threads() {
    let ctx = Arc::new(LoggerContext::new());
    let memory = MemoryAdapter::new("Memory", ctx.env());
    let captured = memory.clone();
    ctx.attach(memory);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let worker = t.to_string();
                ctx.current([("worker", worker.as_str())]);
                for i in 0..100 {
                    ctx.log(Severity::Debug, "{}", vec![LogArg::from(t * 1000 + i)]);
                }
                ctx.release();
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }

    let lines = captured.lines();
    assert_eq!(lines.len(), THREADS * 100);
    for line in &lines {
        let (_, rest) = line.split_once("[worker=").expect("every line is tagged");
        let (worker, value) = rest.split_once("] ").unwrap();
        let worker: usize = worker.parse().unwrap();
        let value: usize = value.parse().unwrap();
        assert_eq!(value / 1000, worker, "tag leaked across threads: {}", line);
    }
    assert_eq!(ctx.tags().bound_count(), 0);
}

#[test]
fn test_rotation_under_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("busy.log");

    let ctx = Arc::new(LoggerContext::new());
    ctx.setup(
        &Config::new()
            .with("Log/File/Path", log_file.to_str().unwrap())
            .with("Log/File/Daily", false)
            .with("Log/File/MaxLine", 200)
            .with("Log/File/MaxFile", 999),
    );

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                for i in 0..250 {
                    ctx.log(
                        Severity::Notice,
                        "{}-{}",
                        vec![LogArg::from(t), LogArg::from(i)],
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }
    ctx.close();

    let mut seen = HashSet::new();
    let mut rotated = 0;
    for entry in fs::read_dir(temp_dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let content = fs::read_to_string(&path).unwrap();
        let count = content.lines().count();
        if path != log_file {
            rotated += 1;
            assert_eq!(count, 200, "rotated file {:?} has wrong size", path);
        }
        for line in content.lines() {
            assert!(seen.insert(line.rsplit(' ').next().unwrap().to_string()));
        }
    }
    assert_eq!(rotated, 5);
    assert_eq!(seen.len(), 1000);
}

#[test]
fn test_writes_racing_close() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("race.log");

    let ctx = Arc::new(LoggerContext::new());
    ctx.setup(
        &Config::new()
            .with("Log/File/Path", log_file.to_str().unwrap())
            .with("Log/File/Level", "Debug"),
    );

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                for i in 0..2_000 {
                    ctx.log(Severity::Debug, "racing {}", vec![LogArg::from(i)]);
                }
            })
        })
        .collect();

    thread::sleep(std::time::Duration::from_millis(5));
    ctx.close();
    for handle in producers {
        handle.join().expect("producer panicked");
    }

    // Whatever was accepted before the close landed as whole lines
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.is_empty() || content.ends_with('\n'));
    for line in content.lines() {
        assert!(line.contains("[D] racing "));
    }
}
