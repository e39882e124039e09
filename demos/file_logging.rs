//! File logging example
//!
//! Demonstrates logging to the console and a rotating file simultaneously.
//!
//! Run with: cargo run --example file_logging

use rust_log_engine::prelude::*;
use rust_log_engine::FileAdapter;

fn main() -> Result<()> {
    println!("=== Rust Log Engine - File Logging Example ===\n");

    let config = Config::new()
        .with("Log/Std/Level", "Notice")
        .with("Log/File/Path", "logs/application.log")
        .with("Log/File/Level", "Debug")
        .with("Log/File/Daily", false)
        .with("Log/File/MaxLine", 10)
        .with("Log/File/MaxFile", 20);

    let ctx = LoggerContext::new();
    ctx.setup(&config);

    println!("1. Logging to both console and file:");
    ctx.info("Application started");
    ctx.debug("Loading configuration...");
    ctx.notice("Configuration loaded successfully");
    ctx.warning("Using default settings for some options");
    ctx.error("Failed to load optional plugin");

    println!("\n2. Producing enough lines to rotate:");
    for i in 1..=25 {
        ctx.log(Severity::Info, "Processing item {}/25", vec![LogArg::from(i)]);
    }
    ctx.flush();

    println!("\n3. A standalone file adapter and its metrics:");
    let adapter = FileAdapter::start(
        "Audit",
        ctx.env(),
        FileSettings::new("logs/audit.log").with_max_size(1024),
    )?;
    for i in 0..40 {
        adapter.write(LogRecord::new(Severity::Notice, "audit entry {}").with_args([i.to_string()]));
    }
    adapter.close();
    let metrics = adapter.metrics();
    println!(
        "   written: {}, rotations: {}, lines in active file: {}",
        metrics.records_written(),
        metrics.rotations(),
        metrics.current_lines()
    );

    ctx.close();
    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/' for the active and rotated files");

    Ok(())
}
