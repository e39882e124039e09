//! Basic engine usage example
//!
//! Demonstrates console logging at every severity and how the configured
//! level gates calls.
//!
//! Run with: cargo run --example basic_usage

use rust_log_engine::prelude::*;
use rust_log_engine::{info, warning};

fn main() -> Result<()> {
    println!("=== Rust Log Engine - Basic Usage Example ===\n");

    let ctx = LoggerContext::new();
    ctx.setup(&Config::from_json_str(
        r#"{ "Log": { "Std": { "Level": "Debug", "Color": true } } }"#,
    )?);

    println!("1. Logging at every severity:");
    ctx.emergency("This is an emergency message");
    ctx.alert("This is an alert message");
    ctx.critical("This is a critical message");
    ctx.error("This is an error message");
    ctx.warning("This is a warning message");
    ctx.notice("This is a notice message");
    ctx.info("This is an info message");
    ctx.debug("This is a debug message");

    println!("\n2. Raising the console level to Warning:");
    ctx.setup(&Config::new().with("Log/Std/Level", "Warning"));
    ctx.info("Info message (hidden)");
    ctx.debug("Debug message (hidden)");
    warning!(ctx, "Warning message (visible), {} of {} retries used", 2, 5);

    println!("\n3. Interactive mode forces everything through:");
    ctx.set_interactive(true);
    info!(ctx, "Info message (visible while interactive)");
    ctx.set_interactive(false);

    ctx.close();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
