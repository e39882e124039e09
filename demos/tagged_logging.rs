//! Tagged logging example
//!
//! Demonstrates per-thread tags, explicit tags and per-tag severity
//! overrides.
//!
//! Run with: cargo run --example tagged_logging

use rust_log_engine::prelude::*;
use rust_log_engine::{debug, info};
use std::sync::Arc;
use std::thread;

fn main() {
    println!("=== Rust Log Engine - Tagged Logging Example ===\n");

    let ctx = Arc::new(LoggerContext::new());
    ctx.setup(&Config::new().with("Log/Std/Level", "Info").with("Log/Std/Color", false));

    println!("1. Ambient tag on the calling thread:");
    ctx.current([("service", "billing")]);
    ctx.info("invoice batch started");
    ctx.current([("batch", "2026-10")]);
    ctx.info("invoice batch finished");
    ctx.release();

    println!("\n2. Each worker thread has its own tag:");
    let workers: Vec<_> = (0..3)
        .map(|id| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                ctx.current([("worker", id.to_string())]);
                info!(ctx, "processing shard {}", id * 10);
                ctx.release();
            })
        })
        .collect();
    for worker in workers {
        let _ = worker.join();
    }

    println!("\n3. A tag with its own severity opens Debug for one request:");
    let request = ctx.create_tag([TagPair::new("request", "r-981"), TagPair::flag("traced")]);
    request.set_severity(Severity::Debug);
    debug!(ctx, tag = request, "cache miss for key {}", "user:42");
    debug!(ctx, "untagged debug stays hidden");

    ctx.close();
    println!("\n=== Example completed successfully! ===");
}
