//! Basic engine usage example
//!
//! Demonstrates levels, categories, structured fields, child loggers and export.
//!
//! Run with: cargo run --example basic_usage

use rust_log_inspector::prelude::*;
use rust_log_inspector::{info, warn};

fn main() -> Result<()> {
    println!("=== Rust Log Inspector - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .level(LogLevel::Trace)
        .global_field("service", "checkout")
        .build()?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Raising the threshold to WARN:");
    logger.set_level(LogLevel::Warn);
    logger.info("Info message (hidden)");
    logger.warn("Warning message (visible)");
    logger.set_level(LogLevel::Debug);

    println!("\n3. Categories and fields:");
    logger.log_with(
        LogLevel::Info,
        "order placed",
        LogOptions::new()
            .category("Orders")
            .field("order_id", 1042)
            .field("amount", 59.9)
            .tag("billing"),
    );
    info!(logger, "processed {} items", 3);

    println!("\n4. Child loggers:");
    let db = logger.child("Database").with_field("pool", "primary");
    db.debug("connection acquired");
    warn!(db.child("Query"), "slow query took {}ms", 840);

    println!("\n5. Timed operations:");
    let total: std::result::Result<u32, String> =
        logger.timed_operation("sum", || Ok((1..=10).sum()));
    println!("   sum = {:?}", total);

    println!("\n6. Export:");
    println!("{}", logger.export(ExportFormat::Txt)?);

    let metrics = logger.metrics();
    println!(
        "Captured {} entries ({} errors)",
        metrics.total_logs,
        metrics.logs_by_level.get(&LogLevel::Error).copied().unwrap_or(0)
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
