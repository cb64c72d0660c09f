//! Console interception example
//!
//! Demonstrates capturing host console calls, the re-entrancy guard and the
//! circuit breaker tripping during a call storm.
//!
//! Run with: cargo run --example console_intercept

use rust_log_inspector::core::InterceptConfig;
use rust_log_inspector::intercept::CircuitBreaker;
use rust_log_inspector::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Inspector - Console Interception Example ===\n");

    let console = HostConsole::stdio();

    let logger = Logger::builder()
        .without_console_appender()
        .intercept_config(InterceptConfig {
            include_trace: true,
            ..InterceptConfig::default()
        })
        .circuit_breaker(CircuitBreaker::with_thresholds(20, 200, Duration::from_secs(1)))
        .build()?;

    println!("1. Intercepting console calls:");
    logger.enable_interception(&console);
    console.log(&["user".into(), HostValue::Number(42.0), "signed in".into()]);
    console.warn(&[
        "cache miss".into(),
        HostValue::object([("key", HostValue::from("user:42"))]),
    ]);
    console.error(&[HostValue::Error {
        name: "TypeError".into(),
        message: "cannot read property 'id'".into(),
        stack: Some("at render (app.js:10:3)".into()),
    }]);

    for entry in logger.logs() {
        println!(
            "   captured [{}] {:?} data={:?} source={:?}",
            entry.level, entry.message, entry.data, entry.source
        );
    }

    println!("\n2. A call storm trips the breaker:");
    for i in 0..250 {
        console.debug(&[HostValue::Number(i as f64)]);
    }
    println!("   intercepting after storm: {}", logger.is_intercepting());
    println!("   breaker trips: {}", logger.metrics().breaker_trips);

    println!("\n3. Re-enabling and restoring:");
    logger.enable_interception(&console);
    console.info(&["back to normal".into()]);
    logger.disable_interception();
    console.info(&["not captured".into()]);

    println!("   total captured: {}", logger.metrics().intercepted_logs);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
