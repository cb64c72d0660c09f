//! Inspector bus example
//!
//! Demonstrates an inspector panel talking to the engine over a channel bus:
//! batched log delivery, metrics ticks and consumer requests.
//!
//! Run with: cargo run --example inspector_bus

use rust_log_inspector::prelude::*;
use rust_log_inspector::transport::ExportRequest;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Inspector - Inspector Bus Example ===\n");

    let bus = Arc::new(ChannelBus::new());
    let panel = bus.subscribe();

    let logger = Logger::builder()
        .without_console_appender()
        .batch_size(5)
        .flush_interval(Duration::from_millis(100))
        .transport(Arc::clone(&bus))
        .auto_start(true)
        .build()?;

    let inspector = thread::spawn(move || {
        let mut received = 0;
        while let Ok(message) = panel.recv_timeout(Duration::from_millis(1500)) {
            match message {
                Message::LogEntry(_) | Message::LogBatch(_) => {
                    let entries = message.entries();
                    received += entries.len();
                    println!("   [panel] {} ({} entries)", message.channel(), entries.len());
                }
                Message::MetricsUpdate(metrics) => {
                    println!(
                        "   [panel] metrics: total={} rate={}/s errors={:.1}%",
                        metrics.total_logs, metrics.logs_per_second, metrics.error_rate
                    );
                }
                Message::ConfigResponse(config) => {
                    println!("   [panel] config: level={} maxLogs={}", config.level, config.max_logs);
                }
                Message::ExportResponse(exported) => {
                    println!("   [panel] export ({}):\n{}", exported.format, exported.content);
                }
                other => println!("   [panel] {}", other.channel()),
            }
        }
        received
    });

    println!("1. Streaming entries:");
    let api = logger.child("Api");
    for i in 0..12 {
        if i % 4 == 3 {
            api.error(format!("request {} failed", i));
        } else {
            api.info(format!("request {} ok", i));
        }
    }
    thread::sleep(Duration::from_millis(1200));

    println!("\n2. Consumer requests:");
    logger.handle_message(Message::ConfigRequest)?;
    let update: Message = serde_json::from_str(
        r#"{"channel": "config-update", "payload": {"level": "warn"}}"#,
    )?;
    logger.handle_message(update)?;
    logger.handle_message(Message::ExportLogs(ExportRequest {
        format: ExportFormat::Csv,
    }))?;

    logger.shutdown();
    drop(api);
    drop(logger);
    drop(bus);

    let received = inspector.join().unwrap_or(0);
    println!("\nPanel received {} entries", received);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
