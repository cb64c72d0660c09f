//! Named-channel publish/subscribe transport
//!
//! The engine talks to its consumers (an inspector panel, a test harness)
//! through [`Message`]s. Each variant corresponds to one named channel; on
//! the wire a message is `{"channel": "<name>", "payload": ...}`.

use crate::core::{ConfigUpdate, ExportFormat, LogEntry, LoggerConfig, Metrics};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of an `export-logs` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
}

/// Body of an `export-response`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedLogs {
    pub format: ExportFormat,
    pub content: String,
}

/// One message on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum Message {
    /// engine → consumers
    LogEntry(Arc<LogEntry>),
    /// engine → consumers
    LogBatch(Vec<Arc<LogEntry>>),
    /// consumer → engine
    ConfigRequest,
    /// engine → consumer
    ConfigResponse(LoggerConfig),
    /// consumer → engine
    ConfigUpdate(ConfigUpdate),
    /// consumer → engine
    LogsRequest,
    /// engine → consumer
    LogsResponse(Vec<Arc<LogEntry>>),
    /// engine → consumers
    MetricsUpdate(Metrics),
    /// consumer → engine
    ClearLogs,
    /// consumer → engine
    ExportLogs(ExportRequest),
    /// engine → consumer
    ExportResponse(ExportedLogs),
}

impl Message {
    /// Channel name of this message
    pub fn channel(&self) -> &'static str {
        match self {
            Message::LogEntry(_) => "log-entry",
            Message::LogBatch(_) => "log-batch",
            Message::ConfigRequest => "config-request",
            Message::ConfigResponse(_) => "config-response",
            Message::ConfigUpdate(_) => "config-update",
            Message::LogsRequest => "logs-request",
            Message::LogsResponse(_) => "logs-response",
            Message::MetricsUpdate(_) => "metrics-update",
            Message::ClearLogs => "clear-logs",
            Message::ExportLogs(_) => "export-logs",
            Message::ExportResponse(_) => "export-response",
        }
    }

    /// Entries carried by a `log-entry` or `log-batch` message
    pub fn entries(&self) -> Vec<Arc<LogEntry>> {
        match self {
            Message::LogEntry(entry) => vec![Arc::clone(entry)],
            Message::LogBatch(entries) => entries.clone(),
            _ => Vec::new(),
        }
    }
}

/// Outbound side of the bus as seen by the engine
pub trait Transport: Send + Sync {
    fn publish(&self, message: Message);
}

/// Transport that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn publish(&self, _message: Message) {}
}

/// In-process fan-out bus
///
/// Every subscriber gets its own unbounded queue; subscribers whose receiver
/// has been dropped are pruned on the next publish.
///
/// # Example
///
/// ```
/// use rust_log_inspector::transport::{ChannelBus, Message, Transport};
///
/// let bus = ChannelBus::new();
/// let rx = bus.subscribe();
/// bus.publish(Message::ClearLogs);
/// assert_eq!(rx.try_recv().unwrap().channel(), "clear-logs");
/// ```
#[derive(Debug, Default)]
pub struct ChannelBus {
    subscribers: Mutex<Vec<Sender<Message>>>,
}

impl ChannelBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Receiver<Message> {
        let (sender, receiver) = unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Transport for ChannelBus {
    fn publish(&self, message: Message) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sender| sender.send(message.clone()).is_ok());
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn publish(&self, message: Message) {
        (**self).publish(message)
    }
}
