//! Capture engine
//!
//! [`Logger`] is a cheap, cloneable handle. Every clone talks to the same
//! engine state: configuration, capture buffer, metrics, global fields,
//! correlation/trace context, appenders, the transport and the console
//! interceptor. The engine is torn down when the last handle is dropped.
//!
//! Transport publishes and host sink calls are never made while an engine
//! lock is held, so a subscriber or sink that logs back into the engine
//! cannot deadlock it.

use super::appender::Appender;
use super::capture_buffer::{CaptureBuffer, DEFAULT_HISTORY_CAPACITY};
use super::config::{
    CategoryConfig, ConfigUpdate, InterceptConfig, LoggerConfig, StructuredConfig,
};
use super::error::{panic_message, LoggerError, Result};
use super::export::{import_json, ExportFormat};
use super::field_resolver::FieldSources;
use super::level_policy::should_log;
use super::log_context::{ContextGuard, FieldValue, GlobalFields, LogFields};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::metrics::{Metrics, MetricsAggregator, METRICS_WINDOW};
use super::payload::{HostValue, LogPayload};
use super::scheduler::{ScheduledTask, Scheduler};
use super::trace_context::TraceContext;
use crate::appenders::ConsoleAppender;
use crate::intercept::{
    self, BreakerDecision, CircuitBreaker, ConsoleMethod, HostConsole, Interceptor, SinkFn,
    INTERCEPT_CATEGORY,
};
use crate::transport::{ExportedLogs, Message, NullTransport, Transport};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Optional parts of a log call
///
/// # Example
///
/// ```
/// use rust_log_inspector::prelude::*;
///
/// let logger = Logger::new();
/// logger.log_with(
///     LogLevel::Warn,
///     "slow query",
///     LogOptions::new()
///         .category("Database")
///         .field("durationMs", 812)
///         .tag("perf"),
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogOptions {
    pub data: Option<LogPayload>,
    pub fields: Option<LogFields>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn data(mut self, data: LogPayload) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach any serializable value as the payload
    #[must_use]
    pub fn data_value<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.data = Some(LogPayload::from_serialize(value));
        self
    }

    /// Attach an error and its source chain as a fault payload
    #[must_use]
    pub fn error<E: std::error::Error + ?Sized>(mut self, err: &E) -> Self {
        self.data = Some(LogPayload::from_error(err));
        self
    }

    /// Attach host values, sanitized
    #[must_use]
    pub fn host_data(mut self, values: &[HostValue]) -> Self {
        self.data = LogPayload::sanitize_all(values);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: LogFields) -> Self {
        if let Some(existing) = self.fields.as_mut() {
            existing.extend_from(&fields);
        } else {
            self.fields = Some(fields);
        }
        self
    }

    #[must_use]
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.get_or_insert_with(LogFields::new).add_field(key, value);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn context(mut self, context: serde_json::Map<String, serde_json::Value>) -> Self {
        self.context.extend(context);
        self
    }

    #[must_use]
    pub fn context_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

struct LoggerInner {
    config: RwLock<LoggerConfig>,
    buffer: Mutex<CaptureBuffer>,
    metrics: MetricsAggregator,
    globals: GlobalFields,
    trace: TraceContext,
    transport: Arc<dyn Transport>,
    appenders: RwLock<Vec<Box<dyn Appender>>>,
    interceptor: Interceptor,
    scheduler: Mutex<Option<Scheduler>>,
}

impl LoggerInner {
    fn field_sources<'a>(&'a self, config: &'a LoggerConfig) -> FieldSources<'a> {
        FieldSources {
            structured: &config.structured,
            globals: &self.globals,
            trace: &self.trace,
        }
    }

    fn log_with(&self, level: LogLevel, message: String, options: LogOptions) {
        let fields = {
            let config = self.config.read();
            if !should_log(&config, level, options.category.as_deref()) {
                return;
            }
            self.field_sources(&config).resolve(options.fields.as_ref())
        };

        let mut entry = LogEntry::new(level, message)
            .with_tags(options.tags)
            .with_context(options.context);
        if let Some(data) = options.data {
            entry = entry.with_data(data);
        }
        if let Some(fields) = fields {
            entry = entry.with_fields(fields);
        }
        if let Some(category) = options.category {
            entry = entry.with_category(category);
        }

        self.accept(entry, true);
    }

    /// Record an accepted entry and route it to the enabled outputs
    fn accept(&self, entry: LogEntry, to_appenders: bool) {
        let (console, devtools, batch_size) = {
            let config = self.config.read();
            (config.outputs.console, config.outputs.devtools, config.batch_size)
        };

        let entry = Arc::new(entry);
        self.metrics.record(&entry);

        if to_appenders && console {
            self.write_appenders(&entry);
        }

        if devtools {
            let staged = self.buffer.lock().append(entry);
            if staged >= batch_size {
                self.force_flush();
            }
        }
    }

    /// Per-appender panic isolation: one failing appender never stops the others
    fn write_appenders(&self, entry: &LogEntry) {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| appender.append(entry))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", appender.name(), e);
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        appender.name(),
                        panic_message(&*panic_info)
                    );
                }
            }
        }
    }

    fn flush_appenders(&self) -> bool {
        let mut ok = true;
        for appender in self.appenders.write().iter_mut() {
            if let Err(e) = appender.flush() {
                eprintln!("[LOGGER ERROR] Appender '{}' flush failed: {}", appender.name(), e);
                ok = false;
            }
        }
        ok
    }

    /// Drain staging into history and publish what was drained
    fn force_flush(&self) -> usize {
        let mut drained = {
            let mut buffer = self.buffer.lock();
            let drained = buffer.drain();
            buffer.merge_into_history(&drained);
            drained
        };

        let count = drained.len();
        match count {
            0 => {}
            1 => {
                if let Some(entry) = drained.pop() {
                    self.transport.publish(Message::LogEntry(entry));
                }
            }
            _ => self.transport.publish(Message::LogBatch(drained)),
        }
        count
    }

    fn tick_metrics(&self) -> Metrics {
        let metrics = self.metrics.tick(chrono::Utc::now().timestamp_millis());
        self.transport.publish(Message::MetricsUpdate(metrics.clone()));
        metrics
    }

    /// Body of every installed console wrapper
    fn intercept_call(&self, method: ConsoleMethod, original: &SinkFn, args: &[HostValue]) {
        let Some(_guard) = self.interceptor.enter() else {
            original(args);
            return;
        };

        if self.interceptor.record_call(Instant::now()) == BreakerDecision::Trip {
            self.trip_breaker();
            original(args);
            return;
        }

        let settings = self.config.read().intercept.clone();
        if !settings.capture_sink {
            original(args);
            return;
        }
        if settings.preserve_original {
            original(args);
        }

        let captured = catch_unwind(AssertUnwindSafe(|| {
            self.capture_intercepted(method, args, settings.include_trace)
        }));

        if let Err(panic_info) = captured {
            let report = self
                .interceptor
                .original(ConsoleMethod::Error)
                .unwrap_or_else(|| Arc::clone(original));
            report(&[HostValue::from(format!(
                "[LOGGER ERROR] Failed to capture console.{} call: {}",
                method,
                panic_message(&*panic_info)
            ))]);
        }
    }

    fn capture_intercepted(&self, method: ConsoleMethod, args: &[HostValue], include_trace: bool) {
        let fields = {
            let config = self.config.read();
            if !should_log(&config, method.level(), Some(INTERCEPT_CATEGORY)) {
                return;
            }
            self.field_sources(&config).resolve(None)
        };

        let mut entry = intercept::entry_from_call(method, args);
        if let Some(fields) = fields {
            entry = entry.with_fields(fields);
        }
        if include_trace {
            if let Some(source) = intercept::capture_source() {
                entry = entry.with_source(source);
            }
        }

        self.metrics.record_intercepted();
        // The original sink already printed this call
        self.accept(entry, false);
    }

    fn trip_breaker(&self) {
        let trips = self.metrics.record_breaker_trip();
        self.interceptor.uninstall();
        self.config.write().intercept.enabled = false;
        eprintln!(
            "[LOGGER WARNING] Console call storm detected, interception disabled (trip #{}). \
             Re-enable it once the storm has passed.",
            trips
        );
    }
}

impl ScheduledTask for LoggerInner {
    fn on_flush(&self) {
        self.force_flush();
    }

    fn on_metrics_tick(&self) {
        self.tick_metrics();
    }
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        if let Some(mut scheduler) = self.scheduler.get_mut().take() {
            scheduler.stop();
        }
        self.interceptor.uninstall();
        self.force_flush();
        self.flush_appenders();
    }
}

/// Handle to a capture engine
///
/// # Example
///
/// ```
/// use rust_log_inspector::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Info)
///     .console_output(false)
///     .build()
///     .unwrap();
///
/// logger.debug("dropped by the level policy");
/// logger.info("kept");
/// assert_eq!(logger.logs().len(), 1);
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Engine with the default configuration, a console appender and no transport
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(
            LoggerConfig::default(),
            vec![Box::new(ConsoleAppender::new()) as Box<dyn Appender>],
            Arc::new(NullTransport),
            CircuitBreaker::new(),
            DEFAULT_HISTORY_CAPACITY,
        )
    }

    /// Engine with a validated configuration
    pub fn with_config(config: LoggerConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    fn from_parts(
        config: LoggerConfig,
        appenders: Vec<Box<dyn Appender>>,
        transport: Arc<dyn Transport>,
        breaker: CircuitBreaker,
        history_capacity: usize,
    ) -> Self {
        let buffer = CaptureBuffer::with_history_capacity(config.max_logs, history_capacity);
        Self {
            inner: Arc::new(LoggerInner {
                config: RwLock::new(config),
                buffer: Mutex::new(buffer),
                metrics: MetricsAggregator::new(),
                globals: GlobalFields::new(),
                trace: TraceContext::new(),
                transport,
                appenders: RwLock::new(appenders),
                interceptor: Interceptor::with_breaker(breaker),
                scheduler: Mutex::new(None),
            }),
        }
    }

    /// Process-wide engine, created and started on first use
    pub fn global() -> &'static Logger {
        static GLOBAL: OnceLock<Logger> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let logger = Logger::new();
            if let Err(e) = logger.start() {
                eprintln!("[LOGGER WARNING] Global logger running without scheduler: {}", e);
            }
            logger
        })
    }

    /// Whether an entry at `level` in `category` would be recorded
    pub fn should_log(&self, level: LogLevel, category: Option<&str>) -> bool {
        should_log(&self.inner.config.read(), level, category)
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.inner.log_with(level, message.into(), LogOptions::default());
    }

    /// Log with payload, fields, category, tags and context
    pub fn log_with(&self, level: LogLevel, message: impl Into<String>, options: LogOptions) {
        self.inner.log_with(level, message.into(), options);
    }

    /// Log under a category with an optional payload
    pub fn log_category(
        &self,
        level: LogLevel,
        category: impl Into<String>,
        message: impl Into<String>,
        data: Option<LogPayload>,
    ) {
        let mut options = LogOptions::new().category(category);
        options.data = data;
        self.inner.log_with(level, message.into(), options);
    }

    /// Log an error value at error level
    pub fn log_error<E: std::error::Error + ?Sized>(&self, message: impl Into<String>, err: &E) {
        self.inner
            .log_with(LogLevel::Error, message.into(), LogOptions::new().error(err));
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    pub fn add_appender<A: Appender + 'static>(&self, appender: A) {
        self.inner.appenders.write().push(Box::new(appender));
    }

    // Global fields

    /// Merge fields into the runtime global store
    pub fn set_global_fields(&self, fields: LogFields) {
        self.inner.globals.extend(&fields);
    }

    pub fn set_global_field<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.inner.globals.set(key, value);
    }

    pub fn remove_global_field(&self, key: &str) {
        self.inner.globals.remove(key);
    }

    pub fn clear_global_fields(&self) {
        self.inner.globals.clear();
    }

    pub fn global_fields(&self) -> LogFields {
        self.inner.globals.snapshot()
    }

    /// Set a global field until the returned guard is dropped
    pub fn scoped_field<K, V>(&self, key: K, value: V) -> ContextGuard
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.inner.globals.scoped(key, value)
    }

    // Correlation and trace ids

    pub fn trace_context(&self) -> &TraceContext {
        &self.inner.trace
    }

    pub fn start_correlation(&self, id: Option<String>) -> String {
        self.inner.trace.start_correlation(id)
    }

    pub fn end_correlation(&self) {
        self.inner.trace.end_correlation();
    }

    pub fn correlation_id(&self) -> Option<String> {
        self.inner.trace.correlation_id()
    }

    pub fn start_trace(&self, id: Option<String>) -> String {
        self.inner.trace.start_trace(id)
    }

    pub fn end_trace(&self) {
        self.inner.trace.end_trace();
    }

    pub fn trace_id(&self) -> Option<String> {
        self.inner.trace.trace_id()
    }

    pub fn new_span_id(&self) -> String {
        self.inner.trace.new_span_id()
    }

    /// Run `f` with a correlation id active; cleared on return and on panic
    pub fn with_correlation<R>(&self, id: Option<String>, f: impl FnOnce(&str) -> R) -> R {
        self.inner.trace.with_correlation(id, f)
    }

    pub fn with_trace<R>(&self, id: Option<String>, f: impl FnOnce(&str) -> R) -> R {
        self.inner.trace.with_trace(id, f)
    }

    pub async fn with_correlation_async<F: Future>(&self, id: Option<String>, future: F) -> F::Output {
        self.inner.trace.with_correlation_async(id, future).await
    }

    pub async fn with_trace_async<F: Future>(&self, id: Option<String>, future: F) -> F::Output {
        self.inner.trace.with_trace_async(id, future).await
    }

    // Configuration

    pub fn config(&self) -> LoggerConfig {
        self.inner.config.read().clone()
    }

    /// Apply a partial configuration update
    ///
    /// Side effects follow the changed values: the staging buffer is resized,
    /// the flush timer restarted and interception toggled.
    pub fn update_config(&self, update: ConfigUpdate) -> Result<()> {
        let (previous, current) = {
            let mut config = self.inner.config.write();
            let next = config.merged(&update)?;
            let previous = std::mem::replace(&mut *config, next);
            (previous, config.clone())
        };

        if previous.max_logs != current.max_logs {
            self.inner.buffer.lock().set_max_logs(current.max_logs);
        }

        if previous.flush_interval_ms != current.flush_interval_ms && self.is_running() {
            self.start_scheduler(current.flush_interval())?;
        }

        if previous.intercept.enabled != current.intercept.enabled {
            if current.intercept.enabled {
                match self.inner.interceptor.last_console() {
                    Some(console) => {
                        self.install_interception(&console);
                    }
                    None => eprintln!(
                        "[LOGGER WARNING] Interception enabled without a host console. \
                         Use enable_interception() to attach one."
                    ),
                }
            } else {
                self.inner.interceptor.uninstall();
            }
        }

        Ok(())
    }

    pub fn set_level(&self, level: LogLevel) {
        self.inner.config.write().level = level;
    }

    // Interception

    /// Start capturing calls made to `console`; idempotent
    ///
    /// Returns `false` if interception was already installed.
    pub fn enable_interception(&self, console: &HostConsole) -> bool {
        let installed = self.install_interception(console);
        self.inner.config.write().intercept.enabled = true;
        installed
    }

    /// Restore the console's original functions; idempotent
    pub fn disable_interception(&self) -> bool {
        let removed = self.inner.interceptor.uninstall();
        self.inner.config.write().intercept.enabled = false;
        removed
    }

    pub fn is_intercepting(&self) -> bool {
        self.inner.interceptor.is_installed()
    }

    fn install_interception(&self, console: &HostConsole) -> bool {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .interceptor
            .install(console, move |method, original: SinkFn| -> SinkFn {
                let weak = weak.clone();
                Arc::new(move |args: &[HostValue]| match weak.upgrade() {
                    Some(inner) => inner.intercept_call(method, &original, args),
                    None => original(args),
                })
            })
    }

    // Buffer, flushing and metrics

    /// Drain staged entries to the transport now; returns how many were sent
    pub fn force_flush(&self) -> usize {
        self.inner.force_flush()
    }

    /// History plus anything still staged, deduplicated by id
    pub fn logs(&self) -> Vec<Arc<LogEntry>> {
        self.inner.buffer.lock().snapshot()
    }

    pub fn staged_len(&self) -> usize {
        self.inner.buffer.lock().staged_len()
    }

    /// Empty staging and history; metrics are left untouched
    pub fn clear_logs(&self) {
        self.inner.buffer.lock().clear();
    }

    pub fn metrics(&self) -> Metrics {
        self.inner.metrics.snapshot()
    }

    /// Recompute rolling rates and publish them
    pub fn tick_metrics(&self) -> Metrics {
        self.inner.tick_metrics()
    }

    pub fn reset_metrics(&self) {
        self.inner.metrics.reset();
    }

    pub fn export(&self, format: ExportFormat) -> Result<String> {
        format.export(&self.logs())
    }

    /// Load a JSON export into history; returns the number of entries read
    pub fn import(&self, json: &str) -> Result<usize> {
        let entries: Vec<Arc<LogEntry>> = import_json(json)?.into_iter().map(Arc::new).collect();
        self.inner.buffer.lock().merge_into_history(&entries);
        Ok(entries.len())
    }

    /// Service a request arriving from a consumer
    ///
    /// Replies are published on the transport.
    pub fn handle_message(&self, message: Message) -> Result<()> {
        match message {
            Message::ConfigRequest => {
                self.inner
                    .transport
                    .publish(Message::ConfigResponse(self.config()));
            }
            Message::ConfigUpdate(update) => {
                self.update_config(update)?;
                self.inner
                    .transport
                    .publish(Message::ConfigResponse(self.config()));
            }
            Message::LogsRequest => {
                self.inner.transport.publish(Message::LogsResponse(self.logs()));
            }
            Message::ClearLogs => self.clear_logs(),
            Message::ExportLogs(request) => {
                let content = self.export(request.format)?;
                self.inner
                    .transport
                    .publish(Message::ExportResponse(ExportedLogs {
                        format: request.format,
                        content,
                    }));
            }
            other => {
                return Err(LoggerError::other(format!(
                    "'{}' is not a consumer request",
                    other.channel()
                )));
            }
        }
        Ok(())
    }

    // Operations

    /// Run `operation`, logging its start, duration and outcome
    ///
    /// The operation's error is logged and then returned unchanged.
    pub fn timed_operation<T, E, F>(&self, name: &str, operation: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: fmt::Display,
    {
        self.begin_operation(name);
        let start = Instant::now();
        let result = operation();
        self.finish_operation(name, start.elapsed(), result.as_ref().err());
        result
    }

    pub async fn timed_operation_async<T, E, F>(&self, name: &str, operation: F) -> std::result::Result<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        self.begin_operation(name);
        let start = Instant::now();
        let result = operation.await;
        self.finish_operation(name, start.elapsed(), result.as_ref().err());
        result
    }

    fn begin_operation(&self, name: &str) {
        self.log_with(
            LogLevel::Debug,
            format!("Starting operation: {}", name),
            LogOptions::new().field("operation", name),
        );
    }

    fn finish_operation<E: fmt::Display>(&self, name: &str, elapsed: Duration, error: Option<&E>) {
        let fields = LogFields::new()
            .with_field("operation", name)
            .with_field("durationMs", elapsed.as_secs_f64() * 1000.0);

        match error {
            None => self.log_with(
                LogLevel::Info,
                format!("Completed operation: {}", name),
                LogOptions::new().fields(fields),
            ),
            Some(err) => {
                let failure = LoggerError::operation(name, err.to_string());
                self.log_with(
                    LogLevel::Error,
                    format!("Failed operation: {}", name),
                    LogOptions::new().fields(fields).error(&failure),
                );
            }
        }
    }

    // Lifecycle

    /// Start the flush and metrics timers; a no-op when already running
    pub fn start(&self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let interval = self.inner.config.read().flush_interval();
        self.start_scheduler(interval)
    }

    fn start_scheduler(&self, flush_interval: Duration) -> Result<()> {
        let scheduler = Scheduler::spawn(Arc::downgrade(&self.inner), flush_interval, METRICS_WINDOW)?;
        let previous = self.inner.scheduler.lock().replace(scheduler);
        if let Some(mut previous) = previous {
            previous.stop();
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .scheduler
            .lock()
            .as_ref()
            .is_some_and(Scheduler::is_running)
    }

    /// Stop the timers and flush everything still staged
    ///
    /// Returns `false` if the worker or an appender failed along the way.
    pub fn shutdown(&self) -> bool {
        let scheduler = self.inner.scheduler.lock().take();
        let stopped = match scheduler {
            Some(mut scheduler) => scheduler.stop(),
            None => true,
        };

        self.inner.force_flush();
        self.inner.flush_appenders() && stopped
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &*self.inner.config.read())
            .field("staged", &self.staged_len())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_inspector::prelude::*;
/// use rust_log_inspector::transport::ChannelBus;
/// use std::sync::Arc;
///
/// let bus = Arc::new(ChannelBus::new());
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .max_logs(500)
///     .batch_size(20)
///     .console_output(false)
///     .global_field("service", "checkout")
///     .transport(Arc::clone(&bus))
///     .build()
///     .unwrap();
///
/// logger.info("ready");
/// assert_eq!(logger.force_flush(), 1);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    appenders: Vec<Box<dyn Appender>>,
    console_appender: bool,
    transport: Option<Arc<dyn Transport>>,
    breaker: CircuitBreaker,
    history_capacity: usize,
    intercept: Option<HostConsole>,
    auto_start: bool,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            appenders: Vec::new(),
            console_appender: true,
            transport: None,
            breaker: CircuitBreaker::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            intercept: None,
            auto_start: false,
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn category(mut self, name: impl Into<String>, config: CategoryConfig) -> Self {
        self.config.categories.insert(name.into(), config);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_logs(mut self, max_logs: usize) -> Self {
        self.config.max_logs = max_logs;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Toggle writing to appenders
    #[must_use = "builder methods return a new value"]
    pub fn console_output(mut self, enabled: bool) -> Self {
        self.config.outputs.console = enabled;
        self
    }

    /// Toggle staging for the transport
    #[must_use = "builder methods return a new value"]
    pub fn devtools_output(mut self, enabled: bool) -> Self {
        self.config.outputs.devtools = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn structured(mut self, structured: StructuredConfig) -> Self {
        self.config.structured = structured;
        self
    }

    /// Add a configuration-level global field
    #[must_use = "builder methods return a new value"]
    pub fn global_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.config
            .structured
            .global_fields
            .get_or_insert_with(LogFields::new)
            .add_field(key, value);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn intercept_config(mut self, intercept: InterceptConfig) -> Self {
        self.config.intercept = intercept;
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Skip the default console appender
    #[must_use = "builder methods return a new value"]
    pub fn without_console_appender(mut self) -> Self {
        self.console_appender = false;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn circuit_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Intercept `console` as soon as the logger is built
    #[must_use = "builder methods return a new value"]
    pub fn intercept(mut self, console: &HostConsole) -> Self {
        self.intercept = Some(console.clone());
        self
    }

    /// Start the background timers on build
    #[must_use = "builder methods return a new value"]
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Build the Logger
    pub fn build(self) -> Result<Logger> {
        self.config.validate()?;

        let mut appenders = self.appenders;
        if self.console_appender {
            appenders.insert(0, Box::new(ConsoleAppender::new()));
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(NullTransport),
        };

        let logger = Logger::from_parts(
            self.config,
            appenders,
            transport,
            self.breaker,
            self.history_capacity,
        );

        if let Some(console) = self.intercept {
            logger.enable_interception(&console);
        }
        if self.auto_start {
            logger.start()?;
        }

        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
