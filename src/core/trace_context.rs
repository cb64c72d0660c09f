//! Correlation and trace identifiers
//!
//! One correlation id and one trace id can be active per engine. They are
//! engine-wide, not call-stack-local: independent paths that overlap in time
//! observe each other's ids.
//!
//! The scoped helpers install an id for the duration of a closure or future
//! and clear the slot afterwards. Clearing also happens on panic and when a
//! future is dropped before completion. An id that was active before the
//! scope is not restored.

use parking_lot::RwLock;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;

/// Generate a correlation id: `corr-{millis hex}-{8 random hex}`
pub fn generate_correlation_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen();
    format!("corr-{:x}-{:08x}", millis, random)
}

/// Generate a 128-bit trace id as 32 lowercase hex chars (never all zero)
pub fn generate_trace_id() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let id: u128 = rng.gen();
        if id != 0 {
            return format!("{:032x}", id);
        }
    }
}

/// Generate a 64-bit span id as 16 lowercase hex chars (never all zero)
pub fn generate_span_id() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let id: u64 = rng.gen();
        if id != 0 {
            return format!("{:016x}", id);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Correlation,
    Trace,
}

/// Active correlation/trace ids of one engine
#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    correlation: Arc<RwLock<Option<String>>>,
    trace: Arc<RwLock<Option<String>>>,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, slot: Slot) -> &Arc<RwLock<Option<String>>> {
        match slot {
            Slot::Correlation => &self.correlation,
            Slot::Trace => &self.trace,
        }
    }

    /// Activate a correlation id (generated when `None`) and return it
    pub fn start_correlation(&self, id: Option<String>) -> String {
        let id = id.unwrap_or_else(generate_correlation_id);
        *self.correlation.write() = Some(id.clone());
        id
    }

    pub fn end_correlation(&self) {
        *self.correlation.write() = None;
    }

    pub fn correlation_id(&self) -> Option<String> {
        self.correlation.read().clone()
    }

    /// Activate a trace id (generated when `None`) and return it
    pub fn start_trace(&self, id: Option<String>) -> String {
        let id = id.unwrap_or_else(generate_trace_id);
        *self.trace.write() = Some(id.clone());
        id
    }

    pub fn end_trace(&self) {
        *self.trace.write() = None;
    }

    pub fn trace_id(&self) -> Option<String> {
        self.trace.read().clone()
    }

    /// Fresh span id; nothing is stored
    pub fn new_span_id(&self) -> String {
        generate_span_id()
    }

    fn enter(&self, slot: Slot, id: String) -> TraceScope {
        let lock = Arc::clone(self.slot(slot));
        *lock.write() = Some(id.clone());
        TraceScope { lock, id }
    }

    /// Activate a correlation id until the returned scope drops
    pub fn correlation_scope(&self, id: Option<String>) -> TraceScope {
        self.enter(Slot::Correlation, id.unwrap_or_else(generate_correlation_id))
    }

    /// Activate a trace id until the returned scope drops
    pub fn trace_scope(&self, id: Option<String>) -> TraceScope {
        self.enter(Slot::Trace, id.unwrap_or_else(generate_trace_id))
    }

    /// Run `f` with a correlation id active
    pub fn with_correlation<R>(&self, id: Option<String>, f: impl FnOnce(&str) -> R) -> R {
        let scope = self.correlation_scope(id);
        f(scope.id())
    }

    /// Run `f` with a trace id active
    pub fn with_trace<R>(&self, id: Option<String>, f: impl FnOnce(&str) -> R) -> R {
        let scope = self.trace_scope(id);
        f(scope.id())
    }

    /// Await `future` with a correlation id active
    pub async fn with_correlation_async<F>(&self, id: Option<String>, future: F) -> F::Output
    where
        F: Future,
    {
        let _scope = self.correlation_scope(id);
        future.await
    }

    /// Await `future` with a trace id active
    pub async fn with_trace_async<F>(&self, id: Option<String>, future: F) -> F::Output
    where
        F: Future,
    {
        let _scope = self.trace_scope(id);
        future.await
    }
}

/// Clears its slot when dropped
#[must_use = "the id is deactivated as soon as the scope is dropped"]
pub struct TraceScope {
    lock: Arc<RwLock<Option<String>>>,
    id: String,
}

impl TraceScope {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for TraceScope {
    fn drop(&mut self) {
        *self.lock.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_and_end_correlation() {
        let ctx = TraceContext::new();
        let id = ctx.start_correlation(None);
        assert!(id.starts_with("corr-"));
        assert_eq!(ctx.correlation_id(), Some(id));

        ctx.end_correlation();
        assert_eq!(ctx.correlation_id(), None);
    }

    #[test]
    fn test_explicit_ids_are_kept() {
        let ctx = TraceContext::new();
        assert_eq!(ctx.start_trace(Some("abc".to_string())), "abc");
        assert_eq!(ctx.trace_id().as_deref(), Some("abc"));
    }

    #[test]
    fn test_generated_id_formats() {
        let trace = generate_trace_id();
        assert_eq!(trace.len(), 32);
        assert!(trace.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let span = TraceContext::new().new_span_id();
        assert_eq!(span.len(), 16);
        assert!(span.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_with_correlation_cleans_up() {
        let ctx = TraceContext::new();
        let seen = ctx.with_correlation(None, |id| id.to_string());
        assert!(seen.starts_with("corr-"));
        assert_eq!(ctx.correlation_id(), None);
    }

    #[test]
    fn test_with_correlation_cleans_up_on_panic() {
        let ctx = TraceContext::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ctx.with_correlation(Some("req-1".to_string()), |_| panic!("handler failed"))
        }));
        assert!(result.is_err());
        assert_eq!(ctx.correlation_id(), None);
    }

    #[test]
    fn test_nested_scope_clears_on_exit() {
        let ctx = TraceContext::new();
        ctx.with_trace(Some("outer".to_string()), |_| {
            ctx.with_trace(Some("inner".to_string()), |id| assert_eq!(id, "inner"));
            assert_eq!(ctx.trace_id(), None);
        });
        assert_eq!(ctx.trace_id(), None);
    }

    #[test]
    fn test_scope_clears_manually_started_id() {
        let ctx = TraceContext::new();
        ctx.start_correlation(Some("outer".to_string()));
        ctx.with_correlation(Some("inner".to_string()), |_| ());
        assert_eq!(ctx.correlation_id(), None);
    }

    #[test]
    fn test_interleaved_scopes_leave_nothing_active() {
        let ctx = TraceContext::new();
        let a = ctx.correlation_scope(Some("a".to_string()));
        let b = ctx.correlation_scope(Some("b".to_string()));
        assert_eq!(ctx.correlation_id().as_deref(), Some("b"));

        drop(a);
        drop(b);
        assert_eq!(ctx.correlation_id(), None);
    }

    #[test]
    fn test_async_scope_cleans_up() {
        let ctx = TraceContext::new();
        let observed = tokio_test::block_on(ctx.with_correlation_async(
            Some("job-7".to_string()),
            async { ctx.correlation_id() },
        ));
        assert_eq!(observed.as_deref(), Some("job-7"));
        assert_eq!(ctx.correlation_id(), None);
    }

    #[test]
    fn test_async_scope_cleans_up_on_drop() {
        let ctx = TraceContext::new();
        let mut task = tokio_test::task::spawn(ctx.with_trace_async(
            Some("pending".to_string()),
            std::future::pending::<()>(),
        ));
        assert!(task.poll().is_pending());
        assert_eq!(ctx.trace_id().as_deref(), Some("pending"));

        drop(task);
        assert_eq!(ctx.trace_id(), None);
    }
}
