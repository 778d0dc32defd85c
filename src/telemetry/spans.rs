//! Span factories for worker threads and dispatched items.

use tracing::{debug_span, info_span, Span};

/// Factory for standardized dispatch spans.
pub struct DispatchSpan;

impl DispatchSpan {
    /// Span entered for the whole life of a worker thread.
    pub fn worker(worker_id: usize) -> Span {
        info_span!("dispatch_worker", worker_id)
    }

    /// Span around a single handler invocation.
    ///
    /// `status` is filled in once the handler returns.
    pub fn handle(priority: i64) -> Span {
        debug_span!("dispatch_handle", priority, status = tracing::field::Empty)
    }
}
