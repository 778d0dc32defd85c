//! Telemetry for the dispatch queue.
//!
//! Structured logging via `tracing`, counters and gauges via the `metrics`
//! facade. The crate never installs a metrics exporter itself.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    describe_metrics, record_consumer_wait, record_dequeued, record_enqueued,
    record_handler_panic, record_rejected, RejectReason, CONSUMER_WAIT_SECONDS, DEQUEUED_TOTAL,
    ENQUEUED_TOTAL, HANDLER_PANICS_TOTAL, QUEUE_DEPTH, REJECTED_TOTAL,
};
pub use spans::DispatchSpan;
