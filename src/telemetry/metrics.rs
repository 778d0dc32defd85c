//! Metric names and recording helpers.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

pub const QUEUE_DEPTH: &str = "dispatch_queue_depth";
pub const ENQUEUED_TOTAL: &str = "dispatch_enqueued_total";
pub const REJECTED_TOTAL: &str = "dispatch_rejected_total";
pub const DEQUEUED_TOTAL: &str = "dispatch_dequeued_total";
pub const CONSUMER_WAIT_SECONDS: &str = "dispatch_consumer_wait_seconds";
pub const HANDLER_PANICS_TOTAL: &str = "dispatch_handler_panics_total";

/// Why an enqueue was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Full,
    Closed,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Closed => "closed",
        }
    }
}

/// Register descriptions with whatever recorder is installed.
///
/// Safe to call more than once; a no-op without a recorder.
pub fn describe_metrics() {
    describe_gauge!(QUEUE_DEPTH, Unit::Count, "Items currently resident in the dispatch queue");
    describe_counter!(ENQUEUED_TOTAL, Unit::Count, "Items accepted by enqueue");
    describe_counter!(REJECTED_TOTAL, Unit::Count, "Items refused by enqueue, by reason");
    describe_counter!(DEQUEUED_TOTAL, Unit::Count, "Items handed to consumers");
    describe_histogram!(
        CONSUMER_WAIT_SECONDS,
        Unit::Seconds,
        "Time a consumer spent suspended waiting for work"
    );
    describe_counter!(HANDLER_PANICS_TOTAL, Unit::Count, "Worker handlers that panicked");
}

pub fn record_enqueued(depth: usize) {
    counter!(ENQUEUED_TOTAL).increment(1);
    gauge!(QUEUE_DEPTH).set(depth as f64);
}

pub fn record_rejected(reason: RejectReason) {
    counter!(REJECTED_TOTAL, "reason" => reason.as_str()).increment(1);
}

pub fn record_dequeued(count: u64, depth: usize) {
    counter!(DEQUEUED_TOTAL).increment(count);
    gauge!(QUEUE_DEPTH).set(depth as f64);
}

pub fn record_consumer_wait(waited: Duration) {
    histogram!(CONSUMER_WAIT_SECONDS).record(waited.as_secs_f64());
}

pub fn record_handler_panic(worker_id: usize) {
    counter!(HANDLER_PANICS_TOTAL, "worker" => worker_id.to_string()).increment(1);
}
