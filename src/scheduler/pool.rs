//! Worker threads that consume the dispatch queue.
//!
//! Each worker loops on a blocking dequeue and hands every item to a shared
//! [`Handler`]. Shutdown closes the queue, lets the workers drain what is
//! still resident, then joins them.

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;

use super::item::Prioritized;
use super::queue::BoundedPriorityQueue;
use crate::telemetry::{self, DispatchSpan};

/// Work executed for every dequeued item.
pub trait Handler<T>: Send + Sync + 'static {
    fn handle(&self, item: T);
}

impl<T, F> Handler<T> for F
where
    F: Fn(T) + Send + Sync + 'static,
{
    fn handle(&self, item: T) {
        self(item)
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    pub workers: NonZeroUsize,
    /// Stack size per thread in bytes (0 = platform default).
    pub stack_size: usize,
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN),
            stack_size: 0,
            thread_name_prefix: "dispatch-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Config with a specific worker count (at least one).
    pub fn with_workers(count: usize) -> Self {
        Self {
            workers: NonZeroUsize::new(count).unwrap_or(NonZeroUsize::MIN),
            ..Default::default()
        }
    }
}

/// Counters reported by a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub processed: u64,
    pub panicked: u64,
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to spawn worker {worker_id}: {source}")]
    Spawn {
        worker_id: usize,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Default)]
struct Counters {
    processed: AtomicU64,
    panicked: AtomicU64,
}

/// Fixed set of OS threads draining one queue.
pub struct WorkerPool<T: Prioritized + Send + 'static> {
    queue: Arc<BoundedPriorityQueue<T>>,
    handles: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
    workers: usize,
}

impl<T: Prioritized + Send + 'static> WorkerPool<T> {
    /// Start `config.workers` threads consuming `queue`.
    ///
    /// If a thread cannot be spawned, the queue is closed, the workers that
    /// did start are joined, and the error is returned.
    pub fn spawn<H: Handler<T>>(
        queue: Arc<BoundedPriorityQueue<T>>,
        handler: H,
        config: WorkerPoolConfig,
    ) -> Result<Self, PoolError> {
        let handler = Arc::new(handler);
        let counters = Arc::new(Counters::default());
        let workers = config.workers.get();
        let mut handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, worker_id));
            if config.stack_size > 0 {
                builder = builder.stack_size(config.stack_size);
            }

            let queue_for_worker = Arc::clone(&queue);
            let handler_for_worker = Arc::clone(&handler);
            let counters_for_worker = Arc::clone(&counters);
            let spawned = builder.spawn(move || {
                worker_loop(worker_id, &queue_for_worker, &*handler_for_worker, &counters_for_worker);
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    tracing::error!(worker_id, error = %source, "worker spawn failed");
                    queue.close();
                    join_all(handles);
                    return Err(PoolError::Spawn { worker_id, source });
                }
            }
        }

        tracing::info!(workers, capacity = queue.capacity(), "worker pool started");
        Ok(Self {
            queue,
            handles,
            counters,
            workers,
        })
    }

    pub fn num_workers(&self) -> usize {
        self.workers
    }

    pub fn queue(&self) -> &Arc<BoundedPriorityQueue<T>> {
        &self.queue
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            workers: self.workers,
            processed: self.counters.processed.load(Ordering::Acquire),
            panicked: self.counters.panicked.load(Ordering::Acquire),
        }
    }

    /// Close the queue, drain remaining items through the handler, join workers.
    pub fn shutdown(mut self) -> PoolStats {
        self.stop();
        self.stats()
    }

    fn stop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        self.queue.close();
        join_all(std::mem::take(&mut self.handles));
        tracing::info!(
            processed = self.counters.processed.load(Ordering::Acquire),
            "worker pool stopped"
        );
    }
}

impl<T: Prioritized + Send + 'static> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        // Handler panics are caught inside the loop; a join error here means
        // the worker itself died, which leaves nothing to recover.
        let _ = handle.join();
    }
}

fn worker_loop<T: Prioritized, H: Handler<T> + ?Sized>(
    worker_id: usize,
    queue: &BoundedPriorityQueue<T>,
    handler: &H,
    counters: &Counters,
) {
    let _worker = DispatchSpan::worker(worker_id).entered();
    tracing::debug!("worker started");

    while let Some(item) = queue.dequeue_blocking() {
        let span = DispatchSpan::handle(item.priority());
        let _entered = span.enter();

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(item))) {
            Ok(()) => {
                span.record("status", "ok");
                counters.processed.fetch_add(1, Ordering::AcqRel);
            }
            Err(_) => {
                span.record("status", "panicked");
                counters.panicked.fetch_add(1, Ordering::AcqRel);
                telemetry::record_handler_panic(worker_id);
                tracing::error!(worker_id, "handler panicked; worker continues");
            }
        }
    }

    tracing::debug!("worker exiting: queue closed and drained");
}
