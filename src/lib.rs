//! Dispatch Core
//!
//! A fixed-capacity, thread-safe priority queue that hands work items from
//! producer threads to worker threads, plus the pool and wiring around it.
//!
//! # Contract
//!
//! - **Bounded**: `enqueue` never blocks; a full queue rejects the item and
//!   returns it to the producer.
//! - **Ordered**: every dequeue yields the highest-priority resident item.
//!   Equal priorities are not FIFO.
//! - **Blocking or not**: consumers choose between waiting for work and an
//!   immediate empty result.
//!
//! Accepting connections, computing priorities and handling jobs belong to
//! the caller.

pub mod config;
pub mod scheduler;
pub mod telemetry;

use std::sync::Arc;

use thiserror::Error;

use scheduler::{
    BoundedPriorityQueue, EnqueueError, Handler, PoolError, PoolStats, QueueError, WorkItem,
    WorkerPool, WorkerPoolConfig,
};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub queue_capacity: usize,
    pub pool: WorkerPoolConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            pool: WorkerPoolConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("queue construction failed: {0}")]
    Queue(#[from] QueueError),

    #[error("worker pool failed to start: {0}")]
    Pool(#[from] PoolError),
}

/// A running dispatch queue with its worker pool.
pub struct Runtime {
    queue: Arc<BoundedPriorityQueue<WorkItem>>,
    pool: WorkerPool<WorkItem>,
}

impl Runtime {
    /// Build the queue and start the workers.
    pub fn start<H: Handler<WorkItem>>(config: RuntimeConfig, handler: H) -> Result<Self, RuntimeError> {
        telemetry::describe_metrics();
        let queue = Arc::new(BoundedPriorityQueue::new(config.queue_capacity)?);
        let pool = WorkerPool::spawn(Arc::clone(&queue), handler, config.pool)?;
        Ok(Self { queue, pool })
    }

    /// Handle for producer threads.
    pub fn queue(&self) -> Arc<BoundedPriorityQueue<WorkItem>> {
        Arc::clone(&self.queue)
    }

    /// Enqueue on behalf of a producer.
    pub fn submit(&self, item: WorkItem) -> Result<(), EnqueueError<WorkItem>> {
        self.queue.enqueue(item)
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Stop accepting work, finish resident items, join the workers.
    pub fn shutdown(self) -> PoolStats {
        self.pool.shutdown()
    }
}
