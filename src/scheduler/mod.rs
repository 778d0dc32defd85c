//! Dispatch scheduling.
//!
//! A bounded max-priority queue shared by producer and consumer threads,
//! plus a worker pool that drains it.

mod heap;
mod item;
mod pool;
mod queue;

#[cfg(test)]
mod queue_tests;

pub use heap::BoundedHeap;
pub use item::{ClientHandle, Prioritized, WorkItem};
pub use pool::{Handler, PoolError, PoolStats, WorkerPool, WorkerPoolConfig};
pub use queue::{BoundedPriorityQueue, EnqueueError, QueueError, QueueStats};
