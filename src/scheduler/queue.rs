//! Bounded, thread-safe priority queue.
//!
//! Producers call [`BoundedPriorityQueue::enqueue`], which never blocks: a
//! full queue hands the item straight back. Consumers call
//! [`BoundedPriorityQueue::dequeue`], either returning immediately or
//! suspending on a condition variable until an item arrives.
//!
//! One `parking_lot::Mutex` guards the heap and its bookkeeping. Waiters
//! re-check emptiness after every wake, so spurious wakeups and consumers
//! racing for a single item are harmless.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use thiserror::Error;

use super::heap::BoundedHeap;
use super::item::{Prioritized, WorkItem};
use crate::telemetry::{self, RejectReason};

/// Errors raised while constructing a queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue capacity must be greater than zero")]
    InvalidCapacity,

    #[error("failed to allocate queue buffer for {capacity} items")]
    AllocationFailed { capacity: usize },
}

/// A refused enqueue. The item is handed back to the producer.
#[derive(PartialEq, Eq)]
pub enum EnqueueError<T> {
    /// The queue is at capacity.
    Full(T),
    /// The queue has been closed.
    Closed(T),
}

impl<T> EnqueueError<T> {
    /// Recover the rejected item.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Closed(item) => item,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => write!(f, "dispatch queue is full"),
            Self::Closed(_) => write!(f, "dispatch queue is closed"),
        }
    }
}

impl<T> std::error::Error for EnqueueError<T> {}

/// Point-in-time counters for a queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub capacity: usize,
    pub depth: usize,
    /// Largest depth ever observed.
    pub high_water: usize,
    pub enqueued: u64,
    pub rejected: u64,
    pub dequeued: u64,
}

struct QueueState<T> {
    heap: BoundedHeap<T>,
    closed: bool,
    high_water: usize,
    enqueued: u64,
    rejected: u64,
    dequeued: u64,
}

/// Fixed-capacity max-priority queue shared between producer and consumer threads.
///
/// Among items of equal priority, retrieval order follows heap shape and is
/// not FIFO.
pub struct BoundedPriorityQueue<T = WorkItem> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedPriorityQueue<T> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.state.lock().heap.is_full()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            capacity: self.capacity,
            depth: state.heap.len(),
            high_water: state.high_water,
            enqueued: state.enqueued,
            rejected: state.rejected,
            dequeued: state.dequeued,
        }
    }

    /// Stop accepting work and wake every suspended consumer.
    ///
    /// Resident items stay dequeuable. Once the queue is closed and empty,
    /// blocking dequeues return `None` instead of waiting. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let remaining = state.heap.len();
        drop(state);

        self.not_empty.notify_all();
        tracing::info!(remaining, "dispatch queue closed");
    }
}

impl<T: Prioritized> BoundedPriorityQueue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// The whole buffer is reserved here; no operation allocates afterwards.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }
        let heap = BoundedHeap::with_capacity(capacity)
            .map_err(|_| QueueError::AllocationFailed { capacity })?;

        tracing::info!(capacity, "dispatch queue created");
        Ok(Self {
            state: Mutex::new(QueueState {
                heap,
                closed: false,
                high_water: 0,
                enqueued: 0,
                rejected: 0,
                dequeued: 0,
            }),
            not_empty: Condvar::new(),
            capacity,
        })
    }

    /// Insert an item. Never blocks.
    ///
    /// On success exactly one suspended consumer, if any, is woken. A full or
    /// closed queue returns the item untouched and wakes nobody.
    pub fn enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            state.rejected += 1;
            drop(state);
            telemetry::record_rejected(RejectReason::Closed);
            tracing::debug!("enqueue refused: queue closed");
            return Err(EnqueueError::Closed(item));
        }

        let priority = item.priority();
        if let Err(item) = state.heap.push(item) {
            state.rejected += 1;
            drop(state);
            telemetry::record_rejected(RejectReason::Full);
            tracing::debug!(priority, capacity = self.capacity, "enqueue refused: queue full");
            return Err(EnqueueError::Full(item));
        }

        state.enqueued += 1;
        let depth = state.heap.len();
        state.high_water = state.high_water.max(depth);
        drop(state);

        self.not_empty.notify_one();
        telemetry::record_enqueued(depth);
        tracing::trace!(priority, depth, "enqueued");
        Ok(())
    }

    /// Remove the highest-priority item.
    ///
    /// With `blocking == false` an empty queue returns `None` at once. With
    /// `blocking == true` the caller waits until an item is available; `None`
    /// is only returned once the queue has been closed and drained.
    pub fn dequeue(&self, blocking: bool) -> Option<T> {
        let mut state = self.state.lock();
        if blocking && state.heap.is_empty() && !state.closed {
            let started = Instant::now();
            while state.heap.is_empty() && !state.closed {
                self.not_empty.wait(&mut state);
            }
            telemetry::record_consumer_wait(started.elapsed());
        }
        self.take(state)
    }

    /// Non-blocking dequeue.
    pub fn try_dequeue(&self) -> Option<T> {
        self.dequeue(false)
    }

    /// Blocking dequeue.
    pub fn dequeue_blocking(&self) -> Option<T> {
        self.dequeue(true)
    }

    /// Blocking dequeue that gives up after `timeout`.
    ///
    /// Returns `None` if the queue is still empty at the deadline, or closed and empty.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.dequeue(true);
        };

        let mut state = self.state.lock();
        if state.heap.is_empty() && !state.closed {
            let started = Instant::now();
            while state.heap.is_empty() && !state.closed {
                if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                    break;
                }
            }
            telemetry::record_consumer_wait(started.elapsed());
        }
        self.take(state)
    }

    /// Remove every resident item, highest priority first.
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();
        let mut drained = Vec::with_capacity(state.heap.len());
        while let Some(item) = state.heap.pop() {
            drained.push(item);
        }
        state.dequeued += drained.len() as u64;
        drop(state);

        telemetry::record_dequeued(drained.len() as u64, 0);
        tracing::debug!(count = drained.len(), "queue drained");
        drained
    }

    /// Priority of the item the next dequeue would return.
    pub fn peek_priority(&self) -> Option<i64> {
        self.state.lock().heap.peek().map(Prioritized::priority)
    }

    /// Check the max-heap property over the resident items. O(n).
    pub fn heap_invariant_holds(&self) -> bool {
        self.state.lock().heap.is_heap()
    }

    fn take(&self, mut state: MutexGuard<'_, QueueState<T>>) -> Option<T> {
        let Some(item) = state.heap.pop() else {
            drop(state);
            tracing::trace!("dequeue found queue empty");
            return None;
        };
        state.dequeued += 1;
        let depth = state.heap.len();
        drop(state);

        telemetry::record_dequeued(1, depth);
        tracing::trace!(priority = item.priority(), depth, "dequeued");
        Some(item)
    }
}

impl<T> fmt::Debug for BoundedPriorityQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedPriorityQueue")
            .field("capacity", &self.capacity)
            .field("len", &state.heap.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<T> Drop for BoundedPriorityQueue<T> {
    fn drop(&mut self) {
        let discarded = self.state.get_mut().heap.len();
        if discarded > 0 {
            tracing::debug!(discarded, "dispatch queue dropped with resident items");
        }
    }
}
