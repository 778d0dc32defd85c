//! Tests for the dispatch queue's single-threaded contract.

use std::time::{Duration, Instant};

use super::{BoundedPriorityQueue, EnqueueError, QueueError, WorkItem};

fn item(priority: i64) -> WorkItem {
    WorkItem::new(priority as u64, format!("/p{priority}"), priority)
}

fn priorities(items: Vec<WorkItem>) -> Vec<i64> {
    items.into_iter().map(|i| i.priority).collect()
}

#[test]
fn zero_capacity_is_rejected() {
    let err = BoundedPriorityQueue::<WorkItem>::new(0).unwrap_err();
    assert_eq!(err, QueueError::InvalidCapacity);
}

#[test]
fn huge_capacity_reports_allocation_failure() {
    let err = BoundedPriorityQueue::<WorkItem>::new(usize::MAX).unwrap_err();
    assert_eq!(err, QueueError::AllocationFailed { capacity: usize::MAX });
}

#[test]
fn capacity_two_scenario() {
    let q = BoundedPriorityQueue::new(2).unwrap();
    assert!(q.enqueue(item(5)).is_ok());
    assert!(q.enqueue(item(9)).is_ok());

    let rejected = q.enqueue(item(1)).unwrap_err();
    assert!(rejected.is_full());
    assert_eq!(rejected.into_inner().priority, 1);

    assert_eq!(q.dequeue(false).map(|i| i.priority), Some(9));
    assert_eq!(q.dequeue(false).map(|i| i.priority), Some(5));
    assert!(q.dequeue(false).is_none());
}

#[test]
fn capacity_three_with_duplicate_priorities() {
    let q = BoundedPriorityQueue::new(3).unwrap();
    for p in [3, 7, 7] {
        q.enqueue(item(p)).unwrap();
    }
    assert!(matches!(q.enqueue(item(2)), Err(EnqueueError::Full(_))));

    let order: Vec<i64> = std::iter::from_fn(|| q.try_dequeue()).map(|i| i.priority).collect();
    assert_eq!(order, vec![7, 7, 3]);
}

#[test]
fn full_enqueue_leaves_queue_unchanged() {
    let q = BoundedPriorityQueue::new(2).unwrap();
    q.enqueue(item(1)).unwrap();
    q.enqueue(item(2)).unwrap();
    let before = q.stats();

    let _ = q.enqueue(item(100));

    let after = q.stats();
    assert_eq!(after.depth, before.depth);
    assert_eq!(after.enqueued, before.enqueued);
    assert_eq!(after.rejected, before.rejected + 1);
    assert_eq!(q.peek_priority(), Some(2));
}

#[test]
fn empty_nonblocking_dequeue_returns_immediately() {
    let q: BoundedPriorityQueue = BoundedPriorityQueue::new(4).unwrap();
    let start = Instant::now();
    assert!(q.dequeue(false).is_none());
    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(q.stats().dequeued, 0);
    assert!(q.is_empty());
}

#[test]
fn negative_priorities_order_correctly() {
    let q = BoundedPriorityQueue::new(4).unwrap();
    for p in [-5, 0, -1, -10] {
        q.enqueue(item(p)).unwrap();
    }
    assert_eq!(priorities(q.drain()), vec![0, -1, -5, -10]);
}

#[test]
fn dequeue_timeout_expires_on_empty_queue() {
    let q: BoundedPriorityQueue = BoundedPriorityQueue::new(1).unwrap();
    let start = Instant::now();
    assert!(q.dequeue_timeout(Duration::from_millis(30)).is_none());
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn dequeue_timeout_returns_resident_item() {
    let q = BoundedPriorityQueue::new(1).unwrap();
    q.enqueue(item(4)).unwrap();
    assert_eq!(q.dequeue_timeout(Duration::from_secs(5)).map(|i| i.priority), Some(4));
}

#[test]
fn closed_queue_refuses_enqueue_but_yields_residents() {
    let q = BoundedPriorityQueue::new(4).unwrap();
    q.enqueue(item(1)).unwrap();
    q.enqueue(item(8)).unwrap();
    q.close();
    q.close();

    assert!(q.is_closed());
    let err = q.enqueue(item(3)).unwrap_err();
    assert!(err.is_closed());

    assert_eq!(q.dequeue_blocking().map(|i| i.priority), Some(8));
    assert_eq!(q.dequeue_blocking().map(|i| i.priority), Some(1));
    // Closed and empty: blocking dequeue must not hang.
    assert!(q.dequeue_blocking().is_none());
}

#[test]
fn stats_track_high_water_mark() {
    let q = BoundedPriorityQueue::new(8).unwrap();
    for p in 0..5 {
        q.enqueue(item(p)).unwrap();
    }
    q.try_dequeue();
    q.try_dequeue();
    q.enqueue(item(9)).unwrap();

    let stats = q.stats();
    assert_eq!(stats.capacity, 8);
    assert_eq!(stats.depth, 4);
    assert_eq!(stats.high_water, 5);
    assert_eq!(stats.enqueued, 6);
    assert_eq!(stats.dequeued, 2);
    assert_eq!(stats.rejected, 0);
}

#[test]
fn delay_and_path_survive_the_round_trip() {
    let q = BoundedPriorityQueue::new(2).unwrap();
    let original = WorkItem::new(42u64, "/reports/q3", 6).with_delay(Duration::from_secs(2));
    q.enqueue(original.clone()).unwrap();
    assert_eq!(q.try_dequeue(), Some(original));
}

#[test]
fn enqueue_error_display() {
    let full: EnqueueError<WorkItem> = EnqueueError::Full(item(1));
    let closed: EnqueueError<WorkItem> = EnqueueError::Closed(item(1));
    assert_eq!(full.to_string(), "dispatch queue is full");
    assert_eq!(closed.to_string(), "dispatch queue is closed");
    assert_eq!(format!("{full:?}"), "Full(..)");
}
