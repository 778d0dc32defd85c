//! Fixed-capacity binary max-heap.
//!
//! Array layout: the children of index `i` live at `2i + 1` and `2i + 2`.
//! Both repair walks are iterative. There is no secondary key, so items with
//! equal priority come out in an order decided by heap shape, not insertion
//! order.

use std::collections::TryReserveError;

use super::item::Prioritized;

/// Binary max-heap that never holds more than `capacity` items.
#[derive(Debug)]
pub struct BoundedHeap<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedHeap<T> {
    /// Reserve storage for exactly `capacity` items up front.
    ///
    /// The buffer is never reallocated afterwards.
    pub fn with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut items = Vec::new();
        items.try_reserve_exact(capacity)?;
        Ok(Self { items, capacity })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Prioritized> BoundedHeap<T> {
    /// Insert an item, handing it back if the heap is full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
        Ok(())
    }

    /// Remove the highest-priority item.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.items.pop()?;
        if self.items.is_empty() {
            return Some(last);
        }
        let top = std::mem::replace(&mut self.items[0], last);
        self.sift_down(0);
        Some(top)
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Check the max-heap property over the whole buffer. O(n).
    pub fn is_heap(&self) -> bool {
        (1..self.items.len()).all(|child| {
            let parent = (child - 1) / 2;
            self.items[parent].priority() >= self.items[child].priority()
        })
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            // Strict: an equal parent stays put.
            if self.items[index].priority() <= self.items[parent].priority() {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut largest = index;

            if left < len && self.items[left].priority() > self.items[largest].priority() {
                largest = left;
            }
            if right < len && self.items[right].priority() > self.items[largest].priority() {
                largest = right;
            }
            if largest == index {
                break;
            }
            self.items.swap(index, largest);
            index = largest;
        }
    }
}
