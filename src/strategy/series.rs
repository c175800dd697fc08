//! Bounded Series Buffer
//!
//! Fixed-capacity FIFO of observations. Appending past capacity evicts
//! from the head; there is no removal from the middle and no reordering.

use std::collections::VecDeque;

/// Capacity-bounded, insertion-ordered series
#[derive(Debug, Clone)]
pub struct SeriesBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> SeriesBuffer<T> {
    /// Create an empty buffer. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append at the tail, evicting from the head until `len == capacity`.
    /// Returns the number of evicted items.
    pub fn append(&mut self, item: T) -> usize {
        self.items.push_back(item);

        let mut evicted = 0;
        while self.items.len() > self.capacity {
            self.items.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Oldest-first iteration
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Map every item to a value, oldest first
    pub fn values<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(&T) -> f64,
    {
        self.items.iter().map(f).collect()
    }
}
