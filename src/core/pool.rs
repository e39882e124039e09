//! Fixed-capacity free list for short-lived values
//!
//! Checkout and return are the only mutation points. A value handed back
//! with [`Pool::give_back`] is reset before it becomes visible to the next
//! checkout, and the returner must not keep any reference to it.

use crossbeam_queue::ArrayQueue;

/// A value that can be recycled through a [`Pool`]
pub trait Poolable: Default + Send {
    /// Restore every field to its default, keeping allocations where useful
    fn reset(&mut self);
}

pub struct Pool<T: Poolable> {
    free: ArrayQueue<T>,
}

impl<T: Poolable> Pool<T> {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
        }
    }

    /// Take a zeroed value, allocating when the free list is empty
    pub fn checkout(&self) -> T {
        self.free.pop().unwrap_or_default()
    }

    /// Reset and return a value; it is dropped if the free list is full
    pub fn give_back(&self, mut value: T) {
        value.reset();
        let _ = self.free.push(value);
    }

    /// Number of values waiting on the free list
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
