//! Bounded in-memory history of processed records.
//!
//! Append-only with FIFO eviction: once `capacity` records are held, each
//! append drops the oldest one first. Writers are serialized by an `RwLock`;
//! readers get a consistent snapshot.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

#[derive(Debug)]
struct Inner<T> {
    records: VecDeque<T>,
    total_appended: u64,
    evicted: u64,
}

#[derive(Debug)]
pub struct BoundedStore<T> {
    capacity: usize,
    inner: RwLock<Inner<T>>,
}

/// Counters describing the store's lifetime activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub count: usize,
    pub capacity: usize,
    pub total_appended: u64,
    pub evicted: u64,
}

impl StoreStats {
    /// Share of the capacity in use, as a percentage (0-100).
    pub fn usage_percent(&self) -> f64 {
        (self.count as f64 / self.capacity as f64) * 100.0
    }
}

impl<T: Clone> BoundedStore<T> {
    /// Create a store holding at most `capacity` records (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: RwLock::new(Inner {
                records: VecDeque::with_capacity(capacity.min(1024)),
                total_appended: 0,
                evicted: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a record, returning the evicted oldest record if the store was full.
    pub fn append(&self, record: T) -> Option<T> {
        // A panic while holding the lock cannot leave the deque half-updated,
        // so a poisoned lock is still safe to use.
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let evicted = if inner.records.len() >= self.capacity {
            inner.evicted += 1;
            inner.records.pop_front()
        } else {
            None
        };
        inner.records.push_back(record);
        inner.total_appended += 1;

        evicted
    }

    /// Snapshot of all records, oldest first.
    pub fn all(&self) -> Vec<T> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.records.iter().cloned().collect()
    }

    pub fn count(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.records.len()
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        StoreStats {
            count: inner.records.len(),
            capacity: self.capacity,
            total_appended: inner.total_appended,
            evicted: inner.evicted,
        }
    }
}
