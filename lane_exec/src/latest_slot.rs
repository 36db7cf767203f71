//! # Latest slot
//!
//! A single item hand-off between a producer and a consumer thread where only
//! the most recent item matters. Putting into a full slot replaces the item
//! waiting there, so a slow consumer always gets the freshest frame and never
//! a backlog.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Single slot, latest-wins hand-off. Share it between threads in an `Arc`.
pub struct LatestSlot<T> {
    inner: Mutex<Inner<T>>,
    cond: Condvar,
}

struct Inner<T> {
    item: Option<T>,
    closed: bool,
    num_replaced: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of waiting on the slot.
#[derive(Debug, PartialEq)]
pub enum SlotRecv<T> {
    /// The item that was waiting
    Item(T),

    /// Nothing arrived within the timeout
    Timeout,

    /// The slot is empty and the producer has finished
    Closed,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                item: None,
                closed: false,
                num_replaced: 0,
            }),
            cond: Condvar::new(),
        }
    }

    /// Put an item in the slot, returning `true` if it replaced one that was
    /// never taken.
    pub fn put(&self, item: T) -> bool {
        let mut inner = self.lock();
        let replaced = inner.item.replace(item).is_some();
        if replaced {
            inner.num_replaced += 1;
        }
        drop(inner);

        self.cond.notify_one();
        replaced
    }

    /// Wait up to `timeout` for an item.
    ///
    /// An item already in the slot is returned even if the slot has been
    /// closed.
    pub fn take_timeout(&self, timeout: Duration) -> SlotRecv<T> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.lock();

        loop {
            if let Some(item) = inner.item.take() {
                return SlotRecv::Item(item);
            }
            if inner.closed {
                return SlotRecv::Closed;
            }

            let now = Instant::now();
            if now >= deadline {
                return SlotRecv::Timeout;
            }

            inner = match self.cond.wait_timeout(inner, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Mark the producer as finished and wake any waiting consumer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.cond.notify_all();
    }

    /// Number of items overwritten before being taken.
    pub fn num_replaced(&self) -> u64 {
        self.lock().num_replaced
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // Ignore poisoning
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
