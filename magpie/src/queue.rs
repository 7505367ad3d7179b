use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex};

use tracing::{debug, trace};

use crate::error::{ConfigError, PushError};

const POISONED: &str = "queue mutex poisoned";

/// State guarded by the queue mutex. The buffer and the closed flag are the
/// only mutable shared state in the whole system.
struct Shared<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A capacity-bounded FIFO queue safe for concurrent producers and
/// consumers.
///
/// Items are popped in the order they were pushed, globally, regardless of
/// which consumer pops them. A full queue blocks producers (backpressure);
/// an empty queue blocks consumers. Closing the inlet is a one-way
/// transition: blocked producers unblock with a rejection, while consumers
/// keep draining whatever was buffered and only then observe the terminal
/// `None`.
///
/// # Thread Safety
/// - One mutex guards the buffer and the closed flag
/// - Two condition variables (`not_full`, `not_empty`) carry the wakeups
/// - The lock is never held across a blocking wait, and callers never hold
///   it while running application code
///
/// # Wakeup discipline
/// A push notifies one blocked consumer only when it transitions the queue
/// out of "empty"; a pop notifies one blocked producer only when it
/// transitions the queue out of "full". Closing notifies everyone on both
/// conditions, since all of them must re-evaluate the terminal state.
pub struct BoundedQueue<T> {
    capacity: usize,
    shared: Mutex<Shared<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.lock().expect(POISONED);
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &shared.items.len())
            .field("closed", &shared.closed)
            .finish()
    }
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// `capacity` must be at least 1; zero is a construction error, not a
    /// clamp.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            shared: Mutex::new(Shared {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Append an item at the tail, blocking while the queue is full and
    /// still open.
    ///
    /// Returns the item back inside the error if the queue is closed, or
    /// becomes closed while this call is blocked. The buffer is never
    /// modified on rejection.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut shared = self.shared.lock().expect(POISONED);
        while shared.items.len() == self.capacity && !shared.closed {
            shared = self.not_full.wait(shared).expect(POISONED);
        }
        if shared.closed {
            return Err(PushError(item));
        }
        let was_empty = shared.items.is_empty();
        shared.items.push_back(item);
        if was_empty {
            self.not_empty.notify_one();
        }
        Ok(())
    }

    /// Remove and return the head item, blocking while the queue is empty
    /// and still open.
    ///
    /// `None` is the terminal signal: it is only returned once the queue is
    /// closed AND fully drained. Every item pushed before the close is
    /// handed out first.
    pub fn pop(&self) -> Option<T> {
        let mut shared = self.shared.lock().expect(POISONED);
        while shared.items.is_empty() && !shared.closed {
            shared = self.not_empty.wait(shared).expect(POISONED);
        }
        let was_full = shared.items.len() == self.capacity;
        let item = shared.items.pop_front()?;
        if was_full {
            self.not_full.notify_one();
        }
        Some(item)
    }

    /// Remove and return the head item without blocking.
    ///
    /// `None` only means "nothing buffered right now"; it does not
    /// distinguish a closed queue from a momentarily empty one.
    pub fn try_pop(&self) -> Option<T> {
        let mut shared = self.shared.lock().expect(POISONED);
        let was_full = shared.items.len() == self.capacity;
        let item = shared.items.pop_front()?;
        if was_full {
            self.not_full.notify_one();
        }
        Some(item)
    }

    /// Remove and discard everything currently buffered, without blocking.
    ///
    /// Returns the number of items discarded. Producers blocked on a full
    /// queue are woken since their slots just freed up. Typical use is
    /// aborting pending work: `close()`, then `drain()`.
    pub fn drain(&self) -> usize {
        let mut shared = self.shared.lock().expect(POISONED);
        let discarded = shared.items.len();
        shared.items.clear();
        drop(shared);
        if discarded > 0 {
            self.not_full.notify_all();
        }
        trace!(discarded, "queue drained");
        discarded
    }

    /// Close the queue inlet. One-way and idempotent.
    ///
    /// After this returns, every push (blocked or future) fails, and pops
    /// keep succeeding exactly until the buffer is empty.
    pub fn close(&self) {
        let mut shared = self.shared.lock().expect(POISONED);
        if shared.closed {
            return;
        }
        shared.closed = true;
        drop(shared);
        // Everyone blocked on either condition must re-check the terminal
        // state, so this is the one place that notifies all.
        self.not_full.notify_all();
        self.not_empty.notify_all();
        debug!("queue inlet closed");
    }

    /// Maximum number of items the queue can buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the inlet has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().expect(POISONED).closed
    }

    /// Number of items currently buffered. A snapshot: it may be stale by
    /// the time the value is used.
    pub fn len(&self) -> usize {
        self.shared.lock().expect(POISONED).items.len()
    }

    /// Whether the buffer is currently empty. A snapshot, like `len`.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().expect(POISONED).items.is_empty()
    }
}
