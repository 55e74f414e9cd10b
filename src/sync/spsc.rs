//! Lock-free bounded SPSC queue for inter-thread communication.
//!
//! A wait-free bounded queue over a heap-allocated ring buffer with atomic
//! cursors.
//!
//! # Overview
//!
//! - [`Producer`] - Write end (single producer per queue)
//! - [`Consumer`] - Read end (single consumer per queue)
//! - No mutexes, no syscalls, no internal spinning: every operation is a
//!   bounded sequence of memory accesses, safe to call from the most
//!   latency-sensitive context
//!
//! # Example
//!
//! ```
//! use spindle::sync::spsc;
//!
//! let (producer, consumer) = spsc::channel::<u64, 1024>();
//!
//! // Producer thread
//! producer.try_push(42).expect("queue full");
//!
//! // Consumer thread
//! assert_eq!(consumer.try_pop(), Some(42));
//! ```
//!
//! Capacity `N` must be a power of two; one slot is reserved to tell full
//! from empty, so at most `N - 1` values are resident at once.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::spsc::ring::Ring;
use crate::sync::PushError;

/// Marker type to opt out of `Sync` while remaining `Send`.
type PhantomUnsync = PhantomData<Cell<&'static ()>>;

/// Write end of the SPSC queue.
///
/// # Thread Safety
///
/// `Producer` is [`Send`] but **not** [`Sync`]:
/// - Can transfer ownership to another thread
/// - Cannot share `&Producer` (no concurrent `try_push`)
pub struct Producer<T: Send, const N: usize> {
    ring: Arc<Ring<T, N>>,
    _unsync: PhantomUnsync,
}

/// Read end of the SPSC queue.
///
/// Only one consumer exists per queue. See [`Producer`] for thread safety
/// details (same semantics apply).
pub struct Consumer<T: Send, const N: usize> {
    ring: Arc<Ring<T, N>>,
    _unsync: PhantomUnsync,
}

/// Creates a new SPSC channel with capacity `N` (usable capacity `N - 1`).
///
/// Returns a `(Producer, Consumer)` pair that can be sent to different
/// threads.
///
/// Fails to compile unless `N` is a power of two >= 2.
#[must_use]
pub fn channel<T: Send, const N: usize>() -> (Producer<T, N>, Consumer<T, N>) {
    let ring = Arc::new(Ring::new());

    let producer = Producer {
        ring: Arc::clone(&ring),
        _unsync: PhantomData,
    };

    let consumer = Consumer {
        ring,
        _unsync: PhantomData,
    };

    (producer, consumer)
}

impl<T: Send, const N: usize> Producer<T, N> {
    /// Attempts to push an item onto the queue (wait-free).
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Full`] carrying the item back if no slot is
    /// free; the caller decides whether to retry, drop or escalate.
    #[inline]
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        // SAFETY: This handle is the queue's only producer: channel() hands
        // out exactly one, and Producer is neither Clone nor Sync.
        unsafe { self.ring.push(item) }.map_err(PushError::Full)
    }

    /// Attempts to push a batch of items, returning how many were written.
    ///
    /// Never writes more than the current free space; a batch that wraps
    /// the ring boundary is written in two contiguous copies and published
    /// with a single cursor update. Returns 0 if nothing fit.
    #[inline]
    pub fn try_push_bulk(&self, items: &[T]) -> usize
    where
        T: Copy,
    {
        // SAFETY: Single producer, as above.
        unsafe { self.ring.push_bulk(items) }
    }

    /// Number of resident elements. Advisory: may be stale immediately.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the queue is empty. Advisory under concurrent use.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Whether the queue is full. Advisory under concurrent use.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

impl<T: Send, const N: usize> Consumer<T, N> {
    /// Attempts to pop an item from the queue (wait-free).
    ///
    /// Returns `None` if the queue is empty; callers that need to wait
    /// poll by re-invoking.
    #[inline]
    #[must_use]
    pub fn try_pop(&self) -> Option<T> {
        // SAFETY: This handle is the queue's only consumer: channel() hands
        // out exactly one, and Consumer is neither Clone nor Sync.
        unsafe { self.ring.pop() }
    }

    /// Number of resident elements. Advisory: may be stale immediately.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the queue is empty. Advisory under concurrent use.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}
