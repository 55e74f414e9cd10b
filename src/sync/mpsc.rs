//! Lock-free MPSC queue for inter-thread communication.
//!
//! Many producers, one consumer, backed by a fixed-capacity node pool: no
//! heap allocation per push, no mutexes, no syscalls.
//!
//! # Overview
//!
//! - [`Producer`] - Write end; cloneable, any number of concurrent pushers
//! - [`Consumer`] - Read end; exactly one per queue
//!
//! # Example
//!
//! ```
//! use spindle::sync::mpsc;
//!
//! let (producer, consumer) = mpsc::channel::<u64, 1024>();
//! let second = producer.clone();
//!
//! producer.try_push(1).expect("pool exhausted");
//! second.try_push(2).expect("pool exhausted");
//!
//! assert!(consumer.try_pop().is_some());
//! assert!(consumer.try_pop().is_some());
//! ```
//!
//! # Capacity
//!
//! The backing pool is bump-only and one node anchors the chain as a stub,
//! so a queue of capacity `N` accepts at most `N - 1` pushes over its whole
//! lifetime. Once the pool is exhausted every further push fails; size `N`
//! for the total expected traffic, not the high-water mark.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::mpsc::queue::Queue;
use crate::sync::PushError;

/// Marker type to opt out of `Sync` while remaining `Send`.
type PhantomUnsync = PhantomData<Cell<&'static ()>>;

/// Write end of the MPSC queue.
///
/// Cloneable and shareable: pushes from any number of threads are totally
/// ordered by the queue's head exchange.
pub struct Producer<T: Send, const N: usize> {
    queue: Arc<Queue<T, N>>,
}

impl<T: Send, const N: usize> Clone for Producer<T, N> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

/// Read end of the MPSC queue.
///
/// Only one consumer exists per queue: `Consumer` is [`Send`] but not
/// [`Sync`] and not `Clone`, so concurrent pops cannot be expressed.
pub struct Consumer<T: Send, const N: usize> {
    queue: Arc<Queue<T, N>>,
    _unsync: PhantomUnsync,
}

/// Creates a new MPSC channel over a pool of `N` nodes.
///
/// Returns a `(Producer, Consumer)` pair; clone the producer for each
/// additional pushing thread.
///
/// Fails to compile unless `N >= 2` (one node is the stub).
#[must_use]
pub fn channel<T: Send, const N: usize>() -> (Producer<T, N>, Consumer<T, N>) {
    let queue = Arc::new(Queue::new());

    let producer = Producer {
        queue: Arc::clone(&queue),
    };

    let consumer = Consumer {
        queue,
        _unsync: PhantomData,
    };

    (producer, consumer)
}

impl<T: Send, const N: usize> Producer<T, N> {
    /// Attempts to push an item onto the queue (lock-free).
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Exhausted`] carrying the item back when the
    /// node pool has been permanently consumed. There is no recovery path:
    /// the caller plans capacity, it does not retry exhaustion away.
    #[inline]
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        self.queue.push(item).map_err(PushError::Exhausted)
    }

    /// Node slots never handed out. Advisory under concurrent pushes.
    #[inline]
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.queue.remaining_capacity()
    }
}

impl<T: Send, const N: usize> Consumer<T, N> {
    /// Attempts to pop the oldest item (wait-free).
    ///
    /// Returns `None` if the queue is empty; callers that need to wait
    /// poll by re-invoking.
    #[inline]
    #[must_use]
    pub fn try_pop(&self) -> Option<T> {
        // SAFETY: This handle is the queue's only consumer: channel() hands
        // out exactly one, and Consumer is neither Clone nor Sync.
        unsafe { self.queue.pop() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_push_pop() {
        let (producer, consumer) = channel::<u64, 8>();

        producer.try_push(42).unwrap();
        assert_eq!(consumer.try_pop(), Some(42));
        assert_eq!(consumer.try_pop(), None);
    }

    #[test]
    fn cloned_producers_share_the_pool() {
        let (producer, consumer) = channel::<u64, 4>();
        let second = producer.clone();

        producer.try_push(1).unwrap();
        second.try_push(2).unwrap();
        second.try_push(3).unwrap();
        // Stub + three payload nodes: the pool is now drained for good.
        assert_eq!(producer.try_push(4), Err(PushError::Exhausted(4)));
        assert_eq!(producer.remaining_capacity(), 0);

        assert_eq!(consumer.try_pop(), Some(1));
        assert_eq!(consumer.try_pop(), Some(2));
        assert_eq!(consumer.try_pop(), Some(3));
        assert_eq!(consumer.try_pop(), None);

        // Still exhausted after draining.
        assert_eq!(second.try_push(5), Err(PushError::Exhausted(5)));
    }

    #[test]
    fn exhausted_push_has_no_side_effect() {
        let (producer, consumer) = channel::<String, 2>();
        producer.try_push("only".to_string()).unwrap();

        let rejected = producer.try_push("extra".to_string());
        assert_eq!(
            rejected,
            Err(PushError::Exhausted("extra".to_string()))
        );

        // The rejected push altered nothing: the queue still yields exactly
        // the accepted item.
        assert_eq!(consumer.try_pop(), Some("only".to_string()));
        assert_eq!(consumer.try_pop(), None);
    }

    #[test]
    fn producers_across_threads_keep_per_producer_order() {
        use std::thread;

        const PRODUCERS: u64 = 4;
        const PER_PRODUCER: u64 = 1000;
        // Stub node plus every value ever pushed.
        const POOL: usize = (PRODUCERS * PER_PRODUCER + 1) as usize;

        let (producer, consumer) = channel::<(u64, u64), POOL>();

        let mut handles = vec![];
        for id in 0..PRODUCERS {
            let producer = producer.clone();
            handles.push(thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    producer.try_push((id, seq)).unwrap();
                }
            }));
        }

        // Consume concurrently with the producers, polling on empty.
        let mut last_seq = [None::<u64>; PRODUCERS as usize];
        let mut total = 0u64;
        while total < PRODUCERS * PER_PRODUCER {
            match consumer.try_pop() {
                Some((id, seq)) => {
                    let last = &mut last_seq[id as usize];
                    assert!(
                        last.map_or(seq == 0, |prev| seq == prev + 1),
                        "producer {id} out of order: {seq} after {last:?}"
                    );
                    *last = Some(seq);
                    total += 1;
                }
                None => std::hint::spin_loop(),
            }
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(consumer.try_pop(), None);
    }
}
