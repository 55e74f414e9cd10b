//! Core lock-free MPSC intrusive queue algorithm.
//!
//! Nodes come from a [`NodePool`] and are linked by `u32` indices, never raw
//! addresses. A stub node reserved at construction anchors the chain: head
//! and tail both start at the stub, so the head is never empty and the tail
//! is written by the consumer alone. (The classical alternative, where the
//! first push initializes the tail, races that write against a concurrent
//! first pop; the stub removes the race instead of replicating it.)
//!
//! # Ordering
//!
//! Every push performs one atomic exchange on the shared head. The sequence
//! of exchanges defines a single global linearization of all pushes across
//! all producers; each push then stitches the previous head forward with a
//! release store of its `next` link, which is what turns newest-first head
//! discovery back into oldest-first consumption. The consumer's acquire
//! load of a `next` link pairs with that release store, making the payload
//! written before the link visible.
//!
//! A push that has exchanged the head but not yet stitched the link leaves
//! the queue momentarily indistinguishable from empty; `pop` reports empty
//! and the caller polls.

use core::cell::Cell;

use crate::atomic::{Atom, Ordering};
use crate::cache::CachePadded;
use crate::pool::{NodePool, NIL};

/// Core MPSC queue over a fixed node pool.
///
/// Pool capacity `N` includes the stub node, so at most `N - 1` values can
/// ever be pushed through a queue (the pool is bump-only; see
/// [`crate::pool`]).
pub(crate) struct Queue<T, const N: usize> {
    /// Most recently linked-in node. Exchanged by every producer.
    head: CachePadded<Atom<u32>>,

    /// Most recently consumed node (stub at rest). Touched only by the
    /// single consumer, hence a plain cell rather than an atom.
    tail: CachePadded<Cell<u32>>,

    /// Node storage. Allocation races are resolved inside the pool.
    pool: NodePool<T, N>,
}

impl<T, const N: usize> Queue<T, N> {
    /// Compile-time capacity check: the stub consumes one slot.
    const CAPACITY_OK: () = assert!(N >= 2, "Queue capacity must be >= 2 (stub + payload)");

    /// Creates an empty queue with the stub node in place.
    pub(crate) fn new() -> Self {
        let () = Self::CAPACITY_OK;

        let mut pool = NodePool::new();
        // Exclusive access during construction: the stub takes slot 0 and
        // its payload is never initialized or read.
        let stub = pool.bootstrap_stub();
        Self {
            head: CachePadded::new(Atom::new(stub)),
            tail: CachePadded::new(Cell::new(stub)),
            pool,
        }
    }

    /// Attempts to push a value. Safe for any number of concurrent callers.
    ///
    /// # Errors
    ///
    /// Returns `Err(value)` with no other side effect when the node pool is
    /// exhausted. Exhaustion is permanent: once the pool is drained the
    /// queue degrades to push failure for the rest of its lifetime.
    pub(crate) fn push(&self, value: T) -> Result<(), T> {
        let node = self.pool.allocate(value)?;

        // The exchange linearizes this push against all others. AcqRel:
        // release publishes our payload and NIL link, acquire lets the
        // store below reach the previous node after its owner is done.
        let prev = self.head.swap(node, Ordering::AcqRel);

        // The previous head is always a real node (the stub at worst).
        // Release pairs with the consumer's acquire load of this link.
        self.pool.link(prev).store(node, Ordering::Release);
        Ok(())
    }

    /// Attempts to pop the oldest value.
    ///
    /// Returns `None` if the queue is empty (or an in-flight push has not
    /// finished stitching its link yet).
    ///
    /// # Safety
    ///
    /// Caller must be the single consumer (no concurrent `pop`).
    pub(crate) unsafe fn pop(&self) -> Option<T> {
        let tail = self.tail.get();

        // Acquire pairs with the pushing producer's release store, making
        // the node's payload visible before we read it.
        let next = self.pool.link(tail).load(Ordering::Acquire);
        if next == NIL {
            return None;
        }

        // SAFETY: `next` was linked in by a completed push, so its payload
        // is initialized, and the single-consumer contract means nobody
        // else takes it.
        let value = unsafe { self.pool.take(next) };

        // The old tail's payload was consumed by the previous pop (or never
        // existed, for the stub); only the shell goes back.
        self.pool.release(tail);
        self.tail.set(next);
        Some(value)
    }

    /// Node slots never handed out. Advisory under concurrent pushes.
    #[inline]
    pub(crate) fn remaining_capacity(&self) -> usize {
        self.pool.remaining()
    }
}

impl<T, const N: usize> Drop for Queue<T, N> {
    fn drop(&mut self) {
        // Exclusive access: drop every in-flight payload. The node at
        // `tail` itself was already consumed (or is the stub).
        let mut index = self.pool.link(self.tail.get()).load(Ordering::Relaxed);
        while index != NIL {
            let next = self.pool.link(index).load(Ordering::Relaxed);
            // SAFETY: Nodes reachable from tail's link chain hold payloads
            // that were pushed and never popped.
            unsafe {
                drop(self.pool.take(index));
            }
            index = next;
        }
    }
}

// SAFETY: Queue is Send because nodes and payloads are Send.
unsafe impl<T: Send, const N: usize> Send for Queue<T, N> {}

// SAFETY: Queue is Sync because producers only touch the head atom and
// pool allocation (both multi-producer safe), and the tail cell is reserved
// to the single consumer by `pop`'s contract.
unsafe impl<T: Send, const N: usize> Sync for Queue<T, N> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_for_a_single_producer() {
        let queue: Queue<u64, 16> = Queue::new();
        for i in 0..5 {
            queue.push(i).unwrap();
        }
        unsafe {
            for i in 0..5 {
                assert_eq!(queue.pop(), Some(i));
            }
            assert_eq!(queue.pop(), None);
        }
    }

    #[test]
    fn pool_exhaustion_fails_push_permanently() {
        // Capacity 4: one stub + three payload nodes, ever.
        let queue: Queue<u64, 4> = Queue::new();
        assert!(queue.push(1).is_ok());
        assert!(queue.push(2).is_ok());
        assert!(queue.push(3).is_ok());
        assert_eq!(queue.push(4), Err(4));

        // Draining does not restore capacity: the pool is bump-only.
        unsafe {
            assert_eq!(queue.pop(), Some(1));
            assert_eq!(queue.pop(), Some(2));
            assert_eq!(queue.pop(), Some(3));
            assert_eq!(queue.pop(), None);
        }
        assert_eq!(queue.push(5), Err(5));
        assert_eq!(queue.remaining_capacity(), 0);
    }

    #[test]
    fn empty_queue_pops_none() {
        let queue: Queue<u64, 8> = Queue::new();
        unsafe {
            assert_eq!(queue.pop(), None);
        }
        queue.push(42).unwrap();
        unsafe {
            assert_eq!(queue.pop(), Some(42));
            assert_eq!(queue.pop(), None);
        }
    }

    #[test]
    fn interleaved_push_pop() {
        let queue: Queue<u64, 32> = Queue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        unsafe {
            assert_eq!(queue.pop(), Some(1));
        }
        queue.push(3).unwrap();
        unsafe {
            assert_eq!(queue.pop(), Some(2));
            assert_eq!(queue.pop(), Some(3));
            assert_eq!(queue.pop(), None);
        }
    }

    #[test]
    fn drop_releases_in_flight_payloads() {
        use std::sync::Arc;

        let tracker = Arc::new(());
        {
            let queue: Queue<Arc<()>, 8> = Queue::new();
            queue.push(Arc::clone(&tracker)).unwrap();
            queue.push(Arc::clone(&tracker)).unwrap();
            queue.push(Arc::clone(&tracker)).unwrap();
            unsafe {
                drop(queue.pop().unwrap());
            }
            assert_eq!(Arc::strong_count(&tracker), 3);
        }
        assert_eq!(Arc::strong_count(&tracker), 1);
    }

    #[test]
    fn concurrent_producers_preserve_per_producer_order() {
        use std::sync::Arc;
        use std::thread;

        const PRODUCERS: u64 = 4;
        const PER_PRODUCER: u64 = 500;
        const POOL: usize = (PRODUCERS * PER_PRODUCER + 1) as usize;

        let queue: Arc<Queue<(u64, u64), POOL>> = Arc::new(Queue::new());

        let mut handles = vec![];
        for producer in 0..PRODUCERS {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    queue.push((producer, seq)).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut last_seq = [None::<u64>; PRODUCERS as usize];
        let mut total = 0u64;
        loop {
            let item = unsafe { queue.pop() };
            match item {
                Some((producer, seq)) => {
                    let last = &mut last_seq[producer as usize];
                    // Per-producer FIFO; the global interleaving is free.
                    assert!(last.map_or(seq == 0, |prev| seq == prev + 1));
                    *last = Some(seq);
                    total += 1;
                }
                None => break,
            }
        }
        assert_eq!(total, PRODUCERS * PER_PRODUCER);
    }
}
