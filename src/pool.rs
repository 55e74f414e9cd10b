//! Fixed-capacity bump pool backing the MPSC queue.
//!
//! A pre-sized backing array of nodes handed out by a monotonically
//! advancing bump index. Allocation is thread-safe (producers race on a
//! weak-CAS loop over the bump index); everything else is governed by the
//! caller's role discipline.
//!
//! Capacity is consumed permanently: [`NodePool::release`] retires a node
//! without making its slot reusable, so once the bump index reaches `N` the
//! pool is exhausted for the rest of its lifetime. This is the contract the
//! MPSC queue is sized around, not a transient condition to retry past.
//!
//! Nodes are addressed by `u32` index with [`NIL`] as the empty sentinel;
//! raw addresses never escape the pool.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr;

use crate::atomic::{Atom, Ordering};
use crate::cache::CachePadded;

/// Empty index sentinel.
pub const NIL: u32 = u32::MAX;

/// A pool node: an intrusive `next` link plus the payload.
pub(crate) struct Node<T> {
    /// Index of the next node in push order, or [`NIL`].
    next: Atom<u32>,

    /// Payload. Initialized by `allocate`, moved out by `take`.
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            next: Atom::new(NIL),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

// SAFETY: Node contents are only touched by the role that currently owns
// the node: the allocating producer until the node is linked in, then the
// single consumer. The queue's head exchange and next-link release stores
// are the synchronization edges.
unsafe impl<T: Send> Sync for Node<T> {}
unsafe impl<T: Send> Send for Node<T> {}

/// Fixed-capacity bump allocator over `N` node slots.
pub struct NodePool<T, const N: usize> {
    /// Bump cursor: count of slots handed out so far. Never decreases.
    next_free: CachePadded<Atom<u32>>,

    /// Backing store, allocated once at construction. Boxed so large pools
    /// never transit the stack.
    slots: Box<[Node<T>]>,
}

impl<T, const N: usize> NodePool<T, N> {
    /// Compile-time capacity check: indices must fit in u32 below the
    /// sentinel.
    const CAPACITY_OK: () = assert!(
        N >= 1 && N < NIL as usize,
        "Pool capacity must be in 1..u32::MAX"
    );

    /// Creates a pool with all `N` slots unallocated.
    pub fn new() -> Self {
        let () = Self::CAPACITY_OK;

        Self {
            next_free: CachePadded::new(Atom::new(0)),
            slots: (0..N).map(|_| Node::new()).collect(),
        }
    }

    /// Reserves one slot during construction, before the pool is shared.
    ///
    /// The slot's payload stays uninitialized; the MPSC queue uses this for
    /// its stub node, whose payload is never read.
    pub(crate) fn bootstrap_stub(&mut self) -> u32 {
        let index = self.next_free.load(Ordering::Relaxed);
        debug_assert!((index as usize) < N);
        self.next_free.store(index + 1, Ordering::Relaxed);
        index
    }

    /// Allocates a node holding `value`.
    ///
    /// Safe to call from any number of threads concurrently: the bump index
    /// is advanced by a weak-CAS retry loop, and the winning thread owns the
    /// reserved slot exclusively until the node is linked into a queue.
    ///
    /// Ownership of the value transfers to the node; it comes back out when
    /// the holding queue pops it. A value still resident when the pool is
    /// dropped is leaked, not dropped (the pool does not track which slots
    /// are live; the queues do).
    ///
    /// # Errors
    ///
    /// Returns `Err(value)` when capacity has been permanently consumed.
    pub fn allocate(&self, value: T) -> Result<u32, T> {
        let mut index = self.next_free.load(Ordering::Relaxed);
        loop {
            if index as usize >= N {
                return Err(value);
            }
            // Relaxed suffices: reserving an index publishes nothing; the
            // slot has never been touched by another thread.
            match self
                .next_free
                .compare_exchange_weak(index, index + 1, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(observed) => index = observed,
            }
        }

        let node = &self.slots[index as usize];
        node.next.store(NIL, Ordering::Relaxed);
        // SAFETY: The CAS reserved `index` exclusively for this thread, and
        // a bump slot is handed out at most once, so nothing else aliases
        // the payload.
        unsafe {
            ptr::write(node.value.get(), MaybeUninit::new(value));
        }
        Ok(index)
    }

    /// Moves the payload out of node `index`.
    ///
    /// # Safety
    ///
    /// The node must hold an initialized payload that has not already been
    /// taken, and the caller must have exclusive ownership of the node.
    #[inline]
    pub(crate) unsafe fn take(&self, index: u32) -> T {
        // SAFETY: Per the caller's contract the payload is initialized and
        // unaliased; reading it out leaves the slot logically uninitialized.
        unsafe { ptr::read(self.slots[index as usize].value.get()).assume_init() }
    }

    /// Retires node `index`.
    ///
    /// The payload must already have been moved out (see [`Self::take`]);
    /// release performs no drop and, bump-only by contract, does not return
    /// the slot for reuse.
    #[inline]
    pub fn release(&self, index: u32) {
        debug_assert!((index as usize) < N);
        // Capacity stays consumed. The link is poisoned so a use-after-
        // release shows up as NIL in debug runs.
        self.slots[index as usize].next.store(NIL, Ordering::Relaxed);
    }

    /// The `next` link of node `index`.
    #[inline]
    pub(crate) fn link(&self, index: u32) -> &Atom<u32> {
        &self.slots[index as usize].next
    }

    /// Slots never handed out. Advisory under concurrent allocation.
    #[inline]
    pub fn remaining(&self) -> usize {
        N - (self.next_free.load(Ordering::Acquire) as usize).min(N)
    }
}

// SAFETY: NodePool is Send/Sync under the same protocol as Node; the bump
// index itself is an Atom.
unsafe impl<T: Send, const N: usize> Send for NodePool<T, N> {}
unsafe impl<T: Send, const N: usize> Sync for NodePool<T, N> {}
