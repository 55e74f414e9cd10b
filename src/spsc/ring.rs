//! Core lock-free SPSC ring buffer algorithm.
//!
//! A bounded queue over a power-of-two array of slots with two independent
//! cursors: a write cursor owned by the producer and a read cursor owned by
//! the consumer, each on its own cache line. Cursors are stored pre-masked
//! and advance by `(idx + 1) & (N - 1)`, so one slot is always left unused:
//! usable capacity is `N - 1`, and "candidate next write position equals the
//! read position" is the full condition.
//!
//! # Ordering
//!
//! The producer's release store of the write cursor happens-before the
//! consumer's acquire load that observes it, so slot contents written before
//! the publish are visible once the cursor update is. The symmetric pairing
//! on the read cursor guarantees the producer never overwrites a slot the
//! consumer has not finished reading. These two edges are the only
//! synchronization in the structure.
//!
//! # Safety
//!
//! The push and pop families are unsafe because the caller must uphold the
//! SPSC role discipline: exactly one logical producer and one logical
//! consumer for the lifetime of the ring, never concurrent with themselves.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr;

use crate::atomic::{Atom, Ordering};
use crate::cache::{CachePadded, CACHE_LINE};

/// A single slot in the ring buffer.
#[repr(transparent)]
pub(crate) struct Slot<T> {
    value: UnsafeCell<MaybeUninit<T>>,
}

// SAFETY: Slot contents are only touched by whichever role currently owns
// the slot under the cursor protocol; the acquire/release cursor pairing is
// the synchronization barrier between the producer's write and the
// consumer's read.
unsafe impl<T: Send> Sync for Slot<T> {}
unsafe impl<T: Send> Send for Slot<T> {}

/// Core bounded SPSC ring buffer.
#[repr(C)]
pub(crate) struct Ring<T, const N: usize> {
    /// Write cursor. Owned by the producer, observed by the consumer.
    write_idx: CachePadded<Atom<usize>>,

    /// Read cursor. Owned by the consumer, observed by the producer.
    read_idx: CachePadded<Atom<usize>>,

    /// Ring buffer slots.
    buffer: [Slot<T>; N],
}

const _: () = assert!(core::mem::size_of::<CachePadded<Atom<usize>>>() == CACHE_LINE);

impl<T, const N: usize> Ring<T, N> {
    /// Compile-time capacity check: power of two, at least one usable slot.
    const CAPACITY_OK: () = assert!(
        N >= 2 && N.is_power_of_two(),
        "Ring capacity must be a power of two >= 2"
    );

    const MASK: usize = N - 1;

    /// Creates a new empty ring.
    pub(crate) fn new() -> Self {
        let () = Self::CAPACITY_OK;

        Self {
            write_idx: CachePadded::new(Atom::new(0)),
            read_idx: CachePadded::new(Atom::new(0)),
            // SAFETY: An array of slots holding MaybeUninit does not require
            // initialization.
            buffer: unsafe { MaybeUninit::uninit().assume_init() },
        }
    }

    /// Advances a cursor to the next slot index, wrapping via bitmask.
    #[inline]
    const fn advance(idx: usize) -> usize {
        (idx + 1) & Self::MASK
    }

    /// Attempts to push an item onto the queue.
    ///
    /// # Errors
    ///
    /// Returns `Err(item)` if the queue is full, allowing retry.
    ///
    /// # Safety
    ///
    /// Caller must be the single producer (no concurrent `push`/`push_bulk`).
    #[inline]
    pub(crate) unsafe fn push(&self, item: T) -> Result<(), T> {
        // Own cursor: relaxed is sufficient, only this role writes it.
        let write = self.write_idx.load(Ordering::Relaxed);
        let next = Self::advance(write);

        // Full when the candidate next position would collide with the read
        // cursor. Acquire pairs with the consumer's release publish so the
        // slot at `write` is known to be vacated.
        if next == self.read_idx.load(Ordering::Acquire) {
            return Err(item);
        }

        // SAFETY: The full check above guarantees the consumer is not
        // reading slot `write`, and the cursor invariant keeps `write` in
        // [0, N). The write happens before the release publish below.
        unsafe {
            ptr::write(self.buffer[write].value.get(), MaybeUninit::new(item));
        }

        // Publish: release makes the slot write visible to the consumer's
        // acquire load of the write cursor.
        self.write_idx.store(next, Ordering::Release);
        Ok(())
    }

    /// Attempts to push a batch of items, returning how many were written.
    ///
    /// Writes `min(items.len(), free space)` items in at most two contiguous
    /// copies (one if the range does not wrap), then publishes the whole
    /// batch with a single release store. Returns 0 if no space.
    ///
    /// # Safety
    ///
    /// Caller must be the single producer (no concurrent `push`/`push_bulk`).
    pub(crate) unsafe fn push_bulk(&self, items: &[T]) -> usize
    where
        T: Copy,
    {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        // Free slots, minus the one reserved slot that keeps full and empty
        // distinguishable.
        let available = read.wrapping_sub(write).wrapping_sub(1) & Self::MASK;
        let to_write = items.len().min(available);
        if to_write == 0 {
            return 0;
        }

        // SAFETY: Slots [write, write + to_write) taken modulo N are free by
        // the availability computation above, and `T: Copy` makes a bitwise
        // copy a full initialization. Split into two copies if the range
        // wraps past the end of the buffer.
        unsafe {
            let first = to_write.min(N - write);
            let base = self.buffer.as_ptr() as *mut T;
            ptr::copy_nonoverlapping(items.as_ptr(), base.add(write), first);
            if to_write > first {
                ptr::copy_nonoverlapping(items.as_ptr().add(first), base, to_write - first);
            }
        }

        // One release publish covers the whole batch.
        self.write_idx
            .store(write.wrapping_add(to_write) & Self::MASK, Ordering::Release);
        to_write
    }

    /// Attempts to pop an item from the queue.
    ///
    /// Returns `None` if the queue is empty.
    ///
    /// # Safety
    ///
    /// Caller must be the single consumer (no concurrent `pop`).
    #[inline]
    pub(crate) unsafe fn pop(&self) -> Option<T> {
        // Own cursor: relaxed is sufficient, only this role writes it.
        let read = self.read_idx.load(Ordering::Relaxed);

        // Empty when both cursors coincide. Acquire pairs with the
        // producer's release publish so the slot contents are visible.
        if read == self.write_idx.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: The empty check guarantees slot `read` holds a value the
        // producer finished writing, and the producer will not reuse it
        // until the release publish below.
        let item = unsafe { ptr::read(self.buffer[read].value.get()).assume_init() };

        // Publish: release hands the vacated slot back to the producer.
        self.read_idx.store(Self::advance(read), Ordering::Release);
        Some(item)
    }

    /// Number of resident elements. Advisory under concurrent use.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Acquire);
        write.wrapping_sub(read) & Self::MASK
    }

    /// Whether the queue is empty. Advisory under concurrent use.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.read_idx.load(Ordering::Acquire) == self.write_idx.load(Ordering::Acquire)
    }

    /// Whether the queue is full. Advisory under concurrent use.
    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Acquire);
        Self::advance(write) == read
    }
}

impl<T, const N: usize> Drop for Ring<T, N> {
    fn drop(&mut self) {
        if !core::mem::needs_drop::<T>() {
            return;
        }
        // Exclusive access: drop every unconsumed element in place.
        let write = self.write_idx.load(Ordering::Relaxed);
        let mut read = self.read_idx.load(Ordering::Relaxed);
        while read != write {
            // SAFETY: Slots in [read, write) hold initialized values the
            // consumer never took.
            unsafe {
                (*self.buffer[read].value.get()).assume_init_drop();
            }
            read = Self::advance(read);
        }
    }
}

// SAFETY: Ring is Send because its contents are Send.
unsafe impl<T: Send, const N: usize> Send for Ring<T, N> {}

// SAFETY: Ring is Sync because cross-role access is mediated by the two
// atomic cursors with release/acquire pairing; slot access is governed by
// the SPSC protocol (see Slot).
unsafe impl<T: Send, const N: usize> Sync for Ring<T, N> {}
