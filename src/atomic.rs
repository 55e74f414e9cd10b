//! Minimal atomic cell with explicit memory-ordering strength.
//!
//! [`Atom<T>`] is the sole synchronization primitive in this crate: a fixed
//! width scalar whose loads, stores, exchanges, fetch-adds and weak
//! compare-exchanges each carry an explicit [`Ordering`]. It maps directly
//! onto the native `core::sync::atomic` types; the ordering vocabulary is
//! the native enum (relaxed, acquire, release, acq-rel, seq-cst).
//!
//! Sequentially-consistent is the safe default strength; call sites in this
//! crate opt into weaker orderings explicitly where the pairing argument is
//! written down (see the ring and queue modules).

use core::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize};

pub use core::sync::atomic::Ordering;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for usize {}
}

/// Scalar types that have a native atomic representation.
///
/// Sealed: implemented for `u32`, `u64` and `usize` only.
pub trait Primitive: Copy + Eq + sealed::Sealed {
    #[doc(hidden)]
    type Native;

    #[doc(hidden)]
    fn native_new(value: Self) -> Self::Native;
    #[doc(hidden)]
    fn native_load(cell: &Self::Native, order: Ordering) -> Self;
    #[doc(hidden)]
    fn native_store(cell: &Self::Native, value: Self, order: Ordering);
    #[doc(hidden)]
    fn native_swap(cell: &Self::Native, value: Self, order: Ordering) -> Self;
    #[doc(hidden)]
    fn native_fetch_add(cell: &Self::Native, value: Self, order: Ordering) -> Self;
    #[doc(hidden)]
    fn native_compare_exchange_weak(
        cell: &Self::Native,
        current: Self,
        new: Self,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self, Self>;
}

macro_rules! impl_primitive {
    ($ty:ty, $native:ty) => {
        impl Primitive for $ty {
            type Native = $native;

            #[inline]
            fn native_new(value: Self) -> Self::Native {
                <$native>::new(value)
            }

            #[inline]
            fn native_load(cell: &Self::Native, order: Ordering) -> Self {
                cell.load(order)
            }

            #[inline]
            fn native_store(cell: &Self::Native, value: Self, order: Ordering) {
                cell.store(value, order);
            }

            #[inline]
            fn native_swap(cell: &Self::Native, value: Self, order: Ordering) -> Self {
                cell.swap(value, order)
            }

            #[inline]
            fn native_fetch_add(cell: &Self::Native, value: Self, order: Ordering) -> Self {
                cell.fetch_add(value, order)
            }

            #[inline]
            fn native_compare_exchange_weak(
                cell: &Self::Native,
                current: Self,
                new: Self,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self, Self> {
                cell.compare_exchange_weak(current, new, success, failure)
            }
        }
    };
}

impl_primitive!(u32, AtomicU32);
impl_primitive!(u64, AtomicU64);
impl_primitive!(usize, AtomicUsize);

/// A scalar value whose every access carries an explicit ordering strength.
///
/// Plain reads and writes of cross-thread state are not permitted anywhere
/// in this crate; they go through an `Atom`. The one deliberate exception is
/// the MPSC queue's tail index, which is touched only by the single consumer
/// and therefore lives in a plain [`core::cell::Cell`].
#[repr(transparent)]
pub struct Atom<T: Primitive> {
    cell: T::Native,
}

impl<T: Primitive> Atom<T> {
    /// Creates a new cell holding `value`.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            cell: T::native_new(value),
        }
    }

    /// Loads the value. `order` must not be `Release` or `AcqRel`.
    #[inline]
    pub fn load(&self, order: Ordering) -> T {
        T::native_load(&self.cell, order)
    }

    /// Stores `value`. `order` must not be `Acquire` or `AcqRel`.
    #[inline]
    pub fn store(&self, value: T, order: Ordering) {
        T::native_store(&self.cell, value, order);
    }

    /// Atomically replaces the value, returning the previous one.
    #[inline]
    pub fn swap(&self, value: T, order: Ordering) -> T {
        T::native_swap(&self.cell, value, order)
    }

    /// Atomically adds `value` (wrapping), returning the previous value.
    #[inline]
    pub fn fetch_add(&self, value: T, order: Ordering) -> T {
        T::native_fetch_add(&self.cell, value, order)
    }

    /// Weak compare-and-swap: replaces the value with `new` if it equals
    /// `current`, using `order` on success and relaxed on failure.
    ///
    /// May fail spuriously even when the value matched `current`; callers
    /// needing a strong CAS retry in a loop.
    ///
    /// # Errors
    ///
    /// Returns `Err` with the observed value when the exchange did not
    /// happen.
    #[inline]
    pub fn compare_exchange_weak(&self, current: T, new: T, order: Ordering) -> Result<T, T> {
        T::native_compare_exchange_weak(&self.cell, current, new, order, Ordering::Relaxed)
    }
}

impl<T: Primitive + core::fmt::Debug> core::fmt::Debug for Atom<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Atom")
            .field(&self.load(Ordering::SeqCst))
            .finish()
    }
}
