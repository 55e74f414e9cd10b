//! Cache-line isolation for independently-mutated hot fields.
//!
//! Two fields mutated by different execution contexts must never share a
//! hardware cache line, or every write by one core invalidates the line in
//! the other core's cache (false sharing). The ring queue's two cursors, the
//! MPSC head and the pool's bump index are each wrapped in [`CachePadded`]
//! so the compiler gives them a line of their own.
//!
//! This is a performance requirement, not a correctness one: the ring and
//! queue protocols are correct at any alignment.

use core::ops::{Deref, DerefMut};

/// Hardware cache line size this crate lays out for.
///
/// 64 bytes on every x86_64 and the common aarch64 parts this runs on.
pub const CACHE_LINE: usize = 64;

/// Pads and aligns `T` to a cache-line boundary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(align(64))]
pub struct CachePadded<T> {
    value: T,
}

impl<T> CachePadded<T> {
    /// Wraps `value` in its own cache line.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Unwraps the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for CachePadded<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for CachePadded<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

const _: () = assert!(core::mem::align_of::<CachePadded<u8>>() == CACHE_LINE);
const _: () = assert!(core::mem::size_of::<CachePadded<u8>>() == CACHE_LINE);
const _: () = assert!(core::mem::size_of::<CachePadded<[u8; 65]>>() == 2 * CACHE_LINE);
