//! Safe producer/consumer surfaces for the in-process queues.
//!
//! Each queue is created by a `channel()` constructor that returns a
//! `(Producer, Consumer)` pair; the role discipline the core algorithms
//! require is enforced by the type system (handles are `Send` but, where a
//! role must be exclusive, not `Sync` and not `Clone`).

use thiserror::Error;

pub mod mpsc;
pub mod spsc;

/// Failure to push a value, returning it to the caller for retry or drop.
///
/// Both variants are reported synchronously and locally; nothing blocks,
/// queues overflow, or escalates on the caller's behalf.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError<T> {
    /// The ring queue has no free slot. Transient: clears when the
    /// consumer pops.
    #[error("queue is full")]
    Full(T),

    /// The node pool backing the queue has been permanently consumed.
    /// Not transient: capacity must be planned around, not retried past.
    #[error("node pool exhausted")]
    Exhausted(T),
}

impl<T> PushError<T> {
    /// Recovers the value that could not be pushed.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Exhausted(value) => value,
        }
    }
}
