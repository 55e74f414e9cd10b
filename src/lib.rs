//! Lock-free concurrency substrate for a low-latency trading pipeline.
//!
//! This crate provides the inter-thread plumbing that moves order and
//! execution records between producer contexts (feed handlers, strategy
//! threads, interrupt-style polling loops) and a single consumer context,
//! with bounded worst-case latency and zero dynamic allocation on the hot
//! path:
//!
//! - [`sync::spsc`] - Bounded single-producer/single-consumer ring queue
//! - [`sync::mpsc`] - Multi-producer/single-consumer linked queue backed by
//!   a fixed-capacity node pool
//! - [`pool`] - The bump-only arena that backs the MPSC queue
//! - [`atomic`] - The atomic-with-explicit-ordering cell everything above
//!   is built on
//! - [`cache`] - Cache-line isolation for independently-mutated hot fields
//! - [`context`] - Explicit bring-up context (CPU features, cycle clock)
//!
//! Every operation is non-blocking: no mutexes, no syscalls, no internal
//! spinning. Callers that need to wait poll by re-invoking the `try_*`
//! operation.

pub mod atomic;
pub mod cache;
pub mod clock;
pub mod context;
pub mod cpu;
pub mod pool;
pub mod sync;
pub mod types;

pub(crate) mod mpsc;
pub(crate) mod spsc;

mod trace;

pub use trace::init_tracing;
