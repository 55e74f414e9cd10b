//! Core SPSC (single-producer single-consumer) queue primitives.
//!
//! This module contains the bounded ring buffer algorithm. The safe
//! producer/consumer surface lives in [`crate::sync::spsc`].

pub(crate) mod ring;
