//! Core MPSC (multi-producer single-consumer) queue primitives.
//!
//! An intrusive linked queue over the fixed-capacity node pool. Any number
//! of producers may push concurrently; the safe surface lives in
//! [`crate::sync::mpsc`].

pub(crate) mod queue;
