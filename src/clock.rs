//! Monotonic cycle-counter clock.
//!
//! Readings come from the processor's timestamp counter (via `minstant`)
//! scaled to nanoseconds: strictly increasing on one core, cheap enough for
//! per-message stamping, and not synchronized across cores. When the TSC is
//! unavailable or unstable, `minstant` transparently falls back to the OS
//! monotonic clock.

use minstant::{Anchor, Instant};

/// Nanosecond-scaled cycle-counter clock, anchored at construction.
pub struct TscClock {
    anchor: Anchor,
}

impl core::fmt::Debug for TscClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TscClock")
            .field("tsc_stable", &Self::tsc_stable())
            .finish_non_exhaustive()
    }
}

impl TscClock {
    /// Anchors a new clock against the wall clock.
    ///
    /// Anchoring is the one moderately expensive step; do it at bring-up
    /// and reuse the clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchor: Anchor::new(),
        }
    }

    /// Current reading in nanoseconds since the Unix epoch.
    ///
    /// Strictly increasing between two calls on the same core.
    #[inline]
    #[must_use]
    pub fn now_nanos(&self) -> u64 {
        Instant::now().as_unix_nanos(&self.anchor)
    }

    /// Whether readings come from the TSC (as opposed to the OS fallback).
    #[must_use]
    pub fn tsc_stable() -> bool {
        minstant::is_tsc_available()
    }
}

impl Default for TscClock {
    fn default() -> Self {
        Self::new()
    }
}
