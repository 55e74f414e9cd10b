//! Explicit bring-up context.
//!
//! One [`Context`] value is constructed at start-up and passed by reference
//! into every subsystem that needs it; there is no process-wide implicit
//! global anywhere in this crate. The context carries the facts that are
//! read once and then only consulted: CPU capability flags and the anchored
//! cycle clock. The queues and pools themselves are constructed by bring-up
//! code and owned alongside the context, sized for the expected
//! producer/consumer rates (there is no runtime resize).

use crate::clock::TscClock;
use crate::cpu::CpuFeatures;
use crate::trace;

/// Start-up facts shared by reference across the pipeline.
#[derive(Debug)]
pub struct Context {
    features: CpuFeatures,
    clock: TscClock,
}

impl Context {
    /// Detects CPU features, anchors the clock and returns the context.
    #[must_use]
    pub fn bring_up() -> Self {
        let features = CpuFeatures::detect();
        let clock = TscClock::new();
        trace::info!(
            ?features,
            tsc_stable = TscClock::tsc_stable(),
            "context brought up"
        );
        Self { features, clock }
    }

    /// Capability flags detected at bring-up.
    #[inline]
    #[must_use]
    pub fn features(&self) -> CpuFeatures {
        self.features
    }

    /// The anchored cycle clock.
    #[inline]
    #[must_use]
    pub fn clock(&self) -> &TscClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_exposes_detected_features() {
        let context = Context::bring_up();
        assert_eq!(context.features(), CpuFeatures::detect());
    }

    #[test]
    fn context_clock_advances() {
        let context = Context::bring_up();
        let first = context.clock().now_nanos();
        let second = context.clock().now_nanos();
        assert!(second >= first);
    }
}
