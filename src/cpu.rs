//! CPU capability detection.
//!
//! A fixed set of boolean capability flags read once at bring-up via the
//! `cpuid` query instruction and carried in the [`crate::context::Context`]
//! from then on. Hot paths never re-query the hardware.

use serde::{Deserialize, Serialize};

/// Capability flags relevant to the trading pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuFeatures {
    /// AVX-512 Foundation.
    pub avx512f: bool,
    /// AVX-512 Doubleword and Quadword instructions.
    pub avx512dq: bool,
    /// AVX-512 Vector Length extensions.
    pub avx512vl: bool,
    /// Restricted Transactional Memory (TSX).
    pub tsx: bool,
    /// Control-flow Enforcement (shadow stacks).
    pub cet: bool,
}

impl CpuFeatures {
    /// Queries the processor once and returns its capability flags.
    ///
    /// On non-x86_64 targets every flag reads false.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self::detect_x86_64()
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            Self::default()
        }
    }

    #[cfg(target_arch = "x86_64")]
    fn detect_x86_64() -> Self {
        use std::arch::x86_64::{__cpuid, __cpuid_count};

        // SAFETY: cpuid is unprivileged and always present on x86_64.
        let max_leaf = unsafe { __cpuid(0) }.eax;
        if max_leaf < 7 {
            return Self::default();
        }

        // SAFETY: Leaf 7 subleaf 0 is in range per the check above.
        let leaf7 = unsafe { __cpuid_count(7, 0) };

        Self {
            avx512f: leaf7.ebx >> 16 & 1 != 0,
            avx512dq: leaf7.ebx >> 17 & 1 != 0,
            avx512vl: leaf7.ebx >> 31 & 1 != 0,
            tsx: leaf7.ebx >> 11 & 1 != 0,
            cet: leaf7.ecx >> 7 & 1 != 0,
        }
    }
}
