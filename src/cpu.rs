//! Processor capability detection.
//!
//! [`CpuFeatures::detect`] probes the host processor once for the
//! instruction-set extensions the dispatch layer cares about. Each flag is
//! only set when the capability is positively confirmed; on platforms where
//! detection cannot run, every flag stays `false` and the portable baseline
//! implementations are selected. Detection never fails.

/// The set of processor capabilities relevant to implementation selection.
///
/// All fields exist on every target so selection logic can read them without
/// conditional compilation; flags for extensions the target architecture
/// does not have simply stay `false`.
///
/// Selection currently consumes a subset of the flags (`sse2`, `avx2`,
/// `neon`, `pclmulqdq`, `pmull`). The rest are detected anyway: they appear
/// in the dispatch log's description of the host, and each one is the
/// ready-made gate for an intrinsic tier of the operation it names
/// (`sse42`/`avx512vnni` for checksums, `vpclmulqdq` for wider CRC folds,
/// `tzcnt` for the compare loops).
///
/// # Example
///
/// ```rust
/// use zflate::CpuFeatures;
///
/// let f = CpuFeatures::detect();
/// // Detection is idempotent.
/// assert_eq!(f, CpuFeatures::detect());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct CpuFeatures {
    /// x86: 128-bit vector integer operations.
    pub sse2: bool,
    /// x86: supplemental 128-bit shuffle/align operations.
    pub ssse3: bool,
    /// x86: SSE4.1 extensions.
    pub sse41: bool,
    /// x86: SSE4.2 extensions (string compare, CRC32 instruction).
    pub sse42: bool,
    /// x86: carryless multiply (`pclmulqdq`).
    pub pclmulqdq: bool,
    /// x86: 256-bit vector operations.
    pub avx2: bool,
    /// x86: 512-bit vector foundation.
    pub avx512: bool,
    /// x86: 512-bit vector neural-network integer instructions.
    pub avx512vnni: bool,
    /// x86: vectorized carryless multiply.
    pub vpclmulqdq: bool,
    /// x86: trailing-zero count without the BSF quirks (BMI1).
    pub tzcnt: bool,
    /// Whether the 512-bit paths are worth enabling on this processor.
    ///
    /// Plain capability presence is not always a win: some processors pay a
    /// frequency penalty for the widest vectors. This is a policy flag
    /// layered on top of [`avx512`](Self::avx512); the first implementation
    /// treats presence as suitability.
    pub well_suited_avx512: bool,
    /// aarch64: Advanced SIMD.
    pub neon: bool,
    /// aarch64: CRC32 instructions.
    pub crc: bool,
    /// aarch64: polynomial multiply (`pmull`).
    pub pmull: bool,
}

impl CpuFeatures {
    /// Probes the host processor.
    ///
    /// Cheap enough to run at process start and safe to call repeatedly;
    /// the dispatch layer calls it exactly once.
    pub fn detect() -> Self {
        let mut f = Self::default();

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            f.sse2 = is_x86_feature_detected!("sse2");
            f.ssse3 = is_x86_feature_detected!("ssse3");
            f.sse41 = is_x86_feature_detected!("sse4.1");
            f.sse42 = is_x86_feature_detected!("sse4.2");
            f.pclmulqdq = is_x86_feature_detected!("pclmulqdq");
            f.avx2 = is_x86_feature_detected!("avx2");
            f.avx512 = is_x86_feature_detected!("avx512f");
            f.avx512vnni = is_x86_feature_detected!("avx512vnni");
            f.vpclmulqdq = is_x86_feature_detected!("vpclmulqdq");
            f.tzcnt = is_x86_feature_detected!("bmi1");
            f.well_suited_avx512 = f.avx512;
        }

        #[cfg(target_arch = "aarch64")]
        {
            f.neon = std::arch::is_aarch64_feature_detected!("neon");
            f.crc = std::arch::is_aarch64_feature_detected!("crc");
            f.pmull = std::arch::is_aarch64_feature_detected!("pmull");
        }

        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_idempotent() {
        assert_eq!(CpuFeatures::detect(), CpuFeatures::detect());
    }

    #[test]
    fn test_default_is_baseline() {
        let f = CpuFeatures::default();
        assert!(!f.sse2);
        assert!(!f.avx2);
        assert!(!f.neon);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_x86_64_has_sse2() {
        // SSE2 is part of the x86_64 baseline.
        assert!(CpuFeatures::detect().sse2);
    }

    #[test]
    fn test_avx512_policy_follows_presence() {
        let f = CpuFeatures::detect();
        assert_eq!(f.well_suited_avx512, f.avx512);
    }
}
