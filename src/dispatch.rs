//! Process-wide dispatch table for the hot primitives.
//!
//! Each performance-critical operation is a slot holding a plain function
//! pointer. [`FuncTable::select`] orders the candidate implementations for
//! every slot from portable baseline upward and picks the highest tier whose
//! required capability was detected; the baseline needs nothing and is
//! always available, so selection cannot fail. A single compiled artifact
//! therefore runs correctly on any supported processor, just more slowly on
//! older ones.
//!
//! [`table`] populates the table exactly once behind a [`OnceLock`], before
//! any compression or decompression call can race it; afterwards the table
//! is immutable and shared across threads without synchronization. All call
//! sites go through the table rather than naming a variant directly.
//!
//! Only operations with more than one implementation get a slot. Window
//! sliding and hash-chain insertion have a single portable form and stay
//! methods on [`ChainMatchFinder`]; a vectorized variant of either would
//! earn it a slot here.

use std::sync::OnceLock;

use log::debug;

use crate::cpu::CpuFeatures;
use crate::match_finder::ChainMatchFinder;
use crate::{adler32, chunkset, compare, crc32, match_finder};

/// The table of dispatched operations.
///
/// Slot signatures match the portable implementations in the topic modules;
/// see those modules for the per-operation contracts.
#[derive(Clone, Copy)]
pub struct FuncTable {
    /// Adler-32 streaming update.
    pub adler32: fn(u32, &[u8]) -> u32,
    /// CRC-32 streaming update.
    pub crc32: fn(u32, &[u8]) -> u32,
    /// Longest-common-prefix compare, capped at 256 bytes.
    pub compare256: fn(&[u8], &[u8]) -> u32,
    /// Hash-chain walk for the longest prior match.
    pub longest_match: fn(&mut ChainMatchFinder, u32) -> u32,
    /// Chunk width used by the copy slots below; query, never assume.
    pub chunksize: fn() -> usize,
    /// Chunked copy between buffers, rounded up to whole chunks.
    pub chunkcopy: fn(&mut [u8], &[u8], usize) -> usize,
    /// Bounded chunked copy; never touches a byte past the length.
    pub chunkcopy_safe: fn(&mut [u8], &[u8], usize) -> usize,
    /// Widens a sub-chunk back-reference until it spans a chunk.
    pub chunkunroll: fn(&mut [u8], usize, &mut usize, &mut usize) -> usize,
    /// Back-reference replay in whole chunks (needs write slack).
    pub chunkmemset: fn(&mut [u8], usize, usize, usize) -> usize,
    /// Bounded back-reference replay.
    pub chunkmemset_safe: fn(&mut [u8], usize, usize, usize, usize) -> usize,
}

impl std::fmt::Debug for FuncTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuncTable")
            .field("chunksize", &(self.chunksize)())
            .finish_non_exhaustive()
    }
}

impl FuncTable {
    /// The mandatory portable tier: byte loops and 8-byte chunks.
    ///
    /// Requires no processor capability and is the correctness reference
    /// every other tier must match bit-for-bit.
    pub fn baseline() -> Self {
        Self {
            adler32: adler32::adler32_base,
            crc32: crc32::crc32_base,
            compare256: compare::compare256_base,
            longest_match: match_finder::longest_match_base,
            chunksize: chunkset::chunksize::<8>,
            chunkcopy: chunkset::chunkcopy::<8>,
            chunkcopy_safe: chunkset::chunkcopy_safe::<8>,
            chunkunroll: chunkset::chunkunroll::<8>,
            chunkmemset: chunkset::chunkmemset::<8>,
            chunkmemset_safe: chunkset::chunkmemset_safe::<8>,
        }
    }

    /// Builds the table for a detected capability set.
    ///
    /// Tiers are tried from the most capable downward; each slot lands on
    /// the best implementation the flags allow.
    pub fn select(features: &CpuFeatures) -> Self {
        let mut t = Self::baseline();

        // Unrolled scalar tiers carry no capability requirement beyond the
        // baseline.
        t.adler32 = adler32::adler32_unroll16;
        t.crc32 = crc32::crc32_braid;
        // Folding pays off where the combine maps to carryless-multiply
        // hardware.
        if features.pclmulqdq || features.pmull {
            t.crc32 = crc32::crc32_clmul;
        }

        // Compare width follows the native word.
        if cfg!(target_pointer_width = "64") {
            t.compare256 = compare::compare256_64;
            t.longest_match = match_finder::longest_match_64;
        } else if cfg!(target_pointer_width = "32") {
            t.compare256 = compare::compare256_32;
            t.longest_match = match_finder::longest_match_32;
        } else {
            t.compare256 = compare::compare256_16;
            t.longest_match = match_finder::longest_match_16;
        }

        // Chunk width follows the widest vector unit present: 256-bit
        // vectors move 32-byte chunks, 128-bit vectors move 16.
        if features.avx2 {
            t.set_chunk_width::<32>();
        } else if features.sse2 || features.neon {
            t.set_chunk_width::<16>();
        }

        t
    }

    fn set_chunk_width<const N: usize>(&mut self) {
        self.chunksize = chunkset::chunksize::<N>;
        self.chunkcopy = chunkset::chunkcopy::<N>;
        self.chunkcopy_safe = chunkset::chunkcopy_safe::<N>;
        self.chunkunroll = chunkset::chunkunroll::<N>;
        self.chunkmemset = chunkset::chunkmemset::<N>;
        self.chunkmemset_safe = chunkset::chunkmemset_safe::<N>;
    }
}

/// Returns the process-wide dispatch table, populating it on first use.
pub fn table() -> &'static FuncTable {
    static TABLE: OnceLock<FuncTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let features = CpuFeatures::detect();
        let t = FuncTable::select(&features);
        debug!(
            "dispatch table ready: chunk size {}, features {:?}",
            (t.chunksize)(),
            features
        );
        t
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_stable() {
        let a = table() as *const FuncTable;
        let b = table() as *const FuncTable;
        assert_eq!(a, b);
    }

    #[test]
    fn test_baseline_chunk_width() {
        let t = FuncTable::baseline();
        assert_eq!((t.chunksize)(), 8);
    }

    #[test]
    fn test_select_respects_vector_width() {
        let mut f = CpuFeatures::default();
        assert_eq!((FuncTable::select(&f).chunksize)(), 8);
        f.sse2 = true;
        assert_eq!((FuncTable::select(&f).chunksize)(), 16);
        f.avx2 = true;
        assert_eq!((FuncTable::select(&f).chunksize)(), 32);

        let mut f = CpuFeatures::default();
        f.neon = true;
        assert_eq!((FuncTable::select(&f).chunksize)(), 16);
    }

    #[test]
    fn test_clmul_flags_select_fold_crc() {
        let expected = crc32::crc32_clmul as fn(u32, &[u8]) -> u32;

        let mut f = CpuFeatures::default();
        assert!(!std::ptr::fn_addr_eq(FuncTable::select(&f).crc32, expected));
        f.pclmulqdq = true;
        assert!(std::ptr::fn_addr_eq(FuncTable::select(&f).crc32, expected));

        let mut f = CpuFeatures::default();
        f.pmull = true;
        assert!(std::ptr::fn_addr_eq(FuncTable::select(&f).crc32, expected));
    }

    #[test]
    fn test_selected_checksums_match_baseline() {
        let t = table();
        let base = FuncTable::baseline();
        let data: Vec<u8> = (0..999u32).map(|i| (i % 256) as u8).collect();
        assert_eq!((t.adler32)(1, &data), (base.adler32)(1, &data));
        assert_eq!((t.crc32)(0, &data), (base.crc32)(0, &data));
    }
}
