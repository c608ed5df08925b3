//! Longest-common-prefix comparison, capped at 256 bytes.
//!
//! The match finder extends a candidate match by comparing the window at two
//! positions. DEFLATE matches top out at 258 bytes; the first two bytes are
//! verified by the match finder's cheap rejection test, so the extension
//! compares at most 256 more. Implementations differ only in load width:
//! the wide tiers XOR whole words and locate the first differing byte with a
//! trailing-zero count.
//!
//! All tiers require both slices to hold at least 256 readable bytes; the
//! window layout guarantees that (see [`crate::MIN_LOOKAHEAD`]).

/// Portable baseline: two bytes per step.
pub fn compare256_base(a: &[u8], b: &[u8]) -> u32 {
    debug_assert!(a.len() >= 256 && b.len() >= 256);
    let mut len = 0u32;
    for (x, y) in a[..256].chunks_exact(2).zip(b[..256].chunks_exact(2)) {
        if x[0] != y[0] {
            return len;
        }
        if x[1] != y[1] {
            return len + 1;
        }
        len += 2;
    }
    256
}

macro_rules! compare256_wide {
    ($name:ident, $word:ty, $doc:literal) => {
        #[doc = $doc]
        pub fn $name(a: &[u8], b: &[u8]) -> u32 {
            debug_assert!(a.len() >= 256 && b.len() >= 256);
            const W: usize = size_of::<$word>();
            let mut len = 0u32;
            for (x, y) in a[..256].chunks_exact(W).zip(b[..256].chunks_exact(W)) {
                let x = <$word>::from_le_bytes(x.try_into().unwrap());
                let y = <$word>::from_le_bytes(y.try_into().unwrap());
                let diff = x ^ y;
                if diff != 0 {
                    // The little-endian load puts the first buffer byte in
                    // the low bits, so the trailing-zero count locates the
                    // first mismatching byte.
                    return len + (diff.trailing_zeros() >> 3);
                }
                len += W as u32;
            }
            256
        }
    };
}

compare256_wide!(compare256_16, u16, "16-bit word tier.");
compare256_wide!(compare256_32, u32, "32-bit word tier.");
compare256_wide!(compare256_64, u64, "64-bit word tier.");

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: [(&str, fn(&[u8], &[u8]) -> u32); 4] = [
        ("base", compare256_base),
        ("16", compare256_16),
        ("32", compare256_32),
        ("64", compare256_64),
    ];

    #[test]
    fn test_identical_runs_to_cap() {
        let a = vec![0x42u8; 300];
        for (name, f) in TIERS {
            assert_eq!(f(&a, &a), 256, "tier {name}");
        }
    }

    #[test]
    fn test_mismatch_at_every_position() {
        let a = vec![7u8; 300];
        for pos in 0..256 {
            let mut b = a.clone();
            b[pos] = 8;
            for (name, f) in TIERS {
                assert_eq!(f(&a, &b), pos as u32, "tier {name} at {pos}");
            }
        }
    }

    #[test]
    fn test_mismatch_past_cap_ignored() {
        let a = vec![1u8; 300];
        let mut b = a.clone();
        b[256] = 2;
        for (name, f) in TIERS {
            assert_eq!(f(&a, &b), 256, "tier {name}");
        }
    }
}
