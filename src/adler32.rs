//! Adler-32 sum-of-sums checksum.
//!
//! Two running sums modulo [`BASE`]: `a` accumulates bytes, `b` accumulates
//! `a`. Updates are associative under buffer concatenation, so a stream can
//! be checksummed in arbitrary pieces:
//!
//! ```rust
//! use zflate::adler32::adler32_base;
//!
//! let split = adler32_base(adler32_base(1, b"foo"), b"bar");
//! assert_eq!(split, adler32_base(1, b"foobar"));
//! ```
//!
//! Both implementations produce bit-identical results; they differ only in
//! inner-loop width. Callers outside tests should go through
//! [`crate::adler32`] so the dispatch table picks the fastest one.

/// Largest prime smaller than 2^16; the modulus of both sums.
pub const BASE: u32 = 65521;

/// Largest number of bytes that can be summed before the 32-bit
/// accumulators must be reduced modulo [`BASE`].
const NMAX: usize = 5552;

/// Portable baseline: one byte per step.
///
/// The mandatory fallback tier; requires no processor capability.
pub fn adler32_base(adler: u32, buf: &[u8]) -> u32 {
    let mut a = adler & 0xffff;
    let mut b = (adler >> 16) & 0xffff;

    for block in buf.chunks(NMAX) {
        for &x in block {
            a += u32::from(x);
            b += a;
        }
        a %= BASE;
        b %= BASE;
    }

    (b << 16) | a
}

/// Unrolled tier: sixteen bytes per step, deferred reduction.
///
/// Bit-identical to [`adler32_base`]; the unroll only changes how often the
/// accumulators spill into the modulo.
pub fn adler32_unroll16(adler: u32, buf: &[u8]) -> u32 {
    let mut a = adler & 0xffff;
    let mut b = (adler >> 16) & 0xffff;

    for block in buf.chunks(NMAX) {
        let mut groups = block.chunks_exact(16);
        for g in &mut groups {
            // a grows by one byte per lane, b by the running a.
            a += u32::from(g[0]);
            b += a;
            a += u32::from(g[1]);
            b += a;
            a += u32::from(g[2]);
            b += a;
            a += u32::from(g[3]);
            b += a;
            a += u32::from(g[4]);
            b += a;
            a += u32::from(g[5]);
            b += a;
            a += u32::from(g[6]);
            b += a;
            a += u32::from(g[7]);
            b += a;
            a += u32::from(g[8]);
            b += a;
            a += u32::from(g[9]);
            b += a;
            a += u32::from(g[10]);
            b += a;
            a += u32::from(g[11]);
            b += a;
            a += u32::from(g[12]);
            b += a;
            a += u32::from(g[13]);
            b += a;
            a += u32::from(g[14]);
            b += a;
            a += u32::from(g[15]);
            b += a;
        }
        for &x in groups.remainder() {
            a += u32::from(x);
            b += a;
        }
        a %= BASE;
        b %= BASE;
    }

    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_identity() {
        assert_eq!(adler32_base(1, b""), 1);
        assert_eq!(adler32_unroll16(0xdead_beef, b""), 0xdead_beef);
    }

    #[test]
    fn test_known_vectors() {
        // RFC 1950 example value for "Wikipedia".
        assert_eq!(adler32_base(1, b"Wikipedia"), 0x11E6_0398);
        assert_eq!(adler32_unroll16(1, b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn test_tiers_agree_on_boundaries() {
        for len in [0, 1, 15, 16, 17, 255, NMAX - 1, NMAX, NMAX + 1] {
            let buf: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            assert_eq!(
                adler32_base(1, &buf),
                adler32_unroll16(1, &buf),
                "length {len}"
            );
        }
    }

    #[test]
    fn test_associative() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        for split in [0, 1, 100, 2048, 4095, 4096] {
            let (a, b) = data.split_at(split);
            assert_eq!(
                adler32_base(adler32_base(1, a), b),
                adler32_base(1, &data),
                "split {split}"
            );
        }
    }
}
