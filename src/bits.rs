//! Bit accumulator for the inflate side.
//!
//! DEFLATE streams pack codes least-significant-bit first. [`BitReader`]
//! keeps up to 64 buffered bits in `hold` and refills them a byte at a time
//! from the caller's input cursor. Running out of input is not an error:
//! [`BitReader::need_bits`] reports [`BitStatus::NeedMore`] and leaves the
//! accumulator intact, so the caller can park its decoder state, fetch more
//! input, and resume mid-symbol.
//!
//! # Example
//!
//! ```rust
//! use zflate::bits::{BitReader, BitStatus};
//!
//! let mut br = BitReader::new();
//! let mut pos = 0;
//!
//! // Only one byte available; a 12-bit request must suspend.
//! assert_eq!(br.need_bits(&[0xAB], &mut pos, 12), BitStatus::NeedMore);
//!
//! // More input arrives; the buffered 8 bits carry over.
//! let mut pos = 0;
//! assert_eq!(br.need_bits(&[0xCD], &mut pos, 12), BitStatus::Ready);
//! assert_eq!(br.bits(12), 0xDAB);
//! br.drop_bits(12);
//! ```

/// Outcome of a refill request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum BitStatus {
    /// The requested bits are buffered and may be read.
    Ready,
    /// Input ran dry; refill the source and call again.
    NeedMore,
}

/// LSB-first bit accumulator with suspend-and-resume refill.
#[derive(Debug, Default, Clone)]
pub struct BitReader {
    hold: u64,
    bits: u32,
}

impl BitReader {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all buffered bits.
    pub fn init_bits(&mut self) {
        self.hold = 0;
        self.bits = 0;
    }

    /// Number of bits currently buffered.
    pub fn bits_held(&self) -> u32 {
        self.bits
    }

    /// Buffers one byte from `input` at `*pos`, advancing the cursor.
    ///
    /// Returns `false` without side effects when the cursor is at the end.
    pub fn pull_byte(&mut self, input: &[u8], pos: &mut usize) -> bool {
        let Some(&byte) = input.get(*pos) else {
            return false;
        };
        debug_assert!(self.bits <= 56, "accumulator has no room for a byte");
        self.hold |= u64::from(byte) << self.bits;
        self.bits += 8;
        *pos += 1;
        true
    }

    /// Ensures at least `n` bits are buffered, pulling bytes as needed.
    ///
    /// `n` must be at most 32 so a refill can never overflow the
    /// accumulator. On [`BitStatus::NeedMore`] the bits pulled so far stay
    /// buffered for the resumed call.
    pub fn need_bits(&mut self, input: &[u8], pos: &mut usize, n: u32) -> BitStatus {
        debug_assert!(n <= 32);
        while self.bits < n {
            if !self.pull_byte(input, pos) {
                return BitStatus::NeedMore;
            }
        }
        BitStatus::Ready
    }

    /// The low `n` buffered bits, without consuming them.
    pub fn bits(&self, n: u32) -> u32 {
        debug_assert!(n <= self.bits && n <= 32);
        (self.hold & ((1u64 << n) - 1)) as u32
    }

    /// Consumes `n` buffered bits.
    pub fn drop_bits(&mut self, n: u32) {
        debug_assert!(n <= self.bits);
        self.hold >>= n;
        self.bits -= n;
    }

    /// Discards bits up to the next byte boundary (stored-block headers are
    /// byte aligned).
    pub fn byte_align(&mut self) {
        let partial = self.bits & 7;
        self.hold >>= partial;
        self.bits -= partial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_byte_order() {
        let mut br = BitReader::new();
        let mut pos = 0;
        assert!(br.pull_byte(&[0x12, 0x34], &mut pos));
        assert!(br.pull_byte(&[0x12, 0x34], &mut pos));
        assert_eq!(pos, 2);
        // First byte occupies the low bits.
        assert_eq!(br.bits(16), 0x3412);
    }

    #[test]
    fn test_pull_byte_at_end_is_noop() {
        let mut br = BitReader::new();
        let mut pos = 1;
        assert!(!br.pull_byte(&[0xFF], &mut pos));
        assert_eq!(pos, 1);
        assert_eq!(br.bits_held(), 0);
    }

    #[test]
    fn test_need_bits_resumes_across_inputs() {
        let mut br = BitReader::new();

        let first = [0b1010_1010];
        let mut pos = 0;
        assert_eq!(br.need_bits(&first, &mut pos, 13), BitStatus::NeedMore);
        assert_eq!(br.bits_held(), 8);

        // The same request against fresh input completes using the carried
        // bits plus one more byte.
        let second = [0b1100_0011];
        let mut pos = 0;
        assert_eq!(br.need_bits(&second, &mut pos, 13), BitStatus::Ready);
        assert_eq!(pos, 1);
        assert_eq!(br.bits(13), 0b0_0011_1010_1010);
    }

    #[test]
    fn test_drop_bits_shifts_remainder() {
        let mut br = BitReader::new();
        let mut pos = 0;
        let _ = br.need_bits(&[0xCD, 0xAB], &mut pos, 16);
        assert_eq!(br.bits(4), 0xD);
        br.drop_bits(4);
        assert_eq!(br.bits(8), 0xBC);
        assert_eq!(br.bits_held(), 12);
    }

    #[test]
    fn test_byte_align_discards_partial_byte() {
        let mut br = BitReader::new();
        let mut pos = 0;
        let _ = br.need_bits(&[0xFF, 0x0F], &mut pos, 16);
        br.drop_bits(3);
        br.byte_align();
        assert_eq!(br.bits_held(), 8);
        assert_eq!(br.bits(8), 0x0F);
    }

    #[test]
    fn test_byte_align_on_boundary_keeps_bits() {
        let mut br = BitReader::new();
        let mut pos = 0;
        let _ = br.need_bits(&[0x55], &mut pos, 8);
        br.byte_align();
        assert_eq!(br.bits_held(), 8);
    }

    #[test]
    fn test_init_bits_clears() {
        let mut br = BitReader::new();
        let mut pos = 0;
        let _ = br.need_bits(&[1, 2, 3], &mut pos, 24);
        br.init_bits();
        assert_eq!(br.bits_held(), 0);
        assert_eq!(br.bits(0), 0);
    }
}
