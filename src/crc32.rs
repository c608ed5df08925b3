//! CRC-32 (IEEE 802.3 polynomial) checksum engines.
//!
//! Three interchangeable implementations live here: a byte-at-a-time table
//! baseline, a by-eight tier that processes one 64-bit word per step
//! through eight interleaved lookup tables, and a folding tier that runs
//! four lanes in parallel and reduces them with carryless multiplication in
//! the CRC polynomial ring. Wide loads are defined in little-endian terms,
//! which fixes the table order and intermediate byte handling on every
//! platform; the algorithm itself is endian-neutral.
//!
//! An empty buffer is a no-op: the input checksum is returned unchanged.
//!
//! [`Crc32Fold`] is the streaming copy-and-checksum accumulator used by the
//! inflate driver when it both copies window data and checksums it in one
//! pass.

/// IEEE 802.3 polynomial, reflected.
const POLY: u32 = 0xEDB8_8320;

/// Eight interleaved tables: `TABLES[k][n]` is the CRC of byte `n` followed
/// by `k` zero bytes.
static TABLES: [[u32; 256]; 8] = build_tables();

const fn build_tables() -> [[u32; 256]; 8] {
    let mut t = [[0u32; 256]; 8];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        t[0][n] = c;
        n += 1;
    }
    let mut n = 0;
    while n < 256 {
        let mut c = t[0][n];
        let mut k = 1;
        while k < 8 {
            c = t[0][(c & 0xff) as usize] ^ (c >> 8);
            t[k][n] = c;
            k += 1;
        }
        n += 1;
    }
    t
}

#[inline]
fn do_one(c: u32, b: u8) -> u32 {
    TABLES[0][((c ^ u32::from(b)) & 0xff) as usize] ^ (c >> 8)
}

/// Folds one 8-byte little-endian word into the state through the eight
/// interleaved tables.
#[inline]
fn do_word(c: u32, w: &[u8]) -> u32 {
    let lo = u32::from_le_bytes([w[0], w[1], w[2], w[3]]) ^ c;
    let hi = u32::from_le_bytes([w[4], w[5], w[6], w[7]]);
    TABLES[7][(lo & 0xff) as usize]
        ^ TABLES[6][((lo >> 8) & 0xff) as usize]
        ^ TABLES[5][((lo >> 16) & 0xff) as usize]
        ^ TABLES[4][(lo >> 24) as usize]
        ^ TABLES[3][(hi & 0xff) as usize]
        ^ TABLES[2][((hi >> 8) & 0xff) as usize]
        ^ TABLES[1][((hi >> 16) & 0xff) as usize]
        ^ TABLES[0][(hi >> 24) as usize]
}

/// Carryless multiply of two ring elements modulo the CRC polynomial.
///
/// The CRC state is itself an element of GF(2)[x]/P in the reflected
/// representation (bit 31 holds the x^0 coefficient), so appending a zero
/// byte is exactly a multiply by x^8. That makes this the combine primitive
/// for folding independently computed lane states together.
const fn multmodp(a: u32, b: u32) -> u32 {
    let mut a = a;
    let mut b = b;
    let mut p = 0;
    let mut i = 0;
    while i < 32 {
        if a & 0x8000_0000 != 0 {
            p ^= b;
        }
        a <<= 1;
        // Multiply b by x: a reflected right shift, reduced when the x^31
        // coefficient falls off.
        b = if b & 1 != 0 { (b >> 1) ^ POLY } else { b >> 1 };
        i += 1;
    }
    p
}

/// x^n modulo the CRC polynomial, by square-and-multiply.
const fn xnmodp(n: u64) -> u32 {
    let mut n = n;
    let mut r: u32 = 0x8000_0000; // x^0
    let mut sq: u32 = 0x4000_0000; // x
    while n > 0 {
        if n & 1 != 0 {
            r = multmodp(r, sq);
        }
        sq = multmodp(sq, sq);
        n >>= 1;
    }
    r
}

/// Portable baseline: one byte and one table lookup per step.
pub fn crc32_base(crc: u32, buf: &[u8]) -> u32 {
    let mut c = !crc;
    for &b in buf {
        c = do_one(c, b);
    }
    !c
}

/// By-eight tier: eight bytes per step via eight interleaved tables.
///
/// Leading bytes are consumed one at a time until the cursor reaches a
/// 64-bit boundary, then whole words are folded, then the tail is finished
/// byte-wise. Bit-identical to [`crc32_base`] on all inputs.
pub fn crc32_braid(crc: u32, buf: &[u8]) -> u32 {
    let mut c = !crc;

    // Align the wide loop to an 8-byte address.
    let head = buf.len().min(buf.as_ptr().align_offset(8));
    let (head, rest) = buf.split_at(head);
    for &b in head {
        c = do_one(c, b);
    }

    let mut words = rest.chunks_exact(8);
    for w in &mut words {
        c = do_word(c, w);
    }

    for &b in words.remainder() {
        c = do_one(c, b);
    }

    !c
}

/// Folding tier: four lane partials combined by carryless multiplication.
///
/// The buffer is split into four equal stripes processed as independent
/// lanes, one word per lane per step. A lane state is a partial product in
/// the CRC polynomial ring; the final reduction multiplies each lane past
/// the bytes the later lanes cover (appending `n` bytes shifts a state by
/// `x^(8n)`) and XORs the lanes together. Bit-identical to [`crc32_base`].
///
/// The dispatch layer gates this tier on carryless-multiply hardware
/// (`pclmulqdq` / `pmull`); this portable multiply-reduce is the form an
/// intrinsic implementation replaces, behind the same slot.
pub fn crc32_clmul(crc: u32, buf: &[u8]) -> u32 {
    // Short inputs cannot amortize the combine.
    if buf.len() < 64 {
        return crc32_braid(crc, buf);
    }
    let mut c = !crc;

    // Stripe length: a quarter of the buffer, rounded down to whole words.
    let m = (buf.len() / 4) & !7;
    let (stripes, tail) = buf.split_at(4 * m);
    let (s01, s23) = stripes.split_at(2 * m);
    let (s0, s1) = s01.split_at(m);
    let (s2, s3) = s23.split_at(m);

    // Lane 0 carries the incoming state; the others start from zero and
    // accumulate pure message terms.
    let mut c0 = c;
    let mut c1 = 0u32;
    let mut c2 = 0u32;
    let mut c3 = 0u32;
    for (((w0, w1), w2), w3) in s0
        .chunks_exact(8)
        .zip(s1.chunks_exact(8))
        .zip(s2.chunks_exact(8))
        .zip(s3.chunks_exact(8))
    {
        c0 = do_word(c0, w0);
        c1 = do_word(c1, w1);
        c2 = do_word(c2, w2);
        c3 = do_word(c3, w3);
    }

    // One stripe's worth of state shift.
    let k = xnmodp((8 * m) as u64);
    c = multmodp(k, c0) ^ c1;
    c = multmodp(k, c) ^ c2;
    c = multmodp(k, c) ^ c3;

    for &b in tail {
        c = do_one(c, b);
    }
    !c
}

/// Streaming copy-and-checksum accumulator.
///
/// Combines an output copy with the CRC update so the inflate driver touches
/// each byte once. The checksum side goes through the dispatched `crc32`
/// slot, so on capable processors each copy is folded by the lane-parallel
/// [`crc32_clmul`] tier.
///
/// # Example
///
/// ```rust
/// use zflate::crc32::{Crc32Fold, crc32_base};
///
/// let mut fold = Crc32Fold::new();
/// let mut out = [0u8; 9];
/// fold.copy(&mut out, b"123456789");
/// assert_eq!(&out, b"123456789");
/// assert_eq!(fold.finalize(), crc32_base(0, b"123456789"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Fold {
    value: u32,
}

impl Crc32Fold {
    /// Creates a fresh accumulator.
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Resets the accumulator for a new stream.
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Copies `src` into `dst` while folding it into the checksum.
    ///
    /// `dst` must be at least as long as `src`; the copy fills
    /// `dst[..src.len()]`.
    pub fn copy(&mut self, dst: &mut [u8], src: &[u8]) {
        dst[..src.len()].copy_from_slice(src);
        self.value = (crate::dispatch::table().crc32)(self.value, src);
    }

    /// Folds `src` into the checksum without copying.
    pub fn update(&mut self, src: &[u8]) {
        self.value = (crate::dispatch::table().crc32)(self.value, src);
    }

    /// Reduces the accumulator to the final CRC-32 value.
    pub fn finalize(&self) -> u32 {
        self.value
    }
}
