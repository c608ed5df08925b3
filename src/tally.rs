//! Symbol tally buffer and frequency counters.
//!
//! During compression every emitted literal or back-reference is recorded
//! twice: as a compact 3-byte record in the symbol buffer (so the block can
//! be re-emitted once its Huffman trees are known) and as an increment of
//! the frequency bucket the symbol maps to. Both [`SymbolTally::tally_lit`]
//! and [`SymbolTally::tally_dist`] report whether the buffer just filled,
//! which tells the caller to flush the current block.
//!
//! The mapping from raw lengths and distances to the fixed code space is
//! table-driven: 29 length codes covering match lengths 3..=258 and 30
//! distance codes covering distances 1..=32768, each code claiming a
//! power-of-two span sized by its extra-bit count.
//!
//! # Example
//!
//! ```rust
//! use zflate::SymbolTally;
//!
//! let mut tally = SymbolTally::new(1024);
//! tally.tally_lit(b'h');
//! tally.tally_lit(b'i');
//! // A 5-byte match at distance 40: length stored pre-offset by MIN_MATCH.
//! tally.tally_dist(40, 2);
//! assert_eq!(tally.len(), 3);
//! assert_eq!(tally.matches(), 1);
//! ```

/// Number of literal byte codes.
pub const LITERALS: usize = 256;

/// Number of length codes, not counting the special end-of-block code.
pub const LENGTH_CODES: usize = 29;

/// Number of literal/length codes, including the end-of-block code.
pub const L_CODES: usize = LITERALS + 1 + LENGTH_CODES;

/// Number of distance codes.
pub const D_CODES: usize = 30;

/// Extra bits carried by each length code.
pub const EXTRA_LBITS: [u8; LENGTH_CODES] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Extra bits carried by each distance code.
pub const EXTRA_DBITS: [u8; D_CODES] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Length code for each match length minus `MIN_MATCH`.
static LENGTH_CODE: [u8; 256] = build_length_code();

/// Distance code lookup; first 256 entries cover distances 1..=256
/// (0-based), the rest cover larger distances indexed by their top 7 bits.
static DIST_CODE: [u8; 512] = build_dist_code();

const fn build_length_code() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut length = 0;
    let mut code = 0;
    while code < LENGTH_CODES - 1 {
        let span = 1usize << EXTRA_LBITS[code];
        let mut i = 0;
        while i < span {
            table[length] = code as u8;
            length += 1;
            i += 1;
        }
        code += 1;
    }
    // Length 258 overrides the tail of code 27's span with its own code.
    table[255] = (LENGTH_CODES - 1) as u8;
    table
}

const fn build_dist_code() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut dist = 0;
    let mut code = 0;
    while code < 16 {
        let span = 1usize << EXTRA_DBITS[code];
        let mut i = 0;
        while i < span {
            table[dist] = code as u8;
            dist += 1;
            i += 1;
        }
        code += 1;
    }
    dist >>= 7;
    while code < D_CODES {
        let span = 1usize << (EXTRA_DBITS[code] - 7);
        let mut i = 0;
        while i < span {
            table[256 + dist] = code as u8;
            dist += 1;
            i += 1;
        }
        code += 1;
    }
    table
}

/// Maps a 0-based distance (`distance - 1`) to its distance code.
#[inline]
pub fn d_code(dist0: usize) -> u8 {
    debug_assert!(dist0 < 32768);
    if dist0 < 256 {
        DIST_CODE[dist0]
    } else {
        DIST_CODE[256 + (dist0 >> 7)]
    }
}

/// Maps a match length already offset by `MIN_MATCH` to its length code.
#[inline]
pub fn length_code(len: u8) -> u8 {
    LENGTH_CODE[len as usize]
}

/// Pending-block symbol buffer plus the frequency counters that drive tree
/// construction.
///
/// Records are 3 bytes each: `(dist_lo, dist_hi, length)` for a match,
/// `(0, 0, literal)` for a literal. A zero distance is unambiguous because
/// real distances start at 1.
pub struct SymbolTally {
    sym_buf: Vec<u8>,
    sym_end: usize,
    lit_freq: [u16; L_CODES],
    dist_freq: [u16; D_CODES],
    matches: usize,
}

impl std::fmt::Debug for SymbolTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTally")
            .field("symbols", &(self.sym_buf.len() / 3))
            .field("capacity", &(self.sym_end / 3))
            .field("matches", &self.matches)
            .finish()
    }
}

impl SymbolTally {
    /// Creates a tally holding up to `lit_bufsize` symbols before a block
    /// flush is required.
    pub fn new(lit_bufsize: usize) -> Self {
        let sym_end = 3 * lit_bufsize;
        Self {
            sym_buf: Vec::with_capacity(sym_end),
            sym_end,
            lit_freq: [0; L_CODES],
            dist_freq: [0; D_CODES],
            matches: 0,
        }
    }

    /// Records a literal byte. Returns `true` when the buffer is now full
    /// and the block must be flushed.
    pub fn tally_lit(&mut self, c: u8) -> bool {
        self.sym_buf.push(0);
        self.sym_buf.push(0);
        self.sym_buf.push(c);
        self.lit_freq[c as usize] += 1;
        self.sym_buf.len() == self.sym_end
    }

    /// Records a match of `MIN_MATCH + len` bytes at 1-based `dist`.
    ///
    /// `len` arrives pre-offset by `MIN_MATCH`, so the full 3..=258 range
    /// fits a byte. Returns `true` when the buffer is now full.
    pub fn tally_dist(&mut self, dist: u32, len: u8) -> bool {
        debug_assert!((1..=32768).contains(&dist));
        self.sym_buf.push(dist as u8);
        self.sym_buf.push((dist >> 8) as u8);
        self.sym_buf.push(len);
        self.matches += 1;
        // 0-based distance addresses the code table.
        let dist0 = (dist - 1) as usize;
        self.lit_freq[LITERALS + 1 + length_code(len) as usize] += 1;
        self.dist_freq[d_code(dist0) as usize] += 1;
        self.sym_buf.len() == self.sym_end
    }

    /// Clears the buffer and all frequency counters for the next block.
    pub fn reset(&mut self) {
        self.sym_buf.clear();
        self.lit_freq = [0; L_CODES];
        self.dist_freq = [0; D_CODES];
        self.matches = 0;
    }

    /// The raw 3-byte records of the pending block.
    pub fn sym_buf(&self) -> &[u8] {
        &self.sym_buf
    }

    /// Literal/length frequencies, indexed by code.
    pub fn lit_freq(&self) -> &[u16; L_CODES] {
        &self.lit_freq
    }

    /// Distance frequencies, indexed by code.
    pub fn dist_freq(&self) -> &[u16; D_CODES] {
        &self.dist_freq
    }

    /// Matches recorded since the last reset.
    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Symbols recorded since the last reset.
    pub fn len(&self) -> usize {
        self.sym_buf.len() / 3
    }

    /// Whether no symbols have been recorded.
    pub fn is_empty(&self) -> bool {
        self.sym_buf.is_empty()
    }

    /// Whether the buffer has reached capacity.
    pub fn is_full(&self) -> bool {
        self.sym_buf.len() == self.sym_end
    }
}
