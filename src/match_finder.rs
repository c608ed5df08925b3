//! Hash-chain LZ77 match finder.
//!
//! [`ChainMatchFinder`] owns the sliding window and the two chain tables:
//! `head` maps a 3-byte hash to the most recent window position with that
//! hash, `prev` links each position to the previous one sharing it. Walking
//! a chain newest-to-oldest visits candidate matches in order of increasing
//! distance, so the first candidate of a given length is always the nearest
//! one.
//!
//! The walk itself ([`longest_match`](ChainMatchFinder::longest_match))
//! comes in four tiers that differ only in how wide a load the cheap
//! rejection test uses. Most chain entries fail at the byte where they
//! would have to differ for the match to improve, so the test compares at
//! the tail end of the current best length before paying for a full
//! extension. All tiers return identical results at levels without the
//! early-exit shortcut.
//!
//! # Example
//!
//! ```rust
//! use zflate::ChainMatchFinder;
//!
//! let mut mf = ChainMatchFinder::new(6, 15)?;
//! mf.fill_window(b"abcabcabc");
//! mf.insert_range(0, 6);
//! mf.advance(6);
//! // Insert the string at the cursor; the prior chain head is the
//! // nearest earlier occurrence of the same 3-byte prefix.
//! let head = mf.insert_string(mf.strstart());
//! let len = mf.longest_match(head);
//! assert_eq!(len, 3);
//! assert_eq!(mf.match_start(), 3); // nearest candidate wins the tie
//! # Ok::<(), zflate::Error>(())
//! ```

use crate::compare::{compare256_16, compare256_32, compare256_64, compare256_base};
use crate::error::{Error, Result};
use crate::{MIN_LOOKAHEAD, MIN_MATCH};

/// Number of bits in the 3-byte hash.
const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;

/// Knuth's multiplicative constant; spreads 3-byte values over the table.
const HASH_MULTIPLIER: u32 = 0x9E37_79B1;

/// Empty-chain sentinel. Position 0 can never be returned as a match; the
/// first window byte is not addressable as a candidate, matching zlib.
const NIL: u32 = 0;

/// Below this level the chain walk stops at the first candidate that fails
/// to improve the match, trading ratio for speed.
const EARLY_EXIT_TRIGGER_LEVEL: u8 = 5;

/// Search-effort parameters derived from the compression level.
///
/// Reproduces the classic per-level tuning table: higher levels walk longer
/// chains and insist on longer matches before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Reduce chain-walk effort once a match of this length is in hand.
    pub good_length: u32,
    /// Defer literal emission while the previous match is shorter than this
    /// (used by the lazy-matching driver; carried here for completeness).
    pub max_lazy: u32,
    /// Stop searching outright at this match length.
    pub nice_length: u32,
    /// Upper bound on chain entries examined per search.
    pub max_chain: u32,
}

impl SearchParams {
    /// Returns the parameter set for a compression level in `1..=9`.
    pub fn for_level(level: u8) -> Result<Self> {
        let (good_length, max_lazy, nice_length, max_chain) = match level {
            1 => (4, 4, 8, 4),
            2 => (4, 5, 16, 8),
            3 => (4, 6, 32, 32),
            4 => (4, 4, 16, 16),
            5 => (8, 16, 32, 32),
            6 => (8, 16, 128, 128),
            7 => (8, 32, 128, 256),
            8 => (32, 128, 258, 1024),
            9 => (32, 258, 258, 4096),
            _ => return Err(Error::InvalidLevel { level }),
        };
        Ok(Self {
            good_length,
            max_lazy,
            nice_length,
            max_chain,
        })
    }
}

/// LZ77 match finder over a sliding window with hash chains.
///
/// Owned exclusively by one compression session; never shared between
/// threads. The window holds `2 * w_size` bytes so input can stream through
/// without a copy per position: once `strstart` passes the upper half, the
/// whole state slides down by `w_size`.
pub struct ChainMatchFinder {
    window: Vec<u8>,
    head: Vec<u32>,
    prev: Vec<u32>,
    w_size: usize,
    w_mask: usize,
    strstart: usize,
    lookahead: usize,
    prev_length: usize,
    match_start: usize,
    level: u8,
    params: SearchParams,
}

impl std::fmt::Debug for ChainMatchFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainMatchFinder")
            .field("w_size", &self.w_size)
            .field("strstart", &self.strstart)
            .field("lookahead", &self.lookahead)
            .field("level", &self.level)
            .finish()
    }
}

impl ChainMatchFinder {
    /// Creates a match finder for the given level and window size exponent.
    ///
    /// `window_bits` selects a `1 << window_bits` byte window and must lie
    /// in `9..=18`; `level` must lie in `1..=9`.
    pub fn new(level: u8, window_bits: u8) -> Result<Self> {
        if !(9..=18).contains(&window_bits) {
            return Err(Error::InvalidWindowBits { bits: window_bits });
        }
        let params = SearchParams::for_level(level)?;
        let w_size = 1usize << window_bits;
        Ok(Self {
            window: vec![0; 2 * w_size],
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; w_size],
            w_size,
            w_mask: w_size - 1,
            strstart: 0,
            lookahead: 0,
            prev_length: 0,
            match_start: 0,
            level,
            params,
        })
    }

    /// Clears all state for a new stream, keeping the allocations.
    pub fn reset(&mut self) {
        self.window.fill(0);
        self.head.fill(NIL);
        self.prev.fill(NIL);
        self.strstart = 0;
        self.lookahead = 0;
        self.prev_length = 0;
        self.match_start = 0;
    }

    /// The maximum back-reference distance.
    ///
    /// Slightly less than the window size so a match started near the edge
    /// can always run to [`crate::MAX_MATCH`].
    pub fn max_dist(&self) -> usize {
        self.w_size - MIN_LOOKAHEAD
    }

    /// Current input cursor.
    pub fn strstart(&self) -> usize {
        self.strstart
    }

    /// Valid bytes ahead of the cursor.
    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Start of the best match found by the last improving search.
    pub fn match_start(&self) -> usize {
        self.match_start
    }

    /// Length of the match carried over from the previous position.
    pub fn prev_length(&self) -> usize {
        self.prev_length
    }

    /// Sets the carried-over match length (lazy evaluation bookkeeping).
    pub fn set_prev_length(&mut self, len: usize) {
        self.prev_length = len;
    }

    /// The window contents; `strstart + lookahead` bytes are valid.
    pub fn window(&self) -> &[u8] {
        &self.window
    }

    /// Search-effort parameters in force.
    pub fn params(&self) -> SearchParams {
        self.params
    }

    /// Copies input into the window behind the lookahead, sliding first if
    /// the cursor has crossed into the upper half. Returns bytes consumed.
    pub fn fill_window(&mut self, input: &[u8]) -> usize {
        if self.strstart >= self.w_size + self.max_dist() {
            self.slide_window();
        }
        let end = self.strstart + self.lookahead;
        let room = self.window.len() - end;
        let n = input.len().min(room);
        self.window[end..end + n].copy_from_slice(&input[..n]);
        self.lookahead += n;
        n
    }

    /// Advances the cursor over `n` consumed bytes.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.lookahead);
        self.strstart += n;
        self.lookahead -= n;
    }

    /// Inserts the 3-byte string at `pos` into its hash chain.
    ///
    /// Returns the previous chain head, which is the candidate position to
    /// hand to [`longest_match`](Self::longest_match). Requires 3 valid
    /// bytes at `pos`.
    pub fn insert_string(&mut self, pos: usize) -> u32 {
        let h = self.hash(pos);
        let head = self.head[h];
        self.prev[pos & self.w_mask] = head;
        self.head[h] = pos as u32;
        head
    }

    /// Inserts `count` consecutive positions starting at `pos`.
    ///
    /// Returns the prior chain head for the final position inserted.
    pub fn insert_range(&mut self, pos: usize, count: usize) -> u32 {
        let mut head = NIL;
        for p in pos..pos + count {
            head = self.insert_string(p);
        }
        head
    }

    /// Finds the longest match for the string at `strstart` through the
    /// dispatch table.
    ///
    /// `cur_match` is the head of the current hash chain; its distance must
    /// be within [`max_dist`](Self::max_dist). On improvement over
    /// [`prev_length`](Self::prev_length) the start position is written to
    /// [`match_start`](Self::match_start). The returned length never
    /// exceeds the lookahead.
    pub fn longest_match(&mut self, cur_match: u32) -> u32 {
        (crate::dispatch::table().longest_match)(self, cur_match)
    }

    #[inline]
    fn hash(&self, pos: usize) -> usize {
        debug_assert!(pos + MIN_MATCH <= self.window.len());
        let v = u32::from(self.window[pos])
            | u32::from(self.window[pos + 1]) << 8
            | u32::from(self.window[pos + 2]) << 16;
        (v.wrapping_mul(HASH_MULTIPLIER) >> (32 - HASH_BITS)) as usize
    }

    /// Shifts the window down by `w_size` and rebases every position.
    fn slide_window(&mut self) {
        let w = self.w_size;
        let (lo, hi) = self.window.split_at_mut(w);
        (crate::dispatch::table().chunkcopy_safe)(lo, hi, w);
        self.strstart -= w;
        self.match_start = self.match_start.saturating_sub(w);
        self.slide_hash();
    }

    /// Rebases the chain tables after a slide; positions that fall off the
    /// bottom collapse to the empty sentinel.
    fn slide_hash(&mut self) {
        let w = self.w_size as u32;
        for h in &mut self.head {
            *h = h.saturating_sub(w);
        }
        for p in &mut self.prev {
            *p = p.saturating_sub(w);
        }
    }
}

/// Load width used by the cheap rejection test.
#[derive(Clone, Copy)]
enum CmpWidth {
    One,
    Two,
    Four,
    Eight,
}

#[inline]
fn read16(w: &[u8], p: usize) -> u16 {
    u16::from_le_bytes([w[p], w[p + 1]])
}

#[inline]
fn read32(w: &[u8], p: usize) -> u32 {
    u32::from_le_bytes(w[p..p + 4].try_into().unwrap())
}

#[inline]
fn read64(w: &[u8], p: usize) -> u64 {
    u64::from_le_bytes(w[p..p + 8].try_into().unwrap())
}

/// Tail-end rejection: compares a few bytes at the point where a candidate
/// must differ from the scan for the match not to be an improvement, plus
/// the match start. Never rejects a candidate longer than `best_len`.
#[inline]
fn candidate_viable(w: &[u8], scan: usize, m: usize, best_len: usize, width: CmpWidth) -> bool {
    match width {
        CmpWidth::One => {
            let off = best_len - 1;
            w[m + off] == w[scan + off]
                && w[m + off + 1] == w[scan + off + 1]
                && w[m] == w[scan]
                && w[m + 1] == w[scan + 1]
        }
        CmpWidth::Two => {
            let off = best_len - 1;
            read16(w, m + off) == read16(w, scan + off) && read16(w, m) == read16(w, scan)
        }
        CmpWidth::Four | CmpWidth::Eight if best_len < 4 => {
            let off = best_len - 1;
            read16(w, m + off) == read16(w, scan + off) && read16(w, m) == read16(w, scan)
        }
        CmpWidth::Eight if best_len >= 8 => {
            let off = best_len - 7;
            read64(w, m + off) == read64(w, scan + off) && read64(w, m) == read64(w, scan)
        }
        _ => {
            let off = best_len - 3;
            read32(w, m + off) == read32(w, scan + off) && read32(w, m) == read32(w, scan)
        }
    }
}

fn longest_match_tpl(
    s: &mut ChainMatchFinder,
    mut cur_match: u32,
    width: CmpWidth,
    compare256: fn(&[u8], &[u8]) -> u32,
) -> u32 {
    let strstart = s.strstart;
    debug_assert!(
        strstart <= s.window.len() - MIN_LOOKAHEAD,
        "need lookahead slack"
    );
    debug_assert!((cur_match as usize) < strstart);

    let wmask = s.w_mask;
    let mut best_len = s.prev_length.max(1);
    let mut match_start = s.match_start;

    // Do not waste effort once a good match is already in hand.
    let mut chain_length = s.params.max_chain;
    if best_len >= s.params.good_length as usize {
        chain_length >>= 2;
    }

    // Never look past the lookahead: output must be deterministic no matter
    // how much input happens to be buffered.
    let nice = (s.params.nice_length as usize).min(s.lookahead);

    // Oldest position still within reach; chains are pruned at this bound.
    let limit = strstart.saturating_sub(s.max_dist()) as u32;

    loop {
        let m = cur_match as usize;
        if m >= strstart {
            break;
        }

        // Wide loads here may touch bytes beyond the lookahead; the window
        // is fully allocated and zeroed, and the final length is capped, so
        // those speculative reads affect speed only.
        if candidate_viable(&s.window, strstart, m, best_len, width) {
            let len = 2 + compare256(&s.window[strstart + 2..], &s.window[m + 2..]) as usize;

            if len > best_len {
                match_start = m;
                best_len = len;
                if best_len >= nice {
                    break;
                }
            } else if s.level < EARLY_EXIT_TRIGGER_LEVEL {
                // A later improvement is unlikely; cheaper to stop here at
                // the fast levels.
                break;
            }
        }

        chain_length -= 1;
        if chain_length == 0 {
            break;
        }
        cur_match = s.prev[m & wmask];
        if cur_match <= limit {
            break;
        }
    }

    s.match_start = match_start;
    best_len.min(s.lookahead) as u32
}

/// Portable chain walk: byte-wide rejection test.
pub fn longest_match_base(s: &mut ChainMatchFinder, cur_match: u32) -> u32 {
    longest_match_tpl(s, cur_match, CmpWidth::One, compare256_base)
}

/// 16-bit rejection test and word-wide extension.
pub fn longest_match_16(s: &mut ChainMatchFinder, cur_match: u32) -> u32 {
    longest_match_tpl(s, cur_match, CmpWidth::Two, compare256_16)
}

/// 32-bit rejection test and word-wide extension.
pub fn longest_match_32(s: &mut ChainMatchFinder, cur_match: u32) -> u32 {
    longest_match_tpl(s, cur_match, CmpWidth::Four, compare256_32)
}

/// 64-bit rejection test and word-wide extension.
pub fn longest_match_64(s: &mut ChainMatchFinder, cur_match: u32) -> u32 {
    longest_match_tpl(s, cur_match, CmpWidth::Eight, compare256_64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder_with(level: u8, data: &[u8]) -> ChainMatchFinder {
        let mut mf = ChainMatchFinder::new(level, 15).unwrap();
        mf.fill_window(data);
        mf
    }

    #[test]
    fn test_new_validates_config() {
        assert!(ChainMatchFinder::new(6, 15).is_ok());
        assert!(matches!(
            ChainMatchFinder::new(0, 15),
            Err(Error::InvalidLevel { level: 0 })
        ));
        assert!(matches!(
            ChainMatchFinder::new(10, 15),
            Err(Error::InvalidLevel { level: 10 })
        ));
        assert!(matches!(
            ChainMatchFinder::new(6, 8),
            Err(Error::InvalidWindowBits { bits: 8 })
        ));
        assert!(matches!(
            ChainMatchFinder::new(6, 19),
            Err(Error::InvalidWindowBits { bits: 19 })
        ));
    }

    #[test]
    fn test_params_table() {
        let p = SearchParams::for_level(9).unwrap();
        assert_eq!(p.max_chain, 4096);
        assert_eq!(p.nice_length, 258);
        let p = SearchParams::for_level(1).unwrap();
        assert_eq!(p.max_chain, 4);
    }

    #[test]
    fn test_abcabcabc_scenario() {
        // Candidates at 3 and 0; equal lengths, so the nearer one (3) wins
        // because chain order is newest-first and ties never replace.
        let mut mf = finder_with(6, b"abcabcabc");
        mf.insert_range(0, 6);
        mf.advance(6);
        let head = mf.insert_string(6);
        assert_eq!(head, 3);
        let len = longest_match_base(&mut mf, head);
        assert_eq!(len, 3);
        assert_eq!(mf.match_start(), 3);
    }

    #[test]
    fn test_tiers_agree_on_scenario() {
        for f in [
            longest_match_base,
            longest_match_16,
            longest_match_32,
            longest_match_64,
        ] {
            let mut mf = finder_with(6, b"abcabcabc");
            mf.insert_range(0, 6);
            mf.advance(6);
            let head = mf.insert_string(6);
            assert_eq!(f(&mut mf, head), 3);
            assert_eq!(mf.match_start(), 3);
        }
    }

    #[test]
    fn test_long_match_found() {
        let mut data = Vec::new();
        data.extend_from_slice(b"the quick brown fox ");
        data.extend_from_slice(b"the quick brown fox jumps");
        let mut mf = finder_with(9, &data);
        mf.insert_range(0, 20);
        mf.advance(20);
        let head = mf.insert_string(20);
        assert_eq!(head, 0);
        let len = mf.longest_match(head);
        assert_eq!(len, 20);
        assert_eq!(mf.match_start(), 0);
    }

    #[test]
    fn test_length_capped_by_lookahead() {
        let mut mf = finder_with(9, b"aaaaaaaaaaaaaaaaaaaa");
        let head = mf.insert_range(0, 16);
        mf.advance(16);
        // Only 4 bytes of lookahead remain; the run itself is longer.
        let len = mf.longest_match(head);
        assert!(len <= mf.lookahead() as u32);
        assert_eq!(len, 4);
    }

    #[test]
    fn test_no_match_returns_prev_length_floor() {
        let mut mf = finder_with(6, b"abcdefghijklmnop");
        mf.insert_range(0, 8);
        mf.advance(8);
        // Head for a fresh hash with an empty chain is NIL; the walk
        // terminates immediately and best_len stays at the floor.
        let len = longest_match_base(&mut mf, NIL);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_slide_rebases_positions() {
        let mut mf = ChainMatchFinder::new(6, 9).unwrap();
        let w = 1usize << 9;
        let block: Vec<u8> = (0..w).map(|i| (i % 251) as u8).collect();

        // Walk the cursor past w_size + max_dist to force a slide.
        while mf.strstart() < w + mf.max_dist() {
            let n = mf.fill_window(&block);
            if n == 0 {
                let adv = mf.lookahead();
                mf.insert_range(mf.strstart(), adv.saturating_sub(2));
                mf.advance(adv);
            }
        }
        let before = mf.strstart();
        mf.fill_window(&block);
        assert!(mf.strstart() < before, "window should have slid down");
        // Chain entries must stay below the cursor.
        for &h in &mf.head {
            assert!((h as usize) < 2 * w);
        }
    }

    #[test]
    fn test_insert_builds_chain() {
        let mut mf = finder_with(6, b"xyzxyzxyz");
        assert_eq!(mf.insert_string(0), NIL);
        assert_eq!(mf.insert_string(3), 0);
        assert_eq!(mf.insert_string(6), 3);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut mf = finder_with(6, b"abcabc");
        mf.insert_range(0, 3);
        mf.advance(3);
        mf.reset();
        assert_eq!(mf.strstart(), 0);
        assert_eq!(mf.lookahead(), 0);
        assert!(mf.window().iter().all(|&b| b == 0));
    }
}
