//! Chunked copy engine for window reconstruction.
//!
//! Replaying LZ77 tokens is memory movement: literals append bytes, matches
//! copy `len` bytes from `dist` positions back in the output being built.
//! Doing that one byte at a time wastes the processor; this module moves
//! fixed-width chunks instead, with the chunk width (`N` = 8, 16 or 32
//! bytes) selected at startup by the dispatch table. Callers must query the
//! width through the `chunksize` slot rather than assume it.
//!
//! The subtle case is `dist < N`: the bytes a wide load would fetch have not
//! all been written yet. The engine first unrolls the short pattern into a
//! self-repeating chunk, then proceeds with whole-chunk stores that advance
//! by the largest multiple of `dist` not exceeding `N`, keeping the cycle
//! phase-aligned.
//!
//! Two flavors of every operation exist. The fast flavor rounds work up to
//! whole chunks and may write (or read) up to `N - 1` bytes past the
//! requested length; callers guarantee that slack exists. The `_safe`
//! flavor trims the final chunk with narrow stores and never touches a byte
//! past the stated limit. Having the bounded flavor here is what lets the
//! drivers skip per-byte validation everywhere else.
//!
//! All positions are indices into the output slice; distance validation
//! (`dist <= pos`) happens upstream in the token decoder.

/// Reports the chunk width of this instantiation.
pub fn chunksize<const N: usize>() -> usize {
    N
}

/// Bulk copy between distinct buffers, rounded up to whole chunks.
///
/// Copies `len` bytes from `src` to `dst` in `N`-wide chunks. Both slices
/// must extend to the next chunk boundary past `len`; the bytes between
/// `len` and that boundary in `dst` are overwritten with garbage the caller
/// has declared disposable.
pub fn chunkcopy<const N: usize>(dst: &mut [u8], src: &[u8], len: usize) -> usize {
    debug_assert!(len > 0);
    let chunks = len.div_ceil(N);
    debug_assert!(dst.len() >= chunks * N && src.len() >= chunks * N);
    for i in 0..chunks {
        let o = i * N;
        dst[o..o + N].copy_from_slice(&src[o..o + N]);
    }
    len
}

/// Bounded bulk copy: never reads or writes past `len`.
///
/// Whole chunks are used while a full chunk fits; the tail is finished with
/// one narrow copy. `len` is additionally clamped to both slice lengths, so
/// this is the flavor to use when `src` nears the end of its buffer.
pub fn chunkcopy_safe<const N: usize>(dst: &mut [u8], src: &[u8], len: usize) -> usize {
    let len = len.min(dst.len()).min(src.len());
    let mut o = 0;
    while len - o >= N {
        dst[o..o + N].copy_from_slice(&src[o..o + N]);
        o += N;
    }
    if o < len {
        dst[o..len].copy_from_slice(&src[o..len]);
    }
    len
}

/// Widens a short back-reference by self-copying until `dist >= N`.
///
/// Starting at `pos`, copies `dist` bytes from `dist` back, doubling the
/// period each round. Returns the advanced position; `dist` and `len` are
/// updated in place. Copies never exceed the remaining `len`, so no slack
/// is required.
pub fn chunkunroll<const N: usize>(
    out: &mut [u8],
    mut pos: usize,
    dist: &mut usize,
    len: &mut usize,
) -> usize {
    debug_assert!(*dist >= 1 && *dist <= pos);
    while *dist < N && *dist < *len {
        out.copy_within(pos - *dist..pos, pos);
        pos += *dist;
        *len -= *dist;
        *dist += *dist;
    }
    pos
}

/// Back-reference replay: writes `len` bytes, each equal to the byte `dist`
/// positions earlier in the same growing output.
///
/// Rounds stores up to whole chunks; `out` must have `N - 1` bytes of slack
/// past `pos + len`. Returns the logical end position `pos + len` (the
/// slack bytes beyond it hold garbage).
pub fn chunkmemset<const N: usize>(out: &mut [u8], pos: usize, dist: usize, len: usize) -> usize {
    debug_assert!(dist >= 1 && dist <= pos);
    debug_assert!(out.len() >= pos + len + (N - 1));
    if dist >= N {
        return chunkcopy_within::<N>(out, pos, dist, len);
    }

    let chunk = build_pattern::<N>(out, pos, dist);
    // Largest multiple of dist that fits a chunk; stores overlap by
    // N % dist bytes, which the aligned pattern rewrites with equal values.
    let advance = N - (N % dist);
    let end = pos + len;
    let mut p = pos;
    while p < end {
        out[p..p + N].copy_from_slice(&chunk);
        p += advance;
    }
    end
}

/// Bounded back-reference replay: writes exactly `min(len, left)` bytes.
///
/// `left` is the space remaining in the output; the final chunk is trimmed
/// byte-wise so no store lands past `pos + min(len, left)`.
pub fn chunkmemset_safe<const N: usize>(
    out: &mut [u8],
    pos: usize,
    dist: usize,
    len: usize,
    left: usize,
) -> usize {
    debug_assert!(dist >= 1 && dist <= pos);
    let len = len.min(left);
    debug_assert!(out.len() >= pos + len);
    let end = pos + len;
    let mut p = pos;

    if dist >= N {
        while end - p >= N {
            out.copy_within(p - dist..p - dist + N, p);
            p += N;
        }
    } else if len >= N {
        let chunk = build_pattern::<N>(out, pos, dist);
        let advance = N - (N % dist);
        // A full chunk store stays inside the limit while N bytes remain.
        while end - p >= N {
            out[p..p + N].copy_from_slice(&chunk);
            p += advance;
        }
    }

    while p < end {
        out[p] = out[p - dist];
        p += 1;
    }
    end
}

/// Unrolls a sub-chunk pattern into one self-repeating chunk.
///
/// `chunk[i]` holds the byte for phase `i % dist` of the cycle, so a store
/// at any `dist`-aligned offset from `pos` reproduces the pattern exactly.
#[inline]
fn build_pattern<const N: usize>(out: &[u8], pos: usize, dist: usize) -> [u8; N] {
    let mut chunk = [0u8; N];
    let start = pos - dist;
    for (i, b) in chunk.iter_mut().enumerate() {
        *b = out[start + i % dist];
    }
    chunk
}

/// Forward chunked copy within one buffer for `dist >= N`.
///
/// Each chunk's source lies entirely before its destination, so earlier
/// stores feed later loads exactly as LZ77 replay requires.
#[inline]
fn chunkcopy_within<const N: usize>(out: &mut [u8], pos: usize, dist: usize, len: usize) -> usize {
    let end = pos + len;
    let mut p = pos;
    while p < end {
        out.copy_within(p - dist..p - dist + N, p);
        p += N;
    }
    end
}
