//! # zflate
//!
//! Runtime-dispatched core primitives of the DEFLATE family: an LZ77
//! hash-chain match finder over a sliding window, a chunked
//! window-reconstruction engine for replaying back-references, and streaming
//! Adler-32/CRC-32 checksums.
//!
//! Every hot operation has several interchangeable implementations of
//! differing width. A process-wide [dispatch table](dispatch::table) probes
//! the host processor once at startup and binds each operation slot to the
//! fastest implementation the detected capabilities support, falling back to
//! a portable baseline that is always available. Swapping implementations
//! never changes output, only speed.
//!
//! This crate is the engine room, not a stream API: gzip/zlib framing,
//! Huffman coding, and the deflate/inflate drivers are external consumers of
//! the token stream, match candidates, and checksums produced here.
//!
//! ## Quick Start
//!
//! ```rust
//! use zflate::{ChainMatchFinder, adler32, crc32};
//!
//! // Checksums are plain values threaded through updates.
//! let mut sum = 1u32;
//! sum = adler32(sum, b"Hello, ");
//! sum = adler32(sum, b"World!");
//! assert_eq!(sum, adler32(1, b"Hello, World!"));
//!
//! let crc = crc32(0, b"123456789");
//! assert_eq!(crc, 0xCBF43926);
//!
//! // The match finder locates repeated substrings in its window.
//! let mut mf = ChainMatchFinder::new(6, 15)?;
//! mf.fill_window(b"abcabcabc");
//! # Ok::<(), zflate::Error>(())
//! ```
//!
//! ## Back-reference replay
//!
//! ```rust
//! use zflate::dispatch::table;
//!
//! let t = table();
//! let mut out = vec![0u8; 64];
//! out[0] = b'x';
//! // Ten copies of the byte one position back: "xxxxxxxxxx".
//! (t.chunkmemset_safe)(&mut out, 1, 1, 10, 63);
//! assert_eq!(&out[..11], b"xxxxxxxxxxx");
//! ```
//!
//! ## Concurrency
//!
//! The dispatch table is populated once behind a [`std::sync::OnceLock`] and
//! is read-only afterwards; it is the only structure shared between threads.
//! Sessions ([`ChainMatchFinder`], [`SymbolTally`], [`bits::BitReader`]) are
//! single-threaded and exclusively owned.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod adler32;
pub mod bits;
pub mod chunkset;
pub mod compare;
pub mod cpu;
pub mod crc32;
pub mod dispatch;
pub mod error;
pub mod match_finder;
pub mod tally;

pub use cpu::CpuFeatures;
pub use dispatch::FuncTable;
pub use error::{Error, Result};
pub use match_finder::{ChainMatchFinder, SearchParams};
pub use tally::SymbolTally;

/// Smallest match length worth encoding as a back-reference.
pub const MIN_MATCH: usize = 3;

/// Largest match length the DEFLATE format can encode.
pub const MAX_MATCH: usize = 258;

/// Slack the window keeps past `strstart` so wide compares stay in bounds.
///
/// [`ChainMatchFinder`] maintains `strstart <= window_size - MIN_LOOKAHEAD`.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// Updates an Adler-32 checksum through the process-wide dispatch table.
///
/// The initial value for a fresh stream is `1`. An empty buffer returns the
/// input checksum unchanged.
pub fn adler32(adler: u32, buf: &[u8]) -> u32 {
    (dispatch::table().adler32)(adler, buf)
}

/// Updates a CRC-32 (IEEE) checksum through the process-wide dispatch table.
///
/// The initial value for a fresh stream is `0`. An empty buffer returns the
/// input checksum unchanged.
pub fn crc32(crc: u32, buf: &[u8]) -> u32 {
    (dispatch::table().crc32)(crc, buf)
}
