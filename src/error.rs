//! Error types for session configuration.
//!
//! The hot primitives in this crate are precondition-based: they operate on
//! pre-validated, length-bounded inputs and never return runtime errors.
//! Only the configuration surface (compression level, window size) is
//! fallible, and those failures are reported through [`Error`].

/// The error type for zflate configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The compression level is outside the supported range.
    ///
    /// Levels 1 (fastest) through 9 (best ratio) select search-effort
    /// parameters for the match finder. Level 0 (stored blocks) performs no
    /// match search and has no parameter set.
    #[error("invalid compression level {level}, expected 1-9")]
    InvalidLevel {
        /// The rejected level.
        level: u8,
    },

    /// The window size exponent is outside the supported range.
    ///
    /// Window sizes are powers of two between 512 bytes (bits = 9) and
    /// 256 KiB (bits = 18).
    #[error("invalid window bits {bits}, expected 9-18")]
    InvalidWindowBits {
        /// The rejected exponent.
        bits: u8,
    },
}

/// A specialized `Result` type for zflate configuration.
pub type Result<T> = std::result::Result<T, Error>;
