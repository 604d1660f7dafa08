//! Errors for public key derivation.

use thiserror::Error;

/// Error type for key derivation operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DerivationError {
    /// A key or chain code does not have its fixed size.
    #[error("invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// What was being parsed.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A hex string of the right length contains non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Bytes do not decode to a usable curve point.
    #[error("invalid point: {0}")]
    InvalidPoint(String),

    /// A blob string ends inside an unfinished `\xx` escape.
    #[error("incomplete escape sequence at the end of the input string")]
    IncompleteEscape,

    /// No master key is registered under the given id.
    #[error("unknown master public key id: {0}")]
    UnknownMasterKey(String),

    /// A hash output did not have its fixed length, or a retry loop ran away.
    ///
    /// This is never expected to happen and the call is aborted.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(&'static str),
}
