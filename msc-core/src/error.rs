//! Error types for the MSC codec library.
//!
//! Errors are split by layer: bit-level reads, codec-level failures, and
//! generic parameter/resource problems that can surface from any component.

use thiserror::Error;

/// Main error type for the core library.
#[derive(Error, Debug)]
pub enum Error {
    /// Codec errors (encoding/decoding).
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Bitstream parsing errors.
    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// Invalid parameter provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Resource exhausted (memory, buffers, etc.).
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Buffer too small for operation.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Codec errors.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Frame dimensions do not match the stream.
    #[error("Frame dimensions {width}x{height} do not match stream {expected_width}x{expected_height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    /// Frame dimensions exceed limits.
    #[error("Frame dimensions {width}x{height} exceed maximum {max_width}x{max_height}")]
    DimensionsExceeded {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
}

/// Bitstream parsing errors.
#[derive(Error, Debug)]
pub enum BitstreamError {
    /// Unexpected end of bitstream.
    #[error("Unexpected end of bitstream")]
    UnexpectedEnd,

    /// Bit length larger than the backing buffer.
    #[error("Bit length {bits} exceeds buffer of {bytes} bytes")]
    InvalidLength { bits: usize, bytes: usize },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Create a resource exhausted error.
    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        Error::ResourceExhausted(msg.into())
    }

    /// Check if this error was caused by truncated input.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Bitstream(BitstreamError::UnexpectedEnd))
    }
}
