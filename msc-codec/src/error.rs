//! MSC codec error types.

use thiserror::Error;

/// MSC codec error.
#[derive(Debug, Error)]
pub enum MscError {
    /// Error from the core layer (bit reads, frame buffers, packet framing).
    #[error(transparent)]
    Core(#[from] msc_core::Error),

    /// Invalid encoder or decoder configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Stream extradata could not be parsed.
    #[error("Invalid extradata: {0}")]
    InvalidExtradata(String),

    /// Buffer allocation failed.
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// The packet is shorter than its header or payload claims.
    #[error("Truncated packet: need {needed} bytes, have {available}")]
    TruncatedPacket {
        /// Bytes required.
        needed: usize,
        /// Bytes present.
        available: usize,
    },

    /// An RLE length byte that no encoder produces, or a run past the row end.
    #[error("Invalid RLE run 0x{run:02x} at byte {offset}")]
    InvalidRun {
        /// The offending length byte.
        run: u8,
        /// Offset of the length byte in the plane data.
        offset: usize,
    },

    /// Arithmetic-coded data that does not decode to a valid symbol.
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),
}

impl MscError {
    /// Create a corrupt stream error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        MscError::CorruptStream(msg.into())
    }
}

/// MSC result type.
pub type Result<T> = std::result::Result<T, MscError>;
