//! Errors raised while appending to, trimming or addressing a chunk buffer.

use thiserror::Error;

use super::Position;

/// Errors produced by [`ChunkBuffer`](super::ChunkBuffer).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// A chunk or gap arrived with an unexpected sequence number.
    ///
    /// This points at a capture-source bug or unhandled reordering; the
    /// buffer should be reset rather than repaired.
    #[error("chunk out of order: expected sequence {expected}, found {found}")]
    OutOfOrder { expected: u64, found: u64 },

    /// A position names a chunk or intra-chunk offset past the tail.
    #[error("position {position} lies beyond the {chunks} retained chunks")]
    PositionOutOfRange { position: Position, chunks: usize },

    /// A trim position precedes bytes that were already consumed.
    #[error("position {position} lies behind the buffer head at offset {head}")]
    PositionBehindHead { position: Position, head: usize },

    /// An absolute offset lies past the end of the retained bytes.
    #[error("offset {offset} lies beyond the buffer end at {len}")]
    OffsetOutOfRange { offset: usize, len: usize },
}

impl BufferError {
    /// Returns the error category as a string for logging and metrics.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::OutOfOrder { .. } => "out_of_order",
            Self::PositionOutOfRange { .. } | Self::PositionBehindHead { .. } => "bad_position",
            Self::OffsetOutOfRange { .. } => "bad_offset",
        }
    }
}
