//! Mapping between absolute buffer offsets and chunk-relative positions.

use std::fmt;

use super::{BufferError, ChunkBuffer};

/// A point in a [`ChunkBuffer`] expressed as a retained chunk index and a
/// byte offset inside that chunk.
///
/// Positions order lexicographically, which matches byte order for the
/// canonical positions produced by [`resolve_position`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    chunk_index: usize,
    offset: usize,
}

impl Position {
    /// Construct a position.
    #[must_use]
    pub const fn new(chunk_index: usize, offset: usize) -> Self {
        Self {
            chunk_index,
            offset,
        }
    }

    /// Index of the chunk among those currently retained.
    #[must_use]
    pub const fn chunk_index(&self) -> usize { self.chunk_index }

    /// Byte offset inside the chunk.
    #[must_use]
    pub const fn offset(&self) -> usize { self.offset }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(chunk {}, offset {})", self.chunk_index, self.offset)
    }
}

/// Resolve an absolute offset into a [`Position`].
///
/// Absolute offsets count from the first byte of the first retained chunk.
/// An offset that lands exactly on the end of a chunk resolves to the start
/// of the following chunk, so the end of the buffer resolves to
/// `(chunk_count, 0)`. Empty chunks are never the target of a resolved
/// position.
///
/// # Examples
///
/// ```
/// use traceframe::buffer::{Chunk, ChunkBuffer, Position, resolve_position};
///
/// let mut buffer = ChunkBuffer::new();
/// buffer.append(Chunk::new(0, &b"abc"[..])).unwrap();
/// buffer.append(Chunk::new(1, &b"defg"[..])).unwrap();
///
/// assert_eq!(resolve_position(&buffer, 2).unwrap(), Position::new(0, 2));
/// assert_eq!(resolve_position(&buffer, 3).unwrap(), Position::new(1, 0));
/// assert_eq!(resolve_position(&buffer, 7).unwrap(), Position::new(2, 0));
/// ```
///
/// # Errors
///
/// Returns [`BufferError::OffsetOutOfRange`] when `absolute` exceeds the
/// retained length.
pub fn resolve_position(buffer: &ChunkBuffer, absolute: usize) -> Result<Position, BufferError> {
    let len = buffer.retained_len();
    if absolute > len {
        return Err(BufferError::OffsetOutOfRange {
            offset: absolute,
            len,
        });
    }

    let mut chunk_start = 0;
    for (index, chunk) in buffer.chunks().enumerate() {
        let chunk_end = chunk_start + chunk.len();
        if absolute < chunk_end {
            return Ok(Position::new(index, absolute - chunk_start));
        }
        chunk_start = chunk_end;
    }
    Ok(Position::new(buffer.chunk_count(), 0))
}
