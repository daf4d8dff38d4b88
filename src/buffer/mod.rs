//! Ordered storage for captured chunks with a contiguous view.
//!
//! [`ChunkBuffer`] accepts chunks one at a time in capture order and keeps
//! their bytes in a single [`BytesMut`], so parsers see one contiguous slice
//! without copying on every call. Alongside the bytes it records each chunk's
//! sequence number and length, which lets any absolute offset be mapped back
//! to the chunk it came from (see [`resolve_position`]).
//!
//! Trimming is chunk-granular at the storage layer: chunks wholly before the
//! trim position are released, while a chunk straddling it is retained in
//! full and the intra-chunk offset becomes the new *head*. Parsing resumes
//! from the head on the next call.

mod chunk;
mod error;
mod position;

use std::collections::VecDeque;

use bytes::{Buf, BytesMut};

pub use chunk::{Chunk, ChunkInfo, ChunkKind, Gap};
pub use error::BufferError;
pub use position::{Position, resolve_position};

/// Default upper bound on the placeholder bytes inserted for one gap (1 MiB).
pub const DEFAULT_MAX_GAP_FILL: usize = 1024 * 1024;

/// Byte used to fill gap placeholders.
///
/// None of the supported grammars accept a NUL byte at a message start, so
/// a placeholder always forces the parser into resynchronisation.
pub const GAP_FILL_BYTE: u8 = 0;

/// Append-only chunk store with front trimming.
#[derive(Debug)]
pub struct ChunkBuffer {
    chunks: VecDeque<ChunkInfo>,
    data: BytesMut,
    head: usize,
    next_seq: Option<u64>,
    trimmed: u64,
    max_gap_fill: usize,
}

impl Default for ChunkBuffer {
    fn default() -> Self { Self::with_max_gap_fill(DEFAULT_MAX_GAP_FILL) }
}

impl ChunkBuffer {
    /// Create an empty buffer using [`DEFAULT_MAX_GAP_FILL`].
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty buffer that clamps gap placeholders to `max_gap_fill`
    /// bytes.
    #[must_use]
    pub fn with_max_gap_fill(max_gap_fill: usize) -> Self {
        Self {
            chunks: VecDeque::new(),
            data: BytesMut::new(),
            head: 0,
            next_seq: None,
            trimmed: 0,
            max_gap_fill,
        }
    }

    /// Append a chunk at the tail.
    ///
    /// The first chunk of a fresh buffer may carry any sequence number; every
    /// later chunk or gap must carry the next one.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfOrder`] when the sequence number is not
    /// the expected next value. The buffer is left unchanged.
    pub fn append(&mut self, chunk: Chunk) -> Result<(), BufferError> {
        self.check_sequence(chunk.seq())?;
        self.data.extend_from_slice(chunk.data());
        self.chunks
            .push_back(ChunkInfo::new(chunk.seq(), chunk.len(), ChunkKind::Data));
        self.next_seq = Some(chunk.seq().wrapping_add(1));
        Ok(())
    }

    /// Append a placeholder for bytes the capture source lost.
    ///
    /// The placeholder holds `gap.len()` copies of [`GAP_FILL_BYTE`], clamped
    /// to the configured maximum. When the declared length is preserved,
    /// length-delimited messages spanning the gap keep correct boundaries;
    /// otherwise the reconstruction loop resynchronises past the span.
    ///
    /// Returns the number of placeholder bytes inserted.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfOrder`] when the sequence number is not
    /// the expected next value.
    pub fn append_gap(&mut self, gap: Gap) -> Result<usize, BufferError> {
        self.check_sequence(gap.seq())?;
        let fill = gap.len().min(self.max_gap_fill);
        self.data.resize(self.data.len() + fill, GAP_FILL_BYTE);
        self.chunks.push_back(ChunkInfo::new(
            gap.seq(),
            fill,
            ChunkKind::Gap {
                declared: gap.len(),
            },
        ));
        self.next_seq = Some(gap.seq().wrapping_add(1));
        Ok(fill)
    }

    fn check_sequence(&self, found: u64) -> Result<(), BufferError> {
        match self.next_seq {
            Some(expected) if expected != found => Err(BufferError::OutOfOrder { expected, found }),
            _ => Ok(()),
        }
    }

    /// Contiguous view of the unconsumed bytes, from the head to the tail.
    #[must_use]
    pub fn view(&self) -> &[u8] { &self.data[self.head..] }

    /// Every retained byte, including the consumed prefix of the head chunk.
    ///
    /// Offsets into this slice are the absolute offsets accepted by
    /// [`resolve_position`].
    #[must_use]
    pub fn contiguous(&self) -> &[u8] { &self.data }

    /// Absolute offset of the first unconsumed byte.
    #[must_use]
    pub const fn head(&self) -> usize { self.head }

    /// Number of unconsumed bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() - self.head }

    /// Whether no unconsumed bytes remain.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Number of retained bytes, including the consumed head prefix.
    #[must_use]
    pub fn retained_len(&self) -> usize { self.data.len() }

    /// Number of retained chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize { self.chunks.len() }

    /// Metadata of the retained chunk at `index`.
    #[must_use]
    pub fn chunk(&self, index: usize) -> Option<&ChunkInfo> { self.chunks.get(index) }

    /// Sequence number of the retained chunk at `index`.
    #[must_use]
    pub fn chunk_seq(&self, index: usize) -> Option<u64> { self.chunk(index).map(ChunkInfo::seq) }

    /// Iterate over the retained chunks, oldest first.
    pub fn chunks(&self) -> impl Iterator<Item = &ChunkInfo> { self.chunks.iter() }

    /// Sequence number the next chunk or gap must carry, if known.
    #[must_use]
    pub const fn next_seq(&self) -> Option<u64> { self.next_seq }

    /// Offset of the head measured from the very first byte ever appended.
    ///
    /// Unlike absolute offsets this value is stable across trims.
    #[must_use]
    pub fn stream_offset(&self) -> u64 { self.trimmed + self.head as u64 }

    /// Convert a position back into an absolute offset.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::PositionOutOfRange`] when the position does not
    /// address a retained byte or the end of the buffer.
    pub fn offset_of(&self, position: Position) -> Result<usize, BufferError> {
        let out_of_range = BufferError::PositionOutOfRange {
            position,
            chunks: self.chunks.len(),
        };
        let index = position.chunk_index();
        if index == self.chunks.len() {
            return if position.offset() == 0 {
                Ok(self.data.len())
            } else {
                Err(out_of_range)
            };
        }
        let chunk = self.chunks.get(index).ok_or(out_of_range)?;
        if position.offset() > chunk.len() {
            return Err(out_of_range);
        }
        let start: usize = self.chunks.iter().take(index).map(ChunkInfo::len).sum();
        Ok(start + position.offset())
    }

    /// Discard every chunk that lies entirely before `position`.
    ///
    /// The chunk containing `position` is retained in full; the position's
    /// intra-chunk offset becomes the new head. Cost is proportional to the
    /// number of chunks removed.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::PositionOutOfRange`] for positions past the
    /// tail and [`BufferError::PositionBehindHead`] for positions before the
    /// current head.
    pub fn trim(&mut self, position: Position) -> Result<(), BufferError> {
        let absolute = self.offset_of(position)?;
        if absolute < self.head {
            return Err(BufferError::PositionBehindHead {
                position,
                head: self.head,
            });
        }

        let released = position.chunk_index().min(self.chunks.len());
        let dropped: usize = self.chunks.drain(..released).map(|chunk| chunk.len()).sum();
        self.data.advance(dropped);
        self.trimmed += dropped as u64;
        self.head = absolute - dropped;

        tracing::debug!(
            released_chunks = released,
            released_bytes = dropped,
            head = self.head,
            "trimmed chunk buffer"
        );
        Ok(())
    }

    /// Drop every chunk and forget the sequence expectation.
    pub fn reset(&mut self) {
        self.trimmed += self.data.len() as u64;
        self.chunks.clear();
        self.data.clear();
        self.head = 0;
        self.next_seq = None;
    }
}
