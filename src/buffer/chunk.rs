//! Capture-delivered units stored by the [`ChunkBuffer`](super::ChunkBuffer).

use bytes::Bytes;

/// One span of captured bytes tagged with its per-direction sequence number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    seq: u64,
    data: Bytes,
}

impl Chunk {
    /// Construct a chunk from a sequence number and its captured bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use traceframe::buffer::Chunk;
    ///
    /// let chunk = Chunk::new(7, &b"GET / HTTP/1.1\r\n"[..]);
    /// assert_eq!(chunk.seq(), 7);
    /// assert_eq!(chunk.len(), 16);
    /// ```
    #[must_use]
    pub fn new(seq: u64, data: impl Into<Bytes>) -> Self {
        Self {
            seq,
            data: data.into(),
        }
    }

    /// Sequence number assigned by the capture source.
    #[must_use]
    pub const fn seq(&self) -> u64 { self.seq }

    /// Borrow the captured bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] { &self.data }

    /// Number of captured bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the chunk carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Consume the chunk, returning the owned bytes.
    #[must_use]
    pub fn into_data(self) -> Bytes { self.data }
}

/// Marker declaring that `len` bytes were lost by the capture source.
///
/// A gap occupies one sequence number, exactly like a [`Chunk`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gap {
    seq: u64,
    len: usize,
}

impl Gap {
    /// Construct a gap marker.
    #[must_use]
    pub const fn new(seq: u64, len: usize) -> Self { Self { seq, len } }

    /// Sequence number assigned by the capture source.
    #[must_use]
    pub const fn seq(&self) -> u64 { self.seq }

    /// Number of bytes the capture source reported as lost.
    #[must_use]
    pub const fn len(&self) -> usize { self.len }

    /// Whether the gap declares no lost bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.len == 0 }
}

/// What a retained span of the buffer was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkKind {
    /// Captured bytes.
    Data,
    /// Placeholder bytes standing in for a declared gap.
    Gap {
        /// Length the capture source declared before clamping.
        declared: usize,
    },
}

/// Metadata the buffer keeps for each retained chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkInfo {
    seq: u64,
    len: usize,
    kind: ChunkKind,
}

impl ChunkInfo {
    pub(super) const fn new(seq: u64, len: usize, kind: ChunkKind) -> Self { Self { seq, len, kind } }

    /// Sequence number of the chunk.
    #[must_use]
    pub const fn seq(&self) -> u64 { self.seq }

    /// Number of bytes the chunk occupies in the buffer.
    #[must_use]
    pub const fn len(&self) -> usize { self.len }

    /// Whether the chunk occupies no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.len == 0 }

    /// Whether the chunk holds data or a gap placeholder.
    #[must_use]
    pub const fn kind(&self) -> ChunkKind { self.kind }
}
