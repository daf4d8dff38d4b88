//! Capability contract implemented once per traced protocol.

use super::ParseOutcome;
use crate::Direction;

/// Grammar for one traced protocol.
///
/// Implementors define their own `Frame` type and two operations over a
/// borrowed buffer: parsing exactly one message at an offset, and locating
/// the next plausible message start after the buffer was found to be
/// invalid. Both must be pure functions of their inputs and must never
/// read past the end of `buffer`.
///
/// The reconstruction loop and [`DataStream`](crate::stream::DataStream)
/// are written once against this trait.
pub trait FrameParser {
    /// Message type produced by this grammar.
    type Frame;

    /// Protocol name used for logs and metric labels.
    fn name(&self) -> &'static str;

    /// Parse exactly one message beginning at `start`.
    ///
    /// Implementations return [`ParseOutcome::NeedsMoreData`] only when the
    /// bytes are a valid prefix of a message and [`ParseOutcome::Invalid`]
    /// as soon as they provably are not. `start` is always strictly less
    /// than `buffer.len()`.
    fn parse_one(
        &self,
        direction: Direction,
        buffer: &[u8],
        start: usize,
    ) -> ParseOutcome<Self::Frame>;

    /// Find the lowest offset at or after `start` where a message of
    /// `direction` could begin.
    ///
    /// This is a byte-pattern heuristic: a payload that happens to contain a
    /// valid-looking signature can produce a false positive. It must never
    /// report a signature that is structurally impossible, and returns
    /// `None` when no candidate exists yet (more data may reveal one).
    fn find_boundary(&self, direction: Direction, buffer: &[u8], start: usize) -> Option<usize>;
}

impl<P: FrameParser + ?Sized> FrameParser for &P {
    type Frame = P::Frame;

    fn name(&self) -> &'static str { (**self).name() }

    fn parse_one(
        &self,
        direction: Direction,
        buffer: &[u8],
        start: usize,
    ) -> ParseOutcome<Self::Frame> {
        (**self).parse_one(direction, buffer, start)
    }

    fn find_boundary(&self, direction: Direction, buffer: &[u8], start: usize) -> Option<usize> {
        (**self).find_boundary(direction, buffer, start)
    }
}
