//! Frame reconstruction over a contiguous byte view.
//!
//! [`parse_frames`] repeatedly asks a [`FrameParser`] for one message at a
//! time, collecting complete messages until the bytes run out, the grammar
//! needs more data, or the bytes stop making sense. With resynchronisation
//! enabled an invalid region is skipped by asking the grammar's boundary
//! scanner for the next plausible message start.
//!
//! Every iteration either advances the offset or terminates, so one call
//! performs at most `buffer.len() - start` iterations.

mod outcome;
mod parser;

use std::ops::Range;

pub use outcome::{ParseOutcome, ParseState};
pub use parser::FrameParser;

use crate::{Direction, metrics};

/// Switches controlling one reconstruction pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Skip invalid regions by scanning for the next message boundary.
    pub resync: bool,
    /// Treat the message at `start` as unrecoverable and resynchronise past
    /// it before parsing.
    pub force_resync: bool,
    /// No further bytes will arrive, so open-ended messages are final.
    pub stream_closed: bool,
}

impl ParseOptions {
    /// Options for an ordinary pass with the given resync setting.
    #[must_use]
    pub const fn new(resync: bool) -> Self {
        Self {
            resync,
            force_resync: false,
            stream_closed: false,
        }
    }

    /// Force a resynchronisation before parsing.
    #[must_use]
    pub const fn force_resync(mut self, force: bool) -> Self {
        self.force_resync = force;
        self
    }

    /// Mark the stream as closed.
    #[must_use]
    pub const fn stream_closed(mut self, closed: bool) -> Self {
        self.stream_closed = closed;
        self
    }
}

/// Result of one reconstruction pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSet<F> {
    /// Messages in stream order.
    pub frames: Vec<F>,
    /// `[start, end)` byte range of each emitted message.
    pub ranges: Vec<Range<usize>>,
    /// Why the pass stopped.
    pub state: ParseState,
    /// Offset where the next pass should start.
    pub end_offset: usize,
    /// Bytes skipped by resynchronisation.
    pub discarded_bytes: usize,
    /// The final message is open-ended and will be emitted again, with any
    /// newly appended bytes, by the next pass.
    pub open_ended: bool,
}

impl<F> FrameSet<F> {
    fn new(start: usize) -> Self {
        Self {
            frames: Vec::new(),
            ranges: Vec::new(),
            state: ParseState::Success,
            end_offset: start,
            discarded_bytes: 0,
            open_ended: false,
        }
    }

    /// A set with no frames that stopped at `end_offset`.
    pub(crate) fn terminal(state: ParseState, end_offset: usize) -> Self {
        Self::new(end_offset).finish(state, end_offset)
    }

    fn push(&mut self, frame: Option<F>, range: Range<usize>) {
        if let Some(frame) = frame {
            self.frames.push(frame);
            self.ranges.push(range);
        }
    }

    fn finish(mut self, state: ParseState, end_offset: usize) -> Self {
        self.state = state;
        self.end_offset = end_offset;
        self
    }

    /// Number of emitted messages.
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Whether no message was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }
}

/// Reconstruct messages from `buffer[start..]`.
///
/// Shorthand for [`parse_frames_with`] using [`ParseOptions::new`].
///
/// # Examples
///
/// ```
/// use traceframe::{Direction, HttpParser, ParseState, parse_frames};
///
/// let bytes = b"HTTP/1.1 204 No Content\r\n\r\nHTTP/1.1 2";
/// let set = parse_frames(&HttpParser::new(), Direction::Response, bytes, 0, false);
///
/// assert_eq!(set.frames.len(), 1);
/// assert_eq!(set.state, ParseState::NeedsMoreData);
/// assert_eq!(set.end_offset, 27);
/// ```
pub fn parse_frames<P: FrameParser>(
    parser: &P,
    direction: Direction,
    buffer: &[u8],
    start: usize,
    resync: bool,
) -> FrameSet<P::Frame> {
    parse_frames_with(parser, direction, buffer, start, ParseOptions::new(resync))
}

/// Reconstruct messages from `buffer[start..]` with explicit options.
///
/// The returned [`FrameSet::end_offset`] is:
/// - the end of the buffer after [`ParseState::Success`];
/// - the start of the incomplete message after
///   [`ParseState::NeedsMoreData`];
/// - the offending offset after [`ParseState::Invalid`];
/// - the end of the final message after [`ParseState::EndOfStream`].
///
/// An open-ended message moves the offset back to its own start unless
/// [`ParseOptions::stream_closed`] is set.
pub fn parse_frames_with<P: FrameParser>(
    parser: &P,
    direction: Direction,
    buffer: &[u8],
    start: usize,
    options: ParseOptions,
) -> FrameSet<P::Frame> {
    let len = buffer.len();
    let mut offset = start.min(len);
    let mut set = FrameSet::new(offset);
    let protocol = parser.name();

    if options.force_resync && offset < len {
        match next_boundary(parser, direction, buffer, offset) {
            Some(candidate) => {
                log::warn!(
                    "forced resync: protocol={protocol}, direction={direction}, offset={offset}, \
                     discarded={}",
                    candidate - offset
                );
                discard(&mut set, protocol, offset, candidate);
                offset = candidate;
            }
            None => return set.finish(ParseState::NeedsMoreData, offset),
        }
    }

    while offset < len {
        let outcome = parser.parse_one(direction, buffer, offset);
        tracing::trace!(
            protocol,
            %direction,
            offset,
            outcome = outcome_kind(&outcome),
            "parse attempt"
        );
        match outcome {
            ParseOutcome::Complete {
                consumed,
                frame,
                open_ended,
            } if consumed > 0 => {
                let end = offset.saturating_add(consumed).min(len);
                set.push(frame, offset..end);
                if open_ended {
                    set.open_ended = true;
                    if !options.stream_closed {
                        record_frames(&set, protocol, direction);
                        return set.finish(ParseState::Success, offset);
                    }
                }
                offset = end;
            }
            ParseOutcome::NeedsMoreData => {
                record_frames(&set, protocol, direction);
                return set.finish(ParseState::NeedsMoreData, offset);
            }
            ParseOutcome::EndOfStream { consumed, frame } => {
                let end = offset.saturating_add(consumed).min(len);
                set.push(frame, offset..end);
                record_frames(&set, protocol, direction);
                return set.finish(ParseState::EndOfStream, end);
            }
            ParseOutcome::Complete { .. } | ParseOutcome::Invalid => {
                metrics::inc_invalid(protocol);
                if !options.resync {
                    record_frames(&set, protocol, direction);
                    return set.finish(ParseState::Invalid, offset);
                }
                let Some(candidate) = next_boundary(parser, direction, buffer, offset) else {
                    tracing::debug!(protocol, %direction, offset, "no boundary found");
                    record_frames(&set, protocol, direction);
                    return set.finish(ParseState::NeedsMoreData, offset);
                };
                discard(&mut set, protocol, offset, candidate);
                offset = candidate;
            }
        }
    }

    record_frames(&set, protocol, direction);
    set.finish(ParseState::Success, offset)
}

/// Ask the scanner for a boundary strictly past `offset` and within bounds.
fn next_boundary<P: FrameParser>(
    parser: &P,
    direction: Direction,
    buffer: &[u8],
    offset: usize,
) -> Option<usize> {
    parser
        .find_boundary(direction, buffer, offset + 1)
        .filter(|&candidate| candidate > offset && candidate <= buffer.len())
}

fn discard<F>(set: &mut FrameSet<F>, protocol: &'static str, from: usize, to: usize) {
    let discarded = to - from;
    set.discarded_bytes += discarded;
    tracing::debug!(protocol, offset = from, discarded, "resynchronised to next boundary");
    metrics::inc_resync(protocol, discarded);
}

fn record_frames<F>(set: &FrameSet<F>, protocol: &'static str, direction: Direction) {
    if !set.frames.is_empty() {
        metrics::inc_frames(protocol, direction, set.frames.len());
    }
}

fn outcome_kind<F>(outcome: &ParseOutcome<F>) -> &'static str {
    match outcome {
        ParseOutcome::Complete { .. } => "complete",
        ParseOutcome::NeedsMoreData => "needs_more_data",
        ParseOutcome::Invalid => "invalid",
        ParseOutcome::EndOfStream { .. } => "end_of_stream",
    }
}
