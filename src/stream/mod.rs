//! Per-direction stream state tying a chunk buffer to a grammar.
//!
//! A [`DataStream`] accepts captured chunks, runs the reconstruction loop
//! over everything not yet consumed and reports where the caller should
//! trim. Between passes it tracks whether parsing has stalled on the same
//! message and, when resynchronisation is allowed, forces a skip past a
//! message that can never complete (for example one whose `Content-Length`
//! overstates the bytes that will ever arrive).

mod config;
mod error;

pub use config::{
    DEFAULT_MAX_RETAINED_BYTES,
    DEFAULT_MAX_STUCK_COUNT,
    MIN_RETAINED_BYTES,
    StreamConfig,
};
pub use error::{RecoveryPolicy, StreamError};

use crate::{
    Direction,
    buffer::{Chunk, ChunkBuffer, Gap, Position, resolve_position},
    metrics,
    parse::{FrameParser, FrameSet, ParseOptions, ParseState, parse_frames_with},
};

/// Result of [`DataStream::parse_frames`].
///
/// Byte ranges in [`FrameSet::ranges`] and [`FrameSet::end_offset`] are
/// absolute offsets into [`ChunkBuffer::contiguous`] and are invalidated by
/// the next trim; [`StreamFrames::end_position`] is the value to pass to
/// [`DataStream::trim`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamFrames<F> {
    /// Messages and terminal state of the pass.
    pub set: FrameSet<F>,
    /// Terminal offset resolved to a chunk position.
    pub end_position: Position,
}

impl<F> StreamFrames<F> {
    /// Messages in stream order.
    #[must_use]
    pub fn frames(&self) -> &[F] { &self.set.frames }

    /// Consume the result, returning the messages.
    #[must_use]
    pub fn into_frames(self) -> Vec<F> { self.set.frames }

    /// Why the pass stopped.
    #[must_use]
    pub const fn state(&self) -> ParseState { self.set.state }
}

/// Stalled passes observed at one stream offset.
///
/// A pass counts only when the buffer tail moved since the last counted
/// pass, so re-parsing an unchanged buffer never advances the count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct StallTracker {
    offset: Option<u64>,
    tail: u64,
    count: u32,
}

impl StallTracker {
    fn record(&mut self, offset: u64, tail: u64) {
        if self.offset == Some(offset) {
            if tail > self.tail {
                self.tail = tail;
                self.count = self.count.saturating_add(1);
            }
        } else {
            *self = Self {
                offset: Some(offset),
                tail,
                count: 1,
            };
        }
    }

    fn grew(&self, tail: u64) -> bool { self.offset.is_some() && tail > self.tail }
}

/// One direction of one traced connection.
///
/// # Examples
///
/// ```
/// use traceframe::{Chunk, DataStream, Direction, HttpParser, ParseState};
///
/// let mut stream = DataStream::new(HttpParser::new());
/// stream.append(Chunk::new(0, &b"GET /index.html HTTP/1.1\r\nHost: a"[..]))?;
/// stream.append(Chunk::new(1, &b"\r\n\r\nGET / HT"[..]))?;
///
/// let result = stream.parse_frames(Direction::Request, false)?;
/// assert_eq!(result.frames().len(), 1);
/// assert_eq!(result.state(), ParseState::NeedsMoreData);
///
/// stream.trim(result.end_position)?;
/// assert_eq!(stream.view(), b"GET / HT");
/// # Ok::<(), traceframe::StreamError>(())
/// ```
#[derive(Debug)]
pub struct DataStream<P> {
    buffer: ChunkBuffer,
    parser: P,
    config: StreamConfig,
    closed: bool,
    ended: bool,
    stall: StallTracker,
}

impl<P: FrameParser> DataStream<P> {
    /// Create a stream with [`StreamConfig::default`].
    #[must_use]
    pub fn new(parser: P) -> Self { Self::with_config(parser, StreamConfig::default()) }

    /// Create a stream with explicit limits.
    #[must_use]
    pub fn with_config(parser: P, config: StreamConfig) -> Self {
        let gap_fill = config.max_gap_fill.min(config.max_retained_bytes);
        Self {
            buffer: ChunkBuffer::with_max_gap_fill(gap_fill),
            parser,
            config,
            closed: false,
            ended: false,
            stall: StallTracker::default(),
        }
    }

    /// Append a captured chunk.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::RetainedLimitExceeded`] when the chunk would
    /// push the retained bytes past the configured cap, and
    /// [`StreamError::Buffer`] when the sequence number is out of order. The
    /// stream is unchanged in both cases.
    pub fn append(&mut self, chunk: Chunk) -> Result<(), StreamError> {
        self.check_limit(chunk.len())?;
        self.buffer
            .append(chunk)
            .map_err(|err| self.reject(err.into()))
    }

    /// Append a placeholder for bytes lost by the capture source.
    ///
    /// # Errors
    ///
    /// As for [`DataStream::append`], counting the clamped placeholder size
    /// against the cap.
    pub fn append_gap(&mut self, gap: Gap) -> Result<(), StreamError> {
        let fill_cap = self.config.max_gap_fill.min(self.config.max_retained_bytes);
        self.check_limit(gap.len().min(fill_cap))?;
        let filled = self
            .buffer
            .append_gap(gap)
            .map_err(|err| self.reject(err.into()))?;
        tracing::debug!(
            protocol = self.parser.name(),
            seq = gap.seq(),
            declared = gap.len(),
            filled,
            "gap placeholder appended"
        );
        Ok(())
    }

    fn check_limit(&self, attempted: usize) -> Result<(), StreamError> {
        let retained = self.buffer.retained_len();
        let limit = self.config.max_retained_bytes;
        if retained.saturating_add(attempted) > limit {
            return Err(self.reject(StreamError::RetainedLimitExceeded {
                retained,
                attempted,
                limit,
            }));
        }
        Ok(())
    }

    fn reject(&self, err: StreamError) -> StreamError {
        log::warn!(
            "stream error: protocol={}, error_type={}, policy={}, error={err}",
            self.parser.name(),
            err.error_type(),
            err.default_recovery_policy().as_str()
        );
        metrics::inc_stream_errors(err.error_type());
        err
    }

    /// Reconstruct messages from the unconsumed bytes.
    ///
    /// Messages are not removed from the buffer; pass
    /// [`StreamFrames::end_position`] to [`DataStream::trim`] once they have
    /// been handled. Re-parsing without trimming yields the same messages.
    ///
    /// After a pass that reported [`ParseState::EndOfStream`] no further
    /// parsing takes place until [`DataStream::reset`].
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Buffer`] if the terminal offset cannot be
    /// resolved to a chunk position.
    pub fn parse_frames(
        &mut self,
        direction: Direction,
        resync: bool,
    ) -> Result<StreamFrames<P::Frame>, StreamError> {
        let head = self.buffer.head();
        if self.ended {
            return self.finish(FrameSet::terminal(ParseState::EndOfStream, head));
        }

        let tail = self.buffer.stream_offset() + self.buffer.len() as u64;
        let mut set = self.run(direction, resync, false);
        let mut stalled_at = self.stalled_offset(&set);

        let overdue = self.stall.count > self.config.max_stuck_count && self.stall.grew(tail);
        if resync && overdue && stalled_at == self.stall.offset {
            log::warn!(
                "stream stalled: protocol={}, direction={direction}, stream_offset={}, passes={}",
                self.parser.name(),
                self.buffer.stream_offset(),
                self.stall.count
            );
            self.stall = StallTracker::default();
            set = self.run(direction, resync, true);
            stalled_at = self.stalled_offset(&set);
        }

        match stalled_at {
            Some(offset) => {
                self.stall.record(offset, tail);
                tracing::debug!(
                    protocol = self.parser.name(),
                    %direction,
                    stream_offset = offset,
                    passes = self.stall.count,
                    "no progress"
                );
            }
            None => self.stall = StallTracker::default(),
        }
        if set.state == ParseState::EndOfStream {
            self.ended = true;
        }
        tracing::trace!(
            protocol = self.parser.name(),
            %direction,
            frames = set.len(),
            state = set.state.as_str(),
            discarded = set.discarded_bytes,
            "parse pass finished"
        );
        self.finish(set)
    }

    fn run(&self, direction: Direction, resync: bool, force_resync: bool) -> FrameSet<P::Frame> {
        let options = ParseOptions::new(resync)
            .force_resync(force_resync)
            .stream_closed(self.closed);
        parse_frames_with(
            &self.parser,
            direction,
            self.buffer.contiguous(),
            self.buffer.head(),
            options,
        )
    }

    /// Stream offset of a message that produced nothing this pass.
    fn stalled_offset(&self, set: &FrameSet<P::Frame>) -> Option<u64> {
        (set.state == ParseState::NeedsMoreData && set.is_empty()).then(|| {
            self.buffer.stream_offset() + (set.end_offset - self.buffer.head()) as u64
        })
    }

    fn finish(&self, set: FrameSet<P::Frame>) -> Result<StreamFrames<P::Frame>, StreamError> {
        let end_position = resolve_position(&self.buffer, set.end_offset)?;
        Ok(StreamFrames { set, end_position })
    }

    /// Release every chunk lying entirely before `position`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Buffer`] when the position lies behind the
    /// head or past the tail.
    pub fn trim(&mut self, position: Position) -> Result<(), StreamError> {
        self.buffer
            .trim(position)
            .map_err(|err| self.reject(err.into()))
    }

    /// Mark the end of the captured stream so open-ended messages are
    /// reported as final.
    pub fn close(&mut self) { self.closed = true; }

    /// Drop all buffered bytes and per-stream state.
    pub fn reset(&mut self) {
        tracing::debug!(
            protocol = self.parser.name(),
            dropped = self.buffer.len(),
            "stream reset"
        );
        self.buffer.reset();
        self.closed = false;
        self.ended = false;
        self.stall = StallTracker::default();
    }

    /// Contiguous view of the unconsumed bytes.
    #[must_use]
    pub fn view(&self) -> &[u8] { self.buffer.view() }

    /// Number of unconsumed bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.buffer.len() }

    /// Whether no unconsumed bytes remain.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    /// Whether [`DataStream::close`] was called.
    #[must_use]
    pub const fn is_closed(&self) -> bool { self.closed }

    /// Whether a message ended message framing on this stream.
    #[must_use]
    pub const fn is_ended(&self) -> bool { self.ended }

    /// Borrow the underlying chunk buffer.
    #[must_use]
    pub const fn buffer(&self) -> &ChunkBuffer { &self.buffer }

    /// Borrow the grammar.
    #[must_use]
    pub const fn parser(&self) -> &P { &self.parser }

    /// Borrow the configured limits.
    #[must_use]
    pub const fn config(&self) -> &StreamConfig { &self.config }
}
