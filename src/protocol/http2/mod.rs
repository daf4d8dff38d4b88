//! HTTP/2 frame grammar.
//!
//! Frames are reconstructed one at a time without HPACK decoding or stream
//! state; consumers that need headers decode the HEADERS payloads
//! themselves.

mod frame;

pub use frame::{
    CONNECTION_PREFACE,
    FLAG_ACK,
    FRAME_HEADER_LEN,
    Frame,
    FrameHeader,
    FrameType,
};

use crate::{
    Direction,
    parse::{FrameParser, ParseOutcome},
};

/// Default `SETTINGS_MAX_FRAME_SIZE`.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16_384;

/// Largest frame size the protocol can express.
pub const MAX_FRAME_SIZE_LIMIT: u32 = (1 << 24) - 1;

/// [`FrameParser`] for HTTP/2 frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Http2Parser {
    max_frame_size: u32,
}

impl Default for Http2Parser {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl Http2Parser {
    /// Create a parser accepting frames up to [`DEFAULT_MAX_FRAME_SIZE`].
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set the largest accepted payload length.
    ///
    /// The value is clamped to the range permitted for
    /// `SETTINGS_MAX_FRAME_SIZE`.
    #[must_use]
    pub fn max_frame_size(mut self, size: u32) -> Self {
        self.max_frame_size = size.clamp(DEFAULT_MAX_FRAME_SIZE, MAX_FRAME_SIZE_LIMIT);
        self
    }

    /// Current payload-length limit.
    #[must_use]
    pub const fn frame_size_limit(&self) -> u32 { self.max_frame_size }

    /// Whether a plausible frame starts at `bytes`.
    ///
    /// The header must be of a known type, valid, free of undefined flags
    /// and, apart from SETTINGS, carry a payload. Runs of gap placeholder
    /// bytes otherwise read as empty DATA frames. When the whole frame and
    /// the following header are buffered, that header must pass the same
    /// checks.
    fn is_candidate(&self, bytes: &[u8], header: FrameHeader) -> bool {
        if !self.is_plausible(header) {
            return false;
        }
        let end = FRAME_HEADER_LEN + header.length as usize;
        match bytes.get(end..).and_then(FrameHeader::parse) {
            Some(next) => self.is_plausible(next),
            None => true,
        }
    }

    fn is_plausible(&self, header: FrameHeader) -> bool {
        header.frame_type.is_known()
            && header.is_valid(self.max_frame_size)
            && header.flags & !header.frame_type.defined_flags() == 0
            && (header.length > 0 || header.frame_type == FrameType::Settings)
    }
}

impl FrameParser for Http2Parser {
    type Frame = Frame;

    fn name(&self) -> &'static str { "http2" }

    fn parse_one(&self, direction: Direction, buffer: &[u8], start: usize) -> ParseOutcome<Frame> {
        let bytes = &buffer[start..];
        if direction == Direction::Request {
            if bytes.starts_with(CONNECTION_PREFACE) {
                return ParseOutcome::Complete {
                    consumed: CONNECTION_PREFACE.len(),
                    frame: None,
                    open_ended: false,
                };
            }
            if CONNECTION_PREFACE.starts_with(bytes) {
                return ParseOutcome::NeedsMoreData;
            }
        }

        let Some(header) = FrameHeader::parse(bytes) else {
            return ParseOutcome::NeedsMoreData;
        };
        if !header.is_valid(self.max_frame_size) {
            tracing::trace!(?header, "frame header rejected");
            return ParseOutcome::Invalid;
        }
        let end = FRAME_HEADER_LEN + header.length as usize;
        let Some(payload) = bytes.get(FRAME_HEADER_LEN..end) else {
            return ParseOutcome::NeedsMoreData;
        };
        ParseOutcome::complete(
            end,
            Frame {
                length: header.length,
                frame_type: header.frame_type,
                flags: header.flags,
                stream_id: header.stream_id,
                payload: payload.to_vec(),
            },
        )
    }

    fn find_boundary(&self, direction: Direction, buffer: &[u8], start: usize) -> Option<usize> {
        for pos in start..buffer.len() {
            let bytes = &buffer[pos..];
            if direction == Direction::Request {
                if bytes.starts_with(CONNECTION_PREFACE) {
                    return Some(pos);
                }
                if bytes.len() < CONNECTION_PREFACE.len() && CONNECTION_PREFACE.starts_with(bytes) {
                    return None;
                }
            }
            let header = FrameHeader::parse(bytes)?;
            if self.is_candidate(bytes, header) {
                return Some(pos);
            }
        }
        None
    }
}
