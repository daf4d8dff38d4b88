#![doc(html_root_url = "https://docs.rs/traceframe/latest")]
//! Public API for the `traceframe` library.
//!
//! This crate reconstructs application-level messages from byte streams
//! captured off the wire. Captured chunks are appended to a per-direction
//! [`ChunkBuffer`]; a [`FrameParser`] for the protocol in use extracts
//! complete messages from the contiguous view; the caller trims consumed
//! bytes using the returned [`Position`]. When bytes were lost or a message
//! is malformed, the reconstruction loop can resynchronise on the next
//! plausible message start instead of giving up on the stream.
//!
//! Grammars are provided for HTTP/1.x ([`HttpParser`]), HTTP/2 framing
//! ([`Http2Parser`]) and the MySQL client/server protocol
//! ([`MysqlParser`]).
//!
//! ```
//! use traceframe::{Chunk, DataStream, Direction, HttpParser, ParseState};
//!
//! let mut stream = DataStream::new(HttpParser::new());
//! stream.append(Chunk::new(0, &b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\n\r\npixie"[..]))?;
//! stream.append(Chunk::new(1, &b"labs"[..]))?;
//!
//! let result = stream.parse_frames(Direction::Response, true)?;
//! assert_eq!(result.state(), ParseState::Success);
//! assert_eq!(result.frames()[0].body, b"pixielabs");
//! stream.trim(result.end_position)?;
//! assert!(stream.is_empty());
//! # Ok::<(), traceframe::StreamError>(())
//! ```

pub mod buffer;
pub mod byte_order;
mod direction;
pub mod metrics;
pub mod parse;
pub mod protocol;
pub mod stream;

pub use buffer::{BufferError, Chunk, ChunkBuffer, Gap, Position, resolve_position};
pub use direction::Direction;
pub use parse::{
    FrameParser,
    FrameSet,
    ParseOptions,
    ParseOutcome,
    ParseState,
    parse_frames,
    parse_frames_with,
};
pub use protocol::{Http2Parser, HttpParser, MysqlParser};
pub use stream::{DataStream, StreamConfig, StreamError, StreamFrames};
