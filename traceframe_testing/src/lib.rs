//! Utilities shared by the `traceframe` test suites.
//!
//! The helpers cut captured byte streams into chunks, feed them to a
//! [`DataStream`](traceframe::DataStream) and capture log output for
//! assertions.
//!
//! ```rust
//! use traceframe::{DataStream, Direction, HttpParser};
//! use traceframe_testing::{GET_REQUEST, feed};
//!
//! let mut stream = DataStream::new(HttpParser::new());
//! feed(&mut stream, GET_REQUEST, &[5, 17]);
//! let result = stream.parse_frames(Direction::Request, false).unwrap();
//! assert_eq!(result.frames().len(), 1);
//! ```

pub mod helpers;
pub mod logging;

pub use helpers::{
    GET_REQUEST,
    POST_REQUEST,
    RESPONSE_CHUNKED,
    RESPONSE_FOO,
    chunks_at,
    deterministic_runner,
    encode_chunked,
    feed,
    split_at_points,
};
pub use logging::{LoggerHandle, logger};
