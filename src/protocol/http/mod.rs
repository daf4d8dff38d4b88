//! HTTP/1.x message grammar.
//!
//! Start lines and header fields are tokenised with [`httparse`]; body
//! framing follows the usual precedence:
//!
//! 1. `1xx`, `204` and `304` responses carry no body (`101` additionally
//!    ends message framing on the stream);
//! 2. a `Transfer-Encoding` listing `chunked` selects chunked decoding;
//! 3. `Content-Length` gives the exact body length;
//! 4. otherwise a response body runs until the stream closes and a request
//!    has no body.

mod boundary;
pub mod chunked;
mod headers;
mod message;

use boundary::{MethodPrefix, method_prefix};
use chunked::ChunkedBody;
pub use headers::Headers;
pub use message::{Message, StartLine};

use crate::{
    Direction,
    parse::{FrameParser, ParseOutcome},
};

/// Default maximum number of header fields per message.
pub const DEFAULT_MAX_HEADERS: usize = 64;

/// Upper bound accepted by [`HttpParser::max_headers`].
pub const MAX_HEADERS_LIMIT: usize = 1024;

/// [`FrameParser`] for HTTP/1.0 and HTTP/1.1.
///
/// # Examples
///
/// ```
/// use traceframe::{Direction, FrameParser, HttpParser, ParseOutcome};
///
/// let parser = HttpParser::new();
/// let bytes = b"GET /index.html HTTP/1.1\r\nHost: www.pixielabs.ai\r\n\r\n";
/// let ParseOutcome::Complete { consumed, frame: Some(message), .. } =
///     parser.parse_one(Direction::Request, bytes, 0)
/// else {
///     panic!("expected a complete request");
/// };
///
/// assert_eq!(consumed, bytes.len());
/// assert_eq!(message.method(), Some("GET"));
/// assert_eq!(message.headers.get("host"), Some("www.pixielabs.ai"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpParser {
    max_headers: usize,
}

impl Default for HttpParser {
    fn default() -> Self {
        Self {
            max_headers: DEFAULT_MAX_HEADERS,
        }
    }
}

/// How the body following a header block is delimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyFraming {
    Empty,
    /// No body, and no further HTTP messages on this stream.
    Upgrade,
    Chunked,
    Length(usize),
    UntilClose,
}

impl HttpParser {
    /// Create a parser with [`DEFAULT_MAX_HEADERS`].
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set the header-count limit; messages with more fields are invalid.
    ///
    /// The value is clamped to `1..=MAX_HEADERS_LIMIT`.
    #[must_use]
    pub fn max_headers(mut self, count: usize) -> Self {
        self.max_headers = count.clamp(1, MAX_HEADERS_LIMIT);
        self
    }

    /// Current header-count limit.
    #[must_use]
    pub const fn header_limit(&self) -> usize { self.max_headers }

    fn parse_request(&self, bytes: &[u8]) -> ParseOutcome<Message> {
        let first = bytes
            .iter()
            .position(|byte| !matches!(byte, b'\r' | b'\n'))
            .unwrap_or(bytes.len());
        match method_prefix(&bytes[first..]) {
            MethodPrefix::Known(_) => {}
            MethodPrefix::Partial => return ParseOutcome::NeedsMoreData,
            MethodPrefix::Unknown => return ParseOutcome::Invalid,
        }

        let mut fields = vec![httparse::EMPTY_HEADER; self.max_headers];
        let mut request = httparse::Request::new(&mut fields);
        let header_len = match request.parse(bytes) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => return ParseOutcome::NeedsMoreData,
            Err(err) => {
                tracing::trace!(error = %err, "request rejected by tokenizer");
                return ParseOutcome::Invalid;
            }
        };
        let (Some(method), Some(path), Some(minor_version)) =
            (request.method, request.path, request.version)
        else {
            return ParseOutcome::Invalid;
        };

        let message = Message {
            minor_version,
            start_line: StartLine::Request {
                method: method.to_owned(),
                path: path.to_owned(),
            },
            headers: Headers::from(&*request.headers),
            body: Vec::new(),
        };
        let Some(framing) = body_framing(None, &message.headers) else {
            return ParseOutcome::Invalid;
        };
        let framing = match framing {
            BodyFraming::UntilClose => BodyFraming::Empty,
            other => other,
        };
        with_body(message, framing, bytes, header_len)
    }

    fn parse_response(&self, bytes: &[u8]) -> ParseOutcome<Message> {
        let mut fields = vec![httparse::EMPTY_HEADER; self.max_headers];
        let mut response = httparse::Response::new(&mut fields);
        let header_len = match response.parse(bytes) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => return ParseOutcome::NeedsMoreData,
            Err(err) => {
                tracing::trace!(error = %err, "response rejected by tokenizer");
                return ParseOutcome::Invalid;
            }
        };
        let (Some(minor_version), Some(status)) = (response.version, response.code) else {
            return ParseOutcome::Invalid;
        };

        let message = Message {
            minor_version,
            start_line: StartLine::Response {
                status,
                reason: response.reason.unwrap_or_default().to_owned(),
            },
            headers: Headers::from(&*response.headers),
            body: Vec::new(),
        };
        let Some(framing) = body_framing(Some(status), &message.headers) else {
            return ParseOutcome::Invalid;
        };
        with_body(message, framing, bytes, header_len)
    }
}

/// Decide how the body is delimited; `None` when the headers are unusable.
fn body_framing(status: Option<u16>, headers: &Headers) -> Option<BodyFraming> {
    match status {
        Some(101) => return Some(BodyFraming::Upgrade),
        Some(100..=199 | 204 | 304) => return Some(BodyFraming::Empty),
        _ => {}
    }

    let chunked = headers
        .get_all("transfer-encoding")
        .flat_map(|value| value.split(','))
        .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"));
    if chunked {
        return Some(BodyFraming::Chunked);
    }

    if let Some(value) = headers.get("content-length") {
        return value.trim().parse().ok().map(BodyFraming::Length);
    }

    Some(BodyFraming::UntilClose)
}

fn with_body(
    mut message: Message,
    framing: BodyFraming,
    bytes: &[u8],
    header_len: usize,
) -> ParseOutcome<Message> {
    let available = &bytes[header_len..];
    match framing {
        BodyFraming::Empty => ParseOutcome::complete(header_len, message),
        BodyFraming::Upgrade => ParseOutcome::EndOfStream {
            consumed: header_len,
            frame: Some(message),
        },
        BodyFraming::Length(len) => match available.get(..len) {
            Some(body) => {
                message.body = body.to_vec();
                ParseOutcome::complete(header_len + len, message)
            }
            None => ParseOutcome::NeedsMoreData,
        },
        BodyFraming::Chunked => match chunked::decode(available) {
            ChunkedBody::Complete { consumed, body } => {
                message.body = body;
                ParseOutcome::complete(header_len + consumed, message)
            }
            ChunkedBody::Partial => ParseOutcome::NeedsMoreData,
            ChunkedBody::Invalid => ParseOutcome::Invalid,
        },
        BodyFraming::UntilClose => {
            message.body = available.to_vec();
            ParseOutcome::Complete {
                consumed: bytes.len(),
                frame: Some(message),
                open_ended: true,
            }
        }
    }
}

impl FrameParser for HttpParser {
    type Frame = Message;

    fn name(&self) -> &'static str { "http" }

    fn parse_one(&self, direction: Direction, buffer: &[u8], start: usize) -> ParseOutcome<Message> {
        let bytes = &buffer[start..];
        match direction {
            Direction::Request => self.parse_request(bytes),
            Direction::Response => self.parse_response(bytes),
        }
    }

    fn find_boundary(&self, direction: Direction, buffer: &[u8], start: usize) -> Option<usize> {
        boundary::find_boundary(direction, buffer, start)
    }
}

#[cfg(test)]
mod tests;
