//! Decoder for `Transfer-Encoding: chunked` bodies.

/// Longest size line accepted before the body is declared invalid.
const MAX_SIZE_LINE: usize = 4096;

/// Hex digits needed to express any chunk size we accept.
const MAX_SIZE_DIGITS: usize = 16;

/// Result of decoding a chunked body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkedBody {
    /// The terminal chunk and trailer were seen.
    Complete {
        /// Encoded bytes consumed, including the trailer.
        consumed: usize,
        /// Body with chunk framing removed.
        body: Vec<u8>,
    },
    /// The encoding is well formed so far but incomplete.
    Partial,
    /// The encoding is malformed.
    Invalid,
}

/// Decode a chunked body starting at the first size line.
///
/// Chunk extensions after `;` are ignored, as are trailer fields.
///
/// # Examples
///
/// ```
/// use traceframe::protocol::http::chunked::{ChunkedBody, decode};
///
/// assert_eq!(
///     decode(b"9\r\npixielabs\r\n0\r\n\r\n"),
///     ChunkedBody::Complete {
///         consumed: 19,
///         body: b"pixielabs".to_vec(),
///     }
/// );
/// assert_eq!(decode(b"9\r\npixie"), ChunkedBody::Partial);
/// assert_eq!(decode(b"z\r\n"), ChunkedBody::Invalid);
/// ```
#[must_use]
pub fn decode(encoded: &[u8]) -> ChunkedBody {
    let mut body = Vec::new();
    let mut pos = 0;

    loop {
        let size = match size_line(&encoded[pos..]) {
            SizeLine::Complete { size, len } => {
                pos += len;
                size
            }
            SizeLine::Partial => return ChunkedBody::Partial,
            SizeLine::Invalid => return ChunkedBody::Invalid,
        };

        if size == 0 {
            return match trailer_end(&encoded[pos..]) {
                Some(len) => ChunkedBody::Complete {
                    consumed: pos + len,
                    body,
                },
                None => ChunkedBody::Partial,
            };
        }

        let Some(data_end) = pos.checked_add(size) else {
            return ChunkedBody::Invalid;
        };
        let Some(data) = encoded.get(pos..data_end) else {
            return ChunkedBody::Partial;
        };
        let terminator = &encoded[data_end..encoded.len().min(data_end + 2)];
        if !b"\r\n".starts_with(terminator) {
            return ChunkedBody::Invalid;
        }
        if terminator.len() < 2 {
            return ChunkedBody::Partial;
        }
        body.extend_from_slice(data);
        pos = data_end + 2;
    }
}

enum SizeLine {
    Complete { size: usize, len: usize },
    Partial,
    Invalid,
}

fn size_line(bytes: &[u8]) -> SizeLine {
    let Some(line_end) = find_crlf(bytes) else {
        if bytes.len() > MAX_SIZE_LINE || !is_size_prefix(bytes) {
            return SizeLine::Invalid;
        }
        return SizeLine::Partial;
    };

    let line = &bytes[..line_end];
    let digits = line
        .split(|&byte| byte == b';')
        .next()
        .unwrap_or_default()
        .trim_ascii_end();
    if digits.is_empty() || digits.len() > MAX_SIZE_DIGITS {
        return SizeLine::Invalid;
    }
    let Some(size) = std::str::from_utf8(digits)
        .ok()
        .and_then(|text| u64::from_str_radix(text, 16).ok())
        .and_then(|size| usize::try_from(size).ok())
    else {
        return SizeLine::Invalid;
    };
    SizeLine::Complete {
        size,
        len: line_end + 2,
    }
}

/// Whether an unterminated size line could still become valid.
fn is_size_prefix(bytes: &[u8]) -> bool {
    let digits = bytes
        .iter()
        .take_while(|byte| byte.is_ascii_hexdigit())
        .count();
    if digits > MAX_SIZE_DIGITS {
        return false;
    }
    match bytes.get(digits) {
        None => true,
        // Extensions, optional whitespace, or the first half of CRLF.
        Some(b';' | b' ' | b'\t') => digits > 0,
        Some(b'\r') => digits > 0 && bytes.len() == digits + 1,
        Some(_) => false,
    }
}

/// Length of the trailer section including its closing blank line.
fn trailer_end(bytes: &[u8]) -> Option<usize> {
    let mut pos = 0;
    loop {
        let line_end = find_crlf(&bytes[pos..])?;
        pos += line_end + 2;
        if line_end == 0 {
            return Some(pos);
        }
    }
}

pub(super) fn find_crlf(bytes: &[u8]) -> Option<usize> {
    bytes.windows(2).position(|window| window == b"\r\n")
}
