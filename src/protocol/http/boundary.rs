//! Start-line signatures used to resynchronise an HTTP/1.x stream.
//!
//! The scan is a byte-pattern heuristic. A body that happens to contain a
//! well-formed request or status line will be taken for a message start.
//! Candidates are checked against the full start-line shape, never by
//! re-running the parser from every offset.

use crate::Direction;

/// Request methods recognised at a message start.
pub(super) const METHODS: [&[u8]; 9] = [
    b"GET", b"HEAD", b"POST", b"PUT", b"DELETE", b"CONNECT", b"OPTIONS", b"TRACE", b"PATCH",
];

/// Longest request line considered when matching a request signature.
const MAX_REQUEST_LINE: usize = 8 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Candidate {
    Match,
    NoMatch,
    /// Consistent with the signature so far but cut off by the buffer end.
    Incomplete,
}

/// Lowest offset at or after `start` where a start line of `direction`
/// begins, or `None` when none is present yet.
pub(super) fn find_boundary(direction: Direction, buffer: &[u8], start: usize) -> Option<usize> {
    let check = match direction {
        Direction::Request => request_candidate,
        Direction::Response => response_candidate,
    };
    for pos in start..buffer.len() {
        match check(&buffer[pos..]) {
            Candidate::Match => return Some(pos),
            Candidate::Incomplete => return None,
            Candidate::NoMatch => {}
        }
    }
    None
}

/// `METHOD SP target SP HTTP/1.d CRLF`
fn request_candidate(bytes: &[u8]) -> Candidate {
    let rest = match method_prefix(bytes) {
        MethodPrefix::Known(len) => &bytes[len + 1..],
        MethodPrefix::Partial => return Candidate::Incomplete,
        MethodPrefix::Unknown => return Candidate::NoMatch,
    };

    let limit = rest.len().min(MAX_REQUEST_LINE);
    let mut target_len = 0;
    loop {
        if target_len == limit {
            return if limit == MAX_REQUEST_LINE {
                Candidate::NoMatch
            } else {
                Candidate::Incomplete
            };
        }
        match rest[target_len] {
            b' ' => break,
            byte if byte <= b' ' || byte == 0x7f => return Candidate::NoMatch,
            _ => target_len += 1,
        }
    }
    if target_len == 0 {
        return Candidate::NoMatch;
    }
    match_template(&rest[target_len + 1..], b"HTTP/1.#\r\n")
}

/// `HTTP/1.d SP ddd (SP | CR)`
fn response_candidate(bytes: &[u8]) -> Candidate {
    const STATUS_LINE: &[u8] = b"HTTP/1.# ###";

    match (match_template(bytes, STATUS_LINE), bytes.get(STATUS_LINE.len())) {
        (Candidate::Match, Some(b' ' | b'\r')) => Candidate::Match,
        (Candidate::Match, Some(_)) => Candidate::NoMatch,
        (Candidate::Match, None) => Candidate::Incomplete,
        (other, _) => other,
    }
}

/// Compare `bytes` against `template`, where `#` stands for an ASCII digit.
fn match_template(bytes: &[u8], template: &[u8]) -> Candidate {
    for (index, &expected) in template.iter().enumerate() {
        let Some(&byte) = bytes.get(index) else {
            return Candidate::Incomplete;
        };
        let ok = if expected == b'#' {
            byte.is_ascii_digit()
        } else {
            byte == expected
        };
        if !ok {
            return Candidate::NoMatch;
        }
    }
    Candidate::Match
}

/// How the bytes at a message start relate to the known methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum MethodPrefix {
    /// A known method of this length followed by a space.
    Known(usize),
    /// The bytes are a strict prefix of `METHOD SP`.
    Partial,
    /// No known method can start here.
    Unknown,
}

pub(super) fn method_prefix(bytes: &[u8]) -> MethodPrefix {
    let mut partial = false;
    for method in METHODS {
        if bytes.len() > method.len() {
            if bytes.starts_with(method) && bytes[method.len()] == b' ' {
                return MethodPrefix::Known(method.len());
            }
        } else if method.starts_with(bytes) {
            partial = true;
        }
    }
    if partial {
        MethodPrefix::Partial
    } else {
        MethodPrefix::Unknown
    }
}
