//! Capture fixtures and chunking helpers.

use proptest::test_runner::{Config, RngAlgorithm, TestRng, TestRunner};
use traceframe::{Chunk, DataStream, FrameParser};

/// Request without a body.
pub const GET_REQUEST: &[u8] = b"GET /index.html HTTP/1.1\r\n\
Host: www.pixielabs.ai\r\n\
Accept: image/gif, image/jpeg, */*\r\n\
User-Agent: Mozilla/5.0 (X11; Linux x86_64)\r\n\r\n";

/// Request with a `Content-Length` body.
pub const POST_REQUEST: &[u8] = b"POST /test HTTP/1.1\r\n\
host: pixielabs.ai\r\n\
content-type: application/x-www-form-urlencoded\r\n\
content-length: 27\r\n\r\n\
field1=value1&field2=value2";

/// Response with a `Content-Length` body of `pixielabs`.
pub const RESPONSE_FOO: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: foo\r\nContent-Length: 9\r\n\r\npixielabs";

/// Chunked response whose decoded body is `pixielabs is awesome!`.
pub const RESPONSE_CHUNKED: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: json\r\n\
Transfer-Encoding: chunked\r\n\r\n\
9\r\npixielabs\r\nC\r\n is awesome!\r\n0\r\n\r\n";

/// Cut `data` at every point in `points`.
///
/// Points are sorted and deduplicated; points at or past the end are
/// ignored. Concatenating the result always yields `data`.
///
/// ```rust
/// use traceframe_testing::split_at_points;
///
/// let parts = split_at_points(b"abcdef", &[4, 1, 4, 99]);
/// assert_eq!(parts, [b"a".to_vec(), b"bcd".to_vec(), b"ef".to_vec()]);
/// ```
#[must_use]
pub fn split_at_points(data: &[u8], points: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = points
        .iter()
        .copied()
        .filter(|&point| point > 0 && point < data.len())
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut from = 0;
    for cut in cuts.into_iter().chain(std::iter::once(data.len())) {
        parts.push(data[from..cut].to_vec());
        from = cut;
    }
    parts
}

/// Cut `data` into chunks numbered from zero.
#[must_use]
pub fn chunks_at(data: &[u8], points: &[usize]) -> Vec<Chunk> {
    split_at_points(data, points)
        .into_iter()
        .zip(0_u64..)
        .map(|(part, seq)| Chunk::new(seq, part))
        .collect()
}

/// Append `data` to an empty `stream`, cut at `points`.
///
/// # Panics
///
/// Panics if the stream rejects a chunk.
pub fn feed<P: FrameParser>(stream: &mut DataStream<P>, data: &[u8], points: &[usize]) {
    let base = stream.buffer().next_seq().unwrap_or(0);
    for (index, part) in split_at_points(data, points).into_iter().enumerate() {
        stream
            .append(Chunk::new(base + index as u64, part))
            .expect("stream rejected chunk");
    }
}

/// Encode `body` with chunked transfer coding using chunks of `chunk_size`
/// bytes, followed by the terminating zero-size chunk.
///
/// ```rust
/// use traceframe_testing::encode_chunked;
///
/// assert_eq!(encode_chunked(b"hello", 3), b"3\r\nhel\r\n2\r\nlo\r\n0\r\n\r\n");
/// ```
#[must_use]
pub fn encode_chunked(body: &[u8], chunk_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 16);
    for piece in body.chunks(chunk_size.max(1)) {
        out.extend_from_slice(format!("{:X}\r\n", piece.len()).as_bytes());
        out.extend_from_slice(piece);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

/// Property test runner with a fixed seed so failures reproduce.
#[must_use]
pub fn deterministic_runner(cases: u32) -> TestRunner {
    TestRunner::new_with_rng(
        Config {
            cases,
            ..Config::default()
        },
        TestRng::deterministic_rng(RngAlgorithm::ChaCha),
    )
}
