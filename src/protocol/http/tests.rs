//! Unit tests for the HTTP/1.x grammar, body framing and boundary scanner.

use proptest::{
    collection::vec,
    prelude::{Strategy, any},
    prop_assert_eq,
    test_runner::{Config as ProptestConfig, RngAlgorithm, TestRng, TestRunner},
};
use rstest::{fixture, rstest};

use super::{
    HttpParser,
    Message,
    StartLine,
    boundary::{MethodPrefix, method_prefix},
    chunked::{self, ChunkedBody},
};
use crate::{
    Direction,
    parse::{FrameParser, ParseOutcome, ParseState, parse_frames},
};

const GET_REQUEST: &[u8] = b"GET /index.html HTTP/1.1\r\n\
Host: www.pixielabs.ai\r\n\
Accept: image/gif, image/jpeg, */*\r\n\
User-Agent: Mozilla/5.0 (X11; Linux x86_64)\r\n\r\n";

const POST_REQUEST: &[u8] = b"POST /test HTTP/1.1\r\n\
host: pixielabs.ai\r\n\
content-type: application/x-www-form-urlencoded\r\n\
content-length: 27\r\n\r\n\
field1=value1&field2=value2";

const RESPONSE_FOO: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: foo\r\nContent-Length: 9\r\n\r\npixielabs";

const RESPONSE_CHUNKED: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: json\r\n\
Transfer-Encoding: chunked\r\n\r\n\
9\r\npixielabs\r\nC\r\n is awesome!\r\n0\r\n\r\n";

#[fixture]
fn parser() -> HttpParser { HttpParser::new() }

fn complete(outcome: ParseOutcome<Message>) -> (usize, Message) {
    match outcome {
        ParseOutcome::Complete {
            consumed,
            frame: Some(message),
            open_ended: false,
        } => (consumed, message),
        other => panic!("expected a delimited message, got {other:?}"),
    }
}

#[rstest]
fn get_request_is_parsed(parser: HttpParser) {
    let (consumed, message) = complete(parser.parse_one(Direction::Request, GET_REQUEST, 0));
    assert_eq!(consumed, GET_REQUEST.len());
    assert_eq!(message.direction(), Direction::Request);
    assert_eq!(
        message.start_line,
        StartLine::Request {
            method: "GET".into(),
            path: "/index.html".into(),
        }
    );
    assert_eq!(message.minor_version, 1);
    assert_eq!(message.headers.len(), 3);
    assert_eq!(message.headers.get("host"), Some("www.pixielabs.ai"));
    assert_eq!(message.headers.get("Accept"), Some("image/gif, image/jpeg, */*"));
    assert!(message.body.is_empty());
}

#[rstest]
fn post_body_is_bounded_by_content_length(parser: HttpParser) {
    let (consumed, message) = complete(parser.parse_one(Direction::Request, POST_REQUEST, 0));
    assert_eq!(consumed, POST_REQUEST.len());
    assert_eq!(message.method(), Some("POST"));
    assert_eq!(message.path(), Some("/test"));
    assert_eq!(message.body, b"field1=value1&field2=value2");
}

#[rstest]
fn no_content_response_has_empty_body(parser: HttpParser) {
    let set = parse_frames(
        &parser,
        Direction::Response,
        b"HTTP/1.1 204 No Content\r\n\r\n",
        0,
        false,
    );
    assert_eq!(set.state, ParseState::Success);
    let message = &set.frames[0];
    assert_eq!(message.status(), Some(204));
    assert_eq!(message.reason(), Some("No Content"));
    assert!(message.body.is_empty());
}

#[rstest]
fn chunked_body_is_decoded(parser: HttpParser) {
    let (consumed, message) =
        complete(parser.parse_one(Direction::Response, RESPONSE_CHUNKED, 0));
    assert_eq!(consumed, RESPONSE_CHUNKED.len());
    assert_eq!(message.body, b"pixielabs is awesome!");
}

#[rstest]
fn chunked_takes_precedence_over_content_length(parser: HttpParser) {
    let bytes = b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\nTransfer-Encoding: gzip, Chunked\r\n\r\n\
                  9\r\npixielabs\r\n0\r\n\r\n";
    let (_, message) = complete(parser.parse_one(Direction::Response, bytes, 0));
    assert_eq!(message.body, b"pixielabs");
}

#[rstest]
fn short_content_length_needs_more_data(parser: HttpParser) {
    let bytes = b"HTTP/1.1 200 OK\r\nContent-Length: 40\r\n\r\nabc";
    let set = parse_frames(&parser, Direction::Response, bytes, 0, false);
    assert!(set.is_empty());
    assert_eq!(set.state, ParseState::NeedsMoreData);
    assert_eq!(set.end_offset, 0);
}

#[rstest]
fn non_numeric_content_length_is_invalid(parser: HttpParser) {
    let bytes = b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n";
    assert_eq!(
        parser.parse_one(Direction::Request, bytes, 0),
        ParseOutcome::Invalid
    );
}

#[rstest]
fn switching_protocols_ends_the_stream(parser: HttpParser) {
    let bytes = b"HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\r\n\x81\x05hello";
    let set = parse_frames(&parser, Direction::Response, bytes, 0, true);
    assert_eq!(set.len(), 1);
    assert_eq!(set.frames[0].status(), Some(101));
    assert_eq!(set.state, ParseState::EndOfStream);
    assert_eq!(set.end_offset, bytes.len() - 7);
}

#[rstest]
fn continue_response_has_no_body(parser: HttpParser) {
    let mut bytes = b"HTTP/1.1 100 Continue\r\n\r\n".to_vec();
    bytes.extend_from_slice(RESPONSE_FOO);
    let set = parse_frames(&parser, Direction::Response, &bytes, 0, false);
    assert_eq!(set.len(), 2);
    assert_eq!(set.frames[0].status(), Some(100));
    assert_eq!(set.frames[1].body, b"pixielabs");
}

#[rstest]
fn undelimited_response_body_is_open_ended(parser: HttpParser) {
    let bytes = b"HTTP/1.0 200 OK\r\nServer: test\r\n\r\npartial body";
    match parser.parse_one(Direction::Response, bytes, 0) {
        ParseOutcome::Complete {
            consumed,
            frame: Some(message),
            open_ended: true,
        } => {
            assert_eq!(consumed, bytes.len());
            assert_eq!(message.minor_version, 0);
            assert_eq!(message.body, b"partial body");
        }
        other => panic!("expected an open-ended message, got {other:?}"),
    }
}

#[rstest]
fn undelimited_request_has_empty_body(parser: HttpParser) {
    let bytes = b"DELETE /item/7 HTTP/1.1\r\n\r\nGET / HTTP/1.1\r\n\r\n";
    let set = parse_frames(&parser, Direction::Request, bytes, 0, false);
    assert_eq!(set.len(), 2);
    assert!(set.frames[0].body.is_empty());
    assert_eq!(set.ranges[0], 0..27);
}

#[rstest]
fn duplicate_headers_are_kept_in_order(parser: HttpParser) {
    let bytes = b"GET / HTTP/1.1\r\nCookie: a=1\r\nHost: x\r\ncookie: b=2\r\n\r\n";
    let (_, message) = complete(parser.parse_one(Direction::Request, bytes, 0));
    let cookies: Vec<&str> = message.headers.get_all("COOKIE").collect();
    assert_eq!(cookies, ["a=1", "b=2"]);
    assert_eq!(message.headers.folded("cookie").as_deref(), Some("a=1, b=2"));
    let names: Vec<&str> = message.headers.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["Cookie", "Host", "cookie"]);
}

#[rstest]
fn header_lookup_outlives_the_queried_name(parser: HttpParser) {
    let bytes = b"GET / HTTP/1.1\r\nContent-Type: text/plain\r\ncontent-type: text/html\r\n\r\n";
    let (_, message) = complete(parser.parse_one(Direction::Request, bytes, 0));
    let value = {
        let name = String::from("CONTENT-TYPE");
        message.headers.get(&name)
    };
    assert_eq!(value, Some("text/plain"));
    assert!(message.headers.contains("content-type"));
    assert_eq!(message.headers.get("accept"), None);
}

#[rstest]
fn leading_blank_lines_are_tolerated(parser: HttpParser) {
    let bytes = b"\r\n\r\nGET / HTTP/1.1\r\n\r\n";
    let (consumed, message) = complete(parser.parse_one(Direction::Request, bytes, 0));
    assert_eq!(consumed, bytes.len());
    assert_eq!(message.path(), Some("/"));
}

#[rstest]
#[case::unknown_method(b"FETCH / HTTP/1.1\r\n\r\n".as_slice())]
#[case::lowercase_method(b"get / HTTP/1.1\r\n\r\n".as_slice())]
#[case::response_bytes(b"HTTP/1.1 200 OK\r\n\r\n".as_slice())]
#[case::leftover_text(b" is awesome".as_slice())]
fn request_start_must_be_a_known_method(parser: HttpParser, #[case] bytes: &[u8]) {
    assert_eq!(
        parser.parse_one(Direction::Request, bytes, 0),
        ParseOutcome::Invalid
    );
}

#[rstest]
#[case::method_prefix(b"DEL".as_slice())]
#[case::line_prefix(b"GET /index.ht".as_slice())]
#[case::headers_prefix(b"GET / HTTP/1.1\r\nHost: a".as_slice())]
fn request_prefix_needs_more_data(parser: HttpParser, #[case] bytes: &[u8]) {
    assert_eq!(
        parser.parse_one(Direction::Request, bytes, 0),
        ParseOutcome::NeedsMoreData
    );
}

#[rstest]
#[case::leftover_text(b" is awesome".as_slice(), ParseOutcome::Invalid)]
#[case::http2(b"HTTP/2 200 OK\r\n\r\n".as_slice(), ParseOutcome::Invalid)]
#[case::prefix(b"HTTP/1.1 2".as_slice(), ParseOutcome::NeedsMoreData)]
fn response_start_is_checked(
    parser: HttpParser,
    #[case] bytes: &[u8],
    #[case] expected: ParseOutcome<Message>,
) {
    assert_eq!(parser.parse_one(Direction::Response, bytes, 0), expected);
}

#[test]
fn header_limit_is_enforced() {
    let parser = HttpParser::new().max_headers(2);
    let bytes = b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n";
    assert_eq!(parser.header_limit(), 2);
    assert_eq!(
        parser.parse_one(Direction::Request, bytes, 0),
        ParseOutcome::Invalid
    );
    assert_eq!(HttpParser::new().max_headers(0).header_limit(), 1);
}

#[rstest]
#[case(b"GET".as_slice(), MethodPrefix::Partial)]
#[case(b"GET ".as_slice(), MethodPrefix::Known(3))]
#[case(b"PATCH /".as_slice(), MethodPrefix::Known(5))]
#[case(b"GETX".as_slice(), MethodPrefix::Unknown)]
#[case(b"P".as_slice(), MethodPrefix::Partial)]
fn method_prefixes(#[case] bytes: &[u8], #[case] expected: MethodPrefix) {
    assert_eq!(method_prefix(bytes), expected);
}

#[rstest]
#[case::get(b"some garbage leftover text with a GET inside".as_slice())]
#[case::post(b"some garbage leftover text with a POST inside".as_slice())]
#[case::version(b"some garbage leftover text with a HTTP/1.1 inside".as_slice())]
fn response_boundary_skips_decoys(parser: HttpParser, #[case] garbage: &[u8]) {
    let mut bytes = garbage.to_vec();
    bytes.extend_from_slice(RESPONSE_FOO);
    assert_eq!(
        parser.find_boundary(Direction::Response, &bytes, 0),
        Some(garbage.len())
    );
}

#[rstest]
#[case::get(b"some garbage leftover text with a GET inside".as_slice())]
#[case::post(b"some garbage leftover text with a POST inside".as_slice())]
#[case::version(b"some garbage leftover text with a HTTP/1.1 inside".as_slice())]
fn request_boundary_skips_decoys(parser: HttpParser, #[case] garbage: &[u8]) {
    let mut bytes = garbage.to_vec();
    bytes.extend_from_slice(GET_REQUEST);
    assert_eq!(
        parser.find_boundary(Direction::Request, &bytes, 0),
        Some(garbage.len())
    );
}

#[rstest]
#[case(Direction::Request)]
#[case(Direction::Response)]
fn bogus_text_has_no_boundary(parser: HttpParser, #[case] direction: Direction) {
    let bytes = b"This is a bogus string in which there are no HTTP boundaries.";
    assert_eq!(parser.find_boundary(direction, bytes, 0), None);
}

#[rstest]
#[case::request(Direction::Request, b"xxGET /index.html HT".as_slice())]
#[case::response(Direction::Response, b"xxHTTP/1.1 20".as_slice())]
fn incomplete_signature_waits_for_data(
    parser: HttpParser,
    #[case] direction: Direction,
    #[case] bytes: &[u8],
) {
    assert_eq!(parser.find_boundary(direction, bytes, 0), None);
}

#[rstest]
fn resync_recovers_after_garbage(parser: HttpParser) {
    let mut bytes = b"some garbage leftover text with a HTTP/1.1 inside".to_vec();
    bytes.extend_from_slice(RESPONSE_FOO);
    bytes.extend_from_slice(RESPONSE_CHUNKED);

    let strict = parse_frames(&parser, Direction::Response, &bytes, 0, false);
    assert!(strict.is_empty());
    assert_eq!(strict.state, ParseState::Invalid);

    let set = parse_frames(&parser, Direction::Response, &bytes, 0, true);
    assert_eq!(set.state, ParseState::Success);
    assert_eq!(set.len(), 2);
    assert_eq!(set.frames[1].body, b"pixielabs is awesome!");
    assert_eq!(set.discarded_bytes, 49);
}

#[rstest]
#[case::extension(b"9;name=value\r\npixielabs\r\n0\r\n\r\n".as_slice(), 30)]
#[case::trailer(b"9\r\npixielabs\r\n0\r\nExpires: never\r\n\r\n".as_slice(), 35)]
#[case::padded_size(b"9 \r\npixielabs\r\n0\r\n\r\n".as_slice(), 20)]
fn chunked_framing_extras_are_skipped(#[case] encoded: &[u8], #[case] consumed: usize) {
    assert_eq!(
        chunked::decode(encoded),
        ChunkedBody::Complete {
            consumed,
            body: b"pixielabs".to_vec(),
        }
    );
}

#[rstest]
#[case::size_digits(b"1".as_slice())]
#[case::size_cr(b"9\r".as_slice())]
#[case::data(b"9\r\npixie".as_slice())]
#[case::data_terminator(b"9\r\npixielabs\r".as_slice())]
#[case::last_chunk(b"9\r\npixielabs\r\n0\r\n".as_slice())]
#[case::last_chunk_cr(b"9\r\npixielabs\r\n0\r\n\r".as_slice())]
#[case::trailer(b"0\r\nExpires: ne".as_slice())]
fn chunked_prefix_is_partial(#[case] encoded: &[u8]) {
    assert_eq!(chunked::decode(encoded), ChunkedBody::Partial);
}

#[rstest]
#[case::non_hex(b"xyz\r\n".as_slice())]
#[case::non_hex_prefix(b"9z".as_slice())]
#[case::empty_size(b"\r\n".as_slice())]
#[case::overflow(b"11111111111111111\r\n".as_slice())]
#[case::missing_crlf(b"3\r\nabcX\r\n".as_slice())]
fn chunked_malformation_is_invalid(#[case] encoded: &[u8]) {
    assert_eq!(chunked::decode(encoded), ChunkedBody::Invalid);
}

fn encode_chunked(pieces: &[Vec<u8>]) -> Vec<u8> {
    let mut encoded = Vec::new();
    for piece in pieces.iter().filter(|piece| !piece.is_empty()) {
        encoded.extend_from_slice(format!("{:x}\r\n", piece.len()).as_bytes());
        encoded.extend_from_slice(piece);
        encoded.extend_from_slice(b"\r\n");
    }
    encoded.extend_from_slice(b"0\r\n\r\n");
    encoded
}

fn pieces() -> impl Strategy<Value = Vec<Vec<u8>>> { vec(vec(any::<u8>(), 0..64), 0..8) }

#[test]
fn chunked_encoding_round_trips() {
    let config = ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    };
    let mut runner =
        TestRunner::new_with_rng(config, TestRng::deterministic_rng(RngAlgorithm::ChaCha));
    runner
        .run(&pieces(), |pieces| {
            let encoded = encode_chunked(&pieces);
            prop_assert_eq!(
                chunked::decode(&encoded),
                ChunkedBody::Complete {
                    consumed: encoded.len(),
                    body: pieces.concat(),
                }
            );
            Ok(())
        })
        .expect("chunked bodies should round-trip");
}
