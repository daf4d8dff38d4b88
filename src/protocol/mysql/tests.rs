//! Tests for MySQL packet reconstruction and boundary scanning.

use rstest::{fixture, rstest};

use super::{Command, MAX_PAYLOAD_LEN, MysqlParser, Packet, PacketHeader};
use crate::{
    Direction,
    parse::{FrameParser, ParseOutcome, ParseState, parse_frames},
};

#[fixture]
fn parser() -> MysqlParser { MysqlParser::new() }

fn packet(sequence_id: u8, payload: &[u8]) -> Vec<u8> {
    Packet {
        sequence_id,
        payload: payload.to_vec(),
    }
    .to_bytes()
    .expect("test payload fits in one packet")
}

fn query(sql: &str) -> Vec<u8> {
    let mut payload = vec![Command::Query.code()];
    payload.extend_from_slice(sql.as_bytes());
    packet(0, &payload)
}

/// OK packet: affected rows 0, last insert id 0, status 2, warnings 0.
fn ok_packet(sequence_id: u8) -> Vec<u8> { packet(sequence_id, &[0x00, 0, 0, 2, 0, 0, 0]) }

#[rstest]
fn query_request_is_parsed(parser: MysqlParser) {
    let bytes = query("SELECT 1");
    let set = parse_frames(&parser, Direction::Request, &bytes, 0, false);
    assert_eq!(set.state, ParseState::Success);
    assert_eq!(set.len(), 1);
    let request = &set.frames[0];
    assert_eq!(request.sequence_id, 0);
    assert_eq!(request.command(), Some(Command::Query));
    assert_eq!(&request.payload[1..], b"SELECT 1");
}

#[rstest]
fn response_sequence_is_parsed(parser: MysqlParser) {
    let mut bytes = packet(1, &[0x01]);
    bytes.extend(packet(2, b"\x03def\x00\x00\x00\x01a\x00\x0c\x3f\x00"));
    bytes.extend(packet(3, &[0xfe, 0, 0, 2, 0]));
    bytes.extend(packet(4, b"\x011"));
    bytes.extend(packet(5, &[0xfe, 0, 0, 2, 0]));

    let set = parse_frames(&parser, Direction::Response, &bytes, 0, false);
    assert_eq!(set.state, ParseState::Success);
    let ids: Vec<u8> = set.frames.iter().map(|packet| packet.sequence_id).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);
}

#[rstest]
#[case::header(3)]
#[case::command(4)]
#[case::payload(7)]
fn truncated_request_needs_more_data(parser: MysqlParser, #[case] available: usize) {
    let bytes = query("SELECT 1");
    assert_eq!(
        parser.parse_one(Direction::Request, &bytes[..available], 0),
        ParseOutcome::NeedsMoreData
    );
}

#[rstest]
#[case::empty_payload(PacketHeader { payload_len: 0, sequence_id: 0 }.to_bytes().to_vec())]
#[case::wrong_sequence(packet(3, b"\x03SELECT 1"))]
#[case::unknown_command(packet(0, b"\x42hello"))]
fn malformed_request_is_invalid(parser: MysqlParser, #[case] bytes: Vec<u8>) {
    assert_eq!(
        parser.parse_one(Direction::Request, &bytes, 0),
        ParseOutcome::Invalid
    );
}

#[test]
fn oversized_packet_is_invalid() {
    let parser = MysqlParser::new().max_packet_size(8);
    assert_eq!(parser.packet_size_limit(), 8);
    assert_eq!(
        parser.parse_one(Direction::Request, &query("SELECT 1"), 0),
        ParseOutcome::Invalid
    );
    assert_eq!(MysqlParser::new().max_packet_size(0).packet_size_limit(), 1);
    assert_eq!(
        MysqlParser::new().max_packet_size(u32::MAX).packet_size_limit(),
        MAX_PAYLOAD_LEN
    );
}

#[rstest]
fn gap_placeholder_is_skipped_by_resync(parser: MysqlParser) {
    let mut bytes = query("SELECT 1");
    bytes.extend([0u8; 16]);
    bytes.extend(query("SELECT 2"));

    let set = parse_frames(&parser, Direction::Request, &bytes, 0, true);
    assert_eq!(set.state, ParseState::Success);
    assert_eq!(set.len(), 2);
    assert_eq!(set.discarded_bytes, 16);
    assert_eq!(&set.frames[1].payload[1..], b"SELECT 2");
}

#[rstest]
fn response_gap_is_skipped_by_resync(parser: MysqlParser) {
    let mut bytes = ok_packet(1);
    bytes.extend([0u8; 10]);
    bytes.extend(ok_packet(1));

    let set = parse_frames(&parser, Direction::Response, &bytes, 0, true);
    assert_eq!(set.len(), 2);
    assert_eq!(set.discarded_bytes, 10);
}

#[rstest]
#[case::ok(ok_packet(2), true)]
#[case::err(packet(1, b"\xff\x15\x04#28000denied"), true)]
#[case::eof(packet(5, &[0xfe, 0, 0, 2, 0]), true)]
#[case::column_count(packet(1, &[0x03]), true)]
#[case::short_ok(packet(1, &[0x00, 0]), false)]
#[case::greeting(packet(0, b"\x0a8.0.36\x00"), false)]
#[case::row(packet(4, b"\x011\x012"), false)]
fn response_signatures(parser: MysqlParser, #[case] bytes: Vec<u8>, #[case] expected: bool) {
    let found = parser.find_boundary(Direction::Response, &bytes, 0);
    assert_eq!(found == Some(0), expected);
}

#[rstest]
#[case::short(b"\x05\x00".as_slice())]
#[case::no_command(b"\x05\x00\x00\x00".as_slice())]
fn scanner_waits_for_a_complete_signature(parser: MysqlParser, #[case] bytes: &[u8]) {
    assert_eq!(parser.find_boundary(Direction::Request, bytes, 0), None);
}

#[rstest]
#[case(0x03, Some(Command::Query))]
#[case(0x16, Some(Command::StmtPrepare))]
#[case(0x1f, Some(Command::ResetConnection))]
#[case(0x20, None)]
fn command_lookup(#[case] byte: u8, #[case] expected: Option<Command>) {
    assert_eq!(Command::from_byte(byte), expected);
    if let Some(command) = expected {
        assert_eq!(command.code(), byte);
    }
}
