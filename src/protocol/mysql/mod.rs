//! MySQL client/server protocol packet grammar.
//!
//! Each packet is a 3-byte little-endian payload length, a sequence id and
//! the payload. Packets are emitted individually; payloads of exactly
//! [`MAX_PAYLOAD_LEN`] bytes are not joined with their continuation.
//!
//! Requests are expected to open a command phase exchange, so they must
//! carry sequence id 0 and a known command byte. Handshake responses and
//! `LOCAL INFILE` uploads therefore parse as invalid on the request side.

mod packet;

pub use packet::{Command, MAX_PAYLOAD_LEN, PACKET_HEADER_LEN, Packet, PacketHeader};

use crate::{
    Direction,
    parse::{FrameParser, ParseOutcome},
};

const OK_MARKER: u8 = 0x00;
const EOF_MARKER: u8 = 0xfe;
const ERR_MARKER: u8 = 0xff;
/// Largest single-byte length-encoded integer.
const MAX_COLUMN_COUNT_BYTE: u8 = 0xfa;

/// [`FrameParser`] for MySQL packets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MysqlParser {
    max_packet_size: u32,
}

impl Default for MysqlParser {
    fn default() -> Self {
        Self {
            max_packet_size: MAX_PAYLOAD_LEN,
        }
    }
}

impl MysqlParser {
    /// Create a parser accepting payloads up to [`MAX_PAYLOAD_LEN`] bytes.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set the largest accepted payload length, clamped to
    /// `1..=MAX_PAYLOAD_LEN`.
    #[must_use]
    pub fn max_packet_size(mut self, size: u32) -> Self {
        self.max_packet_size = size.clamp(1, MAX_PAYLOAD_LEN);
        self
    }

    /// Current payload-length limit.
    #[must_use]
    pub const fn packet_size_limit(&self) -> u32 { self.max_packet_size }

    fn length_ok(&self, header: PacketHeader) -> bool {
        header.payload_len != 0 && header.payload_len <= self.max_packet_size
    }

    fn request_candidate(&self, bytes: &[u8]) -> Option<bool> {
        let header = PacketHeader::parse(bytes)?;
        let command = *bytes.get(PACKET_HEADER_LEN)?;
        // COM_SLEEP is server-internal; a zero byte here is far more likely
        // to be gap filler than a real command.
        Some(
            header.sequence_id == 0
                && self.length_ok(header)
                && command != Command::Sleep.code()
                && Command::from_byte(command).is_some(),
        )
    }

    fn response_candidate(&self, bytes: &[u8]) -> Option<bool> {
        let header = PacketHeader::parse(bytes)?;
        let marker = *bytes.get(PACKET_HEADER_LEN)?;
        if header.sequence_id == 0 || !self.length_ok(header) {
            return Some(false);
        }
        let len = header.payload_len;
        Some(match marker {
            OK_MARKER => len >= 7,
            ERR_MARKER => len >= 3,
            EOF_MARKER => len < 9,
            1..=MAX_COLUMN_COUNT_BYTE => len == 1,
            _ => false,
        })
    }
}

impl FrameParser for MysqlParser {
    type Frame = Packet;

    fn name(&self) -> &'static str { "mysql" }

    fn parse_one(&self, direction: Direction, buffer: &[u8], start: usize) -> ParseOutcome<Packet> {
        let bytes = &buffer[start..];
        let Some(header) = PacketHeader::parse(bytes) else {
            return ParseOutcome::NeedsMoreData;
        };
        if !self.length_ok(header) {
            return ParseOutcome::Invalid;
        }
        if direction == Direction::Request {
            if header.sequence_id != 0 {
                return ParseOutcome::Invalid;
            }
            match bytes.get(PACKET_HEADER_LEN) {
                Some(&command) if Command::from_byte(command).is_none() => {
                    return ParseOutcome::Invalid;
                }
                Some(_) => {}
                None => return ParseOutcome::NeedsMoreData,
            }
        }

        let end = PACKET_HEADER_LEN + header.payload_len as usize;
        let Some(payload) = bytes.get(PACKET_HEADER_LEN..end) else {
            return ParseOutcome::NeedsMoreData;
        };
        ParseOutcome::complete(
            end,
            Packet {
                sequence_id: header.sequence_id,
                payload: payload.to_vec(),
            },
        )
    }

    fn find_boundary(&self, direction: Direction, buffer: &[u8], start: usize) -> Option<usize> {
        for pos in start..buffer.len() {
            let bytes = &buffer[pos..];
            let candidate = match direction {
                Direction::Request => self.request_candidate(bytes)?,
                Direction::Response => self.response_candidate(bytes)?,
            };
            if candidate {
                return Some(pos);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests;
