//! HTTP/2 frame layout.

use serde::{Deserialize, Serialize};

use crate::byte_order::{read_network_u24, read_network_u32, write_network_u24, write_network_u32};

/// Size of the fixed frame header.
pub const FRAME_HEADER_LEN: usize = 9;

/// Client connection preface.
pub const CONNECTION_PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

/// `ACK` flag on SETTINGS and PING frames.
pub const FLAG_ACK: u8 = 0x1;

const STREAM_ID_MASK: u32 = 0x7fff_ffff;

/// HTTP/2 frame type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameType {
    Data,
    Headers,
    Priority,
    RstStream,
    Settings,
    PushPromise,
    Ping,
    GoAway,
    WindowUpdate,
    Continuation,
    /// An extension type; carried through but never used to resynchronise.
    Unknown(u8),
}

impl From<u8> for FrameType {
    fn from(code: u8) -> Self {
        match code {
            0x0 => Self::Data,
            0x1 => Self::Headers,
            0x2 => Self::Priority,
            0x3 => Self::RstStream,
            0x4 => Self::Settings,
            0x5 => Self::PushPromise,
            0x6 => Self::Ping,
            0x7 => Self::GoAway,
            0x8 => Self::WindowUpdate,
            0x9 => Self::Continuation,
            other => Self::Unknown(other),
        }
    }
}

impl FrameType {
    /// Wire code of this type.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Data => 0x0,
            Self::Headers => 0x1,
            Self::Priority => 0x2,
            Self::RstStream => 0x3,
            Self::Settings => 0x4,
            Self::PushPromise => 0x5,
            Self::Ping => 0x6,
            Self::GoAway => 0x7,
            Self::WindowUpdate => 0x8,
            Self::Continuation => 0x9,
            Self::Unknown(code) => code,
        }
    }

    /// Whether the type is defined by RFC 9113.
    #[must_use]
    pub const fn is_known(self) -> bool { !matches!(self, Self::Unknown(_)) }

    /// Flag bits RFC 9113 defines for this type.
    #[must_use]
    pub const fn defined_flags(self) -> u8 {
        match self {
            Self::Data => 0x09,
            Self::Headers => 0x2d,
            Self::Settings | Self::Ping => FLAG_ACK,
            Self::PushPromise => 0x0c,
            Self::Continuation => 0x04,
            Self::Priority | Self::RstStream | Self::GoAway | Self::WindowUpdate => 0,
            Self::Unknown(_) => 0xff,
        }
    }
}

/// Decoded 9-byte frame header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u32,
    pub frame_type: FrameType,
    pub flags: u8,
    pub stream_id: u32,
}

impl FrameHeader {
    /// Decode the header at the start of `bytes`, if all nine bytes are
    /// present. The reserved stream-id bit is discarded.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let header: &[u8; FRAME_HEADER_LEN] = bytes.get(..FRAME_HEADER_LEN)?.try_into().ok()?;
        Some(Self {
            length: read_network_u24([header[0], header[1], header[2]]),
            frame_type: FrameType::from(header[3]),
            flags: header[4],
            stream_id: read_network_u32([header[5], header[6], header[7], header[8]])
                & STREAM_ID_MASK,
        })
    }

    /// Encode the header.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_LEN] {
        let length = write_network_u24(self.length);
        let stream_id = write_network_u32(self.stream_id & STREAM_ID_MASK);
        [
            length[0],
            length[1],
            length[2],
            self.frame_type.code(),
            self.flags,
            stream_id[0],
            stream_id[1],
            stream_id[2],
            stream_id[3],
        ]
    }

    /// Whether the header obeys the length and stream-id rules for its type.
    #[must_use]
    pub fn is_valid(&self, max_frame_size: u32) -> bool {
        if self.length > max_frame_size {
            return false;
        }
        let on_stream = self.stream_id != 0;
        let length = self.length;
        match self.frame_type {
            FrameType::Data
            | FrameType::Headers
            | FrameType::PushPromise
            | FrameType::Continuation => on_stream,
            FrameType::Priority => on_stream && length == 5,
            FrameType::RstStream => on_stream && length == 4,
            FrameType::Settings => {
                !on_stream && length % 6 == 0 && (self.flags & FLAG_ACK == 0 || length == 0)
            }
            FrameType::Ping => !on_stream && length == 8,
            FrameType::GoAway => !on_stream && length >= 8,
            FrameType::WindowUpdate => length == 4,
            FrameType::Unknown(_) => true,
        }
    }
}

/// One HTTP/2 frame with its payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub length: u32,
    pub frame_type: FrameType,
    pub flags: u8,
    pub stream_id: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Header fields of this frame.
    #[must_use]
    pub const fn header(&self) -> FrameHeader {
        FrameHeader {
            length: self.length,
            frame_type: self.frame_type,
            flags: self.flags,
            stream_id: self.stream_id,
        }
    }

    /// Whether the given flag bits are all set.
    #[must_use]
    pub const fn has_flags(&self, flags: u8) -> bool { self.flags & flags == flags }
}
