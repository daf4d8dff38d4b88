//! MySQL client/server protocol packets.

use serde::{Deserialize, Serialize};

use crate::byte_order::{read_le_u24, write_le_u24};

/// Size of the packet header: 3-byte length plus sequence id.
pub const PACKET_HEADER_LEN: usize = 4;

/// Largest payload a single packet can carry.
pub const MAX_PAYLOAD_LEN: u32 = 0x00ff_ffff;

/// Decoded packet header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketHeader {
    pub payload_len: u32,
    pub sequence_id: u8,
}

impl PacketHeader {
    /// Decode the header at the start of `bytes`, if present.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let header = bytes.get(..PACKET_HEADER_LEN)?;
        Some(Self {
            payload_len: read_le_u24([header[0], header[1], header[2]]),
            sequence_id: header[3],
        })
    }

    /// Encode the header.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PACKET_HEADER_LEN] {
        let [a, b, c] = write_le_u24(self.payload_len);
        [a, b, c, self.sequence_id]
    }
}

/// Text and binary protocol commands sent as the first payload byte of a
/// request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Command {
    Sleep = 0x00,
    Quit = 0x01,
    InitDb = 0x02,
    Query = 0x03,
    FieldList = 0x04,
    CreateDb = 0x05,
    DropDb = 0x06,
    Refresh = 0x07,
    Shutdown = 0x08,
    Statistics = 0x09,
    ProcessInfo = 0x0a,
    Connect = 0x0b,
    ProcessKill = 0x0c,
    Debug = 0x0d,
    Ping = 0x0e,
    Time = 0x0f,
    DelayedInsert = 0x10,
    ChangeUser = 0x11,
    BinlogDump = 0x12,
    TableDump = 0x13,
    ConnectOut = 0x14,
    RegisterSlave = 0x15,
    StmtPrepare = 0x16,
    StmtExecute = 0x17,
    StmtSendLongData = 0x18,
    StmtClose = 0x19,
    StmtReset = 0x1a,
    SetOption = 0x1b,
    StmtFetch = 0x1c,
    Daemon = 0x1d,
    BinlogDumpGtid = 0x1e,
    ResetConnection = 0x1f,
}

impl Command {
    const ALL: [Self; 32] = [
        Self::Sleep,
        Self::Quit,
        Self::InitDb,
        Self::Query,
        Self::FieldList,
        Self::CreateDb,
        Self::DropDb,
        Self::Refresh,
        Self::Shutdown,
        Self::Statistics,
        Self::ProcessInfo,
        Self::Connect,
        Self::ProcessKill,
        Self::Debug,
        Self::Ping,
        Self::Time,
        Self::DelayedInsert,
        Self::ChangeUser,
        Self::BinlogDump,
        Self::TableDump,
        Self::ConnectOut,
        Self::RegisterSlave,
        Self::StmtPrepare,
        Self::StmtExecute,
        Self::StmtSendLongData,
        Self::StmtClose,
        Self::StmtReset,
        Self::SetOption,
        Self::StmtFetch,
        Self::Daemon,
        Self::BinlogDumpGtid,
        Self::ResetConnection,
    ];

    /// Look up a command by its wire byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use traceframe::protocol::mysql::Command;
    ///
    /// assert_eq!(Command::from_byte(0x03), Some(Command::Query));
    /// assert_eq!(Command::from_byte(0x20), None);
    /// ```
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> { Self::ALL.get(usize::from(byte)).copied() }

    /// Wire byte of this command.
    #[must_use]
    pub const fn code(self) -> u8 { self as u8 }
}

/// One MySQL packet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub sequence_id: u8,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Command carried by a request packet.
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        self.payload.first().copied().and_then(Command::from_byte)
    }

    /// Encode the packet with its header.
    ///
    /// Returns `None` when the payload does not fit in one packet.
    #[must_use]
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        let payload_len = u32::try_from(self.payload.len())
            .ok()
            .filter(|len| *len <= MAX_PAYLOAD_LEN)?;
        let header = PacketHeader {
            payload_len,
            sequence_id: self.sequence_id,
        };
        let mut bytes = Vec::with_capacity(PACKET_HEADER_LEN + self.payload.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&self.payload);
        Some(bytes)
    }
}
