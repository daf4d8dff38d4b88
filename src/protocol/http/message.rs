//! Reconstructed HTTP/1.x messages.

use serde::{Deserialize, Serialize};

use super::Headers;
use crate::Direction;

/// First line of an HTTP message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartLine {
    /// `METHOD target HTTP/1.x`
    Request { method: String, path: String },
    /// `HTTP/1.x status reason`
    Response { status: u16, reason: String },
}

/// A fully materialised HTTP/1.x request or response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Minor protocol version: `0` for HTTP/1.0, `1` for HTTP/1.1.
    pub minor_version: u8,
    /// Request or status line.
    pub start_line: StartLine,
    /// Header fields in arrival order.
    pub headers: Headers,
    /// Decoded body. Chunked bodies are stored with their framing removed.
    pub body: Vec<u8>,
}

impl Message {
    /// Direction implied by the start line.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self.start_line {
            StartLine::Request { .. } => Direction::Request,
            StartLine::Response { .. } => Direction::Response,
        }
    }

    /// Request method, if this is a request.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match &self.start_line {
            StartLine::Request { method, .. } => Some(method),
            StartLine::Response { .. } => None,
        }
    }

    /// Request target, if this is a request.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match &self.start_line {
            StartLine::Request { path, .. } => Some(path),
            StartLine::Response { .. } => None,
        }
    }

    /// Status code, if this is a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self.start_line {
            StartLine::Response { status, .. } => Some(status),
            StartLine::Request { .. } => None,
        }
    }

    /// Reason phrase, if this is a response.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match &self.start_line {
            StartLine::Response { reason, .. } => Some(reason),
            StartLine::Request { .. } => None,
        }
    }
}
