//! Side of a traced exchange that a byte stream belongs to.

use serde::{Deserialize, Serialize};

/// Direction of a traced byte stream.
///
/// One TCP connection yields two independent streams; grammars use the
/// direction to decide which start line (request or response) to expect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Bytes written by the client side of the exchange.
    Request,
    /// Bytes written by the server side of the exchange.
    Response,
}

impl Direction {
    /// Returns the direction name as a static string for logs and metrics.
    ///
    /// # Examples
    ///
    /// ```
    /// use traceframe::Direction;
    ///
    /// assert_eq!(Direction::Request.as_str(), "request");
    /// assert_eq!(Direction::Response.as_str(), "response");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}
