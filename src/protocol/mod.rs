//! Grammars for the traced protocols.
//!
//! Each submodule provides one [`FrameParser`](crate::parse::FrameParser)
//! implementation together with the message type it produces.

pub mod http;
pub mod http2;
pub mod mysql;

pub use http::HttpParser;
pub use http2::Http2Parser;
pub use mysql::MysqlParser;
