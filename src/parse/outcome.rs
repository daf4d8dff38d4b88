//! Verdicts produced by grammar parsers and by the reconstruction loop.

/// Final state of a reconstruction pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParseState {
    /// Every available byte was parsed into complete messages.
    #[default]
    Success,
    /// The next message is on track but incomplete; retry after appending.
    NeedsMoreData,
    /// The bytes at the terminal offset cannot begin a message.
    Invalid,
    /// A message legitimately ended message framing on this stream.
    EndOfStream,
}

impl ParseState {
    /// Returns the state name as a static string for metrics and logging.
    ///
    /// # Examples
    ///
    /// ```
    /// use traceframe::parse::ParseState;
    ///
    /// assert_eq!(ParseState::NeedsMoreData.as_str(), "needs_more_data");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NeedsMoreData => "needs_more_data",
            Self::Invalid => "invalid",
            Self::EndOfStream => "end_of_stream",
        }
    }
}

/// Result of asking a grammar to parse exactly one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseOutcome<F> {
    /// A message was recognised.
    Complete {
        /// Bytes the message occupies, starting at the parse offset.
        consumed: usize,
        /// The parsed message; `None` for protocol units that carry no
        /// message, such as the HTTP/2 connection preface.
        frame: Option<F>,
        /// The grammar cannot delimit the message; it extends to the end of
        /// the available bytes and may grow on the next call.
        open_ended: bool,
    },
    /// The bytes are a valid prefix of a message.
    NeedsMoreData,
    /// The bytes cannot begin a message of the requested direction.
    Invalid,
    /// A message was recognised and no further messages follow it.
    EndOfStream {
        /// Bytes the final message occupies.
        consumed: usize,
        /// The final message.
        frame: Option<F>,
    },
}

impl<F> ParseOutcome<F> {
    /// Shorthand for a delimited message.
    #[must_use]
    pub fn complete(consumed: usize, frame: F) -> Self {
        Self::Complete {
            consumed,
            frame: Some(frame),
            open_ended: false,
        }
    }
}
