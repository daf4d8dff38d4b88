//! Errors raised by a [`DataStream`](super::DataStream).
//!
//! Parse outcomes such as `NeedsMoreData` or `Invalid` are states, not
//! errors. The errors here reject caller input; each carries a recommended
//! [`RecoveryPolicy`] via [`StreamError::default_recovery_policy`].

use thiserror::Error;

use crate::buffer::BufferError;

/// How a caller should respond to a [`StreamError`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Drop the offending request and keep the stream as it is.
    #[default]
    Ignore,
    /// Discard all buffered state with
    /// [`DataStream::reset`](super::DataStream::reset) and start over.
    Reset,
}

impl RecoveryPolicy {
    /// Returns the policy name as a static string for metrics and logging.
    ///
    /// # Examples
    ///
    /// ```
    /// use traceframe::stream::RecoveryPolicy;
    ///
    /// assert_eq!(RecoveryPolicy::Ignore.as_str(), "ignore");
    /// assert_eq!(RecoveryPolicy::Reset.as_str(), "reset");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Reset => "reset",
        }
    }
}

/// Errors produced by [`DataStream`](super::DataStream) operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The chunk buffer rejected the operation.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// Accepting the data would exceed the configured retained-bytes cap.
    #[error("retained bytes would exceed limit: {retained} + {attempted} > {limit}")]
    RetainedLimitExceeded {
        /// Bytes currently retained.
        retained: usize,
        /// Bytes the rejected append would have added.
        attempted: usize,
        /// Configured cap.
        limit: usize,
    },
}

impl StreamError {
    /// Returns the recommended recovery policy for this error.
    ///
    /// Sequencing failures and limit breaches leave the stream unable to
    /// make progress, so they recommend [`RecoveryPolicy::Reset`]. A bad
    /// trim position only invalidates that request.
    #[must_use]
    pub const fn default_recovery_policy(&self) -> RecoveryPolicy {
        match self {
            Self::Buffer(BufferError::OutOfOrder { .. }) | Self::RetainedLimitExceeded { .. } => {
                RecoveryPolicy::Reset
            }
            Self::Buffer(_) => RecoveryPolicy::Ignore,
        }
    }

    /// Returns the error category as a string for logging and metrics.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Buffer(err) => err.error_type(),
            Self::RetainedLimitExceeded { .. } => "limit_exceeded",
        }
    }
}
