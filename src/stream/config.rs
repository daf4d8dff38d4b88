//! Resource limits for a [`DataStream`](super::DataStream).

use crate::buffer::DEFAULT_MAX_GAP_FILL;

/// Default cap on retained bytes per stream (16 MiB).
pub const DEFAULT_MAX_RETAINED_BYTES: usize = 16 * 1024 * 1024;

/// Smallest accepted retained-bytes cap.
pub const MIN_RETAINED_BYTES: usize = 64;

/// Default number of stalled passes tolerated before a forced resync.
pub const DEFAULT_MAX_STUCK_COUNT: u32 = 3;

/// Limits applied by a [`DataStream`](super::DataStream).
///
/// # Examples
///
/// ```
/// use traceframe::StreamConfig;
///
/// let config = StreamConfig::default()
///     .max_retained_bytes(1024 * 1024)
///     .max_gap_fill(4096)
///     .max_stuck_count(5);
///
/// assert_eq!(config.max_retained_bytes, 1024 * 1024);
/// assert_eq!(config.max_stuck_count, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Upper bound on bytes held by the chunk buffer, including the consumed
    /// prefix of the head chunk. Appends that would exceed it are rejected.
    ///
    /// Default: 16 MiB.
    pub max_retained_bytes: usize,

    /// Upper bound on placeholder bytes inserted for one gap.
    ///
    /// Default: 1 MiB.
    pub max_gap_fill: usize,

    /// Consecutive stalled passes tolerated before the next pass with new
    /// bytes forces a resynchronisation past the stalled message. A pass
    /// over an unchanged buffer is not counted. Only applies when resync is
    /// requested.
    ///
    /// Default: 3.
    pub max_stuck_count: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_retained_bytes: DEFAULT_MAX_RETAINED_BYTES,
            max_gap_fill: DEFAULT_MAX_GAP_FILL,
            max_stuck_count: DEFAULT_MAX_STUCK_COUNT,
        }
    }
}

impl StreamConfig {
    /// Set the retained-bytes cap, clamped to at least
    /// [`MIN_RETAINED_BYTES`].
    #[must_use]
    pub fn max_retained_bytes(mut self, bytes: usize) -> Self {
        self.max_retained_bytes = bytes.max(MIN_RETAINED_BYTES);
        self
    }

    /// Set the per-gap placeholder cap.
    #[must_use]
    pub fn max_gap_fill(mut self, bytes: usize) -> Self {
        self.max_gap_fill = bytes;
        self
    }

    /// Set the stalled-pass threshold, clamped to at least one.
    #[must_use]
    pub fn max_stuck_count(mut self, count: u32) -> Self {
        self.max_stuck_count = count.max(1);
        self
    }
}
