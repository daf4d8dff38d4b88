//! Metric helpers for `traceframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled every helper compiles to a no-op.

use crate::Direction;

/// Name of the counter tracking frames emitted by the reconstruction loop.
pub const FRAMES_PARSED: &str = "traceframe_frames_parsed_total";
/// Name of the counter tracking successful resynchronisations.
pub const RESYNCS_TOTAL: &str = "traceframe_resyncs_total";
/// Name of the counter tracking bytes skipped while resynchronising.
pub const BYTES_DISCARDED: &str = "traceframe_bytes_discarded_total";
/// Name of the counter tracking `Invalid` verdicts.
pub const INVALID_TOTAL: &str = "traceframe_invalid_total";
/// Name of the counter tracking rejected appends and trims.
pub const STREAM_ERRORS: &str = "traceframe_stream_errors_total";

/// Record frames emitted for `protocol` in `direction`.
pub fn inc_frames(protocol: &'static str, direction: Direction, count: usize) {
    #[cfg(feature = "metrics")]
    metrics::counter!(
        FRAMES_PARSED,
        "protocol" => protocol,
        "direction" => direction.as_str()
    )
    .increment(count as u64);
    #[cfg(not(feature = "metrics"))]
    let _ = (protocol, direction, count);
}

/// Record one resynchronisation that skipped `discarded` bytes.
pub fn inc_resync(protocol: &'static str, discarded: usize) {
    #[cfg(feature = "metrics")]
    {
        metrics::counter!(RESYNCS_TOTAL, "protocol" => protocol).increment(1);
        metrics::counter!(BYTES_DISCARDED, "protocol" => protocol).increment(discarded as u64);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = (protocol, discarded);
}

/// Record an `Invalid` verdict from the grammar parser.
pub fn inc_invalid(protocol: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(INVALID_TOTAL, "protocol" => protocol).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = protocol;
}

/// Record a stream-level error of the given kind.
pub fn inc_stream_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(STREAM_ERRORS, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}
