//! Helpers for the fixed-width integer encodings found in traced wire formats.
//!
//! HTTP/2 frame headers use network byte order (big-endian) with a 24-bit
//! length field, while MySQL packet headers carry a 24-bit little-endian
//! payload length. Keeping the conversions here scopes the Clippy
//! expectations to the conversion points.

/// Parse a network-order 24-bit unsigned integer.
///
/// # Examples
///
/// ```
/// use traceframe::byte_order::read_network_u24;
///
/// assert_eq!(read_network_u24([0x00, 0x40, 0x00]), 0x4000);
/// ```
#[must_use]
pub fn read_network_u24(bytes: [u8; 3]) -> u32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
}

/// Serialise the low 24 bits of `value` in network byte order.
///
/// # Examples
///
/// ```
/// use traceframe::byte_order::write_network_u24;
///
/// assert_eq!(write_network_u24(0x0012_3456), [0x12, 0x34, 0x56]);
/// ```
#[must_use]
pub fn write_network_u24(value: u32) -> [u8; 3] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    let [_, a, b, c] = value.to_be_bytes();
    [a, b, c]
}

/// Parse a network-order `u32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use traceframe::byte_order::read_network_u32;
///
/// assert_eq!(read_network_u32([0x12, 0x34, 0x56, 0x78]), 0x1234_5678);
/// ```
#[must_use]
pub fn read_network_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u32::from_be_bytes(bytes)
}

/// Serialise a `u32` in network byte order (big-endian).
#[must_use]
pub fn write_network_u32(value: u32) -> [u8; 4] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a little-endian 24-bit unsigned integer.
///
/// # Examples
///
/// ```
/// use traceframe::byte_order::read_le_u24;
///
/// assert_eq!(read_le_u24([0x21, 0x00, 0x00]), 0x21);
/// ```
#[must_use]
pub fn read_le_u24(bytes: [u8; 3]) -> u32 { u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]) }

/// Serialise the low 24 bits of `value` in little-endian order.
#[must_use]
pub fn write_le_u24(value: u32) -> [u8; 3] {
    let [a, b, c, _] = value.to_le_bytes();
    [a, b, c]
}

#[cfg(test)]
mod tests {
    //! Round-trip tests for the 24- and 32-bit conversion helpers.

    use rstest::rstest;

    use super::{
        read_le_u24,
        read_network_u24,
        read_network_u32,
        write_le_u24,
        write_network_u24,
        write_network_u32,
    };

    #[rstest]
    #[case::network_u24(
        0x12_3456u32,
        &write_network_u24(0x12_3456)[..],
        &[0x12, 0x34, 0x56],
        read_network_u24([0x12, 0x34, 0x56])
    )]
    #[case::network_u32(
        0x1234_5678u32,
        &write_network_u32(0x1234_5678)[..],
        &[0x12, 0x34, 0x56, 0x78],
        read_network_u32([0x12, 0x34, 0x56, 0x78])
    )]
    #[case::le_u24(
        0x12_3456u32,
        &write_le_u24(0x12_3456)[..],
        &[0x56, 0x34, 0x12],
        read_le_u24([0x56, 0x34, 0x12])
    )]
    fn byte_order_round_trip(
        #[case] value: u32,
        #[case] written: &[u8],
        #[case] expected_bytes: &[u8],
        #[case] read_back: u32,
    ) {
        assert_eq!(written, expected_bytes);
        assert_eq!(read_back, value);
    }

    #[test]
    fn u24_writers_drop_high_byte() {
        assert_eq!(write_network_u24(0xff12_3456), [0x12, 0x34, 0x56]);
        assert_eq!(write_le_u24(0xff12_3456), [0x56, 0x34, 0x12]);
    }
}
