//! Host / on-disk byte order conversion
//!
//! Archives store every multi-byte scalar big-endian regardless of host.
//! These are pure conversions resolved at compile time; on a big-endian
//! host they reduce to identity. Floating-point conversion is a
//! bit-reinterpretation byte swap, never a numeric conversion.

use byteorder::{BigEndian, ByteOrder};

/// Convert a u16 to its on-disk bytes.
#[inline]
pub fn disk_u16(v: u16) -> [u8; 2] {
    let mut bytes = [0u8; 2];
    BigEndian::write_u16(&mut bytes, v);
    bytes
}

/// Convert on-disk bytes to a host u16.
#[inline]
pub fn host_u16(bytes: [u8; 2]) -> u16 {
    BigEndian::read_u16(&bytes)
}

/// Convert a u32 to its on-disk bytes.
#[inline]
pub fn disk_u32(v: u32) -> [u8; 4] {
    let mut bytes = [0u8; 4];
    BigEndian::write_u32(&mut bytes, v);
    bytes
}

/// Convert on-disk bytes to a host u32.
#[inline]
pub fn host_u32(bytes: [u8; 4]) -> u32 {
    BigEndian::read_u32(&bytes)
}

/// Convert a u64 to its on-disk bytes.
#[inline]
pub fn disk_u64(v: u64) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    BigEndian::write_u64(&mut bytes, v);
    bytes
}

/// Convert on-disk bytes to a host u64.
#[inline]
pub fn host_u64(bytes: [u8; 8]) -> u64 {
    BigEndian::read_u64(&bytes)
}

/// Convert an i16 to its on-disk bytes.
#[inline]
pub fn disk_i16(v: i16) -> [u8; 2] {
    disk_u16(v as u16)
}

/// Convert on-disk bytes to a host i16.
#[inline]
pub fn host_i16(bytes: [u8; 2]) -> i16 {
    host_u16(bytes) as i16
}

/// Convert an i32 to its on-disk bytes.
#[inline]
pub fn disk_i32(v: i32) -> [u8; 4] {
    disk_u32(v as u32)
}

/// Convert on-disk bytes to a host i32.
#[inline]
pub fn host_i32(bytes: [u8; 4]) -> i32 {
    host_u32(bytes) as i32
}

/// Convert an i64 to its on-disk bytes.
#[inline]
pub fn disk_i64(v: i64) -> [u8; 8] {
    disk_u64(v as u64)
}

/// Convert on-disk bytes to a host i64.
#[inline]
pub fn host_i64(bytes: [u8; 8]) -> i64 {
    host_u64(bytes) as i64
}

/// Convert an f32 to its on-disk bytes (bit pattern, not value).
#[inline]
pub fn disk_f32(v: f32) -> [u8; 4] {
    disk_u32(v.to_bits())
}

/// Convert on-disk bytes to a host f32.
#[inline]
pub fn host_f32(bytes: [u8; 4]) -> f32 {
    f32::from_bits(host_u32(bytes))
}

/// Convert an f64 to its on-disk bytes (bit pattern, not value).
#[inline]
pub fn disk_f64(v: f64) -> [u8; 8] {
    disk_u64(v.to_bits())
}

/// Convert on-disk bytes to a host f64.
#[inline]
pub fn host_f64(bytes: [u8; 8]) -> f64 {
    f64::from_bits(host_u64(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_disk_layout() {
        // On-disk order is fixed: most significant byte first.
        assert_eq!(disk_u32(0x01020304), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(host_u32([0x01, 0x02, 0x03, 0x04]), 0x01020304);
    }

    #[test]
    fn test_u16_roundtrip() {
        for v in [0u16, 1, 0x00FF, 0xFF00, u16::MAX] {
            assert_eq!(host_u16(disk_u16(v)), v);
        }
    }

    #[test]
    fn test_u64_disk_layout() {
        assert_eq!(
            disk_u64(0x0102030405060708),
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
        );
    }

    #[test]
    fn test_signed_roundtrip() {
        assert_eq!(host_i16(disk_i16(-2)), -2);
        assert_eq!(host_i32(disk_i32(i32::MIN)), i32::MIN);
        assert_eq!(host_i64(disk_i64(-1)), -1);
    }

    #[test]
    fn test_float_is_bit_exact() {
        for v in [0.0f32, -0.0, 1.5, f32::MIN_POSITIVE, f32::INFINITY] {
            assert_eq!(host_f32(disk_f32(v)).to_bits(), v.to_bits());
        }
        let nan = f32::from_bits(0x7FC0_0001);
        assert_eq!(host_f32(disk_f32(nan)).to_bits(), nan.to_bits());

        for v in [0.0f64, -1.0e300, std::f64::consts::PI] {
            assert_eq!(host_f64(disk_f64(v)).to_bits(), v.to_bits());
        }
    }

    #[test]
    fn test_f64_disk_layout() {
        // 1.0f64 has bit pattern 0x3FF0000000000000.
        assert_eq!(disk_f64(1.0), [0x3F, 0xF0, 0, 0, 0, 0, 0, 0]);
    }
}
