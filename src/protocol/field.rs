//! Field codec
//!
//! Fixed-width integer fields. Every field on the wire, in both directions,
//! is little-endian.

use crate::error::{Result, VaultError};

/// Width of a fixed-size integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// Version, opcode
    One = 1,
    /// Name length, status
    Two = 2,
    /// User id, file size
    Four = 4,
}

impl FieldWidth {
    /// Number of bytes the field occupies
    pub const fn len(self) -> usize {
        self as usize
    }

    /// Largest value the field can carry
    pub const fn max_value(self) -> u64 {
        match self {
            FieldWidth::One => u8::MAX as u64,
            FieldWidth::Two => u16::MAX as u64,
            FieldWidth::Four => u32::MAX as u64,
        }
    }
}

/// Encode `value` as a little-endian field of the given width
pub fn encode_field(value: u64, width: FieldWidth) -> Result<Vec<u8>> {
    if value > width.max_value() {
        return Err(VaultError::FieldOverflow {
            value,
            width: width.len(),
        });
    }
    Ok(value.to_le_bytes()[..width.len()].to_vec())
}

/// Decode a little-endian field of the given width
///
/// `bytes` must be exactly `width` bytes long.
pub fn decode_field(bytes: &[u8], width: FieldWidth) -> Result<u64> {
    if bytes.len() != width.len() {
        return Err(VaultError::Protocol(format!(
            "Field width mismatch: expected {} bytes, got {}",
            width.len(),
            bytes.len()
        )));
    }

    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(u64::from_le_bytes(buf))
}
