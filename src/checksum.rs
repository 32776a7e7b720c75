//! Masked CRC-32C checksums used by the record framing.
//!
//! Each frame stores CRC-32C (Castagnoli) checksums in a "masked" form: the raw
//! CRC is rotated right by 15 bits and offset by a fixed constant. The transform
//! is part of the wire format and must match bit-for-bit.

/// Constant added to the rotated CRC.
pub const MASK_DELTA: u32 = 0xA282_EAD8;

/// Computes the masked CRC-32C of `data`.
///
/// Total over any input, including the empty slice.
pub fn masked_crc32c(data: &[u8]) -> u32 {
    mask(crc32c::crc32c(data))
}

/// Applies the masking transform to a raw CRC-32C value.
pub fn mask(crc: u32) -> u32 {
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Inverts [`mask`], recovering the raw CRC-32C value.
pub fn unmask(masked: u32) -> u32 {
    masked.wrapping_sub(MASK_DELTA).rotate_left(15)
}
