#![cfg_attr(not(test), no_std)]

use core::str::Utf8Error;

// replace anything outside printable ascii so identifiers are safe to print
pub fn remove_invalid_utf8(buffer: &mut [u8]) {
    for byte in buffer.iter_mut() {
        if *byte > 0x7F {
            *byte = 42; // change to star character.
        }
    }
}

pub fn str_from_utf8(buffer: &mut [u8]) -> Result<&str, Utf8Error> {
    remove_invalid_utf8(buffer);
    core::str::from_utf8(buffer)
}

/// Length of a NUL terminated field, or the whole field when no NUL is present.
pub fn nul_terminated_len(buffer: &[u8]) -> usize {
    buffer.iter().position(|b| *b == b'\0').unwrap_or(buffer.len())
}

/// Copies `value` into a fixed width field, truncating if needed and filling the rest with NUL.
/// Returns the number of bytes copied.
pub fn copy_nul_padded(field: &mut [u8], value: &[u8]) -> usize {
    let count = value.len().min(field.len());
    field[..count].copy_from_slice(&value[..count]);
    field[count..].fill(b'\0');
    count
}

/// Single byte additive checksum, the sum of all bytes mod 256.
pub fn additive_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_invalid_utf8() {
        let mut buffer = [b'o', b'k', 0xC3, 0xA9];
        assert_eq!("ok**", str_from_utf8(&mut buffer).unwrap());
    }

    #[test]
    fn test_nul_terminated_len() {
        assert_eq!(6, nul_terminated_len(b"MyWifi\0\0\0"));
        assert_eq!(3, nul_terminated_len(b"abc"));
        assert_eq!(0, nul_terminated_len(b"\0abc"));
    }

    #[test]
    fn test_copy_nul_padded() {
        let mut field = [b'x'; 8];
        assert_eq!(3, copy_nul_padded(&mut field, b"abc"));
        assert_eq!(b"abc\0\0\0\0\0", &field);

        assert_eq!(8, copy_nul_padded(&mut field, b"0123456789"));
        assert_eq!(b"01234567", &field);
    }

    #[test]
    fn test_additive_checksum_wraps() {
        assert_eq!(0, additive_checksum(&[]));
        assert_eq!(0x5A + 0xA5, additive_checksum(&[0x5A, 0xA5]) as u16);
        assert_eq!(0x04, additive_checksum(&[0xFF, 0xFF, 0x06]));
    }
}
