// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

//! Wire integer codec.
//!
//! The base unit encodes integers as fixed-width text over the alphabet
//! `0123456789:;<=>?`, where each symbol's value is its offset from `'0'`.
//! Query responses use lowercase `a-f` for 10-15 instead, so decoding
//! accepts both forms.

use crate::error::{LifeSosError, Result};

/// Encode `value` as `width` wire symbols, most significant first.
///
/// Higher-order digits that do not fit in `width` are dropped.
pub fn encode(value: u32, width: usize) -> String {
    let mut symbols = vec!['0'; width];
    let mut remaining = value;
    for slot in symbols.iter_mut().rev() {
        *slot = char::from(b'0' + (remaining % 16) as u8);
        remaining /= 16;
    }
    symbols.into_iter().collect()
}

/// Decode wire symbols into an integer.
pub fn decode(text: &str) -> Result<u32> {
    let mut result: u32 = 0;
    for ch in text.chars() {
        let digit = digit_value(ch).ok_or_else(|| {
            LifeSosError::format(format!("invalid character '{ch}' in wire integer '{text}'"))
        })?;
        result = result
            .checked_mul(16)
            .and_then(|r| r.checked_add(digit))
            .ok_or_else(|| LifeSosError::format(format!("wire integer '{text}' is too large")))?;
    }
    Ok(result)
}

/// Whether `text` would decode successfully.
pub fn is_wire_integer(text: &str) -> bool {
    decode(text).is_ok()
}

fn digit_value(ch: char) -> Option<u32> {
    match ch {
        '0'..='?' => Some(ch as u32 - '0' as u32),
        'a'..='f' => Some(ch as u32 - 'a' as u32 + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(0, 2), "00");
        assert_eq!(encode(10, 1), ":");
        assert_eq!(encode(0x1410, 4), "141:");
        assert_eq!(encode(255, 2), "??");
        assert_eq!(encode(5, 0), "");
    }

    #[test]
    fn test_encode_uses_wire_alphabet_only() {
        for value in 0..256 {
            assert!(encode(value, 2).chars().all(|c| ('0'..='?').contains(&c)));
        }
    }

    #[test]
    fn test_decode_both_forms() {
        assert_eq!(decode("14?").unwrap(), 0x14f);
        assert_eq!(decode("14f").unwrap(), 0x14f);
        assert_eq!(decode("0a40").unwrap(), 0x0a40);
        assert_eq!(decode("").unwrap(), 0);
    }

    #[test]
    fn test_decode_rejects_other_characters() {
        assert!(decode("0g").is_err());
        assert!(decode("F").is_err());
        assert!(decode("@").is_err());
        assert!(decode(" 1").is_err());
    }

    #[test]
    fn test_roundtrip_all_three_digit_values() {
        for value in 0..16u32.pow(3) {
            assert_eq!(decode(&encode(value, 3)).unwrap(), value);
        }
    }

    #[test]
    fn test_is_wire_integer() {
        assert!(is_wire_integer("1a:"));
        assert!(!is_wire_integer("xyz"));
    }
}
