//! Conversions between stored value bytes and the text or bytes staged in an
//! editable data widget.

use crate::domain::ValueKind;

use super::error::CodecError;

/// The editable form of a value's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staged {
    /// Field text. String lists hold one entry per line.
    Text(String),
    /// Raw bytes driven by the byte-buffer editor.
    Bytes(Vec<u8>),
}

pub fn decode(kind: ValueKind, data: &[u8]) -> Result<Staged, CodecError> {
    match kind {
        ValueKind::Dword => {
            let value = data
                .get(..4)
                .map(|raw| u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
                .unwrap_or(0);
            Ok(Staged::Text(format!("0x{value:x}")))
        }
        ValueKind::String | ValueKind::ExpandString => {
            let units = utf16_units(data);
            let end = units.iter().position(|unit| *unit == 0).unwrap_or(units.len());
            let text = String::from_utf16(&units[..end])
                .map_err(|err| CodecError::malformed(kind, err.to_string()))?;
            Ok(Staged::Text(text))
        }
        ValueKind::MultiString => {
            let mut text = String::new();
            for entry in utf16_units(data).split(|unit| *unit == 0) {
                if entry.is_empty() {
                    break;
                }
                let decoded = String::from_utf16(entry)
                    .map_err(|err| CodecError::malformed(kind, err.to_string()))?;
                text.push_str(&decoded);
                text.push('\n');
            }
            Ok(Staged::Text(text))
        }
        ValueKind::Binary => Ok(Staged::Bytes(data.to_vec())),
    }
}

pub fn encode(kind: ValueKind, staged: &Staged) -> Result<Vec<u8>, CodecError> {
    match (kind, staged) {
        (ValueKind::Dword, Staged::Text(text)) => {
            let base = if has_hex_prefix(text) { 16 } else { 10 };
            let value = parse_ulong(text, base) as u32;
            Ok(value.to_le_bytes().to_vec())
        }
        (ValueKind::String | ValueKind::ExpandString, Staged::Text(text)) => {
            let mut out = Vec::new();
            push_utf16z(&mut out, trim_spaces(text));
            Ok(out)
        }
        (ValueKind::MultiString, Staged::Text(text)) => {
            let mut out = Vec::new();
            for row in text.lines().map(trim_spaces).filter(|row| !row.is_empty()) {
                push_utf16z(&mut out, row);
            }
            out.extend_from_slice(&[0, 0]);
            Ok(out)
        }
        (ValueKind::Binary, Staged::Bytes(bytes)) => Ok(bytes.clone()),
        (ValueKind::Binary, Staged::Text(_)) => Err(CodecError::Mismatch {
            kind,
            expected: "bytes",
        }),
        (_, Staged::Bytes(_)) => Err(CodecError::Mismatch {
            kind,
            expected: "text",
        }),
    }
}

/// Trims leading and trailing blanks, leaving other whitespace alone.
pub fn trim_spaces(text: &str) -> &str {
    text.trim_matches(' ')
}

/// Integer text is hexadecimal only when its very first characters are `0x`.
pub fn has_hex_prefix(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'0' && bytes[1].eq_ignore_ascii_case(&b'x')
}

/// Lenient unsigned parse in the manner of C's `strtoul`.
///
/// Leading whitespace and a sign are accepted, parsing stops at the first
/// character that is not a digit of `base`, text without digits yields 0,
/// and overflow saturates at `u64::MAX`. A leading `-` negates modulo 2^64.
pub fn parse_ulong(text: &str, base: u32) -> u64 {
    let mut rest = text.trim_start();
    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };
    if base == 16
        && has_hex_prefix(rest)
        && rest[2..].starts_with(|ch: char| ch.is_ascii_hexdigit())
    {
        rest = &rest[2..];
    }

    let mut value: u64 = 0;
    let mut overflow = false;
    for digit in rest.chars().map_while(|ch| ch.to_digit(base)) {
        match value
            .checked_mul(u64::from(base))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(next) => value = next,
            None => overflow = true,
        }
    }

    if overflow {
        u64::MAX
    } else if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

fn push_utf16z(out: &mut Vec<u8>, text: &str) {
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out.extend_from_slice(&[0, 0]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16z(parts: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for part in parts {
            push_utf16z(&mut out, part);
        }
        out
    }

    #[test]
    fn dword_decodes_as_hex_text() {
        let staged = decode(ValueKind::Dword, &26u32.to_le_bytes()).unwrap();
        assert_eq!(staged, Staged::Text("0x1a".to_string()));
        assert_eq!(
            decode(ValueKind::Dword, &[1, 2]).unwrap(),
            Staged::Text("0x0".to_string()),
            "short data reads as zero"
        );
    }

    #[test]
    fn dword_round_trips_through_text() {
        let raw = 0xdead_beefu32.to_le_bytes().to_vec();
        let staged = decode(ValueKind::Dword, &raw).unwrap();
        assert_eq!(encode(ValueKind::Dword, &staged).unwrap(), raw);
    }

    #[test]
    fn dword_encode_picks_base_from_prefix() {
        let hex = encode(ValueKind::Dword, &Staged::Text("0X1A".into())).unwrap();
        assert_eq!(hex, 26u32.to_le_bytes());
        let dec = encode(ValueKind::Dword, &Staged::Text("26   ".into())).unwrap();
        assert_eq!(dec, 26u32.to_le_bytes());
    }

    #[test]
    fn dword_encode_is_lenient_with_garbage() {
        let raw = encode(ValueKind::Dword, &Staged::Text("bogus".into())).unwrap();
        assert_eq!(raw, 0u32.to_le_bytes());
        // an indented hex literal is read in base 10 and stops at the 'x'
        let raw = encode(ValueKind::Dword, &Staged::Text(" 0x10".into())).unwrap();
        assert_eq!(raw, 0u32.to_le_bytes());
    }

    #[test]
    fn parse_ulong_mirrors_strtoul() {
        assert_eq!(parse_ulong("  42abc", 10), 42);
        assert_eq!(parse_ulong("0x", 16), 0);
        assert_eq!(parse_ulong("ff", 16), 255);
        assert_eq!(parse_ulong("-1", 10), u64::MAX);
        assert_eq!(parse_ulong("99999999999999999999999", 10), u64::MAX);
        assert_eq!(parse_ulong("", 10), 0);
    }

    #[test]
    fn string_round_trips_and_encode_trims() {
        let raw = utf16z(&["bar"]);
        let staged = decode(ValueKind::String, &raw).unwrap();
        assert_eq!(staged, Staged::Text("bar".into()));
        assert_eq!(encode(ValueKind::String, &staged).unwrap(), raw);
        assert_eq!(
            encode(ValueKind::ExpandString, &Staged::Text("  bar  ".into())).unwrap(),
            raw
        );
    }

    #[test]
    fn string_decode_drops_padding_after_terminator() {
        let mut raw = utf16z(&["päth"]);
        raw.extend_from_slice(&[0, 0, 0, 0, 7]);
        assert_eq!(
            decode(ValueKind::ExpandString, &raw).unwrap(),
            Staged::Text("päth".into())
        );
    }

    #[test]
    fn string_decode_rejects_lone_surrogate() {
        let raw = vec![0x00, 0xd8, 0x41, 0x00];
        assert!(matches!(
            decode(ValueKind::String, &raw),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn multi_string_round_trips() {
        let mut raw = utf16z(&["one", "two words", "three"]);
        raw.extend_from_slice(&[0, 0]);
        let staged = decode(ValueKind::MultiString, &raw).unwrap();
        assert_eq!(staged, Staged::Text("one\ntwo words\nthree\n".into()));
        assert_eq!(encode(ValueKind::MultiString, &staged).unwrap(), raw);
    }

    #[test]
    fn multi_string_encode_skips_blank_rows() {
        let staged = Staged::Text("  alpha \n\n   \nbeta".into());
        let mut expected = utf16z(&["alpha", "beta"]);
        expected.extend_from_slice(&[0, 0]);
        assert_eq!(encode(ValueKind::MultiString, &staged).unwrap(), expected);
        assert_eq!(
            encode(ValueKind::MultiString, &Staged::Text(String::new())).unwrap(),
            vec![0, 0]
        );
    }

    #[test]
    fn binary_is_identity_and_rejects_text() {
        let raw = vec![0, 1, 2, 0xff];
        let staged = decode(ValueKind::Binary, &raw).unwrap();
        assert_eq!(encode(ValueKind::Binary, &staged).unwrap(), raw);
        assert!(matches!(
            encode(ValueKind::Binary, &Staged::Text("00".into())),
            Err(CodecError::Mismatch { .. })
        ));
        assert!(matches!(
            encode(ValueKind::String, &Staged::Bytes(raw)),
            Err(CodecError::Mismatch { .. })
        ));
    }
}
