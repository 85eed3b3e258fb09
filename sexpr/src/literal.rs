//! Interpretation of boolean, character and numeric literals.
//!
//! Every function takes the exact source slice matched by the grammar,
//! including prefixes such as `#\` or `#x`.
use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::datum::{Datum, Sign};

/// Character names accepted after `#\` and used by the writer.
pub const NAMED_CHARS: [(&str, char); 9] = [
    ("alarm", '\u{7}'),
    ("backspace", '\u{8}'),
    ("delete", '\u{7f}'),
    ("escape", '\u{1b}'),
    ("newline", '\n'),
    ("null", '\u{0}'),
    ("return", '\r'),
    ("space", ' '),
    ("tab", '\t'),
];

/// A literal whose text does not have the shape of its production.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("malformed boolean literal `{0}`")]
    Boolean(String),
    #[error("malformed character literal `{0}`")]
    Character(String),
    #[error("malformed numeric literal `{0}`")]
    Number(String),
    #[error("literal `{0}` is missing its delimiters")]
    Delimiters(String),
}

/// Looks up a character name, ignoring ASCII case.
pub fn named_char(name: &str) -> Option<char> {
    NAMED_CHARS
        .iter()
        .find(|(named, _)| named.eq_ignore_ascii_case(name))
        .map(|(_, c)| *c)
}

pub fn decode_boolean(text: &str) -> Result<bool, LiteralError> {
    if text.eq_ignore_ascii_case("#t") || text.eq_ignore_ascii_case("#true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("#f") || text.eq_ignore_ascii_case("#false") {
        Ok(false)
    } else {
        Err(LiteralError::Boolean(text.to_string()))
    }
}

/// Decodes `#\c` into the code point of `c`.
pub fn decode_char_literal(text: &str) -> Result<u32, LiteralError> {
    let mut chars = text
        .strip_prefix(r"#\")
        .ok_or_else(|| LiteralError::Character(text.to_string()))?
        .chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u32),
        _ => Err(LiteralError::Character(text.to_string())),
    }
}

/// Decodes `#\name` for one of the [`NAMED_CHARS`].
pub fn decode_named_char(text: &str) -> Result<u32, LiteralError> {
    text.strip_prefix(r"#\")
        .and_then(named_char)
        .map(|c| c as u32)
        .ok_or_else(|| LiteralError::Character(text.to_string()))
}

/// Decodes `#\xHEX`. The result may still lie outside the scalar values.
pub fn decode_hex_char(text: &str) -> Result<u32, LiteralError> {
    text.strip_prefix(r"#\x")
        .or_else(|| text.strip_prefix(r"#\X"))
        .filter(|hex| !hex.is_empty())
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .ok_or_else(|| LiteralError::Character(text.to_string()))
}

/// Splits an optional `#b`, `#o`, `#d` or `#x` prefix off a numeric literal.
pub fn split_radix(text: &str) -> (u32, &str) {
    let radix = match text.as_bytes() {
        [b'#', b'b' | b'B', ..] => 2,
        [b'#', b'o' | b'O', ..] => 8,
        [b'#', b'd' | b'D', ..] => 10,
        [b'#', b'x' | b'X', ..] => 16,
        _ => return (10, text),
    };

    (radix, &text[2..])
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

/// Decodes an integer literal of any radix into an exact decimal.
pub fn decode_integer(text: &str) -> Result<BigDecimal, LiteralError> {
    let malformed = || LiteralError::Number(text.to_string());
    let (radix, body) = split_radix(text);
    let (negative, digits) = split_sign(body);

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(malformed());
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(malformed)?;
    let value = if negative { -magnitude } else { magnitude };
    Ok(BigDecimal::new(value, 0))
}

/// Decodes a decimal literal with a fraction and/or an exponent.
pub fn decode_flonum(text: &str) -> Result<BigDecimal, LiteralError> {
    let malformed = || LiteralError::Number(text.to_string());
    let (radix, body) = split_radix(text);
    if radix != 10 {
        return Err(malformed());
    }

    let (negative, body) = split_sign(body);
    let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(index) => {
            let exponent: i64 = body[index + 1..].parse().map_err(|_| malformed())?;
            (&body[..index], exponent)
        }
        None => (body, 0),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{fraction}");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(malformed)?;
    let scale = i64::try_from(fraction.len())
        .ok()
        .and_then(|len| len.checked_sub(exponent))
        .ok_or_else(malformed)?;
    let value = if negative { -magnitude } else { magnitude };
    Ok(BigDecimal::new(value, scale))
}

/// Recognises the identifiers `+inf.0`, `-inf.0`, `+nan.0` and `-nan.0`.
pub fn special_number(text: &str) -> Option<Datum> {
    if text.eq_ignore_ascii_case("+inf.0") {
        Some(Datum::Infinity(Sign::Positive))
    } else if text.eq_ignore_ascii_case("-inf.0") {
        Some(Datum::Infinity(Sign::Negative))
    } else if text.eq_ignore_ascii_case("+nan.0") || text.eq_ignore_ascii_case("-nan.0") {
        Some(Datum::NaN)
    } else {
        None
    }
}

/// Strips the delimiters of a string or `|symbol|` literal.
pub fn strip_delimiters(text: &str, delimiter: char) -> Result<&str, LiteralError> {
    text.strip_prefix(delimiter)
        .and_then(|inner| inner.strip_suffix(delimiter))
        .ok_or_else(|| LiteralError::Delimiters(text.to_string()))
}
