//! Escaping and unescaping of strings, symbols and characters.
use logos::Logos;
use std::fmt::{self, Write as _};

use crate::literal::NAMED_CHARS;

/// Lexer token for the body of an escaped string or symbol.
#[derive(Debug, Clone, Logos)]
enum EscapedToken {
    #[token(r"\a", |_| '\u{7}')]
    #[token(r"\b", |_| '\u{8}')]
    #[token(r"\n", |_| '\n')]
    #[token(r"\r", |_| '\r')]
    #[token(r"\t", |_| '\t')]
    #[token(r#"\""#, |_| '"')]
    #[token(r"\|", |_| '|')]
    #[token(r"\\", |_| '\\')]
    Escaped(char),

    #[regex(r"\\[xX][0-9a-fA-F]+;", |lex| parse_hex(lex.slice()))]
    Hex(char),

    #[regex(r"\\[ \t]*(\r\n|\n|\r)[ \t]*")]
    LineContinuation,

    #[regex(r"[^\\]+")]
    Literal,
}

/// Parses an escape of the form `\xHEX;`.
fn parse_hex(str: &str) -> Option<char> {
    // Skip the '\x' prefix and ';' suffix
    let hex = str.get(2..str.len() - 1)?;
    let code = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(code)
}

/// A malformed escape sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscapeError {
    #[error("unknown escape sequence `{sequence}` at offset {offset}")]
    Unknown { sequence: String, offset: usize },
    #[error("hex escape `{sequence}` at offset {offset} is not a unicode scalar value")]
    InvalidHex { sequence: String, offset: usize },
}

/// Replaces escape sequences with their corresponding characters.
///
/// `str` is the body of a string or `|symbol|` without its delimiters.
pub fn unescape(str: &str) -> Result<String, EscapeError> {
    let mut lexer = EscapedToken::lexer(str);
    let mut output = String::with_capacity(str.len());

    while let Some(token) = lexer.next() {
        let Ok(token) = token else {
            let sequence = lexer.slice().to_string();
            let offset = lexer.span().start;
            return Err(if sequence.starts_with(r"\x") || sequence.starts_with(r"\X") {
                EscapeError::InvalidHex { sequence, offset }
            } else {
                EscapeError::Unknown { sequence, offset }
            });
        };

        match token {
            EscapedToken::Escaped(c) => output.push(c),
            EscapedToken::Hex(c) => output.push(c),
            EscapedToken::LineContinuation => {}
            EscapedToken::Literal => output.push_str(lexer.slice()),
        }
    }

    Ok(output)
}

/// Writes `str` between `quote` characters, escaping `quote`, the backslash
/// and control characters.
pub fn write_escaped<W: fmt::Write>(out: &mut W, str: &str, quote: char) -> fmt::Result {
    out.write_char(quote)?;

    for c in str.chars() {
        match c {
            '\\' => out.write_str(r"\\")?,
            c if c == quote => {
                out.write_char('\\')?;
                out.write_char(c)?;
            }
            '\u{7}' => out.write_str(r"\a")?,
            '\u{8}' => out.write_str(r"\b")?,
            '\t' => out.write_str(r"\t")?,
            '\n' => out.write_str(r"\n")?,
            '\r' => out.write_str(r"\r")?,
            c if c.is_control() => write!(out, r"\x{:02x};", c as u32)?,
            c => out.write_char(c)?,
        }
    }

    out.write_char(quote)
}

pub fn escape_string(str: &str) -> String {
    let mut output = String::with_capacity(str.len() + 2);
    let _ = write_escaped(&mut output, str, '"');
    output
}

pub fn escape_symbol(str: &str) -> String {
    if is_simple_symbol(str) {
        return str.to_string();
    }

    let mut output = String::with_capacity(str.len() + 2);
    let _ = write_escaped(&mut output, str, '|');
    output
}

pub fn escape_char(c: char) -> String {
    if let Some((name, _)) = NAMED_CHARS.iter().find(|(_, named)| *named == c) {
        format!(r"#\{name}")
    } else if c.is_control() {
        format!(r"#\x{:02x}", c as u32)
    } else {
        format!(r"#\{c}")
    }
}

/// Spellings that read back as numbers rather than symbols.
const NUMERIC_SPELLINGS: [&str; 6] = ["+inf.0", "-inf.0", "+nan.0", "-nan.0", "+i", "-i"];

/// Whether a symbol name can be written without vertical bars.
pub fn is_simple_symbol(name: &str) -> bool {
    let mut chars = name.chars();

    let simple = match chars.next() {
        None => false,
        Some(c) if is_initial(c) => chars.all(is_subsequent),
        Some('+' | '-') => match chars.next() {
            None => true,
            Some('.') => chars.next().is_some_and(is_dot_subsequent) && chars.all(is_subsequent),
            Some(c) if is_sign_subsequent(c) => chars.all(is_subsequent),
            Some(_) => false,
        },
        Some('.') => chars.next().is_some_and(is_dot_subsequent) && chars.all(is_subsequent),
        Some(_) => false,
    };

    simple
        && !NUMERIC_SPELLINGS
            .iter()
            .any(|spelling| spelling.eq_ignore_ascii_case(name))
}

fn is_initial(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(
            c,
            '!' | '$' | '%' | '&' | '*' | '/' | ':' | '<' | '=' | '>' | '?' | '^' | '_' | '~'
        )
}

fn is_subsequent(c: char) -> bool {
    is_initial(c) || c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | '@')
}

fn is_sign_subsequent(c: char) -> bool {
    is_initial(c) || matches!(c, '+' | '-' | '@')
}

fn is_dot_subsequent(c: char) -> bool {
    is_sign_subsequent(c) || c == '.'
}

#[cfg(test)]
mod test {
    use super::{escape_char, escape_string, escape_symbol, unescape, EscapeError};
    use rstest::rstest;

    #[rstest]
    #[case("string", "string")]
    #[case("call-with-current-continuation", "call-with-current-continuation")]
    #[case("+", "+")]
    #[case("-", "-")]
    #[case("...", "...")]
    #[case("->x", "->x")]
    #[case("+.a", "+.a")]
    #[case("a@b", "a@b")]
    #[case("\n", r#"|\n|"#)]
    #[case(r"\", r#"|\\|"#)]
    #[case("", r#"||"#)]
    #[case(".", r#"|.|"#)]
    #[case("+.", r#"|+.|"#)]
    #[case("1a", r#"|1a|"#)]
    #[case("+1", r#"|+1|"#)]
    #[case("hello world", r#"|hello world|"#)]
    #[case("a|b", r#"|a\|b|"#)]
    #[case("a\"b", r#"|a"b|"#)]
    #[case("[", r#"|[|"#)]
    #[case("λ", r#"|λ|"#)]
    #[case("+inf.0", r#"|+inf.0|"#)]
    #[case("-INF.0", r#"|-INF.0|"#)]
    #[case("+nan.0", r#"|+nan.0|"#)]
    #[case("-nan.0", r#"|-nan.0|"#)]
    #[case("+i", r#"|+i|"#)]
    #[case("-I", r#"|-I|"#)]
    #[case("+inf.0x", "+inf.0x")]
    fn test_escape_symbol(#[case] string: &str, #[case] expected: &str) {
        assert_eq!(expected, escape_symbol(string));
    }

    #[rstest]
    #[case("a\nb", r#""a\nb""#)]
    #[case("a\"b", r#""a\"b""#)]
    #[case("a|b", r#""a|b""#)]
    #[case(r"a\b", r#""a\\b""#)]
    #[case("\u{7}\u{8}\t\r", r#""\a\b\t\r""#)]
    #[case("\u{0}\u{1b}\u{7f}\u{85}", r#""\x00;\x1b;\x7f;\x85;""#)]
    #[case("\u{1F60A}", "\"\u{1F60A}\"")]
    fn test_escape_string(#[case] string: &str, #[case] expected: &str) {
        assert_eq!(expected, escape_string(string));
    }

    #[rstest]
    #[case('a', r"#\a")]
    #[case('(', r"#\(")]
    #[case(' ', r"#\space")]
    #[case('\n', r"#\newline")]
    #[case('\u{0}', r"#\null")]
    #[case('\u{7f}', r"#\delete")]
    #[case('\u{1b}', r"#\escape")]
    #[case('\u{1}', r"#\x01")]
    #[case('\u{9f}', r"#\x9f")]
    #[case('\u{1F600}', "#\\\u{1F600}")]
    fn test_escape_char(#[case] c: char, #[case] expected: &str) {
        assert_eq!(expected, escape_char(c));
    }

    #[rstest]
    #[case(r#"\""#, r#"""#)]
    #[case(r"\|", "|")]
    #[case(r"\\", r"\")]
    #[case(r"a\nb", "a\nb")]
    #[case(r"\a\b\t\r", "\u{7}\u{8}\t\r")]
    #[case(r"\x42;", "B")]
    #[case(r"\X42;", "B")]
    #[case(r"\x1F60A;", "\u{1F60A}")]
    #[case("\\  \n  b", "b")]
    #[case("a\\\r\n\tb", "ab")]
    #[case("a\nb", "a\nb")]
    fn test_unescape(#[case] escaped: &str, #[case] expected: &str) {
        assert_eq!(expected, unescape(escaped).unwrap());
    }

    #[rstest]
    #[case(r"\q")]
    #[case(r"abc\")]
    #[case("\\  b")]
    fn test_unescape_unknown(#[case] escaped: &str) {
        assert!(matches!(
            unescape(escaped),
            Err(EscapeError::Unknown { .. })
        ));
    }

    #[rstest]
    #[case(r"\xD800;")]
    #[case(r"\x110000;")]
    #[case(r"\xFFFFFFFFFF;")]
    fn test_unescape_invalid_hex(#[case] escaped: &str) {
        assert!(matches!(
            unescape(escaped),
            Err(EscapeError::InvalidHex { .. })
        ));
    }
}
