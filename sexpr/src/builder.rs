//! Assembles datums from a stream of grammar events.
//!
//! The builder keeps a stack of open scopes. Leaves are appended to the
//! innermost scope, [`Event::Enter`] opens a new scope and [`Event::Exit`]
//! closes it into a single aggregate that is appended to its parent.
//! Abbreviations and datum comments rewrite or drop the value that was
//! appended last, so a grammar emits them *after* the datum they apply to.
//!
//! Any grammar can drive the builder; the one in this crate is only one
//! producer of [`Event`]s.
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::datum::{Abbreviation, Character, Datum, DottedList, RangeError, Symbol};
use crate::escape::unescape;
use crate::literal::{
    decode_boolean, decode_char_literal, decode_flonum, decode_hex_char, decode_integer,
    decode_named_char, special_number, strip_delimiters,
};
use crate::parser::{ParseError, Result};

/// Kinds of leaf productions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaf {
    Boolean,
    /// `#\c`
    Character,
    /// `#\newline` and friends.
    NamedCharacter,
    /// `#\xHEX`
    HexCharacter,
    /// An integer in any radix, with its optional `#b`/`#o`/`#d`/`#x` prefix.
    Integer,
    Flonum,
    String,
    Identifier,
    /// `|...|`
    EscapedIdentifier,
}

/// Kinds of aggregate productions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    List,
    DottedList,
    Vector,
    Bytevector,
}

/// One event produced by a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A leaf with its exact source text.
    Leaf(Leaf, &'a str),
    Enter,
    Exit(Aggregate),
    /// Wraps the last datum as `(quote datum)` etc.
    Abbreviation(Abbreviation),
    /// Drops the last datum.
    DatumComment,
}

/// Builds a single datum from a stream of [`Event`]s.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    scopes: Vec<Vec<Datum>>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            scopes: vec![Vec::new()],
        }
    }

    /// Applies one event.
    pub fn push(&mut self, event: Event<'_>) -> Result<()> {
        match event {
            Event::Leaf(leaf, text) => {
                let datum = decode_leaf(leaf, text)?;
                self.append(datum)
            }
            Event::Enter => {
                self.scopes.push(Vec::new());
                Ok(())
            }
            Event::Exit(aggregate) => {
                if self.scopes.len() < 2 {
                    return Err(inconsistent("exit without a matching enter"));
                }

                let items = self.scopes.pop().unwrap_or_default();
                let datum = assemble(aggregate, items)?;
                self.append(datum)
            }
            Event::Abbreviation(abbreviation) => {
                let operand = self.pop_value("abbreviation")?;
                self.append(abbreviation.expand(operand))
            }
            Event::DatumComment => {
                self.pop_value("datum comment")?;
                Ok(())
            }
        }
    }

    /// Returns the single datum that was built.
    pub fn finish(mut self) -> Result<Datum> {
        if self.scopes.len() != 1 {
            return Err(inconsistent(format!(
                "{} scopes are still open",
                self.scopes.len() - 1
            )));
        }

        let mut root = self.scopes.pop().unwrap_or_default();
        if root.len() != 1 {
            return Err(inconsistent(format!(
                "expected exactly one datum, found {}",
                root.len()
            )));
        }

        root.pop().ok_or_else(|| inconsistent("root scope is empty"))
    }

    fn append(&mut self, datum: Datum) -> Result<()> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| inconsistent("no open scope"))?;
        scope.push(datum);
        Ok(())
    }

    fn pop_value(&mut self, context: &str) -> Result<Datum> {
        self.scopes
            .last_mut()
            .and_then(Vec::pop)
            .ok_or_else(|| inconsistent(format!("{context} has no datum to apply to")))
    }
}

/// Builds a datum from a complete event stream.
pub fn build<'a>(events: impl IntoIterator<Item = Event<'a>>) -> Result<Datum> {
    let mut builder = TreeBuilder::new();
    for event in events {
        builder.push(event)?;
    }
    builder.finish()
}

/// Decodes the text of a leaf production.
pub fn decode_leaf(leaf: Leaf, text: &str) -> Result<Datum> {
    let datum = match leaf {
        Leaf::Boolean => Datum::Boolean(decode_boolean(text)?),
        Leaf::Character => Datum::Character(Character::new(decode_char_literal(text)?)?),
        Leaf::NamedCharacter => Datum::Character(Character::new(decode_named_char(text)?)?),
        Leaf::HexCharacter => Datum::Character(Character::new(decode_hex_char(text)?)?),
        Leaf::Integer => Datum::Number(decode_integer(text)?),
        Leaf::Flonum => Datum::Number(decode_flonum(text)?),
        Leaf::String => Datum::String(unescape(strip_delimiters(text, '"')?)?.into()),
        Leaf::Identifier => special_number(text).unwrap_or_else(|| Datum::symbol(text)),
        Leaf::EscapedIdentifier => {
            Datum::Symbol(Symbol::new(unescape(strip_delimiters(text, '|')?)?))
        }
    };

    Ok(datum)
}

fn assemble(aggregate: Aggregate, mut items: Vec<Datum>) -> Result<Datum> {
    match aggregate {
        Aggregate::List => Ok(Datum::List(items)),
        Aggregate::DottedList => {
            let tail = items
                .pop()
                .ok_or_else(|| inconsistent("dotted list without a tail"))?;
            DottedList::new(items, tail)
                .map(Datum::DottedList)
                .map_err(|err| inconsistent(err.to_string()))
        }
        Aggregate::Vector => Ok(Datum::Vector(items.into())),
        Aggregate::Bytevector => {
            let bytes = items.iter().map(to_byte).collect::<Result<Box<[u8]>, _>>()?;
            Ok(Datum::Bytevector(bytes))
        }
    }
}

fn to_byte(datum: &Datum) -> Result<u8, RangeError> {
    let byte = match datum {
        Datum::Number(number) => small_integer(number).and_then(|n| n.to_u8()),
        _ => None,
    };
    byte.ok_or_else(|| RangeError::Byte(datum.to_string()))
}

/// Returns `number` as an integer when it is one with at most three digits.
///
/// The digit count is read off the unscaled value and the exponent, so
/// numbers like `1e100000000000000000` are rejected without being expanded.
fn small_integer(number: &BigDecimal) -> Option<BigInt> {
    let (value, scale) = number.as_bigint_and_exponent();
    if value.is_zero() {
        return Some(value);
    }

    let digits = i64::try_from(value.magnitude().to_string().len()).ok()?;
    let whole = digits.checked_sub(scale)?;
    if !(1..=3).contains(&whole) {
        return None;
    }

    let ten = BigInt::from(10u8);
    if scale <= 0 {
        Some(value * ten.pow(u32::try_from(scale.unsigned_abs()).ok()?))
    } else {
        let divisor = ten.pow(u32::try_from(scale).ok()?);
        (&value % &divisor).is_zero().then(|| value / divisor)
    }
}

fn inconsistent(message: impl Into<String>) -> ParseError {
    let message = message.into();
    tracing::debug!(%message, "tree builder stack is inconsistent");
    ParseError::Internal(message)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datum::Sign;
    use rstest::rstest;

    fn leaf(leaf: Leaf, text: &str) -> Event<'_> {
        Event::Leaf(leaf, text)
    }

    #[test]
    fn builds_nested_aggregates() {
        let datum = build([
            Event::Enter,
            leaf(Leaf::Boolean, "#t"),
            Event::Enter,
            leaf(Leaf::Integer, "1"),
            leaf(Leaf::Integer, "2"),
            Event::Exit(Aggregate::Vector),
            Event::Enter,
            leaf(Leaf::Identifier, "a"),
            leaf(Leaf::Identifier, "b"),
            Event::Exit(Aggregate::DottedList),
            Event::Exit(Aggregate::List),
        ])
        .unwrap();

        assert_eq!(
            Datum::list([
                Datum::Boolean(true),
                Datum::vector([Datum::from(1), Datum::from(2)]),
                Datum::dotted_list([Datum::symbol("a")], Datum::symbol("b")).unwrap(),
            ]),
            datum
        );
    }

    #[test]
    fn abbreviation_wraps_last_datum() {
        let datum = build([
            Event::Enter,
            leaf(Leaf::Identifier, "a"),
            Event::Abbreviation(Abbreviation::Quote),
            Event::Abbreviation(Abbreviation::Quasiquote),
            Event::Exit(Aggregate::List),
        ])
        .unwrap();

        let expected = Datum::list([Datum::list([
            Datum::symbol("quasiquote"),
            Datum::list([Datum::symbol("quote"), Datum::symbol("a")]),
        ])]);
        assert_eq!(expected, datum);
    }

    #[test]
    fn datum_comment_drops_last_datum() {
        let datum = build([
            Event::Enter,
            leaf(Leaf::Integer, "1"),
            Event::Enter,
            leaf(Leaf::Integer, "2"),
            Event::Exit(Aggregate::List),
            Event::DatumComment,
            leaf(Leaf::Integer, "3"),
            Event::Exit(Aggregate::List),
        ])
        .unwrap();

        assert_eq!(Datum::list([Datum::from(1), Datum::from(3)]), datum);
    }

    #[test]
    fn bytevector_accepts_exact_bytes() {
        let datum = build([
            Event::Enter,
            leaf(Leaf::Integer, "0"),
            leaf(Leaf::Integer, "#xff"),
            leaf(Leaf::Flonum, "7.0"),
            leaf(Leaf::Flonum, "25e1"),
            leaf(Leaf::Flonum, "0e100000000000000000"),
            leaf(Leaf::Flonum, "12000e-2"),
            Event::Exit(Aggregate::Bytevector),
        ])
        .unwrap();

        assert_eq!(Datum::bytevector([0, 255, 7, 250, 0, 120]), datum);
    }

    #[rstest]
    #[case(leaf(Leaf::Integer, "256"))]
    #[case(leaf(Leaf::Integer, "-1"))]
    #[case(leaf(Leaf::Flonum, "1.5"))]
    #[case(leaf(Leaf::Identifier, "a"))]
    #[case(leaf(Leaf::Identifier, "+inf.0"))]
    #[case(leaf(Leaf::Flonum, "1e30"))]
    #[case(leaf(Leaf::Flonum, "1e100000000000000000"))]
    #[case(leaf(Leaf::Flonum, "1e-100000000000000000"))]
    #[case(leaf(Leaf::Flonum, "-1e-100000000000000000"))]
    #[case(leaf(Leaf::Flonum, "2560e-1"))]
    #[case(leaf(Leaf::Flonum, "0.5"))]
    fn bytevector_rejects_non_bytes(#[case] element: Event<'static>) {
        let result = build([Event::Enter, element, Event::Exit(Aggregate::Bytevector)]);
        assert!(matches!(result, Err(ParseError::Range(RangeError::Byte(_)))));
    }

    #[test]
    fn identifiers_decode_special_numbers() {
        assert_eq!(
            Datum::Infinity(Sign::Negative),
            decode_leaf(Leaf::Identifier, "-inf.0").unwrap()
        );
        assert_eq!(Datum::NaN, decode_leaf(Leaf::Identifier, "-nan.0").unwrap());
        assert_eq!(
            Datum::symbol("+inf.0"),
            decode_leaf(Leaf::EscapedIdentifier, "|+inf.0|").unwrap()
        );
    }

    #[test]
    fn characters_must_be_assigned() {
        assert!(matches!(
            decode_leaf(Leaf::HexCharacter, r"#\x378"),
            Err(ParseError::Range(RangeError::CodePoint(0x378)))
        ));
        assert!(matches!(
            decode_leaf(Leaf::HexCharacter, r"#\xD800"),
            Err(ParseError::Range(RangeError::CodePoint(0xD800)))
        ));
    }

    #[test]
    fn bad_escapes_are_reported() {
        assert!(matches!(
            decode_leaf(Leaf::String, r#""a\qb""#),
            Err(ParseError::Escape(_))
        ));
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![leaf(Leaf::Integer, "1"), leaf(Leaf::Integer, "2")])]
    #[case(vec![Event::Enter, leaf(Leaf::Integer, "1")])]
    #[case(vec![Event::Exit(Aggregate::List)])]
    #[case(vec![Event::DatumComment])]
    #[case(vec![Event::Abbreviation(Abbreviation::Quote)])]
    #[case(vec![Event::Enter, leaf(Leaf::Integer, "1"), Event::Exit(Aggregate::DottedList)])]
    #[case(vec![Event::Enter, Event::Exit(Aggregate::DottedList)])]
    fn inconsistent_streams_fail(#[case] events: Vec<Event<'static>>) {
        assert!(matches!(build(events), Err(ParseError::Internal(_))));
    }
}
