//! The datum value model.
//!
//! A [`Datum`] is an immutable tree. Aggregates own their children and the
//! whole tree is built bottom-up, so values can be cloned and shared freely
//! between threads.
use bigdecimal::BigDecimal;
use delegate::delegate;
use smol_str::SmolStr;
use std::fmt;
use unicode_general_category::{get_general_category, GeneralCategory};

/// An s-expression datum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datum {
    Boolean(bool),
    Character(Character),
    /// An exact or inexact real, compared by numeric value (`1` equals `1.0`).
    Number(BigDecimal),
    Infinity(Sign),
    /// Not-a-number. The sign of the source literal is dropped.
    NaN,
    String(SmolStr),
    Symbol(Symbol),
    /// A proper list, possibly empty.
    List(Vec<Datum>),
    DottedList(DottedList),
    Vector(Box<[Datum]>),
    Bytevector(Box<[u8]>),
}

impl Datum {
    pub fn symbol(name: impl Into<SmolStr>) -> Self {
        Datum::Symbol(Symbol::new(name))
    }

    pub fn string(value: impl Into<SmolStr>) -> Self {
        Datum::String(value.into())
    }

    pub fn number(value: impl Into<BigDecimal>) -> Self {
        Datum::Number(value.into())
    }

    /// Creates a character datum, failing for code points that are not
    /// assigned unicode scalar values.
    pub fn character(code_point: u32) -> Result<Self, RangeError> {
        Character::new(code_point).map(Datum::Character)
    }

    pub fn list(items: impl IntoIterator<Item = Datum>) -> Self {
        Datum::List(items.into_iter().collect())
    }

    /// Creates a dotted list `(head ... . tail)`, failing when `head` is empty.
    pub fn dotted_list(
        head: impl IntoIterator<Item = Datum>,
        tail: Datum,
    ) -> Result<Self, EmptyHeadError> {
        DottedList::new(head.into_iter().collect(), tail).map(Datum::DottedList)
    }

    pub fn vector(items: impl IntoIterator<Item = Datum>) -> Self {
        Datum::Vector(items.into_iter().collect())
    }

    pub fn bytevector(bytes: impl IntoIterator<Item = u8>) -> Self {
        Datum::Bytevector(bytes.into_iter().collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Datum::Character(character) => Some(character.as_char()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            Datum::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::String(string) => Some(string.as_str()),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Datum::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Datum]> {
        match self {
            Datum::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dotted_list(&self) -> Option<&DottedList> {
        match self {
            Datum::DottedList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[Datum]> {
        match self {
            Datum::Vector(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Datum::Bytevector(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the abbreviation and its operand when this datum is a
    /// two-element list headed by `quote`, `quasiquote`, `unquote` or
    /// `unquote-splicing`.
    pub fn as_abbreviation(&self) -> Option<(Abbreviation, &Datum)> {
        match self.as_list()? {
            [Datum::Symbol(head), operand] => {
                Abbreviation::from_name(head.as_str()).map(|abbrev| (abbrev, operand))
            }
            _ => None,
        }
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Boolean(value)
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Number(value.into())
    }
}

impl From<BigDecimal> for Datum {
    fn from(value: BigDecimal) -> Self {
        Datum::Number(value)
    }
}

impl From<Character> for Datum {
    fn from(value: Character) -> Self {
        Datum::Character(value)
    }
}

impl From<Symbol> for Datum {
    fn from(value: Symbol) -> Self {
        Datum::Symbol(value)
    }
}

impl From<DottedList> for Datum {
    fn from(value: DottedList) -> Self {
        Datum::DottedList(value)
    }
}

/// A character datum. Holds only assigned unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Character(char);

impl Character {
    pub fn new(code_point: u32) -> Result<Self, RangeError> {
        char::from_u32(code_point)
            .ok_or(RangeError::CodePoint(code_point))
            .and_then(Self::try_from)
    }

    #[inline]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<char> for Character {
    type Error = RangeError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        if is_assigned(value) {
            Ok(Self(value))
        } else {
            Err(RangeError::CodePoint(value as u32))
        }
    }
}

/// Whether `c` has a general category other than `Cn` (unassigned).
pub fn is_assigned(c: char) -> bool {
    get_general_category(c) != GeneralCategory::Unassigned
}

/// Sign of an infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn as_char(self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }
}

/// A symbol, compared by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(SmolStr);

impl Symbol {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn into_inner(self) -> SmolStr {
        self.0
    }

    delegate! {
        to self.0 {
            pub fn as_str(&self) -> &str;
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
        }
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<SmolStr> for Symbol {
    fn from(value: SmolStr) -> Self {
        Self(value)
    }
}

impl fmt::Display for Symbol {
    /// Displays the raw name. Use the printer for the escaped form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An improper list with at least one element before the dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DottedList {
    head: Vec<Datum>,
    tail: Box<Datum>,
}

impl DottedList {
    pub fn new(head: Vec<Datum>, tail: Datum) -> Result<Self, EmptyHeadError> {
        if head.is_empty() {
            return Err(EmptyHeadError);
        }

        Ok(Self {
            head,
            tail: Box::new(tail),
        })
    }

    pub fn head(&self) -> &[Datum] {
        &self.head
    }

    pub fn tail(&self) -> &Datum {
        &self.tail
    }

    pub fn into_parts(self) -> (Vec<Datum>, Datum) {
        (self.head, *self.tail)
    }
}

/// The quote-family shorthands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abbreviation {
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
}

impl Abbreviation {
    /// Name of the symbol the abbreviation expands to.
    pub fn name(self) -> &'static str {
        match self {
            Abbreviation::Quote => "quote",
            Abbreviation::Quasiquote => "quasiquote",
            Abbreviation::Unquote => "unquote",
            Abbreviation::UnquoteSplicing => "unquote-splicing",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Abbreviation::Quote => "'",
            Abbreviation::Quasiquote => "`",
            Abbreviation::Unquote => ",",
            Abbreviation::UnquoteSplicing => ",@",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quote" => Some(Abbreviation::Quote),
            "quasiquote" => Some(Abbreviation::Quasiquote),
            "unquote" => Some(Abbreviation::Unquote),
            "unquote-splicing" => Some(Abbreviation::UnquoteSplicing),
            _ => None,
        }
    }

    /// Expands the abbreviation around `operand`.
    pub fn expand(self, operand: Datum) -> Datum {
        Datum::List(vec![Datum::symbol(self.name()), operand])
    }
}

/// A value outside the range its datum kind allows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("code point {0:#x} is not an assigned unicode scalar value")]
    CodePoint(u32),
    #[error("bytevector element {0} is not an exact integer in 0..=255")]
    Byte(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a dotted list needs at least one element before the dot")]
pub struct EmptyHeadError;

#[cfg(any(test, feature = "proptest"))]
mod arbitrary {
    use super::{Character, Datum, DottedList, Sign};
    use bigdecimal::BigDecimal;
    use proptest::arbitrary::Arbitrary;
    use proptest::prelude::*;

    impl Arbitrary for Character {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            any::<char>()
                .prop_filter_map("unassigned code point", |c| Character::try_from(c).ok())
                .boxed()
        }
    }

    impl Arbitrary for Datum {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            let number = (any::<i64>(), -400..400i64)
                .prop_map(|(digits, scale)| Datum::Number(BigDecimal::new(digits.into(), scale)));

            let leaf = prop_oneof![
                any::<bool>().prop_map(Datum::Boolean),
                any::<Character>().prop_map(Datum::Character),
                number,
                Just(Datum::Infinity(Sign::Positive)),
                Just(Datum::Infinity(Sign::Negative)),
                Just(Datum::NaN),
                any::<String>().prop_map(|s| Datum::string(s)),
                any::<String>().prop_map(|s| Datum::symbol(s)),
                proptest::collection::vec(any::<u8>(), 0..8).prop_map(|bytes| Datum::bytevector(bytes)),
            ];

            leaf.prop_recursive(6, 128, 8, |inner| {
                prop_oneof![
                    proptest::collection::vec(inner.clone(), 0..8).prop_map(Datum::List),
                    proptest::collection::vec(inner.clone(), 0..8).prop_map(|items| Datum::vector(items)),
                    (proptest::collection::vec(inner.clone(), 1..6), inner).prop_filter_map(
                        "empty head",
                        |(head, tail)| DottedList::new(head, tail).ok().map(Datum::DottedList)
                    ),
                ]
            })
            .boxed()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn numbers_ignore_scale() {
        let one = Datum::number(BigDecimal::from_str("1").unwrap());
        let one_point_zero = Datum::number(BigDecimal::from_str("1.000").unwrap());
        assert_eq!(one, one_point_zero);
    }

    #[test]
    fn dotted_list_requires_head() {
        assert_eq!(
            Err(EmptyHeadError),
            Datum::dotted_list(Vec::new(), Datum::Boolean(false))
        );
        assert!(Datum::dotted_list([Datum::Boolean(true)], Datum::Boolean(false)).is_ok());
    }

    #[rstest]
    #[case(0xD800)]
    #[case(0x110000)]
    #[case(0x0378)]
    #[case(0xE0080)]
    fn rejects_undefined_characters(#[case] code_point: u32) {
        assert_eq!(
            Err(RangeError::CodePoint(code_point)),
            Character::new(code_point)
        );
    }

    #[rstest]
    #[case(0x0)]
    #[case(0x41)]
    #[case(0x1F600)]
    #[case(0xE000)]
    fn accepts_assigned_characters(#[case] code_point: u32) {
        let character = Character::new(code_point).unwrap();
        assert_eq!(code_point, character.as_char() as u32);
    }

    #[test]
    fn abbreviation_needs_exactly_two_elements() {
        let quoted = Abbreviation::Quote.expand(Datum::symbol("a"));
        assert_eq!(
            Some((Abbreviation::Quote, &Datum::symbol("a"))),
            quoted.as_abbreviation()
        );

        let three = Datum::list([Datum::symbol("quote"), Datum::from(1), Datum::from(2)]);
        assert_eq!(None, three.as_abbreviation());
        assert_eq!(None, Datum::list([Datum::symbol("quote")]).as_abbreviation());
    }

    #[test]
    fn accessors_match_variant() {
        let vector = Datum::vector([Datum::from(true)]);
        assert_eq!(Some(&[Datum::Boolean(true)][..]), vector.as_vector());
        assert_eq!(None, vector.as_list());
        assert_eq!(Some("a"), Datum::string("a").as_str());
        assert_eq!(None, Datum::symbol("a").as_str());
        assert_eq!(Some(&[1u8, 2][..]), Datum::bytevector([1, 2]).as_bytes());
    }

    mod roundtrip {
        use crate::{from_str, to_string, to_string_pretty, Datum};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn print_then_parse(datum: Datum) {
                let sexp = to_string(&datum);
                prop_assert_eq!(datum, from_str(&sexp).unwrap());
            }

            #[test]
            fn pretty_print_then_parse(datum: Datum, width in 0..120usize) {
                let sexp = to_string_pretty(&datum, width);
                prop_assert_eq!(datum, from_str(&sexp).unwrap());
            }
        }
    }
}
