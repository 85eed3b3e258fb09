//! Print datums into s-expressions.
//!
//! A [`Printer`] receives one call per token shape and decides on layout;
//! [`Print`] implementations decide which tokens a value consists of.
//! The simple printer writes the canonical single-line form, while the
//! pretty printer breaks long aggregates over several lines. Both produce
//! text that reads back to an equal [`Datum`].
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use bigdecimal::BigDecimal;

use crate::datum::{Datum, Sign};
use crate::escape::escape_char;

mod pretty;
mod simple;
pub use pretty::to_string_pretty;
pub use simple::{to_string, write, SimplePrinter};

/// Trait for types that can print s-expressions.
pub trait Printer: Sized {
    type Error;

    /// Print a token verbatim.
    fn atom(&mut self, atom: &str) -> Result<(), Self::Error>;

    /// Print a symbol, between vertical bars when it is not a simple name.
    fn symbol(&mut self, symbol: &str) -> Result<(), Self::Error>;

    /// Print a string.
    fn string(&mut self, string: &str) -> Result<(), Self::Error>;

    /// Print a list given a function that prints the contents.
    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Print a vector given a function that prints the contents.
    fn vector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Print a bytevector given a function that prints the contents.
    fn bytevector<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Print `prefix` immediately followed by the single value printed by `f`.
    fn prefixed<F>(&mut self, prefix: &str, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Print the dot separating a dotted list from its tail.
    fn dot(&mut self) -> Result<(), Self::Error> {
        self.atom(".")
    }

    /// Print a printable value.
    fn print(&mut self, value: impl Print) -> Result<(), Self::Error> {
        value.print(self)
    }
}

/// Trait for types that can be printed as an s-expression.
pub trait Print {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error>;
}

impl<T: Print + ?Sized> Print for &T {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        (**self).print(printer)
    }
}

impl<T: Print + ?Sized> Print for Box<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print + ?Sized> Print for Rc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print + ?Sized> Print for Arc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print> Print for [T] {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        for item in self {
            printer.print(item)?;
        }
        Ok(())
    }
}

impl<T: Print> Print for Vec<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_slice())
    }
}

impl Print for Datum {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        if let Some((abbreviation, operand)) = self.as_abbreviation() {
            return printer.prefixed(abbreviation.prefix(), |p| p.print(operand));
        }

        match self {
            Datum::Boolean(true) => printer.atom("#t"),
            Datum::Boolean(false) => printer.atom("#f"),
            Datum::Character(c) => printer.atom(&escape_char(c.as_char())),
            Datum::Number(number) => printer.atom(&format_number(number)),
            Datum::Infinity(Sign::Positive) => printer.atom("+inf.0"),
            Datum::Infinity(Sign::Negative) => printer.atom("-inf.0"),
            Datum::NaN => printer.atom("+nan.0"),
            Datum::String(string) => printer.string(string),
            Datum::Symbol(symbol) => printer.symbol(symbol.as_str()),
            Datum::List(items) => printer.list(|p| p.print(items)),
            Datum::DottedList(list) => printer.list(|p| {
                p.print(list.head())?;
                p.dot()?;
                p.print(list.tail())
            }),
            Datum::Vector(items) => printer.vector(|p| p.print(items)),
            Datum::Bytevector(bytes) => printer.bytevector(|p| {
                bytes
                    .iter()
                    .try_for_each(|byte| p.atom(&byte.to_string()))
            }),
        }
    }
}

/// Longest run of zeros [`format_number`] pads with before switching to
/// exponent notation.
const MAX_PADDING: u64 = 20;

/// Formats a number in decimal notation.
///
/// The number of fractional digits follows the scale, so `42.0` keeps its
/// trailing zero while `1e3` prints as `1000`. Numbers that would need more
/// than [`MAX_PADDING`] zeros print as their unscaled digits and an exponent
/// instead, as in `1e400` or `-125e-31`.
pub fn format_number(number: &BigDecimal) -> String {
    let (value, scale) = number.as_bigint_and_exponent();
    let negative = value.sign() == num_bigint::Sign::Minus;
    let digits = value.magnitude().to_string();
    let sign = if negative { "-" } else { "" };

    let padding = if scale <= 0 {
        scale.unsigned_abs()
    } else {
        scale.unsigned_abs().saturating_sub(digits.len() as u64 - 1)
    };
    if padding > MAX_PADDING {
        return format!("{sign}{digits}e{}", -i128::from(scale));
    }

    if scale <= 0 {
        let zeros = "0".repeat(padding as usize);
        return format!("{sign}{digits}{zeros}");
    }

    let scale = scale as usize;
    let digits = if digits.len() <= scale {
        format!("{}{digits}", "0".repeat(scale + 1 - digits.len()))
    } else {
        digits
    };
    let (whole, fraction) = digits.split_at(digits.len() - scale);
    format!("{sign}{whole}.{fraction}")
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::{format_number, to_string, to_string_pretty};
    use crate::datum::{Datum, Sign};
    use crate::from_str;
    use bigdecimal::BigDecimal;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("42", "42")]
    #[case("42.0", "42.0")]
    #[case("-0.005", "-0.005")]
    #[case("1e3", "1000")]
    #[case("-12.5", "-12.5")]
    #[case("0", "0")]
    #[case("0.50", "0.50")]
    #[case("123456789012345678901234567890", "123456789012345678901234567890")]
    #[case("1e20", "100000000000000000000")]
    #[case("1e21", "1e21")]
    #[case("1e-20", "0.00000000000000000001")]
    #[case("1e-21", "1e-21")]
    #[case("1e400", "1e400")]
    #[case("-12.5e-30", "-125e-31")]
    #[case("1234.5e-26", "12345e-27")]
    #[case("1e100000000000000000", "1e100000000000000000")]
    #[case("1e-100000000000000000", "1e-100000000000000000")]
    fn test_format_number(#[case] number: &str, #[case] expected: &str) {
        assert_eq!(
            expected,
            format_number(&BigDecimal::from_str(number).unwrap())
        );
    }

    #[rstest]
    #[case(Datum::Boolean(true), "#t")]
    #[case(Datum::Boolean(false), "#f")]
    #[case(Datum::character(0x41).unwrap(), r"#\A")]
    #[case(Datum::character(0x7).unwrap(), r"#\alarm")]
    #[case(Datum::from(-7), "-7")]
    #[case(Datum::Infinity(Sign::Positive), "+inf.0")]
    #[case(Datum::Infinity(Sign::Negative), "-inf.0")]
    #[case(Datum::NaN, "+nan.0")]
    #[case(Datum::string("a\nb"), r#""a\nb""#)]
    #[case(Datum::symbol("hello world"), "|hello world|")]
    #[case(Datum::list(Vec::new()), "()")]
    #[case(
        Datum::list([Datum::Boolean(true), Datum::from(42), Datum::Boolean(false)]),
        "(#t 42 #f)"
    )]
    #[case(
        Datum::vector([Datum::Boolean(true), Datum::from(42), Datum::Boolean(false)]),
        "#(#t 42 #f)"
    )]
    #[case(
        Datum::dotted_list([Datum::Boolean(true)], Datum::Boolean(false)).unwrap(),
        "(#t . #f)"
    )]
    #[case(Datum::bytevector([0, 1, 255]), "#u8(0 1 255)")]
    #[case(Datum::bytevector(Vec::new()), "#u8()")]
    #[case(
        Datum::list([Datum::symbol("quote"), Datum::symbol("a")]),
        "'a"
    )]
    #[case(
        Datum::list([
            Datum::symbol("quasiquote"),
            Datum::list([
                Datum::symbol("a"),
                Datum::list([Datum::symbol("unquote"), Datum::symbol("b")]),
                Datum::list([Datum::symbol("unquote-splicing"), Datum::symbol("c")]),
            ]),
        ]),
        "`(a ,b ,@c)"
    )]
    #[case(
        Datum::list([Datum::symbol("quote"), Datum::symbol("a"), Datum::symbol("b")]),
        "(quote a b)"
    )]
    fn test_to_string(#[case] datum: Datum, #[case] expected: &str) {
        assert_eq!(expected, to_string(&datum));
        assert_eq!(expected, datum.to_string());
    }

    #[test]
    fn test_pretty_breaks_long_lists() {
        let datum = from_str("(define (f x) (if (zero? x) 1 (* x (f (- x 1)))))").unwrap();

        let wide = to_string_pretty(&datum, 120);
        assert_eq!(to_string(&datum), wide);

        let narrow = to_string_pretty(&datum, 16);
        assert!(narrow.lines().count() > 1);
        assert!(narrow.lines().skip(1).all(|line| line.starts_with("  ")));
        assert_eq!(datum, from_str(&narrow).unwrap());
    }

    #[test]
    fn test_pretty_keeps_prefixes_attached() {
        let datum = from_str("'(alpha beta gamma delta . epsilon)").unwrap();
        let narrow = to_string_pretty(&datum, 10);
        assert!(narrow.starts_with("'(alpha"));
        assert_eq!(datum, from_str(&narrow).unwrap());
    }
}
