//! Scheme datums as a data format.
//!
//! # Syntax
//!
//! This crate reads and writes the external representation of Scheme data
//! as described in the R7RS report:
//!
//! - **Booleans** are `#t`, `#f`, `#true` and `#false`, in any case.
//!
//! - **Numbers** are exact decimals of arbitrary precision. Integers may carry
//!   a radix prefix `#b`, `#o`, `#d` or `#x`; decimals may have a fraction and
//!   an exponent. `+inf.0`, `-inf.0` and `+nan.0` denote the special values.
//!
//! - **Characters** are written `#\c`, `#\name` for one of `alarm`,
//!   `backspace`, `delete`, `escape`, `newline`, `null`, `return`, `space` and
//!   `tab`, or `#\xHEX`.
//!
//! - **Strings** are enclosed within double quotes. Within strings, `\"`, `\\`,
//!   `\|`, `\a`, `\b`, `\t`, `\n` and `\r` have their usual meaning, `\xHEX;`
//!   stands for a unicode scalar value and a backslash at the end of a line
//!   joins it with the next one.
//!
//! - **Symbols** are identifiers such as `lambda`, `list->vector` or `...`.
//!   Any other name can be written between vertical bars, as in `|hello world|`,
//!   with the same escapes as strings.
//!
//! - **Lists** are sequences of datums delimited by `(` and `)`. A list may
//!   end in `. datum` to form a dotted list. Vectors are delimited by `#(`
//!   and `)`, bytevectors by `#u8(` and `)`.
//!
//! - **Abbreviations** `'d`, `` `d ``, `,d` and `,@d` stand for the lists
//!   `(quote d)`, `(quasiquote d)`, `(unquote d)` and `(unquote-splicing d)`.
//!
//! - **Comments** begin with a `;` and extend to the end of the line, are
//!   enclosed within `#|` and `|#` (and may nest), or are written `#;` to
//!   skip the datum that follows.
//!
//! Identifiers, numbers, booleans, characters and `.` end at whitespace, a
//! parenthesis, a quote, a vertical bar, a comment or the end of input, so
//! `(#t42)` is an error rather than two datums. Numbers are written in plain
//! decimal unless that would take more than twenty padding zeros, in which
//! case they are written with an exponent, as in `1e400`.
//!
//! # Example
//!
//! ```
//! use sexpr::{from_str, to_string, Datum};
//!
//! let datum = from_str("(a . #(1 2.50 #\\x))").unwrap();
//! assert_eq!(Some(&Datum::symbol("a")), datum.as_dotted_list().map(|l| &l.head()[0]));
//! assert_eq!("(a . #(1 2.50 #\\x))", to_string(&datum));
//! ```

pub mod builder;
pub mod datum;
pub mod escape;
pub(crate) mod lexer;
pub mod literal;
pub mod parser;
pub mod printer;

pub use builder::{Event, TreeBuilder};
pub use datum::{Abbreviation, Character, Datum, DottedList, Sign, Symbol};
pub use parser::{from_str, ParseError, SyntaxError};
pub use printer::{to_string, to_string_pretty};
