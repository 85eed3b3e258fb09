//! Parse datums from s-expressions.
use std::fmt::Display;
use std::ops::Range;
use std::str::FromStr;

use crate::builder::build;
use crate::datum::{Datum, RangeError};
use crate::escape::EscapeError;
use crate::lexer::lex;
use crate::literal::LiteralError;

/// A syntax error reported by the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    /// 1-based line number.
    pub line: usize,
    /// 0-based column, counted in characters.
    pub column: usize,
    pub span: Span,
    pub message: String,
}

impl SyntaxError {
    /// Creates an error at the start of `span` within `source`.
    pub fn new(source: &str, span: Span, message: impl Display) -> Self {
        let before = source.get(..span.start).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |line| line.chars().count());

        SyntaxError {
            line,
            column,
            span,
            message: message.to_string(),
        }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }
}

/// Why a parse failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{}", join_lines(.0))]
    Syntax(Vec<SyntaxError>),
    #[error(transparent)]
    Escape(#[from] EscapeError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Literal(#[from] LiteralError),
    /// The builder was driven into an inconsistent state.
    #[error("inconsistent parser state: {0}")]
    Internal(String),
}

impl ParseError {
    /// The syntax errors, if this is a syntax failure.
    pub fn syntax_errors(&self) -> &[SyntaxError] {
        match self {
            ParseError::Syntax(errors) => errors,
            _ => &[],
        }
    }
}

fn join_lines(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shorthand for a result specialised to parse errors.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Span within a string.
pub type Span = Range<usize>;

/// Parse exactly one datum from an s-expression string.
pub fn from_str(source: &str) -> Result<Datum> {
    tracing::trace!(len = source.len(), "reading datum");

    let events = lex(source).map_err(|errors| {
        tracing::debug!(count = errors.len(), "input has syntax errors");
        ParseError::Syntax(errors)
    })?;

    let datum = build(events)?;
    tracing::trace!("finished reading datum");
    Ok(datum)
}

impl FromStr for Datum {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self> {
        crate::parser::from_str(source)
    }
}

#[cfg(test)]
mod test {
    use super::{from_str, ParseError, SyntaxError};
    use crate::datum::{Datum, RangeError};
    use rstest::rstest;

    #[rstest]
    #[case("abc", 0, 1, 0)]
    #[case("abc", 2, 1, 2)]
    #[case("a\nbc", 3, 2, 1)]
    #[case("a\n\nλλx", 7, 3, 2)]
    fn test_syntax_error_location(
        #[case] source: &str,
        #[case] offset: usize,
        #[case] line: usize,
        #[case] column: usize,
    ) {
        let error = SyntaxError::new(source, offset..offset, "oops");
        assert_eq!((line, column), (error.line, error.column));
        assert_eq!(format!("{line}:{column}: oops"), error.to_string());
    }

    #[test]
    fn test_syntax_errors_are_joined() {
        let error = from_str("(a @ b @)").unwrap_err();
        assert_eq!(2, error.syntax_errors().len());
        assert_eq!(2, error.to_string().lines().count());
    }

    #[test]
    fn test_range_errors_surface() {
        assert_eq!(
            Err(ParseError::Range(RangeError::Byte("256".to_string()))),
            from_str("#u8(1 256)")
        );
    }

    #[test]
    fn test_from_str_trait() {
        let datum: Datum = "(a . b)".parse().unwrap();
        assert_eq!(
            Datum::dotted_list([Datum::symbol("a")], Datum::symbol("b")).unwrap(),
            datum
        );
    }
}
