use logos::Logos;

use crate::{
    builder::{Aggregate, Event, Leaf},
    datum::Abbreviation,
    literal::named_char,
    parser::{Span, SyntaxError},
};

#[derive(Debug, Clone, Copy, PartialEq, Logos)]
#[logos(skip r"([ \t\r\n\f]+|;[^\n]*)+")]
enum LexerToken {
    #[token("(")]
    OpenList,
    #[token(")")]
    Close,
    #[token("#(")]
    OpenVector,
    #[token("#u8(", ignore(ascii_case))]
    OpenBytevector,
    #[token(".")]
    Dot,
    #[token("'")]
    Quote,
    #[token("`")]
    Quasiquote,
    #[token(",")]
    Unquote,
    #[token(",@")]
    UnquoteSplicing,
    #[token("#;")]
    DatumComment,
    #[token("#|", block_comment)]
    BlockComment,
    #[regex("#t|#f|#true|#false", ignore(ascii_case))]
    Boolean,
    #[regex(r"#\\((.|\n)|[a-zA-Z][a-zA-Z0-9]+)")]
    Character,
    #[regex(r"(#[dD])?[+-]?[0-9]+")]
    #[regex(r"#[bB][+-]?[01]+")]
    #[regex(r"#[oO][+-]?[0-7]+")]
    #[regex(r"#[xX][+-]?[0-9a-fA-F]+")]
    Integer,
    #[regex(r"(#[dD])?[+-]?(([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+)")]
    Flonum,
    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    String,
    #[regex(r"[\p{Alphabetic}!$%&*/:<=>?^_~][\p{Alphabetic}0-9!$%&*/:<=>?^_~+\-.@]*")]
    #[regex(r"[+\-]")]
    #[regex(r"[+\-][\p{Alphabetic}!$%&*/:<=>?^_~+\-@][\p{Alphabetic}0-9!$%&*/:<=>?^_~+\-.@]*")]
    #[regex(r"[+\-]?\.[\p{Alphabetic}!$%&*/:<=>?^_~+\-@.][\p{Alphabetic}0-9!$%&*/:<=>?^_~+\-.@]*")]
    Identifier,
    #[regex(r"\|([^|\\]|\\(.|\n))*\|")]
    EscapedIdentifier,
}

impl LexerToken {
    /// Tokens that must be followed by a delimiter or the end of input.
    fn needs_delimiter(self) -> bool {
        matches!(
            self,
            LexerToken::Dot
                | LexerToken::Boolean
                | LexerToken::Character
                | LexerToken::Integer
                | LexerToken::Flonum
                | LexerToken::Identifier
        )
    }

    /// Tokens that begin with one of the delimiters `(`, `)`, `"` or `|`.
    fn is_delimited(self) -> bool {
        matches!(
            self,
            LexerToken::OpenList
                | LexerToken::Close
                | LexerToken::String
                | LexerToken::EscapedIdentifier
        )
    }
}

/// Skips a possibly nested `#| ... |#` comment. Fails when it is unterminated.
fn block_comment(lex: &mut logos::Lexer<LexerToken>) -> bool {
    let rest = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut index = 0;

    while index + 1 < rest.len() {
        match (rest[index], rest[index + 1]) {
            (b'|', b'#') => {
                depth -= 1;
                index += 2;
                if depth == 0 {
                    lex.bump(index);
                    return true;
                }
            }
            (b'#', b'|') => {
                depth += 1;
                index += 2;
            }
            _ => index += 1,
        }
    }

    lex.bump(rest.len());
    false
}

/// Classifies a `#\...` token as a single, named or hex character.
fn character_leaf(slice: &str) -> Option<Leaf> {
    let body = slice.get(2..)?;
    let mut chars = body.chars();
    chars.next()?;

    if chars.as_str().is_empty() {
        Some(Leaf::Character)
    } else if named_char(body).is_some() {
        Some(Leaf::NamedCharacter)
    } else if matches!(body.as_bytes()[0], b'x' | b'X')
        && body[1..].bytes().all(|b| b.is_ascii_hexdigit())
    {
        Some(Leaf::HexCharacter)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    /// No `.` seen.
    None,
    /// Seen `.`, waiting for the tail datum.
    Pending,
    /// Seen the tail datum, only `)` may follow.
    Done,
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// An open `(`, `#(` or `#u8(`.
    Aggregate {
        kind: Aggregate,
        start: usize,
        len: usize,
        tail: Tail,
    },
    /// A prefix waiting for the datum it applies to.
    Abbreviation(Abbreviation, usize),
    DatumComment(usize),
}

/// Checks the structure of the token stream and turns it into events.
struct Grammar<'a> {
    source: &'a str,
    events: Vec<Event<'a>>,
    frames: Vec<Frame>,
    top_level: usize,
}

impl<'a> Grammar<'a> {
    fn error(&self, span: Span, message: impl std::fmt::Display) -> SyntaxError {
        SyntaxError::new(self.source, span, message)
    }

    fn token(&mut self, token: LexerToken, span: Span) -> Result<(), SyntaxError> {
        let source = self.source;
        let slice = &source[span.clone()];

        match token {
            LexerToken::BlockComment => Ok(()),
            LexerToken::OpenList => self.open(Aggregate::List, span),
            LexerToken::OpenVector => self.open(Aggregate::Vector, span),
            LexerToken::OpenBytevector => self.open(Aggregate::Bytevector, span),
            LexerToken::Close => self.close(span),
            LexerToken::Dot => self.dot(span),
            LexerToken::Quote => self.prefix(Frame::Abbreviation(Abbreviation::Quote, span.start)),
            LexerToken::Quasiquote => {
                self.prefix(Frame::Abbreviation(Abbreviation::Quasiquote, span.start))
            }
            LexerToken::Unquote => {
                self.prefix(Frame::Abbreviation(Abbreviation::Unquote, span.start))
            }
            LexerToken::UnquoteSplicing => {
                self.prefix(Frame::Abbreviation(Abbreviation::UnquoteSplicing, span.start))
            }
            LexerToken::DatumComment => self.prefix(Frame::DatumComment(span.start)),
            LexerToken::Boolean => self.leaf(Leaf::Boolean, slice, span),
            LexerToken::Character => match character_leaf(slice) {
                Some(leaf) => self.leaf(leaf, slice, span),
                None => Err(self.error(span, format!("unknown character name `{slice}`"))),
            },
            LexerToken::Integer => self.leaf(Leaf::Integer, slice, span),
            LexerToken::Flonum => self.leaf(Leaf::Flonum, slice, span),
            LexerToken::String => self.leaf(Leaf::String, slice, span),
            LexerToken::Identifier => self.leaf(Leaf::Identifier, slice, span),
            LexerToken::EscapedIdentifier => self.leaf(Leaf::EscapedIdentifier, slice, span),
        }
    }

    fn leaf(&mut self, leaf: Leaf, slice: &'a str, span: Span) -> Result<(), SyntaxError> {
        self.events.push(Event::Leaf(leaf, slice));
        self.complete(span)
    }

    fn prefix(&mut self, frame: Frame) -> Result<(), SyntaxError> {
        self.frames.push(frame);
        Ok(())
    }

    fn open(&mut self, kind: Aggregate, span: Span) -> Result<(), SyntaxError> {
        self.events.push(Event::Enter);
        self.frames.push(Frame::Aggregate {
            kind,
            start: span.start,
            len: 0,
            tail: Tail::None,
        });
        Ok(())
    }

    fn dot(&mut self, span: Span) -> Result<(), SyntaxError> {
        match self.frames.last_mut() {
            Some(Frame::Aggregate {
                kind: Aggregate::List,
                len,
                tail,
                ..
            }) if *len > 0 && *tail == Tail::None => {
                *tail = Tail::Pending;
                Ok(())
            }
            _ => Err(self.error(span, "unexpected `.`")),
        }
    }

    fn close(&mut self, span: Span) -> Result<(), SyntaxError> {
        let kind = match self.frames.last() {
            Some(Frame::Aggregate {
                tail: Tail::Pending,
                ..
            }) => return Err(self.error(span, "expected a datum after `.`")),
            Some(Frame::Aggregate {
                kind,
                tail: Tail::Done,
                ..
            }) if *kind == Aggregate::List => Aggregate::DottedList,
            Some(Frame::Aggregate { kind, .. }) => *kind,
            Some(Frame::Abbreviation(..) | Frame::DatumComment(..)) => {
                return Err(self.error(span, "expected a datum before `)`"))
            }
            None => return Err(self.error(span, "unexpected `)`")),
        };

        self.frames.pop();
        self.events.push(Event::Exit(kind));
        self.complete(span)
    }

    /// Records that a datum ending at `span` is complete, applying any
    /// pending prefixes to it.
    fn complete(&mut self, span: Span) -> Result<(), SyntaxError> {
        loop {
            match self.frames.last_mut() {
                Some(Frame::Abbreviation(abbreviation, _)) => {
                    let abbreviation = *abbreviation;
                    self.frames.pop();
                    self.events.push(Event::Abbreviation(abbreviation));
                }
                Some(Frame::DatumComment(_)) => {
                    self.frames.pop();
                    self.events.push(Event::DatumComment);
                    return Ok(());
                }
                Some(Frame::Aggregate { len, tail, .. }) => {
                    match tail {
                        Tail::None => *len += 1,
                        Tail::Pending => *tail = Tail::Done,
                        Tail::Done => {
                            return Err(self.error(span, "expected `)` after the dotted tail"))
                        }
                    }
                    return Ok(());
                }
                None => {
                    if self.top_level > 0 {
                        return Err(self.error(span, "unexpected datum after the first datum"));
                    }
                    self.top_level += 1;
                    return Ok(());
                }
            }
        }
    }

    fn finish(&self) -> Result<(), SyntaxError> {
        let end = self.source.len()..self.source.len();

        match self.frames.last() {
            Some(Frame::Aggregate { start, .. }) => {
                let open = SyntaxError::new(self.source, *start..*start, "");
                Err(self.error(
                    end,
                    format!(
                        "unexpected end of input, unclosed delimiter opened at {}:{}",
                        open.line, open.column
                    ),
                ))
            }
            Some(Frame::Abbreviation(_, start) | Frame::DatumComment(start)) => {
                let prefix = SyntaxError::new(self.source, *start..*start, "");
                Err(self.error(
                    end,
                    format!(
                        "unexpected end of input, expected a datum after the prefix at {}:{}",
                        prefix.line, prefix.column
                    ),
                ))
            }
            None if self.top_level == 0 => Err(self.error(end, "expected a datum")),
            None => Ok(()),
        }
    }
}

/// Tokenizes `str` and checks its structure, returning the events for
/// exactly one datum.
///
/// Every unrecognised token is reported, as is every identifier, number,
/// boolean, character or `.` that runs into the next token without a
/// delimiter. After the first structural error the rest of the input is
/// only tokenized.
pub fn lex(str: &str) -> Result<Vec<Event<'_>>, Vec<SyntaxError>> {
    let mut lexer = LexerToken::lexer(str);
    let mut grammar = Grammar {
        source: str,
        events: Vec::new(),
        frames: Vec::new(),
        top_level: 0,
    };
    let mut errors = Vec::new();
    let mut broken = false;
    // End of the last token if it still needs a delimiter.
    let mut undelimited = None;

    while let Some(token) = lexer.next() {
        let span = lexer.span();

        let Ok(token) = token else {
            let message = if lexer.slice().starts_with("#|") {
                "unterminated block comment".to_string()
            } else {
                format!("unrecognized token `{}`", lexer.slice())
            };
            errors.push(SyntaxError::new(str, span, message));
            undelimited = None;
            continue;
        };

        if undelimited == Some(span.start) && !token.is_delimited() {
            let message = format!("expected a delimiter before `{}`", lexer.slice());
            errors.push(SyntaxError::new(str, span.clone(), message));
        }
        undelimited = token.needs_delimiter().then_some(span.end);

        if broken {
            continue;
        }

        if let Err(error) = grammar.token(token, span) {
            errors.push(error);
            broken = true;
        }
    }

    if !broken {
        if let Err(error) = grammar.finish() {
            errors.push(error);
        }
    }

    if errors.is_empty() {
        Ok(grammar.events)
    } else {
        Err(errors)
    }
}
