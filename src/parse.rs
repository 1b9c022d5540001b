use crate::row_op::RowOp;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    ops::Range,
};

/// Parse a [`RowOp`] from its textual notation.
///
/// Three forms are recognised, with rows numbered from 1:
///
/// ```text
/// R1 <=> R2               swap rows 1 and 2
/// R2 * (3/4) => R2        scale row 2 by 3/4
/// R1 * (-2) + R3 => R3    add -2 times row 1 into row 3
/// ```
pub fn parse(text: &str) -> Result<RowOp, RowOpError> {
    let statement =
        Parser::new(text)
            .parse()
            .map_err(|cause| RowOpError::InvalidSyntax {
                text: text.to_string(),
                cause,
            })?;

    statement.validate(text)
}

/// A recursive descent parser for row operation notation.
///
/// The grammar:
///
/// ```text
/// row_op  := ROW "<=>" ROW
///          | ROW "*" "(" factor ")" ( "+" ROW )? "=>" ROW
///
/// factor  := signed ( "/" signed )?
///
/// signed  := ( "+" | "-" )? NUMBER
/// ```
///
/// A sign must touch its number, and there is no whitespace inside a `ROW`
/// token (e.g. `R12`).
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Statement, SyntaxError> {
        let statement = self.row_op()?;

        match self.tokens.next() {
            None => Ok(statement),
            Some(Ok(token)) => Err(SyntaxError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: &[],
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, SyntaxError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(SyntaxError::UnexpectedEndOfInput),
        }
    }

    fn expect(
        &mut self,
        kind: TokenKind,
        expected: &'static [TokenKind],
    ) -> Result<Token<'a>, SyntaxError> {
        let token = self.advance()?;

        if token.kind == kind {
            Ok(token)
        } else {
            Err(SyntaxError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected,
            })
        }
    }

    fn row_op(&mut self) -> Result<Statement, SyntaxError> {
        let source = self.row()?;
        let operator = self.advance()?;

        match operator.kind {
            TokenKind::Swap => {
                let other = self.row()?;
                Ok(Statement::Swap { source, other })
            },
            TokenKind::Times => self.scaling(source),
            other => Err(SyntaxError::UnexpectedToken {
                found: other,
                span: operator.span,
                expected: &[TokenKind::Swap, TokenKind::Times],
            }),
        }
    }

    fn scaling(&mut self, source: usize) -> Result<Statement, SyntaxError> {
        self.expect(TokenKind::OpenParen, &[TokenKind::OpenParen])?;

        let numerator = self.signed_number()?;
        let denominator = if self.peek() == Some(TokenKind::Slash) {
            let _ = self.advance()?;
            Some(self.signed_number()?)
        } else {
            None
        };

        self.expect(
            TokenKind::CloseParen,
            &[TokenKind::Slash, TokenKind::CloseParen],
        )?;

        let add = if self.peek() == Some(TokenKind::Plus) {
            let _ = self.advance()?;
            Some(self.row()?)
        } else {
            None
        };

        self.expect(TokenKind::Implies, &[TokenKind::Plus, TokenKind::Implies])?;
        let target = self.row()?;

        Ok(Statement::Scale {
            source,
            numerator,
            denominator,
            add,
            target,
        })
    }

    /// A 1-based row number.
    fn row(&mut self) -> Result<usize, SyntaxError> {
        let token = self.expect(TokenKind::Row, &[TokenKind::Row])?;

        match token.text[1..].parse::<usize>() {
            Ok(number) if number > 0 => Ok(number),
            _ => Err(SyntaxError::InvalidRowNumber { span: token.span }),
        }
    }

    fn signed_number(&mut self) -> Result<BigRational, SyntaxError> {
        let first = self.advance()?;

        match first.kind {
            TokenKind::Number => Ok(decimal(first.text)),
            TokenKind::Plus | TokenKind::Minus => {
                let number =
                    self.expect(TokenKind::Number, &[TokenKind::Number])?;

                if number.span.start != first.span.end {
                    return Err(SyntaxError::DetachedSign {
                        span: first.span.start..number.span.end,
                    });
                }

                let value = decimal(number.text);
                if first.kind == TokenKind::Minus {
                    Ok(-value)
                } else {
                    Ok(value)
                }
            },
            other => Err(SyntaxError::UnexpectedToken {
                found: other,
                span: first.span,
                expected: &[TokenKind::Plus, TokenKind::Minus, TokenKind::Number],
            }),
        }
    }
}

/// Convert an unsigned decimal literal (`3`, `3.`, `.5`, `3.14`) into an exact
/// rational, so `0.1` is exactly `1/10`.
pub(crate) fn decimal(text: &str) -> BigRational {
    let (whole, fraction) = match text.find('.') {
        Some(dot) => (&text[..dot], &text[dot + 1..]),
        None => (text, ""),
    };

    let numerator = whole
        .bytes()
        .chain(fraction.bytes())
        .fold(BigInt::zero(), |acc, digit| {
            acc * 10_u32 + u32::from(digit - b'0')
        });
    let denominator = num_traits::pow(BigInt::from(10_u32), fraction.len());

    BigRational::new(numerator, denominator)
}

/// A row operation which has the right shape but hasn't been checked for
/// consistency yet. Row numbers are still 1-based.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Statement {
    Swap {
        source: usize,
        other: usize,
    },
    Scale {
        source: usize,
        numerator: BigRational,
        denominator: Option<BigRational>,
        add: Option<usize>,
        target: usize,
    },
}

impl Statement {
    fn validate(self, text: &str) -> Result<RowOp, RowOpError> {
        let text = || text.to_string();

        match self {
            Statement::Swap { source, other } => Ok(RowOp::Swap {
                first: source - 1,
                second: other - 1,
            }),
            Statement::Scale {
                source,
                numerator,
                denominator,
                add,
                target,
            } => {
                let denominator = denominator.unwrap_or_else(BigRational::one);
                if denominator.is_zero() {
                    return Err(RowOpError::ZeroDenominator { text: text() });
                }
                let factor = numerator / denominator;

                match add {
                    None => {
                        if source != target {
                            return Err(RowOpError::MismatchedRows {
                                text: text(),
                                role: RowRole::Source,
                            });
                        }
                        if factor.is_zero() {
                            return Err(RowOpError::ZeroFactor { text: text() });
                        }

                        Ok(RowOp::Scale {
                            row: source - 1,
                            factor,
                        })
                    },
                    Some(add) => {
                        if add != target {
                            return Err(RowOpError::MismatchedRows {
                                text: text(),
                                role: RowRole::Add,
                            });
                        }
                        if add == source {
                            return Err(RowOpError::SameSourceAndAdd {
                                text: text(),
                            });
                        }

                        Ok(RowOp::ScaleAdd {
                            source: source - 1,
                            target: target - 1,
                            factor,
                        })
                    },
                }
            },
        }
    }
}

/// Reasons a row operation may be rejected.
///
/// Every variant carries the offending text verbatim so it can be shown back
/// to whoever wrote it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowOpError {
    #[error("invalid row operation: {text} ({cause})")]
    InvalidSyntax {
        text: String,
        #[source]
        cause: SyntaxError,
    },
    #[error("{role} and target rows are not the same: {text}")]
    MismatchedRows { text: String, role: RowRole },
    #[error("zero denominator in row operation: {text}")]
    ZeroDenominator { text: String },
    #[error("zero scaling factor in row operation: {text}")]
    ZeroFactor { text: String },
    #[error("add and source rows are the same: {text}")]
    SameSourceAndAdd { text: String },
    /// The operation is well formed but refers to a row the matrix doesn't
    /// have. Only raised when applying operations, never by [`parse()`].
    #[error("row {row} is out of range for a matrix with {rows} rows: {text}")]
    RowOutOfRange {
        text: String,
        row: usize,
        rows: usize,
    },
}

impl RowOpError {
    /// The row operation text which triggered this error.
    pub fn text(&self) -> &str {
        match self {
            RowOpError::InvalidSyntax { text, .. }
            | RowOpError::MismatchedRows { text, .. }
            | RowOpError::ZeroDenominator { text }
            | RowOpError::ZeroFactor { text }
            | RowOpError::SameSourceAndAdd { text }
            | RowOpError::RowOutOfRange { text, .. } => text,
        }
    }
}

/// Which row failed to match the target row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RowRole {
    /// The row being scaled in `R<i> * (c) => R<j>`.
    Source,
    /// The row being added to in `R<i> * (c) + R<j> => R<k>`.
    Add,
}

impl Display for RowRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RowRole::Source => write!(f, "source"),
            RowRole::Add => write!(f, "add"),
        }
    }
}

/// Structural problems found while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("invalid character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("row numbers start at 1 and must be written like `R3` (at {span:?})")]
    InvalidRowNumber { span: Range<usize> },
    #[error("a sign must be written directly before its number (at {span:?})")]
    DetachedSign { span: Range<usize> },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("found {found} at {span:?} but expected {}", expected_kinds(.expected))]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
}

fn expected_kinds(expected: &[TokenKind]) -> String {
    if expected.is_empty() {
        return String::from("the end of input");
    }

    let names: Vec<String> = expected.iter().map(ToString::to_string).collect();
    names.join(" or ")
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
    ) -> Option<Result<Token<'a>, SyntaxError>> {
        let start = self.cursor;
        self.advance()?;
        let end = self.cursor;

        Some(Ok(Token::from_text(self.src, start..end, kind)))
    }

    /// Consume a multi-character operator like `<=>`.
    fn chomp_literal(
        &mut self,
        literal: &str,
        kind: TokenKind,
    ) -> Result<Token<'a>, SyntaxError> {
        let start = self.cursor;

        if self.rest().starts_with(literal) {
            self.cursor += literal.len();
            Ok(Token::from_text(self.src, start..self.cursor, kind))
        } else {
            let character = self.advance().unwrap_or_default();
            Err(SyntaxError::InvalidCharacter {
                character,
                index: start,
            })
        }
    }

    fn take_while<P>(
        &mut self,
        mut predicate: P,
    ) -> Option<(&'a str, Range<usize>)>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        let end = self.cursor;

        if start != end {
            let text = &self.src[start..end];
            Some((text, start..end))
        } else {
            None
        }
    }

    fn chomp_integer(&mut self) -> Option<&'a str> {
        self.take_while(|c| c.is_ascii_digit()).map(|(text, _)| text)
    }

    fn chomp_number(&mut self) -> Result<Token<'a>, SyntaxError> {
        let start = self.cursor;

        if self.peek() == Some('.') {
            // a leading decimal point needs digits after it (".5")
            self.advance();
            if self.chomp_integer().is_none() {
                return Err(SyntaxError::InvalidCharacter {
                    character: '.',
                    index: start,
                });
            }
        } else {
            self.chomp_integer();

            if self.peek() == Some('.') {
                // skip past the decimal
                self.advance();
                self.chomp_integer();
            }
        }

        let end = self.cursor;

        Ok(Token::from_text(self.src, start..end, TokenKind::Number))
    }

    fn chomp_row(&mut self) -> Result<Token<'a>, SyntaxError> {
        let start = self.cursor;
        // skip the "R"
        self.advance();

        match self.chomp_integer() {
            Some(_) => {
                Ok(Token::from_text(self.src, start..self.cursor, TokenKind::Row))
            },
            None => Err(SyntaxError::InvalidRowNumber {
                span: start..self.cursor,
            }),
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' => self.chomp(TokenKind::OpenParen),
                ')' => self.chomp(TokenKind::CloseParen),
                '+' => self.chomp(TokenKind::Plus),
                '-' => self.chomp(TokenKind::Minus),
                '*' => self.chomp(TokenKind::Times),
                '/' => self.chomp(TokenKind::Slash),
                '<' => Some(self.chomp_literal("<=>", TokenKind::Swap)),
                '=' => Some(self.chomp_literal("=>", TokenKind::Implies)),
                'R' | 'r' => Some(self.chomp_row()),
                '0'..='9' | '.' => Some(self.chomp_number()),
                other => {
                    let index = self.cursor;
                    self.advance();
                    Some(Err(SyntaxError::InvalidCharacter {
                        character: other,
                        index,
                    }))
                },
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(
        original_source: &'a str,
        span: Range<usize>,
        kind: TokenKind,
    ) -> Self {
        Token {
            text: &original_source[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear in a row operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A row reference, `R` followed by digits.
    Row,
    /// An unsigned decimal number.
    Number,
    OpenParen,
    CloseParen,
    Plus,
    Minus,
    Times,
    Slash,
    /// `<=>`
    Swap,
    /// `=>`
    Implies,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Row => write!(f, "a row like `R1`"),
            TokenKind::Number => write!(f, "a number"),
            TokenKind::OpenParen => write!(f, "`(`"),
            TokenKind::CloseParen => write!(f, "`)`"),
            TokenKind::Plus => write!(f, "`+`"),
            TokenKind::Minus => write!(f, "`-`"),
            TokenKind::Times => write!(f, "`*`"),
            TokenKind::Slash => write!(f, "`/`"),
            TokenKind::Swap => write!(f, "`<=>`"),
            TokenKind::Implies => write!(f, "`=>`"),
        }
    }
}

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    macro_rules! tokenize_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let mut tokens = Tokens::new($src);

                let got = tokens.next().unwrap().unwrap();

                let Range { start, end } = got.span;
                assert_eq!(start, 0);
                assert_eq!(end, $src.len());
                assert_eq!(got.kind, $should_be);

                assert!(
                    tokens.next().is_none(),
                    "{:?} should be empty",
                    tokens
                );
            }
        };
    }

    tokenize_test!(open_paren, "(", TokenKind::OpenParen);
    tokenize_test!(close_paren, ")", TokenKind::CloseParen);
    tokenize_test!(plus, "+", TokenKind::Plus);
    tokenize_test!(minus, "-", TokenKind::Minus);
    tokenize_test!(times, "*", TokenKind::Times);
    tokenize_test!(slash, "/", TokenKind::Slash);
    tokenize_test!(swap, "<=>", TokenKind::Swap);
    tokenize_test!(implies, "=>", TokenKind::Implies);
    tokenize_test!(single_digit_integer, "3", TokenKind::Number);
    tokenize_test!(multi_digit_integer, "31", TokenKind::Number);
    tokenize_test!(number_with_trailing_dot, "31.", TokenKind::Number);
    tokenize_test!(number_with_leading_dot, ".5", TokenKind::Number);
    tokenize_test!(simple_decimal, "3.14", TokenKind::Number);
    tokenize_test!(simple_row, "R1", TokenKind::Row);
    tokenize_test!(lowercase_row, "r12", TokenKind::Row);

    #[test]
    fn row_without_digits_is_an_error() {
        let mut tokens = Tokens::new("R x");

        let got = tokens.next().unwrap();

        assert_eq!(got, Err(SyntaxError::InvalidRowNumber { span: 0..1 }));
    }

    #[test]
    fn lone_decimal_point_is_an_error() {
        let mut tokens = Tokens::new(".");

        let got = tokens.next().unwrap();

        assert_eq!(
            got,
            Err(SyntaxError::InvalidCharacter {
                character: '.',
                index: 0
            })
        );
    }

    #[test]
    fn half_an_arrow_is_an_error() {
        let mut tokens = Tokens::new("<= R2");

        let got = tokens.next().unwrap();

        assert_eq!(
            got,
            Err(SyntaxError::InvalidCharacter {
                character: '<',
                index: 0
            })
        );
    }
}
