//! Tokens of the binary tree string encoding.
//!
//! A tree is written in pre-order: one token per node holding its value, and one [`ABSENT_TOKEN`]
//! wherever a child is missing. Tokens are separated by [`TOKEN_SEPARATOR`].
use crate::Value;

use std::fmt;
use std::iter::Peekable;

use thiserror::Error;

/// Written in place of a missing child.
pub const ABSENT_TOKEN: &str = "#";

/// Written between two tokens.
pub const TOKEN_SEPARATOR: &str = " ";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Token {
    Node(Value),
    Absent,
}

impl Token {
    pub(crate) fn parse(raw: &str, position: usize) -> Result<Token, ParseTreeError> {
        if raw == ABSENT_TOKEN {
            return Ok(Token::Absent);
        }
        let invalid = || ParseTreeError::InvalidToken {
            position,
            token: raw.to_owned(),
        };
        // plain decimal only: no sign other than a leading '-', no surrounding whitespace
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        raw.parse().map(Token::Node).map_err(|_| invalid())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Node(val) => write!(f, "{}", val),
            Token::Absent => f.write_str(ABSENT_TOKEN),
        }
    }
}

impl From<Option<Value>> for Token {
    fn from(val: Option<Value>) -> Token {
        val.map_or(Token::Absent, Token::Node)
    }
}

impl From<Token> for Option<Value> {
    fn from(token: Token) -> Option<Value> {
        match token {
            Token::Node(val) => Some(val),
            Token::Absent => None,
        }
    }
}

/// Splits an encoded tree into tokens, tagging each with its position.
///
/// Tokens are separated by exactly one [`TOKEN_SEPARATOR`], so doubled separators or any other
/// whitespace show up as invalid tokens. The empty string has no tokens at all.
pub(crate) fn tokenize(input: &str) -> impl Iterator<Item = Result<Token, ParseTreeError>> + '_ {
    let raw_tokens = if input.is_empty() {
        None
    } else {
        Some(input.split(TOKEN_SEPARATOR))
    };
    raw_tokens
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(position, raw)| Token::parse(raw, position))
}

/// Why an encoded binary tree couldn't be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTreeError {
    #[error("invalid token {token:?} at position {position}: expected an integer or \"#\"")]
    InvalidToken { position: usize, token: String },
    #[error("input ended at position {position} while a subtree was still open")]
    UnexpectedEnd { position: usize },
    #[error("unexpected token at position {position} after the tree was complete")]
    TrailingTokens { position: usize },
    #[error("empty input does not encode a tree")]
    Empty,
}

/// Hands out tokens one at a time, keeping track of how many were consumed.
pub(crate) struct TokenReader<I: Iterator> {
    tokens: Peekable<I>,
    consumed: usize,
}

impl<I> TokenReader<I>
where
    I: Iterator<Item = Result<Token, ParseTreeError>>,
{
    pub(crate) fn new(tokens: I) -> TokenReader<I> {
        TokenReader {
            tokens: tokens.peekable(),
            consumed: 0,
        }
    }

    pub(crate) fn is_empty(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, ParseTreeError> {
        let token = self.tokens.next().ok_or(ParseTreeError::UnexpectedEnd {
            position: self.consumed,
        })??;
        self.consumed += 1;
        Ok(token)
    }

    /// Fails if any token is left over.
    pub(crate) fn finish(mut self) -> Result<(), ParseTreeError> {
        match self.tokens.next() {
            Some(_) => Err(ParseTreeError::TrailingTokens {
                position: self.consumed,
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }
}
