use std::fmt::{self, Display};
use thiserror::Error;

use crate::tokens::Token;

/// A saved position in the token sequence. Always within
/// `[0, token_count]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Mark(usize);

impl Mark {
    pub const START: Mark = Mark(0);

    pub fn new(idx: usize) -> Self {
        Mark(idx)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when advancing past the last token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unexpected end of input")]
pub struct EndOfInput;

/// Keep track of a position within a token slice, updating on successful
/// operations.
#[derive(Debug, Clone)]
pub struct Cursor<'t> {
    tokens: &'t [Token],
    idx: usize,
}

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Cursor { tokens, idx: 0 }
    }

    pub fn mark(&self) -> Mark {
        Mark(self.idx)
    }

    /// Move back (or forward) to a mark previously returned by `mark`.
    pub fn reset(&mut self, mark: Mark) {
        debug_assert!(
            mark.0 <= self.tokens.len(),
            "mark {} beyond end of input, len: {}",
            mark.0,
            self.tokens.len()
        );
        self.idx = mark.0;
    }

    pub fn at_end(&self) -> bool {
        self.idx >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.idx)
    }

    /// Return the current token and move past it.
    pub fn advance(&mut self) -> Result<&'t Token, EndOfInput> {
        let tok = self.tokens.get(self.idx).ok_or(EndOfInput)?;
        self.idx += 1;
        Ok(tok)
    }

    pub fn token_at(&self, mark: Mark) -> Option<&'t Token> {
        self.tokens.get(mark.0)
    }

    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }
}
