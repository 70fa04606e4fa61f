use std::iter::FromIterator;
use std::ops::Deref;

use crate::tokens::Token;

/// A finite, restartable sequence of tokens with random access.
pub trait TokenSource {
    fn as_tokens(&self) -> &[Token];
}

impl TokenSource for [Token] {
    fn as_tokens(&self) -> &[Token] {
        self
    }
}

impl TokenSource for Vec<Token> {
    fn as_tokens(&self) -> &[Token] {
        self
    }
}

impl<T: TokenSource + ?Sized> TokenSource for &T {
    fn as_tokens(&self) -> &[Token] {
        (**self).as_tokens()
    }
}

/// Buffers a streaming tokenizer so the parser can backtrack over it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
}

impl TokenBuffer {
    pub fn new() -> Self {
        TokenBuffer::default()
    }

    /// Buffer the output of a fallible tokenizer, stopping at the first
    /// error.
    pub fn try_from_iter<I, E>(iter: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<Token, E>>,
    {
        let tokens = iter.into_iter().collect::<Result<Vec<_>, E>>()?;
        Ok(TokenBuffer { tokens })
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn into_inner(self) -> Vec<Token> {
        self.tokens
    }
}

impl Deref for TokenBuffer {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.tokens
    }
}

impl TokenSource for TokenBuffer {
    fn as_tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl FromIterator<Token> for TokenBuffer {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        TokenBuffer {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl Extend<Token> for TokenBuffer {
    fn extend<I: IntoIterator<Item = Token>>(&mut self, iter: I) {
        self.tokens.extend(iter)
    }
}

impl From<Vec<Token>> for TokenBuffer {
    fn from(tokens: Vec<Token>) -> Self {
        TokenBuffer { tokens }
    }
}
