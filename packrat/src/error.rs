use std::fmt::{self, Display};
use thiserror::Error;

use crate::cursor::Mark;
use crate::tokens::{Token, TokenKind};

/// Errors that abort a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(ParseFailure),

    #[error("invalid start rule `{0}`")]
    InvalidStartRule(String),

    #[error("recursion limit of {limit} exceeded in rule `{rule}`")]
    RecursionLimitExceeded { rule: String, limit: usize },

    #[error("left recursion in rule `{rule}` did not settle within {limit} iterations")]
    FixedPointLimitExceeded { rule: String, limit: usize },
}

/// Errors found while compiling a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error(transparent)]
    Notation(#[from] ebnf::Error),

    #[error("rule `{0}` is defined more than once")]
    DuplicateRule(String),

    #[error("rule `{rule}` references undefined rule `{name}`")]
    UndefinedRule { rule: String, name: String },

    #[error("rule `{rule}` references unknown token kind `{name}`")]
    UnknownToken { rule: String, name: String },

    #[error("rule `{rule}` uses '{word}', which is not a reserved keyword")]
    UnknownKeyword { rule: String, word: String },

    #[error("rule `{rule}` uses \"{word}\", which is not a soft keyword")]
    UnknownSoftKeyword { rule: String, word: String },

    #[error("`{0}` is both a reserved and a soft keyword")]
    KeywordConflict(String),

    #[error("left-recursive rules {0:?} have no single rule that breaks every cycle")]
    NoLeftRecursionLeader(Vec<String>),
}

/// Something the parser would have accepted at the furthest mark.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expected {
    Token(TokenKind),
    Keyword(String),
    SoftKeyword(String),
    Punct(String),
    AnyToken,
    EndOfInput,
}

impl Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Keyword(word) | Expected::Punct(word) => write!(f, "'{}'", word),
            Expected::SoftKeyword(word) => write!(f, "\"{}\"", word),
            Expected::AnyToken => write!(f, "any token"),
            Expected::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// Where and why the input was rejected.
///
/// The furthest mark is the position the parser failed to move past; rules
/// lists every rule that was active when a terminal failed there, outermost
/// first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub furthest: Mark,
    pub rules: Vec<String>,
    pub expected: Vec<Expected>,
    pub found: Option<Token>,
}

impl ParseFailure {
    pub fn in_rule(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r == rule)
    }
}

impl Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid syntax at token {}", self.furthest)?;
        match &self.found {
            Some(tok) => write!(f, " ({}): found {}", tok.start, tok)?,
            None => write!(f, ": found end of input")?,
        }
        for (idx, expected) in self.expected.iter().enumerate() {
            if idx == 0 {
                write!(f, ", expected {}", expected)?;
            } else {
                write!(f, " or {}", expected)?;
            }
        }
        Ok(())
    }
}
