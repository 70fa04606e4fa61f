//! A PEG-flavoured EBNF notation.
//!
//! Productions read `name = rhs ;` or `name[Kind] = rhs ;`. The rhs supports
//! ordered alternation (`|`), concatenation (juxtaposition or `,`), optional
//! (`[ a ]`, `a?`), repetition (`{ a }`, `a*`, `a+`), grouping, exception
//! (`a - b`), lookahead (`&a`, `!a`), cut (`~`), any token (`.`) and labels
//! (`name:a`). Single-quoted words are reserved keywords, double-quoted words
//! are soft keywords, any other quoted text is punctuation.

use std::fmt::{self, Display};
use std::str::FromStr;

mod error;
pub use error::Error;
mod parser;

/// A constant identifying production rules.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifiers written entirely in upper case name token kinds rather
    /// than rules, unless a rule with that name exists.
    pub fn is_token_kind(&self) -> bool {
        self.0.chars().any(|c| c.is_ascii_uppercase())
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A literal string.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct Terminal(pub String);

impl Terminal {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the literal is spelled like an identifier, making it a keyword
    /// rather than punctuation.
    pub fn is_word(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                chars.all(|c| c.is_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}'", self.0)
    }
}

impl From<&str> for Terminal {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The lhs of a production rule, with the node kind the rule builds.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Lhs {
    pub name: Identifier,
    pub kind: Option<Identifier>,
}

impl Lhs {
    pub fn with_kind(name: &str, kind: &str) -> Self {
        Lhs {
            name: name.into(),
            kind: Some(kind.into()),
        }
    }
}

impl From<&str> for Lhs {
    fn from(s: &str) -> Self {
        Lhs {
            name: s.into(),
            kind: None,
        }
    }
}

impl Display for Lhs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{}[{}]", self.name, kind),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The rhs of a production rule.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Rhs {
    Identifier(Identifier),
    Terminal(Terminal),
    /// A double-quoted literal.
    SoftTerminal(Terminal),
    /// Any single token.
    Any,
    Optional(Box<Rhs>),
    /// Zero or more.
    Repeat(Box<Rhs>),
    /// One or more.
    RepeatOne(Box<Rhs>),
    Group(Box<Rhs>),
    Exception(Box<Rhs>, Box<Rhs>),
    Alternation(Vec<Rhs>),
    Concatenation(Vec<Rhs>),
    Lookahead(Box<Rhs>),
    NegativeLookahead(Box<Rhs>),
    Cut,
    Labeled(Identifier, Box<Rhs>),
}

impl Rhs {
    /// Whether this rhs prints as a single unit and can take a postfix
    /// operator without parentheses.
    fn is_atomic(&self) -> bool {
        matches!(
            self,
            Rhs::Identifier(_)
                | Rhs::Terminal(_)
                | Rhs::SoftTerminal(_)
                | Rhs::Any
                | Rhs::Group(_)
                | Rhs::Optional(_)
                | Rhs::Repeat(_)
        )
    }
}

fn write_joined(f: &mut fmt::Formatter, items: &[Rhs], sep: &str) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rhs::Identifier(iden) => write!(f, "{}", iden),
            Rhs::Terminal(term) => write!(f, "{}", term),
            Rhs::SoftTerminal(term) => write!(f, "\"{}\"", term.0),
            Rhs::Any => write!(f, "."),
            Rhs::Optional(rhs) => write!(f, "[ {} ]", rhs),
            Rhs::Repeat(rhs) => write!(f, "{{ {} }}", rhs),
            Rhs::RepeatOne(rhs) if rhs.is_atomic() => write!(f, "{}+", rhs),
            Rhs::RepeatOne(rhs) => write!(f, "( {} )+", rhs),
            Rhs::Group(rhs) => write!(f, "( {} )", rhs),
            Rhs::Exception(rhs1, rhs2) => write!(f, "{} - {}", rhs1, rhs2),
            Rhs::Alternation(alts) => write_joined(f, alts, " | "),
            Rhs::Concatenation(items) => write_joined(f, items, " , "),
            Rhs::Lookahead(rhs) => write!(f, "&{}", rhs),
            Rhs::NegativeLookahead(rhs) => write!(f, "!{}", rhs),
            Rhs::Cut => write!(f, "~"),
            Rhs::Labeled(label, rhs) => write!(f, "{}:{}", label, rhs),
        }
    }
}

impl FromStr for Rhs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, rhs) = parser::rhs(s).map_err(|e| Error::from_nom(s, e))?;
        parser::expect_end(s, rest)?;
        Ok(rhs)
    }
}

/// A production rule.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Production {
    pub lhs: Lhs,
    pub rhs: Rhs,
}

impl Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {} ;", self.lhs, self.rhs)
    }
}

impl FromStr for Production {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, rule) = parser::production(s).map_err(|e| Error::from_nom(s, e))?;
        parser::expect_end(s, rest)?;
        Ok(rule)
    }
}

/// A set of rules.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Grammar {
    pub rules: Vec<Production>,
}

impl Grammar {
    /// Find the production for a rule name.
    pub fn get(&self, name: &str) -> Option<&Production> {
        self.rules.iter().find(|rule| rule.lhs.name.as_str() == name)
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, grammar) = parser::grammar(s).map_err(|e| Error::from_nom(s, e))?;
        parser::expect_end(s, rest)?;
        Ok(grammar)
    }
}
