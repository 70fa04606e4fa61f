//! A memoized, backtracking PEG engine over token streams.
//!
//! Grammars are written in the notation of the `ebnf` crate and compiled
//! against a set of reserved and soft keywords into a [`Grammar`]. A
//! [`Parser`] then runs one of the start rules over a token sequence and
//! returns an owned syntax tree.
//!
//! ```
//! use packrat::{Grammar, Keywords, Parser, StartRule, Token, TokenKind};
//!
//! let keywords = Keywords::new(Vec::<String>::new(), Vec::<String>::new()).unwrap();
//! let grammar = Grammar::from_ebnf(
//!     "interactive = assignment ;
//!      assignment[Assignment] = target:NAME '=' value:NUMBER ;",
//!     keywords,
//! )
//! .unwrap();
//!
//! let tokens = vec![
//!     Token::synthetic(TokenKind::Name, "x"),
//!     Token::synthetic(TokenKind::Op, "="),
//!     Token::synthetic(TokenKind::Number, "1"),
//! ];
//! let ast = Parser::new(&grammar).parse(&tokens, StartRule::SingleInput).unwrap();
//! assert_eq!(ast.root.kind(), "Assignment");
//! assert_eq!(ast.root.to_string(), "(Assignment target=x value=1)");
//! assert_eq!(ast.end.index(), 3);
//! ```

mod analysis;
mod ast;
mod config;
mod cursor;
mod error;
mod grammar;
mod keywords;
mod memo;
mod source;
mod span;
mod start;
mod state;
mod tokens;

pub use ast::{Arena, Child, Element, Item, Leaf, Node, NodeId, Value, Walk};
pub use config::ParserConfig;
pub use cursor::{Cursor, EndOfInput, Mark};
pub use error::{Expected, GrammarError, ParseError, ParseFailure};
pub use grammar::{Expr, Grammar, GrammarSource, Recursion, Rule, RuleId};
pub use keywords::{Keywords, ReservedKeyword, SoftKeyword};
pub use memo::{MemoEntry, MemoKey, MemoTable};
pub use source::{TokenBuffer, TokenSource};
pub use span::{RelativeLocation, Span};
pub use start::StartRule;
pub use state::{ParseStats, ParserState};
pub use tokens::{Position, Token, TokenKind};

/// A successfully parsed tree and the mark where the start rule ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub root: Node,
    pub end: Mark,
}

/// Runs start rules of one grammar with a fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
    config: ParserConfig,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Parser::with_config(grammar, ParserConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, config: ParserConfig) -> Self {
        Parser { grammar, config }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a token sequence from the given start rule.
    pub fn parse<S>(&self, tokens: &S, start: StartRule) -> Result<Ast, ParseError>
    where
        S: TokenSource + ?Sized,
    {
        self.state(tokens.as_tokens()).dispatch(start)
    }

    /// A fresh parser state, for callers that want statistics.
    pub fn state<'t>(&self, tokens: &'t [Token]) -> ParserState<'g, 't> {
        ParserState::new(self.grammar, tokens, self.config)
    }
}

/// Parse with the default configuration.
pub fn parse<S>(tokens: &S, start: StartRule, grammar: &Grammar) -> Result<Ast, ParseError>
where
    S: TokenSource + ?Sized,
{
    Parser::new(grammar).parse(tokens, start)
}
