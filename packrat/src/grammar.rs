//! Grammars compiled for the rule engine.
//!
//! An `ebnf::Grammar` is resolved against a set of keywords: identifiers
//! become rule ids or token kinds, quoted words become keyword handles, and
//! left-recursive cycles are assigned a leader.

use indexmap::IndexMap;

use ebnf::Rhs;

use crate::analysis;
use crate::error::GrammarError;
use crate::keywords::{Keywords, ReservedKeyword, SoftKeyword};
use crate::tokens::TokenKind;

/// Index of a rule in its grammar, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

impl RuleId {
    pub fn new(idx: usize) -> Self {
        RuleId(idx)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A compiled parsing expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Rule(RuleId),
    Token(TokenKind),
    Keyword(ReservedKeyword),
    SoftKeyword(SoftKeyword),
    /// An `OP` token with exactly this text.
    Punct(String),
    Any,
    Seq(Vec<Expr>),
    Choice(Vec<Expr>),
    Optional(Box<Expr>),
    Repeat { expr: Box<Expr>, min: usize },
    Lookahead { expr: Box<Expr>, positive: bool },
    Cut,
    Label(String, Box<Expr>),
}

/// How a rule takes part in left recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recursion {
    None,
    /// Seeded and grown through the memo table.
    Leader,
    /// Part of a leader's cycle; never memoized.
    Member,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) name: String,
    pub(crate) kind: Option<String>,
    pub(crate) expr: Expr,
    pub(crate) recursion: Recursion,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node kind this rule builds, if declared with `name[Kind]`.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn recursion(&self) -> Recursion {
        self.recursion
    }
}

/// An immutable, compiled grammar. Safe to share between threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: IndexMap<String, Rule>,
    keywords: Keywords,
}

impl Grammar {
    pub fn new(source: &ebnf::Grammar, keywords: Keywords) -> Result<Self, GrammarError> {
        let mut ids = IndexMap::with_capacity(source.rules.len());
        for prod in source.rules.iter() {
            let name = prod.lhs.name.as_str();
            if ids.insert(name.to_owned(), RuleId(ids.len())).is_some() {
                return Err(GrammarError::DuplicateRule(name.to_owned()));
            }
        }

        let mut rules = IndexMap::with_capacity(ids.len());
        for prod in source.rules.iter() {
            let compiler = Compiler {
                rule: prod.lhs.name.as_str(),
                ids: &ids,
                keywords: &keywords,
            };
            let rule = Rule {
                name: prod.lhs.name.to_string(),
                kind: prod.lhs.kind.as_ref().map(|kind| kind.to_string()),
                expr: compiler.compile(&prod.rhs)?,
                recursion: Recursion::None,
            };
            rules.insert(rule.name.clone(), rule);
        }

        let exprs: Vec<&Expr> = rules.values().map(|rule| &rule.expr).collect();
        let recursion = analysis::left_recursion(&exprs).map_err(|cycle| {
            GrammarError::NoLeftRecursionLeader(
                cycle
                    .into_iter()
                    .filter_map(|id| rules.get_index(id.0).map(|(name, _)| name.clone()))
                    .collect(),
            )
        })?;
        for (rule, recursion) in rules.values_mut().zip(recursion) {
            rule.recursion = recursion;
        }

        Ok(Grammar { rules, keywords })
    }

    /// Parse grammar text and compile it.
    pub fn from_ebnf(text: &str, keywords: Keywords) -> Result<Self, GrammarError> {
        let source: ebnf::Grammar = text.parse()?;
        Grammar::new(&source, keywords)
    }

    pub fn from_source<G: GrammarSource + ?Sized>() -> Result<Self, GrammarError> {
        G::grammar()
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.rules.get_index_of(name).map(RuleId)
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// The rule for an id handed out by this grammar.
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A type that carries its grammar text and keyword lists. Usually
/// implemented with `#[derive(Grammar)]`.
pub trait GrammarSource {
    const EBNF: &'static str;
    const RESERVED_KEYWORDS: &'static [&'static str];
    const SOFT_KEYWORDS: &'static [&'static str];

    fn grammar() -> Result<Grammar, GrammarError> {
        let keywords = Keywords::new(
            Self::RESERVED_KEYWORDS.iter().copied(),
            Self::SOFT_KEYWORDS.iter().copied(),
        )?;
        Grammar::from_ebnf(Self::EBNF, keywords)
    }
}

struct Compiler<'a> {
    rule: &'a str,
    ids: &'a IndexMap<String, RuleId>,
    keywords: &'a Keywords,
}

impl<'a> Compiler<'a> {
    fn compile(&self, rhs: &Rhs) -> Result<Expr, GrammarError> {
        Ok(match rhs {
            Rhs::Identifier(iden) => match self.ids.get(iden.as_str()) {
                Some(id) => Expr::Rule(*id),
                None if iden.is_token_kind() => match TokenKind::from_grammar_name(iden.as_str()) {
                    Some(kind) => Expr::Token(kind),
                    None => {
                        return Err(GrammarError::UnknownToken {
                            rule: self.rule.to_owned(),
                            name: iden.to_string(),
                        })
                    }
                },
                None => {
                    return Err(GrammarError::UndefinedRule {
                        rule: self.rule.to_owned(),
                        name: iden.to_string(),
                    })
                }
            },
            Rhs::Terminal(term) if term.is_word() => match self.keywords.reserved(term.as_str()) {
                Some(kw) => Expr::Keyword(kw),
                None => {
                    return Err(GrammarError::UnknownKeyword {
                        rule: self.rule.to_owned(),
                        word: term.as_str().to_owned(),
                    })
                }
            },
            Rhs::SoftTerminal(term) if term.is_word() => match self.keywords.soft(term.as_str()) {
                Some(kw) => Expr::SoftKeyword(kw),
                None => {
                    return Err(GrammarError::UnknownSoftKeyword {
                        rule: self.rule.to_owned(),
                        word: term.as_str().to_owned(),
                    })
                }
            },
            Rhs::Terminal(term) | Rhs::SoftTerminal(term) => Expr::Punct(term.as_str().to_owned()),
            Rhs::Any => Expr::Any,
            Rhs::Optional(rhs) => Expr::Optional(Box::new(self.compile(rhs)?)),
            Rhs::Repeat(rhs) => Expr::Repeat {
                expr: Box::new(self.compile(rhs)?),
                min: 0,
            },
            Rhs::RepeatOne(rhs) => Expr::Repeat {
                expr: Box::new(self.compile(rhs)?),
                min: 1,
            },
            Rhs::Group(rhs) => self.compile(rhs)?,
            // `a - b` matches `a` only where `b` does not.
            Rhs::Exception(rhs, except) => Expr::Seq(vec![
                Expr::Lookahead {
                    expr: Box::new(self.compile(except)?),
                    positive: false,
                },
                self.compile(rhs)?,
            ]),
            Rhs::Alternation(alts) => Expr::Choice(
                alts.iter()
                    .map(|alt| self.compile(alt))
                    .collect::<Result<_, _>>()?,
            ),
            Rhs::Concatenation(items) => Expr::Seq(
                items
                    .iter()
                    .map(|item| self.compile(item))
                    .collect::<Result<_, _>>()?,
            ),
            Rhs::Lookahead(rhs) => Expr::Lookahead {
                expr: Box::new(self.compile(rhs)?),
                positive: true,
            },
            Rhs::NegativeLookahead(rhs) => Expr::Lookahead {
                expr: Box::new(self.compile(rhs)?),
                positive: false,
            },
            Rhs::Cut => Expr::Cut,
            Rhs::Labeled(label, rhs) => Expr::Label(label.to_string(), Box::new(self.compile(rhs)?)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Keywords {
        Keywords::new(vec!["if", "else"], vec!["match"]).unwrap()
    }

    #[test]
    fn compile_terminals() {
        let g = Grammar::from_ebnf(
            "a = 'if' \"match\" ':' \"->\" NAME . ;",
            keywords(),
        )
        .unwrap();
        let kw = g.keywords();
        assert_eq!(
            g.get("a").unwrap().expr(),
            &Expr::Seq(vec![
                Expr::Keyword(kw.reserved("if").unwrap()),
                Expr::SoftKeyword(kw.soft("match").unwrap()),
                Expr::Punct(":".to_owned()),
                Expr::Punct("->".to_owned()),
                Expr::Token(TokenKind::Name),
                Expr::Any,
            ])
        );
    }

    #[test]
    fn compile_rule_references() {
        let g = Grammar::from_ebnf("a[A] = b | NAME ; b = ( 'else' ) ; NEWLINE = 'if' ;", keywords())
            .unwrap();
        let a = g.get("a").unwrap();
        assert_eq!(a.kind(), Some("A"));
        assert_eq!(
            a.expr(),
            &Expr::Choice(vec![Expr::Rule(RuleId(1)), Expr::Token(TokenKind::Name)])
        );
        // A defined rule shadows the token kind of the same name.
        assert_eq!(g.rule_id("NEWLINE"), Some(RuleId(2)));
        assert_eq!(g.rule(RuleId(2)).name(), "NEWLINE");
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn compile_exception() {
        let g = Grammar::from_ebnf("a = NAME - 'if' ;", keywords()).unwrap();
        let kw = g.keywords().reserved("if").unwrap();
        assert_eq!(
            g.get("a").unwrap().expr(),
            &Expr::Seq(vec![
                Expr::Lookahead {
                    expr: Box::new(Expr::Keyword(kw)),
                    positive: false,
                },
                Expr::Token(TokenKind::Name),
            ])
        );
    }

    #[test]
    fn grammar_errors() {
        let tests = vec![
            ("a = b ;", GrammarError::UndefinedRule {
                rule: "a".to_owned(),
                name: "b".to_owned(),
            }),
            ("a = IDENT ;", GrammarError::UnknownToken {
                rule: "a".to_owned(),
                name: "IDENT".to_owned(),
            }),
            ("a = 'while' ;", GrammarError::UnknownKeyword {
                rule: "a".to_owned(),
                word: "while".to_owned(),
            }),
            ("a = \"case\" ;", GrammarError::UnknownSoftKeyword {
                rule: "a".to_owned(),
                word: "case".to_owned(),
            }),
            ("a = NAME ; a = NUMBER ;", GrammarError::DuplicateRule("a".to_owned())),
            (
                "a = a '+' | b '-' | NAME ; b = b '*' | a '/' | NUMBER ;",
                GrammarError::NoLeftRecursionLeader(vec!["a".to_owned(), "b".to_owned()]),
            ),
        ];
        for test in tests {
            let err = Grammar::from_ebnf(test.0, keywords()).unwrap_err();
            assert_eq!(err, test.1, "grammar: {}", test.0);
        }
    }

    #[test]
    fn notation_error() {
        let err = Grammar::from_ebnf("a = ;", keywords()).unwrap_err();
        assert!(matches!(err, GrammarError::Notation(_)), "{:?}", err);
    }

    #[test]
    fn recursion_roles() {
        let g = Grammar::from_ebnf(
            "expr = expr '+' term | term ; term = NUMBER ; \
             attr = name_or_attr '.' NAME ; name_or_attr = attr | NAME ;",
            keywords(),
        )
        .unwrap();
        let roles: Vec<_> = g.rules().map(|r| (r.name(), r.recursion())).collect();
        assert_eq!(
            roles,
            vec![
                ("expr", Recursion::Leader),
                ("term", Recursion::None),
                ("attr", Recursion::Leader),
                ("name_or_attr", Recursion::Member),
            ]
        );
    }
}
