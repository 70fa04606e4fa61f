//! A Python-like grammar on the packrat engine.
//!
//! The grammar lives in `python.ebnf` and is compiled once, on first use.
//! Tokens come from an external tokenizer. Reserved keywords may arrive as
//! either `NAME` or `KEYWORD` tokens, soft keywords always arrive as `NAME`.

use anyhow::{Context, Result};
use derive::Grammar;
use once_cell::sync::OnceCell;
use packrat::{Ast, GrammarSource, Parser, ParserConfig, StartRule, TokenSource};
use tracing::debug;

#[derive(Grammar)]
#[ebnf_file = "src/python.ebnf"]
#[reserved_keywords = "False None True and as assert async await break class continue
                       def del elif else except finally for from global if import in
                       is lambda nonlocal not or pass raise return try while with yield"]
#[soft_keywords = "match case _"]
pub struct Python;

static GRAMMAR: OnceCell<packrat::Grammar> = OnceCell::new();

/// The compiled grammar, shared by every parse.
pub fn grammar() -> Result<&'static packrat::Grammar> {
    GRAMMAR.get_or_try_init(|| {
        let grammar = Python::grammar().context("failed to compile python grammar")?;
        debug!(rules = grammar.len(), "compiled python grammar");
        Ok(grammar)
    })
}

impl Rule {
    /// The rule a start mode runs.
    pub fn start(start: StartRule) -> Rule {
        match start {
            StartRule::FileInput => Rule::file,
            StartRule::SingleInput => Rule::interactive,
            StartRule::EvalInput => Rule::eval,
            StartRule::FuncTypeInput => Rule::func_type,
        }
    }
}

pub fn parse<S>(tokens: &S, start: StartRule) -> Result<Ast>
where
    S: TokenSource + ?Sized,
{
    parse_with_config(tokens, start, ParserConfig::default())
}

pub fn parse_with_config<S>(tokens: &S, start: StartRule, config: ParserConfig) -> Result<Ast>
where
    S: TokenSource + ?Sized,
{
    let grammar = grammar()?;
    let ast = Parser::with_config(grammar, config).parse(tokens, start)?;
    Ok(ast)
}

/// Parse with a mode name: `exec`, `single`, `eval` or `func_type`.
pub fn parse_mode<S>(tokens: &S, mode: &str) -> Result<Ast>
where
    S: TokenSource + ?Sized,
{
    let start: StartRule = mode.parse()?;
    parse(tokens, start)
}

/// Parse a whole module.
pub fn parse_file<S: TokenSource + ?Sized>(tokens: &S) -> Result<Ast> {
    parse(tokens, StartRule::FileInput)
}

/// Parse one interactive statement.
pub fn parse_single<S: TokenSource + ?Sized>(tokens: &S) -> Result<Ast> {
    parse(tokens, StartRule::SingleInput)
}

/// Parse an expression.
pub fn parse_eval<S: TokenSource + ?Sized>(tokens: &S) -> Result<Ast> {
    parse(tokens, StartRule::EvalInput)
}

/// Parse a function type comment, `(int, str) -> bool`.
pub fn parse_func_type<S: TokenSource + ?Sized>(tokens: &S) -> Result<Ast> {
    parse(tokens, StartRule::FuncTypeInput)
}
