//! The rule engine.
//!
//! Every rule reference goes through `ParserState::call`, which applies the
//! recursion limit, the memo table and the left-recursion protocol before
//! evaluating the rule's expression. Combinators return a `Step`; fatal
//! conditions (limits) are `Err` and abort the whole parse.

use std::collections::HashMap;
use std::mem;

use tracing::{debug, trace};

use crate::ast::{Arena, Element, Value};
use crate::config::{ParserConfig, RED_ZONE, STACK_SEGMENT};
use crate::cursor::{Cursor, Mark};
use crate::error::{Expected, ParseError, ParseFailure};
use crate::grammar::{Expr, Grammar, Recursion, Rule, RuleId};
use crate::keywords::Keywords;
use crate::memo::{MemoEntry, MemoKey, MemoTable};
use crate::span::Span;
use crate::start::StartRule;
use crate::tokens::{Token, TokenKind};
use crate::Ast;

/// Outcome of evaluating an expression. `cut` is set once a cut has been
/// passed in the innermost enclosing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Matched { cut: bool },
    Failed { cut: bool },
}

impl Step {
    const MATCHED: Step = Step::Matched { cut: false };
    const FAILED: Step = Step::Failed { cut: false };

    fn matched(self) -> bool {
        matches!(self, Step::Matched { .. })
    }
}

/// A terminal the parser failed to match, resolved to `Expected` only when
/// the parse fails.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Want<'g> {
    Terminal(&'g Expr),
    EndOfInput,
}

impl<'g> Want<'g> {
    fn resolve(&self, keywords: &Keywords) -> Expected {
        match self {
            Want::EndOfInput => Expected::EndOfInput,
            Want::Terminal(expr) => match expr {
                Expr::Token(kind) => Expected::Token(*kind),
                Expr::Keyword(kw) => {
                    Expected::Keyword(keywords.reserved_word(*kw).unwrap_or_default().to_owned())
                }
                Expr::SoftKeyword(kw) => {
                    Expected::SoftKeyword(keywords.soft_word(*kw).unwrap_or_default().to_owned())
                }
                Expr::Punct(text) => Expected::Punct(text.clone()),
                _ => Expected::AnyToken,
            },
        }
    }
}

/// The furthest failure seen while evaluating some part of the input.
/// `rules` holds the active rules at that mark, starting from the rule that
/// owns this record.
#[derive(Debug, Clone, Default)]
struct Diagnostics<'g> {
    furthest: Mark,
    rules: Vec<RuleId>,
    expected: Vec<Want<'g>>,
}

impl<'g> Diagnostics<'g> {
    fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    fn record(&mut self, mark: Mark, rules: &[RuleId], want: Want<'g>) {
        if !self.is_empty() && mark < self.furthest {
            return;
        }
        if self.is_empty() || mark > self.furthest {
            self.furthest = mark;
            self.rules.clear();
            self.expected.clear();
        }
        for id in rules.iter() {
            if !self.rules.contains(id) {
                self.rules.push(*id);
            }
        }
        if !self.expected.contains(&want) {
            self.expected.push(want);
        }
    }

    /// Fold in the record of a nested rule, whose own active rules sit
    /// below `prefix`.
    fn merge(&mut self, prefix: &[RuleId], other: &Diagnostics<'g>) {
        if other.is_empty() || (!self.is_empty() && other.furthest < self.furthest) {
            return;
        }
        if self.is_empty() || other.furthest > self.furthest {
            self.furthest = other.furthest;
            self.rules.clear();
            self.expected.clear();
        }
        for id in prefix.iter().chain(other.rules.iter()) {
            if !self.rules.contains(id) {
                self.rules.push(*id);
            }
        }
        for want in other.expected.iter() {
            if !self.expected.contains(want) {
                self.expected.push(*want);
            }
        }
    }
}

/// Counters collected over a parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub memo_hits: usize,
    pub memo_misses: usize,
    pub memo_entries: usize,
    pub nodes: usize,
    /// Deepest rule nesting reached.
    pub max_depth: usize,
}

/// Parser state for a single token sequence.
#[derive(Debug)]
pub struct ParserState<'g, 't> {
    grammar: &'g Grammar,
    cursor: Cursor<'t>,
    memo: MemoTable,
    arena: Arena<'g>,
    config: ParserConfig,
    /// Active rules, outermost first.
    stack: Vec<RuleId>,
    /// Failures recorded for the innermost memoized rule, or for the whole
    /// parse. Lookaheads record into a scratch copy that is thrown away.
    diagnostics: Diagnostics<'g>,
    /// Index into `stack` of the rule that owns `diagnostics`.
    diagnostics_base: usize,
    /// Diagnostics of memoized attempts, replayed on memo hits.
    memo_diagnostics: HashMap<MemoKey, Diagnostics<'g>>,
    stats: ParseStats,
}

impl<'g, 't> ParserState<'g, 't> {
    pub fn new(grammar: &'g Grammar, tokens: &'t [Token], config: ParserConfig) -> Self {
        ParserState {
            grammar,
            cursor: Cursor::new(tokens),
            memo: MemoTable::new(),
            arena: Arena::new(),
            config,
            stack: Vec::new(),
            diagnostics: Diagnostics::default(),
            diagnostics_base: 0,
            memo_diagnostics: HashMap::new(),
            stats: ParseStats::default(),
        }
    }

    pub fn mark(&self) -> Mark {
        self.cursor.mark()
    }

    pub fn stats(&self) -> ParseStats {
        ParseStats {
            memo_entries: self.memo.len(),
            nodes: self.arena.len(),
            ..self.stats
        }
    }

    /// Run the rule for `start` from the first token and commit its tree.
    pub fn dispatch(&mut self, start: StartRule) -> Result<Ast, ParseError> {
        let name = start.rule_name();
        let id = self
            .grammar
            .rule_id(name)
            .ok_or_else(|| ParseError::InvalidStartRule(name.to_owned()))?;

        debug!(rule = name, tokens = self.cursor.tokens().len(), "dispatching start rule");
        self.cursor.reset(Mark::START);
        self.diagnostics = Diagnostics::default();
        self.diagnostics_base = 0;

        match self.call(id)? {
            Some(value) => {
                let end = self.cursor.mark();
                let grammar = self.grammar;
                let root = match value {
                    Value::Node(root) => root,
                    Value::Token(_) => self.arena.alloc(
                        grammar.rule(id).name(),
                        Span::new(Mark::START, end),
                        vec![Element { label: None, value }],
                    ),
                };
                let root = self.arena.commit(root, self.cursor.tokens());
                let stats = self.stats();
                debug!(
                    rule = name,
                    end = end.index(),
                    nodes = stats.nodes,
                    memo_hits = stats.memo_hits,
                    memo_misses = stats.memo_misses,
                    "parse complete"
                );
                Ok(Ast { root, end })
            }
            None => {
                let failure = self.failure();
                debug!(rule = name, furthest = failure.furthest.index(), "parse failed");
                Err(ParseError::Syntax(failure))
            }
        }
    }

    fn failure(&self) -> ParseFailure {
        let keywords = self.grammar.keywords();
        let diagnostics = &self.diagnostics;
        ParseFailure {
            furthest: diagnostics.furthest,
            rules: diagnostics
                .rules
                .iter()
                .map(|id| self.grammar.rule(*id).name().to_owned())
                .collect(),
            expected: diagnostics.expected.iter().map(|want| want.resolve(keywords)).collect(),
            found: self.cursor.token_at(diagnostics.furthest).cloned(),
        }
    }

    fn record_failure(&mut self, mark: Mark, want: Want<'g>) {
        let rules = &self.stack[self.diagnostics_base..];
        self.diagnostics.record(mark, rules, want);
    }

    /// Evaluate the rule on top of the stack with a fresh diagnostics record
    /// and return that record alongside the result. The record is folded
    /// into the caller's before returning.
    fn with_diagnostics<F>(&mut self, f: F) -> Result<(Option<Value>, Diagnostics<'g>), ParseError>
    where
        F: FnOnce(&mut Self) -> Result<Option<Value>, ParseError>,
    {
        let outer = mem::take(&mut self.diagnostics);
        let outer_base = mem::replace(&mut self.diagnostics_base, self.stack.len() - 1);
        let result = f(self);
        let local = mem::replace(&mut self.diagnostics, outer);
        self.diagnostics_base = outer_base;
        let result = result?;
        self.merge_diagnostics(&local);
        Ok((result, local))
    }

    /// Fold a nested rule's record into the current one. The nested rule is
    /// on top of the stack.
    fn merge_diagnostics(&mut self, nested: &Diagnostics<'g>) {
        let top = self.stack.len().saturating_sub(1);
        let prefix = &self.stack[self.diagnostics_base.min(top)..top];
        self.diagnostics.merge(prefix, nested);
    }

    /// Invoke a rule at the current mark.
    fn call(&mut self, id: RuleId) -> Result<Option<Value>, ParseError> {
        let grammar = self.grammar;
        let rule = grammar.rule(id);
        if self.stack.len() >= self.config.max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                rule: rule.name().to_owned(),
                limit: self.config.max_depth,
            });
        }
        self.stack.push(id);
        self.stats.max_depth = self.stats.max_depth.max(self.stack.len());

        let result = stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || match rule.recursion() {
            Recursion::Leader => self.grow_left_recursive(id),
            Recursion::None if self.config.memoize => self.memoized(id),
            Recursion::None | Recursion::Member => self.invoke(id),
        });

        self.stack.pop();
        result
    }

    /// Replay a memo entry and its diagnostics, moving the cursor to its end
    /// on success.
    fn replay(&mut self, id: RuleId, entry: MemoEntry) -> Option<Value> {
        let mark = self.cursor.mark();
        self.stats.memo_hits += 1;
        trace!(rule = self.grammar.rule(id).name(), mark = mark.index(), "memo hit");
        if let Some(nested) = self.memo_diagnostics.get(&(id, mark)).cloned() {
            self.merge_diagnostics(&nested);
        }
        match entry {
            MemoEntry::Success { value, end } => {
                self.cursor.reset(end);
                Some(value)
            }
            MemoEntry::Failure => None,
        }
    }

    fn memoized(&mut self, id: RuleId) -> Result<Option<Value>, ParseError> {
        let mark = self.cursor.mark();
        if let Some(entry) = self.memo.lookup(id, mark).copied() {
            return Ok(self.replay(id, entry));
        }
        self.stats.memo_misses += 1;

        let (result, diagnostics) = self.with_diagnostics(|state| state.invoke(id))?;
        let entry = match result {
            Some(value) => MemoEntry::Success {
                value,
                end: self.cursor.mark(),
            },
            None => MemoEntry::Failure,
        };
        self.memo.store(id, mark, entry);
        self.remember_diagnostics(id, mark, diagnostics);
        Ok(result)
    }

    fn remember_diagnostics(&mut self, id: RuleId, mark: Mark, diagnostics: Diagnostics<'g>) {
        if !diagnostics.is_empty() {
            self.memo_diagnostics.insert((id, mark), diagnostics);
        }
    }

    /// Seed a failure for a left-recursive leader, then grow it.
    fn grow_left_recursive(&mut self, id: RuleId) -> Result<Option<Value>, ParseError> {
        let mark = self.cursor.mark();
        if let Some(entry) = self.memo.lookup(id, mark).copied() {
            return Ok(self.replay(id, entry));
        }
        self.stats.memo_misses += 1;
        self.memo.store(id, mark, MemoEntry::Failure);

        let (result, diagnostics) = self.with_diagnostics(|state| state.grow_seed(id, mark))?;
        self.remember_diagnostics(id, mark, diagnostics);
        Ok(result)
    }

    /// Re-evaluate a seeded rule while each attempt ends strictly further
    /// than the last. Every accepted attempt consumes at least one more
    /// token, so the iteration limit bounds the length of a left-recursive
    /// chain as well as runaway growth.
    fn grow_seed(&mut self, id: RuleId, mark: Mark) -> Result<Option<Value>, ParseError> {
        let grammar = self.grammar;
        let name = grammar.rule(id).name();
        let limit = self.config.max_fixed_point_iterations;
        let mut best: Option<(Value, Mark)> = None;
        let mut iterations = 0;
        loop {
            iterations += 1;
            if iterations > limit {
                return Err(ParseError::FixedPointLimitExceeded {
                    rule: name.to_owned(),
                    limit,
                });
            }

            self.cursor.reset(mark);
            let result = self.invoke(id)?;
            let end = self.cursor.mark();
            match result {
                Some(value) if best.map_or(true, |(_, best_end)| end > best_end) => {
                    debug!(
                        rule = name,
                        start = mark.index(),
                        end = end.index(),
                        iterations,
                        "grew left-recursive seed"
                    );
                    best = Some((value, end));
                    self.memo.grow(id, mark, MemoEntry::Success { value, end });
                }
                _ => break,
            }
        }

        match best {
            Some((value, end)) => {
                self.cursor.reset(end);
                Ok(Some(value))
            }
            None => {
                self.cursor.reset(mark);
                Ok(None)
            }
        }
    }

    /// Evaluate a rule's body and build its value.
    fn invoke(&mut self, id: RuleId) -> Result<Option<Value>, ParseError> {
        let grammar = self.grammar;
        let rule = grammar.rule(id);
        let start = self.cursor.mark();
        let mut out = Vec::new();
        match self.eval(rule.expr(), &mut out)? {
            Step::Matched { .. } => Ok(Some(self.build(rule, start, out))),
            Step::Failed { .. } => {
                self.cursor.reset(start);
                Ok(None)
            }
        }
    }

    /// A declared kind always builds a node. Otherwise a single unlabelled
    /// value passes through, and anything else is wrapped in a node named
    /// after the rule.
    fn build(&mut self, rule: &'g Rule, start: Mark, out: Vec<Element<'g>>) -> Value {
        let span = Span::new(start, self.cursor.mark());
        match rule.kind() {
            Some(kind) => Value::Node(self.arena.alloc(kind, span, out)),
            None => match out.as_slice() {
                [Element { label: None, value }] => *value,
                _ => Value::Node(self.arena.alloc(rule.name(), span, out)),
            },
        }
    }

    fn eval(&mut self, expr: &'g Expr, out: &mut Vec<Element<'g>>) -> Result<Step, ParseError> {
        let grammar = self.grammar;
        let keywords = grammar.keywords();
        Ok(match expr {
            Expr::Rule(id) => match self.call(*id)? {
                Some(value) => {
                    out.push(Element { label: None, value });
                    Step::MATCHED
                }
                None => Step::FAILED,
            },
            Expr::Token(TokenKind::Name) => self.terminal(expr, true, out, |tok| keywords.is_identifier(tok)),
            Expr::Token(TokenKind::Keyword) => {
                self.terminal(expr, true, out, |tok| keywords.token_as_keyword(tok).is_some())
            }
            Expr::Token(kind) => self.terminal(expr, true, out, |tok| tok.kind == *kind),
            Expr::Keyword(kw) => {
                self.terminal(expr, false, out, |tok| keywords.token_as_keyword(tok) == Some(*kw))
            }
            Expr::SoftKeyword(kw) => self.terminal(expr, false, out, |tok| {
                keywords.token_as_soft_keyword(tok) == Some(*kw)
            }),
            Expr::Punct(text) => self.terminal(expr, false, out, |tok| {
                tok.kind == TokenKind::Op && tok.text == *text
            }),
            Expr::Any => self.terminal(expr, true, out, |_| true),
            Expr::Seq(items) => self.sequence(items, out)?,
            Expr::Choice(alts) => self.choice(alts, out)?,
            Expr::Optional(expr) => self.optional(expr, out)?,
            Expr::Repeat { expr, min } => self.repeat(expr, *min, out)?,
            Expr::Lookahead { expr, positive } => self.lookahead(expr, *positive)?,
            Expr::Cut => Step::Matched { cut: true },
            Expr::Label(label, expr) => self.label(label, expr, out)?,
        })
    }

    /// Match a single token. `leaf` controls whether the token becomes a
    /// value.
    fn terminal<F>(&mut self, expr: &'g Expr, leaf: bool, out: &mut Vec<Element<'g>>, accept: F) -> Step
    where
        F: FnOnce(&Token) -> bool,
    {
        let start = self.cursor.mark();
        let accepted = match self.cursor.advance() {
            Ok(tok) => accept(tok),
            Err(_) => false,
        };
        if !accepted {
            self.cursor.reset(start);
            self.record_failure(start, Want::Terminal(expr));
            return Step::FAILED;
        }
        if leaf {
            out.push(Element {
                label: None,
                value: Value::Token(start),
            });
        }
        Step::MATCHED
    }

    fn sequence(&mut self, items: &'g [Expr], out: &mut Vec<Element<'g>>) -> Result<Step, ParseError> {
        let start = self.cursor.mark();
        let len = out.len();
        let mut cut = false;
        for item in items.iter() {
            match self.eval(item, out)? {
                Step::Matched { cut: c } => cut |= c,
                Step::Failed { cut: c } => {
                    self.cursor.reset(start);
                    out.truncate(len);
                    return Ok(Step::Failed { cut: cut || c });
                }
            }
        }
        Ok(Step::Matched { cut })
    }

    /// First alternative to match wins. A failed alternative that passed a
    /// cut ends the choice.
    fn choice(&mut self, alts: &'g [Expr], out: &mut Vec<Element<'g>>) -> Result<Step, ParseError> {
        let start = self.cursor.mark();
        let len = out.len();
        for alt in alts.iter() {
            match self.eval(alt, out)? {
                Step::Matched { .. } => return Ok(Step::MATCHED),
                Step::Failed { cut } => {
                    self.cursor.reset(start);
                    out.truncate(len);
                    if cut {
                        break;
                    }
                }
            }
        }
        Ok(Step::FAILED)
    }

    fn optional(&mut self, expr: &'g Expr, out: &mut Vec<Element<'g>>) -> Result<Step, ParseError> {
        let start = self.cursor.mark();
        let len = out.len();
        if !self.eval(expr, out)?.matched() {
            self.cursor.reset(start);
            out.truncate(len);
        }
        Ok(Step::MATCHED)
    }

    fn repeat(&mut self, expr: &'g Expr, min: usize, out: &mut Vec<Element<'g>>) -> Result<Step, ParseError> {
        let start = self.cursor.mark();
        let len = out.len();
        let mut count = 0;
        loop {
            let before = self.cursor.mark();
            let before_len = out.len();
            if !self.eval(expr, out)?.matched() {
                self.cursor.reset(before);
                out.truncate(before_len);
                break;
            }
            count += 1;
            // An empty match would repeat forever.
            if self.cursor.mark() == before {
                break;
            }
        }
        if count < min {
            self.cursor.reset(start);
            out.truncate(len);
            return Ok(Step::FAILED);
        }
        Ok(Step::MATCHED)
    }

    fn lookahead(&mut self, expr: &'g Expr, positive: bool) -> Result<Step, ParseError> {
        let start = self.cursor.mark();
        let mut scratch = Vec::new();
        let outer = mem::take(&mut self.diagnostics);
        let step = self.eval(expr, &mut scratch);
        self.diagnostics = outer;
        let matched = step?.matched();
        self.cursor.reset(start);

        if !positive && matched && *expr == Expr::Any {
            self.record_failure(start, Want::EndOfInput);
        }
        Ok(if matched == positive {
            Step::MATCHED
        } else {
            Step::FAILED
        })
    }

    /// Tag the values produced by `expr`. A match of one token that produced
    /// no value keeps that token under the label.
    fn label(&mut self, label: &'g str, expr: &'g Expr, out: &mut Vec<Element<'g>>) -> Result<Step, ParseError> {
        let start = self.cursor.mark();
        let len = out.len();
        let step = self.eval(expr, out)?;
        if step.matched() {
            if out.len() == len {
                if self.cursor.mark().index() == start.index() + 1 {
                    out.push(Element {
                        label: Some(label),
                        value: Value::Token(start),
                    });
                }
            } else {
                for el in out[len..].iter_mut() {
                    el.label = Some(label);
                }
            }
        }
        Ok(step)
    }
}
