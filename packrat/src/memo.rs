use std::collections::HashMap;

use crate::ast::Value;
use crate::cursor::Mark;
use crate::grammar::RuleId;

pub type MemoKey = (RuleId, Mark);

/// The cached outcome of invoking a rule at a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoEntry {
    Success { value: Value, end: Mark },
    Failure,
}

/// Per-parse cache of rule attempts.
#[derive(Debug, Default)]
pub struct MemoTable {
    entries: HashMap<MemoKey, MemoEntry>,
}

impl MemoTable {
    pub fn new() -> Self {
        MemoTable::default()
    }

    pub fn lookup(&self, rule: RuleId, mark: Mark) -> Option<&MemoEntry> {
        self.entries.get(&(rule, mark))
    }

    /// Record the outcome for a key. Each key is written at most once.
    pub fn store(&mut self, rule: RuleId, mark: Mark, entry: MemoEntry) {
        let prev = self.entries.insert((rule, mark), entry);
        debug_assert!(
            prev.is_none(),
            "memo entry for rule {:?} at mark {} written twice",
            rule,
            mark
        );
    }

    /// Replace the seed of a left-recursive rule with a longer match.
    pub fn grow(&mut self, rule: RuleId, mark: Mark, entry: MemoEntry) {
        let prev = self.entries.insert((rule, mark), entry);
        debug_assert!(prev.is_some(), "growing unseeded rule {:?} at {}", rule, mark);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
