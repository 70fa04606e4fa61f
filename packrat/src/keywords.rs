use indexmap::IndexSet;

use crate::error::GrammarError;
use crate::tokens::{Token, TokenKind};

/// Index of a word in the reserved keyword list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReservedKeyword(usize);

/// Index of a word in the soft keyword list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoftKeyword(usize);

/// Reserved and soft keyword sets, fixed when a grammar is built.
///
/// Reserved keywords can never be used as identifiers. Soft keywords are
/// ordinary names everywhere except where a grammar rule asks for them by
/// spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    reserved: IndexSet<String>,
    soft: IndexSet<String>,
}

impl Keywords {
    pub fn new<R, S>(reserved: R, soft: S) -> Result<Self, GrammarError>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let reserved: IndexSet<String> = reserved.into_iter().map(Into::into).collect();
        let soft: IndexSet<String> = soft.into_iter().map(Into::into).collect();
        if let Some(word) = soft.iter().find(|word| reserved.contains(*word)) {
            return Err(GrammarError::KeywordConflict(word.clone()));
        }
        Ok(Keywords { reserved, soft })
    }

    pub fn reserved(&self, word: &str) -> Option<ReservedKeyword> {
        self.reserved.get_index_of(word).map(ReservedKeyword)
    }

    pub fn soft(&self, word: &str) -> Option<SoftKeyword> {
        self.soft.get_index_of(word).map(SoftKeyword)
    }

    pub fn reserved_word(&self, kw: ReservedKeyword) -> Option<&str> {
        self.reserved.get_index(kw.0).map(String::as_str)
    }

    pub fn soft_word(&self, kw: SoftKeyword) -> Option<&str> {
        self.soft.get_index(kw.0).map(String::as_str)
    }

    pub fn reserved_words(&self) -> impl Iterator<Item = &str> {
        self.reserved.iter().map(String::as_str)
    }

    pub fn soft_words(&self) -> impl Iterator<Item = &str> {
        self.soft.iter().map(String::as_str)
    }

    /// The reserved keyword spelled by a `NAME` or `KEYWORD` token.
    pub fn token_as_keyword(&self, token: &Token) -> Option<ReservedKeyword> {
        match token.kind {
            TokenKind::Name | TokenKind::Keyword => self.reserved(&token.text),
            _ => None,
        }
    }

    /// The soft keyword spelled by a `NAME` token.
    pub fn token_as_soft_keyword(&self, token: &Token) -> Option<SoftKeyword> {
        match token.kind {
            TokenKind::Name => self.soft(&token.text),
            _ => None,
        }
    }

    /// Whether the token can fill a `NAME` slot. Soft keywords can,
    /// reserved keywords cannot.
    pub fn is_identifier(&self, token: &Token) -> bool {
        token.kind == TokenKind::Name && self.reserved(&token.text).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Keywords {
        Keywords::new(vec!["if", "class", "else"], vec!["match", "case"]).unwrap()
    }

    #[test]
    fn classify_tokens() {
        let kw = keywords();
        let tests = vec![
            // (kind, text, keyword, soft keyword, identifier)
            (TokenKind::Name, "x", false, false, true),
            (TokenKind::Name, "class", true, false, false),
            (TokenKind::Keyword, "class", true, false, false),
            (TokenKind::Name, "match", false, true, true),
            (TokenKind::Keyword, "match", false, false, false),
            (TokenKind::String, "'if'", false, false, false),
            (TokenKind::Op, "if", false, false, false),
        ];
        for test in tests {
            let tok = Token::synthetic(test.0, test.1);
            assert_eq!(kw.token_as_keyword(&tok).is_some(), test.2, "{}", tok);
            assert_eq!(kw.token_as_soft_keyword(&tok).is_some(), test.3, "{}", tok);
            assert_eq!(kw.is_identifier(&tok), test.4, "{}", tok);
        }
    }

    #[test]
    fn keyword_indices_are_stable() {
        let kw = keywords();
        let class = kw.reserved("class").unwrap();
        assert_eq!(kw.reserved_word(class), Some("class"));
        assert_eq!(kw.soft_word(kw.soft("case").unwrap()), Some("case"));
        assert_eq!(
            kw.reserved_words().collect::<Vec<_>>(),
            vec!["if", "class", "else"]
        );
    }

    #[test]
    fn conflicting_keywords() {
        let err = Keywords::new(vec!["if", "match"], vec!["match"]).unwrap_err();
        assert_eq!(err, GrammarError::KeywordConflict("match".to_owned()));
    }
}
