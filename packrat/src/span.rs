use std::fmt::{self, Display};

use crate::cursor::Mark;
use crate::tokens::Token;

/// Describes the location of a span relative to another span.
#[derive(Debug, PartialEq)]
pub enum RelativeLocation {
    Before,
    After,
    /// The span is completely contained inside the other span, or both
    /// spans cover the same region.
    Within,
    /// The span completely encompasses the other span.
    Encompasses,
}

/// A half-open region `[start, end)` over the token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Mark,
    pub end: Mark,
}

impl Span {
    pub fn new(start: Mark, end: Mark) -> Self {
        debug_assert!(start <= end, "span start {} after end {}", start, end);
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.index() - self.start.index()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The tokens covered by this span.
    pub fn tokens<'t>(&self, tokens: &'t [Token]) -> &'t [Token] {
        tokens
            .get(self.start.index()..self.end.index())
            .unwrap_or(&[])
    }

    /// Describes this span's location relative to `other`. Returns `None`
    /// when the spans partially overlap.
    pub fn relative_location(&self, other: &Self) -> Option<RelativeLocation> {
        if self.start <= other.start && self.end <= other.start {
            Some(RelativeLocation::Before)
        } else if self.start >= other.end {
            Some(RelativeLocation::After)
        } else if self.start >= other.start && self.end <= other.end {
            Some(RelativeLocation::Within)
        } else if self.start <= other.start && self.end >= other.end {
            Some(RelativeLocation::Encompasses)
        } else {
            None
        }
    }

    /// Check if this span contains the entirety of the other span.
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
