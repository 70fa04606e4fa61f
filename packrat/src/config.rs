/// Stack left before a recursive call moves to a fresh segment, and the size
/// of that segment.
pub(crate) const RED_ZONE: usize = 64 * 1024;
pub(crate) const STACK_SEGMENT: usize = 1024 * 1024;

/// Limits and switches for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of nested rule invocations. The stack grows on the
    /// heap as needed, so this bounds memory rather than the thread stack.
    pub max_depth: usize,
    /// Maximum number of growth iterations for one left-recursive seed.
    ///
    /// Each accepted iteration consumes at least one more token, so this also
    /// caps the length of a single left-recursive chain: `a + b + c` takes
    /// three accepted iterations and a final one that stops growing.
    pub max_fixed_point_iterations: usize,
    /// Cache results of rules that are not left-recursive. Left-recursive
    /// leaders always use the memo table.
    pub memoize: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: 2000,
            max_fixed_point_iterations: 10_000,
            memoize: true,
        }
    }
}

impl ParserConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_fixed_point_iterations(mut self, iterations: usize) -> Self {
        self.max_fixed_point_iterations = iterations;
        self
    }

    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }
}
