//! Engine configuration.
//!
//! The grammar is ordered-choice with backtracking, so hostile input can make
//! parsing expensive. [`Limits`] caps the two things that drive that cost:
//! total input size and nesting depth.

/// Bounds applied to every parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Inputs longer than this many bytes (after normalisation) are rejected.
    pub max_input_bytes: usize,
    /// Maximum nesting of conditionals in a template, and of parenthesised
    /// groups in a boolean expression.
    pub max_depth: usize,
}

impl Limits {
    pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.max_input_bytes = bytes;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_input_bytes: Self::DEFAULT_MAX_INPUT_BYTES,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let l = Limits::default();
        assert_eq!(l.max_input_bytes, 65536);
        assert_eq!(l.max_depth, 64);
        assert_eq!(Limits::new(), l);
    }

    #[test]
    fn builder() {
        let l = Limits::new().with_max_depth(3).with_max_input_bytes(10);
        assert_eq!(l.max_depth, 3);
        assert_eq!(l.max_input_bytes, 10);
    }
}
