//! Parse failure model.
//!
//! Parsing is the only stage that can fail; evaluation always produces a
//! result. A [`ParseError`] names the root rule that was attempted, keeps the
//! normalised input, and carries a [`Cause`] describing where and why the
//! grammar did not match.

use std::fmt;

/// The four root productions callers can parse against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Template,
    BooleanExpression,
    ValueExpression,
    AssignmentList,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rule::Template => "template",
            Rule::BooleanExpression => "boolean expression",
            Rule::ValueExpression => "value expression",
            Rule::AssignmentList => "assignment list",
        })
    }
}

/// Why a parse failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Cause {
    /// No alternative matched. Reports the furthest position any alternative
    /// reached and what the grammar would have accepted there.
    #[error("expected {} at line {line}, column {column}, found {}", expected_list(.expected), found_desc(.found))]
    Mismatch {
        /// Byte offset into the normalised input.
        offset: usize,
        /// 1-based line number.
        line: usize,
        /// 1-based column, counted in characters.
        column: usize,
        /// Character at `offset`, or `None` at end of input.
        found: Option<char>,
        /// Descriptions of the constructs that would have matched, in the
        /// order the grammar tried them.
        expected: Vec<String>,
    },

    /// Input exceeded [`Limits::max_input_bytes`](crate::config::Limits).
    #[error("input is {len} bytes, limit is {limit}")]
    InputTooLong { len: usize, limit: usize },

    /// Conditionals or groups nested deeper than
    /// [`Limits::max_depth`](crate::config::Limits).
    #[error("nesting deeper than {limit} levels")]
    TooDeep { limit: usize },
}

fn expected_list(expected: &[String]) -> String {
    match expected {
        [] => "end of input".to_owned(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

fn found_desc(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{c:?}"),
        None => "end of input".to_owned(),
    }
}

/// Input text did not conform to the grammar of the requested root rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to parse {rule}: {cause}")]
pub struct ParseError {
    pub rule: Rule,
    /// The normalised text that was parsed.
    pub text: String,
    #[source]
    pub cause: Cause,
}

impl ParseError {
    pub fn new(rule: Rule, text: impl Into<String>, cause: Cause) -> Self {
        ParseError {
            rule,
            text: text.into(),
            cause,
        }
    }

    /// Byte offset of the failure, when the cause has one.
    pub fn offset(&self) -> Option<usize> {
        match self.cause {
            Cause::Mismatch { offset, .. } => Some(offset),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
