//! Backtracking scanner shared by every grammar rule.
//!
//! The grammar is a PEG: alternatives are tried in written order and a failed
//! alternative rewinds to where it started. [`Parser`] holds the input and a
//! byte position that rules save with [`Parser::mark`] and restore with
//! [`Parser::reset`]. Rule methods return `Option<T>`; `None` means "this
//! alternative did not match" and is never an error by itself.
//!
//! Every failed terminal reports what it wanted via [`Parser::expected`]. Only
//! the furthest position reached is remembered, which is what a reader
//! usually wants to see when the whole parse gives up.
//!
//! The rules themselves live next to their AST types in
//! [`expr`](crate::expr), [`template`](crate::template) and
//! [`assign`](crate::assign), as further `impl Parser` blocks.

use crate::config::Limits;
use crate::error::{Cause, ParseError, Rule};
use crate::var::{is_ident_continue, is_ident_start};

/// Something a failed terminal wanted to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expected {
    /// An exact piece of text, shown quoted.
    Literal(&'static str),
    /// A named construct ("identifier", "number", …).
    Named(&'static str),
}

impl Expected {
    fn describe(self) -> String {
        match self {
            Expected::Literal(s) => format!("'{s}'"),
            Expected::Named(s) => s.to_owned(),
        }
    }
}

pub(crate) struct Parser<'a> {
    src: &'a str,
    pos: usize,
    limits: Limits,
    depth: usize,
    too_deep: bool,
    furthest: usize,
    expected: Vec<Expected>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str, limits: &Limits) -> Self {
        Parser {
            src,
            pos: 0,
            limits: *limits,
            depth: 0,
            too_deep: false,
            furthest: 0,
            expected: Vec::new(),
        }
    }

    // ── Position ──────────────────────────────────────────────────────────────

    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    pub(crate) fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(crate) fn slice(&self, from: usize) -> &'a str {
        &self.src[from..self.pos]
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    // ── Failure bookkeeping ───────────────────────────────────────────────────

    /// Record that `what` would have matched at the current position.
    pub(crate) fn expected(&mut self, what: Expected) {
        if self.pos > self.furthest {
            self.furthest = self.pos;
            self.expected.clear();
        }
        if self.pos == self.furthest && !self.expected.contains(&what) {
            self.expected.push(what);
        }
    }

    /// Enter one nesting level. Fails (for good) once the depth limit is hit.
    pub(crate) fn descend(&mut self) -> Option<()> {
        if self.too_deep || self.depth >= self.limits.max_depth {
            self.too_deep = true;
            return None;
        }
        self.depth += 1;
        Some(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth -= 1;
    }

    // ── Terminals ─────────────────────────────────────────────────────────────

    /// Consume `lit` if the input continues with it.
    pub(crate) fn eat(&mut self, lit: &'static str) -> bool {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            self.expected(Expected::Literal(lit));
            false
        }
    }

    /// Consume `lit` if present. Optional syntax never shows up in
    /// "expected …" diagnostics.
    pub(crate) fn optional(&mut self, lit: &str) -> bool {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    /// Like [`eat`](Self::eat), as an `Option` for use with `?`.
    pub(crate) fn expect(&mut self, lit: &'static str) -> Option<()> {
        self.eat(lit).then_some(())
    }

    /// Consume one character if it satisfies `pred`.
    pub(crate) fn eat_if(&mut self, what: Expected, pred: impl Fn(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(c) if pred(c) => {
                self.pos += c.len_utf8();
                Some(c)
            }
            _ => {
                self.expected(what);
                None
            }
        }
    }

    /// Consume characters while `pred` holds; returns what was consumed.
    pub(crate) fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.slice(start)
    }

    /// `ws := [ \t]*`
    pub(crate) fn skip_ws(&mut self) {
        self.eat_while(|c| c == ' ' || c == '\t');
    }

    /// `letter (letter | digit | '_')*`
    pub(crate) fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        self.eat_if(Expected::Named("identifier"), is_ident_start)?;
        self.eat_while(is_ident_continue);
        Some(self.slice(start))
    }

    /// A keyword: `word` not immediately followed by an identifier character.
    pub(crate) fn keyword(&mut self, word: &'static str) -> bool {
        let mark = self.mark();
        if self.eat(word) && !self.peek().is_some_and(is_ident_continue) {
            return true;
        }
        self.reset(mark);
        false
    }

    // ── Root driver ───────────────────────────────────────────────────────────

    /// Run `root` over the whole input. The rule must consume everything.
    pub(crate) fn run<T>(
        src: &'a str,
        limits: &Limits,
        rule: Rule,
        root: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Result<T, ParseError> {
        if src.len() > limits.max_input_bytes {
            return Err(Self::fail(
                rule,
                src,
                Cause::InputTooLong {
                    len: src.len(),
                    limit: limits.max_input_bytes,
                },
            ));
        }

        let mut p = Parser::new(src, limits);
        let parsed = root(&mut p);
        if p.too_deep {
            let limit = limits.max_depth;
            return Err(Self::fail(rule, src, Cause::TooDeep { limit }));
        }
        match parsed {
            Some(tree) if p.at_end() => return Ok(tree),
            Some(_) => p.expected(Expected::Named("end of input")),
            None => {}
        }
        let cause = p.mismatch();
        Err(Self::fail(rule, src, cause))
    }

    fn fail(rule: Rule, src: &str, cause: Cause) -> ParseError {
        tracing::debug!(%rule, %cause, "parse failed");
        ParseError::new(rule, src, cause)
    }

    fn mismatch(&self) -> Cause {
        let offset = self.furthest;
        let before = &self.src[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Cause::Mismatch {
            offset,
            line,
            column,
            found: self.src[offset..].chars().next(),
            expected: self.expected.iter().map(|e| e.describe()).collect(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
