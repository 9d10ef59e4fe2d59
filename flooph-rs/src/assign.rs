//! Assignment lists: one `name: value` binding per line.
//!
//! ```text
//! debug: false
//! cats: 17
//! alive: yes
//! trollLocation: "cave"
//! oldCats: cats
//! cats: cats + 1
//! ```
//!
//! Blank lines are allowed between assignments. Each right-hand side is a
//! value expression evaluated against the store as left by the lines above
//! it, so later lines see earlier updates.

use crate::config::Limits;
use crate::error::{ParseError, Rule};
use crate::expr::{eval_value, EvalContext, ValueExpr};
use crate::parser::Parser;

/// `name: value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: ValueExpr,
}

/// Assignments in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentList {
    pub assignments: Vec<Assignment>,
}

// ── Grammar ───────────────────────────────────────────────────────────────────

impl<'a> Parser<'a> {
    /// `Assignment ( '\n' Assignment? )*`
    pub(crate) fn assignment_list(&mut self) -> Option<AssignmentList> {
        let mut assignments = vec![self.assignment()?];
        while self.eat("\n") {
            let m = self.mark();
            match self.assignment() {
                Some(a) => assignments.push(a),
                None => self.reset(m),
            }
        }
        Some(AssignmentList { assignments })
    }

    /// `Lookup ws ':' ws Value ws`
    fn assignment(&mut self) -> Option<Assignment> {
        let name = self.identifier()?.to_owned();
        self.skip_ws();
        self.expect(":")?;
        self.skip_ws();
        let value = self.value_expr()?;
        self.skip_ws();
        Some(Assignment { name, value })
    }
}

/// Parse an assignment list. `src` is expected to be normalised already
/// (see [`normalize`](crate::engine::normalize)).
pub fn parse_assignment_list(src: &str, limits: &Limits) -> Result<AssignmentList, ParseError> {
    Parser::run(src, limits, Rule::AssignmentList, Parser::assignment_list)
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Apply every assignment in order. Each value is computed against the
/// context as already updated by the assignments before it.
pub fn apply(list: &AssignmentList, ctx: &mut dyn EvalContext) {
    for Assignment { name, value } in &list.assignments {
        let v = eval_value(value, ctx);
        tracing::trace!(%name, value = %v, ty = v.type_name(), "assign");
        ctx.set_var(name, v);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
