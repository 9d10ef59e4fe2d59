//! Templates: literal text mixed with substitutions and conditional chains.
//!
//! | Directive        | Meaning                                              |
//! |------------------|------------------------------------------------------|
//! | `{=expr}`        | Insert the value of a value expression               |
//! | `{?cond}`        | Start a conditional chain; body follows              |
//! | `{|cond}`        | Else-if branch of the innermost open chain           |
//! | `{|}`            | Else branch of the innermost open chain              |
//! | `{.}`            | Close the innermost open chain                       |
//!
//! Everything else is literal text. Chains nest: a `{.}` only ever closes the
//! chain it belongs to.
//!
//! ```text
//! {?dogs>0}I own {=dogs} dogg{?dogs=1}y{|}ies{.} now.{.}
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::config::Limits;
use crate::error::{ParseError, Rule};
use crate::expr::{eval_bool, eval_value, BoolExpr, EvalContext, ValueExpr};
use crate::parser::{Expected, Parser};

// ── AST ───────────────────────────────────────────────────────────────────────

/// A parsed template: nodes rendered in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(String),
    /// `{=expr}`
    Substitution(ValueExpr),
    Conditional(Conditional),
}

/// `{?test}body ({|test}body)* ({|}body)? {.}`
///
/// `tests` always has at least one entry; the first is the `{?…}` branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub tests: Vec<(BoolExpr, Template)>,
    pub else_body: Option<Template>,
}

impl Conditional {
    /// The branch that should be rendered: the body of the first test that
    /// holds, else the else-body. Tests after the winning one are not
    /// evaluated.
    pub fn select(&self, ctx: &dyn EvalContext) -> Option<&Template> {
        self.tests
            .iter()
            .find(|(test, _)| eval_bool(test, ctx))
            .map(|(_, body)| body)
            .or(self.else_body.as_ref())
    }
}

// ── Grammar ───────────────────────────────────────────────────────────────────

/// Openers that end a run of literal text.
const DIRECTIVES: &[&str] = &["{=", "{?", "{|", "{.}"];

impl<'a> Parser<'a> {
    /// `(Literal | Substitution | Conditional)*` — never fails; stops at the
    /// first thing that is none of the three.
    pub(crate) fn template(&mut self) -> Option<Template> {
        let mut nodes = Vec::new();
        loop {
            if let Some(text) = self.literal() {
                nodes.push(Node::Literal(text.to_owned()));
                continue;
            }
            let m = self.mark();
            if let Some(expr) = self.substitution() {
                nodes.push(Node::Substitution(expr));
                continue;
            }
            self.reset(m);
            if let Some(cond) = self.conditional() {
                nodes.push(Node::Conditional(cond));
                continue;
            }
            self.reset(m);
            break;
        }
        Some(Template { nodes })
    }

    fn literal(&mut self) -> Option<&'a str> {
        let start = self.mark();
        while !self.at_end() {
            let rest = self.rest();
            if DIRECTIVES.iter().any(|d| rest.starts_with(d)) {
                break;
            }
            self.advance();
        }
        let text = self.slice(start);
        (!text.is_empty()).then_some(text)
    }

    /// `'{=' ws Value ws '}'`
    fn substitution(&mut self) -> Option<ValueExpr> {
        self.expect("{=")?;
        self.skip_ws();
        let expr = self.value_expr()?;
        self.skip_ws();
        self.expect("}")?;
        Some(expr)
    }

    fn conditional(&mut self) -> Option<Conditional> {
        if !self.rest().starts_with("{?") {
            self.expected(Expected::Literal("{?"));
            return None;
        }
        self.descend()?;
        let chain = self.conditional_chain();
        self.ascend();
        chain
    }

    fn conditional_chain(&mut self) -> Option<Conditional> {
        let test = self.test("{?")?;
        let body = self.template()?;
        let mut tests = vec![(test, body)];

        loop {
            let m = self.mark();
            let Some(test) = self.test("{|") else {
                self.reset(m);
                break;
            };
            let body = self.template()?;
            tests.push((test, body));
        }

        let else_body = if self.eat("{|}") {
            Some(self.template()?)
        } else {
            None
        };

        self.expect("{.}")?;
        Some(Conditional { tests, else_body })
    }

    /// `open ws BooleanExpr ws '}'`
    fn test(&mut self, open: &'static str) -> Option<BoolExpr> {
        self.expect(open)?;
        self.skip_ws();
        let expr = self.or_expr()?;
        self.skip_ws();
        self.expect("}")?;
        Some(expr)
    }
}

/// Parse a template. `src` is expected to be normalised already
/// (see [`normalize`](crate::engine::normalize)).
pub fn parse_template(src: &str, limits: &Limits) -> Result<Template, ParseError> {
    Parser::run(src, limits, Rule::Template, Parser::template)
}

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Render a template to text. No blank-line collapsing is done here; see
/// [`collapse_blank_lines`].
pub fn render(tpl: &Template, ctx: &dyn EvalContext) -> String {
    let mut out = String::new();
    render_into(tpl, ctx, &mut out);
    out
}

fn render_into(tpl: &Template, ctx: &dyn EvalContext, out: &mut String) {
    for node in &tpl.nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Substitution(expr) => out.push_str(&eval_value(expr, ctx).to_string()),
            Node::Conditional(cond) => {
                if let Some(body) = cond.select(ctx) {
                    render_into(body, ctx, out);
                }
            }
        }
    }
}

/// Collapse every run of three or more newlines to exactly two.
pub fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    let re = BLANK_RUN.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"));
    re.replace_all(text, "\n\n").into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
