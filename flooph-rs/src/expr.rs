//! Boolean and value expressions: AST, grammar, and evaluator.
//!
//! Boolean expressions (the conditions inside `{?…}` / `{|…}`, and the input
//! to [`Engine::conditional`](crate::engine::Engine::conditional)):
//!
//! ```text
//! Or         := And ( ('|' | '||') And )*
//! And        := Atom ( ('&' | '&&') Atom )*
//! Atom       := Comparison | Negatable
//! Comparison := Operand CmpOp Operand
//! Operand    := Lookup | Number | String
//! Negatable  := '!'? Lookup '?'?  |  '!'? '(' Or ')'
//! ```
//!
//! `&` binds tighter than `|`. A bare name tests presence/truthiness, so
//! `debug` and `debug?` both mean "debug is set and is not false".
//!
//! Value expressions (inside `{=…}`, on the right of an assignment, and the
//! input to [`Engine::calculate`](crate::engine::Engine::calculate)):
//!
//! ```text
//! Value      := Boolean | Arithmetic | Number | String | Lookup
//! Arithmetic := (Lookup | Number) ('+' | '-') (Lookup | Number)
//! Boolean    := 'true' | 'yes' | 'false' | 'no'
//! ```
//!
//! Evaluation never fails. Missing names read as [`Value::Absent`],
//! mismatched comparisons are `false`, and arithmetic on anything but numbers
//! (or two strings, for `+`) is `Absent`.

use crate::config::Limits;
use crate::error::{ParseError, Rule};
use crate::parser::{Expected, Parser};
use crate::value::Value;
use crate::var::VarStore;

// ── EvalContext ───────────────────────────────────────────────────────────────

/// Variable access used by the evaluators.
///
/// [`VarStore`] is the usual implementation; embedders can supply their own to
/// evaluate against some other backing map.
pub trait EvalContext {
    /// Look up a variable. Unbound names are [`Value::Absent`].
    fn get_var(&self, name: &str) -> Value;

    /// Bind (or rebind) a variable.
    fn set_var(&mut self, name: &str, value: Value);
}

impl EvalContext for VarStore {
    fn get_var(&self, name: &str) -> Value {
        self.lookup(name)
    }

    fn set_var(&mut self, name: &str, value: Value) {
        self.set(name, value);
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

/// Comparison operators. Each has an ASCII and (for most) a Unicode spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `=` or `==`
    Eq,
    /// `≤` or `<=`
    Le,
    /// `≥` or `>=`
    Ge,
    /// `≠` or `!=`
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOp {
    Add,
    Sub,
}

/// One side of a comparison or an arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Lookup(String),
    Number(Value),
    Str(String),
}

/// A value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    Bool(bool),
    Arithmetic { a: Operand, op: AddOp, b: Operand },
    Number(Value),
    Str(String),
    Lookup(String),
}

/// Disjunction of conjunctions; the root of every boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Or {
    pub terms: Vec<And>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct And {
    pub terms: Vec<Atom>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Comparison { a: Operand, op: CmpOp, b: Operand },
    /// `name`, `name?`, `!name`, `!name?`
    Negatable { invert: bool, name: String },
    /// `( … )` or `!( … )`
    Group { invert: bool, inner: Box<Or> },
}

pub type BoolExpr = Or;

// ── Grammar ───────────────────────────────────────────────────────────────────

/// Spellings tried in order; two-character forms first so `<=` is not read
/// as `<` followed by garbage.
const CMP_OPS: &[(&str, CmpOp)] = &[
    ("<=", CmpOp::Le),
    ("<", CmpOp::Lt),
    (">=", CmpOp::Ge),
    (">", CmpOp::Gt),
    ("==", CmpOp::Eq),
    ("=", CmpOp::Eq),
    ("≤", CmpOp::Le),
    ("≥", CmpOp::Ge),
    ("≠", CmpOp::Ne),
    ("!=", CmpOp::Ne),
];

const BOOLEANS: &[(&str, bool)] = &[("true", true), ("false", false), ("yes", true), ("no", false)];

impl<'a> Parser<'a> {
    /// `'-'? digit+ ('.' digit+)?`
    pub(crate) fn number(&mut self) -> Option<Value> {
        let start = self.mark();
        self.optional("-");
        if self.eat_while(|c| c.is_ascii_digit()).is_empty() {
            self.reset(start);
            self.expected(Expected::Named("number"));
            return None;
        }
        let int_end = self.mark();
        if self.optional(".") && self.eat_while(|c| c.is_ascii_digit()).is_empty() {
            self.reset(int_end);
        }
        let parsed = Value::parse_number(self.slice(start));
        if parsed.is_none() {
            self.reset(start);
        }
        parsed
    }

    /// `'"' [^"\n]* '"'`
    pub(crate) fn string_lit(&mut self) -> Option<String> {
        let start = self.mark();
        if !self.eat("\"") {
            return None;
        }
        let body = self.eat_while(|c| c != '"' && c != '\n');
        if !self.eat("\"") {
            self.reset(start);
            return None;
        }
        Some(body.to_owned())
    }

    fn operand(&mut self) -> Option<Operand> {
        if let Some(name) = self.identifier() {
            return Some(Operand::Lookup(name.to_owned()));
        }
        if let Some(n) = self.number() {
            return Some(Operand::Number(n));
        }
        self.string_lit().map(Operand::Str)
    }

    fn arith_operand(&mut self) -> Option<Operand> {
        if let Some(name) = self.identifier() {
            return Some(Operand::Lookup(name.to_owned()));
        }
        self.number().map(Operand::Number)
    }

    fn cmp_op(&mut self) -> Option<CmpOp> {
        for &(spelling, op) in CMP_OPS {
            if self.optional(spelling) {
                return Some(op);
            }
        }
        self.expected(Expected::Named("comparison operator"));
        None
    }

    fn add_op(&mut self) -> Option<AddOp> {
        if self.optional("+") {
            Some(AddOp::Add)
        } else if self.optional("-") {
            Some(AddOp::Sub)
        } else {
            self.expected(Expected::Named("'+' or '-'"));
            None
        }
    }

    /// Root rule for boolean expressions.
    pub(crate) fn or_expr(&mut self) -> Option<Or> {
        let mut terms = vec![self.and_expr()?];
        loop {
            let m = self.mark();
            self.skip_ws();
            if !self.eat("|") {
                self.reset(m);
                break;
            }
            self.optional("|");
            self.skip_ws();
            match self.and_expr() {
                Some(t) => terms.push(t),
                None => {
                    self.reset(m);
                    break;
                }
            }
        }
        Some(Or { terms })
    }

    fn and_expr(&mut self) -> Option<And> {
        let mut terms = vec![self.atom()?];
        loop {
            let m = self.mark();
            self.skip_ws();
            if !self.eat("&") {
                self.reset(m);
                break;
            }
            self.optional("&");
            self.skip_ws();
            match self.atom() {
                Some(t) => terms.push(t),
                None => {
                    self.reset(m);
                    break;
                }
            }
        }
        Some(And { terms })
    }

    fn atom(&mut self) -> Option<Atom> {
        let start = self.mark();

        if let Some(cmp) = self.comparison() {
            return Some(cmp);
        }
        self.reset(start);

        let invert = self.optional("!");
        if let Some(name) = self.identifier() {
            self.optional("?");
            return Some(Atom::Negatable {
                invert,
                name: name.to_owned(),
            });
        }

        if self.eat("(") && self.descend().is_some() {
            let inner = self.group_body();
            self.ascend();
            if let Some(inner) = inner {
                return Some(Atom::Group {
                    invert,
                    inner: Box::new(inner),
                });
            }
        }
        self.reset(start);
        None
    }

    fn comparison(&mut self) -> Option<Atom> {
        let a = self.operand()?;
        self.skip_ws();
        let op = self.cmp_op()?;
        self.skip_ws();
        let b = self.operand()?;
        Some(Atom::Comparison { a, op, b })
    }

    fn group_body(&mut self) -> Option<Or> {
        self.skip_ws();
        let inner = self.or_expr()?;
        self.skip_ws();
        self.expect(")")?;
        Some(inner)
    }

    /// Root rule for value expressions.
    pub(crate) fn value_expr(&mut self) -> Option<ValueExpr> {
        for &(word, b) in BOOLEANS {
            if self.keyword(word) {
                return Some(ValueExpr::Bool(b));
            }
        }

        let start = self.mark();
        if let Some(arith) = self.arithmetic() {
            return Some(arith);
        }
        self.reset(start);

        if let Some(n) = self.number() {
            return Some(ValueExpr::Number(n));
        }
        if let Some(s) = self.string_lit() {
            return Some(ValueExpr::Str(s));
        }
        self.identifier().map(|name| ValueExpr::Lookup(name.to_owned()))
    }

    fn arithmetic(&mut self) -> Option<ValueExpr> {
        let a = self.arith_operand()?;
        self.skip_ws();
        let op = self.add_op()?;
        self.skip_ws();
        let b = self.arith_operand()?;
        Some(ValueExpr::Arithmetic { a, op, b })
    }
}

/// Parse a boolean expression. `src` is expected to be normalised already
/// (see [`normalize`](crate::engine::normalize)).
pub fn parse_boolean_expression(src: &str, limits: &Limits) -> Result<BoolExpr, ParseError> {
    Parser::run(src, limits, Rule::BooleanExpression, Parser::or_expr)
}

/// Parse a value expression.
pub fn parse_value_expression(src: &str, limits: &Limits) -> Result<ValueExpr, ParseError> {
    Parser::run(src, limits, Rule::ValueExpression, Parser::value_expr)
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

impl Operand {
    pub fn resolve(&self, ctx: &dyn EvalContext) -> Value {
        match self {
            Operand::Lookup(name) => ctx.get_var(name),
            Operand::Number(n) => n.clone(),
            Operand::Str(s) => Value::Str(s.clone()),
        }
    }
}

/// Evaluate a value expression.
pub fn eval_value(expr: &ValueExpr, ctx: &dyn EvalContext) -> Value {
    match expr {
        ValueExpr::Bool(b) => Value::Bool(*b),
        ValueExpr::Arithmetic { a, op, b } => {
            let a = a.resolve(ctx);
            let b = b.resolve(ctx);
            match op {
                AddOp::Add => a.add(&b),
                AddOp::Sub => a.sub(&b),
            }
        }
        ValueExpr::Number(n) => n.clone(),
        ValueExpr::Str(s) => Value::Str(s.clone()),
        ValueExpr::Lookup(name) => ctx.get_var(name),
    }
}

/// Evaluate a boolean expression.
pub fn eval_bool(expr: &BoolExpr, ctx: &dyn EvalContext) -> bool {
    expr.terms.iter().any(|and| eval_and(and, ctx))
}

fn eval_and(and: &And, ctx: &dyn EvalContext) -> bool {
    and.terms.iter().all(|atom| eval_atom(atom, ctx))
}

fn eval_atom(atom: &Atom, ctx: &dyn EvalContext) -> bool {
    match atom {
        Atom::Comparison { a, op, b } => a.resolve(ctx).compare(*op, &b.resolve(ctx)),
        Atom::Negatable { invert, name } => ctx.get_var(name).is_truthy() != *invert,
        Atom::Group { invert, inner } => eval_bool(inner, ctx) != *invert,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> VarStore {
        [
            ("name", Value::from("Phrogz")),
            ("foo", Value::Int(42)),
            ("bar", Value::Bool(true)),
            ("a", Value::Int(1)),
            ("b", Value::Int(2)),
            ("c", Value::Int(3)),
        ]
        .into_iter()
        .collect()
    }

    fn cond(src: &str) -> bool {
        let expr = parse_boolean_expression(src, &Limits::default()).expect("parse failed");
        eval_bool(&expr, &ctx())
    }

    fn calc(src: &str, vars: &VarStore) -> Value {
        let expr = parse_value_expression(src, &Limits::default()).expect("parse failed");
        eval_value(&expr, vars)
    }

    #[test]
    fn parse_comparison_shape() {
        let expr = parse_boolean_expression("cats >= 3", &Limits::default()).unwrap();
        assert_eq!(
            expr,
            Or {
                terms: vec![And {
                    terms: vec![Atom::Comparison {
                        a: Operand::Lookup("cats".into()),
                        op: CmpOp::Ge,
                        b: Operand::Number(Value::Int(3)),
                    }]
                }]
            }
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse_boolean_expression("a | b & c", &Limits::default()).unwrap();
        assert_eq!(expr.terms.len(), 2);
        assert_eq!(expr.terms[0].terms.len(), 1);
        assert_eq!(expr.terms[1].terms.len(), 2);
    }

    #[test]
    fn all_operator_spellings() {
        for (src, op) in [
            ("foo<1", CmpOp::Lt),
            ("foo>1", CmpOp::Gt),
            ("foo=1", CmpOp::Eq),
            ("foo==1", CmpOp::Eq),
            ("foo≤1", CmpOp::Le),
            ("foo<=1", CmpOp::Le),
            ("foo≥1", CmpOp::Ge),
            ("foo>=1", CmpOp::Ge),
            ("foo≠1", CmpOp::Ne),
            ("foo!=1", CmpOp::Ne),
        ] {
            let expr = parse_boolean_expression(src, &Limits::default()).unwrap();
            match &expr.terms[0].terms[0] {
                Atom::Comparison { op: got, .. } => assert_eq!(*got, op, "{src}"),
                other => panic!("{src}: parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn numeric_comparisons() {
        assert!(cond("foo < 100"));
        assert!(cond("foo < 100.1"));
        assert!(!cond("foo < 42"));
        assert!(cond("foo≤42 & foo≥42 && foo==42 & !(foo≠42)"));
        assert!(cond("a<b && b<c"));
        assert!(!cond("a>b && b<c"));
    }

    #[test]
    fn missing_variables_compare_false() {
        assert!(!cond("cats < 12"));
        assert!(!cond("cats > 12"));
        assert!(!cond("cats = 12"));
        assert!(!cond("cats != 12"));
    }

    #[test]
    fn string_comparisons() {
        assert!(cond("name=\"Phrogz\""));
        assert!(!cond("name=\"Gavin\""));
        assert!(cond("name<\"ZZZ\""));
        assert!(!cond("name<\"AAA\""));
        assert!(cond("\"AAA\"<name"));
        assert!(cond("\"ZZZ\">name"));
        assert!(!cond("a>\"Phrogz\""));
        assert!(!cond("\"Phrogz\"=a"));
        assert!(!cond("name>42"));
    }

    #[test]
    fn presence_tests() {
        assert!(cond("foo"));
        assert!(cond("foo?"));
        assert!(!cond("cat?"));
        assert!(!cond("!foo"));
        assert!(cond("!cat?"));
        assert!(cond("foo<17 | bar?"));
    }

    #[test]
    fn boolean_composition() {
        assert!(cond("a & b & c"));
        assert!(!cond("!a & b & c"));
        assert!(cond("a | b | c"));
        assert!(cond("!a | b | c"));
        assert!(!cond("!a | !b | !c"));
        assert!(cond("a||b"));
    }

    #[test]
    fn groups() {
        assert!(cond("(foo)"));
        assert!(!cond("!(foo)"));
        assert!(!cond("(a & no)"));
        assert!(!cond("(a & no) & (b|c)"));
        assert!(cond("!(a & no) & (b&c)"));
        assert!(cond("(a & no) | (b|c)"));
        assert!(cond("( a & b )"));
    }

    #[test]
    fn keywords_are_lookups_in_conditions() {
        // `no` is just an unset variable here.
        assert!(!cond("a & no"));
        assert!(!cond("no & a"));
    }

    #[test]
    fn false_variable_is_falsy() {
        let vars: VarStore = [("debug", false)].into_iter().collect();
        let expr = parse_boolean_expression("debug", &Limits::default()).unwrap();
        assert!(!eval_bool(&expr, &vars));
        let expr = parse_boolean_expression("!debug", &Limits::default()).unwrap();
        assert!(eval_bool(&expr, &vars));
    }

    #[test]
    fn question_mark_only_after_lookup() {
        assert!(parse_boolean_expression("(foo)?", &Limits::default()).is_err());
        assert!(parse_boolean_expression("!foo?", &Limits::default()).is_ok());
    }

    #[test]
    fn malformed_conditions() {
        for src in ["", "a &", "| a", "(a", "a = ", "a b", "a ? ", "3"] {
            assert!(
                parse_boolean_expression(src, &Limits::default()).is_err(),
                "{src:?} should not parse"
            );
        }
    }

    #[test]
    fn group_depth_limit() {
        let limits = Limits::default().with_max_depth(2);
        assert!(parse_boolean_expression("((a))", &limits).is_ok());
        let err = parse_boolean_expression("(((a)))", &limits).unwrap_err();
        assert_eq!(err.cause, crate::error::Cause::TooDeep { limit: 2 });
    }

    #[test]
    fn value_literals() {
        let vars = VarStore::new();
        assert_eq!(calc("true", &vars), Value::Bool(true));
        assert_eq!(calc("yes", &vars), Value::Bool(true));
        assert_eq!(calc("false", &vars), Value::Bool(false));
        assert_eq!(calc("no", &vars), Value::Bool(false));
        assert_eq!(calc("-3", &vars), Value::Int(-3));
        assert_eq!(calc("-1.3431", &vars), Value::Float(-1.3431));
        assert_eq!(calc("\"Old Barn\"", &vars), Value::from("Old Barn"));
        assert_eq!(calc("\"\"", &vars), Value::from(""));
    }

    #[test]
    fn keyword_prefix_is_a_lookup() {
        let vars: VarStore = [("yesterday", 5)].into_iter().collect();
        assert_eq!(calc("yesterday", &vars), Value::Int(5));
        assert_eq!(calc("notes", &vars), Value::Absent);
    }

    #[test]
    fn value_arithmetic() {
        let vars: VarStore = [("cats", 17), ("dogs", 25)].into_iter().collect();
        assert_eq!(calc("cats + dogs", &vars), Value::Int(42));
        assert_eq!(calc("cats+1", &vars), Value::Int(18));
        assert_eq!(calc("cats - 1", &vars), Value::Int(16));
        assert_eq!(calc("1 - dogs", &vars), Value::Int(-24));
        assert_eq!(calc("10-8", &vars), Value::Int(2));
        assert_eq!(calc("1 - -2", &vars), Value::Int(3));
        assert_eq!(calc("kbo + kbo", &vars), Value::Absent);
    }

    #[test]
    fn arithmetic_does_not_chain() {
        assert!(parse_value_expression("1 + 2 + 3", &Limits::default()).is_err());
        assert!(parse_value_expression("\"a\" + 1", &Limits::default()).is_err());
    }

    #[test]
    fn unterminated_string_fails() {
        assert!(parse_value_expression("\"open", &Limits::default()).is_err());
        assert!(parse_value_expression("\"two\nlines\"", &Limits::default()).is_err());
    }

    #[test]
    fn mismatch_reports_expectations() {
        let err = parse_boolean_expression("cats >", &Limits::default()).unwrap_err();
        match err.cause {
            crate::error::Cause::Mismatch { offset, ref expected, .. } => {
                assert_eq!(offset, 6);
                assert!(expected.iter().any(|e| e == "identifier"));
                assert!(expected.iter().any(|e| e == "number"));
            }
            ref other => panic!("unexpected cause {other:?}"),
        }
    }
}
