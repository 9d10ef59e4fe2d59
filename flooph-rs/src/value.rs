//! Runtime value type for Flooph templates and expressions.
//!
//! Values are loosely typed: lookups that miss produce [`Value::Absent`], and
//! operations over mismatched types quietly degrade (comparisons become
//! `false`, arithmetic becomes `Absent`) instead of failing.

use std::cmp::Ordering;
use std::fmt;

use crate::expr::CmpOp;

/// A Flooph runtime value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Result of looking up a name that was never set.
    #[default]
    Absent,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            // f64's Display never uses an exponent and drops a zero fraction,
            // so 1e20 prints as "100000000000000000000" and 2.0 as "2".
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Absent => Ok(()),
        }
    }
}

impl Value {
    /// Build a number, folding integral values that fit in `i64` into
    /// [`Value::Int`]. Infinities and NaN are not numbers and become
    /// [`Value::Absent`].
    pub fn number(x: f64) -> Value {
        if !x.is_finite() {
            Value::Absent
        } else if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
            Value::Int(x as i64)
        } else {
            Value::Float(x)
        }
    }

    /// Parse a numeric literal of the form `-?\d+(\.\d+)?`.
    ///
    /// Returns `None` if `s` is not a finite number.
    pub fn parse_number(s: &str) -> Option<Value> {
        if !s.contains('.') {
            if let Ok(n) = s.parse::<i64>() {
                return Some(Value::Int(n));
            }
        }
        let x: f64 = s.parse().ok()?;
        x.is_finite().then(|| Value::number(x))
    }

    /// Truthiness: everything except `Absent` and `false` is true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Absent | Value::Bool(false))
    }

    /// Name of the type, as shown in trace output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "real",
            Value::Str(_) => "string",
            Value::Absent => "absent",
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────────────────

    /// `self + rhs`. Numbers add, strings concatenate, anything else is
    /// `Absent`.
    pub fn add(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => match a.checked_add(*b) {
                Some(n) => Value::Int(n),
                None => Value::number(*a as f64 + *b as f64),
            },
            (Value::Str(a), Value::Str(b)) => Value::Str(format!("{a}{b}")),
            _ => match (self.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => Value::number(a + b),
                _ => Value::Absent,
            },
        }
    }

    /// `self - rhs`. Only numbers subtract; anything else is `Absent`.
    pub fn sub(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => match a.checked_sub(*b) {
                Some(n) => Value::Int(n),
                None => Value::number(*a as f64 - *b as f64),
            },
            _ => match (self.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => Value::number(a - b),
                _ => Value::Absent,
            },
        }
    }

    // ── Comparison ────────────────────────────────────────────────────────────

    /// Ordering between two values of compatible type, or `None`.
    fn partial_order(&self, rhs: &Value) -> Option<Ordering> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => self.as_f64()?.partial_cmp(&rhs.as_f64()?),
        }
    }

    /// Apply a comparison operator. Incompatible or absent operands compare
    /// `false` under every operator, `!=` included.
    pub fn compare(&self, op: CmpOp, rhs: &Value) -> bool {
        if let (Value::Bool(a), Value::Bool(b)) = (self, rhs) {
            return match op {
                CmpOp::Eq => a == b,
                CmpOp::Ne => a != b,
                _ => false,
            };
        }
        let Some(ord) = self.partial_order(rhs) else {
            return false;
        };
        match op {
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
            CmpOp::Ne => ord != Ordering::Equal,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::number(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
