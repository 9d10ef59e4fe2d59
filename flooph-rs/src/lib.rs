//! Flooph: a small template and condition language.
//!
//! Four things can be evaluated against an engine's variables:
//!
//! - **Templates** with `{=expr}` substitution and `{?test}…{|test}…{|}…{.}`
//!   conditional chains ([`Engine::transform`])
//! - **Boolean expressions** with comparisons, `!`, `&`, `|` and grouping
//!   ([`Engine::conditional`])
//! - **Value expressions**: literals, lookups, and a single `+`/`-`
//!   ([`Engine::calculate`])
//! - **Assignment lists**, one `name: value` per line
//!   ([`Engine::update_variables`])
//!
//! Missing data never aborts evaluation: unset names are falsy and render as
//! nothing, comparisons between mismatched types are `false`, and arithmetic
//! on them yields [`Value::Absent`]. The only error is [`ParseError`].
//!
//! # Quick start
//!
//! ```rust
//! use flooph::{Engine, Value, VarStore};
//!
//! let mut engine = Engine::new();
//! engine
//!     .update_variables("cats: 17\nalive: yes\ntrollLocation: \"cave\"", None)
//!     .unwrap();
//! assert!(engine.conditional("cats > 3 & alive", None).unwrap());
//!
//! engine.update_variables("cats: cats + 1", None).unwrap();
//! assert_eq!(engine.calculate("cats", None).unwrap(), Value::Int(18));
//!
//! let out = engine
//!     .transform("I have {=cats} cat{?cats=1}{|}s{.}.", None)
//!     .unwrap();
//! assert_eq!(out, "I have 18 cats.");
//!
//! let vars: VarStore = [("dogs", 1)].into_iter().collect();
//! assert_eq!(engine.transform("{=dogs} dog", Some(vars)).unwrap(), "1 dog");
//! ```

pub mod assign;
pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
mod parser;
pub mod template;
pub mod value;
pub mod var;

// Re-exports for convenience.
pub use assign::{apply, parse_assignment_list, Assignment, AssignmentList};
pub use config::Limits;
pub use engine::{normalize, Engine};
pub use error::{Cause, ParseError, Rule};
pub use expr::{
    eval_bool, eval_value, parse_boolean_expression, parse_value_expression, BoolExpr,
    EvalContext, ValueExpr,
};
pub use template::{parse_template, render, Conditional, Node, Template};
pub use value::Value;
pub use var::VarStore;
