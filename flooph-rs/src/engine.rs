//! The embedding entry point.
//!
//! An [`Engine`] owns a [`VarStore`] and exposes the four operations of the
//! language. Each operation takes an optional replacement store; when given,
//! it replaces the engine's store *before* the input is parsed, and the
//! replacement stays in place for later calls. When omitted, the current store
//! is used (and, for [`Engine::update_variables`], modified).

use crate::assign::{apply, parse_assignment_list};
use crate::config::Limits;
use crate::error::ParseError;
use crate::expr::{eval_bool, eval_value, parse_boolean_expression, parse_value_expression};
use crate::template::{collapse_blank_lines, parse_template, render};
use crate::value::Value;
use crate::var::VarStore;

/// A reusable template/condition evaluator with its own variables.
///
/// An engine is single-writer: calls take `&mut self`. Engines with separate
/// stores are fully independent.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    vars: VarStore,
    limits: Limits,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given variables.
    pub fn with_vars(vars: VarStore) -> Self {
        Engine {
            vars,
            limits: Limits::default(),
        }
    }

    /// Replace the parse limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn vars(&self) -> &VarStore {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut VarStore {
        &mut self.vars
    }

    /// Replace the whole store.
    pub fn set_vars(&mut self, vars: VarStore) {
        self.vars = vars;
    }

    fn prepare(&mut self, op: &'static str, src: &str, vars: Option<VarStore>) -> String {
        if let Some(vars) = vars {
            self.vars = vars;
        }
        tracing::trace!(op, len = src.len(), vars = self.vars.len(), "evaluate");
        normalize(src)
    }

    /// Render a template.
    ///
    /// ```text
    /// Hello, {=name}!
    /// {?trollLocation="cave"}
    /// There is a troll glaring at you.
    /// {|}
    /// The air smells bad here, like rotting meat.
    /// {.}
    /// ```
    ///
    /// After rendering, any run of three or more newlines is collapsed to two.
    pub fn transform(&mut self, src: &str, vars: Option<VarStore>) -> Result<String, ParseError> {
        let src = self.prepare("transform", src, vars);
        let tpl = parse_template(&src, &self.limits)?;
        Ok(collapse_blank_lines(&render(&tpl, &self.vars)))
    }

    /// Evaluate a boolean expression such as `cats > 3 & !(dogs | debug?)`.
    pub fn conditional(&mut self, src: &str, vars: Option<VarStore>) -> Result<bool, ParseError> {
        let src = self.prepare("conditional", src, vars);
        let expr = parse_boolean_expression(&src, &self.limits)?;
        Ok(eval_bool(&expr, &self.vars))
    }

    /// Apply a list of `name: value` lines to the store and return it.
    ///
    /// Nothing is applied unless the whole list parses.
    pub fn update_variables(
        &mut self,
        src: &str,
        vars: Option<VarStore>,
    ) -> Result<&VarStore, ParseError> {
        let src = self.prepare("update_variables", src, vars);
        let list = parse_assignment_list(&src, &self.limits)?;
        apply(&list, &mut self.vars);
        Ok(&self.vars)
    }

    /// Evaluate a value expression such as `cats + dogs`.
    pub fn calculate(&mut self, src: &str, vars: Option<VarStore>) -> Result<Value, ParseError> {
        let src = self.prepare("calculate", src, vars);
        let expr = parse_value_expression(&src, &self.limits)?;
        Ok(eval_value(&expr, &self.vars))
    }
}

/// Normalise input before parsing: trim ASCII whitespace and NUL from the
/// whole text, then strip spaces and tabs from both ends of every line. Lines
/// are never joined. Other Unicode spaces are content.
pub fn normalize(src: &str) -> String {
    src.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0')
        .split('\n')
        .map(|line| line.trim_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
