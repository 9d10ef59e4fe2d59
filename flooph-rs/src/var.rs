//! Variable store.
//!
//! Holds the name → [`Value`] bindings that templates, conditions and
//! calculations read from and that assignment lists write to. One store is
//! owned by each [`Engine`](crate::engine::Engine) and survives across calls.

use std::collections::HashMap;

use crate::value::Value;

/// Identifier → value mapping. Names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarStore {
    vars: HashMap<String, Value>,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Get the stored value of a variable, if it was ever bound.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Resolve a variable for evaluation: unbound names are [`Value::Absent`].
    pub fn lookup(&self, name: &str) -> Value {
        self.vars.get(name).cloned().unwrap_or_default()
    }

    /// Remove a variable.  Returns `true` if it existed.
    pub fn unset(&mut self, name: &str) -> bool {
        self.vars.remove(name).is_some()
    }

    /// Returns `true` if the variable is bound (possibly to `Absent`).
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Iterate over all variables.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl From<HashMap<String, Value>> for VarStore {
    fn from(vars: HashMap<String, Value>) -> Self {
        VarStore { vars }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for VarStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = VarStore::new();
        store.extend(iter);
        store
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for VarStore {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

/// `true` if `s` is a legal variable name: `[A-Za-z][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if is_ident_start(c)) && chars.all(is_ident_continue)
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut vars = VarStore::new();
        vars.set("cats", 17);
        assert_eq!(vars.get("cats"), Some(&Value::Int(17)));
    }

    #[test]
    fn overwrite() {
        let mut vars = VarStore::new();
        vars.set("x", "old");
        vars.set("x", "new");
        assert_eq!(vars.get("x"), Some(&Value::Str("new".into())));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn lookup_miss_is_absent() {
        let vars = VarStore::new();
        assert_eq!(vars.lookup("nope"), Value::Absent);
        assert!(!vars.contains("nope"));
        assert!(vars.is_empty());
    }

    #[test]
    fn names_are_case_sensitive() {
        let vars: VarStore = [("Cats", 1)].into_iter().collect();
        assert_eq!(vars.lookup("Cats"), Value::Int(1));
        assert_eq!(vars.lookup("cats"), Value::Absent);
    }

    #[test]
    fn absent_binding_is_still_a_binding() {
        let mut vars = VarStore::new();
        vars.set("gor", Value::Absent);
        assert!(vars.contains("gor"));
        assert_eq!(vars.lookup("gor"), Value::Absent);
    }

    #[test]
    fn unset() {
        let mut vars = VarStore::new();
        vars.set("gone", "bye");
        assert!(vars.unset("gone"));
        assert_eq!(vars.get("gone"), None);
        assert!(!vars.unset("gone"));
    }

    #[test]
    fn iterate_bindings() {
        let vars: VarStore = [("a", 1), ("b", 2)].into_iter().collect();
        let mut names: Vec<_> = vars.iter().map(|(k, _)| k.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["a", "b"]);
        let total: i64 = vars
            .iter()
            .map(|(_, v)| match v {
                Value::Int(n) => *n,
                _ => 0,
            })
            .sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn from_hash_map() {
        let mut map = HashMap::new();
        map.insert("cats".to_owned(), Value::Int(17));
        let vars = VarStore::from(map);
        assert_eq!(vars.lookup("cats"), Value::Int(17));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("a"));
        assert!(is_identifier("troll_Location2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2cats"));
        assert!(!is_identifier("_private"));
        assert!(!is_identifier("has-dash"));
    }
}
