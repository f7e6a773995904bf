//! Variable scopes for the expression language

use indexmap::IndexMap;
use tracing::trace;

use super::{eval, grammar, EvalError, Value};
use crate::render::BindingEnvironment;

/// A global scope plus an optional local scope that shadows it.
///
/// Without locals, lookups only see globals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    globals: IndexMap<String, Value>,
    locals: Option<IndexMap<String, Value>>,
}

impl Namespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a namespace from a global scope
    pub fn with_globals(globals: IndexMap<String, Value>) -> Self {
        Self {
            globals,
            locals: None,
        }
    }

    /// Attach a local scope
    pub fn with_locals(mut self, locals: IndexMap<String, Value>) -> Self {
        self.locals = Some(locals);
        self
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.globals.insert(name.into(), value.into());
    }

    /// Bind a local, creating the local scope if needed
    pub fn set_local(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.locals
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value.into());
    }

    /// Look a name up, locals first
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.locals
            .as_ref()
            .and_then(|locals| locals.get(name))
            .or_else(|| self.globals.get(name))
    }

    pub fn globals(&self) -> &IndexMap<String, Value> {
        &self.globals
    }

    pub fn locals(&self) -> Option<&IndexMap<String, Value>> {
        self.locals.as_ref()
    }
}

impl BindingEnvironment for Namespace {
    type Value = Value;
    type Error = EvalError;

    fn resolve(&self, name: &str) -> Result<Value, EvalError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| EvalError::NameNotFound(name.to_string()))
    }

    fn evaluate(&self, source: &str) -> Result<Value, EvalError> {
        trace!(source, "evaluating expression");
        let expr = grammar::parse(source)?;
        eval::eval(&expr, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locals_shadow_globals() {
        let mut ns = Namespace::new();
        ns.set_global("x", 1i64);
        ns.set_global("y", 2i64);
        ns.set_local("x", 10i64);

        assert_eq!(ns.get("x"), Some(&Value::Int(10)));
        assert_eq!(ns.get("y"), Some(&Value::Int(2)));
        assert_eq!(ns.get("z"), None);
    }

    #[test]
    fn test_with_locals() {
        let mut globals = IndexMap::new();
        globals.insert("who".to_string(), Value::from("world"));
        let mut locals = IndexMap::new();
        locals.insert("who".to_string(), Value::from("there"));

        let ns = Namespace::with_globals(globals.clone());
        assert_eq!(ns.evaluate("who"), Ok(Value::from("world")));

        let ns = Namespace::with_globals(globals).with_locals(locals);
        assert_eq!(ns.evaluate("who"), Ok(Value::from("there")));
    }

    #[test]
    fn test_resolve() {
        let mut ns = Namespace::new();
        ns.set_global("foo", 5i64);
        assert_eq!(ns.resolve("foo"), Ok(Value::Int(5)));
        assert_eq!(
            ns.resolve("bar"),
            Err(EvalError::NameNotFound("bar".to_string()))
        );
    }

    #[test]
    fn test_evaluate_reports_syntax_errors() {
        let ns = Namespace::new();
        assert!(matches!(ns.evaluate("1 +"), Err(EvalError::Syntax(_))));
    }
}
