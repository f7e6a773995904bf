//! A small, side-effect free expression language
//!
//! This is the evaluator the `interpol` binary renders templates with. It
//! covers what embedded template expressions typically need (names, member
//! access, subscripts, builtin calls, arithmetic and comparisons) and nothing
//! that can reach outside the [`Namespace`] it is given.
//!
//! # Example
//!
//! ```rust
//! use interpol::expr::{Namespace, Value};
//! use interpol::BindingEnvironment;
//!
//! let mut ns = Namespace::new();
//! ns.set_global("name", "ada");
//! assert_eq!(ns.evaluate("name.upper() + '!'"), Ok(Value::from("ADA!")));
//! ```

pub mod ast;
mod eval;
mod grammar;
pub mod lexer;
mod namespace;
mod value;

use thiserror::Error;

pub use eval::eval;
pub use grammar::parse;
pub use namespace::Namespace;
pub use value::Value;

/// Errors that can occur while parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A name is bound in neither the local nor the global scope
    #[error("name not found: {0}")]
    NameNotFound(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function}() takes {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },
}
