//! Interpol - string interpolation templates and priority pattern dispatch
//!
//! This library provides a scanner that splits `$name` / `${expr}` templates
//! into literal and expression chunks, a renderer that evaluates those chunks
//! against a pluggable binding environment, and a registry that orders
//! handlers by priority under exact-string and regex keys.
//!
//! # Example
//!
//! ```rust
//! use interpol::expr::Namespace;
//! use interpol::interpolate;
//!
//! let mut ns = Namespace::new();
//! ns.set_global("who", "world");
//! assert_eq!(interpolate("hello $who, ${1 + 1}x", &ns).unwrap(), "hello world, 2x");
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod expr;
pub mod render;
pub mod scanner;

pub use config::{Config, ConfigError};
pub use dispatch::{
    DispatchError, DispatchKey, EntryId, PatternDispatchRegistry, PriorityChain, SharedRegistry,
};
pub use error::ScanError;
pub use render::{
    interpolate, interpolate_with, render, BindingEnvironment, InterpolatingWriter, RenderError,
};
pub use scanner::{scan, scan_with, Chunk, DelimiterPolicy, ScanOptions, Template};

use thiserror::Error;

/// Errors from the one-step scan and render pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// The template source is malformed
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// An expression failed to evaluate
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use expr::{Namespace, Value};

    #[test]
    fn test_interpolate_names_and_expressions() {
        let mut ns = Namespace::new();
        ns.set_global("foo", 5i64);
        ns.set_global("bar", Value::from(vec![1i64, 2, 3]));
        assert_eq!(
            interpolate("$foo + ${bar[0] * 10} = ${foo + bar[0] * 10}", &ns).unwrap(),
            "5 + 10 = 15"
        );
    }

    #[test]
    fn test_scan_error_converts() {
        let ns = Namespace::new();
        let err = interpolate("oops ${", &ns).unwrap_err();
        assert!(matches!(
            err,
            Error::Scan(ScanError::UnterminatedExpression { position: 5 })
        ));
    }

    #[test]
    fn test_render_error_converts() {
        let ns = Namespace::new();
        let err = interpolate("${1 / 0}", &ns).unwrap_err();
        match err {
            Error::Render(e) => assert_eq!(e.expression(), "1 / 0"),
            other => panic!("expected render error, got {other:?}"),
        }
    }

    #[test]
    fn test_template_reuse() {
        let template: Template = "Hi $name!".parse().unwrap();
        let mut ns = Namespace::new();
        for name in ["ada", "grace"] {
            ns.set_global("name", name);
            assert_eq!(template.render(&ns).unwrap(), format!("Hi {name}!"));
        }
    }
}
