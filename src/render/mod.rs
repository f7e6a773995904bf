//! Template rendering against an injected binding environment

mod writer;

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::scanner::{scan_with, Chunk, ScanOptions, Template};

pub use writer::InterpolatingWriter;

/// The capability a template is rendered against.
///
/// The renderer never interprets expression text itself; it hands each
/// expression chunk to [`BindingEnvironment::evaluate`] and writes the
/// `Display` form of the result.
pub trait BindingEnvironment {
    type Value: fmt::Display;
    type Error: StdError + Send + Sync + 'static;

    /// Look up a single bound name
    fn resolve(&self, name: &str) -> Result<Self::Value, Self::Error>;

    /// Evaluate free-form expression source against this environment
    fn evaluate(&self, source: &str) -> Result<Self::Value, Self::Error>;
}

impl<B: BindingEnvironment + ?Sized> BindingEnvironment for &B {
    type Value = B::Value;
    type Error = B::Error;

    fn resolve(&self, name: &str) -> Result<Self::Value, Self::Error> {
        (**self).resolve(name)
    }

    fn evaluate(&self, source: &str) -> Result<Self::Value, Self::Error> {
        (**self).evaluate(source)
    }
}

/// Errors that can occur while rendering a template
#[derive(Debug, Error)]
pub enum RenderError {
    /// The environment failed to evaluate an expression chunk
    #[error("error evaluating `{expression}`: {cause}")]
    Evaluation {
        expression: String,
        #[source]
        cause: Box<dyn StdError + Send + Sync>,
    },
}

impl RenderError {
    /// Source text of the expression that failed
    pub fn expression(&self) -> &str {
        match self {
            RenderError::Evaluation { expression, .. } => expression,
        }
    }

    /// The evaluator's own error
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match self {
            RenderError::Evaluation { cause, .. } => cause.as_ref(),
        }
    }
}

impl Template {
    /// Render this template; see [`render`]
    pub fn render<B: BindingEnvironment + ?Sized>(&self, env: &B) -> Result<String, RenderError> {
        render(self, env)
    }
}

/// Render a template, evaluating every expression chunk afresh.
///
/// Rendering is all-or-nothing: the first failed evaluation aborts and no
/// partial output is returned.
pub fn render<B: BindingEnvironment + ?Sized>(
    template: &Template,
    env: &B,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.source().len());
    for chunk in template.chunks() {
        match chunk {
            Chunk::Literal(text) => out.push_str(text),
            Chunk::Expression(source) => {
                let value = env
                    .evaluate(source)
                    .map_err(|e| RenderError::Evaluation {
                        expression: source.clone(),
                        cause: Box::new(e),
                    })?;
                out.push_str(&value.to_string());
            }
        }
    }
    Ok(out)
}

/// Scan and render `source` in one step with default scan options
pub fn interpolate<B: BindingEnvironment + ?Sized>(
    source: &str,
    env: &B,
) -> Result<String, crate::Error> {
    interpolate_with(source, &ScanOptions::default(), env)
}

/// Scan and render `source` in one step
pub fn interpolate_with<B: BindingEnvironment + ?Sized>(
    source: &str,
    options: &ScanOptions,
    env: &B,
) -> Result<String, crate::Error> {
    let template = scan_with(source, options)?;
    Ok(render(&template, env)?)
}
