//! Template scanner
//!
//! Splits a string into literal and embedded-expression chunks without
//! evaluating anything. The scan is a single forward pass:
//!
//! - `$name` followed by any number of `.member`, `(...)` or `[...]` is an expression
//! - `${...}` captures everything up to the matching close brace
//! - `$$` is a literal `$`
//! - `$` before any other character is left as a literal `$`

pub mod lexer;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::ScanError;
use lexer::{lex_region, Delimiter};

/// One segment of a scanned template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Text copied verbatim into the output
    Literal(String),
    /// Expression source text, handed to the evaluator at render time
    Expression(String),
}

impl Chunk {
    pub fn text(&self) -> &str {
        match self {
            Chunk::Literal(s) | Chunk::Expression(s) => s,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Chunk::Expression(_))
    }
}

/// How strictly nested delimiters inside an expression are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterPolicy {
    /// Every closing delimiter must match the innermost open one
    #[default]
    Strict,
    /// Depth counting only: `${...}` counts braces, call and subscript
    /// regions count `(`/`[` against `)`/`]` without checking the type
    Lenient,
}

/// Scanner settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Character that introduces an expression
    pub trigger: char,
    /// Delimiter matching policy
    pub delimiters: DelimiterPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            trigger: '$',
            delimiters: DelimiterPolicy::Strict,
        }
    }
}

impl ScanOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trigger character
    pub fn with_trigger(mut self, trigger: char) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the delimiter policy
    pub fn with_delimiters(mut self, policy: DelimiterPolicy) -> Self {
        self.delimiters = policy;
        self
    }
}

/// An immutable, ordered chunk sequence scanned from one source string.
///
/// Scanning is deterministic, so a template can be built once and rendered
/// many times, from any number of threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    chunks: Vec<Chunk>,
}

impl Template {
    /// Scan `source` with default options
    pub fn new(source: &str) -> Result<Self, ScanError> {
        scan(source)
    }

    /// The string this template was scanned from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Source text of every expression chunk, in order
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.chunks
            .iter()
            .filter(|c| c.is_expression())
            .map(Chunk::text)
    }
}

impl FromStr for Template {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        scan(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Scan `source` with the default `$` trigger and strict delimiters
pub fn scan(source: &str) -> Result<Template, ScanError> {
    scan_with(source, &ScanOptions::default())
}

/// Scan `source` into a [`Template`]
pub fn scan_with(source: &str, options: &ScanOptions) -> Result<Template, ScanError> {
    let trigger = options.trigger;
    let width = trigger.len_utf8();
    let mut chunks = Vec::new();
    // Start of the pending literal run
    let mut pos = 0;

    while let Some(offset) = source[pos..].find(trigger) {
        let start = pos + offset;
        let after = start + width;

        match source[after..].chars().next() {
            Some(c) if c == trigger => {
                // Doubled trigger: keep one, drop the other
                push_literal(&mut chunks, &source[pos..after]);
                pos = after + width;
            }
            Some('{') => {
                push_literal(&mut chunks, &source[pos..start]);
                let end = close_region(source, after, start, Delimiter::Brace, options.delimiters)?;
                chunks.push(Chunk::Expression(source[after + 1..end - 1].to_string()));
                pos = end;
            }
            Some(c) if is_name_start(c) => {
                push_literal(&mut chunks, &source[pos..start]);
                let end = scan_chain(source, after, start, options.delimiters)?;
                chunks.push(Chunk::Expression(source[after..end].to_string()));
                pos = end;
            }
            _ => {
                push_literal(&mut chunks, &source[pos..after]);
                pos = after;
            }
        }
    }
    push_literal(&mut chunks, &source[pos..]);

    if chunks.is_empty() {
        chunks.push(Chunk::Literal(String::new()));
    }

    debug!(
        chunks = chunks.len(),
        expressions = chunks.iter().filter(|c| c.is_expression()).count(),
        "scanned template"
    );

    Ok(Template {
        source: source.to_string(),
        chunks,
    })
}

fn push_literal(chunks: &mut Vec<Chunk>, text: &str) {
    if !text.is_empty() {
        chunks.push(Chunk::Literal(text.to_string()));
    }
}

/// Identifier characters follow the ASCII rules of the expression language
fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn name_end(source: &str, from: usize) -> usize {
    let bytes = source.as_bytes();
    let mut end = from;
    while end < bytes.len() && is_name_char(bytes[end]) {
        end += 1;
    }
    end
}

/// Extend a `$name` expression through `.member`, `(...)` and `[...]` suffixes.
/// Returns the byte offset where the expression stops.
fn scan_chain(
    source: &str,
    from: usize,
    trigger_at: usize,
    policy: DelimiterPolicy,
) -> Result<usize, ScanError> {
    let bytes = source.as_bytes();
    let mut end = name_end(source, from);

    loop {
        match bytes.get(end) {
            Some(b'.') if bytes.get(end + 1).is_some_and(|&b| is_name_start(b as char)) => {
                end = name_end(source, end + 1);
            }
            Some(b'(') => end = close_region(source, end, trigger_at, Delimiter::Paren, policy)?,
            Some(b'[') => {
                end = close_region(source, end, trigger_at, Delimiter::Bracket, policy)?
            }
            _ => return Ok(end),
        }
    }
}

/// Find the end of the delimited region whose opener sits at `open_at`.
/// Returns the byte offset just past the matching closer.
fn close_region(
    source: &str,
    open_at: usize,
    trigger_at: usize,
    opener: Delimiter,
    policy: DelimiterPolicy,
) -> Result<usize, ScanError> {
    let tokens = lex_region(source, open_at + 1);

    match policy {
        DelimiterPolicy::Strict => {
            let mut stack = vec![opener];
            for (token, span) in tokens {
                if let Some(d) = token.opens() {
                    stack.push(d);
                } else if let Some(d) = token.closes() {
                    let expected = stack.pop().unwrap_or(opener);
                    if d != expected {
                        return Err(ScanError::MismatchedDelimiter {
                            position: span.start,
                            expected: expected.close_char(),
                            found: d.close_char(),
                        });
                    }
                    if stack.is_empty() {
                        return Ok(span.end);
                    }
                }
            }
        }
        DelimiterPolicy::Lenient => {
            let counts = |d: Delimiter| match opener {
                Delimiter::Brace => d == Delimiter::Brace,
                Delimiter::Bracket | Delimiter::Paren => d != Delimiter::Brace,
            };
            let mut depth = 1usize;
            for (token, span) in tokens {
                if token.opens().is_some_and(counts) {
                    depth += 1;
                } else if token.closes().is_some_and(counts) {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(span.end);
                    }
                }
            }
        }
    }

    Err(ScanError::UnterminatedExpression {
        position: trigger_at,
    })
}
