//! Error types for template scanning

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Errors raised while splitting a template source into chunks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A `{...}`, `(...)` or `[...]` region never reached depth zero.
    /// `position` is the byte offset of the trigger that opened the expression.
    #[error("unfinished expression starting at byte {position}")]
    UnterminatedExpression { position: usize },

    /// A closing delimiter did not match the innermost open one
    #[error("mismatched delimiter at byte {position}: expected '{expected}', found '{found}'")]
    MismatchedDelimiter {
        position: usize,
        expected: char,
        found: char,
    },
}

impl ScanError {
    /// Byte offset the error points at
    pub fn position(&self) -> usize {
        match self {
            ScanError::UnterminatedExpression { position }
            | ScanError::MismatchedDelimiter { position, .. } => *position,
        }
    }

    /// Format the error with source context using ariadne
    pub fn report(&self, source: &str, filename: &str) -> String {
        // ariadne labels count chars, scan positions count bytes
        let to_char = |byte: usize| source[..byte.min(source.len())].chars().count();
        let start = to_char(self.position());
        let (message, span) = match self {
            ScanError::UnterminatedExpression { .. } => (
                "expression is never closed".to_string(),
                start..to_char(source.len()).max(start + 1),
            ),
            ScanError::MismatchedDelimiter { expected, .. } => {
                (format!("expected '{}' here", expected), start..start + 1)
            }
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}
