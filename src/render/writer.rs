//! An output filter that interpolates everything written through it

use std::io::{self, Write};

use super::{interpolate_with, BindingEnvironment};
use crate::scanner::ScanOptions;

/// Wraps a writer so that each `write` call is interpolated against a fixed
/// environment before being forwarded.
///
/// Every call is scanned on its own, so an expression must not be split
/// across writes. `write_all` with a whole line or message is the intended use;
/// `write!` may split its output into several calls.
pub struct InterpolatingWriter<W, B> {
    inner: W,
    env: B,
    options: ScanOptions,
}

impl<W: Write, B: BindingEnvironment> InterpolatingWriter<W, B> {
    pub fn new(inner: W, env: B) -> Self {
        Self {
            inner,
            env,
            options: ScanOptions::default(),
        }
    }

    /// Use custom scan options
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn env(&self) -> &B {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut B {
        &mut self.env
    }

    /// Stop filtering and return the wrapped writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write, B: BindingEnvironment> Write for InterpolatingWriter<W, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let rendered = interpolate_with(text, &self.options, &self.env)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.inner.write_all(rendered.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
