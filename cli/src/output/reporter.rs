//! `TerminalLogger`: Presentation-layer implementation of `Logger`.
//!
//! Wraps `&OutputContext` so application services can log without depending
//! on any presentation type directly.

use crate::application::ports::Logger;
use crate::output::OutputContext;

/// Terminal logger that wraps an `OutputContext`.
///
/// - `verbose()` prints a dimmed detail line (only with `--verbose`)
/// - `info()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `warning()` prints `"  ⚠ {message}"` (suppressed when `ctx.quiet`)
/// - `error()` prints `"  ✗ {message}"` to stderr
pub struct TerminalLogger<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalLogger<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl Logger for TerminalLogger<'_> {
    fn verbose(&self, message: &str) {
        self.ctx.detail(message);
    }

    fn info(&self, message: &str) {
        self.ctx.info(message);
    }

    fn warning(&self, message: &str) {
        self.ctx.warn(message);
    }

    fn error(&self, message: &str) {
        self.ctx.error(message);
    }
}
