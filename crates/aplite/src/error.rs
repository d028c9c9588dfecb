//! Thrown errors.
//!
//! Two regimes exist side by side. User-level errors (`!` failures, primitive
//! type errors, assignment shape mismatches, limit breaches) are *thrown*:
//! they travel as [`RunError`] values through `RunResult` and can be caught
//! by the `⎊` modifier. Internal invariant violations (wrong-kind unpack,
//! operand-stack underflow, impossible opcodes) are bugs or malformed
//! programs and panic instead.

use crate::{intern::Interner, value::Value};

/// Result alias for every operation that can throw.
pub type RunResult<T> = Result<T, RunError>;

/// A thrown error carrying the thrown value, typically a character array
/// holding a message pinned to the glyph that raised it.
#[derive(Debug, Clone)]
pub struct RunError {
    message: Value,
}

impl RunError {
    /// Wraps an already-built value, as the `!` primitive does.
    #[must_use]
    pub fn new(message: Value) -> Self {
        Self { message }
    }

    /// Builds an error from message text, stored as a character array.
    #[must_use]
    pub fn msg(text: impl AsRef<str>) -> Self {
        Self { message: Value::string(text.as_ref()) }
    }

    /// The thrown value, for `⎊` handlers and host inspection.
    #[must_use]
    pub fn message(&self) -> &Value {
        &self.message
    }

    /// Consumes the error, returning the thrown value.
    #[must_use]
    pub fn into_message(self) -> Value {
        self.message
    }

    /// Renders the thrown value to text, for the process exit path.
    #[must_use]
    pub fn render(&self, interner: &Interner) -> String {
        self.message.render(interner)
    }
}
