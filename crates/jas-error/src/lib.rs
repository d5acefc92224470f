//! Structured error hierarchy for the JAS engine.
//!
//! Every fallible operation in the workspace returns [`JasResult<T>`]. A single
//! [`JasError`] carries one of the six kinds the engine distinguishes plus a
//! human-readable message; the evaluator attaches a textual backtrace to it as
//! the error unwinds through evaluation frames (see [`JasError::with_frame`]).

use std::fmt;

/// The six error categories the engine raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown specifier, malformed operator arity, invalid variable name,
    /// missing required sub-key -- all detected during translation.
    SyntaxError,
    /// Unknown variable, cyclic variable reference, unsupported operand
    /// types, out-of-range list index -- detected during evaluation.
    EvaluationError,
    /// Operator or module function applied to a value of the wrong category.
    TypeError,
    /// Module function argument shape mismatch.
    InvalidArgument,
    /// Strict dict/list accessor applied to a missing key/index.
    OutOfRange,
    /// Module dispatch to a name no module claims after translation.
    FunctionNotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::SyntaxError => "syntax-error",
            ErrorKind::EvaluationError => "evaluation-error",
            ErrorKind::TypeError => "type-error",
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::OutOfRange => "out-of-range",
            ErrorKind::FunctionNotFound => "function-not-found",
        };
        f.write_str(s)
    }
}

/// A single JAS error: a kind, a message, and (once it has unwound through at
/// least one evaluation frame) a backtrace of frame labels, innermost first.
#[derive(Debug, Clone, thiserror::Error)]
pub struct JasError {
    pub kind: ErrorKind,
    pub message: String,
    backtrace: Vec<String>,
}

impl JasError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        JasError {
            kind,
            message: message.into(),
            backtrace: Vec::new(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EvaluationError, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    pub fn function_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FunctionNotFound, message)
    }

    /// Build a *type-error* with both operands' dumped forms, per the
    /// operator-failure clause: operator application on mismatched
    /// categories names both sides.
    pub fn type_mismatch(op: &str, lhs_dump: &str, rhs_dump: &str) -> Self {
        Self::type_error(format!(
            "operator '{op}' not supported between {lhs_dump} and {rhs_dump}"
        ))
    }

    /// Record one more frame on the backtrace as the error unwinds through an
    /// evaluation frame. `label` is that frame's pseudo-syntax rendering.
    pub fn with_frame(mut self, label: impl Into<String>) -> Self {
        self.backtrace.push(label.into());
        self
    }

    pub fn frames(&self) -> &[String] {
        &self.backtrace
    }

    /// Render kind, message, and the accumulated stack dump, one line per
    /// frame (innermost first), matching the evaluator's "stack-unwind"
    /// error presentation.
    pub fn render_backtrace(&self) -> String {
        let mut out = format!("{}: {}", self.kind, self.message);
        for (i, frame) in self.backtrace.iter().enumerate() {
            out.push_str(&format!("\n  at [{i}] {frame}"));
        }
        out
    }
}

impl fmt::Display for JasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

pub type JasResult<T> = Result<T, JasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let e = JasError::evaluation("unknown variable 'x'");
        assert_eq!(e.to_string(), "evaluation-error: unknown variable 'x'");
    }

    #[test]
    fn with_frame_accumulates_innermost_first() {
        let e = JasError::type_error("bad op")
            .with_frame("@plus[$x, $y]")
            .with_frame("@and[...]");
        assert_eq!(e.frames(), ["@plus[$x, $y]", "@and[...]"]);
        let rendered = e.render_backtrace();
        assert!(rendered.contains("type-error: bad op"));
        assert!(rendered.contains("[0] @plus[$x, $y]"));
        assert!(rendered.contains("[1] @and[...]"));
    }

    #[test]
    fn type_mismatch_names_both_operands() {
        let e = JasError::type_mismatch("+", "\"a\"", "3");
        assert!(e.message.contains('+'));
        assert!(e.message.contains("\"a\""));
        assert!(e.message.contains('3'));
    }
}
