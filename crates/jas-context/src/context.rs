//! `EvalContext`: variable scope, argument stack, context-function dispatch,
//! and sub-context creation, plus the base parent-chained implementation.

use std::collections::HashMap;

use jas_ast::Eval;
use jas_error::{JasError, JasResult};
use jas_var::Var;

/// What an `EvalContext` is asked to do on behalf of the evaluator. Every
/// evaluation frame owns one; sub-contexts are created via [`make_child`]
/// whenever the evaluator pushes a frame (function call, macro invocation,
/// list-algorithm element).
///
/// [`make_child`]: EvalContext::make_child
pub trait EvalContext: std::fmt::Debug {
    /// A variable set directly on this context (as opposed to a JSON-level
    /// `$name` local declaration, which lives on the evaluator's frame and is
    /// folded into the declaring frame's context once evaluated).
    fn get_variable(&self, name: &str) -> Option<Var>;

    fn set_variable(&mut self, name: &str, value: Var);

    fn arg_count(&self) -> usize;

    /// 1-based positional argument lookup (`$1`, `$2`, ...).
    fn arg(&self, index: usize) -> JasResult<Var>;

    fn args(&self) -> Vec<Var>;

    /// Dispatch a `ContextFI` call. The default rejects everything with
    /// *function-not-found*; [`HistoricalEvalContext`] overrides this for
    /// its reserved function names.
    ///
    /// [`HistoricalEvalContext`]: crate::HistoricalEvalContext
    fn invoke(&mut self, name: &str, param: Option<Var>, eval: &mut dyn Eval) -> JasResult<Var> {
        let _ = (param, eval);
        Err(JasError::function_not_found(format!(
            "no context function named '{name}'"
        )))
    }

    /// Evaluator cooperation hook: called after a declared variable's
    /// binding expression evaluates, so a context that cares about change
    /// detection (only [`HistoricalEvalContext`]) can persist the value.
    /// A no-op for contexts that don't.
    ///
    /// [`HistoricalEvalContext`]: crate::HistoricalEvalContext
    fn remember(&mut self, qualified_path: &str, value: &Var) {
        let _ = (qualified_path, value);
    }

    /// Create the sub-context for a new evaluation frame. `args` become the
    /// new context's positional arguments; `input`, when present, is the
    /// nested data the new frame descends into (a list-algorithm element, a
    /// function's structured result) -- `BaseEvalContext` ignores it,
    /// `HistoricalEvalContext` unpacks a `{current_field__, last_field__}`
    /// shape from it into fresh snapshots.
    fn make_child(&self, args: Vec<Var>, input: Option<Var>) -> Box<dyn EvalContext>;

    /// A short label folded into evaluator backtraces alongside the
    /// pseudo-syntax of the frame's node. Empty by default.
    fn debug_info(&self) -> String {
        String::new()
    }
}

/// The default `EvalContext`: a flat variable map plus a positional argument
/// list. Has no context functions of its own and no parent link -- lexical
/// chaining across frames is the evaluator's job (see `jas-evaluator`), not
/// this type's.
#[derive(Debug, Default)]
pub struct BaseEvalContext {
    vars: HashMap<String, Var>,
    args: Vec<Var>,
}

impl BaseEvalContext {
    pub fn new() -> Self {
        BaseEvalContext::default()
    }

    pub fn with_args(args: Vec<Var>) -> Self {
        BaseEvalContext {
            vars: HashMap::new(),
            args,
        }
    }
}

impl EvalContext for BaseEvalContext {
    fn get_variable(&self, name: &str) -> Option<Var> {
        self.vars.get(name).cloned()
    }

    fn set_variable(&mut self, name: &str, value: Var) {
        self.vars.insert(name.to_string(), value);
    }

    fn arg_count(&self) -> usize {
        self.args.len()
    }

    fn arg(&self, index: usize) -> JasResult<Var> {
        if index == 0 {
            return Err(JasError::evaluation("argument index '$0' is forbidden"));
        }
        self.args
            .get(index - 1)
            .cloned()
            .ok_or_else(|| JasError::out_of_range(format!("no argument '${index}'")))
    }

    fn args(&self) -> Vec<Var> {
        self.args.clone()
    }

    fn make_child(&self, args: Vec<Var>, _input: Option<Var>) -> Box<dyn EvalContext> {
        Box::new(BaseEvalContext::with_args(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_zero_is_forbidden() {
        let ctx = BaseEvalContext::with_args(vec![Var::Int(1)]);
        assert!(ctx.arg(0).is_err());
        assert_eq!(ctx.arg(1).unwrap().as_i64().unwrap(), 1);
        assert!(ctx.arg(2).is_err());
    }

    #[test]
    fn variables_are_a_flat_map() {
        let mut ctx = BaseEvalContext::new();
        assert!(ctx.get_variable("x").is_none());
        ctx.set_variable("x", Var::Int(5));
        assert_eq!(ctx.get_variable("x").unwrap().as_i64().unwrap(), 5);
    }
}
