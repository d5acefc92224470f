//! `JASFacade`: the common-case entry point. Wires a default
//! [`ModuleManager`] (the four built-in modules), a [`Translator`], and a
//! [`SyntaxEvaluator`] together so most callers never need to touch those
//! types directly -- `JASFacade::new().evaluate(&json, context)`.
//!
//! Callers who need a non-default module set or a custom `EvalContext`
//! construct the lower-level `jas-translator`/`jas-evaluator` types
//! themselves; there is deliberately no builder-pattern config object here.

use serde_json::Value;

use jas_context::HISTORICAL_CONTEXT_FUNCTIONS;
use jas_modules::default_module_manager;
use jas_translator::Translator;

pub use jas_ast::{Evaluable, EvaluableKind};
pub use jas_context::{BaseEvalContext, EvalContext, HistoricalEvalContext};
pub use jas_error::{ErrorKind, JasError, JasResult};
pub use jas_modules::{FunctionModule, ModuleManager};
pub use jas_translator::ParseMode;
pub use jas_var::{Dict, Number, Var};

/// The engine version advertised to `$jas.version` gates.
pub const ENGINE_VERSION: &str = "1.0.0";

/// A default-configured JAS engine: built-in modules, shorthand-aware
/// translation, and tree-walking evaluation behind two calls.
pub struct JASFacade {
    modules: ModuleManager,
}

impl JASFacade {
    pub fn new() -> Self {
        JASFacade { modules: default_module_manager() }
    }

    /// The `ModuleManager` backing this facade, for callers who want to
    /// build their own `Translator`/`SyntaxEvaluator` pair on top of the
    /// same built-in module set.
    pub fn modules(&self) -> &ModuleManager {
        &self.modules
    }

    /// Turns arbitrary JSON (shorthand colon-chains included) into a
    /// validated `Evaluable` tree, reusable across many `evaluate` calls.
    pub fn translate(&self, expression: &Value) -> JasResult<Evaluable> {
        let span = tracing::info_span!("jas::translate", bytes = expression_size(expression));
        let _enter = span.enter();
        let mut translator =
            Translator::new(&self.modules, HISTORICAL_CONTEXT_FUNCTIONS, ENGINE_VERSION);
        translator.translate(expression, ParseMode::Shorthand).inspect_err(|e| {
            tracing::error!(kind = %e.kind, message = %e.message, "translation failed");
        })
    }

    /// Evaluates an already-translated AST against `context`.
    pub fn evaluate(&self, ast: &Evaluable, context: Box<dyn EvalContext>) -> JasResult<Var> {
        let span = tracing::info_span!("jas::evaluate");
        let _enter = span.enter();
        let mut evaluator = jas_evaluator::SyntaxEvaluator::new(&self.modules);
        evaluator.evaluate(ast, context).inspect_err(|e| {
            tracing::error!(kind = %e.kind, message = %e.message, "evaluation failed");
        })
    }

    /// Translates and evaluates `expression` against `context` in one call
    /// -- the shortcut most callers reach for.
    pub fn run(&self, expression: &Value, context: Box<dyn EvalContext>) -> JasResult<Var> {
        let ast = self.translate(expression)?;
        self.evaluate(&ast, context)
    }
}

impl Default for JASFacade {
    fn default() -> Self {
        JASFacade::new()
    }
}

fn expression_size(v: &Value) -> usize {
    match v {
        Value::Object(m) => m.len(),
        Value::Array(a) => a.len(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_and_evaluates_a_plain_arithmetic_expression() {
        let facade = JASFacade::new();
        let json = serde_json::json!({"@plus": [1, 2]});
        let result = facade.run(&json, Box::new(BaseEvalContext::new())).unwrap();
        assert_eq!(result.as_i64().unwrap(), 3);
    }

    #[test]
    fn translate_then_evaluate_reuses_one_ast_across_two_contexts() {
        let facade = JASFacade::new();
        let json = serde_json::json!({"@plus": ["$1", "$2"]});
        let ast = facade.translate(&json).unwrap();

        let first = facade
            .evaluate(&ast, Box::new(BaseEvalContext::with_args(vec![Var::Int(1), Var::Int(2)])))
            .unwrap();
        assert_eq!(first.as_i64().unwrap(), 3);

        let second = facade
            .evaluate(&ast, Box::new(BaseEvalContext::with_args(vec![Var::Int(10), Var::Int(20)])))
            .unwrap();
        assert_eq!(second.as_i64().unwrap(), 30);
    }

    #[test]
    fn unknown_variable_surfaces_as_an_evaluation_error() {
        let facade = JASFacade::new();
        let json = serde_json::json!("$missing");
        let err = facade.run(&json, Box::new(BaseEvalContext::new())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EvaluationError);
    }
}
