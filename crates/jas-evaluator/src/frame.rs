//! One entry of the evaluator's stack: the `LocalVariables` a node
//! declares (cloned out of the tree so the frame owns its own copy and the
//! evaluator needs no lifetime threaded through recursive calls), their
//! evaluation state, and -- for frames that actually open a new scope
//! (function/macro invocations, list-algorithm elements, the root) -- the
//! `EvalContext` they evaluate against.

use std::collections::HashMap;

use jas_ast::{Evaluable, LocalVariables};
use jas_context::EvalContext;
use jas_var::Var;

/// Where a locally-declared variable's lazy, first-reference evaluation
/// stands. `Evaluating` catches a reference cycle; `Evaluated` caches the
/// result so a second reference is free.
pub(crate) enum VarState {
    NotEvaluated,
    Evaluating,
    Evaluated(Var),
}

/// A frame that doesn't declare its own scope (most operator/variable
/// nodes) has `context: None` and shares the nearest ancestor's -- see
/// `Evaluator::ctx`/`ctx_idx`.
pub(crate) struct Frame {
    pub context: Option<Box<dyn EvalContext>>,
    pub locals: LocalVariables,
    pub states: HashMap<String, VarState>,
    pub label: String,
    /// Slash-joined chain of enclosing frame labels, including this one --
    /// the qualified-name prefix for variables declared in this frame.
    pub qualified: String,
}

impl Frame {
    pub fn for_node(node: &Evaluable, context: Option<Box<dyn EvalContext>>, label: String, qualified: String) -> Self {
        Frame {
            context,
            locals: node.locals.variables.clone(),
            states: HashMap::new(),
            label,
            qualified,
        }
    }

    pub fn root(context: Box<dyn EvalContext>) -> Self {
        Frame {
            context: Some(context),
            locals: LocalVariables::default(),
            states: HashMap::new(),
            label: "root".to_string(),
            qualified: "root".to_string(),
        }
    }

    pub fn qualified_name(&self, name: &str) -> String {
        if self.qualified.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.qualified, name)
        }
    }
}

/// A frame's label when nothing more specific applies: the node's own bound
/// `id` if it has one, otherwise something derived from its kind so
/// backtraces and qualified paths stay readable.
pub(crate) fn frame_label(node: &Evaluable) -> String {
    use jas_ast::EvaluableKind;

    if let Some(id) = &node.id {
        return id.clone();
    }
    match &node.kind {
        EvaluableKind::FunctionInvocation(fi) => fi.name().to_string(),
        EvaluableKind::ListAlgorithm { kind, .. } => format!("{kind:?}").to_lowercase(),
        EvaluableKind::Dict(_) => "dict".to_string(),
        _ => "expr".to_string(),
    }
}
