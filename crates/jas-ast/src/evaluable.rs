//! The `Evaluable` tree the translator produces and the evaluator walks.

use std::rc::Rc;

use indexmap::IndexMap;
use jas_var::Var;

use crate::kinds::{
    ArithmeticOpKind, ArithmeticSelfAssignOpKind, ComparisonOpKind, ContextArgKind,
    ListAlgorithmKind, LogicalOpKind,
};

/// One locally-declared variable: its declaration-order position (implicit
/// in `LocalVariables`'s map order), whether it is a declaration or an
/// update of an outer binding, and its lazily-evaluated initialiser.
#[derive(Debug, Clone)]
pub struct LocalVarDef {
    pub update: bool,
    pub expr: Evaluable,
}

/// Locally-declared variables of one scope, in declaration order. The
/// evaluator consults declaration order only to seed lazy lookup; actual
/// evaluation order follows first reference (see `jas-evaluator`).
#[derive(Debug, Clone, Default)]
pub struct LocalVariables(pub IndexMap<String, LocalVarDef>);

impl LocalVariables {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Metadata carried by every "non-trivial" (`UseStackEvaluable`) node: its
/// locally-declared variables. Local macros are a translation-time-only
/// concept -- every macro call site is already resolved to the macro's body
/// by the time translation finishes (see `jas-translator`), so the runtime
/// tree carries no macro table.
#[derive(Debug, Clone, Default)]
pub struct LocalScope {
    pub variables: LocalVariables,
}

impl LocalScope {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// The four function-invocation flavours sharing `name`/`param`.
#[derive(Debug, Clone)]
pub enum FunctionInvocation {
    /// Bound to a specific module at translation time.
    Module {
        module: String,
        name: String,
        param: Option<Box<Evaluable>>,
    },
    /// Dispatched against the active `EvalContext` at evaluation time.
    Context {
        name: String,
        param: Option<Box<Evaluable>>,
    },
    /// An engine-reserved name (currently just `return`).
    Evaluator {
        name: String,
        param: Option<Box<Evaluable>>,
    },
    /// Resolved to a macro body by walking enclosing scopes at translation
    /// time; `body` is the shared, already-translated macro definition.
    Macro {
        name: String,
        body: Rc<Evaluable>,
        param: Option<Box<Evaluable>>,
    },
}

impl FunctionInvocation {
    pub fn name(&self) -> &str {
        match self {
            FunctionInvocation::Module { name, .. }
            | FunctionInvocation::Context { name, .. }
            | FunctionInvocation::Evaluator { name, .. }
            | FunctionInvocation::Macro { name, .. } => name,
        }
    }
}

/// The node-kind sum type, without the `id`/`locals` metadata every node
/// shares -- that metadata lives on the enclosing [`Evaluable`].
#[derive(Debug, Clone)]
pub enum EvaluableKind {
    /// Yields `value` unconditionally; never opens a stack frame.
    Constant(Var),
    /// Evaluates children and returns a `Var::Dict`.
    Dict(IndexMap<String, Evaluable>),
    /// Evaluates items and returns a `Var::List`.
    List(Vec<Evaluable>),
    ArithmeticOp {
        kind: ArithmeticOpKind,
        params: Vec<Evaluable>,
    },
    /// `params[0]` must translate to a `Variable`; mutates its binding.
    ArithmeticSelfAssignOp {
        kind: ArithmeticSelfAssignOpKind,
        target: Box<Evaluable>,
        value: Box<Evaluable>,
    },
    LogicalOp {
        kind: LogicalOpKind,
        params: Vec<Evaluable>,
    },
    ComparisonOp {
        kind: ComparisonOpKind,
        lhs: Box<Evaluable>,
        rhs: Box<Evaluable>,
    },
    ListAlgorithm {
        kind: ListAlgorithmKind,
        list: Box<Evaluable>,
        cond: Box<Evaluable>,
    },
    FunctionInvocation(FunctionInvocation),
    ObjectPropertyQuery {
        object: Box<Evaluable>,
        path: Vec<Evaluable>,
    },
    /// Looks up `name` in the lexical chain; `name` may be a reserved
    /// prefix form (`$.foo`), already distinguished by the translator.
    Variable(String),
    /// 1-based positional context argument (`$N`).
    ContextArgument(usize),
    /// `$#` / `$*`.
    ContextArgumentsInfo(ContextArgKind),
}

/// One node of the evaluable tree.
#[derive(Debug, Clone)]
pub struct Evaluable {
    pub kind: EvaluableKind,
    /// When present, the node's evaluated result is bound as a variable of
    /// this name in the current scope.
    pub id: Option<String>,
    pub locals: LocalScope,
}

impl Evaluable {
    pub fn new(kind: EvaluableKind) -> Self {
        Evaluable {
            kind,
            id: None,
            locals: LocalScope::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_locals(mut self, locals: LocalScope) -> Self {
        self.locals = locals;
        self
    }

    pub fn constant(v: Var) -> Self {
        Evaluable::new(EvaluableKind::Constant(v))
    }

    /// `true` if evaluating this node must open a new evaluation frame:
    /// it declares local variables, or its kind is inherently one of the
    /// "use-stack" families (everything except `Constant`/`Dict`/`List`
    /// without locals).
    pub fn uses_stack(&self) -> bool {
        if !self.locals.is_empty() {
            return true;
        }
        match &self.kind {
            EvaluableKind::Constant(_) => false,
            EvaluableKind::Dict(_) | EvaluableKind::List(_) => false,
            _ => true,
        }
    }

    /// `true` if this node and (recursively) all its children are
    /// `Constant` -- such a node is eligible for constant folding at
    /// translation time.
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, EvaluableKind::Constant(_))
    }
}
