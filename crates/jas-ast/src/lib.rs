//! The `Evaluable` tree every translated JAS expression compiles to, plus
//! the operator-kind enums and the `Eval` callback trait that lets built-in
//! function modules recurse into evaluation without `jas-ast`'s downstream
//! crates forming a dependency cycle.

mod eval_trait;
mod evaluable;
mod kinds;

pub use eval_trait::Eval;
pub use evaluable::{
    Evaluable, EvaluableKind, FunctionInvocation, LocalScope, LocalVarDef, LocalVariables,
};
pub use kinds::{
    ArithmeticOpKind, ArithmeticSelfAssignOpKind, ComparisonOpKind, ContextArgKind,
    ListAlgorithmKind, LogicalOpKind,
};
