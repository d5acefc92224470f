//! Minimal callback surface a [`FunctionModule`] needs to recurse into
//! evaluation, kept in `jas-ast` (the one crate both `jas-modules` and
//! `jas-evaluator` already depend on) so neither of those two needs to
//! depend on the other.
//!
//! [`FunctionModule`]: https://docs.rs/jas-modules (conceptually; see the
//! `jas-modules` crate in this workspace)

use jas_error::JasResult;
use jas_var::Var;

use crate::evaluable::Evaluable;

/// Implemented by the evaluator; modules (`alg.sort`, `alg.filter`, ...) call
/// back through this trait to evaluate predicates/comparators/transforms
/// rather than re-implementing tree-walking themselves. `EvalContext`
/// implementations (`evchg`, in particular) also call back through it to
/// resolve a sibling variable and ask for its qualified persistence path.
pub trait Eval {
    /// Evaluate `node` using the current frame's context as-is.
    fn eval(&mut self, node: &Evaluable) -> JasResult<Var>;

    /// Push a fresh frame exposing `args` as the new frame's positional
    /// context arguments (`$1..`, `$#`, `$*`), evaluate `node` in it, and
    /// pop. This is how list-algorithm predicates and module comparators see
    /// the element(s) they're invoked with.
    fn eval_with_args(&mut self, node: &Evaluable, args: Vec<Var>) -> JasResult<Var>;

    /// Resolve a lexical variable by name against the current frame stack,
    /// the same way a `Variable` node would -- used by `evchg` to obtain the
    /// current value of the variable it's being asked to compare.
    fn resolve_variable(&mut self, name: &str) -> JasResult<Var>;

    /// The slash-joined chain of enclosing frame ids followed by `name`,
    /// used as the persistent identity of a declared variable (see
    /// `HistoricalEvalContext::remember`/`evchg`).
    fn qualified_path(&self, name: &str) -> String;
}
