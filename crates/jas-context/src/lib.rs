//! `EvalContext`: the interface the evaluator drives for variable scope,
//! argument stacks, and context-function dispatch, plus the base
//! parent-chained implementation and the historical (change-detecting)
//! implementation that gives the engine its persistent-state semantics.

mod context;
mod historical;

pub use context::{BaseEvalContext, EvalContext};
pub use historical::HistoricalEvalContext;

/// The context-function names [`HistoricalEvalContext`] dispatches via
/// [`EvalContext::invoke`]. A `Translator` needs this list up front so it can
/// recognise `@field`/`@snchg`/... as context calls rather than module calls
/// at translation time.
pub const HISTORICAL_CONTEXT_FUNCTIONS: &[&str] =
    &["field", "field_cv", "field_lv", "snchg", "evchg", "last_eval", "hfield", "hfield2arr"];
