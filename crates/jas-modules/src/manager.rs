//! `FunctionModule`: the interface every built-in (and host-supplied)
//! function module implements, plus `ModuleManager`, the registry the
//! translator and evaluator both consult to resolve and dispatch `@name`
//! calls.

use std::rc::Rc;

use jas_ast::{Eval, Evaluable, EvaluableKind};
use jas_error::{JasError, JasResult};
use jas_var::Var;

/// A named group of callable functions. `eval` receives the *unevaluated*
/// parameter expression so a module can implement lazy/short-circuit
/// semantics (a comparator evaluated once per pair in `alg.sort`) instead of
/// being forced to eagerly evaluate everything up front.
pub trait FunctionModule {
    /// Empty string for the reserved "no module" (`cif`) function set.
    fn module_name(&self) -> &str;
    fn has(&self, name: &str) -> bool;
    /// Appends this module's function names (bare for `cif`, otherwise
    /// `module.name`) to `out`.
    fn enumerate(&self, out: &mut Vec<String>);
    fn eval(&self, name: &str, param: Option<&Evaluable>, evaluator: &mut dyn Eval) -> JasResult<Var>;
}

/// Splits a call's parameter expression into its positional arguments.
///
/// A multi-argument call (`[a, b]`) translates to an `EvaluableKind::List`
/// unless every element is constant, in which case the translator folds it
/// straight to `Constant(Var::List(...))` -- this re-expands that folded
/// form back into synthetic per-element `Constant` nodes so callers always
/// see a flat `Vec<Evaluable>` regardless of which form translation chose. A
/// single non-list argument is wrapped as a one-element vector.
pub fn param_items(param: Option<&Evaluable>) -> Vec<Evaluable> {
    match param {
        None => Vec::new(),
        Some(Evaluable {
            kind: EvaluableKind::List(items),
            ..
        }) => items.clone(),
        Some(Evaluable {
            kind: EvaluableKind::Constant(v),
            ..
        }) if v.is_list() => v
            .with_list(|l| l.clone())
            .unwrap_or_default()
            .into_iter()
            .map(Evaluable::constant)
            .collect(),
        Some(other) => vec![other.clone()],
    }
}

/// Registry of `FunctionModule`s, shared read-only across an evaluation.
#[derive(Default)]
pub struct ModuleManager {
    modules: Vec<Rc<dyn FunctionModule>>,
}

impl ModuleManager {
    pub fn new() -> Self {
        ModuleManager::default()
    }

    pub fn register(&mut self, module: Rc<dyn FunctionModule>) {
        self.modules.push(module);
    }

    pub fn find_qualified(&self, module: &str, name: &str) -> Option<Rc<dyn FunctionModule>> {
        self.modules
            .iter()
            .find(|m| m.module_name() == module && m.has(name))
            .cloned()
    }

    /// Resolution order for a bare `@name`: the reserved no-module (`cif`)
    /// set first, then exactly one other module claiming the name.
    /// Ambiguous claims across modules are a translation error.
    pub fn find_bare(&self, name: &str) -> JasResult<Option<Rc<dyn FunctionModule>>> {
        if let Some(m) = self.find_qualified("", name) {
            return Ok(Some(m));
        }
        let mut claimants = self
            .modules
            .iter()
            .filter(|m| !m.module_name().is_empty() && m.has(name));
        let first = claimants.next().cloned();
        if first.is_some() && claimants.next().is_some() {
            return Err(JasError::syntax(format!(
                "function '{name}' is ambiguous: claimed by more than one module"
            )));
        }
        Ok(first)
    }

    pub fn enumerate_all(&self) -> Vec<String> {
        let mut out = Vec::new();
        for m in &self.modules {
            m.enumerate(&mut out);
        }
        out
    }
}
