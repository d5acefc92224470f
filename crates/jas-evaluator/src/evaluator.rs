//! `SyntaxEvaluator`: a tree-walking visitor over [`Evaluable`] that keeps
//! an explicit stack of [`Frame`]s (for lexical scoping, backtraces, and
//! `$N`/`$name` resolution) instead of relying on Rust's own call stack for
//! evaluation-frame identity.

use jas_ast::{
    ArithmeticOpKind, ArithmeticSelfAssignOpKind, ComparisonOpKind, ContextArgKind, Eval,
    Evaluable, EvaluableKind, FunctionInvocation, ListAlgorithmKind, LogicalOpKind,
};
use jas_context::EvalContext;
use jas_error::{JasError, JasResult};
use jas_modules::ModuleManager;
use jas_var::{Dict, Var};
use jas_translator::render;

use crate::frame::{frame_label, Frame, VarState};

/// Walks an [`Evaluable`] tree against a [`ModuleManager`] and a root
/// [`EvalContext`], producing the resulting [`Var`].
///
/// One `SyntaxEvaluator` is scoped to a single top-level [`Self::evaluate`]
/// call -- `modules` is shared read-only across many evaluations, but the
/// frame stack itself is not meant to outlive one root evaluation.
pub struct SyntaxEvaluator<'m> {
    modules: &'m ModuleManager,
    stack: Vec<Frame>,
}

impl<'m> SyntaxEvaluator<'m> {
    pub fn new(modules: &'m ModuleManager) -> Self {
        SyntaxEvaluator {
            modules,
            stack: Vec::new(),
        }
    }

    /// Evaluates `ast` against `context`, which becomes the root frame's
    /// own context (not a fresh child of anything -- it's whatever the
    /// caller, typically `jas::JASFacade`, supplied).
    pub fn evaluate(&mut self, ast: &Evaluable, context: Box<dyn EvalContext>) -> JasResult<Var> {
        self.stack.push(Frame::root(context));
        let result = self.eval_node(ast);
        self.stack.pop();
        result
    }

    // ---- frame-stack plumbing -------------------------------------------------

    fn ctx_idx(&self) -> usize {
        self.stack
            .iter()
            .rposition(|f| f.context.is_some())
            .expect("root frame always owns a context")
    }

    fn ctx(&self) -> &dyn EvalContext {
        self.stack[self.ctx_idx()]
            .context
            .as_deref()
            .expect("checked Some by ctx_idx")
    }

    fn nearest_owning_at_or_before(&self, idx: usize) -> usize {
        (0..=idx)
            .rev()
            .find(|&i| self.stack[i].context.is_some())
            .expect("root frame always owns a context")
    }

    fn qualified_parent(&self) -> String {
        self.stack.last().map(|f| f.qualified.clone()).unwrap_or_default()
    }

    fn push_frame(&mut self, node: &Evaluable, label: String) {
        let parent = self.qualified_parent();
        let qualified = if parent.is_empty() { label.clone() } else { format!("{parent}/{label}") };
        tracing::trace!(label = %label, "push frame");
        self.stack.push(Frame::for_node(node, None, label, qualified));
    }

    fn push_owning_frame(&mut self, node: &Evaluable, label: String, args: Vec<Var>, input: Option<Var>) {
        let new_ctx = self.ctx().make_child(args, input);
        let parent = self.qualified_parent();
        let qualified = if parent.is_empty() { label.clone() } else { format!("{parent}/{label}") };
        tracing::trace!(label = %label, "push owning frame");
        self.stack.push(Frame::for_node(node, Some(new_ctx), label, qualified));
    }

    fn pop_frame(&mut self) {
        if let Some(f) = self.stack.pop() {
            tracing::trace!(label = %f.label, "pop frame");
        }
    }

    // ---- dispatch ---------------------------------------------------------

    /// Evaluates `node` as a child expression: opens a new frame first if
    /// (and only if) `node` needs one, per [`Evaluable::uses_stack`].
    fn eval_node(&mut self, node: &Evaluable) -> JasResult<Var> {
        if !node.uses_stack() {
            return self.eval_in_place(node);
        }
        match &node.kind {
            EvaluableKind::FunctionInvocation(FunctionInvocation::Macro { param, .. }) => {
                let args = self.eval_invocation_args(param.as_deref())?;
                self.push_owning_frame(node, frame_label(node), args, None);
            }
            _ => self.push_frame(node, frame_label(node)),
        }
        let result = self.eval_in_place(node);
        self.pop_frame();
        result.map_err(|e| e.with_frame(render(node)))
    }

    /// Evaluates `node`'s own content, assuming a frame matching `node` is
    /// already on top of the stack (pushed by the caller).
    fn eval_in_place(&mut self, node: &Evaluable) -> JasResult<Var> {
        match &node.kind {
            EvaluableKind::Constant(v) => Ok(v.clone()),
            EvaluableKind::Dict(entries) => self.eval_dict(entries),
            EvaluableKind::List(items) => {
                let values = items.iter().map(|i| self.eval_node(i)).collect::<JasResult<Vec<_>>>()?;
                Ok(Var::list(values))
            }
            EvaluableKind::ArithmeticOp { kind, params } => self.eval_arithmetic(*kind, params),
            EvaluableKind::ArithmeticSelfAssignOp { kind, target, value } => {
                self.eval_self_assign(*kind, target, value)
            }
            EvaluableKind::LogicalOp { kind, params } => self.eval_logical(*kind, params),
            EvaluableKind::ComparisonOp { kind, lhs, rhs } => self.eval_comparison(*kind, lhs, rhs),
            EvaluableKind::ListAlgorithm { kind, list, cond } => self.eval_list_algorithm(*kind, list, cond),
            EvaluableKind::FunctionInvocation(fi) => self.eval_function_invocation(fi),
            EvaluableKind::ObjectPropertyQuery { object, path } => self.eval_property_query(object, path),
            EvaluableKind::Variable(name) => self.lookup_variable(name),
            EvaluableKind::ContextArgument(n) => self.ctx().arg(*n),
            EvaluableKind::ContextArgumentsInfo(ContextArgKind::ArgCount) => {
                Ok(Var::Int(self.ctx().arg_count() as i64))
            }
            EvaluableKind::ContextArgumentsInfo(ContextArgKind::Args) => Ok(Var::list(self.ctx().args())),
        }
    }

    fn eval_dict(&mut self, entries: &indexmap::IndexMap<String, Evaluable>) -> JasResult<Var> {
        let mut out = Dict::new();
        for (k, v) in entries {
            out.insert(k.clone(), self.eval_node(v)?);
        }
        Ok(Var::dict(out))
    }

    // ---- arithmetic / logical / comparison ---------------------------------

    fn eval_arithmetic(&mut self, kind: ArithmeticOpKind, params: &[Evaluable]) -> JasResult<Var> {
        let values = params.iter().map(|p| self.eval_node(p)).collect::<JasResult<Vec<_>>>()?;
        match kind {
            ArithmeticOpKind::Neg => values[0].op_neg(),
            ArithmeticOpKind::BitNot => values[0].op_bitnot(),
            ArithmeticOpKind::Mod => values[0].op_rem(&values[1]),
            _ => {
                let op: fn(&Var, &Var) -> JasResult<Var> = match kind {
                    ArithmeticOpKind::Add => Var::op_add,
                    ArithmeticOpKind::Sub => Var::op_sub,
                    ArithmeticOpKind::Mul => Var::op_mul,
                    ArithmeticOpKind::Div => Var::op_div,
                    ArithmeticOpKind::BitAnd => Var::op_bitand,
                    ArithmeticOpKind::BitOr => Var::op_bitor,
                    ArithmeticOpKind::BitXor => Var::op_bitxor,
                    ArithmeticOpKind::Mod | ArithmeticOpKind::BitNot | ArithmeticOpKind::Neg => unreachable!(),
                };
                let mut iter = values.into_iter();
                let mut acc = iter.next().expect("arity already validated at translation");
                for v in iter {
                    acc = op(&acc, &v)?;
                }
                Ok(acc)
            }
        }
    }

    fn eval_self_assign(
        &mut self,
        kind: ArithmeticSelfAssignOpKind,
        target: &Evaluable,
        value: &Evaluable,
    ) -> JasResult<Var> {
        let name = match &target.kind {
            EvaluableKind::Variable(n) => n.clone(),
            _ => return Err(JasError::syntax("self-assign target must be a variable")),
        };
        let current = self.lookup_variable(&name)?;
        let rhs = self.eval_node(value)?;
        let mut updated = match kind {
            ArithmeticSelfAssignOpKind::AddAssign => current.op_add(&rhs)?,
            ArithmeticSelfAssignOpKind::SubAssign => current.op_sub(&rhs)?,
            ArithmeticSelfAssignOpKind::MulAssign => current.op_mul(&rhs)?,
            ArithmeticSelfAssignOpKind::DivAssign => current.op_div(&rhs)?,
            ArithmeticSelfAssignOpKind::ModAssign => current.op_rem(&rhs)?,
            ArithmeticSelfAssignOpKind::AndAssign => current.op_bitand(&rhs)?,
            ArithmeticSelfAssignOpKind::OrAssign => current.op_bitor(&rhs)?,
            ArithmeticSelfAssignOpKind::XorAssign => current.op_bitxor(&rhs)?,
        };
        updated.detach_if_shared();
        self.store_existing_variable(&name, updated.clone())?;
        Ok(updated)
    }

    fn eval_logical(&mut self, kind: LogicalOpKind, params: &[Evaluable]) -> JasResult<Var> {
        match kind {
            LogicalOpKind::Not => self.eval_node(&params[0])?.op_not(),
            LogicalOpKind::And => {
                for p in params {
                    if !self.eval_node(p)?.as_bool()? {
                        return Ok(Var::Bool(false));
                    }
                }
                Ok(Var::Bool(true))
            }
            LogicalOpKind::Or => {
                for p in params {
                    if self.eval_node(p)?.as_bool()? {
                        return Ok(Var::Bool(true));
                    }
                }
                Ok(Var::Bool(false))
            }
        }
    }

    fn eval_comparison(&mut self, kind: ComparisonOpKind, lhs: &Evaluable, rhs: &Evaluable) -> JasResult<Var> {
        let l = self.eval_node(lhs)?;
        let r = self.eval_node(rhs)?;
        Ok(Var::Bool(match kind {
            ComparisonOpKind::Eq => l.op_eq(&r),
            ComparisonOpKind::Ne => l.op_ne(&r),
            ComparisonOpKind::Lt => l.op_lt(&r)?,
            ComparisonOpKind::Gt => l.op_gt(&r)?,
            ComparisonOpKind::Le => l.op_le(&r)?,
            ComparisonOpKind::Ge => l.op_ge(&r)?,
        }))
    }

    fn eval_property_query(&mut self, object: &Evaluable, path: &[Evaluable]) -> JasResult<Var> {
        let mut current = self.eval_node(object)?;
        for part in path {
            if current.is_null() {
                return Ok(Var::Null);
            }
            let key = self.eval_node(part)?;
            current = if current.is_list() {
                let idx = key.as_usize()?;
                current.with_list(|l| l.get(idx).cloned())?.unwrap_or(Var::Null)
            } else if current.is_dict() {
                let k = key.to_owned_string()?;
                current.with_dict(|d| d.get(&k).cloned())?.unwrap_or(Var::Null)
            } else {
                return Err(JasError::type_error(format!(
                    "cannot index into {}",
                    current.dump()
                )));
            };
        }
        Ok(current)
    }

    // ---- list algorithms ----------------------------------------------------

    fn eval_list_algorithm(&mut self, kind: ListAlgorithmKind, list: &Evaluable, cond: &Evaluable) -> JasResult<Var> {
        let list_value = self.eval_node(list)?;
        let items = list_value.with_list(|l| l.clone())?;
        match kind {
            ListAlgorithmKind::AnyOf => {
                for item in &items {
                    if self.eval_predicate(cond, item.clone())?.as_bool()? {
                        return Ok(Var::Bool(true));
                    }
                }
                Ok(Var::Bool(false))
            }
            ListAlgorithmKind::AllOf => {
                for item in &items {
                    if !self.eval_predicate(cond, item.clone())?.as_bool()? {
                        return Ok(Var::Bool(false));
                    }
                }
                Ok(Var::Bool(true))
            }
            ListAlgorithmKind::NoneOf => {
                for item in &items {
                    if self.eval_predicate(cond, item.clone())?.as_bool()? {
                        return Ok(Var::Bool(false));
                    }
                }
                Ok(Var::Bool(true))
            }
            ListAlgorithmKind::CountIf => {
                let mut count = 0i64;
                for item in &items {
                    if self.eval_predicate(cond, item.clone())?.as_bool()? {
                        count += 1;
                    }
                }
                Ok(Var::Int(count))
            }
            ListAlgorithmKind::FilterIf => {
                let mut out = Vec::new();
                for item in &items {
                    if self.eval_predicate(cond, item.clone())?.as_bool()? {
                        out.push(item.clone());
                    }
                }
                Ok(Var::list(out))
            }
            ListAlgorithmKind::Transform => {
                let mut out = Vec::with_capacity(items.len());
                for item in &items {
                    out.push(self.eval_predicate(cond, item.clone())?);
                }
                Ok(Var::list(out))
            }
        }
    }

    fn eval_predicate(&mut self, cond: &Evaluable, element: Var) -> JasResult<Var> {
        self.eval_with_args(cond, vec![element])
    }

    // ---- function invocation ------------------------------------------------

    fn eval_function_invocation(&mut self, fi: &FunctionInvocation) -> JasResult<Var> {
        match fi {
            FunctionInvocation::Module { module, name, param } => {
                let module_impl = self.modules.find_qualified(module, name).ok_or_else(|| {
                    JasError::function_not_found(format!("no function '{name}' in module '{module}'"))
                })?;
                module_impl.eval(name, param.as_deref(), self)
            }
            FunctionInvocation::Context { name, param } => {
                let param_value = match param {
                    Some(p) => Some(self.eval_node(p)?),
                    None => None,
                };
                let ctx_idx = self.ctx_idx();
                let mut owned = self.stack[ctx_idx]
                    .context
                    .take()
                    .expect("owning frame always holds a context");
                let result = owned.invoke(name, param_value, self);
                self.stack[ctx_idx].context = Some(owned);
                result
            }
            FunctionInvocation::Evaluator { name, param } => {
                if name != "return" {
                    return Err(JasError::function_not_found(format!(
                        "no evaluator function named '{name}'"
                    )));
                }
                match param {
                    Some(p) => self.eval_node(p),
                    None => Ok(Var::Null),
                }
            }
            FunctionInvocation::Macro { body, .. } => self.eval_node(body),
        }
    }

    /// Evaluates the positional-argument expansion of a macro/list-element
    /// call's `param`: `None` is no args, a list expands element-wise,
    /// anything else is a single positional argument.
    fn eval_invocation_args(&mut self, param: Option<&Evaluable>) -> JasResult<Vec<Var>> {
        let Some(p) = param else { return Ok(Vec::new()) };
        let value = self.eval_node(p)?;
        if value.is_list() {
            value.with_list(|l| l.clone())
        } else {
            Ok(vec![value])
        }
    }

    // ---- variable resolution --------------------------------------------------

    /// §4.4's variable-resolution algorithm: ask the nearest owning
    /// context first, then walk the frame stack from innermost outward
    /// looking for a frame that declares `name` as a local, lazily
    /// evaluating its initialiser on first reference and detecting cycles.
    ///
    /// A leading `.` (`$.name`) is the root-scope sigil: it bypasses the
    /// innermost-outward walk entirely and resolves only against the root
    /// frame, regardless of how deep the current frame stack is.
    fn lookup_variable(&mut self, name: &str) -> JasResult<Var> {
        if let Some(bare) = name.strip_prefix('.') {
            return self.lookup_variable_at(0, bare);
        }

        if let Some(v) = self.ctx().get_variable(name) {
            return Ok(v);
        }

        let Some(frame_idx) = (0..self.stack.len()).rev().find(|&i| self.stack[i].locals.0.contains_key(name))
        else {
            return Err(JasError::evaluation(format!("unknown variable '{name}'")));
        };

        self.lookup_variable_at(frame_idx, name)
    }

    /// Resolve `name` starting strictly from `frame_idx`: check that frame's
    /// owning context, then (if it declares `name` as a local) lazily
    /// evaluate it there. Shared by the ordinary lexical walk and the
    /// root-scope (`$.name`) shortcut.
    fn lookup_variable_at(&mut self, frame_idx: usize, name: &str) -> JasResult<Var> {
        let owning_idx = self.nearest_owning_at_or_before(frame_idx);
        if let Some(v) = self.stack[owning_idx].context.as_deref().unwrap().get_variable(name) {
            return Ok(v);
        }

        if !self.stack[frame_idx].locals.0.contains_key(name) {
            return Err(JasError::evaluation(format!("unknown variable '{name}'")));
        }

        match self.stack[frame_idx].states.get(name) {
            Some(VarState::Evaluated(v)) => return Ok(v.clone()),
            Some(VarState::Evaluating) => {
                return Err(JasError::evaluation(format!("cyclic reference evaluating '{name}'")));
            }
            _ => {}
        }

        let def = self.stack[frame_idx]
            .locals
            .0
            .get(name)
            .expect("checked contains_key above")
            .clone();
        self.stack[frame_idx].states.insert(name.to_string(), VarState::Evaluating);

        let result = self.eval_node(&def.expr);
        match result {
            Ok(value) => {
                self.stack[frame_idx]
                    .states
                    .insert(name.to_string(), VarState::Evaluated(value.clone()));
                if def.update {
                    self.store_outer_variable(frame_idx, name, value.clone())?;
                } else {
                    let ctx_idx = self.nearest_owning_at_or_before(frame_idx);
                    self.stack[ctx_idx]
                        .context
                        .as_deref_mut()
                        .unwrap()
                        .set_variable(name, value.clone());
                    let qualified = self.stack[frame_idx].qualified_name(name);
                    self.stack[ctx_idx]
                        .context
                        .as_deref_mut()
                        .unwrap()
                        .remember(&qualified, &value);
                }
                Ok(value)
            }
            Err(e) => {
                self.stack[frame_idx].states.insert(name.to_string(), VarState::NotEvaluated);
                Err(e)
            }
        }
    }

    /// `$+name`: mutate an *existing* binding in an enclosing scope rather
    /// than declaring a new one.
    fn store_outer_variable(&mut self, below_idx: usize, name: &str, value: Var) -> JasResult<()> {
        let outer_idx = (0..below_idx)
            .rev()
            .find(|&i| self.stack[i].context.as_deref().is_some_and(|c| c.get_variable(name).is_some()));
        match outer_idx {
            Some(i) => {
                self.stack[i].context.as_deref_mut().unwrap().set_variable(name, value);
                Ok(())
            }
            None => Err(JasError::evaluation(format!(
                "'$+{name}' updates a variable that was never declared in an enclosing scope"
            ))),
        }
    }

    /// Self-assign's `$name op= ...`: mutate whichever existing binding
    /// currently holds `name`, preferring a declaring frame's cached slot.
    ///
    /// `$.name` targets are pinned to the root frame, matching the
    /// root-scope shortcut in `lookup_variable`.
    fn store_existing_variable(&mut self, name: &str, value: Var) -> JasResult<()> {
        if let Some(bare) = name.strip_prefix('.') {
            if self.stack[0].locals.0.contains_key(bare) {
                self.stack[0].states.insert(bare.to_string(), VarState::Evaluated(value.clone()));
                self.stack[0].context.as_deref_mut().unwrap().set_variable(bare, value.clone());
                let qualified = self.stack[0].qualified_name(bare);
                self.stack[0].context.as_deref_mut().unwrap().remember(&qualified, &value);
                return Ok(());
            }
            if self.stack[0].context.as_deref().is_some_and(|c| c.get_variable(bare).is_some()) {
                self.stack[0].context.as_deref_mut().unwrap().set_variable(bare, value);
                return Ok(());
            }
            return Err(JasError::evaluation(format!("unknown root variable '$.{bare}'")));
        }
        if let Some(frame_idx) = (0..self.stack.len()).rev().find(|&i| self.stack[i].locals.0.contains_key(name)) {
            self.stack[frame_idx]
                .states
                .insert(name.to_string(), VarState::Evaluated(value.clone()));
            let ctx_idx = self.nearest_owning_at_or_before(frame_idx);
            self.stack[ctx_idx].context.as_deref_mut().unwrap().set_variable(name, value.clone());
            let qualified = self.stack[frame_idx].qualified_name(name);
            self.stack[ctx_idx].context.as_deref_mut().unwrap().remember(&qualified, &value);
            return Ok(());
        }
        if let Some(ctx_idx) = (0..self.stack.len())
            .rev()
            .find(|&i| self.stack[i].context.as_deref().is_some_and(|c| c.get_variable(name).is_some()))
        {
            self.stack[ctx_idx].context.as_deref_mut().unwrap().set_variable(name, value);
            return Ok(());
        }
        Err(JasError::evaluation(format!("unknown variable '{name}'")))
    }
}

impl<'m> Eval for SyntaxEvaluator<'m> {
    fn eval(&mut self, node: &Evaluable) -> JasResult<Var> {
        self.eval_node(node)
    }

    fn eval_with_args(&mut self, node: &Evaluable, args: Vec<Var>) -> JasResult<Var> {
        self.push_owning_frame(node, frame_label(node), args, None);
        let result = self.eval_in_place(node);
        self.pop_frame();
        result.map_err(|e| e.with_frame(render(node)))
    }

    fn resolve_variable(&mut self, name: &str) -> JasResult<Var> {
        self.lookup_variable(name)
    }

    fn qualified_path(&self, name: &str) -> String {
        let idx = (0..self.stack.len()).rev().find(|&i| self.stack[i].locals.0.contains_key(name));
        match idx {
            Some(i) => self.stack[i].qualified_name(name),
            None => self.stack.last().map(|f| f.qualified_name(name)).unwrap_or_else(|| name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use jas_context::BaseEvalContext;
    use jas_modules::default_module_manager;
    use jas_translator::{ParseMode, Translator};

    use super::*;

    fn run(json: &serde_json::Value) -> JasResult<Var> {
        let modules = default_module_manager();
        let mut translator = Translator::new(&modules, &[], "1.0.0");
        let ast = translator.translate(json, ParseMode::Formal)?;
        let mut evaluator = SyntaxEvaluator::new(&modules);
        evaluator.evaluate(&ast, Box::new(BaseEvalContext::new()))
    }

    #[test]
    fn plus_over_three_operands() {
        let result = run(&serde_json::json!({"@plus": [1, 2, 3]})).unwrap();
        assert_eq!(result.as_i64().unwrap(), 6);
    }

    #[test]
    fn and_short_circuits_before_a_raising_second_operand() {
        let json = serde_json::json!({
            "@and": [false, {"@divides": [1, 0]}],
        });
        // If `&&` evaluated the second operand, this would raise a
        // divide-by-zero error instead of returning `false`.
        let result = run(&json).unwrap();
        assert_eq!(result.as_bool().unwrap(), false);
    }

    #[test]
    fn or_short_circuits_before_a_raising_second_operand() {
        let json = serde_json::json!({
            "@or": [true, {"@divides": [1, 0]}],
        });
        let result = run(&json).unwrap();
        assert_eq!(result.as_bool().unwrap(), true);
    }

    #[test]
    fn bounded_range_comparison_short_circuits_the_second_clause() {
        let json = serde_json::json!({
            "$x": 10,
            "@and": [{"@gt": ["$x", 0]}, {"@lt": ["$x", 10]}],
        });
        assert_eq!(run(&json).unwrap().as_bool().unwrap(), false);

        let json_true = serde_json::json!({
            "$x": 5,
            "@and": [{"@gt": ["$x", 0]}, {"@lt": ["$x", 10]}],
        });
        assert_eq!(run(&json_true).unwrap().as_bool().unwrap(), true);
    }

    #[test]
    fn any_of_over_an_explicit_list() {
        let json = serde_json::json!({
            "@any_of": {"@cond": {"@eq": ["$1", 3]}, "@list": [1, 2, 3, 4]},
        });
        assert_eq!(run(&json).unwrap().as_bool().unwrap(), true);
    }

    #[test]
    fn transform_squares_each_element() {
        let json = serde_json::json!({
            "@transform": {"@cond": {"@multiplies": ["$1", "$1"]}, "@list": [1, 2, 3]},
        });
        let result = run(&json).unwrap();
        let items = result.with_list(|l| l.clone()).unwrap();
        let squares: Vec<i64> = items.iter().map(|v| v.as_i64().unwrap()).collect();
        assert_eq!(squares, vec![1, 4, 9]);
    }

    #[test]
    fn filter_if_keeps_only_matching_elements() {
        let json = serde_json::json!({
            "@filter_if": {"@cond": {"@gt": ["$1", 2]}, "@list": [1, 2, 3, 4]},
        });
        let result = run(&json).unwrap();
        let items = result.with_list(|l| l.clone()).unwrap();
        let kept: Vec<i64> = items.iter().map(|v| v.as_i64().unwrap()).collect();
        assert_eq!(kept, vec![3, 4]);
    }

    #[test]
    fn cyclic_variable_reference_is_an_evaluation_error() {
        let json = serde_json::json!({
            "$a": "$b",
            "$b": "$a",
            "@plus": ["$a", 1],
        });
        let err = run(&json).unwrap_err();
        assert_eq!(err.kind, jas_error::ErrorKind::EvaluationError);
    }

    #[test]
    fn self_assign_mutates_in_place_and_returns_the_updated_value() {
        let json = serde_json::json!({
            "$v": 1,
            "@plus_assign": ["$v", 1],
        });
        assert_eq!(run(&json).unwrap().as_i64().unwrap(), 2);
    }

    #[test]
    fn captured_value_is_unaffected_by_a_later_self_assign() {
        // `captured` references `$x` (itself `$v`) before `updated` mutates
        // `$v` in place; copy-on-write means `captured`'s cached value must
        // not observe the later increment.
        let json = serde_json::json!({
            "$v": 1,
            "captured": "$x",
            "$x": "$v",
            "updated": {"@plus_assign": ["$v", 1]},
        });
        let result = run(&json).unwrap();
        assert_eq!(result.get_path("captured").as_i64().unwrap(), 1);
        assert_eq!(result.get_path("updated").as_i64().unwrap(), 2);
    }

    #[test]
    fn property_query_short_circuits_on_null_intermediate() {
        // `x.a` is `null`, so the second path component must never be
        // evaluated -- if it were, this would raise a divide-by-zero error
        // instead of yielding `null`.
        let json = serde_json::json!({
            "$x": {"a": null},
            "result": "$x[a/@divides: [1, 0]]",
        });
        let result = run(&json).unwrap();
        assert!(result.get_path("result").is_null());
    }

    #[test]
    fn root_scoped_variable_resolves_against_the_root_frame() {
        let json = serde_json::json!({
            "$x": 1,
            "@any_of": {
                "@cond": {"@eq": ["$1", "$.x"]},
                "@list": [1, 2],
            },
        });
        assert_eq!(run(&json).unwrap().as_bool().unwrap(), true);
    }

    #[test]
    fn unresolved_module_qualified_name_is_a_syntax_error() {
        let json = serde_json::json!({"@list.nonexistent_op": [1, 2]});
        let err = run(&json).unwrap_err();
        assert_eq!(err.kind, jas_error::ErrorKind::SyntaxError);
    }
}

