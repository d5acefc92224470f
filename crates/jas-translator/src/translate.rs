//! The main translation pipeline: walks reconstructed JSON producing a
//! validated [`Evaluable`] tree, resolving function references against a
//! [`ModuleManager`] and linking macro call sites to their declarations.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use jas_ast::{
    ArithmeticOpKind, ArithmeticSelfAssignOpKind, ComparisonOpKind, ContextArgKind, Evaluable,
    EvaluableKind, FunctionInvocation, ListAlgorithmKind, LocalScope, LocalVarDef, LocalVariables,
    LogicalOpKind,
};
use jas_error::{JasError, JasResult};
use jas_modules::{cmp_ver, ModuleManager};
use jas_var::{Dict, Path, Var};

use crate::keywords::{self, OperatorKeyword};
use crate::reconstruct::reconstruct;
use crate::strings::{is_ident, parse_typed_literal, parse_variable, ParsedVariable, TypedLiteral};

/// Whether [`Translator::translate`] should first reconstruct colon-chain
/// shorthand, or take the input as already-formal JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Shorthand,
    Formal,
}

/// Walks one JSON document into an [`Evaluable`] tree. Carries the
/// translation-time-only macro scope stack; everything else is read-only
/// configuration borrowed for the translator's lifetime.
pub struct Translator<'a> {
    modules: &'a ModuleManager,
    context_functions: &'a [&'a str],
    engine_version: &'a str,
    macro_scopes: Vec<HashMap<String, Rc<Evaluable>>>,
}

impl<'a> Translator<'a> {
    /// `context_functions` is the set of names the facade's `EvalContext`
    /// dispatches directly (e.g. `HistoricalEvalContext`'s `field`/`snchg`/…)
    /// -- kept generic here so this crate never depends on `jas-context`.
    pub fn new(
        modules: &'a ModuleManager,
        context_functions: &'a [&'a str],
        engine_version: &'a str,
    ) -> Self {
        Translator {
            modules,
            context_functions,
            engine_version,
            macro_scopes: Vec::new(),
        }
    }

    pub fn translate(&mut self, json: &Value, mode: ParseMode) -> JasResult<Evaluable> {
        let normalized = match mode {
            ParseMode::Shorthand => reconstruct(json),
            ParseMode::Formal => json.clone(),
        };
        self.check_version_gate(&normalized)?;
        self.translate_value(&normalized)
    }

    fn check_version_gate(&self, value: &Value) -> JasResult<()> {
        if let Value::Object(map) = value {
            if let Some(Value::String(requested)) = map.get("$jas.version") {
                if cmp_ver(requested, self.engine_version) == Ordering::Greater {
                    return Err(JasError::syntax(format!(
                        "expression requires jas version '{requested}', engine is '{}'",
                        self.engine_version
                    )));
                }
            }
        }
        Ok(())
    }

    fn translate_value(&mut self, value: &Value) -> JasResult<Evaluable> {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => {
                Ok(Evaluable::constant(Var::from_json(value)))
            }
            Value::String(s) => self.translate_string(s),
            Value::Array(items) => self.translate_array(items),
            Value::Object(map) => self.translate_object(map),
        }
    }

    fn translate_string(&mut self, s: &str) -> JasResult<Evaluable> {
        if let Some(parsed) = parse_variable(s)? {
            return self.translate_parsed_variable(parsed);
        }
        if let Some(lit) = parse_typed_literal(s)? {
            return Ok(Evaluable::constant(match lit {
                TypedLiteral::Int(i) => Var::Int(i),
                TypedLiteral::Double(d) => Var::Double(d),
                TypedLiteral::Str(s) => Var::string(s),
                TypedLiteral::Bool(b) => Var::Bool(b),
            }));
        }
        Ok(Evaluable::constant(Var::string(s)))
    }

    fn translate_parsed_variable(&mut self, parsed: ParsedVariable) -> JasResult<Evaluable> {
        match parsed {
            ParsedVariable::ArgCount => Ok(Evaluable::new(EvaluableKind::ContextArgumentsInfo(
                ContextArgKind::ArgCount,
            ))),
            ParsedVariable::Args => Ok(Evaluable::new(EvaluableKind::ContextArgumentsInfo(
                ContextArgKind::Args,
            ))),
            ParsedVariable::Positional(n) => {
                Ok(Evaluable::new(EvaluableKind::ContextArgument(n)))
            }
            ParsedVariable::Named { name, root, path } => {
                let var_name = if root { format!(".{name}") } else { name };
                let var_node = Evaluable::new(EvaluableKind::Variable(var_name));
                match path {
                    None => Ok(var_node),
                    Some(raw) => {
                        let mut parts = Vec::new();
                        for part in Path::new(&raw).components() {
                            parts.push(self.translate_field_path_part(part)?);
                        }
                        Ok(Evaluable::new(EvaluableKind::ObjectPropertyQuery {
                            object: Box::new(var_node),
                            path: parts,
                        }))
                    }
                }
            }
        }
    }

    /// One slash-delimited segment of a `$name[a/b/c]` field query: a
    /// numeric literal becomes a list-index constant, anything else is
    /// reconstructed and translated as its own (possibly shorthand)
    /// sub-expression, so `$name[@plus: [$1, 1]]` works.
    fn translate_field_path_part(&mut self, part: &str) -> JasResult<Evaluable> {
        if let Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) =
            serde_json::from_str::<Value>(part)
        {
            return self.translate_value(&v);
        }
        let reconstructed = reconstruct(&Value::String(part.to_string()));
        self.translate_value(&reconstructed)
    }

    fn translate_array(&mut self, items: &[Value]) -> JasResult<Evaluable> {
        let translated = items
            .iter()
            .map(|v| self.translate_value(v))
            .collect::<JasResult<Vec<_>>>()?;
        Ok(fold_list(translated))
    }

    fn translate_object(&mut self, map: &serde_json::Map<String, Value>) -> JasResult<Evaluable> {
        self.macro_scopes.push(HashMap::new());
        let result = self.translate_object_inner(map);
        self.macro_scopes.pop();
        result
    }

    fn translate_object_inner(
        &mut self,
        map: &serde_json::Map<String, Value>,
    ) -> JasResult<Evaluable> {
        let mut locals = LocalVariables::default();
        let mut remaining: IndexMap<String, &Value> = IndexMap::new();

        for (key, value) in map {
            if key == "$jas.version" {
                continue;
            }
            if let Some(rest) = key.strip_prefix('!') {
                if rest.is_empty() || !is_ident(rest) {
                    return Err(JasError::syntax(format!("invalid macro name '{key}'")));
                }
                let body = self.translate_value(value)?;
                self.macro_scopes
                    .last_mut()
                    .expect("translate_object always pushes a scope")
                    .insert(rest.to_string(), Rc::new(body));
                continue;
            }
            if let Some(rest) = key.strip_prefix('$') {
                let (update, name) = match rest.strip_prefix('+') {
                    Some(n) => (true, n),
                    None => (false, rest),
                };
                if name.is_empty() || !is_ident(name) {
                    return Err(JasError::syntax(format!("invalid local variable name '{key}'")));
                }
                let expr = self.translate_value(value)?;
                locals.0.insert(name.to_string(), LocalVarDef { update, expr });
                continue;
            }
            remaining.insert(key.clone(), value);
        }

        let scope = LocalScope { variables: locals };

        if remaining.len() == 1 {
            let (key, value) = remaining.iter().next().expect("len checked above");
            if let Some(node) = self.try_translate_specifier(key, value, &scope)? {
                return Ok(node);
            }
        }

        let mut entries = IndexMap::new();
        for (key, value) in &remaining {
            entries.insert(key.clone(), self.translate_value(value)?);
        }

        let node = if scope.is_empty() && entries.values().all(Evaluable::is_constant) {
            let dict: Dict = entries
                .into_iter()
                .map(|(k, v)| match v.kind {
                    EvaluableKind::Constant(val) => (k, val),
                    _ => unreachable!("all() just confirmed every value is Constant"),
                })
                .collect();
            Evaluable::constant(Var::dict(dict))
        } else {
            Evaluable::new(EvaluableKind::Dict(entries)).with_locals(scope.clone())
        };
        Ok(node)
    }

    /// Tries to recognise `key` as an operator, list-algorithm, or
    /// function-invocation specifier. `Ok(None)` means `key` is an ordinary
    /// (non-`@`) dict key and the caller should fall through to building a
    /// plain `Dict` node.
    fn try_translate_specifier(
        &mut self,
        key: &str,
        value: &Value,
        scope: &LocalScope,
    ) -> JasResult<Option<Evaluable>> {
        if !key.starts_with('@') {
            return Ok(None);
        }
        if let Some(op) = keywords::lookup(key) {
            let node = self.translate_operator(op, value)?;
            return Ok(Some(node.with_locals(scope.clone())));
        }
        if key == "@noeval" {
            return Ok(Some(
                Evaluable::constant(Var::from_json(value)).with_locals(scope.clone()),
            ));
        }
        let node = self.translate_function_invocation(key, value)?;
        Ok(Some(node.with_locals(scope.clone())))
    }

    fn translate_operator(&mut self, op: OperatorKeyword, value: &Value) -> JasResult<Evaluable> {
        match op {
            OperatorKeyword::Arithmetic(kind) => self.translate_arithmetic(kind, value),
            OperatorKeyword::SelfAssign(kind) => self.translate_self_assign(kind, value),
            OperatorKeyword::Logical(kind) => self.translate_logical(kind, value),
            OperatorKeyword::Comparison(kind) => self.translate_comparison(kind, value),
            OperatorKeyword::ListAlgorithm(kind) => self.translate_list_algorithm(kind, value),
        }
    }

    fn translate_params(&mut self, value: &Value) -> JasResult<Vec<Evaluable>> {
        match value {
            Value::Array(items) => items.iter().map(|v| self.translate_value(v)).collect(),
            other => Ok(vec![self.translate_value(other)?]),
        }
    }

    fn translate_arithmetic(
        &mut self,
        kind: ArithmeticOpKind,
        value: &Value,
    ) -> JasResult<Evaluable> {
        let params = self.translate_params(value)?;
        if kind.is_unary() {
            if params.len() != 1 {
                return Err(JasError::syntax(format!(
                    "operator '{kind:?}' takes exactly one operand, got {}",
                    params.len()
                )));
            }
        } else if kind.is_binary_only() {
            if params.len() != 2 {
                return Err(JasError::syntax(format!(
                    "operator '{kind:?}' takes exactly two operands, got {}",
                    params.len()
                )));
            }
        } else if params.len() < 2 {
            return Err(JasError::syntax(format!(
                "operator '{kind:?}' needs at least two operands, got {}",
                params.len()
            )));
        }
        Ok(Evaluable::new(EvaluableKind::ArithmeticOp { kind, params }))
    }

    fn translate_self_assign(
        &mut self,
        kind: ArithmeticSelfAssignOpKind,
        value: &Value,
    ) -> JasResult<Evaluable> {
        let mut params = self.translate_params(value)?;
        if params.len() != 2 {
            return Err(JasError::syntax(format!(
                "self-assign operator takes exactly two operands (target, value), got {}",
                params.len()
            )));
        }
        let target = params.remove(0);
        let rhs = params.remove(0);
        if !matches!(target.kind, EvaluableKind::Variable(_)) {
            return Err(JasError::syntax(
                "self-assign operator's first operand must be a variable",
            ));
        }
        Ok(Evaluable::new(EvaluableKind::ArithmeticSelfAssignOp {
            kind,
            target: Box::new(target),
            value: Box::new(rhs),
        }))
    }

    fn translate_logical(&mut self, kind: LogicalOpKind, value: &Value) -> JasResult<Evaluable> {
        let params = self.translate_params(value)?;
        if kind == LogicalOpKind::Not {
            if params.len() != 1 {
                return Err(JasError::syntax(format!(
                    "'!' takes exactly one operand, got {}",
                    params.len()
                )));
            }
        } else if params.len() < 2 {
            return Err(JasError::syntax(format!(
                "logical operator needs at least two operands, got {}",
                params.len()
            )));
        }
        Ok(Evaluable::new(EvaluableKind::LogicalOp { kind, params }))
    }

    fn translate_comparison(
        &mut self,
        kind: ComparisonOpKind,
        value: &Value,
    ) -> JasResult<Evaluable> {
        let mut params = self.translate_params(value)?;
        if params.len() != 2 {
            return Err(JasError::syntax(format!(
                "comparison operator takes exactly two operands, got {}",
                params.len()
            )));
        }
        let rhs = params.remove(1);
        let lhs = params.remove(0);
        Ok(Evaluable::new(EvaluableKind::ComparisonOp {
            kind,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }))
    }

    fn translate_list_algorithm(
        &mut self,
        kind: ListAlgorithmKind,
        value: &Value,
    ) -> JasResult<Evaluable> {
        let (cond_value, list_value): (Value, Option<Value>) = match value {
            Value::Object(map)
                if map.contains_key("@cond")
                    || map.contains_key("@op")
                    || map.contains_key("@list") =>
            {
                let cond = map
                    .get("@cond")
                    .or_else(|| map.get("@op"))
                    .ok_or_else(|| {
                        JasError::syntax("list algorithm requires a '@cond' or '@op' predicate")
                    })?;
                (cond.clone(), map.get("@list").cloned())
            }
            other => (other.clone(), None),
        };
        let cond = self.translate_value(&cond_value)?;
        let list = match list_value {
            Some(v) => self.translate_value(&v)?,
            None => self.implicit_field_call(),
        };
        Ok(Evaluable::new(EvaluableKind::ListAlgorithm {
            kind,
            list: Box::new(list),
            cond: Box::new(cond),
        }))
    }

    /// The implicit list source when a list-algorithm omits `@list`: a call
    /// to the active context's `field()`.
    fn implicit_field_call(&self) -> Evaluable {
        Evaluable::new(EvaluableKind::FunctionInvocation(
            FunctionInvocation::Context {
                name: "field".to_string(),
                param: None,
            },
        ))
    }

    fn translate_optional_param(&mut self, value: &Value) -> JasResult<Option<Evaluable>> {
        if matches!(value, Value::Null) {
            return Ok(None);
        }
        Ok(Some(self.translate_value(value)?))
    }

    /// Resolution order for a bare `@name`: context-function, then
    /// evaluator-reserved, then module dispatch ((empty, name) first, then
    /// exactly one other claimant), then a lexically-enclosing macro.
    fn translate_function_invocation(&mut self, key: &str, value: &Value) -> JasResult<Evaluable> {
        let spec = &key[1..];
        let param = self.translate_optional_param(value)?;

        if let Some((module, func)) = spec.split_once('.') {
            if self.modules.find_qualified(module, func).is_some() {
                return Ok(Evaluable::new(EvaluableKind::FunctionInvocation(
                    FunctionInvocation::Module {
                        module: module.to_string(),
                        name: func.to_string(),
                        param: param.map(Box::new),
                    },
                )));
            }
            return Err(JasError::syntax(format!(
                "no module '{module}' exposes function '{func}'"
            )));
        }

        let name = spec;
        if self.context_functions.contains(&name) {
            return Ok(Evaluable::new(EvaluableKind::FunctionInvocation(
                FunctionInvocation::Context {
                    name: name.to_string(),
                    param: param.map(Box::new),
                },
            )));
        }
        if name == "return" {
            return Ok(Evaluable::new(EvaluableKind::FunctionInvocation(
                FunctionInvocation::Evaluator {
                    name: name.to_string(),
                    param: param.map(Box::new),
                },
            )));
        }
        if let Some(module) = self.modules.find_bare(name)? {
            return Ok(Evaluable::new(EvaluableKind::FunctionInvocation(
                FunctionInvocation::Module {
                    module: module.module_name().to_string(),
                    name: name.to_string(),
                    param: param.map(Box::new),
                },
            )));
        }
        if let Some(body) = self.lookup_macro(name) {
            return Ok(Evaluable::new(EvaluableKind::FunctionInvocation(
                FunctionInvocation::Macro {
                    name: name.to_string(),
                    body,
                    param: param.map(Box::new),
                },
            )));
        }
        Err(JasError::syntax(format!(
            "unresolved function or macro '@{name}'"
        )))
    }

    fn lookup_macro(&self, name: &str) -> Option<Rc<Evaluable>> {
        for scope in self.macro_scopes.iter().rev() {
            if let Some(body) = scope.get(name) {
                return Some(body.clone());
            }
        }
        None
    }
}

/// Arrays fold to `Constant(Var::list(...))` when every element is
/// constant, matching the rule applied to ordinary `Dict`s.
fn fold_list(items: Vec<Evaluable>) -> Evaluable {
    if items.iter().all(Evaluable::is_constant) {
        let values = items
            .into_iter()
            .map(|e| match e.kind {
                EvaluableKind::Constant(v) => v,
                _ => unreachable!("all() just confirmed every item is Constant"),
            })
            .collect();
        Evaluable::constant(Var::list(values))
    } else {
        Evaluable::new(EvaluableKind::List(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator(modules: &ModuleManager) -> Translator<'_> {
        Translator::new(modules, &[], "1.0.0")
    }

    #[test]
    fn folds_constant_arrays_and_objects() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"a": 1, "b": [1, 2, 3]});
        let node = t.translate(&json, ParseMode::Formal).unwrap();
        assert!(node.is_constant());
    }

    #[test]
    fn recognises_arithmetic_operator() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"@plus": [1, 2, 3]});
        let node = t.translate(&json, ParseMode::Formal).unwrap();
        assert!(matches!(
            node.kind,
            EvaluableKind::ArithmeticOp {
                kind: ArithmeticOpKind::Add,
                ..
            }
        ));
    }

    #[test]
    fn rejects_wrong_arity_unary_operator() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"@neg": [1, 2]});
        assert!(t.translate(&json, ParseMode::Formal).is_err());
    }

    #[test]
    fn local_variable_and_reference_translate() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"$x": 1, "@plus": ["$x", 2]});
        let node = t.translate(&json, ParseMode::Formal).unwrap();
        assert!(!node.locals.is_empty());
        assert!(matches!(node.kind, EvaluableKind::ArithmeticOp { .. }));
    }

    #[test]
    fn macro_declared_then_called_resolves() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"!double": {"@plus": ["$1", "$1"]}, "@double": 5});
        let node = t.translate(&json, ParseMode::Formal).unwrap();
        match node.kind {
            EvaluableKind::FunctionInvocation(FunctionInvocation::Macro { name, .. }) => {
                assert_eq!(name, "double");
            }
            other => panic!("expected MacroFI, got {other:?}"),
        }
    }

    #[test]
    fn macro_sibling_forward_reference_is_unresolved() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"@double": 5, "!double": {"@plus": ["$1", "$1"]}});
        assert!(t.translate(&json, ParseMode::Formal).is_err());
    }

    #[test]
    fn unresolved_function_is_a_syntax_error() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"@nope": 1});
        assert!(t.translate(&json, ParseMode::Formal).is_err());
    }

    #[test]
    fn noeval_returns_value_untranslated() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"@noeval": {"@plus": [1, 2]}});
        let node = t.translate(&json, ParseMode::Formal).unwrap();
        match node.kind {
            EvaluableKind::Constant(v) => {
                assert!(v.is_dict());
            }
            other => panic!("expected Constant, got {other:?}"),
        }
    }

    #[test]
    fn list_algorithm_with_explicit_list() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"@any_of": {"@cond": {"@eq": ["$1", 3]}, "@list": [1,2,3,4]}});
        let node = t.translate(&json, ParseMode::Formal).unwrap();
        assert!(matches!(
            node.kind,
            EvaluableKind::ListAlgorithm {
                kind: ListAlgorithmKind::AnyOf,
                ..
            }
        ));
    }

    #[test]
    fn list_algorithm_defaults_to_field_call() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"@all_of": {"@gt": ["$1", 0]}});
        let node = t.translate(&json, ParseMode::Formal).unwrap();
        match node.kind {
            EvaluableKind::ListAlgorithm { list, .. } => {
                assert!(matches!(
                    list.kind,
                    EvaluableKind::FunctionInvocation(FunctionInvocation::Context { .. })
                ));
            }
            other => panic!("expected ListAlgorithm, got {other:?}"),
        }
    }

    #[test]
    fn variable_field_query_translates_bracket_path() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!("$x[a/0]");
        let node = t.translate(&json, ParseMode::Formal).unwrap();
        match node.kind {
            EvaluableKind::ObjectPropertyQuery { path, .. } => {
                assert_eq!(path.len(), 2);
            }
            other => panic!("expected ObjectPropertyQuery, got {other:?}"),
        }
    }

    #[test]
    fn shorthand_mode_reconstructs_colon_chains() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!("@plus: [1, 2]");
        let node = t.translate(&json, ParseMode::Shorthand).unwrap();
        assert!(matches!(
            node.kind,
            EvaluableKind::ArithmeticOp {
                kind: ArithmeticOpKind::Add,
                ..
            }
        ));
    }

    #[test]
    fn version_gate_rejects_newer_requested_version() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"$jas.version": "99.0.0", "a": 1});
        assert!(t.translate(&json, ParseMode::Formal).is_err());
    }

    #[test]
    fn version_gate_accepts_older_or_equal_requested_version() {
        let modules = jas_modules::default_module_manager();
        let mut t = translator(&modules);
        let json = serde_json::json!({"$jas.version": "1.0.0", "a": 1});
        assert!(t.translate(&json, ParseMode::Formal).is_ok());
    }
}
