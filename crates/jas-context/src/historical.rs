//! `HistoricalEvalContext`: an `EvalContext` that compares a *current* and a
//! *last* JSON snapshot and persists evaluated variables across runs. This is
//! the engine's primary non-trivial `EvalContext` and defines its notion of
//! "change detection".

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use jas_ast::Eval;
use jas_error::{JasError, JasResult};
use jas_var::{Dict, Var};

use crate::context::EvalContext;

const CURRENT_FIELD: &str = "current_field__";
const LAST_FIELD: &str = "last_field__";

/// The snapshot pair a context answers historical queries against, plus a
/// link to the nearest ancestor that actually owns data -- used only for the
/// "no data here, ask upward" delegation rule in §4.5. Cheap to clone: `Var`
/// clones are O(1) (interior `Rc`-shared storage).
#[derive(Debug, Clone)]
struct SnapshotChain {
    new_snapshot: Var,
    old_snapshot: Var,
    has_data: bool,
    parent: Option<Box<SnapshotChain>>,
}

impl SnapshotChain {
    /// Walk up until a chain link with real data is found; `None` at the
    /// root with no data anywhere.
    fn effective(&self) -> Option<(&Var, &Var)> {
        let mut cur = self;
        loop {
            if cur.has_data {
                return Some((&cur.new_snapshot, &cur.old_snapshot));
            }
            match &cur.parent {
                Some(p) => cur = p,
                None => return None,
            }
        }
    }
}

/// A JSON object shaped like `{"current_field__": ..., "last_field__": ...}`
/// -- the one nested-data shape `make_child` treats specially.
fn as_historical_shape(v: &Var) -> Option<(Var, Var)> {
    v.with_dict(|d: &Dict| {
        if d.len() == 2 && d.contains_key(CURRENT_FIELD) && d.contains_key(LAST_FIELD) {
            Some((d[CURRENT_FIELD].clone(), d[LAST_FIELD].clone()))
        } else {
            None
        }
    })
    .ok()
    .flatten()
}

#[derive(Debug)]
pub struct HistoricalEvalContext {
    chain: SnapshotChain,
    args: Vec<Var>,
    vars: RefCell<HashMap<String, Var>>,
    /// The persisted qualified-name -> last-value map, shared (same `Rc`) by
    /// every context descended from the same root so a save/load at the top
    /// observes every frame's recorded values.
    results: Rc<RefCell<IndexMap<String, Var>>>,
}

impl HistoricalEvalContext {
    pub fn new(new_snapshot: Var, old_snapshot: Var) -> Self {
        HistoricalEvalContext {
            chain: SnapshotChain {
                new_snapshot,
                old_snapshot,
                has_data: true,
                parent: None,
            },
            args: Vec::new(),
            vars: RefCell::new(HashMap::new()),
            results: Rc::new(RefCell::new(IndexMap::new())),
        }
    }

    pub fn from_json(new_snapshot: serde_json::Value, old_snapshot: serde_json::Value) -> Self {
        Self::new(Var::from_json(&new_snapshot), Var::from_json(&old_snapshot))
    }

    fn snapshot_for(&self, which: &str) -> JasResult<Var> {
        match self.chain.effective() {
            None => Ok(Var::Null),
            Some((new, old)) => match which {
                "" | "cur" => Ok(new.clone()),
                "last" => Ok(old.clone()),
                other => Err(JasError::syntax(format!(
                    "unknown historical snapshot selector '{other}'"
                ))),
            },
        }
    }

    fn param_path_and_snapshot(param: Option<Var>) -> JasResult<(String, String)> {
        match param {
            None => Ok((String::new(), String::new())),
            Some(v) if v.is_string() => Ok((v.to_owned_string()?, String::new())),
            Some(v) if v.is_dict() => {
                let path = v
                    .get_path("path")
                    .to_owned_string()
                    .unwrap_or_default();
                let snapshot = v
                    .get_path("snapshot")
                    .to_owned_string()
                    .unwrap_or_default();
                Ok((path, snapshot))
            }
            Some(other) => Err(JasError::syntax(format!(
                "'field' expects a path string or {{path, snapshot}} object, got {}",
                other.dump()
            ))),
        }
    }

    fn field_impl(&self, param: Option<Var>) -> JasResult<Var> {
        let (path, snapshot) = Self::param_path_and_snapshot(param)?;
        let base = self.snapshot_for(&snapshot)?;
        Ok(if path.is_empty() {
            base
        } else {
            base.get_path(&path)
        })
    }

    fn snchg_impl(&self, param: Option<Var>) -> JasResult<Var> {
        let path = match param {
            None => String::new(),
            Some(v) => v.to_owned_string()?,
        };
        let (new, old) = self.chain.effective().unwrap_or((&Var::Null, &Var::Null));
        let (new, old) = if path.is_empty() {
            (new.clone(), old.clone())
        } else {
            (new.get_path(&path), old.get_path(&path))
        };
        Ok(Var::Bool(new.op_ne(&old)))
    }

    fn evchg_impl(
        &self,
        param: Option<Var>,
        eval: &mut dyn Eval,
    ) -> JasResult<Var> {
        let name = match param {
            Some(v) => v.to_owned_string()?,
            None => String::new(),
        };
        if name.is_empty() {
            return Err(JasError::syntax("'evchg' requires a non-empty variable name"));
        }
        let current = eval.resolve_variable(&name)?;
        let qualified = eval.qualified_path(&name);
        let changed = match self.results.borrow().get(&qualified) {
            Some(previous) => previous.op_ne(&current),
            None => false,
        };
        Ok(Var::Bool(changed))
    }

    fn last_eval_impl(&self, param: Option<Var>) -> JasResult<Var> {
        let name = match param {
            Some(v) => v.to_owned_string()?,
            None => return Err(JasError::syntax("'last_eval' requires a variable name")),
        };
        // `last_eval` is resolved against the qualified path as it would be
        // formed for a sibling variable in the *current* context, i.e. with
        // no evaluator available here we fall back to a bare-name lookup
        // among any recorded path ending in `/name` (or exactly `name`).
        let suffix = format!("/{name}");
        let results = self.results.borrow();
        if let Some(v) = results.get(&name) {
            return Ok(v.clone());
        }
        Ok(results
            .iter()
            .rev()
            .find(|(k, _)| k.ends_with(&suffix))
            .map(|(_, v)| v.clone())
            .unwrap_or(Var::Null))
    }

    fn hfield_impl(&self, path: &str, id: Option<&str>) -> JasResult<Var> {
        let (new, old) = self.chain.effective().unwrap_or((&Var::Null, &Var::Null));
        let new_v = if path.is_empty() { new.clone() } else { new.get_path(path) };
        let old_v = if path.is_empty() { old.clone() } else { old.get_path(path) };

        let pair = |cur: Var, last: Var| -> Var {
            let mut d = Dict::new();
            d.insert(CURRENT_FIELD.to_string(), cur);
            d.insert(LAST_FIELD.to_string(), last);
            Var::dict(d)
        };

        if new_v.is_list() || old_v.is_list() {
            let new_items = new_v.with_list(|l| l.clone()).unwrap_or_default();
            let old_items = old_v.with_list(|l| l.clone()).unwrap_or_default();
            let paired = if let Some(id_field) = id {
                let mut used_old = vec![false; old_items.len()];
                let mut out = Vec::new();
                for item in &new_items {
                    let key = item.get_path(id_field);
                    let mut matched = None;
                    for (i, old_item) in old_items.iter().enumerate() {
                        if used_old[i] {
                            continue;
                        }
                        if old_item.get_path(id_field).op_eq(&key) {
                            matched = Some(i);
                            break;
                        }
                    }
                    match matched {
                        Some(i) => {
                            used_old[i] = true;
                            out.push(pair(item.clone(), old_items[i].clone()));
                        }
                        None => out.push(pair(item.clone(), Var::Null)),
                    }
                }
                for (i, old_item) in old_items.iter().enumerate() {
                    if !used_old[i] {
                        out.push(pair(Var::Null, old_item.clone()));
                    }
                }
                out
            } else {
                let len = new_items.len().max(old_items.len());
                let mut out = Vec::with_capacity(len);
                for i in 0..len {
                    let cur = new_items.get(i).cloned().unwrap_or(Var::Null);
                    let last = old_items.get(i).cloned().unwrap_or(Var::Null);
                    out.push(pair(cur, last));
                }
                out
            };
            Ok(Var::list(paired))
        } else {
            Ok(pair(new_v, old_v))
        }
    }
}

impl EvalContext for HistoricalEvalContext {
    fn get_variable(&self, name: &str) -> Option<Var> {
        self.vars.borrow().get(name).cloned()
    }

    fn set_variable(&mut self, name: &str, value: Var) {
        self.vars.borrow_mut().insert(name.to_string(), value);
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

    fn invoke(&mut self, name: &str, param: Option<Var>, eval: &mut dyn Eval) -> JasResult<Var> {
        match name {
            "field" | "field_cv" => self.field_impl(param),
            "field_lv" => {
                let path = match param {
                    None => String::new(),
                    Some(v) => v.to_owned_string().or_else(|_| {
                        v.get_path("path").to_owned_string().or(Ok(String::new()))
                    })?,
                };
                let mut d = Dict::new();
                d.insert("path".into(), Var::string(path));
                d.insert("snapshot".into(), Var::string("last"));
                self.field_impl(Some(Var::dict(d)))
            }
            "snchg" => self.snchg_impl(param),
            "evchg" => self.evchg_impl(param, eval),
            "last_eval" => self.last_eval_impl(param),
            "hfield" => {
                let (path, id) = match &param {
                    Some(v) if v.is_string() => (v.to_owned_string()?, None),
                    Some(v) if v.is_dict() => {
                        let path = v.get_path("path").to_owned_string().unwrap_or_default();
                        let id = v.get_path("id");
                        (path, if id.is_null() { None } else { Some(id.to_owned_string()?) })
                    }
                    Some(other) => {
                        return Err(JasError::invalid_argument(format!(
                            "'hfield' expects a path or {{path, id}}, got {}",
                            other.dump()
                        )))
                    }
                    None => (String::new(), None),
                };
                self.hfield_impl(&path, id.as_deref())
            }
            "hfield2arr" => {
                let items = param
                    .ok_or_else(|| JasError::invalid_argument("'hfield2arr' requires [path, id]"))?
                    .with_list(|l| l.clone())?;
                let path = items
                    .first()
                    .map(|v| v.to_owned_string())
                    .transpose()?
                    .unwrap_or_default();
                let id = items.get(1).map(|v| v.to_owned_string()).transpose()?;
                self.hfield_impl(&path, id.as_deref())
            }
            _ => Err(JasError::function_not_found(format!(
                "no context function named '{name}'"
            ))),
        }
    }

    fn make_child(&self, args: Vec<Var>, input: Option<Var>) -> Box<dyn EvalContext> {
        let chain = match &input {
            Some(v) => match as_historical_shape(v) {
                Some((new, old)) => SnapshotChain {
                    new_snapshot: new,
                    old_snapshot: old,
                    has_data: true,
                    parent: Some(Box::new(self.chain.clone())),
                },
                None => SnapshotChain {
                    new_snapshot: v.clone(),
                    old_snapshot: Var::Null,
                    has_data: true,
                    parent: Some(Box::new(self.chain.clone())),
                },
            },
            None => SnapshotChain {
                new_snapshot: Var::Null,
                old_snapshot: Var::Null,
                has_data: false,
                parent: Some(Box::new(self.chain.clone())),
            },
        };
        Box::new(HistoricalEvalContext {
            chain,
            args,
            vars: RefCell::new(HashMap::new()),
            results: Rc::clone(&self.results),
        })
    }

    fn debug_info(&self) -> String {
        format!("historical(has_data={})", self.chain.has_data)
    }

    fn remember(&mut self, qualified_path: &str, value: &Var) {
        self.results
            .borrow_mut()
            .insert(qualified_path.to_string(), value.clone());
    }
}

impl HistoricalEvalContext {
    pub fn save_evaluation_result(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .results
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }

    pub fn load_evaluation_result(&self, data: serde_json::Value) {
        let mut map = self.results.borrow_mut();
        map.clear();
        if let serde_json::Value::Object(obj) = data {
            for (k, v) in obj {
                map.insert(k, Var::from_json(&v));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(new: serde_json::Value, old: serde_json::Value) -> HistoricalEvalContext {
        HistoricalEvalContext::from_json(new, old)
    }

    #[test]
    fn snchg_true_iff_values_differ() {
        let c = ctx(serde_json::json!({"a": 2}), serde_json::json!({"a": 1}));
        assert_eq!(
            c.snchg_impl(Some(Var::string("a"))).unwrap().as_bool().unwrap(),
            true
        );
        let same = ctx(serde_json::json!({"a": 1}), serde_json::json!({"a": 1}));
        assert_eq!(
            same.snchg_impl(Some(Var::string("a"))).unwrap().as_bool().unwrap(),
            false
        );
    }

    #[test]
    fn hfield_pairs_equal_snapshots_identically() {
        let c = ctx(serde_json::json!({"a": 1}), serde_json::json!({"a": 1}));
        let pair = c.hfield_impl("a", None).unwrap();
        assert!(pair
            .get_path(CURRENT_FIELD)
            .op_eq(&pair.get_path(LAST_FIELD)));
    }

    #[test]
    fn hfield_aligns_lists_by_position_with_padding() {
        let c = ctx(
            serde_json::json!({"items": [1, 2, 3]}),
            serde_json::json!({"items": [1, 2]}),
        );
        let aligned = c.hfield_impl("items", None).unwrap();
        assert_eq!(aligned.list_len().unwrap(), 3);
        let third = aligned.with_list(|l| l[2].clone()).unwrap();
        assert!(third.get_path(LAST_FIELD).is_null());
    }

    #[test]
    fn save_then_load_round_trips_last_eval() {
        let mut c = ctx(serde_json::json!({}), serde_json::json!({}));
        c.remember("count", &Var::Int(3));
        let dumped = c.save_evaluation_result();
        let fresh = ctx(serde_json::json!({}), serde_json::json!({}));
        fresh.load_evaluation_result(dumped);
        assert_eq!(
            fresh.last_eval_impl(Some(Var::string("count"))).unwrap().as_i64().unwrap(),
            3
        );
    }

    #[test]
    fn no_data_context_delegates_snchg_to_parent() {
        let root = ctx(serde_json::json!({"a": 2}), serde_json::json!({"a": 1}));
        let mut child = root.make_child(vec![], None);
        // `child` has no data of its own; it must still answer via `root`.
        let mut dummy = crate::tests_support::NoopEval;
        let changed = child
            .invoke("snchg", Some(Var::string("a")), &mut dummy)
            .unwrap();
        assert_eq!(changed.as_bool().unwrap(), true);
    }
}

#[cfg(test)]
mod tests_support {
    use jas_ast::{Eval, Evaluable};
    use jas_error::{JasError, JasResult};
    use jas_var::Var;

    pub struct NoopEval;
    impl Eval for NoopEval {
        fn eval(&mut self, _node: &Evaluable) -> JasResult<Var> {
            Err(JasError::evaluation("not supported in this test"))
        }
        fn eval_with_args(&mut self, _node: &Evaluable, _args: Vec<Var>) -> JasResult<Var> {
            Err(JasError::evaluation("not supported in this test"))
        }
        fn resolve_variable(&mut self, _name: &str) -> JasResult<Var> {
            Err(JasError::evaluation("not supported in this test"))
        }
        fn qualified_path(&self, name: &str) -> String {
            name.to_string()
        }
    }
}
