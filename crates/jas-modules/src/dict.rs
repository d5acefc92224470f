//! The `dict` module: value-in/value-out dict helpers, mirroring `list`'s
//! calling convention (first argument is the dict, a fresh or
//! cheaply-in-place-edited `Var::Dict` comes back out).

use jas_ast::{Eval, Evaluable};
use jas_error::{JasError, JasResult};
use jas_var::Var;

use crate::manager::{param_items, FunctionModule};

const NAMES: &[&str] = &[
    "update", "erase", "clear", "keys", "values", "get", "get_path", "exists", "contains", "size",
    "is_empty",
];

fn args(param: Option<&Evaluable>, evaluator: &mut dyn Eval) -> JasResult<Vec<Var>> {
    param_items(param).iter().map(|e| evaluator.eval(e)).collect()
}

pub struct DictModule;

impl FunctionModule for DictModule {
    fn module_name(&self) -> &str {
        "dict"
    }

    fn has(&self, name: &str) -> bool {
        NAMES.contains(&name)
    }

    fn enumerate(&self, out: &mut Vec<String>) {
        out.extend(NAMES.iter().map(|s| format!("dict.{s}")));
    }

    fn eval(&self, name: &str, param: Option<&Evaluable>, evaluator: &mut dyn Eval) -> JasResult<Var> {
        let mut a = args(param, evaluator)?;
        if a.is_empty() {
            return Err(JasError::invalid_argument(format!("'dict.{name}' requires a dict argument")));
        }
        let mut dict = a.remove(0);
        if !dict.is_dict() {
            return Err(JasError::invalid_argument(format!(
                "'dict.{name}' requires a dict, got {}",
                dict.dump()
            )));
        }
        match name {
            "update" => {
                let other = a.into_iter().next().ok_or_else(|| {
                    JasError::invalid_argument("'dict.update' requires a dict")
                })?;
                let entries = other.with_dict(|d| d.clone())?;
                dict.with_dict_mut(|d| {
                    for (k, v) in entries {
                        d.insert(k, v);
                    }
                })?;
                Ok(dict)
            }
            "erase" => {
                let key = a.into_iter().next().ok_or_else(|| {
                    JasError::invalid_argument("'dict.erase' requires a key")
                })?.to_owned_string()?;
                dict.with_dict_mut(|d| {
                    d.shift_remove(&key);
                })?;
                Ok(dict)
            }
            "clear" => {
                dict.with_dict_mut(|d| d.clear())?;
                Ok(dict)
            }
            "keys" => Ok(Var::list(
                dict.with_dict(|d| d.keys().map(|k| Var::string(k.clone())).collect())?,
            )),
            "values" => Ok(Var::list(dict.with_dict(|d| d.values().cloned().collect())?)),
            "get" => {
                let key = a
                    .first()
                    .ok_or_else(|| JasError::invalid_argument("'dict.get' requires a key"))?
                    .to_owned_string()?;
                let default = a.get(1).cloned().unwrap_or(Var::Null);
                Ok(dict.with_dict(|d| d.get(&key).cloned())?.unwrap_or(default))
            }
            "get_path" => {
                let path = a
                    .first()
                    .ok_or_else(|| JasError::invalid_argument("'dict.get_path' requires a path"))?
                    .to_owned_string()?;
                let default = a.get(1).cloned();
                let found = dict.get_path(&path);
                Ok(if found.is_null() {
                    default.unwrap_or(Var::Null)
                } else {
                    found
                })
            }
            "exists" => {
                let key = a
                    .first()
                    .ok_or_else(|| JasError::invalid_argument("'dict.exists' requires a key"))?
                    .to_owned_string()?;
                Ok(Var::Bool(dict.with_dict(|d| d.contains_key(&key))?))
            }
            "contains" => {
                let value = a
                    .into_iter()
                    .next()
                    .ok_or_else(|| JasError::invalid_argument("'dict.contains' requires a value"))?;
                Ok(Var::Bool(
                    dict.with_dict(|d| d.values().any(|v| v.op_eq(&value)))?,
                ))
            }
            "size" => Ok(Var::Int(dict.with_dict(|d| d.len())? as i64)),
            "is_empty" => Ok(Var::Bool(dict.with_dict(|d| d.is_empty())?)),
            other => Err(JasError::function_not_found(format!("dict has no function '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jas_ast::EvaluableKind;
    use jas_var::Dict;

    struct EchoEval;
    impl Eval for EchoEval {
        fn eval(&mut self, node: &Evaluable) -> JasResult<Var> {
            match &node.kind {
                EvaluableKind::Constant(v) => Ok(v.clone()),
                _ => Err(JasError::evaluation("unsupported")),
            }
        }
        fn eval_with_args(&mut self, node: &Evaluable, _args: Vec<Var>) -> JasResult<Var> {
            self.eval(node)
        }
        fn resolve_variable(&mut self, _name: &str) -> JasResult<Var> {
            Err(JasError::evaluation("unsupported"))
        }
        fn qualified_path(&self, name: &str) -> String {
            name.to_string()
        }
    }

    fn sample() -> Var {
        let mut d = Dict::new();
        d.insert("a".into(), Var::Int(1));
        d.insert("b".into(), Var::Int(2));
        Var::dict(d)
    }

    #[test]
    fn get_falls_back_to_default() {
        let m = DictModule;
        let mut e = EchoEval;
        let param = Evaluable::new(EvaluableKind::List(vec![
            Evaluable::constant(sample()),
            Evaluable::constant(Var::string("missing")),
            Evaluable::constant(Var::Int(-1)),
        ]));
        let v = m.eval("get", Some(&param), &mut e).unwrap();
        assert_eq!(v.as_i64().unwrap(), -1);
    }

    #[test]
    fn exists_and_keys() {
        let m = DictModule;
        let mut e = EchoEval;
        let param = Evaluable::new(EvaluableKind::List(vec![
            Evaluable::constant(sample()),
            Evaluable::constant(Var::string("a")),
        ]));
        let v = m.eval("exists", Some(&param), &mut e).unwrap();
        assert!(v.as_bool().unwrap());
        let keys = m
            .eval("keys", Some(&Evaluable::constant(sample())), &mut e)
            .unwrap();
        assert_eq!(keys.list_len().unwrap(), 2);
    }
}
