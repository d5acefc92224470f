//! The `list` module: value-in/value-out list helpers. Each function takes
//! the list as its first argument and returns a (possibly mutated-in-place)
//! `Var::List` or derived scalar -- it never reaches back into a variable
//! binding, so `detach_if_shared()` (triggered by `with_list_mut`) exists
//! purely to make repeated in-place edits on an unshared list cheap, not to
//! implement caller-visible mutation through aliasing.

use jas_ast::{Eval, Evaluable};
use jas_error::{JasError, JasResult};
use jas_var::Var;

use crate::manager::{param_items, FunctionModule};

const NAMES: &[&str] = &[
    "append", "extend", "remove", "insert", "sort", "count", "unique", "len", "pop",
];

fn args(param: Option<&Evaluable>, evaluator: &mut dyn Eval) -> JasResult<Vec<Var>> {
    param_items(param).iter().map(|e| evaluator.eval(e)).collect()
}

pub struct ListModule;

impl FunctionModule for ListModule {
    fn module_name(&self) -> &str {
        "list"
    }

    fn has(&self, name: &str) -> bool {
        NAMES.contains(&name)
    }

    fn enumerate(&self, out: &mut Vec<String>) {
        out.extend(NAMES.iter().map(|s| format!("list.{s}")));
    }

    fn eval(&self, name: &str, param: Option<&Evaluable>, evaluator: &mut dyn Eval) -> JasResult<Var> {
        let mut a = args(param, evaluator)?;
        if a.is_empty() {
            return Err(JasError::invalid_argument(format!("'list.{name}' requires a list argument")));
        }
        let mut list = a.remove(0);
        if !list.is_list() {
            return Err(JasError::invalid_argument(format!(
                "'list.{name}' requires a list, got {}",
                list.dump()
            )));
        }
        match name {
            "append" => {
                let value = a.into_iter().next().ok_or_else(|| {
                    JasError::invalid_argument("'list.append' requires a value")
                })?;
                list.with_list_mut(|l| l.push(value))?;
                Ok(list)
            }
            "extend" => {
                let other = a.into_iter().next().ok_or_else(|| {
                    JasError::invalid_argument("'list.extend' requires a list")
                })?;
                let items = other.with_list(|l| l.clone())?;
                list.with_list_mut(|l| l.extend(items))?;
                Ok(list)
            }
            "remove" => {
                let value = a.into_iter().next().ok_or_else(|| {
                    JasError::invalid_argument("'list.remove' requires a value")
                })?;
                list.with_list_mut(|l| {
                    if let Some(pos) = l.iter().position(|x| x.op_eq(&value)) {
                        l.remove(pos);
                    }
                })?;
                Ok(list)
            }
            "insert" => {
                if a.len() != 2 {
                    return Err(JasError::invalid_argument("'list.insert' requires [list, index, value]"));
                }
                let index = a[0].as_usize()?;
                let value = a[1].clone();
                let len = list.list_len()?;
                if index > len {
                    return Err(JasError::out_of_range(format!(
                        "insert index {index} out of range for a list of length {len}"
                    )));
                }
                list.with_list_mut(|l| l.insert(index, value))?;
                Ok(list)
            }
            "sort" => {
                let mut items = list.with_list(|l| l.clone())?;
                let mut err = None;
                items.sort_by(|x, y| match x.op_lt(y) {
                    Ok(true) => std::cmp::Ordering::Less,
                    Ok(false) => std::cmp::Ordering::Greater,
                    Err(e) => {
                        err.get_or_insert(e);
                        std::cmp::Ordering::Equal
                    }
                });
                if let Some(e) = err {
                    return Err(e);
                }
                Ok(Var::list(items))
            }
            "count" => {
                let value = a.into_iter().next().ok_or_else(|| {
                    JasError::invalid_argument("'list.count' requires a value")
                })?;
                let n = list.with_list(|l| l.iter().filter(|x| x.op_eq(&value)).count())?;
                Ok(Var::Int(n as i64))
            }
            "unique" => {
                let items = list.with_list(|l| l.clone())?;
                let mut out: Vec<Var> = Vec::new();
                for item in items {
                    if !out.iter().any(|x| x.op_eq(&item)) {
                        out.push(item);
                    }
                }
                Ok(Var::list(out))
            }
            "len" => Ok(Var::Int(list.list_len()? as i64)),
            "pop" => {
                let len = list.list_len()?;
                if len == 0 {
                    return Err(JasError::out_of_range("'list.pop' on an empty list"));
                }
                list.with_list_mut(|l| {
                    l.pop();
                })?;
                Ok(list)
            }
            other => Err(JasError::function_not_found(format!("list has no function '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jas_ast::EvaluableKind;

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

    fn list_expr(items: Vec<Var>) -> Evaluable {
        Evaluable::constant(Var::list(items))
    }

    #[test]
    fn append_extends_a_fresh_list() {
        let m = ListModule;
        let mut e = EchoEval;
        let param = Evaluable::constant(Var::list(vec![
            Var::list(vec![Var::Int(1), Var::Int(2)]),
            Var::Int(3),
        ]));
        let result = m.eval("append", Some(&param), &mut e).unwrap();
        assert_eq!(result.with_list(|l| l.len()).unwrap(), 3);
    }

    #[test]
    fn sort_orders_numbers() {
        let m = ListModule;
        let mut e = EchoEval;
        let param = Evaluable::new(jas_ast::EvaluableKind::List(vec![list_expr(vec![
            Var::Int(3),
            Var::Int(1),
            Var::Int(2),
        ])]));
        let sorted = m.eval("sort", Some(&param), &mut e).unwrap();
        let items: Vec<i64> = sorted
            .with_list(|l| l.iter().map(|v| v.as_i64().unwrap()).collect())
            .unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn insert_out_of_range_is_rejected() {
        let m = ListModule;
        let mut e = EchoEval;
        let param = Evaluable::new(jas_ast::EvaluableKind::List(vec![
            Evaluable::constant(Var::list(vec![Var::Int(1)])),
            Evaluable::constant(Var::Int(5)),
            Evaluable::constant(Var::Int(9)),
        ]));
        assert!(m.eval("insert", Some(&param), &mut e).is_err());
    }
}
