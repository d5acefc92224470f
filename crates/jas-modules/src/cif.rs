//! The "no module" (`cif`) function set: free functions callable as a bare
//! `@name`, registered under the empty module name per the `(empty, func)`
//! lookup rule.

use chrono::{DateTime, Local, TimeZone};

use jas_ast::{Eval, Evaluable};
use jas_error::{JasError, JasResult};
use jas_var::Var;

use crate::manager::{param_items, FunctionModule};
use crate::version;

const NAMES: &[&str] = &[
    "current_time",
    "current_time_diff",
    "tolower",
    "toupper",
    "cmp_ver",
    "eq_ver",
    "ne_ver",
    "lt_ver",
    "gt_ver",
    "le_ver",
    "ge_ver",
    "match_ver",
    "contains",
    "to_string",
    "unix_timestamp",
    "has_null_val",
    "len",
    "is_even",
    "is_odd",
    "empty",
    "not_empty",
    "abs",
    "range",
    "cdebug",
];

const TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

fn parse_time(s: &str) -> JasResult<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local));
    }
    for fmt in TIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Local));
        }
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            if let Some(dt) = Local.from_local_datetime(&naive).single() {
                return Ok(dt);
            }
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = Local
                .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
                .single()
            {
                return Ok(dt);
            }
        }
    }
    Err(JasError::invalid_argument(format!(
        "could not parse '{s}' as a time"
    )))
}

fn eval_one(param: Option<&Evaluable>, evaluator: &mut dyn Eval) -> JasResult<Var> {
    let items = param_items(param);
    let expr = items
        .first()
        .ok_or_else(|| JasError::invalid_argument("expected one argument"))?;
    evaluator.eval(expr)
}

fn eval_args(param: Option<&Evaluable>, evaluator: &mut dyn Eval) -> JasResult<Vec<Var>> {
    param_items(param)
        .iter()
        .map(|e| evaluator.eval(e))
        .collect()
}

pub struct CifModule;

impl FunctionModule for CifModule {
    fn module_name(&self) -> &str {
        ""
    }

    fn has(&self, name: &str) -> bool {
        NAMES.contains(&name)
    }

    fn enumerate(&self, out: &mut Vec<String>) {
        out.extend(NAMES.iter().map(|s| s.to_string()));
    }

    fn eval(&self, name: &str, param: Option<&Evaluable>, evaluator: &mut dyn Eval) -> JasResult<Var> {
        match name {
            "current_time" => Ok(Var::string(Local::now().format("%Y-%m-%dT%H:%M:%S%z").to_string())),
            "current_time_diff" => {
                let t = eval_one(param, evaluator)?.to_owned_string()?;
                let then = parse_time(&t)?;
                let diff = Local::now().signed_duration_since(then);
                Ok(Var::Double(diff.num_milliseconds() as f64 / 1000.0))
            }
            "tolower" => Ok(Var::string(eval_one(param, evaluator)?.to_owned_string()?.to_lowercase())),
            "toupper" => Ok(Var::string(eval_one(param, evaluator)?.to_owned_string()?.to_uppercase())),
            "cmp_ver" | "eq_ver" | "ne_ver" | "lt_ver" | "gt_ver" | "le_ver" | "ge_ver" => {
                let args = eval_args(param, evaluator)?;
                if args.len() != 2 {
                    return Err(JasError::invalid_argument(format!("'{name}' requires 2 arguments")));
                }
                let a = args[0].to_owned_string()?;
                let b = args[1].to_owned_string()?;
                let ord = version::cmp_ver(&a, &b);
                use std::cmp::Ordering::*;
                Ok(match name {
                    "cmp_ver" => Var::Int(match ord {
                        Less => -1,
                        Equal => 0,
                        Greater => 1,
                    }),
                    "eq_ver" => Var::Bool(ord == Equal),
                    "ne_ver" => Var::Bool(ord != Equal),
                    "lt_ver" => Var::Bool(ord == Less),
                    "gt_ver" => Var::Bool(ord == Greater),
                    "le_ver" => Var::Bool(ord != Greater),
                    "ge_ver" => Var::Bool(ord != Less),
                    _ => unreachable!(),
                })
            }
            "match_ver" => {
                let args = eval_args(param, evaluator)?;
                if args.len() != 2 {
                    return Err(JasError::invalid_argument("'match_ver' requires 2 arguments"));
                }
                let pattern = args[0].to_owned_string()?;
                let v = args[1].to_owned_string()?;
                Ok(Var::Bool(version::match_ver(&pattern, &v)))
            }
            "contains" => {
                let args = eval_args(param, evaluator)?;
                if args.len() != 2 {
                    return Err(JasError::invalid_argument("'contains' requires 2 arguments"));
                }
                match (&args[0], &args[1]) {
                    (h, n) if h.is_string() => {
                        Ok(Var::Bool(h.to_owned_string()?.contains(&n.to_owned_string()?)))
                    }
                    (h, n) if h.is_list() => {
                        Ok(Var::Bool(h.with_list(|l| l.iter().any(|x| x.op_eq(n)))?))
                    }
                    _ => Err(JasError::invalid_argument(
                        "'contains' requires a string or list as its first argument",
                    )),
                }
            }
            "to_string" => Ok(Var::string(eval_one(param, evaluator)?.dump())),
            "unix_timestamp" => {
                let v = eval_one(param, evaluator)?;
                let s = v.to_owned_string()?;
                Ok(Var::Int(parse_time(&s)?.timestamp()))
            }
            "has_null_val" => Ok(Var::Bool(has_null_val(&eval_one(param, evaluator)?))),
            "len" => {
                let v = eval_one(param, evaluator)?;
                let n = if v.is_string() {
                    v.to_owned_string()?.chars().count()
                } else if v.is_list() {
                    v.list_len()?
                } else if v.is_dict() {
                    v.with_dict(|d| d.len())?
                } else {
                    return Err(JasError::invalid_argument(format!(
                        "'len' requires a string, list, or dict, got {}",
                        v.dump()
                    )));
                };
                Ok(Var::Int(n as i64))
            }
            "is_even" | "is_odd" => {
                let v = eval_one(param, evaluator)?;
                let i = v.as_i64().map_err(|_| {
                    JasError::invalid_argument(format!("'{name}' requires an integer, got {}", v.dump()))
                })?;
                Ok(Var::Bool(if name == "is_even" { i % 2 == 0 } else { i % 2 != 0 }))
            }
            "empty" | "not_empty" => {
                let v = eval_one(param, evaluator)?;
                let is_empty = if v.is_string() {
                    v.to_owned_string()?.is_empty()
                } else if v.is_list() {
                    v.list_len()? == 0
                } else if v.is_dict() {
                    v.with_dict(|d| d.is_empty())?
                } else {
                    return Err(JasError::invalid_argument(format!(
                        "'{name}' requires a string, list, or dict, got {}",
                        v.dump()
                    )));
                };
                Ok(Var::Bool(if name == "empty" { is_empty } else { !is_empty }))
            }
            "abs" => eval_one(param, evaluator)?.op_abs(),
            "range" => {
                let args = param_items(param);
                let values: Vec<Var> = args
                    .iter()
                    .map(|e| evaluator.eval(e))
                    .collect::<JasResult<_>>()?;
                if values.is_empty() || values.len() > 3 {
                    return Err(JasError::invalid_argument("'range' requires [start, end, step?]"));
                }
                let start = values[0].as_i64()?;
                let end = values[1].as_i64()?;
                let step = values.get(2).map(|v| v.as_i64()).transpose()?.unwrap_or(1);
                if step == 0 {
                    return Err(JasError::invalid_argument("'range' step must not be 0"));
                }
                let mut out = Vec::new();
                let mut i = start;
                if step > 0 {
                    while i < end {
                        out.push(Var::Int(i));
                        i += step;
                    }
                } else {
                    while i > end {
                        out.push(Var::Int(i));
                        i += step;
                    }
                }
                Ok(Var::list(out))
            }
            "cdebug" => {
                let v = eval_one(param, evaluator)?;
                tracing::debug!(value = %v.dump(), "cdebug");
                Ok(v)
            }
            other => Err(JasError::function_not_found(format!("cif has no function '{other}'"))),
        }
    }
}

fn has_null_val(v: &Var) -> bool {
    if v.is_null() {
        return true;
    }
    if v.is_list() {
        return v
            .with_list(|l| l.iter().any(has_null_val))
            .unwrap_or(false);
    }
    if v.is_dict() {
        return v
            .with_dict(|d| d.values().any(has_null_val))
            .unwrap_or(false);
    }
    false
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
                _ => Err(JasError::evaluation("EchoEval only understands constants")),
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

    #[test]
    fn len_and_is_even_and_abs() {
        let m = CifModule;
        let mut e = EchoEval;
        let len = m
            .eval("len", Some(&Evaluable::constant(Var::string("abc"))), &mut e)
            .unwrap();
        assert_eq!(len.as_i64().unwrap(), 3);
        let even = m
            .eval("is_even", Some(&Evaluable::constant(Var::Int(4))), &mut e)
            .unwrap();
        assert!(even.as_bool().unwrap());
        let abs = m
            .eval("abs", Some(&Evaluable::constant(Var::Int(-3))), &mut e)
            .unwrap();
        assert_eq!(abs.as_i64().unwrap(), 3);
    }

    #[test]
    fn len_rejects_wrong_type() {
        let m = CifModule;
        let mut e = EchoEval;
        assert!(m
            .eval("len", Some(&Evaluable::constant(Var::Int(1))), &mut e)
            .is_err());
    }

    #[test]
    fn range_produces_stepped_ints() {
        let m = CifModule;
        let mut e = EchoEval;
        let list_expr = Evaluable::constant(Var::list(vec![Var::Int(0), Var::Int(10), Var::Int(3)]));
        let r = m.eval("range", Some(&list_expr), &mut e).unwrap();
        let items = r.with_list(|l| l.iter().map(|v| v.as_i64().unwrap()).collect::<Vec<_>>()).unwrap();
        assert_eq!(items, vec![0, 3, 6, 9]);
    }

    #[test]
    fn range_rejects_zero_step() {
        let m = CifModule;
        let mut e = EchoEval;
        let list_expr = Evaluable::constant(Var::list(vec![Var::Int(0), Var::Int(10), Var::Int(0)]));
        assert!(m.eval("range", Some(&list_expr), &mut e).is_err());
    }

    #[test]
    fn has_null_val_recurses() {
        let mut d = jas_var::Dict::new();
        d.insert("a".into(), Var::list(vec![Var::Int(1), Var::Null]));
        assert!(has_null_val(&Var::dict(d)));
        assert!(!has_null_val(&Var::Int(1)));
    }
}
