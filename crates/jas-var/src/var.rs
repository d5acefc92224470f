//! `Var`: the dynamic, reference-sharing value type every JAS expression
//! produces and consumes.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use jas_error::{JasError, JasResult};

use crate::number::Number;
use crate::path::Path;

/// Ordered-by-insertion string-keyed map, matching `Var::Dict`'s invariant
/// that key order is preserved (used for deterministic `dump()`/`keys()`).
pub type Dict = IndexMap<String, Var>;

/// Tagged union of every value a JAS expression can hold.
///
/// `String`, `List`, and `Dict` wrap their payload in `Rc<RefCell<_>>` so that
/// `Var::clone()` is O(1); any method that mutates one of these in place
/// calls [`Var::detach_if_shared`] first, so aliases created by a cheap clone
/// never observe a mutation meant for only one of them. `Ref` is the one arm
/// whose sharing is *not* detached -- it exists precisely so two AST
/// locations can observe each other's mutations (see module docs on `Ref`).
#[derive(Debug, Clone)]
pub enum Var {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(Rc<RefCell<String>>),
    List(Rc<RefCell<Vec<Var>>>),
    Dict(Rc<RefCell<Dict>>),
    Ref(Rc<RefCell<Var>>),
}

/// The broad category an operator's type rules are sensitive to: ordering
/// and equality are only defined between two values of the same category
/// (numbers cross-compare with each other regardless of Int/Double).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Null,
    Bool,
    Number,
    String,
    List,
    Dict,
}

impl Var {
    pub fn null() -> Self {
        Var::Null
    }

    pub fn string(s: impl Into<String>) -> Self {
        Var::String(Rc::new(RefCell::new(s.into())))
    }

    pub fn list(items: Vec<Var>) -> Self {
        Var::List(Rc::new(RefCell::new(items)))
    }

    pub fn dict(entries: Dict) -> Self {
        Var::Dict(Rc::new(RefCell::new(entries)))
    }

    pub fn reference(v: Var) -> Self {
        Var::Ref(Rc::new(RefCell::new(v)))
    }

    /// Follow through any `Ref` indirection and hand back a plain-valued
    /// clone -- used wherever a caller needs to pattern-match the concrete
    /// arm without caring whether it arrived via an alias.
    pub fn resolved(&self) -> Var {
        match self {
            Var::Ref(cell) => cell.borrow().resolved(),
            other => other.clone(),
        }
    }

    pub fn category(&self) -> Category {
        match self.resolved() {
            Var::Null => Category::Null,
            Var::Bool(_) => Category::Bool,
            Var::Int(_) | Var::Double(_) => Category::Number,
            Var::String(_) => Category::String,
            Var::List(_) => Category::List,
            Var::Dict(_) => Category::Dict,
            Var::Ref(_) => unreachable!("resolved() never returns Ref"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.resolved(), Var::Null)
    }

    pub fn is_number(&self) -> bool {
        self.category() == Category::Number
    }

    pub fn is_string(&self) -> bool {
        self.category() == Category::String
    }

    pub fn is_list(&self) -> bool {
        self.category() == Category::List
    }

    pub fn is_dict(&self) -> bool {
        self.category() == Category::Dict
    }

    pub fn is_bool(&self) -> bool {
        self.category() == Category::Bool
    }

    pub fn is_integer(&self) -> bool {
        match self.resolved() {
            Var::Int(_) => true,
            Var::Double(d) => Number::from_f64(d).is_integer(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> JasResult<Number> {
        match self.resolved() {
            Var::Int(i) => Ok(Number::from_i64(i)),
            Var::Double(d) => Ok(Number::from_f64(d)),
            other => Err(JasError::type_error(format!(
                "expected a number, got {}",
                other.dump()
            ))),
        }
    }

    pub fn as_bool(&self) -> JasResult<bool> {
        match self.resolved() {
            Var::Bool(b) => Ok(b),
            other => Err(JasError::type_error(format!(
                "expected a bool, got {}",
                other.dump()
            ))),
        }
    }

    pub fn as_str(&self) -> JasResult<std::cell::Ref<'_, String>> {
        // Only meaningful on a non-Ref String; callers that might hold a Ref
        // should call `resolved()` first if they need to borrow past it.
        match self {
            Var::String(s) => Ok(s.borrow()),
            other => Err(JasError::type_error(format!(
                "expected a string, got {}",
                other.dump()
            ))),
        }
    }

    pub fn to_owned_string(&self) -> JasResult<String> {
        match self.resolved() {
            Var::String(s) => Ok(s.borrow().clone()),
            other => Err(JasError::type_error(format!(
                "expected a string, got {}",
                other.dump()
            ))),
        }
    }

    pub fn as_i64(&self) -> JasResult<i64> {
        let n = self.as_number()?;
        n.as_i64().ok_or_else(|| {
            JasError::invalid_argument(format!("expected an integer, got {}", self.dump()))
        })
    }

    pub fn as_usize(&self) -> JasResult<usize> {
        let i = self.as_i64()?;
        usize::try_from(i)
            .map_err(|_| JasError::out_of_range(format!("negative index {i}")))
    }

    pub fn list_len(&self) -> JasResult<usize> {
        match self.resolved() {
            Var::List(l) => Ok(l.borrow().len()),
            other => Err(JasError::type_error(format!(
                "expected a list, got {}",
                other.dump()
            ))),
        }
    }

    pub fn with_list<R>(&self, f: impl FnOnce(&Vec<Var>) -> R) -> JasResult<R> {
        match self {
            Var::List(l) => Ok(f(&l.borrow())),
            Var::Ref(cell) => cell.borrow().with_list(f),
            other => Err(JasError::type_error(format!(
                "expected a list, got {}",
                other.dump()
            ))),
        }
    }

    pub fn with_dict<R>(&self, f: impl FnOnce(&Dict) -> R) -> JasResult<R> {
        match self {
            Var::Dict(d) => Ok(f(&d.borrow())),
            Var::Ref(cell) => cell.borrow().with_dict(f),
            other => Err(JasError::type_error(format!(
                "expected a dict, got {}",
                other.dump()
            ))),
        }
    }

    /// Mutable access to list storage, detaching first if shared. Forwards
    /// through a `Ref` without detaching the `Ref` wrapper itself.
    pub fn with_list_mut<R>(&mut self, f: impl FnOnce(&mut Vec<Var>) -> R) -> JasResult<R> {
        match self {
            Var::List(_) => {
                self.detach_if_shared();
                match self {
                    Var::List(l) => Ok(f(&mut l.borrow_mut())),
                    _ => unreachable!(),
                }
            }
            Var::Ref(cell) => cell.borrow_mut().with_list_mut(f),
            other => Err(JasError::type_error(format!(
                "expected a list, got {}",
                other.dump()
            ))),
        }
    }

    pub fn with_dict_mut<R>(&mut self, f: impl FnOnce(&mut Dict) -> R) -> JasResult<R> {
        match self {
            Var::Dict(_) => {
                self.detach_if_shared();
                match self {
                    Var::Dict(d) => Ok(f(&mut d.borrow_mut())),
                    _ => unreachable!(),
                }
            }
            Var::Ref(cell) => cell.borrow_mut().with_dict_mut(f),
            other => Err(JasError::type_error(format!(
                "expected a dict, got {}",
                other.dump()
            ))),
        }
    }

    /// Copy-on-write primitive: if the interior storage of a `String`,
    /// `List`, or `Dict` arm is shared (strong count > 1), replace it with a
    /// private clone before the caller mutates it. `Ref` and scalar arms are
    /// untouched -- a `Ref`'s sharing is intentional and never detached.
    pub fn detach_if_shared(&mut self) {
        match self {
            Var::String(s) if Rc::strong_count(s) > 1 => {
                *s = Rc::new(RefCell::new(s.borrow().clone()));
            }
            Var::List(l) if Rc::strong_count(l) > 1 => {
                *l = Rc::new(RefCell::new(l.borrow().clone()));
            }
            Var::Dict(d) if Rc::strong_count(d) > 1 => {
                *d = Rc::new(RefCell::new(d.borrow().clone()));
            }
            _ => {}
        }
    }

    /// `getPath("a/b/c")`: successive dict lookups, short-circuiting to
    /// `Null` on an absent key or a non-dict intermediate.
    pub fn get_path(&self, path: &str) -> Var {
        let mut cur = self.resolved();
        for part in Path::new(path).components() {
            cur = match cur {
                Var::Dict(d) => match d.borrow().get(part) {
                    Some(v) => v.resolved(),
                    None => return Var::Null,
                },
                _ => return Var::Null,
            };
        }
        cur
    }

    pub fn from_json(v: &serde_json::Value) -> Var {
        match v {
            serde_json::Value::Null => Var::Null,
            serde_json::Value::Bool(b) => Var::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Var::Int(i)
                } else {
                    Var::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Var::string(s.clone()),
            serde_json::Value::Array(items) => {
                Var::list(items.iter().map(Var::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut d = Dict::new();
                for (k, v) in map {
                    d.insert(k.clone(), Var::from_json(v));
                }
                Var::dict(d)
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self.resolved() {
            Var::Null => serde_json::Value::Null,
            Var::Bool(b) => serde_json::Value::Bool(b),
            Var::Int(i) => serde_json::Value::Number(i.into()),
            Var::Double(d) => serde_json::Number::from_f64(d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Var::String(s) => serde_json::Value::String(s.borrow().clone()),
            Var::List(l) => serde_json::Value::Array(l.borrow().iter().map(Var::to_json).collect()),
            Var::Dict(d) => serde_json::Value::Object(
                d.borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Var::Ref(_) => unreachable!("resolved() never returns Ref"),
        }
    }

    /// A compact textual rendering of the value, used in error messages and
    /// pseudo-syntax backtraces (matches the role of the C++ source's
    /// `dump()`).
    pub fn dump(&self) -> String {
        match self.resolved() {
            Var::Null => "null".to_string(),
            Var::Bool(b) => b.to_string(),
            Var::Int(i) => i.to_string(),
            Var::Double(d) => d.to_string(),
            Var::String(s) => format!("{:?}", s.borrow().as_str()),
            Var::List(l) => {
                let items: Vec<String> = l.borrow().iter().map(Var::dump).collect();
                format!("[{}]", items.join(", "))
            }
            Var::Dict(d) => {
                let items: Vec<String> = d
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{k:?}: {}", v.dump()))
                    .collect();
                format!("{{{}}}", items.join(", "))
            }
            Var::Ref(_) => unreachable!("resolved() never returns Ref"),
        }
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.resolved() {
            Var::String(s) => write!(f, "{}", s.borrow()),
            other => write!(f, "{}", other.dump()),
        }
    }
}

impl From<bool> for Var {
    fn from(b: bool) -> Self {
        Var::Bool(b)
    }
}

impl From<i64> for Var {
    fn from(i: i64) -> Self {
        Var::Int(i)
    }
}

impl From<f64> for Var {
    fn from(d: f64) -> Self {
        Var::Double(d)
    }
}

impl From<&str> for Var {
    fn from(s: &str) -> Self {
        Var::string(s)
    }
}

impl From<String> for Var {
    fn from(s: String) -> Self {
        Var::string(s)
    }
}

impl From<Number> for Var {
    fn from(n: Number) -> Self {
        if n.is_integer() {
            Var::Int(n.as_i64().unwrap())
        } else {
            Var::Double(n.as_f64())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_path_short_circuits_on_non_dict() {
        let v = Var::dict({
            let mut d = Dict::new();
            d.insert("a".into(), Var::Int(1));
            d
        });
        assert!(v.get_path("a/b").is_null());
        assert!(matches!(v.get_path("missing"), Var::Null));
        assert!(matches!(v.get_path("a"), Var::Int(1)));
    }

    #[test]
    fn clone_is_shallow_and_detach_makes_it_private() {
        let mut a = Var::list(vec![Var::Int(1)]);
        let b = a.clone();
        a.with_list_mut(|l| l.push(Var::Int(2))).unwrap();
        assert_eq!(b.list_len().unwrap(), 1);
        assert_eq!(a.list_len().unwrap(), 2);
    }

    #[test]
    fn ref_arm_shares_mutations_across_aliases() {
        let cell = Var::reference(Var::Int(1));
        let alias = cell.clone();
        if let Var::Ref(c) = &cell {
            *c.borrow_mut() = Var::Int(42);
        }
        assert_eq!(alias.resolved().as_i64().unwrap(), 42);
    }

    #[test]
    fn json_round_trip() {
        let json: serde_json::Value =
            serde_json::json!({"a": 1, "b": [1, 2.5, "x", null, true]});
        let v = Var::from_json(&json);
        assert_eq!(v.to_json(), json);
    }
}
