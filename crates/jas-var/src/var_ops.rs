//! Operator semantics for `Var`, split out from the type definition the way
//! the category-specific operator modules are in this codebase's value
//! crate: one file for comparisons, one for arithmetic/bitwise/logical.

use jas_error::{JasError, JasResult};

use crate::var::{Category, Var};

impl Var {
    /// `+`: numeric add, string concatenation, or list concatenation -- both
    /// operands must share a category.
    pub fn op_add(&self, rhs: &Var) -> JasResult<Var> {
        match (self.category(), rhs.category()) {
            (Category::Number, Category::Number) => {
                Ok(Var::from(self.as_number()?.add(rhs.as_number()?)))
            }
            (Category::String, Category::String) => Ok(Var::string(format!(
                "{}{}",
                self.to_owned_string()?,
                rhs.to_owned_string()?
            ))),
            (Category::List, Category::List) => {
                let mut items = self.with_list(|l| l.clone())?;
                items.extend(rhs.with_list(|l| l.clone())?);
                Ok(Var::list(items))
            }
            (Category::Dict, Category::Dict) => {
                let mut merged = self.with_dict(|d| d.clone())?;
                for (k, v) in rhs.with_dict(|d| d.clone())? {
                    merged.insert(k, v);
                }
                Ok(Var::dict(merged))
            }
            _ => Err(JasError::type_mismatch("+", &self.dump(), &rhs.dump())),
        }
    }

    pub fn op_sub(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop("-", rhs, |a, b| Ok(a.sub(b)))
    }

    pub fn op_mul(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop("*", rhs, |a, b| Ok(a.mul(b)))
    }

    pub fn op_div(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop("/", rhs, |a, b| a.div(b))
    }

    pub fn op_rem(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop("%", rhs, |a, b| a.rem(b))
    }

    pub fn op_bitand(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop("&", rhs, |a, b| a.bitand(b))
    }

    pub fn op_bitor(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop("|", rhs, |a, b| a.bitor(b))
    }

    pub fn op_bitxor(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop("^", rhs, |a, b| a.bitxor(b))
    }

    pub fn op_shl(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop("<<", rhs, |a, b| a.shl(b))
    }

    pub fn op_shr(&self, rhs: &Var) -> JasResult<Var> {
        self.numeric_binop(">>", rhs, |a, b| a.shr(b))
    }

    pub fn op_neg(&self) -> JasResult<Var> {
        Ok(Var::from(self.as_number().map_err(|_| {
            JasError::type_error(format!("unary '-' requires a number, got {}", self.dump()))
        })?.neg()))
    }

    pub fn op_bitnot(&self) -> JasResult<Var> {
        let n = self.as_number().map_err(|_| {
            JasError::type_error(format!("unary '~' requires a number, got {}", self.dump()))
        })?;
        Ok(Var::from(n.bitnot()?))
    }

    pub fn op_abs(&self) -> JasResult<Var> {
        Ok(Var::from(self.as_number()?.abs()))
    }

    fn numeric_binop(
        &self,
        op: &str,
        rhs: &Var,
        f: impl FnOnce(
            crate::number::Number,
            crate::number::Number,
        ) -> JasResult<crate::number::Number>,
    ) -> JasResult<Var> {
        let (a, b) = match (self.as_number(), rhs.as_number()) {
            (Ok(a), Ok(b)) => (a, b),
            _ => return Err(JasError::type_mismatch(op, &self.dump(), &rhs.dump())),
        };
        Ok(Var::from(f(a, b)?))
    }

    /// Structural equality. Cross-number comparison uses real-number
    /// equality (`Int(1) == Double(1.0)`); `Ref`s compare by referent.
    pub fn op_eq(&self, rhs: &Var) -> bool {
        match (self.resolved(), rhs.resolved()) {
            (Var::Null, Var::Null) => true,
            (Var::Bool(a), Var::Bool(b)) => a == b,
            (Var::Int(a), Var::Int(b)) => a == b,
            (Var::Int(a), Var::Double(b)) | (Var::Double(b), Var::Int(a)) => a as f64 == b,
            (Var::Double(a), Var::Double(b)) => a == b,
            (Var::String(a), Var::String(b)) => *a.borrow() == *b.borrow(),
            (Var::List(a), Var::List(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.op_eq(y))
            }
            (Var::Dict(a), Var::Dict(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|bv| v.op_eq(bv)))
            }
            _ => false,
        }
    }

    pub fn op_ne(&self, rhs: &Var) -> bool {
        !self.op_eq(rhs)
    }

    /// Ordering comparisons: defined when both operands share a category
    /// (number, string, list, or dict-with-lexicographic-ordering).
    fn op_cmp(&self, op: &str, rhs: &Var) -> JasResult<std::cmp::Ordering> {
        use std::cmp::Ordering;
        match (self.category(), rhs.category()) {
            (Category::Number, Category::Number) => {
                Ok(self.as_number()?.partial_cmp(rhs.as_number()?))
            }
            (Category::String, Category::String) => {
                Ok(self.to_owned_string()?.cmp(&rhs.to_owned_string()?))
            }
            (Category::List, Category::List) => {
                let a = self.with_list(|l| l.clone())?;
                let b = rhs.with_list(|l| l.clone())?;
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.op_cmp(op, y)?;
                    if ord != Ordering::Equal {
                        return Ok(ord);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (Category::Dict, Category::Dict) => {
                let mut a: Vec<_> = self.with_dict(|d| d.clone())?.into_iter().collect();
                let mut b: Vec<_> = rhs.with_dict(|d| d.clone())?.into_iter().collect();
                a.sort_by(|x, y| x.0.cmp(&y.0));
                b.sort_by(|x, y| x.0.cmp(&y.0));
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    match ka.cmp(kb) {
                        Ordering::Equal => {
                            let ord = va.op_cmp(op, vb)?;
                            if ord != Ordering::Equal {
                                return Ok(ord);
                            }
                        }
                        other => return Ok(other),
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            _ => Err(JasError::type_mismatch(op, &self.dump(), &rhs.dump())),
        }
    }

    pub fn op_lt(&self, rhs: &Var) -> JasResult<bool> {
        Ok(self.op_cmp("<", rhs)? == std::cmp::Ordering::Less)
    }

    pub fn op_le(&self, rhs: &Var) -> JasResult<bool> {
        Ok(self.op_cmp("<=", rhs)? != std::cmp::Ordering::Greater)
    }

    pub fn op_gt(&self, rhs: &Var) -> JasResult<bool> {
        Ok(self.op_cmp(">", rhs)? == std::cmp::Ordering::Greater)
    }

    pub fn op_ge(&self, rhs: &Var) -> JasResult<bool> {
        Ok(self.op_cmp(">=", rhs)? != std::cmp::Ordering::Less)
    }

    /// Unary logical negation; requires a `Bool` operand.
    pub fn op_not(&self) -> JasResult<Var> {
        Ok(Var::Bool(!self.as_bool()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_concatenates_strings_and_lists() {
        assert_eq!(
            Var::string("a").op_add(&Var::string("b")).unwrap().dump(),
            "\"ab\""
        );
        let l = Var::list(vec![Var::Int(1)])
            .op_add(&Var::list(vec![Var::Int(2)]))
            .unwrap();
        assert_eq!(l.dump(), "[1, 2]");
    }

    #[test]
    fn cross_number_equality_and_ordering() {
        assert!(Var::Int(1).op_eq(&Var::Double(1.0)));
        assert!(Var::Int(1).op_lt(&Var::Double(1.5)).unwrap());
    }

    #[test]
    fn mismatched_category_comparison_is_type_error() {
        assert!(Var::Int(1).op_lt(&Var::string("a")).is_err());
    }

    #[test]
    fn bitwise_on_non_integer_is_error() {
        assert!(Var::Double(1.5).op_bitand(&Var::Int(1)).is_err());
    }
}
