//! `Number`: a uniform wrapper over `f64` unifying int/double arithmetic.
//!
//! An instance *is an integer* iff `trunc(v) == v`. Bitwise and modulus
//! operators require both operands to be integral, raising *invalid-argument*
//! otherwise; all other arithmetic operates on the double representation.

use jas_error::{JasError, JasResult};

const DIV_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number(f64);

impl Number {
    pub fn from_i64(v: i64) -> Self {
        Number(v as f64)
    }

    pub fn from_f64(v: f64) -> Self {
        Number(v)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    pub fn is_integer(self) -> bool {
        self.0.trunc() == self.0
    }

    pub fn as_i64(self) -> Option<i64> {
        self.is_integer().then(|| self.0 as i64)
    }

    fn require_integral(self, op: &str) -> JasResult<i64> {
        self.as_i64().ok_or_else(|| {
            JasError::invalid_argument(format!(
                "'{op}' requires an integral operand, got {}",
                self.0
            ))
        })
    }

    pub fn add(self, rhs: Number) -> Number {
        Number(self.0 + rhs.0)
    }

    pub fn sub(self, rhs: Number) -> Number {
        Number(self.0 - rhs.0)
    }

    pub fn mul(self, rhs: Number) -> Number {
        Number(self.0 * rhs.0)
    }

    pub fn div(self, rhs: Number) -> JasResult<Number> {
        if rhs.0.abs() < DIV_EPSILON {
            return Err(JasError::evaluation("divide-by-zero"));
        }
        Ok(Number(self.0 / rhs.0))
    }

    pub fn rem(self, rhs: Number) -> JasResult<Number> {
        let a = self.require_integral("%")?;
        let b = rhs.require_integral("%")?;
        if b == 0 {
            return Err(JasError::evaluation("divide-by-zero"));
        }
        Ok(Number::from_i64(a % b))
    }

    pub fn bitand(self, rhs: Number) -> JasResult<Number> {
        Ok(Number::from_i64(
            self.require_integral("&")? & rhs.require_integral("&")?,
        ))
    }

    pub fn bitor(self, rhs: Number) -> JasResult<Number> {
        Ok(Number::from_i64(
            self.require_integral("|")? | rhs.require_integral("|")?,
        ))
    }

    pub fn bitxor(self, rhs: Number) -> JasResult<Number> {
        Ok(Number::from_i64(
            self.require_integral("^")? ^ rhs.require_integral("^")?,
        ))
    }

    pub fn shl(self, rhs: Number) -> JasResult<Number> {
        Ok(Number::from_i64(
            self.require_integral("<<")? << rhs.require_integral("<<")?,
        ))
    }

    pub fn shr(self, rhs: Number) -> JasResult<Number> {
        Ok(Number::from_i64(
            self.require_integral(">>")? >> rhs.require_integral(">>")?,
        ))
    }

    pub fn bitnot(self) -> JasResult<Number> {
        Ok(Number::from_i64(!self.require_integral("~")?))
    }

    pub fn neg(self) -> Number {
        Number(-self.0)
    }

    pub fn abs(self) -> Number {
        Number(self.0.abs())
    }

    pub fn partial_cmp(self, rhs: Number) -> std::cmp::Ordering {
        self.0.partial_cmp(&rhs.0).unwrap_or(std::cmp::Ordering::Equal)
    }

    pub fn eq(self, rhs: Number) -> bool {
        self.0 == rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrality() {
        assert!(Number::from_f64(3.0).is_integer());
        assert!(!Number::from_f64(3.5).is_integer());
        assert_eq!(Number::from_f64(3.0).as_i64(), Some(3));
    }

    #[test]
    fn div_by_zero_is_evaluation_error() {
        assert!(Number::from_i64(1).div(Number::from_i64(0)).is_err());
    }

    #[test]
    fn bitops_require_integral() {
        assert!(Number::from_f64(1.5).bitand(Number::from_i64(1)).is_err());
        assert_eq!(
            Number::from_i64(6).bitand(Number::from_i64(3)).unwrap().as_i64(),
            Some(2)
        );
    }
}
