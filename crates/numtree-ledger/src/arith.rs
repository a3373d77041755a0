//! Arithmetic evaluator.
//!
//! The only place a reply's `result` is computed. Evaluation is plain IEEE-754
//! `f64` arithmetic with no rounding or integer truncation, so a stored result
//! is reproducible from its operands.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A binary operation a reply applies to its parent's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operation {
    /// All supported operations.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// The wire symbol for this operation.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }

    /// Apply this operation to `left` and `right`.
    pub fn apply(self, left: f64, right: f64) -> Result<f64> {
        apply(left, self, right)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Operation::Add),
            "-" => Ok(Operation::Subtract),
            "*" => Ok(Operation::Multiply),
            "/" => Ok(Operation::Divide),
            other => Err(Error::UnsupportedOperation(other.to_string())),
        }
    }
}

/// Compute `left op right`.
///
/// Fails with [`Error::DivisionByZero`] for `/` by zero, and with
/// [`Error::InvalidInput`] when an operand or the result is not finite
/// (NaN and infinities have no JSON representation).
pub fn apply(left: f64, op: Operation, right: f64) -> Result<f64> {
    ensure_finite("leftValue", left)?;
    ensure_finite("rightValue", right)?;

    let result = match op {
        Operation::Add => left + right,
        Operation::Subtract => left - right,
        Operation::Multiply => left * right,
        Operation::Divide => {
            if right == 0.0 {
                return Err(Error::DivisionByZero);
            }
            left / right
        }
    };

    if !result.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{} {} {} overflows",
            left, op, right
        )));
    }
    Ok(result)
}

/// Reject NaN and infinities.
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("{} must be a finite number", field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn basic_operations() {
        assert_eq!(apply(10.0, Operation::Add, 5.0).unwrap(), 15.0);
        assert_eq!(apply(10.0, Operation::Subtract, 15.0).unwrap(), -5.0);
        assert_eq!(apply(10.0, Operation::Multiply, 2.0).unwrap(), 20.0);
        assert_eq!(apply(10.0, Operation::Divide, 2.0).unwrap(), 5.0);
    }

    #[test]
    fn division_is_real_division() {
        assert_eq!(apply(7.0, Operation::Divide, 2.0).unwrap(), 3.5);
        assert_eq!(apply(1.0, Operation::Divide, 3.0).unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn division_by_zero() {
        assert!(matches!(
            apply(10.0, Operation::Divide, 0.0),
            Err(Error::DivisionByZero)
        ));
        assert!(matches!(
            apply(10.0, Operation::Divide, -0.0),
            Err(Error::DivisionByZero)
        ));
    }

    #[test]
    fn unsupported_symbol() {
        let err = "%".parse::<Operation>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation(ref s) if s == "%"));
        assert!("".parse::<Operation>().is_err());
    }

    #[test]
    fn symbols_roundtrip() {
        for op in Operation::ALL {
            assert_eq!(op.symbol().parse::<Operation>().unwrap(), op);
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.symbol()));
        }
    }

    #[test]
    fn overflow_rejected() {
        assert!(matches!(
            apply(f64::MAX, Operation::Multiply, 10.0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            apply(f64::NAN, Operation::Add, 1.0),
            Err(Error::InvalidInput(_))
        ));
    }

    proptest! {
        #[test]
        fn deterministic(left in -1.0e6f64..1.0e6, right in -1.0e6f64..1.0e6, idx in 0usize..4) {
            let op = Operation::ALL[idx];
            let a = apply(left, op, right);
            let b = apply(left, op, right);
            match (a, b) {
                (Ok(x), Ok(y)) => prop_assert_eq!(x.to_bits(), y.to_bits()),
                (Err(Error::DivisionByZero), Err(Error::DivisionByZero)) => prop_assert_eq!(right, 0.0),
                other => prop_assert!(false, "diverging results: {:?}", other),
            }
        }
    }
}
