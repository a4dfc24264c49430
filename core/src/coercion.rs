//! Numeric coercion engine.
//!
//! Two operands of possibly different types are brought to a common type before an
//! operator runs. Comparisons and arithmetic use different promotion rules:
//!
//! - **Comparisons** scan the fixed preference list [`COMMON_TYPES`]: the first entry
//!   matching either operand's type wins. When neither operand's type is listed, the left
//!   operand's type is used. An integer compared with a float is therefore compared as
//!   integers.
//! - **Arithmetic** widens along `Integer < Float < Decimal`. Strings take part as
//!   decimals; booleans, date-times and nulls are rejected.
//!
//! Division is the one asymmetric operation: when neither operand is real, the left
//! operand is widened to a float first so integer operands never truncate.

use core::cmp::Ordering;

use rust_decimal::Decimal;

use crate::{
    casting::{self, CastError, to_decimal, to_float, to_integer},
    evaluator::EvalError,
    values::{ScalarType, Value},
};

/// Preference order used to pick the type two compared values are converted to.
pub const COMMON_TYPES: [ScalarType; 5] = [
    ScalarType::Integer,
    ScalarType::Float,
    ScalarType::Boolean,
    ScalarType::String,
    ScalarType::Decimal,
];

/// The type two operands are converted to before being compared.
///
/// A missing type (a null operand) never contributes; if both are missing the result is
/// `None`.
pub fn common_type(a: Option<ScalarType>, b: Option<ScalarType>) -> Option<ScalarType> {
    COMMON_TYPES
        .iter()
        .copied()
        .find(|t| a == Some(*t) || b == Some(*t))
        .or(a)
        .or(b)
}

/// Three-way comparison using the common type of both operands.
///
/// Two nulls are equal; a single null orders before any other value.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Value::Null, Value::Null) => return Ok(Ordering::Equal),
        (Value::Null, _) => return Ok(Ordering::Less),
        (_, Value::Null) => return Ok(Ordering::Greater),
        _ => {}
    }

    let Some(target) = common_type(a.scalar_type(), b.scalar_type()) else {
        return Ok(Ordering::Equal);
    };
    let left = casting::cast(a, target)?;
    let right = casting::cast(b, target)?;

    let ordering = match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => l.cmp(r),
        (Value::Float(l), Value::Float(r)) => compare_floats(*l, *r),
        (Value::Boolean(l), Value::Boolean(r)) => l.cmp(r),
        (Value::String(l), Value::String(r)) => l.cmp(r),
        (Value::Decimal(l), Value::Decimal(r)) => l.cmp(r),
        (Value::DateTime(l), Value::DateTime(r)) => l.cmp(r),
        _ => {
            return Err(EvalError::UnsupportedOperator {
                operator: format!("compare {} with {}", left.type_name(), right.type_name()),
            });
        }
    };
    Ok(ordering)
}

/// NaN equals NaN and sorts below every number, keeping the ordering total.
fn compare_floats(l: f64, r: f64) -> Ordering {
    match (l.is_nan(), r.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

/// A pair of operands widened to the same numeric representation.
enum Operands {
    Integer(i64, i64),
    Float(f64, f64),
    Decimal(Decimal, Decimal),
}

/// Numeric type a value takes part in arithmetic as.
fn arithmetic_type(value: &Value) -> Result<ScalarType, EvalError> {
    match value {
        Value::Integer(_) => Ok(ScalarType::Integer),
        Value::Float(_) => Ok(ScalarType::Float),
        Value::Decimal(_) | Value::String(_) => Ok(ScalarType::Decimal),
        Value::Null | Value::Boolean(_) | Value::DateTime(_) => Err(CastError::Invalid {
            value: value.to_string(),
            from: value.type_name(),
            to: ScalarType::Decimal,
        }
        .into()),
    }
}

fn widen(a: &Value, b: &Value) -> Result<Operands, EvalError> {
    let types = [arithmetic_type(a)?, arithmetic_type(b)?];
    let operands = if types.contains(&ScalarType::Decimal) {
        Operands::Decimal(to_decimal(a)?, to_decimal(b)?)
    } else if types.contains(&ScalarType::Float) {
        Operands::Float(to_float(a)?, to_float(b)?)
    } else {
        Operands::Integer(to_integer(a)?, to_integer(b)?)
    };
    Ok(operands)
}

fn overflow(operation: &str) -> EvalError {
    EvalError::Overflow {
        operation: operation.into(),
    }
}

fn division_by_zero(operation: &str) -> EvalError {
    EvalError::DivisionByZero {
        operation: operation.into(),
    }
}

pub fn add(a: &Value, b: &Value) -> Result<Value, EvalError> {
    Ok(match widen(a, b).map_err(|e| e.during("+"))? {
        Operands::Integer(l, r) => Value::Integer(l.wrapping_add(r)),
        Operands::Float(l, r) => Value::Float(l + r),
        Operands::Decimal(l, r) => Value::Decimal(l.checked_add(r).ok_or_else(|| overflow("+"))?),
    })
}

pub fn subtract(a: &Value, b: &Value) -> Result<Value, EvalError> {
    Ok(match widen(a, b).map_err(|e| e.during("-"))? {
        Operands::Integer(l, r) => Value::Integer(l.wrapping_sub(r)),
        Operands::Float(l, r) => Value::Float(l - r),
        Operands::Decimal(l, r) => Value::Decimal(l.checked_sub(r).ok_or_else(|| overflow("-"))?),
    })
}

pub fn multiply(a: &Value, b: &Value) -> Result<Value, EvalError> {
    Ok(match widen(a, b).map_err(|e| e.during("*"))? {
        Operands::Integer(l, r) => Value::Integer(l.wrapping_mul(r)),
        Operands::Float(l, r) => Value::Float(l * r),
        Operands::Decimal(l, r) => Value::Decimal(l.checked_mul(r).ok_or_else(|| overflow("*"))?),
    })
}

/// Division. Integer operands are divided as floats (`1 / 2 == 0.5`).
pub fn divide(a: &Value, b: &Value) -> Result<Value, EvalError> {
    let is_real = |v: &Value| v.scalar_type().is_some_and(ScalarType::is_real);
    let operands = if is_real(a) || is_real(b) {
        widen(a, b)
    } else {
        let left = Value::Float(to_float(a).map_err(|e| EvalError::from(e).during("/"))?);
        widen(&left, b)
    };

    Ok(match operands.map_err(|e| e.during("/"))? {
        Operands::Integer(l, r) => Value::Float(l as f64 / r as f64),
        Operands::Float(l, r) => Value::Float(l / r),
        Operands::Decimal(l, r) => {
            if r.is_zero() {
                return Err(division_by_zero("/"));
            }
            Value::Decimal(l.checked_div(r).ok_or_else(|| overflow("/"))?)
        }
    })
}

pub fn modulo(a: &Value, b: &Value) -> Result<Value, EvalError> {
    Ok(match widen(a, b).map_err(|e| e.during("%"))? {
        Operands::Integer(_, 0) => return Err(division_by_zero("%")),
        Operands::Integer(l, r) => Value::Integer(l.wrapping_rem(r)),
        Operands::Float(l, r) => Value::Float(l % r),
        Operands::Decimal(l, r) => {
            if r.is_zero() {
                return Err(division_by_zero("%"));
            }
            Value::Decimal(l.checked_rem(r).ok_or_else(|| overflow("%"))?)
        }
    })
}

/// The larger of two values. A null operand yields the other one.
pub fn max(a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Null, other) | (other, Value::Null) => return Ok(other.clone()),
        _ => {}
    }
    Ok(match widen(a, b).map_err(|e| e.during("Max"))? {
        Operands::Integer(l, r) => Value::Integer(l.max(r)),
        Operands::Float(l, r) if l.is_nan() || r.is_nan() => Value::Float(f64::NAN),
        Operands::Float(l, r) => Value::Float(l.max(r)),
        Operands::Decimal(l, r) => Value::Decimal(l.max(r)),
    })
}

/// The smaller of two values. A null operand yields the other one.
pub fn min(a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Null, other) | (other, Value::Null) => return Ok(other.clone()),
        _ => {}
    }
    Ok(match widen(a, b).map_err(|e| e.during("Min"))? {
        Operands::Integer(l, r) => Value::Integer(l.min(r)),
        Operands::Float(l, r) if l.is_nan() || r.is_nan() => Value::Float(f64::NAN),
        Operands::Float(l, r) => Value::Float(l.min(r)),
        Operands::Decimal(l, r) => Value::Decimal(l.min(r)),
    })
}
