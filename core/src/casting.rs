//! Value conversions.
//!
//! This module converts a single [`Value`] to a destination scalar type. It is the
//! only place where representation changes happen: the coercion engine, the operators
//! and the built-in functions all funnel through these functions, so a conversion
//! behaves the same wherever it is triggered.
//!
//! Conversion rules:
//!
//! - Floats and decimals convert to integers by rounding half to even, and fail when the
//!   rounded value does not fit.
//! - Numbers convert to booleans by comparing against zero; strings must spell `true` or
//!   `false` (case-insensitive).
//! - Strings are parsed (after trimming) when converted to numbers or date-times.
//! - Any value converts to text through its `Display` form.
//! - `Null` only converts to text (the empty string).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ecow::EcoString;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

use crate::values::{DATETIME_FORMAT, ScalarType, Value};

/// Errors that can occur while converting a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    /// The value has no representation in the target type.
    #[error("cannot convert {from} '{value}' to {to}")]
    Invalid {
        value: String,
        from: &'static str,
        to: ScalarType,
    },

    /// The value is representable in principle but out of the target's range.
    #[error("{from} '{value}' is out of range for {to}")]
    OutOfRange {
        value: String,
        from: &'static str,
        to: &'static str,
    },
}

impl CastError {
    fn invalid(value: &Value, to: ScalarType) -> Self {
        CastError::Invalid {
            value: value.to_string(),
            from: value.type_name(),
            to,
        }
    }

    fn out_of_range(value: &Value, to: &'static str) -> Self {
        CastError::OutOfRange {
            value: value.to_string(),
            from: value.type_name(),
            to,
        }
    }
}

/// Convert `value` to the given scalar type.
pub fn cast(value: &Value, target: ScalarType) -> Result<Value, CastError> {
    Ok(match target {
        ScalarType::Integer => Value::Integer(to_integer(value)?),
        ScalarType::Float => Value::Float(to_float(value)?),
        ScalarType::Boolean => Value::Boolean(to_boolean(value)?),
        ScalarType::String => Value::String(to_text(value)),
        ScalarType::Decimal => Value::Decimal(to_decimal(value)?),
        ScalarType::DateTime => Value::DateTime(to_datetime(value)?),
    })
}

pub fn to_integer(value: &Value) -> Result<i64, CastError> {
    match value {
        Value::Integer(v) => Ok(*v),
        Value::Float(v) => float_to_integer(*v).ok_or_else(|| CastError::out_of_range(value, "integer")),
        Value::Decimal(v) => v
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .ok_or_else(|| CastError::out_of_range(value, "integer")),
        Value::Boolean(v) => Ok(i64::from(*v)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| CastError::invalid(value, ScalarType::Integer)),
        Value::Null | Value::DateTime(_) => Err(CastError::invalid(value, ScalarType::Integer)),
    }
}

fn float_to_integer(v: f64) -> Option<i64> {
    let rounded = v.round_ties_even();
    // 2^63 is exactly representable; anything at or above it overflows.
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < 9_223_372_036_854_775_808.0 {
        Some(rounded as i64)
    } else {
        None
    }
}

pub fn to_float(value: &Value) -> Result<f64, CastError> {
    match value {
        Value::Integer(v) => Ok(*v as f64),
        Value::Float(v) => Ok(*v),
        Value::Decimal(v) => v
            .to_f64()
            .ok_or_else(|| CastError::out_of_range(value, "float")),
        Value::Boolean(v) => Ok(if *v { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CastError::invalid(value, ScalarType::Float)),
        Value::Null | Value::DateTime(_) => Err(CastError::invalid(value, ScalarType::Float)),
    }
}

pub fn to_boolean(value: &Value) -> Result<bool, CastError> {
    match value {
        Value::Boolean(v) => Ok(*v),
        Value::Integer(v) => Ok(*v != 0),
        Value::Float(v) => Ok(*v != 0.0),
        Value::Decimal(v) => Ok(!v.is_zero()),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if s.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(CastError::invalid(value, ScalarType::Boolean))
            }
        }
        Value::Null | Value::DateTime(_) => Err(CastError::invalid(value, ScalarType::Boolean)),
    }
}

pub fn to_decimal(value: &Value) -> Result<Decimal, CastError> {
    match value {
        Value::Decimal(v) => Ok(*v),
        Value::Integer(v) => Ok(Decimal::from(*v)),
        Value::Float(v) => Decimal::from_f64(*v).ok_or_else(|| CastError::out_of_range(value, "decimal")),
        Value::Boolean(v) => Ok(if *v { Decimal::ONE } else { Decimal::ZERO }),
        Value::String(s) => parse_decimal(s.trim()).ok_or_else(|| CastError::invalid(value, ScalarType::Decimal)),
        Value::Null | Value::DateTime(_) => Err(CastError::invalid(value, ScalarType::Decimal)),
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

/// Textual form of a value. Never fails.
pub fn to_text(value: &Value) -> EcoString {
    match value {
        Value::String(s) => s.clone(),
        other => ecow::eco_format!("{}", other),
    }
}

pub fn to_datetime(value: &Value) -> Result<NaiveDateTime, CastError> {
    match value {
        Value::DateTime(v) => Ok(*v),
        Value::String(s) => parse_datetime(s.trim()).ok_or_else(|| CastError::invalid(value, ScalarType::DateTime)),
        _ => Err(CastError::invalid(value, ScalarType::DateTime)),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Convert to a 16-bit unsigned integer, as used by the bitwise operators.
pub fn to_u16(value: &Value) -> Result<u16, CastError> {
    let wide = to_integer(value)?;
    u16::try_from(wide).map_err(|_| CastError::out_of_range(value, "u16"))
}
