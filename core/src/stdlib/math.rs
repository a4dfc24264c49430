//! Math Functions
//!
//! Functions: Abs, Acos, Asin, Atan, Ceiling, Cos, Exp, Floor, IEEERemainder, Ln, Log,
//!            Log10, Max, Min, Pow, Round, Sign, Sin, Sqrt, Tan, Truncate
//!
//! Most functions work on floats and return a float. `Abs` works on decimals, `Sign`
//! returns an integer and `Max`/`Min` keep the operands' common numeric type.

use crate::{
    api::FunctionArgs,
    casting::{to_decimal, to_float, to_integer},
    coercion,
    evaluator::{Arity, EvalError},
    stdlib::{Builtin, convert},
    values::Value,
};

pub(super) static FUNCTIONS: &[Builtin] = &[
    Builtin::new("Abs", Arity::Exactly(1), math_abs),
    Builtin::new("Acos", Arity::Exactly(1), math_acos),
    Builtin::new("Asin", Arity::Exactly(1), math_asin),
    Builtin::new("Atan", Arity::Exactly(1), math_atan),
    Builtin::new("Ceiling", Arity::Exactly(1), math_ceiling),
    Builtin::new("Cos", Arity::Exactly(1), math_cos),
    Builtin::new("Exp", Arity::Exactly(1), math_exp),
    Builtin::new("Floor", Arity::Exactly(1), math_floor),
    Builtin::new("IEEERemainder", Arity::Exactly(2), math_ieee_remainder),
    Builtin::new("Ln", Arity::Exactly(1), math_ln),
    Builtin::new("Log", Arity::Exactly(2), math_log),
    Builtin::new("Log10", Arity::Exactly(1), math_log10),
    Builtin::new("Max", Arity::Exactly(2), math_max),
    Builtin::new("Min", Arity::Exactly(2), math_min),
    Builtin::new("Pow", Arity::Exactly(2), math_pow),
    Builtin::new("Round", Arity::Exactly(2), math_round),
    Builtin::new("Sign", Arity::Exactly(1), math_sign),
    Builtin::new("Sin", Arity::Exactly(1), math_sin),
    Builtin::new("Sqrt", Arity::Exactly(1), math_sqrt),
    Builtin::new("Tan", Arity::Exactly(1), math_tan),
    Builtin::new("Truncate", Arity::Exactly(1), math_truncate),
];

/// Largest digit count `Round` accepts.
const MAX_ROUND_DIGITS: i64 = 15;

fn float_arg(args: &FunctionArgs<'_>, index: usize, function: &str) -> Result<f64, EvalError> {
    convert(args, index, function, to_float)
}

fn unary_float(
    args: &FunctionArgs<'_>,
    function: &str,
    apply: fn(f64) -> f64,
) -> Result<Value, EvalError> {
    Ok(Value::Float(apply(float_arg(args, 0, function)?)))
}

// ============================================================================
// Basic Operations
// ============================================================================

/// Absolute value, computed on decimals
fn math_abs(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let value = convert(args, 0, "Abs", to_decimal)?;
    Ok(Value::Decimal(value.abs()))
}

/// -1, 0 or 1 depending on the sign of the argument
fn math_sign(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let value = float_arg(args, 0, "Sign")?;
    if value.is_nan() {
        return Err(EvalError::InvalidArgument {
            function: "Sign",
            message: "NaN has no sign".into(),
        });
    }
    let sign = if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    };
    Ok(Value::Integer(sign))
}

/// The larger of two values
fn math_max(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let a = args.evaluate(0)?;
    let b = args.evaluate(1)?;
    coercion::max(&a, &b)
}

/// The smaller of two values
fn math_min(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let a = args.evaluate(0)?;
    let b = args.evaluate(1)?;
    coercion::min(&a, &b)
}

// ============================================================================
// Rounding Functions
// ============================================================================

fn math_ceiling(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Ceiling", f64::ceil)
}

fn math_floor(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Floor", f64::floor)
}

fn math_truncate(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Truncate", f64::trunc)
}

/// Round to a number of fractional digits.
///
/// Midpoints round to even unless `ROUND_AWAY_FROM_ZERO` is set.
fn math_round(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let value = float_arg(args, 0, "Round")?;
    let digits = convert(args, 1, "Round", to_integer)?;
    if !(0..=MAX_ROUND_DIGITS).contains(&digits) {
        return Err(EvalError::InvalidArgument {
            function: "Round",
            message: format!("digits must be between 0 and {}, got {}", MAX_ROUND_DIGITS, digits),
        });
    }

    let away_from_zero = args.options().round_away_from_zero();
    let round = |x: f64| {
        if away_from_zero {
            x.round()
        } else {
            x.round_ties_even()
        }
    };

    if digits == 0 {
        return Ok(Value::Float(round(value)));
    }
    let scale = 10f64.powi(digits as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        // Too large to have a fractional part at this precision.
        return Ok(Value::Float(value));
    }
    Ok(Value::Float(round(scaled) / scale))
}

// ============================================================================
// Exponentiation and Logarithms
// ============================================================================

fn math_sqrt(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    // sqrt of negative is NaN (IEEE 754 semantics)
    unary_float(args, "Sqrt", f64::sqrt)
}

fn math_pow(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let base = float_arg(args, 0, "Pow")?;
    let exponent = float_arg(args, 1, "Pow")?;
    Ok(Value::Float(base.powf(exponent)))
}

fn math_exp(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Exp", f64::exp)
}

/// Natural logarithm
fn math_ln(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Ln", f64::ln)
}

fn math_log10(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Log10", f64::log10)
}

/// Logarithm of the first argument in the base given by the second
fn math_log(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let value = float_arg(args, 0, "Log")?;
    let base = float_arg(args, 1, "Log")?;
    Ok(Value::Float(value.log(base)))
}

/// `x - y * n` where `n` is `x / y` rounded to the nearest integer, ties to even
fn math_ieee_remainder(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let x = float_arg(args, 0, "IEEERemainder")?;
    let y = float_arg(args, 1, "IEEERemainder")?;
    Ok(Value::Float(x - y * (x / y).round_ties_even()))
}

// ============================================================================
// Trigonometry
// ============================================================================

fn math_sin(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Sin", f64::sin)
}

fn math_cos(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Cos", f64::cos)
}

fn math_tan(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Tan", f64::tan)
}

fn math_asin(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Asin", f64::asin)
}

fn math_acos(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Acos", f64::acos)
}

fn math_atan(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    unary_float(args, "Atan", f64::atan)
}

#[cfg(test)]
#[path = "math_test.rs"]
mod math_test;
