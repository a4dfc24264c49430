//! Binary and unary operator implementations.
//!
//! Binary operators receive their operands as [`Thunk`]s and force them in order, left
//! first. The implementation for an operator tag is looked up once per node and kept in
//! the node's cache.

use core::cmp::Ordering;

use once_cell::unsync::OnceCell;

use crate::{
    ast::{BinaryOp, Expr, UnaryOp},
    casting::{self, CastError},
    coercion,
    evaluator::{EvalError, Evaluator},
    values::Value,
};

/// Implementation of a binary operator.
pub(crate) type BinaryFn = fn(&Thunk<'_>, &Thunk<'_>) -> Result<Value, EvalError>;

/// A deferred operand, evaluated at most once.
pub(crate) struct Thunk<'a> {
    evaluator: Evaluator<'a>,
    expr: &'a Expr,
    value: OnceCell<Value>,
}

impl<'a> Thunk<'a> {
    pub(crate) fn new(evaluator: Evaluator<'a>, expr: &'a Expr) -> Self {
        Self {
            evaluator,
            expr,
            value: OnceCell::new(),
        }
    }

    /// Evaluate the operand, or return the value from an earlier call.
    pub(crate) fn force(&self) -> Result<&Value, EvalError> {
        self.value.get_or_try_init(|| self.evaluator.eval(self.expr))
    }
}

/// Look up the implementation of a binary operator.
pub(super) fn binary_fn(op: BinaryOp) -> BinaryFn {
    match op {
        BinaryOp::And => eval_and,
        BinaryOp::Or => eval_or,
        BinaryOp::Equal => eval_equal,
        BinaryOp::NotEqual => eval_not_equal,
        BinaryOp::Lesser => eval_lesser,
        BinaryOp::LesserOrEqual => eval_lesser_or_equal,
        BinaryOp::Greater => eval_greater,
        BinaryOp::GreaterOrEqual => eval_greater_or_equal,
        BinaryOp::Plus => eval_plus,
        BinaryOp::Minus => eval_minus,
        BinaryOp::Times => eval_times,
        BinaryOp::Div => eval_div,
        BinaryOp::Modulo => eval_modulo,
        BinaryOp::BitwiseAnd => eval_bitwise_and,
        BinaryOp::BitwiseOr => eval_bitwise_or,
        BinaryOp::BitwiseXor => eval_bitwise_xor,
        BinaryOp::LeftShift => eval_left_shift,
        BinaryOp::RightShift => eval_right_shift,
        BinaryOp::Exponentiation => eval_exponentiation,
    }
}

fn cast_error(op: BinaryOp) -> impl FnOnce(CastError) -> EvalError {
    move |e| EvalError::from(e).during(op.symbol())
}

// ============================================================================
// Logical
// ============================================================================

// Both operands are always evaluated.
fn logical(
    op: BinaryOp,
    left: &Thunk<'_>,
    right: &Thunk<'_>,
    combine: fn(bool, bool) -> bool,
) -> Result<Value, EvalError> {
    let l = left.force()?;
    let r = right.force()?;
    let l = casting::to_boolean(l).map_err(cast_error(op))?;
    let r = casting::to_boolean(r).map_err(cast_error(op))?;
    Ok(Value::Boolean(combine(l, r)))
}

fn eval_and(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    logical(BinaryOp::And, left, right, |l, r| l && r)
}

fn eval_or(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    logical(BinaryOp::Or, left, right, |l, r| l || r)
}

// ============================================================================
// Comparison
// ============================================================================

fn comparison(
    op: BinaryOp,
    left: &Thunk<'_>,
    right: &Thunk<'_>,
    accept: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let l = left.force()?;
    let r = right.force()?;
    let ordering = coercion::compare(l, r).map_err(|e| e.during(op.symbol()))?;
    Ok(Value::Boolean(accept(ordering)))
}

fn eval_equal(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    comparison(BinaryOp::Equal, left, right, Ordering::is_eq)
}

fn eval_not_equal(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    comparison(BinaryOp::NotEqual, left, right, Ordering::is_ne)
}

fn eval_lesser(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    comparison(BinaryOp::Lesser, left, right, Ordering::is_lt)
}

fn eval_lesser_or_equal(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    comparison(BinaryOp::LesserOrEqual, left, right, Ordering::is_le)
}

fn eval_greater(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    comparison(BinaryOp::Greater, left, right, Ordering::is_gt)
}

fn eval_greater_or_equal(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    comparison(BinaryOp::GreaterOrEqual, left, right, Ordering::is_ge)
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Addition, or concatenation when the left operand is a string.
fn eval_plus(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    let l = left.force()?;
    let r = right.force()?;
    if let Value::String(prefix) = l {
        let mut text = prefix.clone();
        text.push_str(&casting::to_text(r));
        return Ok(Value::String(text));
    }
    coercion::add(l, r)
}

fn eval_minus(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    coercion::subtract(left.force()?, right.force()?)
}

fn eval_times(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    coercion::multiply(left.force()?, right.force()?)
}

fn eval_div(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    coercion::divide(left.force()?, right.force()?)
}

fn eval_modulo(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    coercion::modulo(left.force()?, right.force()?)
}

fn eval_exponentiation(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    let op = BinaryOp::Exponentiation;
    let base = casting::to_float(left.force()?).map_err(cast_error(op))?;
    let exponent = casting::to_float(right.force()?).map_err(cast_error(op))?;
    Ok(Value::Float(base.powf(exponent)))
}

// ============================================================================
// Bitwise
// ============================================================================

// Operands are 16-bit unsigned; the result widens to a signed 32-bit integer.
fn bitwise(
    op: BinaryOp,
    left: &Thunk<'_>,
    right: &Thunk<'_>,
    apply: fn(i32, u16) -> i32,
) -> Result<Value, EvalError> {
    let l = casting::to_u16(left.force()?).map_err(cast_error(op))?;
    let r = casting::to_u16(right.force()?).map_err(cast_error(op))?;
    Ok(Value::Integer(i64::from(apply(i32::from(l), r))))
}

fn eval_bitwise_and(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    bitwise(BinaryOp::BitwiseAnd, left, right, |l, r| l & i32::from(r))
}

fn eval_bitwise_or(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    bitwise(BinaryOp::BitwiseOr, left, right, |l, r| l | i32::from(r))
}

fn eval_bitwise_xor(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    bitwise(BinaryOp::BitwiseXor, left, right, |l, r| l ^ i32::from(r))
}

// Shift counts use their low five bits.
fn eval_left_shift(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    bitwise(BinaryOp::LeftShift, left, right, |l, r| {
        l.wrapping_shl(u32::from(r) & 31)
    })
}

fn eval_right_shift(left: &Thunk<'_>, right: &Thunk<'_>) -> Result<Value, EvalError> {
    bitwise(BinaryOp::RightShift, left, right, |l, r| {
        l.wrapping_shr(u32::from(r) & 31)
    })
}

// ============================================================================
// Unary
// ============================================================================

pub(super) fn eval_unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    let cast_error = |e: CastError| EvalError::from(e).during(op.symbol());
    match op {
        UnaryOp::Not => Ok(Value::Boolean(!casting::to_boolean(&value).map_err(cast_error)?)),
        UnaryOp::Negate => coercion::subtract(&Value::Integer(0), &value),
        UnaryOp::BitwiseNot => {
            let bits = casting::to_u16(&value).map_err(cast_error)?;
            Ok(Value::Integer(i64::from(!bits)))
        }
        UnaryOp::Positive => Ok(value),
    }
}
