//! Tree-walking evaluator for expression trees.
//!
//! The evaluator reduces an [`Expr`] to a [`Value`] by a depth-first walk. Every visit
//! returns its own result; there is no shared result slot.
//!
//! ## Design Principles
//!
//! - **Lazy operands**: binary operands are wrapped in memoizing thunks, and function
//!   arguments are handed to the implementation unevaluated, so an operand a construct
//!   never reads (the untaken branch of `if` or `?:`) is never evaluated.
//! - **Layered resolution**: identifiers and function calls consult the context's
//!   parameters, then the host hooks, then the built-in library.
//! - **Context-scoped caching**: resolutions cached on nodes are only reused by the
//!   context that produced them.
//!
//! ## Resource limits
//!
//! Recursion depth equals tree depth and is bounded only by the host's stack. The
//! evaluator cannot be interrupted; hosts that need a timeout must run it on a thread
//! of their own.
//!
//! ## Example
//!
//! ```
//! use tally_core::api::EvaluationContext;
//! use tally_core::ast::{BinaryOp, Expr};
//! use tally_core::evaluator::evaluate;
//! use tally_core::values::Value;
//!
//! let expr = Expr::binary(BinaryOp::Div, Expr::value(1), Expr::value(2));
//! let result = evaluate(&expr, &EvaluationContext::new()).unwrap();
//! assert_eq!(result, Value::Float(0.5));
//! ```

mod error;
mod eval;
mod operators;

#[cfg(test)]
mod eval_test;

pub use error::{Arity, EvalError};
pub use eval::Evaluator;
pub(crate) use operators::BinaryFn;

use crate::{api::EvaluationContext, ast::Expr, values::Value};

/// Evaluate `root` against `context`.
///
/// ## Returns
///
/// The resulting value, or the first error encountered.
pub fn evaluate(root: &Expr, context: &EvaluationContext) -> Result<Value, EvalError> {
    Evaluator::run(context, root)
}
