//! Expression tree model.
//!
//! The tree is a closed sum type: literal values, identifiers, unary, binary and
//! ternary operations, and function calls. The evaluator matches on it exhaustively,
//! so adding a node kind or operator is a compile error until it is handled.
//!
//! ```
//! use tally_core::ast::{BinaryOp, Expr};
//! use tally_core::api::EvaluationContext;
//! use tally_core::values::Value;
//!
//! let expr = Expr::binary(BinaryOp::Plus, Expr::value(40), Expr::ident("x"));
//! let context = EvaluationContext::new().with_parameter("x", 2);
//! assert_eq!(expr.evaluate(&context).unwrap(), Value::Integer(42));
//! ```

mod cache;
mod expr;
mod ops;

pub use expr::{BinaryExpr, Expr, FunctionCall, Identifier};
pub use ops::{BinaryOp, UnaryOp};
