//! Tally - dynamically typed expression-tree evaluation
//!
//! # Overview
//!
//! Tally evaluates expression trees built by a host application: arithmetic,
//! comparisons, logic, bitwise operators, a conditional, and calls to built-in or
//! host-provided functions over scalar values. Common use cases include:
//!
//! - Pricing and scoring formulas
//! - Feature flags and conditional logic
//! - Business rules engines
//!
//! Values are dynamically typed. Operands of different types are coerced to a common
//! type before each operation, so `1 == 1.0` holds and `"foo" + 1` is `"foo1"`.
//!
//! # Quick Start
//!
//! ```
//! use tally::{BinaryOp, EvaluationContext, Expr, Value};
//!
//! // price * (1 + tax)
//! let expr = Expr::binary(
//!     BinaryOp::Times,
//!     Expr::ident("price"),
//!     Expr::binary(BinaryOp::Plus, Expr::value(1), Expr::ident("tax")),
//! );
//!
//! let context = EvaluationContext::new()
//!     .with_parameter("price", 200)
//!     .with_parameter("tax", 0.25);
//!
//! assert_eq!(expr.evaluate(&context).unwrap(), Value::Float(250.0));
//! ```
//!
//! # Host Functions
//!
//! Hooks on the context let the host supply parameters and functions the tree
//! references. Function arguments arrive unevaluated:
//!
//! ```
//! use std::rc::Rc;
//! use tally::{EvalError, EvaluationContext, Expr, FunctionArgs, FunctionDelegate, Value};
//!
//! let context = EvaluationContext::new().on_resolve_function(|name, arity| {
//!     (name == "Double" && arity == 1).then(|| {
//!         Rc::new(|args: &FunctionArgs<'_>| -> Result<Value, EvalError> {
//!             let value = args.evaluate(0)?;
//!             tally::coercion::multiply(&value, &Value::from(2))
//!         }) as FunctionDelegate
//!     })
//! });
//!
//! let expr = Expr::call("Double", [Expr::value(21)]);
//! assert_eq!(expr.evaluate(&context).unwrap(), Value::Integer(42));
//! ```

// Re-export public API from tally_core
pub use tally_core::api::{
    Argument, ContextId, EvaluateOptions, EvaluationContext, FunctionArgs, FunctionDelegate,
    NestedExpression, Parameter, ParameterProducer, Parameters,
};

// Re-export the tree model and values
pub use tally_core::ast::{BinaryOp, Expr, UnaryOp};
pub use tally_core::values::{ScalarType, Value};
pub use tally_core::{ast, casting, coercion, stdlib, values};

// Re-export errors
pub use tally_core::casting::CastError;
pub use tally_core::evaluator::{Arity, EvalError, evaluate};
