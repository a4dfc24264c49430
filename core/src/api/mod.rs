//! Public API for evaluating expression trees.
//!
//! An [`EvaluationContext`] bundles the three inputs an evaluation needs besides the
//! tree itself: [`EvaluateOptions`], a [`Parameters`] mapping and optional host
//! [hooks](hooks).
//!
//! # Example
//!
//! ```
//! use tally_core::api::{EvaluateOptions, EvaluationContext};
//! use tally_core::ast::{BinaryOp, Expr};
//! use tally_core::values::Value;
//!
//! // Round(price * 1.2, 2)
//! let expr = Expr::call(
//!     "round",
//!     [
//!         Expr::binary(BinaryOp::Times, Expr::ident("price"), Expr::value(1.2)),
//!         Expr::value(2),
//!     ],
//! );
//!
//! let context = EvaluationContext::new()
//!     .with_options(EvaluateOptions::IGNORE_CASE)
//!     .with_parameter("price", 10.0);
//!
//! assert_eq!(expr.evaluate(&context).unwrap(), Value::Float(12.0));
//! ```

mod context;
pub mod hooks;
mod options;
mod parameters;

pub use context::{ContextId, EvaluationContext};
pub use hooks::{
    Argument, EvaluateFunctionHook, EvaluateParameterHook, FunctionArgs, FunctionDelegate, Hooks,
    ParameterProducer, ResolveFunctionHook, ResolveParameterHook,
};
pub use options::EvaluateOptions;
pub use parameters::{NestedExpression, Parameter, Parameters};
