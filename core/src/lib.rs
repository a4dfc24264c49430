//! Expression-tree evaluation with dynamic typing, lazy operands and host hooks.
//!
//! Trees are built with the constructors on [`ast::Expr`] and evaluated against an
//! [`api::EvaluationContext`].

pub mod api;
pub mod ast;
pub mod casting;
pub mod coercion;
pub mod evaluator;
pub mod stdlib;
pub mod values;
