#![allow(dead_code)]

use pretty_assertions::assert_eq;
use tally::{BinaryOp, EvalError, EvaluationContext, Expr, UnaryOp, Value};

pub struct TestCase {
    pub name: &'static str,
    pub expr: Expr,
    pub expected: Result<Value, EvalError>,
}

impl TestCase {
    pub fn ok(name: &'static str, expr: Expr, expected: impl Into<Value>) -> Self {
        Self {
            name,
            expr,
            expected: Ok(expected.into()),
        }
    }

    pub fn err(name: &'static str, expr: Expr, expected: EvalError) -> Self {
        Self {
            name,
            expr,
            expected: Err(expected),
        }
    }
}

/// Evaluate every case against `context` and compare with its expectation.
pub fn check(cases: &[TestCase], context: &EvaluationContext) {
    for case in cases {
        let actual = case.expr.evaluate(context);
        assert_eq!(actual, case.expected, "case `{}`", case.name);
    }
}

pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::value(value)
}

pub fn var(name: &str) -> Expr {
    Expr::ident(name)
}

pub fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(op, left, right)
}

pub fn neg(operand: Expr) -> Expr {
    Expr::unary(UnaryOp::Negate, operand)
}

pub fn call<const N: usize>(name: &str, arguments: [Expr; N]) -> Expr {
    Expr::call(name, arguments)
}

/// Identifier no test binds; evaluating it fails.
pub fn poison() -> Expr {
    Expr::ident("poison")
}
