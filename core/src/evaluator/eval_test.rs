//! Unit tests for the evaluator.

use std::{cell::Cell, cell::RefCell, rc::Rc};

use super::*;
use crate::{
    api::{
        EvaluateOptions, FunctionArgs, FunctionDelegate, NestedExpression, Parameter,
        ParameterProducer, Parameters,
    },
    ast::{BinaryOp, UnaryOp},
    test_utils,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn run(expr: &Expr) -> Result<Value, EvalError> {
    evaluate(expr, &EvaluationContext::new())
}

fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(op, left, right)
}

/// Fails with an unbound-parameter error if it is ever evaluated.
fn poison() -> Expr {
    Expr::ident("poison")
}

fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

fn bump(count: &Cell<usize>) {
    count.set(count.get() + 1);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_division_always_produces_float() {
    assert_eq!(run(&bin(BinaryOp::Div, Expr::value(1), Expr::value(2))).unwrap(), Value::Float(0.5));
    assert_eq!(run(&bin(BinaryOp::Div, Expr::value(1.0), Expr::value(2))).unwrap(), Value::Float(0.5));
    assert_eq!(run(&bin(BinaryOp::Div, Expr::value(4), Expr::value(2))).unwrap(), Value::Float(2.0));
}

#[test]
fn test_integer_division_by_zero_is_infinite() {
    assert_eq!(
        run(&bin(BinaryOp::Div, Expr::value(1), Expr::value(0))).unwrap(),
        Value::Float(f64::INFINITY)
    );
}

#[test]
fn test_decimal_division_by_zero_fails() {
    let expr = bin(BinaryOp::Div, Expr::value(Decimal::ONE), Expr::value(0));
    assert_eq!(
        run(&expr).unwrap_err(),
        EvalError::DivisionByZero {
            operation: "/".into()
        }
    );
}

#[test]
fn test_integer_modulo_by_zero_fails() {
    let expr = bin(BinaryOp::Modulo, Expr::value(7), Expr::value(0));
    assert!(matches!(run(&expr).unwrap_err(), EvalError::DivisionByZero { .. }));
}

#[test]
fn test_integer_arithmetic_wraps() {
    let expr = bin(BinaryOp::Plus, Expr::value(i64::MAX), Expr::value(1));
    assert_eq!(run(&expr).unwrap(), Value::Integer(i64::MIN));
}

#[test]
fn test_mixed_arithmetic_widens() {
    assert_eq!(
        run(&bin(BinaryOp::Times, Expr::value(2), Expr::value(1.5))).unwrap(),
        Value::Float(3.0)
    );
    assert_eq!(
        run(&bin(BinaryOp::Minus, Expr::value(Decimal::new(15, 1)), Expr::value(1))).unwrap(),
        Value::Decimal(Decimal::new(5, 1))
    );
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        run(&bin(BinaryOp::Plus, Expr::value("foo"), Expr::value(1))).unwrap(),
        Value::from("foo1")
    );
}

#[test]
fn test_arithmetic_rejects_booleans() {
    let err = run(&bin(BinaryOp::Times, Expr::value(true), Expr::value(2))).unwrap_err();
    assert!(matches!(
        err,
        EvalError::TypeCoercion { ref operation, .. } if operation.as_deref() == Some("*")
    ));
}

#[test]
fn test_logical_operators_evaluate_both_sides() {
    let and = bin(BinaryOp::And, Expr::value(false), poison());
    assert_eq!(
        run(&and).unwrap_err(),
        EvalError::UnboundParameter {
            name: "poison".into()
        }
    );

    let or = bin(BinaryOp::Or, Expr::value(true), poison());
    assert!(run(&or).is_err());
}

#[test]
fn test_operands_are_evaluated_left_to_right() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let seen = order.clone();
    let context = EvaluationContext::new().on_evaluate_parameter(move |name| {
        seen.borrow_mut().push(name.to_string());
        Some(Value::from(1))
    });

    let expr = bin(BinaryOp::Plus, Expr::ident("left"), Expr::ident("right"));
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(2));
    assert_eq!(*order.borrow(), vec!["left".to_string(), "right".to_string()]);
}

#[test]
fn test_unary_operators() {
    assert_eq!(run(&Expr::unary(UnaryOp::Negate, Expr::value(3))).unwrap(), Value::Integer(-3));
    assert_eq!(run(&Expr::unary(UnaryOp::Not, Expr::value(false))).unwrap(), Value::Boolean(true));
    assert_eq!(
        run(&Expr::unary(UnaryOp::BitwiseNot, Expr::value(0xFF00))).unwrap(),
        Value::Integer(0x00FF)
    );
}

#[test]
fn test_exponentiation_of_negative_base_with_fractional_exponent_is_nan() {
    let expr = bin(BinaryOp::Exponentiation, Expr::value(-8), Expr::value(0.5));
    let Value::Float(result) = run(&expr).unwrap() else {
        panic!("expected a float");
    };
    assert!(result.is_nan());
}

// ============================================================================
// Ternary
// ============================================================================

#[test]
fn test_ternary_evaluates_only_selected_branch() {
    let expr = Expr::ternary(Expr::value(true), Expr::value("yes"), poison());
    assert_eq!(run(&expr).unwrap(), Value::from("yes"));

    let expr = Expr::ternary(Expr::value(0), poison(), Expr::value("no"));
    assert_eq!(run(&expr).unwrap(), Value::from("no"));
}

#[test]
fn test_ternary_condition_must_be_boolean() {
    let expr = Expr::ternary(Expr::value("maybe"), Expr::value(1), Expr::value(2));
    assert!(matches!(
        run(&expr).unwrap_err(),
        EvalError::TypeCoercion { ref operation, .. } if operation.as_deref() == Some("?:")
    ));
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_unbound_parameter() {
    let err = run(&Expr::ident("missing")).unwrap_err();
    assert_eq!(err.to_string(), "Parameter 'missing' was not defined");
}

#[test]
fn test_same_tree_with_different_parameters() {
    let expr = bin(BinaryOp::Times, Expr::ident("x"), Expr::value(10));

    let first = EvaluationContext::new().with_parameter("x", 1);
    let second = EvaluationContext::new().with_parameter("x", 2);
    assert_eq!(evaluate(&expr, &first).unwrap(), Value::Integer(10));
    assert_eq!(evaluate(&expr, &second).unwrap(), Value::Integer(20));
    assert_eq!(evaluate(&expr, &first).unwrap(), Value::Integer(10));
}

#[test]
fn test_parameter_changes_are_seen_by_the_same_context() {
    let expr = Expr::ident("x");
    let mut context = EvaluationContext::new().with_parameter("x", 1);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(1));

    context.parameters_mut().insert("x", 2);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(2));
}

#[test]
fn test_parameters_win_over_hooks() {
    let asked = counter();
    let seen = asked.clone();
    let context = EvaluationContext::new()
        .with_parameter("x", 1)
        .on_evaluate_parameter(move |_| {
            bump(&seen);
            Some(Value::from(99))
        });

    assert_eq!(evaluate(&Expr::ident("x"), &context).unwrap(), Value::Integer(1));
    assert_eq!(asked.get(), 0);
}

#[test]
fn test_nested_expression_parameter() {
    let doubled = Parameter::expression(bin(BinaryOp::Times, Expr::ident("x"), Expr::value(2)));
    let context = EvaluationContext::new()
        .with_parameter("x", 3)
        .with_parameter("doubled", doubled);

    let expr = bin(BinaryOp::Plus, Expr::ident("doubled"), Expr::value(1));
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(7));
}

#[test]
fn test_nested_parameters_shadow_outer_ones() {
    let nested = NestedExpression::new(bin(BinaryOp::Plus, Expr::ident("x"), Expr::ident("y")))
        .with_parameter("x", 10);
    let context = EvaluationContext::new()
        .with_parameter("x", 1)
        .with_parameter("y", 5)
        .with_parameter("total", nested);

    assert_eq!(evaluate(&Expr::ident("total"), &context).unwrap(), Value::Integer(15));
    assert_eq!(evaluate(&Expr::ident("x"), &context).unwrap(), Value::Integer(1));
}

#[test]
fn test_nested_expressions_can_refer_to_each_other() {
    let context = EvaluationContext::new()
        .with_parameter("a", Parameter::expression(bin(BinaryOp::Plus, Expr::ident("b"), Expr::value(1))))
        .with_parameter("b", Parameter::expression(bin(BinaryOp::Times, Expr::ident("c"), Expr::value(2))))
        .with_parameter("c", 4);

    let expr = bin(BinaryOp::Plus, Expr::ident("a"), Expr::ident("b"));
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(17));
}

#[test]
fn test_circular_nested_expressions_fail() {
    test_utils::init_test_logging();

    let context = EvaluationContext::new()
        .with_parameter("a", Parameter::expression(bin(BinaryOp::Plus, Expr::ident("b"), Expr::value(1))))
        .with_parameter("b", Parameter::expression(bin(BinaryOp::Times, Expr::ident("a"), Expr::value(2))));

    assert_eq!(
        evaluate(&Expr::ident("a"), &context).unwrap_err(),
        EvalError::CircularParameter { name: "a".into() }
    );
}

#[test]
fn test_nested_expression_may_bind_its_own_name() {
    let nested = NestedExpression::new(Expr::ident("n")).with_parameter("n", 5);
    let context = EvaluationContext::new().with_parameter("n", nested);
    assert_eq!(evaluate(&Expr::ident("n"), &context).unwrap(), Value::Integer(5));
}

// ============================================================================
// Parameter hooks
// ============================================================================

#[test]
fn test_resolve_parameter_is_cached_per_context() {
    let resolved = counter();
    let seen = resolved.clone();
    let context = EvaluationContext::new().on_resolve_parameter(move |name| {
        bump(&seen);
        let name = name.to_string();
        Some(Rc::new(move || Some(Value::from(name.len() as i64))) as ParameterProducer)
    });

    let expr = Expr::ident("abc");
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(3));
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(3));
    assert_eq!(resolved.get(), 1);

    // The same hooks under a fresh identity resolve again.
    let other = context.clone().with_options(EvaluateOptions::empty());
    assert_eq!(evaluate(&expr, &other).unwrap(), Value::Integer(3));
    assert_eq!(resolved.get(), 2);
}

#[test]
fn test_resolve_parameter_results_do_not_leak_between_contexts() {
    let expr = Expr::ident("rate");

    let producing = |value: i64| {
        EvaluationContext::new().on_resolve_parameter(move |_| {
            Some(Rc::new(move || Some(Value::from(value))) as ParameterProducer)
        })
    };
    let first = producing(1);
    let second = producing(2);

    assert_eq!(evaluate(&expr, &first).unwrap(), Value::Integer(1));
    assert_eq!(evaluate(&expr, &second).unwrap(), Value::Integer(2));
    assert_eq!(evaluate(&expr, &first).unwrap(), Value::Integer(1));
}

#[test]
fn test_no_cache_resolves_every_time() {
    let resolved = counter();
    let seen = resolved.clone();
    let context = EvaluationContext::new()
        .with_options(EvaluateOptions::NO_CACHE)
        .on_resolve_parameter(move |_| {
            bump(&seen);
            Some(Rc::new(|| Some(Value::from(1))) as ParameterProducer)
        });

    let expr = Expr::ident("x");
    for _ in 0..3 {
        assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(1));
    }
    assert_eq!(resolved.get(), 3);
}

#[test]
fn test_producer_is_called_on_every_evaluation() {
    let produced = counter();
    let seen = produced.clone();
    let context = EvaluationContext::new().on_resolve_parameter(move |_| {
        let seen = seen.clone();
        Some(Rc::new(move || {
            bump(&seen);
            Some(Value::from(seen.get() as i64))
        }) as ParameterProducer)
    });

    let expr = Expr::ident("tick");
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(1));
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(2));
    assert_eq!(produced.get(), 2);
}

#[test]
fn test_declined_resolution_falls_back_to_evaluate_hook() {
    let context = EvaluationContext::new()
        .on_resolve_parameter(|name| {
            (name == "known").then(|| Rc::new(|| None::<Value>) as ParameterProducer)
        })
        .on_evaluate_parameter(|name| Some(Value::from(name)));

    // A producer that yields nothing and a declined resolution both fall through.
    assert_eq!(evaluate(&Expr::ident("known"), &context).unwrap(), Value::from("known"));
    assert_eq!(evaluate(&Expr::ident("other"), &context).unwrap(), Value::from("other"));
}

#[test]
fn test_evaluate_parameter_is_asked_every_time() {
    let asked = counter();
    let seen = asked.clone();
    let context = EvaluationContext::new().on_evaluate_parameter(move |_| {
        bump(&seen);
        Some(Value::from(true))
    });

    let expr = Expr::ident("flag");
    evaluate(&expr, &context).unwrap();
    evaluate(&expr, &context).unwrap();
    assert_eq!(asked.get(), 2);
}

#[test]
fn test_cloned_tree_starts_with_empty_caches() {
    let resolved = counter();
    let seen = resolved.clone();
    let context = EvaluationContext::new().on_resolve_parameter(move |_| {
        bump(&seen);
        Some(Rc::new(|| Some(Value::from(1))) as ParameterProducer)
    });

    let expr = Expr::ident("x");
    evaluate(&expr, &context).unwrap();
    evaluate(&expr.clone(), &context).unwrap();
    assert_eq!(resolved.get(), 2);

    expr.reset_caches();
    evaluate(&expr, &context).unwrap();
    assert_eq!(resolved.get(), 3);
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_builtin_name_is_case_sensitive_by_default() {
    let expr = Expr::call("ABS", [Expr::value(-1)]);
    let err = run(&expr).unwrap_err();
    assert_eq!(
        err,
        EvalError::UnknownFunction {
            name: "ABS".into(),
            suggestion: Some("Abs"),
        }
    );

    let context = EvaluationContext::new().with_options(EvaluateOptions::IGNORE_CASE);
    assert_eq!(
        evaluate(&expr, &context).unwrap(),
        Value::Decimal(Decimal::ONE)
    );
}

#[test]
fn test_builtin_arity_is_checked() {
    let err = run(&Expr::call("Abs", Vec::new())).unwrap_err();
    assert_eq!(
        err,
        EvalError::Arity {
            function: "Abs",
            expected: Arity::Exactly(1),
            found: 0,
        }
    );
}

#[test]
fn test_unknown_function() {
    let err = run(&Expr::call("Frobnicate", [Expr::value(1)])).unwrap_err();
    assert_eq!(err.to_string(), "Function not found Frobnicate");
}

#[test]
fn test_in_builtin() {
    let haystack = |needle: i64| {
        Expr::call(
            "in",
            [Expr::value(needle), Expr::value(1), Expr::value(2), Expr::value(3)],
        )
    };
    assert_eq!(run(&haystack(3)).unwrap(), Value::Boolean(true));
    assert_eq!(run(&haystack(4)).unwrap(), Value::Boolean(false));
    assert_eq!(run(&Expr::call("in", [Expr::value(3)])).unwrap(), Value::Boolean(false));
}

#[test]
fn test_if_builtin_never_evaluates_untaken_branch() {
    let taken = Expr::call("if", [Expr::value(true), Expr::value(1), poison()]);
    assert_eq!(run(&taken).unwrap(), Value::Integer(1));

    let taken = Expr::call("if", [Expr::value(false), poison(), Expr::value(2)]);
    assert_eq!(run(&taken).unwrap(), Value::Integer(2));
}

#[test]
fn test_round_midpoint_rules() {
    let expr = Expr::call("Round", [Expr::value(2.5), Expr::value(0)]);
    assert_eq!(run(&expr).unwrap(), Value::Float(2.0));

    let context = EvaluationContext::new().with_options(EvaluateOptions::ROUND_AWAY_FROM_ZERO);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Float(3.0));
}

#[test]
fn test_delegate_receives_lazy_arguments() {
    let context = EvaluationContext::new().on_resolve_function(|name, arity| {
        (name == "First" && arity == 2).then(|| {
            Rc::new(|args: &FunctionArgs<'_>| args.evaluate(0)) as FunctionDelegate
        })
    });

    let expr = Expr::call("First", [Expr::value("kept"), poison()]);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::from("kept"));
}

#[test]
fn test_delegate_overrides_builtin_and_is_resolved_once() {
    let resolved = counter();
    let seen = resolved.clone();
    let context = EvaluationContext::new().on_resolve_function(move |name, _| {
        bump(&seen);
        (name == "Abs").then(|| Rc::new(|_: &FunctionArgs<'_>| Ok::<_, EvalError>(Value::from(-1))) as FunctionDelegate)
    });

    let expr = Expr::call("Abs", [Expr::value(5)]);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(-1));
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(-1));
    assert_eq!(resolved.get(), 1);
}

#[test]
fn test_delegate_sees_call_site_parameters() {
    let context = EvaluationContext::new()
        .with_parameter("scale", 3)
        .on_resolve_function(|name, _| {
            (name == "Scaled").then(|| {
                Rc::new(|args: &FunctionArgs<'_>| -> Result<Value, EvalError> {
                    let scale = match args.parameters().get("scale") {
                        Some(Parameter::Value(value)) => value.clone(),
                        _ => return Err(EvalError::host("scale is not set")),
                    };
                    crate::coercion::multiply(&args.evaluate(0)?, &scale)
                }) as FunctionDelegate
            })
        });

    let expr = Expr::call("Scaled", [Expr::value(4)]);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(12));
}

#[test]
fn test_delegate_errors_propagate() {
    let context = EvaluationContext::new().on_resolve_function(|_, _| {
        Some(Rc::new(|_: &FunctionArgs<'_>| Err::<Value, _>(EvalError::host("service unavailable"))) as FunctionDelegate)
    });

    let err = evaluate(&Expr::call("Lookup", Vec::new()), &context).unwrap_err();
    assert_eq!(err, EvalError::host("service unavailable"));
    assert_eq!(err.to_string(), "service unavailable");
}

#[test]
fn test_hook_names_are_lower_cased_when_ignoring_case() {
    let names = Rc::new(RefCell::new(Vec::new()));
    let seen = names.clone();
    let context = EvaluationContext::new()
        .with_options(EvaluateOptions::IGNORE_CASE)
        .on_resolve_function(move |name, _| {
            seen.borrow_mut().push(name.to_string());
            None
        });

    let expr = Expr::call("MAX", [Expr::value(1), Expr::value(2)]);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Integer(2));
    assert_eq!(*names.borrow(), vec!["max".to_string()]);
}

#[test]
fn test_evaluate_function_hook_runs_before_builtins() {
    let context = EvaluationContext::new().on_evaluate_function(|name, args| {
        if name == "Sqrt" {
            Ok(Some(Value::from(format!("sqrt of {} args", args.len()))))
        } else {
            Ok(None)
        }
    });

    let expr = Expr::call("Sqrt", [Expr::value(4)]);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::from("sqrt of 1 args"));

    let expr = Expr::call("Pow", [Expr::value(2), Expr::value(2)]);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Float(4.0));
}

#[test]
fn test_bound_builtin_skips_evaluate_function_hook() {
    let asked = counter();
    let seen = asked.clone();
    let context = EvaluationContext::new().on_evaluate_function(move |_, _| {
        bump(&seen);
        Ok(None)
    });

    let expr = Expr::call("Floor", [Expr::value(1.5)]);
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Float(1.0));
    assert_eq!(evaluate(&expr, &context).unwrap(), Value::Float(1.0));
    assert_eq!(asked.get(), 1);

    let uncached = context.clone().with_options(EvaluateOptions::NO_CACHE);
    evaluate(&expr, &uncached).unwrap();
    evaluate(&expr, &uncached).unwrap();
    assert_eq!(asked.get(), 3);
}

#[test]
fn test_evaluate_function_hook_errors_propagate() {
    let context = EvaluationContext::new()
        .on_evaluate_function(|name, _| Err(EvalError::host(format!("{} is disabled", name))));

    let err = evaluate(&Expr::call("Abs", [Expr::value(1)]), &context).unwrap_err();
    assert_eq!(err.to_string(), "Abs is disabled");
}

#[test]
fn test_function_inside_nested_expression() {
    let nested = NestedExpression::new(Expr::call("Max", [Expr::ident("a"), Expr::ident("b")]))
        .with_parameter("a", 7);
    let parameters: Parameters = [("b", Parameter::from(9)), ("biggest", Parameter::from(nested))]
        .into_iter()
        .collect();
    let context = EvaluationContext::new().with_parameters(parameters);

    assert_eq!(evaluate(&Expr::ident("biggest"), &context).unwrap(), Value::Integer(9));
}
