//! Logic Functions
//!
//! Functions: if, in
//!
//! Both are spelled in lower case and evaluate their arguments lazily: `if` evaluates
//! the condition and then only the selected branch, and `in` evaluates candidates until
//! one matches.

use crate::{
    api::FunctionArgs,
    casting::to_boolean,
    coercion,
    evaluator::{Arity, EvalError},
    stdlib::{Builtin, convert},
    values::Value,
};

pub(super) static FUNCTIONS: &[Builtin] = &[
    Builtin::new("if", Arity::Exactly(3), logic_if),
    Builtin::new("in", Arity::AtLeast(1), logic_in),
];

/// `if(condition, then, else)`
fn logic_if(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    if convert(args, 0, "if", to_boolean)? {
        args.evaluate(1)
    } else {
        args.evaluate(2)
    }
}

/// `in(value, candidates...)`: whether any candidate compares equal to the value.
fn logic_in(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let needle = args.evaluate(0)?;
    for candidate in args.iter().skip(1) {
        let candidate = candidate.evaluate()?;
        if coercion::compare(&needle, &candidate).map_err(|e| e.during("in"))?.is_eq() {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}
