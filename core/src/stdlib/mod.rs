//! Built-in Function Library
//!
//! Functions available to every expression unless a host hook overrides them:
//! - Math: numeric functions (`Abs`, `Round`, `Pow`, `Max`, ...)
//! - Logic: functions with lazy arguments (`if`, `in`)
//!
//! Built-ins are looked up by name after the host hooks had their chance. Matching is
//! case-insensitive only when [`EvaluateOptions::IGNORE_CASE`] is set; otherwise a call
//! spelled differently from the canonical name fails with a suggestion.

use hashbrown::HashMap;
use lazy_static::lazy_static;

use crate::{
    api::{EvaluateOptions, FunctionArgs},
    evaluator::{Arity, EvalError},
    values::Value,
};

pub mod logic;
pub mod math;

/// Signature shared by every built-in.
pub type BuiltinFn = fn(&FunctionArgs<'_>) -> Result<Value, EvalError>;

/// A function of the built-in library.
pub struct Builtin {
    name: &'static str,
    arity: Arity,
    call: BuiltinFn,
}

impl Builtin {
    pub(crate) const fn new(name: &'static str, arity: Arity, call: BuiltinFn) -> Self {
        Self { name, arity, call }
    }

    /// Canonical spelling.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn invoke(&self, args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
        (self.call)(args)
    }
}

impl core::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

lazy_static! {
    /// Every built-in, keyed by lower-cased name.
    static ref REGISTRY: HashMap<String, &'static Builtin> = math::FUNCTIONS
        .iter()
        .chain(logic::FUNCTIONS)
        .map(|builtin| (builtin.name.to_lowercase(), builtin))
        .collect();
}

/// Iterate over all built-ins.
pub fn builtins() -> impl Iterator<Item = &'static Builtin> {
    math::FUNCTIONS.iter().chain(logic::FUNCTIONS)
}

/// Find the built-in a call refers to and check its argument count.
///
/// ## Errors
///
/// - [`EvalError::UnknownFunction`] when no built-in has that name, or when matching is
///   case-sensitive and the spelling differs from the canonical one.
/// - [`EvalError::Arity`] when the built-in does not accept `argc` arguments.
pub fn resolve(
    name: &str,
    argc: usize,
    options: EvaluateOptions,
) -> Result<&'static Builtin, EvalError> {
    let unknown = |suggestion| EvalError::UnknownFunction {
        name: name.into(),
        suggestion,
    };

    let builtin = *REGISTRY
        .get(name.to_lowercase().as_str())
        .ok_or_else(|| unknown(None))?;

    if !options.ignore_case() && builtin.name != name {
        return Err(unknown(Some(builtin.name)));
    }

    if !builtin.arity.accepts(argc) {
        return Err(EvalError::Arity {
            function: builtin.name,
            expected: builtin.arity,
            found: argc,
        });
    }

    Ok(builtin)
}

/// Evaluate argument `index` of a built-in, tagging coercion failures with its name.
pub(crate) fn convert<T>(
    args: &FunctionArgs<'_>,
    index: usize,
    function: &str,
    cast: fn(&Value) -> Result<T, crate::casting::CastError>,
) -> Result<T, EvalError> {
    let value = args.evaluate(index)?;
    cast(&value).map_err(|e| EvalError::from(e).during(function))
}
