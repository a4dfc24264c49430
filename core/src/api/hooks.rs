//! Host extension points.
//!
//! A host can supply values for parameters and implementations for functions the tree
//! references. Each kind comes in two flavors:
//!
//! - **resolve** hooks are asked once per node and evaluation context; what they return
//!   (a value producer or a function delegate, or nothing) is cached on the node and
//!   reused by later evaluations with the same context.
//! - **evaluate** hooks are asked on every evaluation that reaches them.
//!
//! The evaluator consults the resolve hook first, then the evaluate hook, then its own
//! fallbacks (built-in functions, or an unbound-parameter error).

use std::rc::Rc;

use smallvec::SmallVec;

use crate::{
    api::{EvaluateOptions, Parameters},
    ast::Expr,
    evaluator::{EvalError, Evaluator},
    values::Value,
};

/// Produces a parameter's value on demand. `None` means "no usable value".
pub type ParameterProducer = Rc<dyn Fn() -> Option<Value>>;

/// A host implementation of a function. Arguments are evaluated lazily through
/// [`FunctionArgs`].
pub type FunctionDelegate = Rc<dyn Fn(&FunctionArgs<'_>) -> Result<Value, EvalError>>;

pub type ResolveParameterHook = Rc<dyn Fn(&str) -> Option<ParameterProducer>>;
pub type EvaluateParameterHook = Rc<dyn Fn(&str) -> Option<Value>>;
pub type ResolveFunctionHook = Rc<dyn Fn(&str, usize) -> Option<FunctionDelegate>>;
pub type EvaluateFunctionHook =
    Rc<dyn Fn(&str, &FunctionArgs<'_>) -> Result<Option<Value>, EvalError>>;

/// The set of hooks registered on a context. Every hook is optional.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) resolve_parameter: Option<ResolveParameterHook>,
    pub(crate) evaluate_parameter: Option<EvaluateParameterHook>,
    pub(crate) resolve_function: Option<ResolveFunctionHook>,
    pub(crate) evaluate_function: Option<EvaluateFunctionHook>,
}

impl core::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hooks")
            .field("resolve_parameter", &self.resolve_parameter.is_some())
            .field("evaluate_parameter", &self.evaluate_parameter.is_some())
            .field("resolve_function", &self.resolve_function.is_some())
            .field("evaluate_function", &self.evaluate_function.is_some())
            .finish()
    }
}

/// One unevaluated function argument.
///
/// Evaluating it runs the argument's sub-tree against the parameters, options and hooks
/// of the call site. Nothing is evaluated until [`Argument::evaluate`] is called.
#[derive(Clone, Copy)]
pub struct Argument<'a> {
    expr: &'a Expr,
    evaluator: Evaluator<'a>,
}

impl<'a> Argument<'a> {
    pub fn evaluate(&self) -> Result<Value, EvalError> {
        self.evaluator.eval(self.expr)
    }

    pub fn expression(&self) -> &'a Expr {
        self.expr
    }
}

/// Arguments of a function call, handed to delegates, hooks and built-ins.
pub struct FunctionArgs<'a> {
    name: &'a str,
    arguments: SmallVec<[Argument<'a>; 4]>,
    evaluator: Evaluator<'a>,
}

impl<'a> FunctionArgs<'a> {
    pub(crate) fn new(name: &'a str, expressions: &'a [Expr], evaluator: Evaluator<'a>) -> Self {
        Self {
            name,
            arguments: expressions
                .iter()
                .map(|expr| Argument { expr, evaluator })
                .collect(),
            evaluator,
        }
    }

    /// Name of the called function, as written at the call site.
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Argument<'a>> {
        self.arguments.get(index)
    }

    /// Evaluate the argument at `index`.
    ///
    /// ## Errors
    ///
    /// [`EvalError::MissingArgument`] when the call has no argument at `index`, or any
    /// error raised while evaluating it.
    pub fn evaluate(&self, index: usize) -> Result<Value, EvalError> {
        self.arguments
            .get(index)
            .ok_or_else(|| EvalError::MissingArgument {
                function: self.name.into(),
                index,
            })?
            .evaluate()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument<'a>> {
        self.arguments.iter()
    }

    /// Parameters visible at the call site (innermost scope).
    pub fn parameters(&self) -> &'a Parameters {
        self.evaluator.parameters()
    }

    pub fn options(&self) -> EvaluateOptions {
        self.evaluator.options()
    }
}
