//! Core evaluation logic.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::{
    api::{
        EvaluateOptions, EvaluationContext, FunctionArgs, FunctionDelegate, NestedExpression,
        Parameter, ParameterProducer, Parameters,
    },
    ast::{Expr, FunctionCall, Identifier},
    casting,
    evaluator::{
        EvalError,
        operators::{self, Thunk},
    },
    stdlib,
    values::Value,
};

/// One level of parameter bindings.
///
/// The root scope holds the context's parameters. Evaluating a nested-expression
/// parameter pushes a scope holding that expression's own parameters, whose lookups
/// fall back to the scope it was referenced from.
struct Scope<'a> {
    parameters: &'a Parameters,
    parent: Option<&'a Scope<'a>>,
    /// The nested expression this scope was pushed to evaluate.
    expanding: Option<&'a NestedExpression>,
}

impl<'a> Scope<'a> {
    fn lookup(&self, name: &str) -> Option<&'a Parameter> {
        match self.parameters.get(name) {
            Some(parameter) => Some(parameter),
            None => self.parent.and_then(|parent| parent.lookup(name)),
        }
    }

    fn is_expanding(&self, nested: &NestedExpression) -> bool {
        self.expanding.is_some_and(|current| core::ptr::eq(current, nested))
            || self.parent.is_some_and(|parent| parent.is_expanding(nested))
    }
}

/// Evaluator for expression trees.
///
/// Cheap to copy: it only borrows the context and the current scope.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    context: &'a EvaluationContext,
    scope: &'a Scope<'a>,
}

impl<'a> Evaluator<'a> {
    /// Evaluate `expr` in the root scope of `context`.
    pub fn run(context: &EvaluationContext, expr: &Expr) -> Result<Value, EvalError> {
        let scope = Scope {
            parameters: context.parameters(),
            parent: None,
            expanding: None,
        };
        Evaluator {
            context,
            scope: &scope,
        }
        .eval(expr)
    }

    pub fn options(&self) -> EvaluateOptions {
        self.context.options()
    }

    /// Parameters of the innermost scope.
    pub fn parameters(&self) -> &'a Parameters {
        self.scope.parameters
    }

    /// Evaluate an expression node.
    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Value(value) => Ok(value.clone()),

            Expr::Identifier(ident) => self.eval_identifier(ident),

            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                operators::eval_unary(*op, value)
            }

            Expr::Binary(binary) => {
                let operator = binary
                    .operator
                    .get_or_init(|| operators::binary_fn(binary.op));
                let left = Thunk::new(*self, &binary.left);
                let right = Thunk::new(*self, &binary.right);
                operator(&left, &right)
            }

            Expr::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                let condition = self.eval(condition)?;
                let condition = casting::to_boolean(&condition)
                    .map_err(|e| EvalError::from(e).during("?:"))?;

                // Only the selected branch is evaluated.
                if condition {
                    self.eval(if_true)
                } else {
                    self.eval(if_false)
                }
            }

            Expr::Function(call) => self.eval_function(call),
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn eval_identifier(&self, ident: &Identifier) -> Result<Value, EvalError> {
        let name = ident.name();

        if let Some(parameter) = self.scope.lookup(name) {
            return match parameter {
                Parameter::Value(value) => Ok(value.clone()),
                Parameter::Expression(nested) => self.eval_nested(name, nested),
            };
        }

        if let Some(producer) = self.resolve_parameter(ident) {
            if let Some(value) = producer() {
                return Ok(value);
            }
            trace!(name, "resolved parameter produced no value");
        }

        if let Some(hook) = &self.context.hooks().evaluate_parameter {
            trace!(name, "asking evaluate_parameter hook");
            if let Some(value) = hook(name) {
                return Ok(value);
            }
        }

        debug!(name, "parameter is not defined");
        Err(EvalError::UnboundParameter { name: name.into() })
    }

    /// Producer for an identifier the parameters do not bind, asking the host's resolve
    /// hook at most once per node and context.
    fn resolve_parameter(&self, ident: &Identifier) -> Option<ParameterProducer> {
        let id = self.context.id();
        let use_cache = self.options().use_cache();

        if use_cache {
            if let Some(cached) = ident.resolution.get(id) {
                trace!(name = ident.name(), "parameter resolution cache hit");
                return cached;
            }
        }

        let producer = self
            .context
            .hooks()
            .resolve_parameter
            .as_ref()
            .and_then(|hook| {
                trace!(name = ident.name(), "asking resolve_parameter hook");
                hook(ident.name())
            });

        if use_cache {
            ident.resolution.set(id, producer.clone());
        }
        producer
    }

    fn eval_nested(&self, name: &str, nested: &NestedExpression) -> Result<Value, EvalError> {
        if self.scope.is_expanding(nested) {
            return Err(EvalError::CircularParameter { name: name.into() });
        }

        let scope = Scope {
            parameters: nested.parameters(),
            parent: Some(self.scope),
            expanding: Some(nested),
        };
        Evaluator {
            context: self.context,
            scope: &scope,
        }
        .eval(nested.expr())
    }

    // ========================================================================
    // Function calls
    // ========================================================================

    fn eval_function(&self, call: &FunctionCall) -> Result<Value, EvalError> {
        let args = FunctionArgs::new(call.name(), call.arguments(), *self);

        if let Some(delegate) = self.resolve_function(call) {
            return delegate(&args);
        }

        let id = self.context.id();
        let use_cache = self.options().use_cache();

        if use_cache {
            if let Some(builtin) = call.builtin.get(id) {
                return builtin.invoke(&args);
            }
        }

        if let Some(hook) = &self.context.hooks().evaluate_function {
            let name = self.hook_name(call.name());
            trace!(name = %name, "asking evaluate_function hook");
            if let Some(value) = hook(&*name, &args)? {
                return Ok(value);
            }
        }

        let builtin = stdlib::resolve(call.name(), call.arguments().len(), self.options())?;
        debug!(name = call.name(), builtin = builtin.name(), "bound built-in function");
        if use_cache {
            call.builtin.set(id, builtin);
        }
        builtin.invoke(&args)
    }

    /// Delegate for a function call, asking the host's resolve hook at most once per
    /// node and context.
    fn resolve_function(&self, call: &FunctionCall) -> Option<FunctionDelegate> {
        let id = self.context.id();
        let use_cache = self.options().use_cache();

        if use_cache {
            if let Some(cached) = call.delegate.get(id) {
                trace!(name = call.name(), "function resolution cache hit");
                return cached;
            }
        }

        let delegate = self
            .context
            .hooks()
            .resolve_function
            .as_ref()
            .and_then(|hook| {
                let name = self.hook_name(call.name());
                trace!(name = %name, arity = call.arguments().len(), "asking resolve_function hook");
                hook(&*name, call.arguments().len())
            });

        if delegate.is_some() {
            debug!(name = call.name(), "bound host function delegate");
        }
        if use_cache {
            call.delegate.set(id, delegate.clone());
        }
        delegate
    }

    /// Function names are lower-cased for the hooks when matching ignores case.
    fn hook_name<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if self.options().ignore_case() {
            Cow::Owned(name.to_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    }
}
