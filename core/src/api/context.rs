//! Evaluation context.

use core::sync::atomic::{AtomicU64, Ordering};
use std::rc::Rc;

use crate::{
    api::{
        EvaluateOptions, FunctionArgs, FunctionDelegate, Hooks, Parameter, ParameterProducer,
        Parameters,
    },
    evaluator::EvalError,
    values::Value,
};

/// Identity of an evaluation context, used to scope per-node caches.
///
/// A context gets a fresh identity when created and whenever its options or hooks
/// change, since either can change how a name resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ContextId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Everything an evaluation needs besides the tree: options, parameters and hooks.
///
/// A context can be reused across evaluations. Resolutions made by the resolve hooks
/// are cached on the tree nodes for this context only, so evaluating the same tree
/// with the same context again skips those hooks, while a different context starts
/// from scratch.
///
/// # Example
///
/// ```
/// use tally_core::api::EvaluationContext;
/// use tally_core::ast::Expr;
/// use tally_core::values::Value;
///
/// let context = EvaluationContext::new()
///     .with_parameter("base", 10)
///     .on_evaluate_parameter(|name| (name == "offset").then(|| Value::from(5)));
///
/// let expr = Expr::call("Max", [Expr::ident("base"), Expr::ident("offset")]);
/// assert_eq!(expr.evaluate(&context).unwrap(), Value::Integer(10));
/// ```
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    id: ContextId,
    options: EvaluateOptions,
    parameters: Parameters,
    hooks: Hooks,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self {
            id: ContextId::next(),
            options: EvaluateOptions::default(),
            parameters: Parameters::new(),
            hooks: Hooks::default(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn options(&self) -> EvaluateOptions {
        self.options
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Mutable access to the parameters.
    ///
    /// Parameters are looked up before any cached resolution, so changing them keeps
    /// the context's identity.
    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    pub(crate) fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn with_options(mut self, options: EvaluateOptions) -> Self {
        self.set_options(options);
        self
    }

    pub fn set_options(&mut self, options: EvaluateOptions) {
        self.options = options;
        self.id = ContextId::next();
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Hook asked once per identifier node for a value producer.
    pub fn on_resolve_parameter(
        mut self,
        hook: impl Fn(&str) -> Option<ParameterProducer> + 'static,
    ) -> Self {
        self.hooks.resolve_parameter = Some(Rc::new(hook));
        self.id = ContextId::next();
        self
    }

    /// Hook asked on every evaluation of an identifier nothing else resolved.
    pub fn on_evaluate_parameter(mut self, hook: impl Fn(&str) -> Option<Value> + 'static) -> Self {
        self.hooks.evaluate_parameter = Some(Rc::new(hook));
        self.id = ContextId::next();
        self
    }

    /// Hook asked once per function-call node, with the name and argument count, for a
    /// delegate implementing the function.
    pub fn on_resolve_function(
        mut self,
        hook: impl Fn(&str, usize) -> Option<FunctionDelegate> + 'static,
    ) -> Self {
        self.hooks.resolve_function = Some(Rc::new(hook));
        self.id = ContextId::next();
        self
    }

    /// Hook asked on every evaluation of a function call no delegate handles, before
    /// the built-in functions.
    pub fn on_evaluate_function(
        mut self,
        hook: impl Fn(&str, &FunctionArgs<'_>) -> Result<Option<Value>, EvalError> + 'static,
    ) -> Self {
        self.hooks.evaluate_function = Some(Rc::new(hook));
        self.id = ContextId::next();
        self
    }
}
