//! Evaluation errors.
//!
//! Every error is surfaced to the caller of [`evaluate`](crate::evaluator::evaluate)
//! as soon as it happens; the evaluator never retries or recovers. Variants carry the
//! name of the offending identifier, function or operator so hosts can point at it.

use thiserror::Error;

use crate::casting::CastError;

/// Error produced while evaluating an expression tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A value could not be converted to the type an operation needed.
    #[error("{}", type_coercion_message(.source, .operation.as_deref()))]
    TypeCoercion {
        source: CastError,
        /// Operator or function being applied, when known.
        operation: Option<String>,
    },

    /// An identifier was not found in the parameters and no hook supplied it.
    #[error("Parameter '{name}' was not defined")]
    UnboundParameter { name: String },

    /// No host override and no built-in matches the name.
    #[error("{}", unknown_function_message(.name, .suggestion.as_deref()))]
    UnknownFunction {
        name: String,
        /// Exact spelling of a built-in that matches only case-insensitively.
        suggestion: Option<&'static str>,
    },

    /// A built-in was called with the wrong number of arguments.
    #[error("{function}() takes {expected} argument(s), {found} given")]
    Arity {
        function: &'static str,
        expected: Arity,
        found: usize,
    },

    /// A function asked for an argument position the call site did not supply.
    #[error("{function}() has no argument at position {index}")]
    MissingArgument { function: String, index: usize },

    /// An operator tag with no implementation.
    #[error("Operator '{operator}' is not supported")]
    UnsupportedOperator { operator: String },

    /// Integer or decimal division (or modulo) by zero.
    #[error("Division by zero in '{operation}'")]
    DivisionByZero { operation: String },

    /// Decimal arithmetic overflowed.
    #[error("Arithmetic overflow in '{operation}'")]
    Overflow { operation: String },

    /// A built-in received an argument outside its domain.
    #[error("Invalid argument to {function}(): {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },

    /// A nested-expression parameter refers back to itself.
    #[error("Parameter '{name}' is defined in terms of itself")]
    CircularParameter { name: String },

    /// Failure reported by a host-supplied function or hook.
    #[error("{message}")]
    Host { message: String },
}

/// Number of arguments a built-in accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl core::fmt::Display for Arity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

fn type_coercion_message(source: &CastError, operation: Option<&str>) -> String {
    match operation {
        Some(operation) => format!("Type error in '{}': {}", operation, source),
        None => format!("Type error: {}", source),
    }
}

fn unknown_function_message(name: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(exact) => format!("Function not found {}. Try {} instead.", name, exact),
        None => format!("Function not found {}", name),
    }
}

impl EvalError {
    /// Build a host error from any displayable message.
    pub fn host(message: impl Into<String>) -> Self {
        EvalError::Host {
            message: message.into(),
        }
    }

    /// Attach the operation being applied to a coercion error that lacks one.
    pub(crate) fn during(self, operation: &str) -> Self {
        match self {
            EvalError::TypeCoercion {
                source,
                operation: None,
            } => EvalError::TypeCoercion {
                source,
                operation: Some(operation.into()),
            },
            other => other,
        }
    }
}

impl From<CastError> for EvalError {
    fn from(source: CastError) -> Self {
        EvalError::TypeCoercion {
            source,
            operation: None,
        }
    }
}
