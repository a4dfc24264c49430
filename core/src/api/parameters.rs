//! Parameter mappings.

use std::rc::Rc;

use hashbrown::HashMap;

use crate::{ast::Expr, values::Value};

/// What a parameter name is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// A literal value.
    Value(Value),
    /// A formula evaluated on demand against the enclosing parameters.
    Expression(Rc<NestedExpression>),
}

impl Parameter {
    /// Bind a formula with no parameters of its own.
    pub fn expression(expr: Expr) -> Self {
        Parameter::Expression(Rc::new(NestedExpression::new(expr)))
    }
}

impl<T: Into<Value>> From<T> for Parameter {
    fn from(value: T) -> Self {
        Parameter::Value(value.into())
    }
}

impl From<NestedExpression> for Parameter {
    fn from(nested: NestedExpression) -> Self {
        Parameter::Expression(Rc::new(nested))
    }
}

/// An expression used as the value of a parameter.
///
/// Its own parameters shadow those of the context it is evaluated in; names it does
/// not define are looked up in the enclosing context.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedExpression {
    expr: Expr,
    parameters: Parameters,
}

impl NestedExpression {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            parameters: Parameters::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

/// Mapping from parameter name to its binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: HashMap<String, Parameter>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the previous binding if there was one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Parameter>) -> Option<Parameter> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Parameter>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = Parameters::new();
        for (name, value) in iter {
            parameters.insert(name, value);
        }
        parameters
    }
}
