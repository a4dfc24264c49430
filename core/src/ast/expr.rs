use core::fmt;

use once_cell::unsync::OnceCell;

use crate::{
    api::{EvaluationContext, FunctionDelegate, ParameterProducer},
    ast::{BinaryOp, UnaryOp, cache::NodeCache},
    evaluator::{self, BinaryFn, EvalError},
    stdlib::Builtin,
    values::Value,
};

/// An expression tree node.
///
/// Trees are built by a parser or by hand through the constructor functions, and are
/// immutable afterwards apart from the resolution caches some nodes carry. Those caches
/// are invisible to equality and are dropped by `clone`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Value(Value),
    Identifier(Identifier),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary(BinaryExpr),
    Ternary {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    Function(FunctionCall),
}

impl Expr {
    pub fn value(value: impl Into<Value>) -> Self {
        Expr::Value(value.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(Identifier {
            name: name.into(),
            resolution: NodeCache::default(),
        })
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            operator: OnceCell::new(),
        })
    }

    pub fn ternary(condition: Expr, if_true: Expr, if_false: Expr) -> Self {
        Expr::Ternary {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    pub fn call(name: impl Into<String>, arguments: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Function(FunctionCall {
            name: name.into(),
            arguments: arguments.into_iter().collect(),
            delegate: NodeCache::default(),
            builtin: NodeCache::default(),
        })
    }

    /// Evaluate this tree. Shorthand for [`evaluator::evaluate`].
    pub fn evaluate(&self, context: &EvaluationContext) -> Result<Value, EvalError> {
        evaluator::evaluate(self, context)
    }

    /// Forget every resolution cached anywhere in this tree.
    pub fn reset_caches(&self) {
        match self {
            Expr::Value(_) => {}
            Expr::Identifier(ident) => ident.resolution.clear(),
            Expr::Unary { operand, .. } => operand.reset_caches(),
            Expr::Binary(binary) => {
                binary.left.reset_caches();
                binary.right.reset_caches();
            }
            Expr::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                condition.reset_caches();
                if_true.reset_caches();
                if_false.reset_caches();
            }
            Expr::Function(call) => {
                call.delegate.clear();
                call.builtin.clear();
                call.arguments.iter().for_each(Expr::reset_caches);
            }
        }
    }
}

/// A named parameter reference.
#[derive(Clone)]
pub struct Identifier {
    name: String,
    /// Producer returned by the host's resolve-parameter hook, `None` if it declined.
    pub(crate) resolution: NodeCache<Option<ParameterProducer>>,
}

impl Identifier {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier").field(&self.name).finish()
    }
}

/// An infix operation.
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    /// Implementation of `op`, bound on first evaluation.
    pub(crate) operator: OnceCell<BinaryFn>,
}

impl Clone for BinaryExpr {
    fn clone(&self) -> Self {
        Self {
            op: self.op,
            left: self.left.clone(),
            right: self.right.clone(),
            operator: OnceCell::new(),
        }
    }
}

impl PartialEq for BinaryExpr {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.left == other.left && self.right == other.right
    }
}

impl fmt::Debug for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binary")
            .field("op", &self.op)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

/// A call to a host-supplied or built-in function.
#[derive(Clone)]
pub struct FunctionCall {
    name: String,
    arguments: Vec<Expr>,
    /// Delegate returned by the host's resolve-function hook, `None` if it declined.
    pub(crate) delegate: NodeCache<Option<FunctionDelegate>>,
    pub(crate) builtin: NodeCache<&'static Builtin>,
}

impl FunctionCall {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[Expr] {
        &self.arguments
    }
}

impl PartialEq for FunctionCall {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arguments == other.arguments
    }
}

impl fmt::Debug for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish()
    }
}
