//! Symbolic tensor algebra
//!
//! A minimal expression language used to describe basis transformations whose entries
//! depend on geometric quantities that are only known once a physical cell is given.
//! Expressions are immutable trees; subexpressions are shared through [`Arc`] so that
//! values can be cloned cheaply and sent across threads.
//!
//! The algebra offers literals, sums, products, divisions, indexing into a symbolic
//! tensor, and the assembly of a dense array of scalar expressions into a tensor.
//! Nothing in this module evaluates an expression: see [`evaluate`] for that.

pub mod evaluate;

use itertools::Itertools;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg};
use std::sync::Arc;

/// A named symbolic tensor whose values are supplied later
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    shape: Vec<usize>,
    point: Option<Vec<f64>>,
}

impl Variable {
    /// Create a variable
    pub fn new(name: &str, shape: &[usize]) -> Self {
        Self {
            name: name.to_string(),
            shape: shape.to_vec(),
            point: None,
        }
    }

    /// Create a variable sampled at a reference point
    pub fn at_point(name: &str, shape: &[usize], point: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            shape: shape.to_vec(),
            point: Some(point.to_vec()),
        }
    }

    /// The name of the variable
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shape of the variable
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The reference point this variable is sampled at, if it depends on one
    pub fn point(&self) -> Option<&[f64]> {
        self.point.as_deref()
    }
}

/// A symbolic scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A constant
    Literal(f64),
    /// A component of a variable
    Indexed {
        /// The variable
        variable: Arc<Variable>,
        /// The multi-index of the component
        index: Vec<usize>,
    },
    /// Sum of two expressions
    Sum(Arc<Expression>, Arc<Expression>),
    /// Product of two expressions
    Product(Arc<Expression>, Arc<Expression>),
    /// Quotient of two expressions
    Division(Arc<Expression>, Arc<Expression>),
}

impl Expression {
    /// Is this expression the literal zero?
    pub fn is_zero(&self) -> bool {
        matches!(self, Expression::Literal(v) if *v == 0.0)
    }

    /// Number of nodes in the expression tree
    pub fn node_count(&self) -> usize {
        match self {
            Expression::Literal(_) | Expression::Indexed { .. } => 1,
            Expression::Sum(a, b) | Expression::Product(a, b) | Expression::Division(a, b) => {
                1 + a.node_count() + b.node_count()
            }
        }
    }

    /// The names of all variables appearing in the expression
    pub fn variables(&self) -> Vec<String> {
        let mut names = vec![];
        self.collect_variables(&mut names);
        names.into_iter().unique().collect()
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Indexed { variable, .. } => names.push(variable.name().to_string()),
            Expression::Sum(a, b) | Expression::Product(a, b) | Expression::Division(a, b) => {
                a.collect_variables(names);
                b.collect_variables(names);
            }
        }
    }
}

/// Wrap a constant as an expression
pub fn literal(value: f64) -> Expression {
    Expression::Literal(value)
}

/// The sum `a + b`
///
/// A literal zero operand is dropped.
pub fn sum(a: Expression, b: Expression) -> Expression {
    if a.is_zero() {
        b
    } else if b.is_zero() {
        a
    } else {
        Expression::Sum(Arc::new(a), Arc::new(b))
    }
}

/// The product `a * b`
///
/// The product with a literal zero is the literal zero.
pub fn product(a: Expression, b: Expression) -> Expression {
    if a.is_zero() || b.is_zero() {
        literal(0.0)
    } else {
        Expression::Product(Arc::new(a), Arc::new(b))
    }
}

/// The quotient `a / b`
///
/// A literal zero numerator gives the literal zero. The denominator is never inspected:
/// a zero denominator is reported when the expression is evaluated.
pub fn division(a: Expression, b: Expression) -> Expression {
    if a.is_zero() {
        a
    } else {
        Expression::Division(Arc::new(a), Arc::new(b))
    }
}

/// The component of `tensor` at `index`
pub fn indexed(tensor: &Tensor, index: &[usize]) -> Expression {
    tensor.index(index)
}

/// Assemble a row-major array of scalar expressions into a tensor of the given shape
pub fn assemble(shape: &[usize], entries: Vec<Expression>) -> Tensor {
    Tensor::list(shape, entries)
}

impl Add for Expression {
    type Output = Expression;
    fn add(self, other: Expression) -> Expression {
        sum(self, other)
    }
}

impl Mul for Expression {
    type Output = Expression;
    fn mul(self, other: Expression) -> Expression {
        product(self, other)
    }
}

impl Div for Expression {
    type Output = Expression;
    fn div(self, other: Expression) -> Expression {
        division(self, other)
    }
}

impl Neg for Expression {
    type Output = Expression;
    fn neg(self) -> Expression {
        product(literal(-1.0), self)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{v}"),
            Expression::Indexed { variable, index } => {
                if index.is_empty() {
                    write!(f, "{}", variable.name())
                } else {
                    write!(f, "{}[{}]", variable.name(), index.iter().join(", "))
                }
            }
            Expression::Sum(a, b) => write!(f, "({a} + {b})"),
            Expression::Product(a, b) => write!(f, "{a}*{b}"),
            Expression::Division(a, b) => write!(f, "{a}/({b})"),
        }
    }
}

/// The number of entries in a tensor of the given shape
pub fn shape_size(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Convert a multi-index into a row-major offset
fn flat_index(shape: &[usize], index: &[usize]) -> usize {
    assert_eq!(
        shape.len(),
        index.len(),
        "Index of rank {} used on tensor of rank {}",
        index.len(),
        shape.len()
    );
    let mut offset = 0;
    for (i, n) in index.iter().zip(shape) {
        assert!(i < n, "Index {index:?} out of range for shape {shape:?}");
        offset = offset * n + i;
    }
    offset
}

/// A symbolic tensor
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    /// A placeholder whose values are supplied later
    Variable(Arc<Variable>),
    /// A dense array of scalar expressions, stored in row-major order
    List {
        /// The shape of the tensor
        shape: Vec<usize>,
        /// The entries of the tensor
        entries: Vec<Expression>,
    },
}

impl Tensor {
    /// Create a tensor from a variable
    pub fn variable(variable: Variable) -> Self {
        Tensor::Variable(Arc::new(variable))
    }

    /// Create a tensor from a row-major list of entries
    pub fn list(shape: &[usize], entries: Vec<Expression>) -> Self {
        if entries.len() != shape_size(shape) {
            panic!(
                "Cannot assemble {} entries into a tensor of shape {shape:?}",
                entries.len()
            );
        }
        Tensor::List {
            shape: shape.to_vec(),
            entries,
        }
    }

    /// Create a tensor of literals from a row-major list of values
    pub fn from_values(shape: &[usize], values: &[f64]) -> Self {
        Self::list(shape, values.iter().map(|v| literal(*v)).collect())
    }

    /// The shape of the tensor
    pub fn shape(&self) -> &[usize] {
        match self {
            Tensor::Variable(v) => v.shape(),
            Tensor::List { shape, .. } => shape,
        }
    }

    /// The rank (number of indices) of the tensor
    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    /// The component at `index`
    pub fn index(&self, index: &[usize]) -> Expression {
        match self {
            Tensor::Variable(v) => {
                flat_index(v.shape(), index);
                Expression::Indexed {
                    variable: Arc::clone(v),
                    index: index.to_vec(),
                }
            }
            Tensor::List { shape, entries } => entries[flat_index(shape, index)].clone(),
        }
    }

    /// The entries of the tensor in row-major order
    pub fn entries(&self) -> Vec<Expression> {
        match self {
            Tensor::Variable(v) => {
                let shape = v.shape();
                let mut index = vec![0; shape.len()];
                let mut entries = Vec::with_capacity(shape_size(shape));
                for _ in 0..shape_size(shape) {
                    entries.push(self.index(&index));
                    for d in (0..shape.len()).rev() {
                        index[d] += 1;
                        if index[d] < shape[d] {
                            break;
                        }
                        index[d] = 0;
                    }
                }
                entries
            }
            Tensor::List { entries, .. } => entries.clone(),
        }
    }
}
