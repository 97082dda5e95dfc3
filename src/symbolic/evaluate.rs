//! Numerical evaluation of symbolic expressions

use crate::symbolic::{shape_size, Expression, Tensor, Variable};
use crate::types::{Error, RealArray2, Result};
use rlst::{rlst_dynamic_array2, RandomAccessMut};
use std::collections::HashMap;

/// A source of values for symbolic variables
pub trait Environment {
    /// The value of the component `index` of `variable`
    fn value(&self, variable: &Variable, index: &[usize]) -> Result<f64>;
}

/// Check that `index` fits `shape` and return its row-major offset
pub(crate) fn checked_offset(shape: &[usize], index: &[usize]) -> Result<usize> {
    if shape.len() != index.len() {
        return Err(Error::ShapeMismatch(format!(
            "index {index:?} does not match shape {shape:?}"
        )));
    }
    let mut offset = 0;
    for (i, n) in index.iter().zip(shape) {
        if i >= n {
            return Err(Error::ShapeMismatch(format!(
                "index {index:?} out of range for shape {shape:?}"
            )));
        }
        offset = offset * n + i;
    }
    Ok(offset)
}

/// Values bound to variable names
///
/// Values are stored in row-major order and are used for a variable regardless of the
/// point it is sampled at.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, (Vec<usize>, Vec<f64>)>,
}

impl Bindings {
    /// Create an empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind row-major `values` of the given shape to `name`
    pub fn bind(&mut self, name: &str, shape: &[usize], values: &[f64]) -> Result<()> {
        if values.len() != shape_size(shape) {
            return Err(Error::ShapeMismatch(format!(
                "{} values cannot be bound to shape {shape:?}",
                values.len()
            )));
        }
        self.values
            .insert(name.to_string(), (shape.to_vec(), values.to_vec()));
        Ok(())
    }
}

impl Environment for Bindings {
    fn value(&self, variable: &Variable, index: &[usize]) -> Result<f64> {
        let (shape, values) = self
            .values
            .get(variable.name())
            .ok_or_else(|| Error::UnboundVariable(variable.name().to_string()))?;
        if shape != variable.shape() {
            return Err(Error::ShapeMismatch(format!(
                "{} is bound with shape {shape:?} but used with shape {:?}",
                variable.name(),
                variable.shape()
            )));
        }
        Ok(values[checked_offset(shape, index)?])
    }
}

/// Options used when evaluating expressions
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    /// Denominators with magnitude at most this multiple of their numerator's are treated as zero
    zero_tolerance: f64,
    /// Maximum number of cells handled by one parallel task
    batch_size: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            zero_tolerance: 1e-12,
            batch_size: 128,
        }
    }
}

impl EvaluationOptions {
    /// Set the relative tolerance below which denominators are treated as zero
    pub fn set_zero_tolerance(&mut self, tolerance: f64) {
        self.zero_tolerance = tolerance;
    }

    /// Get the relative tolerance below which denominators are treated as zero
    pub fn zero_tolerance(&self) -> f64 {
        self.zero_tolerance
    }

    /// Set the number of cells handled by one parallel task
    pub fn set_batch_size(&mut self, size: usize) {
        self.batch_size = size;
    }

    /// Get the number of cells handled by one parallel task
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// Evaluates symbolic values against an environment
pub struct Evaluator<'a, E: Environment> {
    environment: &'a E,
    options: &'a EvaluationOptions,
}

impl<'a, E: Environment> Evaluator<'a, E> {
    /// Create an evaluator
    pub fn new(environment: &'a E, options: &'a EvaluationOptions) -> Self {
        Self {
            environment,
            options,
        }
    }

    /// Evaluate a scalar expression
    pub fn scalar(&self, expression: &Expression) -> Result<f64> {
        let value = match expression {
            Expression::Literal(v) => *v,
            Expression::Indexed { variable, index } => self.environment.value(variable, index)?,
            Expression::Sum(a, b) => self.scalar(a)? + self.scalar(b)?,
            Expression::Product(a, b) => self.scalar(a)? * self.scalar(b)?,
            Expression::Division(a, b) => {
                let numerator = self.scalar(a)?;
                let denominator = self.scalar(b)?;
                // Relative to the numerator, so that uniformly small cells still evaluate
                if denominator.abs() <= self.options.zero_tolerance * numerator.abs() {
                    return Err(Error::DivisionByZero);
                }
                numerator / denominator
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::NonFinite)
        }
    }

    /// Evaluate every entry of a tensor, in row-major order
    pub fn tensor(&self, tensor: &Tensor) -> Result<Vec<f64>> {
        tensor.entries().iter().map(|e| self.scalar(e)).collect()
    }

    /// Evaluate a rank 2 tensor into a dense array
    pub fn matrix(&self, tensor: &Tensor) -> Result<RealArray2> {
        let [rows, cols] = tensor.shape()[..] else {
            return Err(Error::ShapeMismatch(format!(
                "expected a matrix, found shape {:?}",
                tensor.shape()
            )));
        };
        let values = self.tensor(tensor)?;
        let mut matrix = rlst_dynamic_array2!(f64, [rows, cols]);
        for (n, value) in values.iter().enumerate() {
            *matrix.get_mut([n / cols, n % cols]).unwrap() = *value;
        }
        Ok(matrix)
    }
}

/// Evaluate a scalar expression with default options
pub fn evaluate(expression: &Expression, environment: &impl Environment) -> Result<f64> {
    Evaluator::new(environment, &EvaluationOptions::default()).scalar(expression)
}

/// Evaluate a rank 2 tensor with default options
pub fn evaluate_matrix(tensor: &Tensor, environment: &impl Environment) -> Result<RealArray2> {
    Evaluator::new(environment, &EvaluationOptions::default()).matrix(tensor)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::symbolic::{assemble, division, literal, product, sum};
    use approx::*;
    use rlst::{RandomAccessByRef, Shape};

    fn bindings() -> Bindings {
        let mut b = Bindings::new();
        b.bind("J", &[2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        b.bind("h", &[], &[0.5]).unwrap();
        b
    }

    #[test]
    fn test_evaluate_arithmetic() {
        let j = Tensor::variable(Variable::new("J", &[2, 2]));
        let h = Tensor::variable(Variable::new("h", &[]));
        let e = division(
            sum(product(j.index(&[0, 1]), j.index(&[1, 0])), literal(1.0)),
            h.index(&[]),
        );
        assert_relative_eq!(evaluate(&e, &bindings()).unwrap(), 14.0);
    }

    #[test]
    fn test_division_by_zero() {
        let e = division(literal(1.0), sum(literal(1.0), literal(-1.0)));
        assert_eq!(evaluate(&e, &bindings()), Err(Error::DivisionByZero));
    }

    #[test]
    fn test_zero_over_zero() {
        let e = division(sum(literal(1.0), literal(-1.0)), literal(0.0));
        assert_eq!(evaluate(&e, &bindings()), Err(Error::DivisionByZero));
    }

    #[test]
    fn test_small_operands() {
        let e = division(literal(3e-20), literal(2e-20));
        assert_relative_eq!(evaluate(&e, &bindings()).unwrap(), 1.5);
        let e = division(sum(literal(1.0), literal(-1.0)), literal(1e-30));
        assert_relative_eq!(evaluate(&e, &bindings()).unwrap(), 0.0);
    }

    #[test]
    fn test_near_zero_tolerance() {
        let e = division(literal(1.0), literal(1e-13));
        assert_eq!(evaluate(&e, &bindings()), Err(Error::DivisionByZero));

        let mut options = EvaluationOptions::default();
        options.set_zero_tolerance(0.0);
        let b = bindings();
        let evaluator = Evaluator::new(&b, &options);
        assert_relative_eq!(evaluator.scalar(&e).unwrap(), 1e13);
    }

    #[test]
    fn test_non_finite() {
        let e = product(literal(f64::MAX), literal(10.0));
        assert_eq!(evaluate(&e, &bindings()), Err(Error::NonFinite));
    }

    #[test]
    fn test_unbound_variable() {
        let x = Tensor::variable(Variable::new("x", &[]));
        assert_eq!(
            evaluate(&x.index(&[]), &bindings()),
            Err(Error::UnboundVariable("x".to_string()))
        );
    }

    #[test]
    fn test_bound_with_other_shape() {
        let j = Tensor::variable(Variable::new("J", &[4]));
        assert!(matches!(
            evaluate(&j.index(&[0]), &bindings()),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_bind_wrong_size() {
        let mut b = Bindings::new();
        assert!(b.bind("x", &[3], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_evaluate_matrix() {
        let j = Tensor::variable(Variable::new("J", &[2, 2]));
        let m = assemble(
            &[2, 3],
            vec![
                j.index(&[0, 0]),
                literal(0.0),
                j.index(&[0, 1]),
                j.index(&[1, 0]),
                literal(7.0),
                j.index(&[1, 1]),
            ],
        );
        let values = evaluate_matrix(&m, &bindings()).unwrap();
        assert_eq!(values.shape(), [2, 3]);
        assert_relative_eq!(*values.get([0, 0]).unwrap(), 1.0);
        assert_relative_eq!(*values.get([0, 1]).unwrap(), 0.0);
        assert_relative_eq!(*values.get([0, 2]).unwrap(), 2.0);
        assert_relative_eq!(*values.get([1, 0]).unwrap(), 3.0);
        assert_relative_eq!(*values.get([1, 1]).unwrap(), 7.0);
        assert_relative_eq!(*values.get([1, 2]).unwrap(), 4.0);
    }

    #[test]
    fn test_evaluate_matrix_wrong_rank() {
        let v = Tensor::from_values(&[3], &[1.0, 2.0, 3.0]);
        assert!(matches!(
            evaluate_matrix(&v, &bindings()),
            Err(Error::ShapeMismatch(_))
        ));
    }
}
