//! Dense matrices of symbolic expressions

use crate::symbolic::{assemble, literal, Expression, Tensor};

/// A dense matrix of symbolic expressions used while building a basis transformation
///
/// The matrix is filled as "new basis in terms of old": row `i` holds the coefficients
/// of physically mapped basis function `i`. Entries that are never overwritten stay the
/// literal zero.
#[derive(Debug, Clone)]
pub struct SymbolicMatrix {
    shape: [usize; 2],
    entries: Vec<Expression>,
}

impl SymbolicMatrix {
    /// Create a matrix of literal zeros
    pub fn zeros(shape: [usize; 2]) -> Self {
        Self {
            shape,
            entries: vec![literal(0.0); shape[0] * shape[1]],
        }
    }

    /// Create a square identity matrix of literals
    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros([size, size]);
        for i in 0..size {
            m.set([i, i], literal(1.0));
        }
        m
    }

    fn offset(&self, index: [usize; 2]) -> usize {
        assert!(
            index[0] < self.shape[0] && index[1] < self.shape[1],
            "Index {index:?} out of range for matrix of shape {:?}",
            self.shape
        );
        index[0] * self.shape[1] + index[1]
    }

    /// Get an entry
    pub fn get(&self, index: [usize; 2]) -> &Expression {
        &self.entries[self.offset(index)]
    }

    /// Overwrite an entry
    pub fn set(&mut self, index: [usize; 2], value: Expression) {
        let offset = self.offset(index);
        self.entries[offset] = value;
    }

    /// Replace an entry by a function of its current value
    pub fn update(&mut self, index: [usize; 2], f: impl FnOnce(Expression) -> Expression) {
        let offset = self.offset(index);
        let value = std::mem::replace(&mut self.entries[offset], literal(0.0));
        self.entries[offset] = f(value);
    }

    /// Publish the transpose of the matrix as a rank 2 tensor
    pub fn into_transpose(self) -> Tensor {
        let [rows, cols] = self.shape;
        let mut transpose = Vec::with_capacity(rows * cols);
        for j in 0..cols {
            for i in 0..rows {
                transpose.push(self.entries[i * cols + j].clone());
            }
        }
        assemble(&[cols, rows], transpose)
    }
}
