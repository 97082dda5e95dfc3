//! Type definitions

use rlst::{Array, BaseArray, LinAlg, RlstScalar, VectorContainer};

/// A dense two-dimensional array of real values
pub type RealArray2 = Array<f64, BaseArray<f64, VectorContainer<f64>, 2>, 2>;

/// A real scalar that cell geometry can be computed in
pub trait RealScalar: num::Float + LinAlg + RlstScalar<Real = Self> + Send + Sync {}

impl<T: num::Float + LinAlg + RlstScalar<Real = T> + Send + Sync> RealScalar for T {}

/// The type of a reference cell
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum ReferenceCellType {
    /// A point
    Point = 0,
    /// A line interval
    Interval = 1,
    /// A triangle
    Triangle = 2,
    /// A quadrilateral
    Quadrilateral = 3,
}

/// The family of a physically mapped element
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum ElementFamily {
    /// Degree 2 nonconforming plate element
    Morley = 0,
    /// Nonconforming symmetric-tensor element
    ArnoldAwanouWinther = 1,
}

/// Errors raised while creating elements or evaluating transformations
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// The requested degree is not defined for the family
    #[error("{family:?} elements are not defined for degree {degree}")]
    Configuration {
        /// Element family
        family: ElementFamily,
        /// Requested degree
        degree: usize,
    },
    /// The requested cell is not supported by the family
    #[error("{family:?} elements are not defined on a {cell:?}")]
    UnsupportedCell {
        /// Element family
        family: ElementFamily,
        /// Requested cell
        cell: ReferenceCellType,
    },
    /// A symbolic variable has no value in the environment
    #[error("No value bound to variable {0}")]
    UnboundVariable(String),
    /// An index or rank does not fit the shape it is applied to
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// A denominator evaluated to (numerically) zero
    #[error("Division by zero while evaluating a symbolic expression")]
    DivisionByZero,
    /// An intermediate value was infinite or NaN
    #[error("Non-finite value while evaluating a symbolic expression")]
    NonFinite,
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
