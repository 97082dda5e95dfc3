//! Symbolic basis transformations for physically mapped finite elements
//!
//! Elements whose DOFs are derivatives, directional components or moments do not map
//! to a physical cell like scalar values. For each such element family this library
//! builds the matrix that turns reference basis functions into physically correct basis
//! functions. Its entries are symbolic in the geometry of the physical cell (Jacobian,
//! normals, tangents, edge lengths and cell size), so one matrix can be evaluated on
//! every cell of a mesh.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod element;
pub mod geometry;
pub mod symbolic;
pub mod traits;
pub mod types;
