//! Map from reference to physical space.

use crate::symbolic::{Expression, Tensor};

pub trait CoordinateMapping {
    //! Symbolic geometric quantities of the map from a reference cell to a physical cell
    //!
    //! Every method returns symbolic values: concrete geometry is substituted later, once
    //! per physical cell.

    /// The Jacobian of the map at a reference point, shape `[gdim, tdim]`
    fn jacobian_at(&self, point: &[f64]) -> Tensor;

    /// The determinant of the Jacobian at a reference point
    fn detj_at(&self, point: &[f64]) -> Expression;

    /// Unit normals of the reference cell's edges, shape `[nedges, 2]`
    fn reference_normals(&self) -> Tensor;

    /// Unit normals of the physical cell's edges, shape `[nedges, 2]`
    fn physical_normals(&self) -> Tensor;

    /// Unit tangents of the physical cell's edges, shape `[nedges, 2]`
    fn physical_tangents(&self) -> Tensor;

    /// Lengths of the physical cell's edges, shape `[nedges]`
    fn physical_edge_lengths(&self) -> Tensor;

    /// Characteristic sizes of the physical cell, shape `[nedges]`
    fn cell_size(&self) -> Tensor;
}
