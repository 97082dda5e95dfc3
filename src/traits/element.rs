//! Finite element definitions

use crate::element::ReferenceLayout;
use crate::symbolic::Tensor;
use crate::traits::CoordinateMapping;
use crate::types::{ElementFamily, ReferenceCellType};

pub trait ReferenceElement {
    //! A finite element defined on a reference cell

    /// The reference cell type
    fn cell_type(&self) -> ReferenceCellType;

    /// The polynomial degree
    fn degree(&self) -> usize;

    /// The number of basis functions
    fn dim(&self) -> usize;

    /// The DOFs that are associated with a subentity of the reference cell
    fn entity_dofs(&self, entity_dim: usize, entity_number: usize) -> Option<&[usize]>;

    /// The DOFs associated with every subentity, indexed by entity dimension then entity number
    fn entity_dof_map(&self) -> &[Vec<Vec<usize>>];
}

pub trait ReferenceEdgeFrame {
    //! Edge directions of the reference cell, in reference coordinates

    /// The unit tangent of an edge
    fn edge_tangent(&self, edge: usize) -> [f64; 2];

    /// The unit normal of an edge
    fn edge_normal(&self, edge: usize) -> [f64; 2];
}

pub trait PhysicallyMappedElement {
    //! An element whose DOFs need a basis transformation after mapping to a physical cell

    /// The element family
    fn family(&self) -> ElementFamily;

    /// The reference element this element transforms
    fn reference(&self) -> &ReferenceLayout;

    /// The basis transformation for a coordinate mapping
    ///
    /// Row `i` of the returned `dim() x dim()` matrix holds the coefficients of reference
    /// basis function `i` in each of the physically mapped basis functions. Entries are
    /// symbolic in the geometric quantities supplied by `mapping`.
    fn basis_transformation(&self, mapping: &impl CoordinateMapping) -> Tensor;

    /// The shape of the index over basis functions
    fn index_shape(&self) -> Vec<usize> {
        vec![self.reference().dim()]
    }

    /// The number of basis functions
    fn space_dimension(&self) -> usize {
        self.reference().dim()
    }

    /// The DOFs that are associated with a subentity of the reference cell
    fn entity_dofs(&self, entity_dim: usize, entity_number: usize) -> Option<&[usize]> {
        self.reference().entity_dofs(entity_dim, entity_number)
    }
}
