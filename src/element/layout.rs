//! Reference element layouts

use crate::element::reference_cell;
use crate::traits::{ReferenceEdgeFrame, ReferenceElement};
use crate::types::{ElementFamily, Error, ReferenceCellType, Result};

/// The DOF layout of an element on its reference cell
#[derive(Debug, Clone)]
pub struct ReferenceLayout {
    family: ElementFamily,
    cell_type: ReferenceCellType,
    degree: usize,
    dim: usize,
    entity_dofs: [Vec<Vec<usize>>; 4],
}

impl ReferenceLayout {
    /// Create a layout from the number of DOFs on each entity of each dimension
    ///
    /// DOFs are numbered consecutively: all vertex DOFs first, then edge DOFs, then
    /// interior DOFs.
    fn create(
        family: ElementFamily,
        cell_type: ReferenceCellType,
        degree: usize,
        dofs_per_entity: &[usize],
    ) -> Self {
        let entity_counts = reference_cell::entity_counts(cell_type);
        let mut entity_dofs = [vec![], vec![], vec![], vec![]];
        let mut dof = 0;
        for (d, (count, ndofs)) in entity_counts.iter().zip(dofs_per_entity).enumerate() {
            for _ in 0..*count {
                entity_dofs[d].push((dof..dof + ndofs).collect::<Vec<_>>());
                dof += ndofs;
            }
        }
        Self {
            family,
            cell_type,
            degree,
            dim: dof,
            entity_dofs,
        }
    }

    fn check(family: ElementFamily, cell_type: ReferenceCellType, degree: usize) -> Result<()> {
        if degree != 2 {
            return Err(Error::Configuration { family, degree });
        }
        if cell_type != ReferenceCellType::Triangle {
            return Err(Error::UnsupportedCell {
                family,
                cell: cell_type,
            });
        }
        Ok(())
    }

    /// The layout of a Morley element: one value per vertex and one normal derivative per edge
    pub fn morley(cell_type: ReferenceCellType, degree: usize) -> Result<Self> {
        Self::check(ElementFamily::Morley, cell_type, degree)?;
        Ok(Self::create(ElementFamily::Morley, cell_type, degree, &[1, 1, 0]))
    }

    /// The layout of an Arnold-Awanou-Winther element: four DOFs per edge and three interior DOFs
    pub fn arnold_awanou_winther(cell_type: ReferenceCellType, degree: usize) -> Result<Self> {
        Self::check(ElementFamily::ArnoldAwanouWinther, cell_type, degree)?;
        Ok(Self::create(
            ElementFamily::ArnoldAwanouWinther,
            cell_type,
            degree,
            &[0, 4, 3],
        ))
    }

    /// The element family
    pub fn family(&self) -> ElementFamily {
        self.family
    }
}

impl ReferenceElement for ReferenceLayout {
    fn cell_type(&self) -> ReferenceCellType {
        self.cell_type
    }
    fn degree(&self) -> usize {
        self.degree
    }
    fn dim(&self) -> usize {
        self.dim
    }
    fn entity_dofs(&self, entity_dim: usize, entity_number: usize) -> Option<&[usize]> {
        if entity_dim < 4 && entity_number < self.entity_dofs[entity_dim].len() {
            Some(&self.entity_dofs[entity_dim][entity_number])
        } else {
            None
        }
    }
    fn entity_dof_map(&self) -> &[Vec<Vec<usize>>] {
        &self.entity_dofs[..reference_cell::dim(self.cell_type) + 1]
    }
}

impl ReferenceEdgeFrame for ReferenceLayout {
    fn edge_tangent(&self, edge: usize) -> [f64; 2] {
        reference_cell::edge_tangent(self.cell_type, edge)
    }
    fn edge_normal(&self, edge: usize) -> [f64; 2] {
        reference_cell::edge_normal(self.cell_type, edge)
    }
}
