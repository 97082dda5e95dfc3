//! Morley elements

use crate::element::{reference_cell, ReferenceLayout, SymbolicMatrix};
use crate::symbolic::{division, indexed, literal, product, sum, Expression, Tensor};
use crate::traits::{CoordinateMapping, PhysicallyMappedElement, ReferenceElement};
use crate::types::{ElementFamily, ReferenceCellType, Result};
use log::debug;

/// The vertices whose value DOFs couple to the normal derivative DOF of each edge
const EDGE_VERTEX_PAIRS: [[usize; 2]; 3] = [[1, 2], [0, 2], [0, 1]];

/// A degree 2 Morley element
///
/// The DOFs are the values at the three vertices followed by the normal derivatives at
/// the midpoints of the three edges.
#[derive(Debug, Clone)]
pub struct Morley {
    reference: ReferenceLayout,
    evaluation_point: Vec<f64>,
}

impl Morley {
    /// Create a Morley element
    pub fn create(cell_type: ReferenceCellType, degree: usize) -> Result<Self> {
        let reference = ReferenceLayout::morley(cell_type, degree)?;
        Ok(Self {
            reference,
            evaluation_point: reference_cell::midpoint(cell_type),
        })
    }
}

/// The contraction `r . (J^T p)` of reference direction `r` with physical direction `p`
fn pullback_contraction(r: &Tensor, p: &Tensor, jacobian: &Tensor, edge: usize) -> Expression {
    let pulled = |k: usize| {
        sum(
            product(indexed(p, &[edge, 0]), indexed(jacobian, &[0, k])),
            product(indexed(p, &[edge, 1]), indexed(jacobian, &[1, k])),
        )
    };
    sum(
        product(indexed(r, &[edge, 0]), pulled(0)),
        product(indexed(r, &[edge, 1]), pulled(1)),
    )
}

impl PhysicallyMappedElement for Morley {
    fn family(&self) -> ElementFamily {
        ElementFamily::Morley
    }

    fn reference(&self) -> &ReferenceLayout {
        &self.reference
    }

    fn basis_transformation(&self, mapping: &impl CoordinateMapping) -> Tensor {
        debug!("Building Morley basis transformation");
        let ndofs = self.reference.dim();
        let nvertices = EDGE_VERTEX_PAIRS.len();

        let jacobian = mapping.jacobian_at(&self.evaluation_point);
        let rns = mapping.reference_normals();
        let pns = mapping.physical_normals();
        let pts = mapping.physical_tangents();
        let pel = mapping.physical_edge_lengths();

        let mut v = SymbolicMatrix::identity(ndofs);

        for (i, pair) in EDGE_VERTEX_PAIRS.iter().enumerate() {
            let row = nvertices + i;
            let b11 = pullback_contraction(&rns, &pns, &jacobian, i);
            let b12 = pullback_contraction(&rns, &pts, &jacobian, i);
            v.set([row, row], b11);
            v.set(
                [row, pair[0]],
                division(product(literal(-1.0), b12.clone()), indexed(&pel, &[i])),
            );
            v.set([row, pair[1]], division(b12, indexed(&pel, &[i])));
        }

        // Diagonal post-scaling of the edge columns to improve conditioning
        let h = mapping.cell_size();
        for j in 0..EDGE_VERTEX_PAIRS.len() {
            for i in 0..ndofs {
                v.update([i, nvertices + j], |e| division(e, indexed(&h, &[j])));
            }
        }

        v.into_transpose()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::SymbolicCoordinateMapping;
    use crate::symbolic::evaluate::{evaluate_matrix, Bindings};
    use crate::types::Error;
    use approx::*;
    use rlst::{RandomAccessByRef, Shape};

    fn identity_bindings(cell_sizes: [f64; 3]) -> Bindings {
        let s = 1.0 / f64::sqrt(2.0);
        let mut b = Bindings::new();
        b.bind("J", &[2, 2], &[1.0, 0.0, 0.0, 1.0]).unwrap();
        b.bind("detJ", &[], &[1.0]).unwrap();
        b.bind("physical_tangents", &[3, 2], &[-s, s, 0.0, 1.0, 1.0, 0.0]).unwrap();
        b.bind("physical_normals", &[3, 2], &[s, s, 1.0, 0.0, 0.0, -1.0]).unwrap();
        b.bind("physical_edge_lengths", &[3], &[f64::sqrt(2.0), 1.0, 1.0]).unwrap();
        b.bind("cell_size", &[3], &cell_sizes).unwrap();
        b
    }

    #[test]
    fn test_degree_guard() {
        for degree in [1, 3] {
            assert_eq!(
                Morley::create(ReferenceCellType::Triangle, degree).unwrap_err(),
                Error::Configuration {
                    family: ElementFamily::Morley,
                    degree
                }
            );
        }
    }

    #[test]
    fn test_shape() {
        let e = Morley::create(ReferenceCellType::Triangle, 2).unwrap();
        let m = e.basis_transformation(&SymbolicCoordinateMapping::new());
        assert_eq!(m.shape(), [6, 6]);
        assert_eq!(e.index_shape(), [6]);
        assert_eq!(e.space_dimension(), 6);
    }

    #[test]
    fn test_zero_block() {
        let e = Morley::create(ReferenceCellType::Triangle, 2).unwrap();
        let m = e.basis_transformation(&SymbolicCoordinateMapping::new());
        for i in 0..6 {
            for j in 0..6 {
                // Column 3 + k of the published matrix is edge k's row
                let structural = i == j || (j >= 3 && EDGE_VERTEX_PAIRS[j - 3].contains(&i));
                assert_eq!(m.index(&[i, j]).is_zero(), !structural);
            }
            if i < 3 {
                assert_eq!(m.index(&[i, i]), literal(1.0));
            }
        }
    }

    #[test]
    fn test_identity_mapping() {
        let h = [0.5, 0.25, 2.0];
        let e = Morley::create(ReferenceCellType::Triangle, 2).unwrap();
        let m = e.basis_transformation(&SymbolicCoordinateMapping::new());
        let values = evaluate_matrix(&m, &identity_bindings(h)).unwrap();
        assert_eq!(values.shape(), [6, 6]);
        for i in 0..6 {
            for j in 0..6 {
                // The physical normal of edge 1 points into the cell, the reference one out
                let expected = match (i == j, i) {
                    (false, _) => 0.0,
                    (true, 0..=2) => 1.0,
                    (true, 4) => -1.0 / h[1],
                    (true, _) => 1.0 / h[i - 3],
                };
                assert_relative_eq!(*values.get([i, j]).unwrap(), expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let e = Morley::create(ReferenceCellType::Triangle, 2).unwrap();
        let mapping = SymbolicCoordinateMapping::new();
        let a = e.basis_transformation(&mapping);
        let b = e.basis_transformation(&mapping);
        assert_eq!(a, b);
        let b11_a = a.index(&[3, 3]);
        let b11_b = b.index(&[3, 3]);
        match (&b11_a, &b11_b) {
            (Expression::Division(x, _), Expression::Division(y, _)) => {
                assert!(!std::sync::Arc::ptr_eq(x, y))
            }
            _ => panic!("Expected scaled diagonal entries"),
        }
    }
}
