//! Arnold-Awanou-Winther elements

use crate::element::{reference_cell, ReferenceLayout, SymbolicMatrix};
use crate::symbolic::{division, indexed, literal, product, sum, Expression, Tensor};
use crate::traits::{
    CoordinateMapping, PhysicallyMappedElement, ReferenceEdgeFrame, ReferenceElement,
};
use crate::types::{ElementFamily, ReferenceCellType, Result};
use log::debug;

/// A nonconforming Arnold-Awanou-Winther symmetric-tensor element
///
/// Each edge carries four DOFs; the second and fourth of these depend on the metric of
/// the physical cell. The three interior DOFs map trivially.
#[derive(Debug, Clone)]
pub struct ArnoldAwanouWinther {
    reference: ReferenceLayout,
    evaluation_point: Vec<f64>,
}

impl ArnoldAwanouWinther {
    /// Create an Arnold-Awanou-Winther element
    pub fn create(cell_type: ReferenceCellType, degree: usize) -> Result<Self> {
        let reference = ReferenceLayout::arnold_awanou_winther(cell_type, degree)?;
        Ok(Self {
            reference,
            evaluation_point: reference_cell::midpoint(cell_type),
        })
    }
}

/// The pulled back metric `J^T J`
fn metric(jacobian: &Tensor) -> [[Expression; 2]; 2] {
    let entry = |a: usize, b: usize| {
        sum(
            product(indexed(jacobian, &[0, a]), indexed(jacobian, &[0, b])),
            product(indexed(jacobian, &[1, a]), indexed(jacobian, &[1, b])),
        )
    };
    [[entry(0, 0), entry(0, 1)], [entry(1, 0), entry(1, 1)]]
}

/// The dot product of a constant direction with a vector of expressions
fn dot(direction: [f64; 2], v: &[Expression; 2]) -> Expression {
    sum(
        product(literal(direction[0]), v[0].clone()),
        product(literal(direction[1]), v[1].clone()),
    )
}

impl PhysicallyMappedElement for ArnoldAwanouWinther {
    fn family(&self) -> ElementFamily {
        ElementFamily::ArnoldAwanouWinther
    }

    fn reference(&self) -> &ReferenceLayout {
        &self.reference
    }

    fn basis_transformation(&self, mapping: &impl CoordinateMapping) -> Tensor {
        debug!("Building Arnold-Awanou-Winther basis transformation");
        let ndofs = self.reference.dim();
        let nedges = self.reference.entity_dof_map()[1].len();
        let edge_dofs = 4 * nedges;

        let mut v = SymbolicMatrix::zeros([ndofs, ndofs]);
        for i in (0..edge_dofs).step_by(2) {
            v.set([i, i], literal(1.0));
        }

        let detj = mapping.detj_at(&self.evaluation_point);
        let jtj = metric(&mapping.jacobian_at(&self.evaluation_point));

        for e in 0..nedges {
            let that = self.reference.edge_tangent(e);
            let nhat = self.reference.edge_normal(e);

            let jtj_t = [dot(that, &jtj[0]), dot(that, &jtj[1])];
            let alpha = division(dot(nhat, &jtj_t), detj.clone());
            let beta = division(dot(that, &jtj_t), detj.clone());

            for idx in [4 * e + 1, 4 * e + 3] {
                v.set(
                    [idx, idx - 1],
                    division(product(literal(-1.0), alpha.clone()), beta.clone()),
                );
                v.set([idx, idx], division(literal(1.0), beta.clone()));
            }
        }

        for i in edge_dofs..ndofs {
            v.set([i, i], literal(1.0));
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

    fn jacobian_bindings(j: [f64; 4]) -> Bindings {
        let mut b = Bindings::new();
        b.bind("J", &[2, 2], &j).unwrap();
        b.bind("detJ", &[], &[j[0] * j[3] - j[1] * j[2]]).unwrap();
        b
    }

    fn element() -> ArnoldAwanouWinther {
        ArnoldAwanouWinther::create(ReferenceCellType::Triangle, 2).unwrap()
    }

    #[test]
    fn test_create() {
        assert!(ArnoldAwanouWinther::create(ReferenceCellType::Triangle, 3).is_err());
        assert_eq!(
            ArnoldAwanouWinther::create(ReferenceCellType::Quadrilateral, 2).unwrap_err(),
            Error::UnsupportedCell {
                family: ElementFamily::ArnoldAwanouWinther,
                cell: ReferenceCellType::Quadrilateral
            }
        );
    }

    #[test]
    fn test_shape() {
        let e = element();
        let m = e.basis_transformation(&SymbolicCoordinateMapping::new());
        assert_eq!(m.shape(), [15, 15]);
        assert_eq!(e.index_shape(), [15]);
    }

    #[test]
    fn test_zero_block() {
        let m = element().basis_transformation(&SymbolicCoordinateMapping::new());
        for i in 0..15 {
            for j in 0..15 {
                // Column idx of the published matrix is row idx of the working matrix
                let corrected = j < 12 && j % 2 == 1 && (i == j || i + 1 == j);
                assert_eq!(m.index(&[i, j]).is_zero(), !(i == j || corrected));
            }
        }
        for i in (0..12).step_by(2) {
            assert_eq!(m.index(&[i, i]), literal(1.0));
        }
        for i in 12..15 {
            assert_eq!(m.index(&[i, i]), literal(1.0));
        }
    }

    #[test]
    fn test_identity_mapping() {
        let m = element().basis_transformation(&SymbolicCoordinateMapping::new());
        let values = evaluate_matrix(&m, &jacobian_bindings([1.0, 0.0, 0.0, 1.0])).unwrap();
        assert_eq!(values.shape(), [15, 15]);
        for i in 0..15 {
            for j in 0..15 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(*values.get([i, j]).unwrap(), expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_conformal_mapping() {
        // A scaled rotation preserves angles, so no correction is needed
        let (c, s) = (2.0 * f64::cos(0.3), 2.0 * f64::sin(0.3));
        let m = element().basis_transformation(&SymbolicCoordinateMapping::new());
        let values = evaluate_matrix(&m, &jacobian_bindings([c, -s, s, c])).unwrap();
        for i in 0..15 {
            for j in 0..15 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(*values.get([i, j]).unwrap(), expected, epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn test_shear_mapping() {
        let j = [1.0, 0.5, 0.0, 2.0];
        let detj = 2.0;
        let jtj = [
            [j[0] * j[0] + j[2] * j[2], j[0] * j[1] + j[2] * j[3]],
            [j[1] * j[0] + j[3] * j[2], j[1] * j[1] + j[3] * j[3]],
        ];
        let s = 1.0 / f64::sqrt(2.0);
        let tangents = [[-s, s], [0.0, 1.0], [1.0, 0.0]];
        let normals = [[s, s], [-1.0, 0.0], [0.0, -1.0]];

        let m = element().basis_transformation(&SymbolicCoordinateMapping::new());
        let values = evaluate_matrix(&m, &jacobian_bindings(j)).unwrap();
        for e in 0..3 {
            let t = tangents[e];
            let n = normals[e];
            let v = [
                jtj[0][0] * t[0] + jtj[0][1] * t[1],
                jtj[1][0] * t[0] + jtj[1][1] * t[1],
            ];
            let alpha = (n[0] * v[0] + n[1] * v[1]) / detj;
            let beta = (t[0] * v[0] + t[1] * v[1]) / detj;
            for idx in [4 * e + 1, 4 * e + 3] {
                // Published matrix is transposed
                assert_relative_eq!(
                    *values.get([idx - 1, idx]).unwrap(),
                    -alpha / beta,
                    epsilon = 1e-13
                );
                assert_relative_eq!(*values.get([idx, idx]).unwrap(), 1.0 / beta, epsilon = 1e-13);
                assert_relative_eq!(*values.get([idx - 1, idx - 1]).unwrap(), 1.0);
            }
        }
    }

    #[test]
    fn test_shear_edge_correction() {
        // J = [[1, 0.5], [0, 2]] maps onto the triangle (0, 0), (1, 0), (0.5, 2). Along edge 1
        // J^T J t = (0.5, 4.25), so alpha = -0.25 and beta = 2.125.
        let m = element().basis_transformation(&SymbolicCoordinateMapping::new());
        let values = evaluate_matrix(&m, &jacobian_bindings([1.0, 0.5, 0.0, 2.0])).unwrap();
        assert_relative_eq!(*values.get([4, 5]).unwrap(), 2.0 / 17.0, epsilon = 1e-14);
        assert_relative_eq!(*values.get([5, 5]).unwrap(), 8.0 / 17.0, epsilon = 1e-14);
        assert_relative_eq!(*values.get([6, 7]).unwrap(), 2.0 / 17.0, epsilon = 1e-14);
    }

    #[test]
    fn test_degenerate_geometry() {
        let m = element().basis_transformation(&SymbolicCoordinateMapping::new());
        let result = evaluate_matrix(&m, &jacobian_bindings([1.0, 2.0, 0.5, 1.0]));
        assert_eq!(result.unwrap_err(), Error::DivisionByZero);
    }
}
