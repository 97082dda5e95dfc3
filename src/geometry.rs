//! Coordinate mappings and physical cell geometry

use crate::element::reference_cell;
use crate::symbolic::evaluate::{checked_offset, Environment, EvaluationOptions, Evaluator};
use crate::symbolic::{Expression, Tensor, Variable};
use crate::traits::CoordinateMapping;
use crate::types::{Error, RealArray2, RealScalar, ReferenceCellType, Result};
use itertools::izip;
use log::{debug, warn};
use rayon::prelude::*;
use rlst::prelude::*;
use rlst::{rlst_dynamic_array1, rlst_dynamic_array2, rlst_static_array, rlst_static_type};
use rlst::DynamicArray;

/// Name of the Jacobian variable
pub const JACOBIAN: &str = "J";
/// Name of the Jacobian determinant variable
pub const JACOBIAN_DETERMINANT: &str = "detJ";
/// Name of the physical edge normals variable
pub const PHYSICAL_NORMALS: &str = "physical_normals";
/// Name of the physical edge tangents variable
pub const PHYSICAL_TANGENTS: &str = "physical_tangents";
/// Name of the physical edge lengths variable
pub const PHYSICAL_EDGE_LENGTHS: &str = "physical_edge_lengths";
/// Name of the cell size variable
pub const CELL_SIZE: &str = "cell_size";

/// The midpoint of the reference triangle
const MIDPOINT: [f64; 2] = [1.0 / 3.0, 1.0 / 3.0];

/// A coordinate mapping of the reference triangle whose geometric quantities are symbolic
///
/// Every quantity except the reference normals is a named [`Variable`]; values are
/// substituted by an [`Environment`] such as [`PhysicalTriangle`].
#[derive(Debug, Clone)]
pub struct SymbolicCoordinateMapping {
    cell_type: ReferenceCellType,
}

impl SymbolicCoordinateMapping {
    /// Create a coordinate mapping of the reference triangle
    pub fn new() -> Self {
        Self {
            cell_type: ReferenceCellType::Triangle,
        }
    }

    fn nedges(&self) -> usize {
        reference_cell::entity_counts(self.cell_type)[1]
    }
}

impl Default for SymbolicCoordinateMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateMapping for SymbolicCoordinateMapping {
    fn jacobian_at(&self, point: &[f64]) -> Tensor {
        Tensor::variable(Variable::at_point(JACOBIAN, &[2, 2], point))
    }
    fn detj_at(&self, point: &[f64]) -> Expression {
        Tensor::variable(Variable::at_point(JACOBIAN_DETERMINANT, &[], point)).index(&[])
    }
    fn reference_normals(&self) -> Tensor {
        let values = (0..self.nedges())
            .flat_map(|e| reference_cell::edge_normal::<f64>(self.cell_type, e))
            .collect::<Vec<_>>();
        Tensor::from_values(&[self.nedges(), 2], &values)
    }
    fn physical_normals(&self) -> Tensor {
        Tensor::variable(Variable::new(PHYSICAL_NORMALS, &[self.nedges(), 2]))
    }
    fn physical_tangents(&self) -> Tensor {
        Tensor::variable(Variable::new(PHYSICAL_TANGENTS, &[self.nedges(), 2]))
    }
    fn physical_edge_lengths(&self) -> Tensor {
        Tensor::variable(Variable::new(PHYSICAL_EDGE_LENGTHS, &[self.nedges()]))
    }
    fn cell_size(&self) -> Tensor {
        Tensor::variable(Variable::new(CELL_SIZE, &[self.nedges()]))
    }
}

/// A triangle in the plane, mapped from the reference triangle by a degree 1 or 2 map
///
/// Physical edge vectors are the images of the reference edge vectors under the
/// Jacobian at the reference midpoint. For a degree 1 (affine) map these are the vectors
/// between the triangle's vertices.
pub struct PhysicalTriangle<T: RealScalar> {
    /// Geometry points as columns: the vertices, then (for degree 2) the edge midpoints
    points: DynamicArray<T, 2>,
    tangents: DynamicArray<T, 2>,
    normals: DynamicArray<T, 2>,
    edge_lengths: DynamicArray<T, 1>,
    cell_sizes: Option<[T; 3]>,
}

impl<T: RealScalar> PhysicalTriangle<T> {
    /// Create an affine triangle from its vertices
    pub fn new(vertices: [[T; 2]; 3]) -> Self {
        Self::from_points(&vertices)
    }

    /// Create a curved triangle from its vertices and the midpoints of its edges
    ///
    /// Edge midpoints are given in reference edge order: the edge opposite vertex 0 first.
    pub fn curved(vertices: [[T; 2]; 3], edge_midpoints: [[T; 2]; 3]) -> Self {
        let mut points = vertices.to_vec();
        points.extend_from_slice(&edge_midpoints);
        Self::from_points(&points)
    }

    fn from_points(points: &[[T; 2]]) -> Self {
        let npoints = points.len();
        let points = {
            let mut tmp = rlst_dynamic_array2!(T, [2, npoints]);
            tmp.data_mut().clone_from_slice(&points.concat());
            tmp
        };
        let mut cell = Self {
            points,
            tangents: rlst_dynamic_array2!(T, [2, 3]),
            normals: rlst_dynamic_array2!(T, [2, 3]),
            edge_lengths: rlst_dynamic_array1!(T, [3]),
            cell_sizes: None,
        };

        let [j0, j1] = cell.jacobian(MIDPOINT);
        let mut v = rlst_static_array!(T, 2);
        for e in 0..3 {
            let t = reference_cell::edge_vector::<T>(ReferenceCellType::Triangle, e);
            v.fill_from(j0.view().scalar_mul(t[0]) + j1.view().scalar_mul(t[1]));

            let length = v.view().norm_2();
            v.scale_inplace(T::one() / length);
            cell.edge_lengths[[e]] = length;
            cell.tangents.view_mut().slice(1, e).fill_from(v.view());

            // Rotate clockwise
            cell.normals[[0, e]] = v[[1]];
            cell.normals[[1, e]] = -v[[0]];
        }
        cell
    }

    /// Set the characteristic sizes associated with the cell's edges
    pub fn with_cell_sizes(mut self, cell_sizes: [T; 3]) -> Self {
        self.cell_sizes = Some(cell_sizes);
        self
    }

    /// The degree of the geometry map
    pub fn degree(&self) -> usize {
        if self.points.shape()[1] == 3 {
            1
        } else {
            2
        }
    }

    /// Derivatives of the geometry's shape functions at a reference point
    fn shape_derivatives(&self, point: [f64; 2]) -> Vec<[T; 2]> {
        let [x, y] = point;
        let l = [1.0 - x - y, x, y];
        let dl = [[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]];
        let mut derivs = if self.degree() == 1 {
            dl.to_vec()
        } else {
            izip!(l, dl)
                .map(|(li, dli)| [(4.0 * li - 1.0) * dli[0], (4.0 * li - 1.0) * dli[1]])
                .collect::<Vec<_>>()
        };
        if self.degree() == 2 {
            for e in reference_cell::edges(ReferenceCellType::Triangle) {
                let (a, b) = (e[0], e[1]);
                derivs.push([
                    4.0 * (l[b] * dl[a][0] + l[a] * dl[b][0]),
                    4.0 * (l[b] * dl[a][1] + l[a] * dl[b][1]),
                ]);
            }
        }
        derivs
            .iter()
            .map(|d| [T::from(d[0]).unwrap(), T::from(d[1]).unwrap()])
            .collect()
    }

    /// The columns of the Jacobian of the map at a reference point
    pub fn jacobian(&self, point: [f64; 2]) -> [rlst_static_type!(T, 2); 2] {
        let mut columns = [rlst_static_array!(T, 2), rlst_static_array!(T, 2)];
        for (i, d) in self.shape_derivatives(point).iter().enumerate() {
            for (column, dc) in izip!(columns.iter_mut(), d) {
                column.sum_into(self.points.view().slice(1, i).scalar_mul(*dc));
            }
        }
        columns
    }

    /// The determinant of the Jacobian at a reference point
    pub fn jacobian_determinant(&self, point: [f64; 2]) -> T {
        let [j0, j1] = self.jacobian(point);
        j0[[0]] * j1[[1]] - j1[[0]] * j0[[1]]
    }

    /// Physical edge lengths
    pub fn edge_lengths(&self) -> [T; 3] {
        std::array::from_fn(|e| self.edge_lengths[[e]])
    }

    /// Physical unit edge tangents
    pub fn tangents(&self) -> [[T; 2]; 3] {
        std::array::from_fn(|e| [self.tangents[[0, e]], self.tangents[[1, e]]])
    }

    /// Physical unit edge normals
    pub fn normals(&self) -> [[T; 2]; 3] {
        std::array::from_fn(|e| [self.normals[[0, e]], self.normals[[1, e]]])
    }

    /// The length of the longest edge
    pub fn diameter(&self) -> T {
        self.edge_lengths()
            .into_iter()
            .fold(T::zero(), |d, l| if l > d { l } else { d })
    }

    /// Has a cell size been set explicitly?
    pub fn has_cell_sizes(&self) -> bool {
        self.cell_sizes.is_some()
    }

    /// The characteristic sizes associated with the cell's edges
    ///
    /// If none were set, the diameter of the cell is used for every edge.
    pub fn cell_sizes(&self) -> [T; 3] {
        self.cell_sizes.unwrap_or([self.diameter(); 3])
    }
}

/// Check that a variable has the shape this environment provides for it
fn expect_shape(variable: &Variable, shape: &[usize]) -> Result<()> {
    if variable.shape() == shape {
        Ok(())
    } else {
        Err(Error::ShapeMismatch(format!(
            "{} has shape {shape:?}, not {:?}",
            variable.name(),
            variable.shape()
        )))
    }
}

/// The reference point a variable is sampled at, the midpoint if it has none
fn reference_point(variable: &Variable) -> Result<[f64; 2]> {
    match variable.point() {
        None => Ok(MIDPOINT),
        Some(point) => point.try_into().map_err(|_| {
            Error::ShapeMismatch(format!(
                "{} is sampled at {point:?}, which is not a point of the reference triangle",
                variable.name()
            ))
        }),
    }
}

impl<T: RealScalar> Environment for PhysicalTriangle<T> {
    fn value(&self, variable: &Variable, index: &[usize]) -> Result<f64> {
        let shape: &[usize] = match variable.name() {
            JACOBIAN => &[2, 2],
            JACOBIAN_DETERMINANT => &[],
            PHYSICAL_NORMALS | PHYSICAL_TANGENTS => &[3, 2],
            PHYSICAL_EDGE_LENGTHS | CELL_SIZE => &[3],
            name => return Err(Error::UnboundVariable(name.to_string())),
        };
        expect_shape(variable, shape)?;
        checked_offset(shape, index)?;
        let value = match variable.name() {
            JACOBIAN => self.jacobian(reference_point(variable)?)[index[1]][[index[0]]],
            JACOBIAN_DETERMINANT => self.jacobian_determinant(reference_point(variable)?),
            PHYSICAL_NORMALS => self.normals[[index[1], index[0]]],
            PHYSICAL_TANGENTS => self.tangents[[index[1], index[0]]],
            PHYSICAL_EDGE_LENGTHS => self.edge_lengths[[index[0]]],
            _ => self.cell_sizes()[index[0]],
        };
        num::ToPrimitive::to_f64(&value).ok_or(Error::NonFinite)
    }
}

/// Evaluate a basis transformation on many physical cells in parallel
///
/// The symbolic transformation is built once by the caller and only evaluated here.
pub fn tabulate_transformations<T: RealScalar>(
    transformation: &Tensor,
    cells: &[PhysicalTriangle<T>],
    options: &EvaluationOptions,
) -> Result<Vec<RealArray2>> {
    debug!(
        "Tabulating a {:?} basis transformation on {} cells",
        transformation.shape(),
        cells.len()
    );
    let uses_cell_size = transformation
        .entries()
        .iter()
        .any(|e| e.variables().iter().any(|name| name == CELL_SIZE));
    let unsized_cells = cells.iter().filter(|c| !c.has_cell_sizes()).count();
    if uses_cell_size && unsized_cells > 0 {
        warn!("Cell sizes not set on {unsized_cells} cells. Using the cell diameters instead.");
    }

    let batches = cells
        .par_chunks(options.batch_size().max(1))
        .map(|batch| {
            batch
                .iter()
                .map(|cell| Evaluator::new(cell, options).matrix(transformation))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(batches.into_iter().flatten().collect())
}
