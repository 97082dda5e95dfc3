//! Cell definitions

use crate::types::ReferenceCellType;
use num::Float;

/// The topological dimension of the cell
pub fn dim(cell: ReferenceCellType) -> usize {
    match cell {
        ReferenceCellType::Point => 0,
        ReferenceCellType::Interval => 1,
        ReferenceCellType::Triangle => 2,
        ReferenceCellType::Quadrilateral => 2,
    }
}

/// The vertices of the reference cell
pub fn vertices<T: Float>(cell: ReferenceCellType) -> Vec<Vec<T>> {
    let zero = T::zero();
    let one = T::one();
    match cell {
        ReferenceCellType::Point => vec![],
        ReferenceCellType::Interval => vec![vec![zero], vec![one]],
        ReferenceCellType::Triangle => vec![vec![zero, zero], vec![one, zero], vec![zero, one]],
        ReferenceCellType::Quadrilateral => vec![
            vec![zero, zero],
            vec![one, zero],
            vec![zero, one],
            vec![one, one],
        ],
    }
}

/// The midpoint of the cell
pub fn midpoint<T: Float>(cell: ReferenceCellType) -> Vec<T> {
    let half = T::from(0.5).unwrap();
    let third = T::one() / T::from(3.0).unwrap();
    match cell {
        ReferenceCellType::Point => vec![],
        ReferenceCellType::Interval => vec![half],
        ReferenceCellType::Triangle => vec![third; 2],
        ReferenceCellType::Quadrilateral => vec![half; 2],
    }
}

/// The edges of the reference cell
pub fn edges(cell: ReferenceCellType) -> Vec<Vec<usize>> {
    match cell {
        ReferenceCellType::Point => vec![],
        ReferenceCellType::Interval => vec![vec![0, 1]],
        ReferenceCellType::Triangle => vec![vec![1, 2], vec![0, 2], vec![0, 1]],
        ReferenceCellType::Quadrilateral => vec![vec![0, 1], vec![0, 2], vec![1, 3], vec![2, 3]],
    }
}

/// The number of subentities of each dimension
pub fn entity_counts(cell: ReferenceCellType) -> Vec<usize> {
    match cell {
        ReferenceCellType::Point => vec![1, 0, 0, 0],
        ReferenceCellType::Interval => vec![2, 1, 0, 0],
        ReferenceCellType::Triangle => vec![3, 3, 1, 0],
        ReferenceCellType::Quadrilateral => vec![4, 4, 1, 0],
    }
}

/// The (unnormalised) tangent of an edge, pointing from its first to its second vertex
pub fn edge_vector<T: Float>(cell: ReferenceCellType, edge: usize) -> Vec<T> {
    let v = vertices::<T>(cell);
    let e = &edges(cell)[edge];
    v[e[1]]
        .iter()
        .zip(&v[e[0]])
        .map(|(end, start)| *end - *start)
        .collect()
}

/// The unit tangent of an edge of a two-dimensional cell
pub fn edge_tangent<T: Float>(cell: ReferenceCellType, edge: usize) -> [T; 2] {
    assert_eq!(dim(cell), 2);
    let t = edge_vector::<T>(cell, edge);
    let length = t[0].hypot(t[1]);
    [t[0] / length, t[1] / length]
}

/// The outward unit normal of an edge of a two-dimensional cell
///
/// This is the tangent rotated clockwise, `(t1, -t0)`, flipped if it points towards the
/// midpoint of the cell.
pub fn edge_normal<T: Float>(cell: ReferenceCellType, edge: usize) -> [T; 2] {
    let [t0, t1] = edge_tangent::<T>(cell, edge);
    let start = &vertices::<T>(cell)[edges(cell)[edge][0]];
    let m = midpoint::<T>(cell);
    if t1 * (start[0] - m[0]) - t0 * (start[1] - m[1]) < T::zero() {
        [-t1, t0]
    } else {
        [t1, -t0]
    }
}
