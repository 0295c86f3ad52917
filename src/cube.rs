//! Cube geometry and classification.
//!
//! Corner `i` of a cell sits at lattice offset `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`
//! from the cell origin. Edges are numbered by axis: 0-3 run along x, 4-7 along
//! y and 8-11 along z.

use crate::grid::ISO;

/// Lattice offset of each corner.
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Corner pair of each edge, lower corner first.
pub const EDGE_CORNERS: [[usize; 2]; 12] = [
    [0, 1],
    [2, 3],
    [4, 5],
    [6, 7],
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Lattice axis of each edge.
pub const EDGE_AXIS: [usize; 12] = [0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2];

/// Corners of each face, counter-clockwise as seen from outside the cube.
pub const FACE_CORNERS: [[usize; 4]; 6] = [
    [0, 4, 6, 2], // x = 0
    [1, 3, 7, 5], // x = 1
    [0, 1, 5, 4], // y = 0
    [2, 6, 7, 3], // y = 1
    [0, 2, 3, 1], // z = 0
    [4, 5, 7, 6], // z = 1
];

/// Edges of each face; edge `k` runs from `FACE_CORNERS[f][k]` to `FACE_CORNERS[f][k + 1]`.
pub const FACE_EDGES: [[usize; 4]; 6] = [
    [8, 6, 10, 4],
    [5, 11, 7, 9],
    [0, 9, 2, 8],
    [10, 3, 11, 1],
    [4, 1, 5, 0],
    [2, 7, 3, 6],
];

/// Edge joining two corners, if they are adjacent.
#[must_use]
pub fn edge_between(a: usize, b: usize) -> Option<usize> {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    EDGE_CORNERS.iter().position(|&[p, q]| p == lo && q == hi)
}

/// 8-bit cube code: bit `i` is set iff corner `i` lies below `ISO` (outside).
#[inline]
#[must_use]
pub fn cube_code(samples: &[f64; 8]) -> u8 {
    samples
        .iter()
        .enumerate()
        .fold(0u8, |code, (i, &v)| if v < ISO { code | (1 << i) } else { code })
}
