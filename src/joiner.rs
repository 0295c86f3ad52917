//! Corner joining: merge edge crossings that crowd around one lattice corner.
//!
//! Plain marching cubes produces slivers whenever the surface passes very
//! close to a lattice point, because the crossings on the incident edges end
//! up nearly coincident. Those crossings are replaced by a single vertex
//! placed at their mean position.

use nalgebra::{Point3, Vector3};

use crate::grid::ScalarField;
use crate::interpolate::crossing_fraction;
use crate::mesh::MeshSink;

/// Joined-vertex table for one z-plane of the lattice, addressed by `(row, col) = (iy, ix)`
#[derive(Debug, Clone)]
pub struct JoinedPlane {
    cols: usize,
    slots: Vec<Option<usize>>,
}

impl JoinedPlane {
    #[must_use]
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            slots: vec![None; cols * rows],
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.slots[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, index: usize) {
        self.slots[row * self.cols + col] = Some(index);
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Number of joined vertices in the plane.
    #[must_use]
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Incident edge of a corner: axis and direction (+1 or -1)
const INCIDENT: [(usize, i8); 6] = [(0, 1), (0, -1), (1, 1), (1, -1), (2, 1), (2, -1)];

/// Decide whether the corner at `(ix, iy, iz)` gets a joined vertex, and where.
///
/// Returns the joined position in lattice units. The corner must not lie on
/// the lattice boundary.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn joined_position(
    field: &ScalarField,
    ix: usize,
    iy: usize,
    iz: usize,
    join_threshold: f64,
) -> Option<Point3<f64>> {
    let corner = [ix, iy, iz];
    let inside = field.is_inside(ix, iy, iz);
    let value = field.get(ix, iy, iz);

    let mut sign_changes = 0;
    let mut close = 0;
    let mut close_axes = [0usize; 6];
    let mut offset = Vector3::zeros();

    for (axis, dir) in INCIDENT {
        let mut far = corner;
        if dir > 0 {
            far[axis] += 1;
        } else {
            far[axis] -= 1;
        }
        if field.is_inside(far[0], far[1], far[2]) == inside {
            continue;
        }
        sign_changes += 1;

        let far_value = field.get(far[0], far[1], far[2]);
        // Same arithmetic as the edge interpolator: fraction from the lower endpoint
        let (distance, is_close) = if dir > 0 {
            let pos = crossing_fraction(value, far_value);
            (pos, pos < join_threshold)
        } else {
            let pos = crossing_fraction(far_value, value);
            (1.0 - pos, pos > 1.0 - join_threshold)
        };
        if is_close {
            close_axes[close] = axis;
            close += 1;
            offset[axis] += f64::from(dir) * distance;
        }
    }

    if close < 2 {
        return None;
    }
    // Isolated bubble with a crossing that is not close: keep its topology
    if sign_changes == 6 && close != 6 {
        return None;
    }
    // Two sheets straddling the corner along one axis must not be welded
    if close == 2 && close_axes[0] == close_axes[1] {
        return None;
    }

    let base = Point3::new(ix as f64, iy as f64, iz as f64);
    Some(base + offset / close as f64)
}

/// Fill `plane` with the joined vertices of lattice plane `iz`.
///
/// Boundary planes and boundary rows/columns never get joined vertices.
/// Points go to `sink` immediately; if every triangle around a corner turns
/// out degenerate, its joined vertex stays unreferenced.
pub fn join_plane<S: MeshSink + ?Sized>(
    field: &ScalarField,
    iz: usize,
    join_threshold: f64,
    plane: &mut JoinedPlane,
    sink: &mut S,
) {
    plane.clear();
    let [sx, sy, sz] = field.dims();
    if join_threshold <= 0.0 || iz == 0 || iz + 1 >= sz || sx < 3 || sy < 3 {
        return;
    }
    for iy in 1..sy - 1 {
        for ix in 1..sx - 1 {
            if let Some(lattice) = joined_position(field, ix, iy, iz, join_threshold) {
                let index = sink.add_point(field.lattice_to_world(&lattice));
                plane.set(iy, ix, index);
            }
        }
    }
}
