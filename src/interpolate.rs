//! Edge-crossing vertices shared between neighbouring cubes.

use std::collections::HashMap;

use nalgebra::Point3;

use crate::grid::{ISO, ScalarField};
use crate::joiner::JoinedPlane;
use crate::mesh::MeshSink;

/// Fraction along an edge from the value `v1` to `v2` where the field reaches `ISO`.
///
/// Equal endpoint values give the midpoint; the result is clamped to `[0, 1]`.
#[inline]
#[must_use]
pub fn crossing_fraction(v1: f64, v2: f64) -> f64 {
    if v2 == v1 {
        0.5
    } else {
        ((ISO - v1) / (v2 - v1)).clamp(0.0, 1.0)
    }
}

/// Canonical key of the edge starting at lattice index `lower` along `axis`.
#[inline]
#[must_use]
pub const fn edge_key(lower: usize, axis: usize) -> usize {
    4 * lower + axis
}

/// Lattice edge: lower endpoint plus axis (0 = x, 1 = y, 2 = z)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeEdge {
    pub ix: usize,
    pub iy: usize,
    pub iz: usize,
    pub axis: usize,
}

impl LatticeEdge {
    #[must_use]
    pub const fn upper(&self) -> (usize, usize, usize) {
        match self.axis {
            0 => (self.ix + 1, self.iy, self.iz),
            1 => (self.ix, self.iy + 1, self.iz),
            _ => (self.ix, self.iy, self.iz + 1),
        }
    }
}

/// Rolling cache of emitted edge vertices.
///
/// Edges are filed under the z-plane of their lower endpoint. Layer `k` of the
/// sweep touches planes `k` and `k + 1` only, so two maps suffice.
#[derive(Debug, Default)]
pub struct EdgeCache {
    behind: HashMap<usize, usize>,
    ahead: HashMap<usize, usize>,
    join_threshold: f64,
}

impl EdgeCache {
    #[must_use]
    pub fn new(join_threshold: f64) -> Self {
        Self {
            behind: HashMap::new(),
            ahead: HashMap::new(),
            join_threshold,
        }
    }

    /// Drop plane `k` once layer `k` is finished.
    pub fn advance(&mut self) {
        std::mem::swap(&mut self.behind, &mut self.ahead);
        self.ahead.clear();
    }

    /// Vertex index for `edge`, creating it on first use.
    ///
    /// `layer` is the z-layer being swept; `joined` holds the joined-vertex
    /// tables of planes `layer` and `layer + 1`.
    #[allow(clippy::cast_precision_loss)]
    pub fn vertex<S: MeshSink + ?Sized>(
        &mut self,
        field: &ScalarField,
        edge: LatticeEdge,
        layer: usize,
        joined: [&JoinedPlane; 2],
        sink: &mut S,
    ) -> usize {
        let lower = field.index(edge.ix, edge.iy, edge.iz);
        let key = edge_key(lower, edge.axis);
        let map = if edge.iz == layer {
            &mut self.behind
        } else {
            &mut self.ahead
        };
        if let Some(&index) = map.get(&key) {
            return index;
        }

        let (ux, uy, uz) = edge.upper();
        let v1 = field.get(edge.ix, edge.iy, edge.iz);
        let v2 = field.get(ux, uy, uz);
        let pos = crossing_fraction(v1, v2);

        let lower_joined = joined[edge.iz - layer].get(edge.iy, edge.ix);
        let upper_joined = joined[uz - layer].get(uy, ux);
        let index = match (lower_joined, upper_joined) {
            (Some(j), _) if pos < self.join_threshold => j,
            (_, Some(j)) if pos > 1.0 - self.join_threshold => j,
            _ => {
                let mut lattice = Point3::new(edge.ix as f64, edge.iy as f64, edge.iz as f64);
                lattice[edge.axis] += pos;
                sink.add_point(field.lattice_to_world(&lattice))
            }
        };
        map.insert(key, index);
        index
    }

    /// Number of edges currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behind.len() + self.ahead.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
