//! Plane-by-plane marching cubes sweep.
//!
//! Layer `k` covers the cells between lattice planes `k` and `k + 1`. Only the
//! joined-vertex tables and edge vertices of those two planes are kept, so
//! memory beyond the field itself stays proportional to one plane.

use log::trace;

use crate::cube::{CORNER_OFFSETS, EDGE_AXIS, EDGE_CORNERS, cube_code};
use crate::grid::ScalarField;
use crate::interpolate::{EdgeCache, LatticeEdge};
use crate::joiner::{JoinedPlane, join_plane};
use crate::mesh::MeshSink;
use crate::tables::tables;
use crate::triangulate::emit_cell;

/// Extract the `ISO` surface of `field` into `sink`.
///
/// Vertices are written in world coordinates. `join_threshold` of zero turns
/// corner joining off. Returns the number of triangles emitted.
///
/// Without joining the mesh is a closed, consistently oriented 2-manifold.
/// Joined vertices may pinch neighbouring sheets together, so a joined mesh
/// can have edges shared by more than two triangles and may merge components.
/// Do not rely on
/// [`TriangleMesh::is_closed`](crate::mesh::TriangleMesh::is_closed) there.
pub fn march<S: MeshSink + ?Sized>(
    field: &ScalarField,
    join_threshold: f64,
    sink: &mut S,
) -> usize {
    let [sx, sy, sz] = field.dims();
    if sx < 2 || sy < 2 || sz < 2 {
        return 0;
    }
    let tables = tables();
    let mut cache = EdgeCache::new(join_threshold);

    // Plane 0 is a boundary plane and never has joined vertices
    let mut behind = JoinedPlane::new(sx, sy);
    let mut ahead = JoinedPlane::new(sx, sy);
    join_plane(field, 1, join_threshold, &mut ahead, sink);

    let mut emitted = 0;
    for iz in 0..sz - 1 {
        let mut layer_triangles = 0;
        for iy in 0..sy - 1 {
            for ix in 0..sx - 1 {
                let samples: [f64; 8] = std::array::from_fn(|c| {
                    let [dx, dy, dz] = CORNER_OFFSETS[c];
                    field.get(ix + dx, iy + dy, iz + dz)
                });
                let case = tables.case(cube_code(&samples));
                if case.is_empty() {
                    continue;
                }

                let mut edge_vertices = [0; 12];
                for (e, vertex) in edge_vertices.iter_mut().enumerate() {
                    if case.edges & (1 << e) == 0 {
                        continue;
                    }
                    let [dx, dy, dz] = CORNER_OFFSETS[EDGE_CORNERS[e][0]];
                    let edge = LatticeEdge {
                        ix: ix + dx,
                        iy: iy + dy,
                        iz: iz + dz,
                        axis: EDGE_AXIS[e],
                    };
                    *vertex = cache.vertex(field, edge, iz, [&behind, &ahead], sink);
                }
                layer_triangles += emit_cell(case, &edge_vertices, sink);
            }
        }
        trace!(
            "Layer {iz}: {layer_triangles} triangles, {} cached edges",
            cache.len()
        );
        emitted += layer_triangles;

        cache.advance();
        std::mem::swap(&mut behind, &mut ahead);
        join_plane(field, iz + 2, join_threshold, &mut ahead, sink);
    }
    emitted
}
