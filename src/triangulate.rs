//! Turn a cube case into mesh triangles.
//!
//! Vertex indices come from the edge cache, so several edges of one cell may
//! share a joined vertex. Polygons that collapse under such sharing are
//! dropped or reduced instead of emitting degenerate triangles.

use log::debug;
use nalgebra::{Point3, Vector3};

use crate::mesh::MeshSink;
use crate::tables::{CENTROID, CubeCase};

/// Sixteen times the squared area of triangle `(p, q, r)`, from its side lengths.
#[must_use]
pub fn area_sq16(p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>) -> f64 {
    let u = (q - p).norm_squared();
    let v = (r - p).norm_squared();
    let w = (r - q).norm_squared();
    let s = u + v - w;
    4.0f64.mul_add(u * v, -(s * s))
}

fn add_distinct<S: MeshSink + ?Sized>(sink: &mut S, a: usize, b: usize, c: usize) -> bool {
    if a == b || b == c || a == c {
        return false;
    }
    sink.add_triangle(a, b, c);
    true
}

/// Split a closure square along the diagonal that gives the fatter pair of triangles.
///
/// Returns the number of triangles emitted.
pub fn emit_square<S: MeshSink + ?Sized>(sink: &mut S, quad: [usize; 4]) -> usize {
    let mut ring: Vec<usize> = Vec::with_capacity(4);
    for v in quad {
        if ring.last() != Some(&v) {
            ring.push(v);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    match ring.as_slice() {
        &[a, b, c] => usize::from(add_distinct(sink, a, b, c)),
        &[a, b, c, d] => {
            if a == c || b == d {
                return 0;
            }
            let [pa, pb, pc, pd] = [a, b, c, d].map(|i| sink.point(i));
            let along_ac = [area_sq16(&pa, &pb, &pc), area_sq16(&pa, &pc, &pd)];
            let along_bd = [area_sq16(&pa, &pb, &pd), area_sq16(&pb, &pc, &pd)];

            let thinnest = |areas: [f64; 2]| areas[0].min(areas[1]);
            let (split, areas) = if thinnest(along_bd) > thinnest(along_ac) {
                ([[a, b, d], [b, c, d]], along_bd)
            } else {
                ([[a, b, c], [a, c, d]], along_ac)
            };
            if areas.iter().all(|&s| s <= 0.0) {
                debug!("Skipping flat closure square {quad:?}");
                return 0;
            }
            for [x, y, z] in split {
                sink.add_triangle(x, y, z);
            }
            2
        }
        _ => 0,
    }
}

/// Emit the polygons of `case` for one cell.
///
/// `edge_vertices[e]` must hold the vertex index of every active edge `e`.
/// Returns the number of triangles emitted.
#[allow(clippy::cast_precision_loss)]
pub fn emit_cell<S: MeshSink + ?Sized>(
    case: &CubeCase,
    edge_vertices: &[usize; 12],
    sink: &mut S,
) -> usize {
    let centroid = if case.centroid {
        let active: Vec<usize> = (0..12).filter(|e| case.edges & (1 << e) != 0).collect();
        let sum = active
            .iter()
            .fold(Vector3::zeros(), |acc, &e| acc + sink.point(edge_vertices[e]).coords);
        Some(sink.add_point(Point3::from(sum / active.len() as f64)))
    } else {
        None
    };
    let slot = |s: u8| {
        if s == CENTROID {
            centroid.unwrap_or_default()
        } else {
            edge_vertices[usize::from(s)]
        }
    };

    let mut emitted = 0;
    for &[a, b, c] in &case.triangles {
        if add_distinct(sink, slot(a), slot(b), slot(c)) {
            emitted += 1;
        }
    }
    for square in &case.squares {
        emitted += emit_square(sink, square.map(slot));
    }
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriangleMesh;
    use crate::tables::tables;
    use approx::assert_relative_eq;

    fn mesh_with(points: &[[f64; 3]]) -> TriangleMesh {
        let mut mesh = TriangleMesh::default();
        for p in points {
            mesh.add_point(Point3::from(*p));
        }
        mesh
    }

    #[test]
    fn right_triangle_area() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 0.0, 0.0);
        let c = Point3::new(0.0, 4.0, 0.0);
        // Area 6
        assert_relative_eq!(area_sq16(&a, &b, &c), 16.0 * 36.0, epsilon = 1e-9);
        assert_relative_eq!(area_sq16(&a, &b, &Point3::new(6.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn square_takes_the_fatter_diagonal() {
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]];
        for quad in [[0, 1, 2, 3], [1, 2, 3, 0]] {
            let mut mesh = mesh_with(&points);
            assert_eq!(emit_square(&mut mesh, quad), 2);
            // Splitting along 0-2 keeps both triangles away from zero area
            for t in &mesh.triangles {
                assert!(t.contains(&0) && t.contains(&2), "{quad:?}: {t:?}");
            }
        }
    }

    #[test]
    fn square_with_shared_corner_becomes_triangle() {
        let mut mesh = mesh_with(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(emit_square(&mut mesh, [0, 1, 1, 2]), 1);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);

        let mut mesh = mesh_with(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(emit_square(&mut mesh, [2, 0, 1, 2]), 1);
    }

    #[test]
    fn pinched_square_is_dropped() {
        let mut mesh = mesh_with(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(emit_square(&mut mesh, [0, 1, 0, 2]), 0);
        assert_eq!(emit_square(&mut mesh, [0, 1, 1, 0]), 0);
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn flat_square_is_dropped() {
        let mut mesh = mesh_with(&[[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]);
        assert_eq!(emit_square(&mut mesh, [0, 1, 2, 3]), 0);
    }

    #[test]
    fn collapsed_triangle_is_skipped() {
        // One outside corner: a single triangle over edges 0, 4 and 8
        let case = tables().case(1);
        let mut mesh = mesh_with(&[[0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.5]]);
        let mut edge_vertices = [0; 12];
        edge_vertices[4] = 1;
        edge_vertices[8] = 2;
        assert_eq!(emit_cell(case, &edge_vertices, &mut mesh), 1);

        // Edges 0 and 4 share a joined vertex
        edge_vertices[4] = 0;
        assert_eq!(emit_cell(case, &edge_vertices, &mut mesh), 0);
        assert_eq!(mesh.num_triangles(), 1);
    }

    #[test]
    fn centroid_fan_uses_mean_position() {
        let code = (0..=255u8)
            .find(|&c| tables().case(c).centroid)
            .expect("a fan case");
        let case = tables().case(code);
        let mut mesh = TriangleMesh::default();
        let mut edge_vertices = [usize::MAX; 12];
        let mut expected = Vector3::zeros();
        let mut active = 0.0;
        for e in (0..12).filter(|e| case.edges & (1 << e) != 0) {
            let p = Point3::new(f64::from(e), 1.0, 2.0 * f64::from(e));
            expected += p.coords;
            active += 1.0;
            edge_vertices[e as usize] = mesh.add_point(p);
        }
        let emitted = emit_cell(case, &edge_vertices, &mut mesh);
        assert_eq!(emitted, case.triangles.len());

        let centroid = mesh.vertices.last().expect("centroid");
        assert_relative_eq!(centroid.coords, expected / active, epsilon = 1e-12);
        let centroid_index = mesh.num_vertices() - 1;
        assert!(mesh.triangles.iter().all(|t| t[2] == centroid_index));
    }
}
