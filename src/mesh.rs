//! Mesh output: the sink the mesher writes into, and an in-memory mesh.

use std::collections::HashMap;

use nalgebra::Point3;

/// Receiver of mesh vertices and triangles.
///
/// Indices returned by [`MeshSink::add_point`] are dense and start at zero.
/// Triangles are wound so that their normals point out of the enclosed volume.
/// A sink may receive points that no triangle ends up using: joined corner
/// vertices are added before the cells around them are triangulated.
pub trait MeshSink {
    /// Store a vertex and return its index.
    fn add_point(&mut self, p: Point3<f64>) -> usize;

    fn add_triangle(&mut self, a: usize, b: usize, c: usize);

    /// Position of a previously added vertex.
    fn point(&self, index: usize) -> Point3<f64>;
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<[usize; 3]>,
}

impl MeshSink for TriangleMesh {
    fn add_point(&mut self, p: Point3<f64>) -> usize {
        self.vertices.push(p);
        self.vertices.len() - 1
    }

    fn add_triangle(&mut self, a: usize, b: usize, c: usize) {
        self.triangles.push([a, b, c]);
    }

    fn point(&self, index: usize) -> Point3<f64> {
        self.vertices[index]
    }
}

impl TriangleMesh {
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Vertices used by at least one triangle.
    #[must_use]
    pub fn num_referenced_vertices(&self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for &i in self.triangles.iter().flatten() {
            used[i] = true;
        }
        used.iter().filter(|&&u| u).count()
    }

    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    fn corners(&self, t: &[usize; 3]) -> [Point3<f64>; 3] {
        t.map(|i| self.vertices[i])
    }

    /// Total surface area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.corners(t);
                0.5 * (b - a).cross(&(c - a)).norm()
            })
            .sum()
    }

    /// Volume enclosed by the mesh, positive for outward-facing triangles.
    ///
    /// Only meaningful for closed meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.corners(t);
                a.coords.dot(&b.coords.cross(&c.coords))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Number of triangles using each undirected edge `(lo, hi)`.
    #[must_use]
    pub fn edge_use_counts(&self) -> HashMap<(usize, usize), usize> {
        let mut counts = HashMap::new();
        for t in &self.triangles {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Edges used by a single triangle; zero for a closed mesh.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_use_counts().values().filter(|&&n| n == 1).count()
    }

    /// True when every edge is shared by exactly two triangles.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.edge_use_counts().values().all(|&n| n == 2)
    }

    /// True when no directed edge occurs twice, i.e. neighbouring triangles agree on winding.
    #[must_use]
    pub fn is_consistently_oriented(&self) -> bool {
        let mut directed = HashMap::new();
        for t in &self.triangles {
            for k in 0..3 {
                *directed.entry((t[k], t[(k + 1) % 3])).or_insert(0usize) += 1;
            }
        }
        directed.values().all(|&n| n == 1)
    }

    /// `V - E + F`, counting only vertices referenced by a triangle.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn euler_characteristic(&self) -> i64 {
        let v = self.num_referenced_vertices() as i64;
        let e = self.edge_use_counts().len() as i64;
        let f = self.triangles.len() as i64;
        v - e + f
    }

    /// Number of edge-connected triangle components.
    #[must_use]
    pub fn connected_components(&self) -> usize {
        let mut parent: Vec<usize> = (0..self.vertices.len()).collect();
        for t in &self.triangles {
            let root = find(&mut parent, t[0]);
            for &i in &t[1..] {
                let other = find(&mut parent, i);
                parent[other] = root;
            }
        }
        let mut roots: Vec<usize> = self
            .triangles
            .iter()
            .map(|t| find(&mut parent, t[0]))
            .collect();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }

    /// Triangles whose corners are not three distinct indices.
    #[must_use]
    pub fn count_degenerate(&self) -> usize {
        self.triangles
            .iter()
            .filter(|[a, b, c]| a == b || b == c || a == c)
            .count()
    }
}

/// Union-find root with path halving
fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit tetrahedron with outward winding
    fn tetrahedron() -> TriangleMesh {
        let mut mesh = TriangleMesh::default();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ] {
            mesh.add_point(p);
        }
        mesh.add_triangle(0, 2, 1);
        mesh.add_triangle(0, 1, 3);
        mesh.add_triangle(0, 3, 2);
        mesh.add_triangle(1, 2, 3);
        mesh
    }

    #[test]
    fn tetrahedron_metrics() {
        let mesh = tetrahedron();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 4);
        assert_relative_eq!(mesh.signed_volume(), 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.area(), 1.5 + 3.0_f64.sqrt() / 2.0, epsilon = 1e-12);
        assert!(mesh.is_closed());
        assert_eq!(mesh.boundary_edge_count(), 0);
        assert!(mesh.is_consistently_oriented());
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_eq!(mesh.connected_components(), 1);
        assert_eq!(mesh.count_degenerate(), 0);
    }

    #[test]
    fn flipped_triangle_breaks_orientation() {
        let mut mesh = tetrahedron();
        mesh.triangles[3] = [1, 3, 2];
        assert!(mesh.is_closed());
        assert!(!mesh.is_consistently_oriented());
    }

    #[test]
    fn open_mesh_is_not_closed() {
        let mut mesh = tetrahedron();
        mesh.triangles.pop();
        assert!(!mesh.is_closed());
        assert_eq!(mesh.boundary_edge_count(), 3);
        assert_eq!(mesh.euler_characteristic(), 1);
    }

    #[test]
    fn components_are_counted() {
        let mut mesh = tetrahedron();
        let shift = mesh.num_vertices();
        let copy = tetrahedron();
        mesh.vertices.extend(copy.vertices.iter().map(|p| p + nalgebra::Vector3::x() * 5.0));
        mesh.triangles.extend(copy.triangles.iter().map(|t| t.map(|i| i + shift)));
        // A stray vertex with no triangles is not a component
        mesh.add_point(Point3::new(-3.0, 0.0, 0.0));
        assert_eq!(mesh.connected_components(), 2);
        assert_eq!(mesh.euler_characteristic(), 4);
    }

    #[test]
    fn unreferenced_points_are_not_counted() {
        let mut mesh = tetrahedron();
        mesh.add_point(Point3::new(2.0, 2.0, 2.0));
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_referenced_vertices(), 4);
        assert_eq!(mesh.euler_characteristic(), 2);
    }
}
