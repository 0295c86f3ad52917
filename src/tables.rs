//! Cube case tables, generated on first use.
//!
//! For every cube code the surface crossing the cube is traced as one or more
//! closed loops of edge vertices. On each face, walking the face corners
//! counter-clockwise as seen from outside, an edge entering the inside region
//! is linked to the next edge leaving it. Faces with four crossings therefore
//! always keep their inside corners apart, and the two cubes sharing a face
//! derive the same segments in opposite directions, which keeps the mesh closed
//! and consistently oriented.
//!
//! Loops are ordered so that triangle normals point out of the inside region.

use std::sync::LazyLock;

use crate::cube::{EDGE_CORNERS, FACE_CORNERS, FACE_EDGES};

/// Polygon slot that refers to the cell centroid instead of an edge vertex.
pub const CENTROID: u8 = 12;

/// Polygons for one cube code.
///
/// Entries of `triangles` and `squares` are edge numbers, or [`CENTROID`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CubeCase {
    /// Bit `e` is set iff edge `e` carries a crossing.
    pub edges: u16,
    /// The case fans out from the cell centroid.
    pub centroid: bool,
    pub triangles: Vec<[u8; 3]>,
    /// Closure squares; the triangulator picks the diagonal.
    pub squares: Vec<[u8; 4]>,
}

impl CubeCase {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty() && self.squares.is_empty()
    }
}

/// All 256 cube cases.
#[derive(Debug)]
pub struct CubeTables {
    cases: Vec<CubeCase>,
}

impl CubeTables {
    fn generate() -> Self {
        Self {
            cases: (0..=255u8).map(build_case).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn case(&self, code: u8) -> &CubeCase {
        &self.cases[usize::from(code)]
    }
}

static TABLES: LazyLock<CubeTables> = LazyLock::new(CubeTables::generate);

/// Shared case tables.
#[must_use]
pub fn tables() -> &'static CubeTables {
    &TABLES
}

const fn is_outside(code: u8, corner: usize) -> bool {
    code & (1 << corner) != 0
}

/// Successor of each active edge along the surface loops of `code`.
fn edge_links(code: u8) -> [Option<usize>; 12] {
    let mut next = [None; 12];
    for (corners, edges) in FACE_CORNERS.iter().zip(FACE_EDGES) {
        let outside = |k: usize| is_outside(code, corners[k % 4]);
        let enters = |k: usize| outside(k) && !outside(k + 1);
        let exits = |k: usize| !outside(k) && outside(k + 1);
        for k in (0..4).filter(|&k| enters(k)) {
            // An entry always has a matching exit further round the face
            if let Some(j) = (1..4).map(|step| (k + step) % 4).find(|&j| exits(j)) {
                next[edges[k]] = Some(edges[j]);
            }
        }
    }
    next
}

/// Closed loops of edge numbers for `code`, each starting at its lowest edge.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn surface_loops(code: u8) -> Vec<Vec<u8>> {
    let next = edge_links(code);
    let mut visited = [false; 12];
    let mut loops = Vec::new();
    for start in 0..12 {
        if visited[start] || next[start].is_none() {
            continue;
        }
        let mut polygon = Vec::new();
        let mut edge = start;
        while !visited[edge] {
            visited[edge] = true;
            polygon.push(edge as u8);
            let Some(following) = next[edge] else {
                break;
            };
            edge = following;
        }
        loops.push(polygon);
    }
    loops
}

fn active_edges(code: u8) -> u16 {
    EDGE_CORNERS
        .iter()
        .enumerate()
        .filter(|(_, [a, b])| is_outside(code, *a) != is_outside(code, *b))
        .fold(0, |mask, (e, _)| mask | (1 << e))
}

fn build_case(code: u8) -> CubeCase {
    let loops = surface_loops(code);
    let mut case = CubeCase {
        edges: active_edges(code),
        ..CubeCase::default()
    };

    if let [only] = loops.as_slice()
        && only.len() >= 6
    {
        case.centroid = true;
        for (i, &a) in only.iter().enumerate() {
            case.triangles.push([a, only[(i + 1) % only.len()], CENTROID]);
        }
        return case;
    }

    for polygon in &loops {
        let Some((&first, rest)) = polygon.split_first() else {
            continue;
        };
        let mut i = 0;
        while i + 2 < rest.len() {
            case.squares.push([first, rest[i], rest[i + 1], rest[i + 2]]);
            i += 2;
        }
        if i + 2 == rest.len() {
            case.triangles.push([first, rest[i], rest[i + 1]]);
        }
    }
    case
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Directed boundary segments of all polygons in a case, with interior
    /// diagonals and centroid spokes cancelled.
    fn boundary(case: &CubeCase) -> HashMap<(u8, u8), i32> {
        let mut count: HashMap<(u8, u8), i32> = HashMap::new();
        let mut add = |polygon: &[u8]| {
            for i in 0..polygon.len() {
                let (a, b) = (polygon[i], polygon[(i + 1) % polygon.len()]);
                *count.entry((a, b)).or_default() += 1;
                *count.entry((b, a)).or_default() -= 1;
            }
        };
        case.triangles.iter().for_each(|t| add(t));
        case.squares.iter().for_each(|s| add(s));
        count.retain(|_, n| *n > 0);
        count
    }

    #[test]
    fn uniform_codes_are_empty() {
        assert!(tables().case(0).is_empty());
        assert!(tables().case(255).is_empty());
        assert_eq!(tables().case(0).edges, 0);
    }

    #[test]
    fn single_outside_corner_is_one_triangle() {
        let case = tables().case(0b0000_0001);
        assert_eq!(case.triangles.len(), 1);
        assert!(case.squares.is_empty());
        assert_eq!(case.edges, (1 << 0) | (1 << 4) | (1 << 8));

        let case = tables().case(0b1111_1110);
        assert_eq!(case.triangles.len(), 1);
    }

    #[test]
    fn half_cube_is_one_square() {
        // z = 0 face outside
        let case = tables().case(0b0000_1111);
        assert!(case.triangles.is_empty());
        assert_eq!(case.squares.len(), 1);
    }

    #[test]
    fn every_active_edge_is_used_once() {
        for code in 0..=255u8 {
            let mut seen = 0u16;
            for polygon in surface_loops(code) {
                for e in polygon {
                    assert_eq!(seen & (1 << e), 0, "code {code:#010b}");
                    seen |= 1 << e;
                }
            }
            assert_eq!(seen, tables().case(code).edges, "code {code:#010b}");
        }
    }

    #[test]
    fn polygons_close_the_loops() {
        for code in 0..=255u8 {
            let case = tables().case(code);
            let mut expected = HashMap::new();
            for polygon in surface_loops(code) {
                for i in 0..polygon.len() {
                    expected.insert((polygon[i], polygon[(i + 1) % polygon.len()]), 1);
                }
            }
            assert_eq!(boundary(case), expected, "code {code:#010b}");
        }
    }

    #[test]
    fn loop_segments_lie_on_faces() {
        for code in 0..=255u8 {
            for polygon in surface_loops(code) {
                for i in 0..polygon.len() {
                    let a = usize::from(polygon[i]);
                    let b = usize::from(polygon[(i + 1) % polygon.len()]);
                    assert!(
                        FACE_EDGES.iter().any(|f| f.contains(&a) && f.contains(&b)),
                        "code {code:#010b}"
                    );
                }
            }
        }
    }

    #[test]
    fn centroid_only_for_long_single_loops() {
        let mut fans = 0;
        for code in 0..=255u8 {
            let case = tables().case(code);
            if case.centroid {
                fans += 1;
                assert!(case.squares.is_empty());
                assert!(case.triangles.len() >= 6);
                assert!(case.triangles.iter().all(|t| t[2] == CENTROID));
            } else {
                assert!(case.triangles.iter().flatten().all(|&e| e < CENTROID));
            }
        }
        // Hexagonal cross sections exist, e.g. a corner and its three neighbours inside
        assert!(fans > 0);
    }

    #[test]
    fn separated_corners_give_separate_sheets() {
        // Corners 0 and 7 inside, everything else outside
        let code = !(1u8 | (1 << 7));
        assert_eq!(surface_loops(code).len(), 2);
        let case = tables().case(code);
        assert_eq!(case.triangles.len(), 2);
    }
}
