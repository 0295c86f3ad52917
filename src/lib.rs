//! Marching-cubes molecular surfaces from atomic balls.
//!
//! Balls are rasterized into a scalar occupancy field, optionally eroded by a
//! rolling probe, and meshed with a plane-by-plane marching cubes sweep that
//! merges crossings crowding around lattice corners. Van der Waals,
//! solvent-accessible (Lee-Richards) and solvent-excluded (Connolly) surfaces
//! are supported.
//!
//! # Example
//!
//! ```
//! use molsurf::{Ball, SurfaceParams, SurfaceType, compute_surface};
//!
//! let balls = vec![
//!     Ball::new(0.0, 0.0, 0.0, 1.5),
//!     Ball::new(3.0, 0.0, 0.0, 1.5),
//!     Ball::new(1.5, 2.5, 0.0, 1.5),
//! ];
//!
//! let params = SurfaceParams::default().with_surface_type(SurfaceType::Connolly);
//! let result = compute_surface(&balls, &params);
//!
//! println!(
//!     "{} vertices, {} triangles, volume={:.2}",
//!     result.mesh.num_vertices(),
//!     result.mesh.num_triangles(),
//!     result.info.volume
//! );
//! ```

pub mod cube;
pub mod erosion;
pub mod graphics;
pub mod grid;
pub mod input;
pub mod interpolate;
pub mod joiner;
pub mod marching;
pub mod mesh;
#[cfg(feature = "python")]
mod python;
mod surface;
pub mod tables;
pub mod triangulate;
mod types;

pub use erosion::erode;
pub use grid::{ISO, ScalarField, estimate_volume, rasterize};
pub use marching::march;
pub use mesh::{MeshSink, TriangleMesh};
pub use surface::{compute_field, compute_surface, compute_surface_into};
pub use types::{
    Ball, DEFAULT_JOIN_THRESHOLD, DEFAULT_PROBE, DEFAULT_VOXEL_SIZE, ParamsError, SurfaceInfo,
    SurfaceParams, SurfaceResult, SurfaceType,
};
