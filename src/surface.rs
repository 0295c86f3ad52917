use log::{debug, info};

use crate::erosion::erode;
use crate::grid::{ScalarField, estimate_volume, rasterize};
use crate::marching::march;
use crate::mesh::{MeshSink, TriangleMesh};
use crate::types::{Ball, SurfaceInfo, SurfaceParams, SurfaceResult, SurfaceType};

/// Occupancy field for `balls`, eroded by the probe for Connolly surfaces.
#[must_use]
pub fn compute_field(balls: &[Ball], params: &SurfaceParams) -> ScalarField {
    let probe = params.effective_probe();
    let field = rasterize(balls, probe, params.voxel_size);
    if params.surface_type == SurfaceType::Connolly && probe > 0.0 {
        erode(&field, probe)
    } else {
        field
    }
}

/// Mesh the surface of `balls` into a caller-supplied sink.
///
/// Parameters are used as given; call [`SurfaceParams::validate`] first when
/// they come from user input.
pub fn compute_surface_into<S: MeshSink + ?Sized>(
    balls: &[Ball],
    params: &SurfaceParams,
    sink: &mut S,
) -> SurfaceInfo {
    let field = compute_field(balls, params);
    let volume = estimate_volume(&field);
    let [sx, sy, sz] = field.dims();
    debug!(
        "{} surface on {sx}x{sy}x{sz} lattice, probe {:.2}",
        params.surface_type,
        params.effective_probe()
    );

    let triangles = march(&field, params.join_threshold, sink);
    info!(
        "Meshed {} balls: {triangles} triangles, volume {volume:.3}",
        balls.len()
    );

    let offset = field.offset();
    SurfaceInfo {
        offset: [offset.x, offset.y, offset.z],
        dims: field.dims(),
        voxel_size: field.voxel_size(),
        volume,
    }
}

/// Main entry point: mesh the surface of `balls` into a [`TriangleMesh`].
#[must_use]
pub fn compute_surface(balls: &[Ball], params: &SurfaceParams) -> SurfaceResult {
    let mut mesh = TriangleMesh::default();
    let info = compute_surface_into(balls, params, &mut mesh);
    SurfaceResult { mesh, info }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_sphere() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 1.5)];
        let params = SurfaceParams::default()
            .with_surface_type(SurfaceType::VanDerWaals)
            .with_voxel_size(0.25);

        let result = compute_surface(&balls, &params);

        assert!(!result.mesh.is_empty());
        assert_eq!(result.mesh.connected_components(), 1);
        assert_eq!(result.mesh.euler_characteristic(), 2);
        let expected = 4.0 / 3.0 * std::f64::consts::PI * 1.5_f64.powi(3);
        assert_relative_eq!(result.info.volume, expected, max_relative = 0.05);
        assert_relative_eq!(result.mesh.signed_volume(), expected, max_relative = 0.05);
    }

    #[test]
    fn test_sas_is_inflated() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 1.0)];
        let params = SurfaceParams::default()
            .with_surface_type(SurfaceType::LeeRichards)
            .with_probe(1.0)
            .with_voxel_size(0.25);

        let result = compute_surface(&balls, &params);

        // Radius 2 after inflation
        let expected = 4.0 / 3.0 * std::f64::consts::PI * 8.0;
        assert_relative_eq!(result.info.volume, expected, max_relative = 0.05);
    }

    #[test]
    fn test_connolly_of_single_sphere_matches_vdw() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 1.5)];
        let base = SurfaceParams::default().with_voxel_size(0.25);

        let ses = compute_surface(&balls, &base);
        let vdw = compute_surface(&balls, &base.with_surface_type(SurfaceType::VanDerWaals));

        assert_relative_eq!(ses.info.volume, vdw.info.volume, max_relative = 0.05);
    }

    #[test]
    fn test_two_spheres() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 1.0), Ball::new(1.5, 0.0, 0.0, 1.0)];
        let result = compute_surface(&balls, &SurfaceParams::default());

        assert_eq!(result.mesh.connected_components(), 1);
        assert_eq!(result.mesh.count_degenerate(), 0);
    }

    #[test]
    fn test_empty_input() {
        let balls: Vec<Ball> = vec![];
        let result = compute_surface(&balls, &SurfaceParams::default());

        assert!(result.mesh.is_empty());
        assert!(result.mesh.vertices.is_empty());
        assert_eq!(result.info.dims, [0, 0, 0]);
        assert_eq!(result.info.volume, 0.0);
    }

    #[test]
    fn test_info_matches_field() {
        let balls = vec![Ball::new(1.0, 2.0, 3.0, 1.2)];
        let params = SurfaceParams::default();
        let field = compute_field(&balls, &params);
        let mut mesh = TriangleMesh::default();
        let info = compute_surface_into(&balls, &params, &mut mesh);

        assert_eq!(info.dims, field.dims());
        assert_eq!(info.voxel_size, params.voxel_size);
        assert_relative_eq!(info.volume, estimate_volume(&field));
    }
}
