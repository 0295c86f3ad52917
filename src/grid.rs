//! Scalar occupancy lattice and rasterization of balls into it.
//!
//! Values are signed distances in lattice units shifted by [`ISO`]: a lattice
//! point inside a ball of influence radius `R` at distance `d` from its center
//! holds `R - d + ISO`. Untouched points stay at zero and therefore read as
//! outside.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use log::debug;

use crate::types::Ball;

/// Surface threshold. Strictly positive so zero-initialized points are outside.
pub const ISO: f64 = 1.0;

/// Values are capped at `ISO + RADIUS_SURPLUS`; deeper interior detail never
/// reaches the surface, erosion or the volume estimate.
pub const RADIUS_SURPLUS: f64 = 2.0;

/// Padding added to `ceil(extent / voxel)` on every axis.
const GRID_MARGIN: usize = 3;

/// Dense 3D lattice of occupancy values
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    values: Vec<f64>,
    dims: [usize; 3],
    voxel_size: f64,
    offset: Point3<f64>,
}

impl ScalarField {
    /// Zero-filled field.
    #[must_use]
    pub fn new(dims: [usize; 3], voxel_size: f64, offset: Point3<f64>) -> Self {
        Self {
            values: vec![0.0; dims[0] * dims[1] * dims[2]],
            dims,
            voxel_size,
            offset,
        }
    }

    /// Build a field from raw values laid out x-fastest.
    ///
    /// # Panics
    /// Panics if `values.len()` does not match `dims`.
    #[must_use]
    pub fn from_values(
        values: Vec<f64>,
        dims: [usize; 3],
        voxel_size: f64,
        offset: Point3<f64>,
    ) -> Self {
        assert_eq!(values.len(), dims[0] * dims[1] * dims[2], "value count must match dims");
        Self {
            values,
            dims,
            voxel_size,
            offset,
        }
    }

    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[must_use]
    pub const fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// World position of lattice point (0, 0, 0).
    #[must_use]
    pub const fn offset(&self) -> Point3<f64> {
        self.offset
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of values in one z-plane.
    #[must_use]
    pub const fn plane_len(&self) -> usize {
        self.dims[0] * self.dims[1]
    }

    #[inline]
    #[must_use]
    pub const fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + self.dims[0] * (iy + self.dims[1] * iz)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.values[self.index(ix, iy, iz)]
    }

    #[inline]
    #[must_use]
    pub fn is_inside(&self, ix: usize, iy: usize, iz: usize) -> bool {
        self.get(ix, iy, iz) >= ISO
    }

    /// World coordinates of fractional lattice coordinates.
    #[must_use]
    pub fn lattice_to_world(&self, lattice: &Point3<f64>) -> Point3<f64> {
        self.offset + lattice.coords * self.voxel_size
    }

    /// Fractional lattice coordinates of a world position.
    #[must_use]
    pub fn world_to_lattice(&self, world: &Point3<f64>) -> Point3<f64> {
        Point3::from((world - self.offset) / self.voxel_size)
    }
}

/// Lattice placement for a set of balls
#[derive(Debug, Clone, Copy)]
struct GridLayout {
    dims: [usize; 3],
    offset: Point3<f64>,
}

impl GridLayout {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn new(balls: &[Ball], probe: f64, voxel_size: f64) -> Self {
        let mut min = Vector3::repeat(f64::INFINITY);
        let mut max = Vector3::repeat(f64::NEG_INFINITY);
        for ball in balls {
            let c = ball.center().coords;
            let reach = ball.r + probe;
            min = min.inf(&c.add_scalar(-reach));
            max = max.sup(&c.add_scalar(reach));
        }

        let extent = max - min;
        let center = (min + max) * 0.5;
        let mut dims = [0usize; 3];
        let mut offset = Point3::origin();
        for axis in 0..3 {
            dims[axis] = (extent[axis] / voxel_size).ceil().max(0.0) as usize + GRID_MARGIN;
            // Center the padded lattice on the true extent.
            offset[axis] = center[axis] - (dims[axis] - 1) as f64 * voxel_size * 0.5;
        }
        Self { dims, offset }
    }
}

/// A ball expressed in lattice units
#[derive(Debug, Clone, Copy)]
struct LatticeBall {
    center: Point3<f64>,
    radius: f64,
}

/// Inclusive lattice range `[lo, hi]` covered by `center ± radius`, clipped to `[0, len)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub(crate) fn covered_range(center: f64, radius: f64, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let lo = (center - radius).floor().max(0.0);
    let hi = (center + radius).ceil().min((len - 1) as f64);
    if lo > hi {
        None
    } else {
        Some((lo as usize, hi as usize))
    }
}

/// Convert balls to the occupancy lattice.
///
/// Each ball influences lattice points within `(r + probe) / voxel_size`
/// lattice units of its center. A point keeps the maximum contribution of all
/// balls, capped at `ISO + RADIUS_SURPLUS`, so the result does not depend on
/// ball order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rasterize(balls: &[Ball], probe: f64, voxel_size: f64) -> ScalarField {
    if balls.is_empty() {
        return ScalarField::new([0, 0, 0], voxel_size, Point3::origin());
    }

    let layout = GridLayout::new(balls, probe, voxel_size);
    let mut field = ScalarField::new(layout.dims, voxel_size, layout.offset);
    let [sx, sy, sz] = layout.dims;
    debug!("Rasterizing {} balls into {sx}x{sy}x{sz} lattice", balls.len());

    let lattice_balls: Vec<LatticeBall> = balls
        .iter()
        .map(|b| LatticeBall {
            center: field.world_to_lattice(&b.center()),
            radius: (b.r + probe) / voxel_size,
        })
        .collect();

    // Balls touching each z-plane
    let mut per_plane: Vec<Vec<usize>> = vec![Vec::new(); sz];
    for (i, lb) in lattice_balls.iter().enumerate() {
        if let Some((lo, hi)) = covered_range(lb.center.z, lb.radius, sz) {
            for plane in &mut per_plane[lo..=hi] {
                plane.push(i);
            }
        }
    }

    let cap = ISO + RADIUS_SURPLUS;
    field
        .values_mut()
        .par_chunks_mut(sx * sy)
        .zip(per_plane.par_iter())
        .enumerate()
        .for_each(|(iz, (plane, ids))| {
            let z = iz as f64;
            for &id in ids {
                let lb = &lattice_balls[id];
                let (Some((x0, x1)), Some((y0, y1))) = (
                    covered_range(lb.center.x, lb.radius, sx),
                    covered_range(lb.center.y, lb.radius, sy),
                ) else {
                    continue;
                };
                let dz = z - lb.center.z;
                for iy in y0..=y1 {
                    let dy = iy as f64 - lb.center.y;
                    let row = &mut plane[iy * sx..(iy + 1) * sx];
                    for (ix, value) in row.iter_mut().enumerate().take(x1 + 1).skip(x0) {
                        if *value >= cap {
                            continue;
                        }
                        let dx = ix as f64 - lb.center.x;
                        let dist = dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt();
                        let contribution = (lb.radius - dist + ISO).min(cap);
                        if contribution > *value {
                            *value = contribution;
                        }
                    }
                }
            }
        });

    field
}

/// Enclosed volume estimated directly from the field.
///
/// Each lattice point contributes its fractional occupancy
/// `clamp(value - ISO + 0.5, 0, 1)`, i.e. a one-voxel linear ramp centered
/// on the surface, times the voxel volume.
#[must_use]
pub fn estimate_volume(field: &ScalarField) -> f64 {
    if field.is_empty() {
        return 0.0;
    }
    // Per-plane partial sums keep the total independent of thread scheduling.
    let partial: Vec<f64> = field
        .values()
        .par_chunks(field.plane_len().max(1))
        .map(|plane| {
            plane
                .iter()
                .map(|&v| (v - ISO + 0.5).clamp(0.0, 1.0))
                .sum::<f64>()
        })
        .collect();
    partial.iter().sum::<f64>() * field.voxel_size().powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn dims_include_margin() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 1.0)];
        let field = rasterize(&balls, 0.0, 0.5);
        // extent 2.0 / 0.5 = 4, plus 3
        assert_eq!(field.dims(), [7, 7, 7]);
    }

    #[test]
    fn lattice_is_centered_on_extent() {
        let balls = vec![Ball::new(1.0, 2.0, 3.0, 1.2)];
        let field = rasterize(&balls, 0.3, 0.4);
        let [sx, sy, sz] = field.dims();
        let far = field.lattice_to_world(&Point3::new(
            (sx - 1) as f64,
            (sy - 1) as f64,
            (sz - 1) as f64,
        ));
        let mid = nalgebra::center(&field.offset(), &far);
        assert_relative_eq!(mid.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(mid.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(mid.z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn boundary_points_are_outside() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 1.5), Ball::new(1.0, 0.5, 0.0, 1.0)];
        let field = rasterize(&balls, 1.4, 0.4);
        let [sx, sy, sz] = field.dims();
        for iz in 0..sz {
            for iy in 0..sy {
                for ix in [0, sx - 1] {
                    assert!(!field.is_inside(ix, iy, iz));
                }
            }
        }
    }

    #[test]
    fn values_are_capped() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 3.0)];
        let field = rasterize(&balls, 0.0, 0.25);
        let max = field.values().iter().copied().fold(0.0, f64::max);
        assert_relative_eq!(max, ISO + RADIUS_SURPLUS);
    }

    #[test]
    fn value_is_signed_distance_near_surface() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 2.0)];
        let field = rasterize(&balls, 0.0, 0.5);
        let [sx, sy, sz] = field.dims();
        for iz in 0..sz {
            for iy in 0..sy {
                for ix in 0..sx {
                    let world = field.lattice_to_world(&Point3::new(
                        ix as f64,
                        iy as f64,
                        iz as f64,
                    ));
                    let signed = (2.0 - world.coords.norm()) / 0.5;
                    if signed.abs() < 0.9 {
                        assert_relative_eq!(field.get(ix, iy, iz), signed + ISO, epsilon = 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_input_gives_empty_field() {
        let field = rasterize(&[], 1.4, 0.4);
        assert!(field.is_empty());
        assert_eq!(estimate_volume(&field), 0.0);
    }

    #[test]
    fn volume_of_single_ball() {
        let r = 2.0;
        let field = rasterize(&[Ball::new(0.3, -0.2, 0.1, r)], 0.0, 0.2);
        let expected = 4.0 / 3.0 * PI * r * r * r;
        assert_relative_eq!(estimate_volume(&field), expected, max_relative = 0.02);
    }

    #[test]
    fn probe_inflates_volume() {
        let balls = vec![Ball::new(0.0, 0.0, 0.0, 1.0)];
        let bare = estimate_volume(&rasterize(&balls, 0.0, 0.2));
        let inflated = estimate_volume(&rasterize(&balls, 1.0, 0.2));
        assert_relative_eq!(inflated / bare, 8.0, max_relative = 0.05);
    }

    #[test]
    fn covered_range_clips() {
        assert_eq!(covered_range(1.5, 3.0, 10), Some((0, 5)));
        assert_eq!(covered_range(8.0, 3.0, 10), Some((5, 9)));
        assert_eq!(covered_range(-10.0, 1.0, 10), None);
        assert_eq!(covered_range(0.0, 1.0, 0), None);
    }
}
