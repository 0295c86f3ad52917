//! Solvent-excluded erosion of a probe-inflated field.
//!
//! Every point where the accessible surface crosses a lattice edge is a valid
//! probe center. Removing a probe-sized sphere around each of them leaves the
//! region the probe cannot sweep, i.e. the Connolly volume.

use nalgebra::Point3;
use rayon::prelude::*;

use log::debug;

use crate::grid::{ISO, ScalarField, covered_range};
use crate::interpolate::crossing_fraction;

/// Points within this many extra lattice units beyond the probe are also
/// lowered, so values on the inside of the new boundary stay accurate for
/// interpolation. They never drop below `ISO`.
const EROSION_MARGIN: f64 = 1.0;

/// Positions (lattice units) where the field crosses `ISO` along lattice edges.
#[allow(clippy::cast_precision_loss)]
pub fn surface_crossings(field: &ScalarField) -> Vec<Point3<f64>> {
    let [sx, sy, sz] = field.dims();
    let mut crossings = Vec::new();
    for iz in 0..sz {
        for iy in 0..sy {
            for ix in 0..sx {
                let v = field.get(ix, iy, iz);
                let inside = v >= ISO;
                let base = Point3::new(ix as f64, iy as f64, iz as f64);
                let neighbors = [
                    (ix + 1 < sx).then(|| field.get(ix + 1, iy, iz)),
                    (iy + 1 < sy).then(|| field.get(ix, iy + 1, iz)),
                    (iz + 1 < sz).then(|| field.get(ix, iy, iz + 1)),
                ];
                for (axis, next) in neighbors.into_iter().enumerate() {
                    if let Some(w) = next
                        && (w >= ISO) != inside
                    {
                        let mut p = base;
                        p[axis] += crossing_fraction(v, w);
                        crossings.push(p);
                    }
                }
            }
        }
    }
    crossings
}

/// Erode the occupied region by `probe_radius` (world units).
///
/// The returned field is never greater than the input at any lattice point.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn erode(field: &ScalarField, probe_radius: f64) -> ScalarField {
    let mut output = field.clone();
    if field.is_empty() || probe_radius <= 0.0 {
        return output;
    }

    let probe = probe_radius / field.voxel_size();
    let reach = probe + EROSION_MARGIN;
    let [sx, sy, sz] = field.dims();

    let crossings = surface_crossings(field);
    debug!(
        "Eroding {} crossings with probe {probe:.3} lattice units",
        crossings.len()
    );

    // Bucket crossings by the z-plane they start in
    let mut buckets: Vec<Vec<Point3<f64>>> = vec![Vec::new(); sz];
    for p in &crossings {
        let plane = (p.z.floor().max(0.0) as usize).min(sz - 1);
        buckets[plane].push(*p);
    }

    let reach_sq = reach * reach;
    output
        .values_mut()
        .par_chunks_mut(sx * sy)
        .enumerate()
        .for_each(|(iz, plane)| {
            let z = iz as f64;
            let Some((b0, b1)) = covered_range(z, reach + 1.0, sz) else {
                return;
            };
            for p in buckets[b0..=b1].iter().flatten() {
                let dz = z - p.z;
                if dz.abs() > reach {
                    continue;
                }
                let (Some((x0, x1)), Some((y0, y1))) =
                    (covered_range(p.x, reach, sx), covered_range(p.y, reach, sy))
                else {
                    continue;
                };
                for iy in y0..=y1 {
                    let dy = iy as f64 - p.y;
                    let row = &mut plane[iy * sx..(iy + 1) * sx];
                    for (ix, value) in row.iter_mut().enumerate().take(x1 + 1).skip(x0) {
                        let dx = ix as f64 - p.x;
                        let dist_sq = dz.mul_add(dz, dx.mul_add(dx, dy * dy));
                        if dist_sq > reach_sq {
                            continue;
                        }
                        let candidate = dist_sq.sqrt() - probe + ISO;
                        if candidate < *value {
                            *value = candidate;
                        }
                    }
                }
            }
        });

    output
}
