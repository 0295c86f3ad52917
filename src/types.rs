use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;
use serde::Serialize;

use crate::mesh::TriangleMesh;

/// Input ball (atom center + van der Waals radius), user-facing type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub r: f64,
}

impl Ball {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, r: f64) -> Self {
        Self { x, y, z, r }
    }

    #[must_use]
    pub const fn center(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Which molecular envelope to triangulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceType {
    /// Solvent-excluded surface: probe-inflated field eroded back by the probe.
    #[default]
    Connolly,
    /// Solvent-accessible surface: balls inflated by the probe radius.
    LeeRichards,
    /// Union of the bare balls; the probe radius is ignored.
    VanDerWaals,
}

impl SurfaceType {
    /// Probe radius actually used to inflate the balls.
    #[must_use]
    pub const fn effective_probe(self, probe: f64) -> f64 {
        match self {
            Self::VanDerWaals => 0.0,
            Self::Connolly | Self::LeeRichards => probe,
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connolly => "connolly",
            Self::LeeRichards => "lee-richards",
            Self::VanDerWaals => "vdw",
        };
        f.write_str(name)
    }
}

impl FromStr for SurfaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "connolly" | "ses" => Ok(Self::Connolly),
            "lee-richards" | "lee_richards" | "sas" => Ok(Self::LeeRichards),
            "vdw" | "van-der-waals" => Ok(Self::VanDerWaals),
            other => Err(format!(
                "unknown surface type '{other}' (expected connolly, lee-richards or vdw)"
            )),
        }
    }
}

/// Default lattice spacing in Ångströms.
pub const DEFAULT_VOXEL_SIZE: f64 = 0.4;
/// Default solvent probe radius (water).
pub const DEFAULT_PROBE: f64 = 1.4;
/// Fraction of an edge within which crossings are merged into a corner vertex.
/// Empirically tuned; 0 disables corner joining.
pub const DEFAULT_JOIN_THRESHOLD: f64 = 0.48;

/// Parameters of one meshing call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceParams {
    pub voxel_size: f64,
    pub probe: f64,
    pub surface_type: SurfaceType,
    pub join_threshold: f64,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            voxel_size: DEFAULT_VOXEL_SIZE,
            probe: DEFAULT_PROBE,
            surface_type: SurfaceType::default(),
            join_threshold: DEFAULT_JOIN_THRESHOLD,
        }
    }
}

impl SurfaceParams {
    #[must_use]
    pub const fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    #[must_use]
    pub const fn with_probe(mut self, probe: f64) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub const fn with_surface_type(mut self, surface_type: SurfaceType) -> Self {
        self.surface_type = surface_type;
        self
    }

    #[must_use]
    pub const fn with_join_threshold(mut self, join_threshold: f64) -> Self {
        self.join_threshold = join_threshold;
        self
    }

    /// Probe radius after applying the surface type.
    #[must_use]
    pub const fn effective_probe(&self) -> f64 {
        self.surface_type.effective_probe(self.probe)
    }

    /// Check the parameters before meshing.
    ///
    /// The meshing functions themselves assume validated input.
    ///
    /// # Errors
    /// Returns the first offending parameter.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(ParamsError::VoxelSize(self.voxel_size));
        }
        if !self.probe.is_finite() || self.probe < 0.0 {
            return Err(ParamsError::Probe(self.probe));
        }
        if !self.join_threshold.is_finite() || !(0.0..0.5).contains(&self.join_threshold) {
            return Err(ParamsError::JoinThreshold(self.join_threshold));
        }
        Ok(())
    }
}

/// Invalid meshing parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamsError {
    VoxelSize(f64),
    Probe(f64),
    JoinThreshold(f64),
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VoxelSize(v) => write!(f, "voxel size must be positive and finite, got {v}"),
            Self::Probe(v) => write!(f, "probe radius must be non-negative and finite, got {v}"),
            Self::JoinThreshold(v) => {
                write!(f, "join threshold must lie in [0, 0.5), got {v}")
            }
        }
    }
}

impl std::error::Error for ParamsError {}

/// Lattice placement and field-based volume of one meshing call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceInfo {
    /// World position of lattice point (0, 0, 0)
    pub offset: [f64; 3],
    /// Lattice dimensions (sx, sy, sz)
    pub dims: [usize; 3],
    pub voxel_size: f64,
    /// Enclosed volume estimated from the scalar field
    pub volume: f64,
}

impl SurfaceInfo {
    /// Map fractional lattice coordinates back to world space.
    #[must_use]
    pub fn lattice_to_world(&self, lattice: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            lattice.x.mul_add(self.voxel_size, self.offset[0]),
            lattice.y.mul_add(self.voxel_size, self.offset[1]),
            lattice.z.mul_add(self.voxel_size, self.offset[2]),
        )
    }
}

/// Surface mesh together with the lattice it was extracted from
#[derive(Debug, Clone, Default)]
pub struct SurfaceResult {
    pub mesh: TriangleMesh,
    pub info: SurfaceInfo,
}

impl Default for SurfaceInfo {
    fn default() -> Self {
        Self {
            offset: [0.0; 3],
            dims: [0; 3],
            voxel_size: DEFAULT_VOXEL_SIZE,
            volume: 0.0,
        }
    }
}
