#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

use molsurf::{Ball, SurfaceParams, SurfaceType};
use serde::Deserialize;

/// JSON summary printed by the CLI
#[derive(Deserialize)]
pub struct Summary {
    pub surface: String,
    pub balls: usize,
    pub num_vertices: usize,
    pub referenced_vertices: usize,
    pub num_triangles: usize,
    pub volume: f64,
    pub mesh_volume: f64,
    pub area: f64,
    pub dims: [usize; 3],
    pub offset: [f64; 3],
}

/// Full JSON mesh written with `--format json`
#[derive(Deserialize)]
pub struct JsonMesh {
    #[serde(flatten)]
    pub summary: Summary,
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[usize; 3]>,
}

pub fn binary_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_molsurf"))
}

pub fn run_cli(args: &[&str]) -> String {
    let output = binary_command()
        .args(args)
        .output()
        .expect("failed to run binary");
    assert!(
        output.status.success(),
        "molsurf failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout was not UTF-8")
}

pub fn parse_summary(output: &str) -> Summary {
    serde_json::from_str(output).expect("failed to parse JSON summary")
}

pub fn test_data_path(name: &str) -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir).join("tests/data").join(name)
}

pub fn sphere_volume(r: f64) -> f64 {
    4.0 / 3.0 * std::f64::consts::PI * r.powi(3)
}

/// Van der Waals parameters without corner joining; such meshes are strict 2-manifolds.
pub fn unjoined_params(voxel_size: f64) -> SurfaceParams {
    SurfaceParams::default()
        .with_surface_type(SurfaceType::VanDerWaals)
        .with_voxel_size(voxel_size)
        .with_join_threshold(0.0)
}

/// A compact cluster of overlapping balls.
pub fn cluster() -> Vec<Ball> {
    vec![
        Ball::new(0.0, 0.0, 0.0, 1.6),
        Ball::new(2.4, 0.0, 0.0, 1.5),
        Ball::new(1.2, 2.1, 0.0, 1.7),
        Ball::new(1.2, 0.7, 2.0, 1.55),
        Ball::new(-1.1, 1.9, 1.3, 1.52),
    ]
}
