// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the molsurf project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Python bindings for molsurf using `PyO3`.

use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyTuple};

use crate::{Ball, SurfaceParams, SurfaceResult, SurfaceType, compute_surface as compute_surface_rs};

/// Extract a required key from a Python dict.
fn extract_key<'py, T: FromPyObject<'py>>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T> {
    dict.get_item(key)?
        .ok_or_else(|| pyo3::exceptions::PyKeyError::new_err(format!("missing '{key}'")))?
        .extract()
}

/// Extract ball from a 4-element sequence (tuple or list).
fn ball_from_sequence(seq: &Bound<'_, PyAny>, type_name: &str) -> PyResult<Ball> {
    let len = seq.len()?;
    if len != 4 {
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "ball {type_name} must have 4 elements (x, y, z, r)"
        )));
    }
    Ok(Ball::new(
        seq.get_item(0)?.extract()?,
        seq.get_item(1)?.extract()?,
        seq.get_item(2)?.extract()?,
        seq.get_item(3)?.extract()?,
    ))
}

/// Parse a single ball from tuple `(x, y, z, r)`, list `[x, y, z, r]`, or dict `{x, y, z, r}`.
fn parse_single_ball(obj: &Bound<'_, PyAny>) -> PyResult<Ball> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        return Ok(Ball::new(
            extract_key(dict, "x")?,
            extract_key(dict, "y")?,
            extract_key(dict, "z")?,
            extract_key(dict, "r")?,
        ));
    }

    if obj.downcast::<PyTuple>().is_ok() {
        return ball_from_sequence(obj, "tuple");
    }
    if obj.downcast::<PyList>().is_ok() {
        return ball_from_sequence(obj, "list");
    }

    Err(pyo3::exceptions::PyTypeError::new_err(
        "ball must be tuple (x,y,z,r), list [x,y,z,r], or dict {x,y,z,r}",
    ))
}

/// Parse balls from list of tuples/dicts or numpy array (N x 4).
fn parse_balls(obj: &Bound<'_, PyAny>) -> PyResult<Vec<Ball>> {
    if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
        let shape = arr.shape();
        if shape[1] != 4 {
            return Err(pyo3::exceptions::PyValueError::new_err(
                "numpy array must have shape (N, 4) for (x, y, z, r)",
            ));
        }
        return Ok(arr
            .as_array()
            .rows()
            .into_iter()
            .map(|row| Ball::new(row[0], row[1], row[2], row[3]))
            .collect());
    }

    let list = obj.downcast::<PyList>()?;
    list.iter().map(|item| parse_single_ball(&item)).collect()
}

/// Reject balls the rasterizer cannot place.
fn check_balls(balls: &[Ball]) -> PyResult<()> {
    for (i, b) in balls.iter().enumerate() {
        let finite = [b.x, b.y, b.z, b.r].iter().all(|v| v.is_finite());
        if !finite || b.r <= 0.0 {
            return Err(pyo3::exceptions::PyValueError::new_err(format!(
                "ball {i} needs finite coordinates and a positive radius"
            )));
        }
    }
    Ok(())
}

/// Convert `SurfaceResult` to Python dict with (N, 3) numpy arrays.
fn result_to_dict<'py>(py: Python<'py>, result: &SurfaceResult) -> PyResult<Bound<'py, PyDict>> {
    let mesh = &result.mesh;
    let vertices = mesh
        .vertices
        .iter()
        .flat_map(|p| [p.x, p.y, p.z])
        .collect::<Vec<f64>>()
        .into_pyarray(py)
        .reshape([mesh.num_vertices(), 3])?;
    let triangles = mesh
        .triangles
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<usize>>()
        .into_pyarray(py)
        .reshape([mesh.num_triangles(), 3])?;

    let dict = PyDict::new(py);
    dict.set_item("vertices", vertices)?;
    dict.set_item("triangles", triangles)?;
    dict.set_item("volume", result.info.volume)?;
    dict.set_item("offset", result.info.offset.to_vec())?;
    dict.set_item("dims", result.info.dims.to_vec())?;
    dict.set_item("voxel_size", result.info.voxel_size)?;
    Ok(dict)
}

/// Compute a marching-cubes molecular surface.
///
/// # Arguments
///
/// * `balls` - Input spheres as:
///   - List of tuples: `[(x, y, z, r), ...]`
///   - List of dicts: `[{"x": 0, "y": 0, "z": 0, "r": 1.5}, ...]`
///   - `NumPy` array: `np.array([[x, y, z, r], ...])`
/// * `voxel_size` - Lattice spacing
/// * `probe` - Probe radius (typically 1.4 for water)
/// * `surface` - `"connolly"`, `"lee-richards"` or `"vdw"`
/// * `join_threshold` - Edge fraction for merging crossings near lattice corners
///
/// # Returns
///
/// Dict containing:
/// * `vertices` - (N, 3) float array
/// * `triangles` - (M, 3) index array
/// * `volume` - Field-based volume estimate
/// * `offset`, `dims`, `voxel_size` - Lattice placement
#[pyfunction]
#[pyo3(signature = (balls, voxel_size=0.4, probe=1.4, surface="connolly", join_threshold=0.48))]
fn compute_surface<'py>(
    py: Python<'py>,
    balls: &Bound<'_, PyAny>,
    voxel_size: f64,
    probe: f64,
    surface: &str,
    join_threshold: f64,
) -> PyResult<Bound<'py, PyDict>> {
    let balls = parse_balls(balls)?;
    check_balls(&balls)?;

    let surface_type: SurfaceType = surface
        .parse()
        .map_err(pyo3::exceptions::PyValueError::new_err)?;
    let params = SurfaceParams::default()
        .with_voxel_size(voxel_size)
        .with_probe(probe)
        .with_surface_type(surface_type)
        .with_join_threshold(join_threshold);
    params
        .validate()
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;

    // Release GIL during computation
    let result = py.allow_threads(|| compute_surface_rs(&balls, &params));

    result_to_dict(py, &result)
}

/// Python module definition.
#[pymodule]
fn molsurf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_surface, m)?)?;
    Ok(())
}
