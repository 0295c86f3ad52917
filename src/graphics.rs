// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the molsurf project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Mesh export: Wavefront OBJ and `PyMOL` CGO scripts.
//!
//! The CGO script draws the surface as flat-shaded triangles, optionally with
//! the input balls and the triangle wireframe.

use std::io::{self, Write};

use crate::mesh::TriangleMesh;
use crate::types::Ball;

/// Write `mesh` as Wavefront OBJ (`v` lines, then 1-based `f` lines).
///
/// # Errors
/// Returns an error if writing to the output fails.
pub fn write_obj<W: Write>(mesh: &TriangleMesh, mut writer: W) -> io::Result<()> {
    writeln!(
        writer,
        "# {} vertices, {} triangles",
        mesh.num_vertices(),
        mesh.num_triangles()
    )?;
    for p in &mesh.vertices {
        writeln!(writer, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in &mesh.triangles {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

/// Collects a surface mesh (and optionally its balls) and writes `PyMOL` CGO scripts.
pub struct GraphicsWriter<'a> {
    mesh: &'a TriangleMesh,
    balls: &'a [Ball],
    wireframe: bool,
}

impl<'a> GraphicsWriter<'a> {
    /// Writer for `mesh` alone.
    #[must_use]
    pub const fn new(mesh: &'a TriangleMesh) -> Self {
        Self {
            mesh,
            balls: &[],
            wireframe: false,
        }
    }

    /// Also draw the input balls as spheres.
    #[must_use]
    pub const fn with_balls(mut self, balls: &'a [Ball]) -> Self {
        self.balls = balls;
        self
    }

    /// Also draw every triangle edge as a line.
    #[must_use]
    pub const fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    /// Write `PyMOL` CGO Python script to the given writer.
    ///
    /// # Errors
    /// Returns an error if writing to the output fails.
    pub fn write_pymol<W: Write>(&self, mut writer: W, object_name: &str) -> io::Result<()> {
        writeln!(writer, "from pymol.cgo import *")?;
        writeln!(writer, "from pymol import cmd")?;
        writeln!(writer)?;

        if !self.balls.is_empty() {
            self.write_balls_cgo(&mut writer, object_name)?;
            writeln!(writer)?;
        }

        self.write_surface_cgo(&mut writer, object_name)?;
        writeln!(writer)?;

        if self.wireframe {
            self.write_wireframe_cgo(&mut writer, object_name)?;
            writeln!(writer)?;
        }

        // PyMOL rendering settings
        writeln!(writer, "cmd.set('two_sided_lighting', 1)")?;
        writeln!(writer, "cmd.set('cgo_line_width', 1)")?;

        Ok(())
    }

    /// Write ball spheres as CGO.
    fn write_balls_cgo<W: Write>(&self, writer: &mut W, object_name: &str) -> io::Result<()> {
        writeln!(writer, "cgo_graphics_list_balls = [")?;
        writeln!(writer, "    COLOR, 0, 1, 1,")?;

        for ball in self.balls {
            writeln!(
                writer,
                "    SPHERE, {:.6}, {:.6}, {:.6}, {:.6},",
                ball.x, ball.y, ball.z, ball.r
            )?;
        }

        writeln!(writer, "]")?;
        writeln!(
            writer,
            "cmd.load_cgo(cgo_graphics_list_balls, '{object_name}_balls')"
        )?;

        Ok(())
    }

    /// Write the surface as flat-shaded CGO triangles.
    fn write_surface_cgo<W: Write>(&self, writer: &mut W, object_name: &str) -> io::Result<()> {
        writeln!(writer, "cgo_graphics_list_surface = [")?;
        writeln!(writer, "    COLOR, 1, 1, 0,")?;
        writeln!(writer, "    BEGIN, TRIANGLES,")?;

        for t in &self.mesh.triangles {
            let [a, b, c] = t.map(|i| self.mesh.vertices[i]);
            // Facet normal for lighting; zero-area triangles get none
            let Some(normal) = (b - a).cross(&(c - a)).try_normalize(0.0) else {
                continue;
            };
            writeln!(
                writer,
                "    NORMAL, {:.6}, {:.6}, {:.6},",
                normal.x, normal.y, normal.z
            )?;
            for p in [a, b, c] {
                writeln!(writer, "    VERTEX, {:.6}, {:.6}, {:.6},", p.x, p.y, p.z)?;
            }
        }

        writeln!(writer, "    END,")?;
        writeln!(writer, "]")?;
        writeln!(
            writer,
            "cmd.load_cgo(cgo_graphics_list_surface, '{object_name}_surface')"
        )?;

        Ok(())
    }

    /// Write each mesh edge once as a CGO line.
    fn write_wireframe_cgo<W: Write>(&self, writer: &mut W, object_name: &str) -> io::Result<()> {
        writeln!(writer, "cgo_graphics_list_wireframe = [")?;
        writeln!(writer, "    COLOR, 1, 0, 0,")?;
        writeln!(writer, "    BEGIN, LINES,")?;

        let mut edges: Vec<(usize, usize)> = self.mesh.edge_use_counts().into_keys().collect();
        edges.sort_unstable();
        for (a, b) in edges {
            for p in [self.mesh.vertices[a], self.mesh.vertices[b]] {
                writeln!(writer, "    VERTEX, {:.6}, {:.6}, {:.6},", p.x, p.y, p.z)?;
            }
        }

        writeln!(writer, "    END,")?;
        writeln!(writer, "]")?;
        writeln!(
            writer,
            "cmd.load_cgo(cgo_graphics_list_wireframe, '{object_name}_wireframe')"
        )?;

        Ok(())
    }
}
