// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the molsurf project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Input file parsing for PDB and XYZR formats.
//!
//! Provides format auto-detection and a unified parsing interface with radii assignment.

pub mod pdb;
pub mod radii;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, info};

pub use radii::ElementRadii;

use crate::Ball;

/// Parsed atom record with coordinates and metadata.
#[derive(Clone, Debug)]
pub struct AtomRecord {
    /// HETATM rather than ATOM record.
    pub heteroatom: bool,
    /// Atom name (e.g., "CA", "N", "O").
    pub name: String,
    /// Alternate location indicator.
    pub alt_loc: String,
    /// Residue name (e.g., "ALA", "GLY").
    pub res_name: String,
    pub chain_id: String,
    pub res_seq: i32,
    /// Coordinates in Ångströms.
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Upper-case element symbol, inferred from the atom name when absent.
    pub element: String,
}

impl AtomRecord {
    #[must_use]
    pub fn is_hydrogen(&self) -> bool {
        self.element == "H" || self.element == "D"
    }
}

/// Input file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    /// Protein Data Bank format (.pdb, .ent).
    Pdb,
    /// Simple x y z radius format (.xyzr).
    Xyzr,
}

/// Options for parsing molecular files.
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    /// Exclude HETATM records (default: false)
    pub exclude_heteroatoms: bool,
    /// Include hydrogen atoms (default: false)
    pub include_hydrogens: bool,
}

/// Detect input format from file extension.
fn detect_format_from_extension(path: &Path) -> Option<InputFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "pdb" | "ent" => Some(InputFormat::Pdb),
        "xyzr" => Some(InputFormat::Xyzr),
        _ => None,
    }
}

/// Detect input format from file content (first line).
fn detect_format_from_content<R: BufRead>(reader: &mut R) -> Option<(InputFormat, String)> {
    let mut first_line = String::new();
    reader.read_line(&mut first_line).ok()?;

    let trimmed = first_line.trim();
    let pdb_records = ["ATOM", "HETATM", "HEADER", "REMARK", "MODEL", "CRYST1", "TITLE"];
    if pdb_records.iter().any(|r| trimmed.starts_with(r)) {
        return Some((InputFormat::Pdb, first_line));
    }
    // XYZR: at least 4 whitespace-separated numbers
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() >= 4 && parts.iter().rev().take(4).all(|p| p.parse::<f64>().is_ok()) {
        Some((InputFormat::Xyzr, first_line))
    } else {
        None
    }
}

/// Parse one XYZR line, using the last four columns.
fn parse_xyzr_line(line: &str) -> Option<Ball> {
    if line.trim_start().starts_with('#') {
        return None;
    }
    let mut parts = line.split_whitespace().rev();
    let r: f64 = parts.next()?.parse().ok()?;
    let z: f64 = parts.next()?.parse().ok()?;
    let y: f64 = parts.next()?.parse().ok()?;
    let x: f64 = parts.next()?.parse().ok()?;
    Some(Ball::new(x, y, z, r))
}

fn parse_xyzr<R: BufRead>(reader: R) -> Vec<Ball> {
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|l| parse_xyzr_line(&l))
        .collect()
}

/// Convert atom records to balls using element radii.
#[must_use]
pub fn records_to_balls(records: &[AtomRecord], radii: &ElementRadii) -> Vec<Ball> {
    records
        .iter()
        .map(|r| Ball::new(r.x, r.y, r.z, radii.get_radius(&r.element)))
        .collect()
}

/// Parse input from a file path with auto-detected format.
///
/// # Errors
/// Returns error if file cannot be opened or format cannot be detected.
pub fn parse_file(
    path: &Path,
    options: &ParseOptions,
    radii: &ElementRadii,
) -> io::Result<Vec<Ball>> {
    let mut reader = BufReader::new(File::open(path)?);

    // Try extension first, then content
    if let Some(format) = detect_format_from_extension(path) {
        info!("Detected format from extension: {format:?}");
        return parse_reader(reader, format, None, options, radii);
    }
    let (format, first_line) = detect_format_from_content(&mut reader).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "Unable to detect input format")
    })?;
    info!("Detected format from content: {format:?}");
    parse_reader(reader, format, Some(&first_line), options, radii)
}

/// Parse input from a buffered reader with known format.
///
/// `first_line` is a line already consumed from `reader` during format detection.
///
/// # Errors
/// Returns error if a ball has a non-finite coordinate or a non-positive radius.
pub fn parse_reader<R: BufRead>(
    reader: R,
    format: InputFormat,
    first_line: Option<&str>,
    options: &ParseOptions,
    radii: &ElementRadii,
) -> io::Result<Vec<Ball>> {
    let reader = first_line.unwrap_or_default().as_bytes().chain(reader);
    let balls = match format {
        InputFormat::Xyzr => parse_xyzr(reader),
        InputFormat::Pdb => {
            let records = pdb::parse_pdb(reader, options);
            debug!("Parsed {} atom records", records.len());
            records_to_balls(&records, radii)
        }
    };
    let invalid = |b: &Ball| {
        !b.r.is_finite() || b.r <= 0.0 || ![b.x, b.y, b.z].iter().all(|c| c.is_finite())
    };
    if let Some(bad) = balls.iter().find(|b| invalid(b)) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Invalid ball: {bad:?}"),
        ));
    }
    Ok(balls)
}

/// Parse input from stdin with auto-detected format.
///
/// # Errors
/// Returns error if format cannot be detected.
pub fn parse_stdin(options: &ParseOptions, radii: &ElementRadii) -> io::Result<Vec<Ball>> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();

    let (format, first_line) = detect_format_from_content(&mut reader).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "Unable to detect input format from stdin",
        )
    })?;

    info!("Detected format from stdin: {format:?}");
    parse_reader(reader, format, Some(&first_line), options, radii)
}
