// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the molsurf project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! PDB file format parser.
//!
//! Reads ATOM/HETATM records of the first model, filtering hydrogens,
//! heteroatoms, waters and alternate locations.

use std::io::BufRead;

use super::{AtomRecord, ParseOptions};

/// Extract substring from fixed-width PDB columns (1-indexed, inclusive).
fn extract_column(line: &str, start: usize, end: usize) -> &str {
    let start_idx = start.saturating_sub(1);
    if start_idx >= line.len() {
        return "";
    }
    line.get(start_idx..end.min(line.len())).unwrap_or("").trim()
}

fn parse_column_f64(line: &str, start: usize, end: usize) -> Option<f64> {
    extract_column(line, start, end).parse().ok()
}

/// Element from the atom name when columns 77-78 are blank.
///
/// Leading digits are skipped ("1HG2" is hydrogen). Ions whose residue name
/// equals the atom name keep both letters ("ZN" in residue "ZN").
fn infer_element(atom_name: &str, res_name: &str) -> String {
    let letters = atom_name.trim_start_matches(|c: char| c.is_ascii_digit());
    if !letters.is_empty() && letters == res_name && letters.len() <= 2 {
        return letters.to_ascii_uppercase();
    }
    letters
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

/// Parse a single ATOM/HETATM line into an `AtomRecord`.
fn parse_atom_line(line: &str) -> Option<AtomRecord> {
    let record_name = extract_column(line, 1, 6);
    if record_name != "ATOM" && record_name != "HETATM" {
        return None;
    }

    // Coordinates are required
    let x = parse_column_f64(line, 31, 38)?;
    let y = parse_column_f64(line, 39, 46)?;
    let z = parse_column_f64(line, 47, 54)?;

    let name = extract_column(line, 13, 16);
    if name.is_empty() {
        return None;
    }
    let res_name = extract_column(line, 18, 20);
    let element = match extract_column(line, 77, 78) {
        "" => infer_element(name, res_name),
        symbol => symbol.to_ascii_uppercase(),
    };

    Some(AtomRecord {
        heteroatom: record_name == "HETATM",
        name: name.to_string(),
        alt_loc: extract_column(line, 17, 17).to_string(),
        res_name: res_name.to_string(),
        chain_id: extract_column(line, 22, 22).to_string(),
        res_seq: extract_column(line, 23, 26).parse().unwrap_or(0),
        x,
        y,
        z,
        element,
    })
}

/// Check if atom should be accepted based on filter options.
fn is_acceptable(record: &AtomRecord, options: &ParseOptions) -> bool {
    if record.heteroatom && options.exclude_heteroatoms {
        return false;
    }
    // AltLoc filtering: only the first conformer
    if !matches!(record.alt_loc.as_str(), "" | "A" | "1") {
        return false;
    }
    if !options.include_hydrogens && record.is_hydrogen() {
        return false;
    }
    // Always exclude water
    !matches!(record.res_name.as_str(), "HOH" | "WAT" | "DOD")
}

/// Parse PDB format from a buffered reader, stopping after the first model.
pub fn parse_pdb<R: BufRead>(reader: R, options: &ParseOptions) -> Vec<AtomRecord> {
    let mut records = Vec::new();

    for line in reader.lines().map_while(Result::ok) {
        match extract_column(&line, 1, 6) {
            "ATOM" | "HETATM" => {
                if let Some(record) = parse_atom_line(&line)
                    && is_acceptable(&record, options)
                {
                    records.push(record);
                }
            }
            "ENDMDL" | "END" => break,
            _ => {}
        }
    }

    records
}
