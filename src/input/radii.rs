// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the molsurf project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Element van der Waals radii.
//!
//! Defaults follow Bondi (1964), with common ions added. Lookup priority:
//! override → default table → 1.8

use std::collections::HashMap;

const DEFAULT_RADIUS: f64 = 1.8;

/// Radius table keyed by upper-case element symbol.
#[derive(Debug, Clone)]
pub struct ElementRadii {
    radii: HashMap<String, f64>,
}

impl Default for ElementRadii {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementRadii {
    /// Bondi radii plus ions.
    #[must_use]
    pub fn new() -> Self {
        let radii = DEFAULT_RADII
            .iter()
            .map(|&(element, radius)| (element.to_string(), radius))
            .collect();
        Self { radii }
    }

    /// Table with no entries; every lookup falls back to the default radius.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            radii: HashMap::new(),
        }
    }

    /// Load overrides from text (one `element radius` pair per line).
    /// Lines starting with '#' are comments.
    ///
    /// # Errors
    /// Returns error if a line has invalid format or a non-positive radius.
    pub fn load_from_text(&mut self, text: &str) -> Result<(), String> {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                return Err(format!("Invalid radius entry: {line}"));
            }

            let radius: f64 = parts[1]
                .parse()
                .map_err(|_| format!("Invalid radius value: {}", parts[1]))?;

            if !radius.is_finite() || radius <= 0.0 {
                return Err(format!("Radius must be positive: {radius}"));
            }

            self.radii.insert(parts[0].to_ascii_uppercase(), radius);
        }
        Ok(())
    }

    /// Radius for an element symbol (case-insensitive).
    #[must_use]
    pub fn get_radius(&self, element: &str) -> f64 {
        self.radii
            .get(&element.trim().to_ascii_uppercase())
            .copied()
            .unwrap_or(DEFAULT_RADIUS)
    }

    /// Number of known elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }
}

const DEFAULT_RADII: &[(&str, f64)] = &[
    // Organic elements
    ("H", 1.20),
    ("D", 1.20),
    ("C", 1.70),
    ("N", 1.55),
    ("O", 1.52),
    ("P", 1.80),
    ("S", 1.80),
    ("SE", 1.90),
    // Halogens
    ("F", 1.47),
    ("CL", 1.75),
    ("BR", 1.85),
    ("I", 1.98),
    // Noble gases
    ("HE", 1.40),
    ("NE", 1.54),
    ("AR", 1.88),
    ("KR", 2.02),
    ("XE", 2.16),
    // Metals
    ("LI", 1.82),
    ("NA", 2.27),
    ("K", 2.75),
    ("MG", 1.73),
    ("CA", 2.31),
    ("NI", 1.63),
    ("CU", 1.40),
    ("ZN", 1.39),
    ("GA", 1.87),
    ("AS", 1.85),
    ("SI", 2.10),
    ("PD", 1.63),
    ("AG", 1.72),
    ("CD", 1.58),
    ("IN", 1.93),
    ("SN", 2.17),
    ("TE", 2.06),
    ("PT", 1.75),
    ("AU", 1.66),
    ("HG", 1.55),
    ("TL", 1.96),
    ("PB", 2.02),
    ("U", 1.86),
    // Transition metals without a Bondi value
    ("FE", 1.56),
    ("MN", 1.61),
    ("CO", 1.52),
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn organic_elements() {
        let radii = ElementRadii::new();
        assert_relative_eq!(radii.get_radius("C"), 1.70);
        assert_relative_eq!(radii.get_radius("N"), 1.55);
        assert_relative_eq!(radii.get_radius("O"), 1.52);
        assert_relative_eq!(radii.get_radius("S"), 1.80);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let radii = ElementRadii::new();
        assert_relative_eq!(radii.get_radius("cl"), 1.75);
        assert_relative_eq!(radii.get_radius(" Zn"), 1.39);
    }

    #[test]
    fn unknown_element_gets_default() {
        let radii = ElementRadii::new();
        assert_relative_eq!(radii.get_radius("XX"), DEFAULT_RADIUS);
        assert_relative_eq!(ElementRadii::empty().get_radius("C"), DEFAULT_RADIUS);
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut radii = ElementRadii::new();
        radii
            .load_from_text("# united atoms\nC 1.9\nfe 0.7\n")
            .unwrap();
        assert_relative_eq!(radii.get_radius("C"), 1.9);
        assert_relative_eq!(radii.get_radius("FE"), 0.7);
        assert_relative_eq!(radii.get_radius("N"), 1.55);
    }

    #[test]
    fn rejects_bad_overrides() {
        let mut radii = ElementRadii::empty();
        assert!(radii.load_from_text("C").is_err());
        assert!(radii.load_from_text("C abc").is_err());
        assert!(radii.load_from_text("C -1.0").is_err());
        assert!(radii.is_empty());
    }
}
