// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile designation parsing and a small section catalog
//!
//! Designations are matched by prefix ("IPE300", "HEB 200", "RHS200x100x8").
//! The catalog only covers the common European I-sections; anything else
//! relies on the element's own dimensions.

/// I-shaped families; the longest matching prefix wins
const I_FAMILIES: &[&str] = &[
    "IPE", "IPN", "HEA", "HEB", "HEM", "HE", "HD", "HL", "HP", "UB", "UC", "W",
];

/// Rectangular hollow section prefixes
const RECT_TUBE_FAMILIES: &[&str] = &["RECT", "RHS", "SHS", "HSS", "QRO", "RR"];

/// Circular hollow section prefixes
const ROUND_TUBE_FAMILIES: &[&str] = &["CHS", "ROR", "RO", "PIPE"];

/// Shape family a designation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeFamily {
    IShape,
    RectangularHollow,
    CircularHollow,
    Unknown,
}

/// I-section properties (all in mm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ISection {
    pub height: f64,
    pub width: f64,
    pub web_thickness: f64,
    pub flange_thickness: f64,
}

/// Parsed designation
#[derive(Debug, Clone, PartialEq)]
pub struct Designation {
    /// Upper-cased, whitespace-free designation
    pub normalized: String,
    /// Matched family prefix ("IPE", "HEA", "RHS"...), empty when unknown
    pub prefix: String,
    pub family: ShapeFamily,
    /// Numbers following the prefix, split on 'x' / '*' / '/'
    pub numbers: Vec<f64>,
}

impl Designation {
    /// Parse a designation string. Never fails; unknown strings yield
    /// `ShapeFamily::Unknown`.
    pub fn parse(designation: &str) -> Self {
        let normalized: String = designation
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let (mut prefix, family) = match_family(&normalized);
        let rest = &normalized[prefix.len()..];
        let numbers = parse_numbers(rest);

        // "HE300A" is the same section as "HEA300"
        if prefix == "HE" {
            if let Some(suffix) = rest.chars().last().filter(|c| matches!(*c, 'A' | 'B' | 'M')) {
                prefix = format!("HE{}", suffix);
            }
        }

        Self {
            normalized,
            prefix,
            family,
            numbers,
        }
    }

    #[inline]
    pub fn is_i_shape(&self) -> bool {
        self.family == ShapeFamily::IShape
    }

    #[inline]
    pub fn is_rectangular_tube(&self) -> bool {
        self.family == ShapeFamily::RectangularHollow
    }

    /// Catalog lookup for I-sections
    pub fn catalog_section(&self) -> Option<ISection> {
        if !self.is_i_shape() {
            return None;
        }
        let size = *self.numbers.first()?;
        let table: &[(f64, f64, f64, f64, f64)] = match self.prefix.as_str() {
            "IPE" => IPE,
            "HEA" => HEA,
            "HEB" => HEB,
            _ => return None,
        };
        table
            .iter()
            .find(|row| (row.0 - size).abs() < 1e-6)
            .map(|&(_, height, width, web_thickness, flange_thickness)| ISection {
                height,
                width,
                web_thickness,
                flange_thickness,
            })
    }
}

/// True when the designation prefix-matches an I-shaped family
pub fn is_i_family(designation: &str) -> bool {
    Designation::parse(designation).is_i_shape()
}

/// True when the designation names a rectangular hollow section
pub fn is_rectangular_tube(designation: &str) -> bool {
    Designation::parse(designation).is_rectangular_tube()
}

fn match_family(normalized: &str) -> (String, ShapeFamily) {
    let groups: [(&[&str], ShapeFamily); 3] = [
        (I_FAMILIES, ShapeFamily::IShape),
        (RECT_TUBE_FAMILIES, ShapeFamily::RectangularHollow),
        (ROUND_TUBE_FAMILIES, ShapeFamily::CircularHollow),
    ];

    let mut best: Option<(&str, ShapeFamily)> = None;
    for (prefixes, family) in groups {
        for &prefix in prefixes {
            let Some(rest) = normalized.strip_prefix(prefix) else {
                continue;
            };
            // The size must follow the family name directly
            if !rest.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            if best.map_or(true, |(p, _)| prefix.len() > p.len()) {
                best = Some((prefix, family));
            }
        }
    }

    match best {
        Some((prefix, family)) => (prefix.to_string(), family),
        None => (String::new(), ShapeFamily::Unknown),
    }
}

fn parse_numbers(rest: &str) -> Vec<f64> {
    rest.split(|c| c == 'X' || c == '*' || c == '/')
        .filter_map(|part| {
            let numeric: String = part
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            numeric.parse::<f64>().ok()
        })
        .collect()
}

// (size, h, b, tw, tf)
const IPE: &[(f64, f64, f64, f64, f64)] = &[
    (80.0, 80.0, 46.0, 3.8, 5.2),
    (100.0, 100.0, 55.0, 4.1, 5.7),
    (120.0, 120.0, 64.0, 4.4, 6.3),
    (140.0, 140.0, 73.0, 4.7, 6.9),
    (160.0, 160.0, 82.0, 5.0, 7.4),
    (180.0, 180.0, 91.0, 5.3, 8.0),
    (200.0, 200.0, 100.0, 5.6, 8.5),
    (220.0, 220.0, 110.0, 5.9, 9.2),
    (240.0, 240.0, 120.0, 6.2, 9.8),
    (270.0, 270.0, 135.0, 6.6, 10.2),
    (300.0, 300.0, 150.0, 7.1, 10.7),
    (330.0, 330.0, 160.0, 7.5, 11.5),
    (360.0, 360.0, 170.0, 8.0, 12.7),
    (400.0, 400.0, 180.0, 8.6, 13.5),
    (450.0, 450.0, 190.0, 9.4, 14.6),
    (500.0, 500.0, 200.0, 10.2, 16.0),
    (550.0, 550.0, 210.0, 11.1, 17.2),
    (600.0, 600.0, 220.0, 12.0, 19.0),
];

const HEA: &[(f64, f64, f64, f64, f64)] = &[
    (100.0, 96.0, 100.0, 5.0, 8.0),
    (120.0, 114.0, 120.0, 5.0, 8.0),
    (140.0, 133.0, 140.0, 5.5, 8.5),
    (160.0, 152.0, 160.0, 6.0, 9.0),
    (180.0, 171.0, 180.0, 6.0, 9.5),
    (200.0, 190.0, 200.0, 6.5, 10.0),
    (220.0, 210.0, 220.0, 7.0, 11.0),
    (240.0, 230.0, 240.0, 7.5, 12.0),
    (260.0, 250.0, 260.0, 7.5, 12.5),
    (280.0, 270.0, 280.0, 8.0, 13.0),
    (300.0, 290.0, 300.0, 8.5, 14.0),
];

const HEB: &[(f64, f64, f64, f64, f64)] = &[
    (100.0, 100.0, 100.0, 6.0, 10.0),
    (120.0, 120.0, 120.0, 6.5, 11.0),
    (140.0, 140.0, 140.0, 7.0, 12.0),
    (160.0, 160.0, 160.0, 8.0, 13.0),
    (180.0, 180.0, 180.0, 8.5, 14.0),
    (200.0, 200.0, 200.0, 9.0, 15.0),
    (220.0, 220.0, 220.0, 9.5, 16.0),
    (240.0, 240.0, 240.0, 10.0, 17.0),
    (260.0, 260.0, 260.0, 10.0, 17.5),
    (280.0, 280.0, 280.0, 10.5, 18.0),
    (300.0, 300.0, 300.0, 11.0, 19.0),
];
