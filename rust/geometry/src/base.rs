// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Base solid generation
//!
//! Every base solid lives in the same local frame: the member's long axis is
//! X, width runs along Y and height (or plate thickness) along Z, centred on
//! the origin. Profiles are authored in the (Y, Z) plane, extruded along Z
//! and then rotated into that frame.
//!
//! Missing or non-positive dimensions fall back to per-category defaults,
//! so generation never fails and never yields an empty mesh.

use crate::extrusion::extrude_profile;
use crate::mesh::Mesh;
use crate::profile::ProfileType;
use nalgebra::{Matrix4, Point3, Vector3};
use nc_lite_core::{Designation, Dimensions, ElementMetadata, MaterialCategory, ShapeFamily};

/// Web thickness as a fraction of flange thickness when only the flange is known
pub const WEB_TO_FLANGE_RATIO: f64 = 0.66;

/// Fallback (length, width, height) per category, in mm
pub fn category_defaults(category: MaterialCategory) -> (f64, f64, f64) {
    match category {
        MaterialCategory::Beam => (6000.0, 150.0, 300.0),
        MaterialCategory::Plate => (1000.0, 500.0, 10.0),
        MaterialCategory::Sheet => (1000.0, 500.0, 2.0),
        MaterialCategory::Tube => (3000.0, 100.0, 100.0),
        MaterialCategory::Channel => (3000.0, 75.0, 200.0),
        MaterialCategory::Tee => (3000.0, 100.0, 100.0),
        MaterialCategory::Bar => (1000.0, 50.0, 50.0),
        MaterialCategory::Angle => (3000.0, 100.0, 100.0),
        MaterialCategory::Bolt => (60.0, 20.0, 20.0),
        MaterialCategory::Nut => (16.0, 32.0, 32.0),
        MaterialCategory::Washer => (3.0, 37.0, 37.0),
        MaterialCategory::Weld => (100.0, 6.0, 6.0),
    }
}

/// Default flange thickness of an I-section without catalog data
const DEFAULT_FLANGE_THICKNESS: f64 = 10.0;

/// Cross-section of a base solid
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionShape {
    IShape {
        height: f64,
        width: f64,
        web_thickness: f64,
        flange_thickness: f64,
    },
    RectangularHollow {
        width: f64,
        height: f64,
        wall: f64,
    },
    Circular {
        diameter: f64,
        wall: Option<f64>,
    },
    Block {
        width: f64,
        height: f64,
    },
}

/// Fully-resolved base solid description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseSection {
    pub category: MaterialCategory,
    pub length: f64,
    pub shape: SectionShape,
}

impl BaseSection {
    /// Extent along Y
    pub fn width(&self) -> f64 {
        match self.shape {
            SectionShape::IShape { width, .. }
            | SectionShape::RectangularHollow { width, .. }
            | SectionShape::Block { width, .. } => width,
            SectionShape::Circular { diameter, .. } => diameter,
        }
    }

    /// Extent along Z
    pub fn height(&self) -> f64 {
        match self.shape {
            SectionShape::IShape { height, .. }
            | SectionShape::RectangularHollow { height, .. }
            | SectionShape::Block { height, .. } => height,
            SectionShape::Circular { diameter, .. } => diameter,
        }
    }

    /// Material thickness a flange feature passes through
    pub fn flange_thickness(&self) -> f64 {
        match self.shape {
            SectionShape::IShape { flange_thickness, .. } => flange_thickness,
            SectionShape::RectangularHollow { wall, .. } => wall,
            SectionShape::Circular { wall: Some(wall), .. } => wall,
            _ => self.height(),
        }
    }

    /// Material thickness a web feature passes through
    pub fn web_thickness(&self) -> f64 {
        match self.shape {
            SectionShape::IShape { web_thickness, .. } => web_thickness,
            SectionShape::RectangularHollow { wall, .. } => wall,
            SectionShape::Circular { wall: Some(wall), .. } => wall,
            _ => self.width(),
        }
    }

    #[inline]
    pub fn is_i_shape(&self) -> bool {
        matches!(self.shape, SectionShape::IShape { .. })
    }

    /// Hollow sections cut a single wall per face
    #[inline]
    pub fn is_hollow(&self) -> bool {
        matches!(
            self.shape,
            SectionShape::RectangularHollow { .. } | SectionShape::Circular { wall: Some(_), .. }
        )
    }

    fn profile_type(&self) -> ProfileType {
        match self.shape {
            SectionShape::IShape {
                height,
                width,
                web_thickness,
                flange_thickness,
            } => ProfileType::IShape {
                height,
                width,
                web_thickness,
                flange_thickness,
            },
            SectionShape::RectangularHollow { width, height, wall } => {
                ProfileType::RectangleHollow {
                    width,
                    height,
                    wall_thickness: wall,
                }
            }
            SectionShape::Circular {
                diameter,
                wall: Some(wall),
            } => ProfileType::HollowCircle {
                outer_radius: diameter / 2.0,
                inner_radius: diameter / 2.0 - wall,
            },
            SectionShape::Circular { diameter, wall: None } => ProfileType::Circle {
                radius: diameter / 2.0,
            },
            SectionShape::Block { width, height } => ProfileType::Rectangle { width, height },
        }
    }

    /// Build the closed solid in the local frame
    pub fn to_mesh(&self) -> Mesh {
        let extruded = self
            .profile_type()
            .to_profile()
            .and_then(|profile| extrude_profile(&profile, self.length, Some(member_frame(self.length))));

        match extruded {
            Ok(mesh) if mesh.is_valid() => mesh,
            Ok(_) | Err(_) => {
                tracing::debug!(
                    category = %self.category,
                    shape = ?self.shape,
                    "Section profile failed, using bounding block"
                );
                block_mesh(
                    Vector3::new(self.length, self.width(), self.height()),
                    Point3::origin(),
                )
            }
        }
    }
}

/// Maps profile space (x = width, y = height, z = extrusion) onto the member
/// frame (X = length, Y = width, Z = height), centred on the length
pub fn member_frame(length: f64) -> Matrix4<f64> {
    #[rustfmt::skip]
    let frame = Matrix4::new(
        0.0, 0.0, 1.0, -length / 2.0,
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    frame
}

/// Resolve dimensions, overrides, catalog data and defaults into a section
pub fn resolve_section(
    category: MaterialCategory,
    dimensions: &Dimensions,
    designation: Option<&str>,
    overrides: &ElementMetadata,
) -> BaseSection {
    let (default_length, default_width, default_height) = category_defaults(category);
    let designation = designation.map(Designation::parse);
    let length = positive(dimensions.length).unwrap_or(default_length);

    let shape = match category {
        MaterialCategory::Beam => match designation.as_ref().filter(|d| d.is_i_shape()) {
            Some(designation) => i_section(dimensions, designation, overrides),
            None => block(dimensions, default_width, default_height),
        },
        MaterialCategory::Plate | MaterialCategory::Sheet => SectionShape::Block {
            width: positive(dimensions.width).unwrap_or(default_width),
            height: positive(dimensions.thickness)
                .or(positive(dimensions.height))
                .unwrap_or(default_height),
        },
        MaterialCategory::Tube => tube_section(dimensions, designation.as_ref(), overrides),
        _ => block(dimensions, default_width, default_height),
    };

    BaseSection {
        category,
        length,
        shape,
    }
}

/// Base solid for an element description; never empty
pub fn generate_base(
    category: MaterialCategory,
    dimensions: &Dimensions,
    designation: Option<&str>,
    overrides: &ElementMetadata,
) -> Mesh {
    resolve_section(category, dimensions, designation, overrides).to_mesh()
}

fn block(dimensions: &Dimensions, default_width: f64, default_height: f64) -> SectionShape {
    SectionShape::Block {
        width: positive(dimensions.width)
            .or(positive(dimensions.diameter))
            .unwrap_or(default_width),
        height: positive(dimensions.height)
            .or(positive(dimensions.thickness))
            .or(positive(dimensions.diameter))
            .unwrap_or(default_height),
    }
}

fn i_section(
    dimensions: &Dimensions,
    designation: &Designation,
    overrides: &ElementMetadata,
) -> SectionShape {
    let (_, default_width, default_height) = category_defaults(MaterialCategory::Beam);
    let catalog = designation.catalog_section();

    let height = positive(dimensions.height)
        .or(positive(overrides.height))
        .or(catalog.map(|s| s.height))
        .unwrap_or(default_height);
    let width = positive(dimensions.width)
        .or(positive(overrides.width))
        .or(catalog.map(|s| s.width))
        .unwrap_or(default_width);
    let flange = positive(overrides.flange_thickness)
        .or(catalog.map(|s| s.flange_thickness))
        .unwrap_or(DEFAULT_FLANGE_THICKNESS);
    let web = positive(overrides.web_thickness)
        .or(catalog.map(|s| s.web_thickness))
        .unwrap_or(flange * WEB_TO_FLANGE_RATIO);

    // Overrides can disagree with the outline; keep the section drawable
    let flange_thickness = flange.min(height * 0.45);
    let web_thickness = web.min(width * 0.9);

    SectionShape::IShape {
        height,
        width,
        web_thickness,
        flange_thickness,
    }
}

fn tube_section(
    dimensions: &Dimensions,
    designation: Option<&Designation>,
    overrides: &ElementMetadata,
) -> SectionShape {
    let (_, default_width, default_height) = category_defaults(MaterialCategory::Tube);
    let numbers: &[f64] = designation.map(|d| d.numbers.as_slice()).unwrap_or(&[]);
    let number = |i: usize| numbers.get(i).copied().filter(|v| v.is_finite() && *v > 0.0);
    let wall_override = positive(dimensions.thickness).or(positive(overrides.web_thickness));

    match designation.map(|d| d.family) {
        Some(ShapeFamily::RectangularHollow) => {
            // RHS200x100x8: height x width x wall; SHS100x5: side x wall
            let (height_n, width_n, wall_n) = match numbers.len() {
                0 | 1 => (number(0), number(0), None),
                2 => (number(0), number(0), number(1)),
                _ => (number(0), number(1), number(2)),
            };
            let height = positive(dimensions.height)
                .or(height_n)
                .unwrap_or(default_height);
            let width = positive(dimensions.width)
                .or(width_n)
                .unwrap_or(default_width);
            match wall_override.or(wall_n) {
                Some(wall) if 2.0 * wall < width.min(height) => {
                    SectionShape::RectangularHollow { width, height, wall }
                }
                _ => SectionShape::Block { width, height },
            }
        }
        _ => {
            // CHS168.3x5: diameter x wall
            let diameter = positive(dimensions.diameter)
                .or(positive(dimensions.width))
                .or(positive(dimensions.height))
                .or(number(0))
                .unwrap_or(default_width);
            let wall = wall_override
                .or(number(1))
                .filter(|wall| *wall < diameter / 2.0);
            SectionShape::Circular { diameter, wall }
        }
    }
}

#[inline]
fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Axis-aligned box of the given size centred on `center`. Built directly so
/// it cannot fail.
pub fn block_mesh(size: Vector3<f64>, center: Point3<f64>) -> Mesh {
    let h = size / 2.0;
    let mut mesh = Mesh::with_capacity(24, 36);

    // (normal, u, v) per face with u x v = normal
    let faces = [
        (Vector3::x(), Vector3::y(), Vector3::z()),
        (-Vector3::x(), Vector3::z(), Vector3::y()),
        (Vector3::y(), Vector3::z(), Vector3::x()),
        (-Vector3::y(), Vector3::x(), Vector3::z()),
        (Vector3::z(), Vector3::x(), Vector3::y()),
        (-Vector3::z(), Vector3::y(), Vector3::x()),
    ];

    for (normal, u, v) in faces {
        let base = mesh.vertex_count() as u32;
        let face_center = center + normal.component_mul(&h);
        let du = u.component_mul(&h);
        let dv = v.component_mul(&h);

        mesh.add_vertex(face_center - du - dv, normal);
        mesh.add_vertex(face_center + du - dv, normal);
        mesh.add_vertex(face_center + du + dv, normal);
        mesh.add_vertex(face_center - du + dv, normal);
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }

    mesh
}
