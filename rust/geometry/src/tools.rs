// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Machining tool solids
//!
//! Each feature becomes one or more closed solids placed on its face. Tools
//! are authored in a face-local frame (X along the member, Y across the face,
//! Z along the outward face axis) and moved onto the base solid with the
//! face frame's transform.

use crate::base::{block_mesh, BaseSection};
use crate::csg::BooleanOp;
use crate::error::{Error, Result};
use crate::extrusion::extrude_profile;
use crate::mesh::Mesh;
use crate::profile::{
    calculate_circle_segments, create_circle, expand_bulges, has_self_intersection, signed_area,
    ProfileType,
};
use nalgebra::{Matrix4, Point2, Point3, Rotation3, Vector3};
use nc_lite_core::{
    ContourType, CoordinateSystem, CopingType, Face, FeatureParams, NormalizedFeature, NotchType,
};
use std::f64::consts::FRAC_PI_2;

/// Overshoot past the surfaces of a through cut
pub const THROUGH_MARGIN: f64 = 1.0;

/// Character cell width relative to font size for engraved text
const TEXT_ASPECT: f64 = 0.6;

/// A positioned tool solid and how it combines with the host
#[derive(Debug, Clone)]
pub struct ToolSolid {
    pub op: BooleanOp,
    pub mesh: Mesh,
}

/// Placement of a feature on its face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFrame {
    /// Outward face normal in the member frame
    pub axis: Vector3<f64>,
    /// Axis coordinate of the outer surface
    pub surface: f64,
    /// Material thickness below the surface
    pub thickness: f64,
    /// Half the section extent along the axis
    pub section_half: f64,
    /// Section extent across the face (perpendicular to the member)
    pub span: f64,
    /// Feature point in the member frame, on the plane through the origin
    pub origin: Point3<f64>,
    /// Face-local Y maps onto `+across` (1.0) or `-across` (-1.0)
    pub across_sign: f64,
    /// Overshoot past the inner surface; zero where other material (an
    /// I-section web) continues behind the face
    pub inner_margin: f64,
}

impl FaceFrame {
    /// Resolve where a feature sits on a section
    pub fn resolve(feature: &NormalizedFeature, section: &BaseSection) -> Self {
        let width = section.width();
        let height = section.height();
        let x = match feature.coordinate_system {
            CoordinateSystem::Local => feature.position[0],
            CoordinateSystem::MemberStart => feature.position[0] - section.length / 2.0,
        };
        let [_, y, z] = feature.position;

        // Thickness cut by a lateral feature
        let lateral = if section.is_hollow() {
            section.web_thickness()
        } else {
            width
        };

        let (axis, surface, thickness): (Vector3<f64>, f64, f64) = match feature.face {
            Face::Web => (Vector3::y(), section.web_thickness() / 2.0, section.web_thickness()),
            Face::TopFlange => (Vector3::z(), height / 2.0, section.flange_thickness()),
            Face::BottomFlange => (-Vector3::z(), height / 2.0, section.flange_thickness()),
            Face::Top => (Vector3::z(), height / 2.0, height),
            Face::Bottom => (-Vector3::z(), height / 2.0, height),
            Face::Left | Face::LeftLeg => (-Vector3::y(), width / 2.0, lateral),
            Face::Right | Face::RightLeg => (Vector3::y(), width / 2.0, lateral),
        };

        // Non-I webs are the full section (or one tube wall)
        let (surface, thickness) = if feature.face == Face::Web && !section.is_i_shape() {
            (width / 2.0, section.web_thickness().min(width))
        } else {
            (surface, thickness.min(2.0 * surface))
        };

        let inner_margin = match feature.face {
            Face::TopFlange | Face::BottomFlange if section.is_i_shape() => 0.0,
            _ => THROUGH_MARGIN,
        };

        let lateral_axis = axis.y.abs() > 0.5;
        let (origin, section_half, span) = if lateral_axis {
            (Point3::new(x, 0.0, z), width / 2.0, height)
        } else {
            (Point3::new(x, y, 0.0), height / 2.0, width)
        };

        let mut frame = Self {
            axis,
            surface,
            thickness,
            section_half,
            span,
            origin,
            across_sign: 1.0,
            inner_margin,
        };
        let across = if lateral_axis { Vector3::z() } else { Vector3::y() };
        frame.across_sign = (frame.rotation() * Vector3::y()).dot(&across).signum();
        frame
    }

    /// Rotation taking face-local axes onto the member frame; local X stays X
    fn rotation(&self) -> Rotation3<f64> {
        let angle = if self.axis.y > 0.5 {
            -FRAC_PI_2
        } else if self.axis.y < -0.5 {
            FRAC_PI_2
        } else if self.axis.z < 0.0 {
            std::f64::consts::PI
        } else {
            0.0
        };
        Rotation3::from_axis_angle(&Vector3::x_axis(), angle)
    }

    /// Face-local to member transform, with a turn of `degrees` about the axis
    pub fn transform(&self, degrees: f64) -> Matrix4<f64> {
        let spin = Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians());
        Matrix4::new_translation(&self.origin.coords)
            * self.rotation().to_homogeneous()
            * spin.to_homogeneous()
    }

    /// Axis range through all material of the face
    #[inline]
    pub fn through_extent(&self) -> (f64, f64) {
        (
            self.surface - self.thickness - self.inner_margin,
            self.surface + THROUGH_MARGIN,
        )
    }

    /// Axis range for an optional blind depth; depths reaching the far
    /// surface become through cuts
    #[inline]
    pub fn extent(&self, depth: Option<f64>) -> (f64, f64) {
        match depth {
            Some(depth) if depth < self.thickness => {
                (self.surface - depth, self.surface + THROUGH_MARGIN)
            }
            _ => self.through_extent(),
        }
    }

    /// Axis range covering the whole section
    #[inline]
    pub fn section_extent(&self) -> (f64, f64) {
        (
            -self.section_half - THROUGH_MARGIN,
            self.section_half + THROUGH_MARGIN,
        )
    }
}

/// Build the tool solids for one feature, in the member frame
pub fn build_tools(feature: &NormalizedFeature, section: &BaseSection) -> Result<Vec<ToolSolid>> {
    let frame = FaceFrame::resolve(feature, section);
    let subtract = |mesh| ToolSolid {
        op: BooleanOp::Subtract,
        mesh,
    };

    let local = match &feature.params {
        FeatureParams::Hole { diameter, depth, .. } => {
            require_positive("diameter", *diameter)?;
            vec![subtract(cylinder(*diameter / 2.0, frame.extent(*depth))?)]
        }
        FeatureParams::TappedHole {
            diameter,
            depth,
            pitch,
            ..
        } => {
            require_positive("diameter", *diameter)?;
            // Tap drill: nominal minus one pitch
            let drill = if pitch.is_finite() && *pitch > 0.0 && *pitch < *diameter {
                diameter - pitch
            } else {
                *diameter
            };
            vec![subtract(cylinder(drill / 2.0, frame.extent(*depth))?)]
        }
        FeatureParams::Countersink {
            diameter,
            depth,
            sink_diameter,
            sink_depth,
            ..
        } => {
            require_positive("diameter", *diameter)?;
            let mut tools = vec![subtract(cylinder(*diameter / 2.0, frame.extent(*depth))?)];
            if *sink_diameter > *diameter && *sink_depth > 0.0 && sink_depth.is_finite() {
                let slope = (sink_diameter - diameter) / 2.0 / sink_depth;
                let bottom = frame.surface - sink_depth.min(frame.thickness);
                let top = frame.surface + THROUGH_MARGIN;
                tools.push(subtract(frustum_mesh(
                    diameter / 2.0,
                    sink_diameter / 2.0 + THROUGH_MARGIN * slope,
                    bottom,
                    top,
                )));
            }
            tools
        }
        FeatureParams::Counterbore {
            diameter,
            depth,
            bore_diameter,
            bore_depth,
        } => {
            require_positive("diameter", *diameter)?;
            let mut tools = vec![subtract(cylinder(*diameter / 2.0, frame.extent(*depth))?)];
            if *bore_diameter > *diameter && *bore_depth > 0.0 {
                tools.push(subtract(cylinder(
                    *bore_diameter / 2.0,
                    frame.extent(Some(*bore_depth)),
                )?));
            }
            tools
        }
        FeatureParams::Slot {
            length,
            width,
            depth,
        } => {
            require_positive("length", *length)?;
            require_positive("width", *width)?;
            vec![subtract(prism(
                &ProfileType::Stadium {
                    length: *length,
                    width: *width,
                },
                frame.extent(*depth),
            )?)]
        }
        FeatureParams::Cutout {
            length,
            width,
            depth,
        } => vec![subtract(rect_prism(*length, *width, frame.extent(*depth))?)],
        FeatureParams::Notch {
            length,
            width,
            depth,
            notch_type,
        } => {
            require_positive("length", *length)?;
            require_positive("width", *width)?;
            let extent = frame.extent(*depth);
            let mesh = match notch_type {
                NotchType::Rectangular => rect_prism(*length, *width, extent)?,
                NotchType::Radius => cylinder(length.min(*width) / 2.0, extent)?,
                NotchType::Triangular => {
                    let (hl, hw) = (length / 2.0, width / 2.0);
                    prism(
                        &ProfileType::Polygon {
                            points: vec![
                                Point2::new(-hl, -hw),
                                Point2::new(hl, -hw),
                                Point2::new(-hl, hw),
                            ],
                        },
                        extent,
                    )?
                }
            };
            vec![subtract(mesh)]
        }
        FeatureParams::Marking {
            length,
            width,
            depth,
        } => {
            require_positive("depth", *depth)?;
            vec![subtract(rect_prism(*length, *width, frame.extent(Some(*depth)))?)]
        }
        FeatureParams::Text {
            text,
            font_size,
            depth,
        } => {
            require_positive("font size", *font_size)?;
            require_positive("depth", *depth)?;
            let chars = text.chars().filter(|c| !c.is_whitespace()).count().max(1);
            let length = chars as f64 * font_size * TEXT_ASPECT;
            vec![subtract(rect_prism(length, *font_size, frame.extent(Some(*depth)))?)]
        }
        FeatureParams::Coping {
            coping_type,
            angle,
            clearance,
            length,
            depth,
            ..
        } => {
            require_positive("length", *length)?;
            let clearance = if clearance.is_finite() { clearance.max(0.0) } else { 0.0 };
            let across = frame.span + 2.0 * (clearance + THROUGH_MARGIN);
            let mesh = rect_prism(length + clearance, across, frame.extent(*depth))?;
            let op = match coping_type {
                CopingType::Cut => BooleanOp::Subtract,
                CopingType::Fit => BooleanOp::Union,
            };
            let mesh = spin(mesh, if angle.is_finite() { *angle } else { 0.0 });
            vec![ToolSolid { op, mesh }]
        }
        FeatureParams::Contour {
            points,
            closed,
            depth,
            contour_type,
        } => {
            if !closed {
                return Err(Error::InvalidFeature(
                    "open contours cannot be machined".to_string(),
                ));
            }
            let vertices: Vec<(f64, f64, f64)> = points
                .iter()
                .map(|p| (p.x, p.y * frame.across_sign, p.bulge * frame.across_sign))
                .collect();
            let outline = contour_outline(&vertices)?;
            match contour_type {
                ContourType::Inner => vec![subtract(prism(
                    &ProfileType::Polygon { points: outline },
                    frame.extent(*depth),
                )?)],
                ContourType::Outer => vec![ToolSolid {
                    op: BooleanOp::Intersect,
                    mesh: prism(
                        &ProfileType::Polygon { points: outline },
                        frame.section_extent(),
                    )?,
                }],
            }
        }
    };

    let transform = frame.transform(feature.rotation);
    Ok(local
        .into_iter()
        .map(|mut tool| {
            crate::extrusion::apply_transform(&mut tool.mesh, &transform);
            tool
        })
        .collect())
}

/// Expand bulges and reject outlines that cannot be extruded
pub fn contour_outline(vertices: &[(f64, f64, f64)]) -> Result<Vec<Point2<f64>>> {
    if vertices.iter().any(|(x, y, b)| !(x.is_finite() && y.is_finite() && b.is_finite())) {
        return Err(Error::InvalidFeature(
            "contour has non-finite coordinates".to_string(),
        ));
    }

    let mut outline = expand_bulges(vertices, true);
    outline.dedup_by(|a, b| (*a - *b).norm() < 1e-9);
    if outline.len() > 1 && (outline[0] - outline[outline.len() - 1]).norm() < 1e-9 {
        outline.pop();
    }

    if outline.len() < 3 {
        return Err(Error::InvalidFeature(format!(
            "contour needs at least 3 points, got {}",
            outline.len()
        )));
    }
    if has_self_intersection(&outline) {
        return Err(Error::InvalidFeature(
            "contour is self-intersecting".to_string(),
        ));
    }
    if signed_area(&outline).abs() < 1e-6 {
        return Err(Error::InvalidFeature("contour encloses no area".to_string()));
    }
    Ok(outline)
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidFeature(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

/// Extrude a face-local outline over an axis range
fn prism(profile: &ProfileType, (z0, z1): (f64, f64)) -> Result<Mesh> {
    let profile = profile.to_profile()?;
    extrude_profile(
        &profile,
        z1 - z0,
        Some(Matrix4::new_translation(&Vector3::new(0.0, 0.0, z0))),
    )
}

fn cylinder(radius: f64, extent: (f64, f64)) -> Result<Mesh> {
    require_positive("radius", radius)?;
    let profile = create_circle(radius, None);
    let (z0, z1) = extent;
    extrude_profile(
        &profile,
        z1 - z0,
        Some(Matrix4::new_translation(&Vector3::new(0.0, 0.0, z0))),
    )
}

fn rect_prism(length: f64, width: f64, (z0, z1): (f64, f64)) -> Result<Mesh> {
    require_positive("length", length)?;
    require_positive("width", width)?;
    if !(z1 > z0) {
        return Err(Error::InvalidFeature(format!(
            "empty depth range {}..{}",
            z0, z1
        )));
    }
    Ok(block_mesh(
        Vector3::new(length, width, z1 - z0),
        Point3::new(0.0, 0.0, (z0 + z1) / 2.0),
    ))
}

/// Turn a face-local tool about the face axis
fn spin(mut mesh: Mesh, degrees: f64) -> Mesh {
    if degrees != 0.0 {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians());
        crate::extrusion::apply_transform(&mut mesh, &rotation.to_homogeneous());
    }
    mesh
}

/// Closed cone frustum along Z: radius `r0` at `z0`, `r1` at `z1`
pub fn frustum_mesh(r0: f64, r1: f64, z0: f64, z1: f64) -> Mesh {
    let segments = calculate_circle_segments(r0.max(r1));
    let ring = |r: f64| {
        (0..segments).map(move |i| {
            let angle = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
            (angle.cos() * r, angle.sin() * r, angle)
        })
    };
    let mut mesh = Mesh::with_capacity(segments * 6 + 2, segments * 12);
    let slope = (r0 - r1) / (z1 - z0);

    // Bottom cap
    let center = mesh.vertex_count() as u32;
    mesh.add_vertex(Point3::new(0.0, 0.0, z0), -Vector3::z());
    for (x, y, _) in ring(r0) {
        mesh.add_vertex(Point3::new(x, y, z0), -Vector3::z());
    }
    for i in 0..segments as u32 {
        let next = (i + 1) % segments as u32;
        mesh.add_triangle(center, center + 1 + next, center + 1 + i);
    }

    // Top cap
    let center = mesh.vertex_count() as u32;
    mesh.add_vertex(Point3::new(0.0, 0.0, z1), Vector3::z());
    for (x, y, _) in ring(r1) {
        mesh.add_vertex(Point3::new(x, y, z1), Vector3::z());
    }
    for i in 0..segments as u32 {
        let next = (i + 1) % segments as u32;
        mesh.add_triangle(center, center + 1 + i, center + 1 + next);
    }

    // Sides
    let base = mesh.vertex_count() as u32;
    for ((x0, y0, angle), (x1, y1, _)) in ring(r0).zip(ring(r1)) {
        let normal = Vector3::new(angle.cos(), angle.sin(), slope).normalize();
        mesh.add_vertex(Point3::new(x0, y0, z0), normal);
        mesh.add_vertex(Point3::new(x1, y1, z1), normal);
    }
    for i in 0..segments as u32 {
        let next = (i + 1) % segments as u32;
        let (b0, t0) = (base + 2 * i, base + 2 * i + 1);
        let (b1, t1) = (base + 2 * next, base + 2 * next + 1);
        mesh.add_triangle(b0, b1, t1);
        mesh.add_triangle(b0, t1, t0);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::resolve_section;
    use approx::assert_relative_eq;
    use nc_lite_core::{
        ContourPoint, Dimensions, ElementMetadata, FeatureKind, MaterialCategory, Metadata,
    };

    fn ipe300() -> BaseSection {
        resolve_section(
            MaterialCategory::Beam,
            &Dimensions::new().with_length(6000.0),
            Some("IPE300"),
            &ElementMetadata::default(),
        )
    }

    fn feature(face: Face, position: [f64; 3], params: FeatureParams) -> NormalizedFeature {
        NormalizedFeature {
            id: "f-0".to_string(),
            kind: params.kind(),
            coordinate_system: CoordinateSystem::Local,
            position,
            rotation: 0.0,
            face,
            params,
            metadata: Metadata::new(),
        }
    }

    fn hole(diameter: f64) -> FeatureParams {
        FeatureParams::Hole {
            diameter,
            depth: None,
            bolt_hole: false,
        }
    }

    #[test]
    fn test_web_hole_crosses_web_along_y() {
        let section = ipe300();
        let tools = build_tools(&feature(Face::Web, [1000.0, 0.0, 20.0], hole(22.0)), &section).unwrap();
        assert_eq!(tools.len(), 1);
        let (min, max) = tools[0].mesh.bounds();
        assert_relative_eq!((min.x + max.x) / 2.0, 1000.0, epsilon = 0.01);
        assert_relative_eq!((min.z + max.z) / 2.0, 20.0, epsilon = 0.01);
        assert_relative_eq!(max.y, (7.1 / 2.0 + THROUGH_MARGIN) as f32, epsilon = 0.01);
        assert_relative_eq!(min.y, -(7.1 / 2.0 + THROUGH_MARGIN) as f32, epsilon = 0.01);
    }

    #[test]
    fn test_flange_hole_only_cuts_flange() {
        let section = ipe300();
        let tools = build_tools(
            &feature(Face::TopFlange, [500.0, 40.0, 150.0], hole(18.0)),
            &section,
        )
        .unwrap();
        let (min, max) = tools[0].mesh.bounds();
        assert_relative_eq!(max.z, (150.0 + THROUGH_MARGIN) as f32, epsilon = 0.01);
        // Stops at the flange's inner face so the web below stays intact
        assert_relative_eq!(min.z, (150.0 - 10.7) as f32, epsilon = 0.01);
        assert_relative_eq!((min.y + max.y) / 2.0, 40.0, epsilon = 0.01);

        let bottom = build_tools(
            &feature(Face::BottomFlange, [500.0, 0.0, -150.0], hole(18.0)),
            &section,
        )
        .unwrap();
        let (min, max) = bottom[0].mesh.bounds();
        assert_relative_eq!(min.z, (-150.0 - THROUGH_MARGIN) as f32, epsilon = 0.01);
        assert_relative_eq!(max.z, (-150.0 + 10.7) as f32, epsilon = 0.01);
    }

    #[test]
    fn test_top_face_through_cut_keeps_inner_margin() {
        let plate = resolve_section(
            MaterialCategory::Plate,
            &Dimensions::new()
                .with_length(800.0)
                .with_width(300.0)
                .with_thickness(12.0),
            None,
            &ElementMetadata::default(),
        );
        let tools =
            build_tools(&feature(Face::Top, [0.0, 0.0, 6.0], hole(14.0)), &plate).unwrap();
        let (min, _) = tools[0].mesh.bounds();
        assert_relative_eq!(min.z, (-6.0 - THROUGH_MARGIN) as f32, epsilon = 0.01);
    }

    #[test]
    fn test_member_start_shifts_x() {
        let section = ipe300();
        let mut f = feature(Face::Web, [100.0, 0.0, 0.0], hole(20.0));
        f.coordinate_system = CoordinateSystem::MemberStart;
        let tools = build_tools(&f, &section).unwrap();
        let (min, max) = tools[0].mesh.bounds();
        assert_relative_eq!((min.x + max.x) / 2.0, -2900.0, epsilon = 0.01);
    }

    #[test]
    fn test_blind_depth_from_surface() {
        let plate = resolve_section(
            MaterialCategory::Plate,
            &Dimensions::new().with_thickness(20.0),
            None,
            &ElementMetadata::default(),
        );
        let f = feature(
            Face::Top,
            [0.0, 0.0, 10.0],
            FeatureParams::Hole {
                diameter: 10.0,
                depth: Some(5.0),
                bolt_hole: false,
            },
        );
        let tools = build_tools(&f, &plate).unwrap();
        let (min, _) = tools[0].mesh.bounds();
        assert_relative_eq!(min.z, 5.0, epsilon = 0.01);
    }

    #[test]
    fn test_countersink_and_counterbore_add_second_tool() {
        let section = ipe300();
        let sink = FeatureParams::Countersink {
            diameter: 10.0,
            depth: None,
            sink_diameter: 20.0,
            sink_depth: 5.0,
            angle: 90.0,
        };
        assert_eq!(build_tools(&feature(Face::TopFlange, [0.0; 3], sink), &section).unwrap().len(), 2);

        let bore = FeatureParams::Counterbore {
            diameter: 10.0,
            depth: None,
            bore_diameter: 16.0,
            bore_depth: 6.0,
        };
        assert_eq!(build_tools(&feature(Face::TopFlange, [0.0; 3], bore), &section).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_dimensions_are_errors() {
        let section = ipe300();
        assert!(build_tools(&feature(Face::Web, [0.0; 3], hole(-5.0)), &section).is_err());
        assert!(build_tools(&feature(Face::Web, [0.0; 3], hole(f64::NAN)), &section).is_err());
        let slot = FeatureParams::Slot {
            length: 0.0,
            width: 10.0,
            depth: None,
        };
        assert!(build_tools(&feature(Face::Web, [0.0; 3], slot), &section).is_err());
    }

    #[test]
    fn test_self_intersecting_contour_is_rejected() {
        let bowtie = FeatureParams::Contour {
            points: vec![
                ContourPoint::new(0.0, 0.0),
                ContourPoint::new(100.0, 100.0),
                ContourPoint::new(100.0, 0.0),
                ContourPoint::new(0.0, 100.0),
            ],
            closed: true,
            depth: None,
            contour_type: ContourType::Inner,
        };
        let result = build_tools(&feature(Face::Web, [0.0; 3], bowtie), &ipe300());
        assert!(matches!(result, Err(Error::InvalidFeature(_))));
    }

    #[test]
    fn test_outer_contour_intersects() {
        let square = FeatureParams::Contour {
            points: vec![
                ContourPoint::new(-100.0, -50.0),
                ContourPoint::new(100.0, -50.0),
                ContourPoint::new(100.0, 50.0),
                ContourPoint::new(-100.0, 50.0),
            ],
            closed: true,
            depth: None,
            contour_type: ContourType::Outer,
        };
        let f = feature(Face::Top, [0.0; 3], square);
        assert_eq!(f.kind, FeatureKind::Contour);
        let tools = build_tools(&f, &ipe300()).unwrap();
        assert_eq!(tools[0].op, BooleanOp::Intersect);
    }

    #[test]
    fn test_rotation_turns_slot_about_face_axis() {
        let mut f = feature(
            Face::TopFlange,
            [0.0, 0.0, 150.0],
            FeatureParams::Slot {
                length: 60.0,
                width: 20.0,
                depth: None,
            },
        );
        f.rotation = 90.0;
        let tools = build_tools(&f, &ipe300()).unwrap();
        let (min, max) = tools[0].mesh.bounds();
        assert_relative_eq!(max.x - min.x, 20.0, epsilon = 0.1);
        assert_relative_eq!(max.y - min.y, 60.0, epsilon = 0.1);
    }

    #[test]
    fn test_frustum_is_closed() {
        let mesh = frustum_mesh(5.0, 10.0, 0.0, 5.0);
        let segments = calculate_circle_segments(10.0);
        assert_eq!(mesh.triangle_count(), segments * 4);
        let (min, max) = mesh.bounds();
        assert_relative_eq!(max.x, 10.0, epsilon = 0.01);
        assert_relative_eq!(min.z, 0.0, epsilon = 0.01);
    }
}
