// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Profile definitions and triangulation

use crate::error::{Error, Result};
use nalgebra::Point2;
use std::f64::consts::PI;

/// 2D Profile with optional holes
#[derive(Debug, Clone)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Add a hole to the profile
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Signed area of the outer boundary (positive when counter-clockwise)
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.outer)
    }

    /// Reverse the outer boundary if it is wound clockwise
    pub fn ensure_counter_clockwise(&mut self) {
        if self.signed_area() < 0.0 {
            self.outer.reverse();
        }
    }

    /// Triangulate the profile using earcutr
    /// Returns triangle indices into the flattened vertex array
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let mut vertices = Vec::with_capacity(
            (self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>()) * 2,
        );

        for p in &self.outer {
            vertices.push(p.x);
            vertices.push(p.y);
        }

        let mut hole_indices = Vec::with_capacity(self.holes.len());
        for hole in &self.holes {
            hole_indices.push(vertices.len() / 2);
            for p in hole {
                vertices.push(p.x);
                vertices.push(p.y);
            }
        }

        let indices = earcutr::earcut(&vertices, &hole_indices, 2)
            .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

        if indices.is_empty() {
            return Err(Error::TriangulationError(
                "Profile produced no triangles".to_string(),
            ));
        }

        let mut points = Vec::with_capacity(vertices.len() / 2);
        for i in (0..vertices.len()).step_by(2) {
            points.push(Point2::new(vertices[i], vertices[i + 1]));
        }

        Ok(Triangulation { points, indices })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

/// Cross-section shapes used for base solids and tools
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileType {
    Rectangle {
        width: f64,
        height: f64,
    },
    RectangleHollow {
        width: f64,
        height: f64,
        wall_thickness: f64,
    },
    Circle {
        radius: f64,
    },
    HollowCircle {
        outer_radius: f64,
        inner_radius: f64,
    },
    IShape {
        height: f64,
        width: f64,
        web_thickness: f64,
        flange_thickness: f64,
    },
    /// Slot outline: a rectangle with semicircular ends along X
    Stadium {
        length: f64,
        width: f64,
    },
    Polygon {
        points: Vec<Point2<f64>>,
    },
}

impl ProfileType {
    /// Convert to Profile2D
    pub fn to_profile(&self) -> Result<Profile2D> {
        match self {
            Self::Rectangle { width, height } => Ok(create_rectangle(*width, *height)),
            Self::RectangleHollow {
                width,
                height,
                wall_thickness,
            } => create_rectangle_hollow(*width, *height, *wall_thickness),
            Self::Circle { radius } => Ok(create_circle(*radius, None)),
            Self::HollowCircle {
                outer_radius,
                inner_radius,
            } => Ok(create_circle(*outer_radius, Some(*inner_radius))),
            Self::IShape {
                height,
                width,
                web_thickness,
                flange_thickness,
            } => create_i_shape(*height, *width, *web_thickness, *flange_thickness),
            Self::Stadium { length, width } => Ok(create_stadium(*length, *width)),
            Self::Polygon { points } => {
                let mut profile = Profile2D::new(points.clone());
                profile.ensure_counter_clockwise();
                Ok(profile)
            }
        }
    }
}

/// Create a rectangular profile
#[inline]
pub fn create_rectangle(width: f64, height: f64) -> Profile2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    Profile2D::new(vec![
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, half_h),
        Point2::new(-half_w, half_h),
    ])
}

/// Rectangular hollow section: outer rectangle with a wall-inset hole
pub fn create_rectangle_hollow(width: f64, height: f64, wall_thickness: f64) -> Result<Profile2D> {
    let half_x = width / 2.0;
    let half_y = height / 2.0;

    if wall_thickness <= 0.0 || wall_thickness >= half_x || wall_thickness >= half_y {
        return Err(Error::InvalidProfile(format!(
            "Wall thickness {} does not fit {}x{}",
            wall_thickness, width, height
        )));
    }

    let inner_half_x = half_x - wall_thickness;
    let inner_half_y = half_y - wall_thickness;

    let mut profile = create_rectangle(width, height);
    // Inner rectangle clockwise
    profile.add_hole(vec![
        Point2::new(-inner_half_x, -inner_half_y),
        Point2::new(-inner_half_x, inner_half_y),
        Point2::new(inner_half_x, inner_half_y),
        Point2::new(inner_half_x, -inner_half_y),
    ]);
    Ok(profile)
}

/// I-section outline centred on the origin, height along Y
pub fn create_i_shape(
    height: f64,
    width: f64,
    web_thickness: f64,
    flange_thickness: f64,
) -> Result<Profile2D> {
    if 2.0 * flange_thickness >= height || web_thickness >= width {
        return Err(Error::InvalidProfile(format!(
            "I-section {}x{} cannot hold flange {} / web {}",
            height, width, flange_thickness, web_thickness
        )));
    }

    let half_width = width / 2.0;
    let half_depth = height / 2.0;
    let half_web = web_thickness / 2.0;

    // Counter-clockwise from bottom-left
    Ok(Profile2D::new(vec![
        Point2::new(-half_width, -half_depth),
        Point2::new(half_width, -half_depth),
        Point2::new(half_width, -half_depth + flange_thickness),
        Point2::new(half_web, -half_depth + flange_thickness),
        Point2::new(half_web, half_depth - flange_thickness),
        Point2::new(half_width, half_depth - flange_thickness),
        Point2::new(half_width, half_depth),
        Point2::new(-half_width, half_depth),
        Point2::new(-half_width, half_depth - flange_thickness),
        Point2::new(-half_web, half_depth - flange_thickness),
        Point2::new(-half_web, -half_depth + flange_thickness),
        Point2::new(-half_width, -half_depth + flange_thickness),
    ]))
}

/// Create a circular profile (with optional hole)
pub fn create_circle(radius: f64, hole_radius: Option<f64>) -> Profile2D {
    let mut profile = Profile2D::new(circle_points(radius, calculate_circle_segments(radius)));

    if let Some(hole_r) = hole_radius {
        let mut hole = circle_points(hole_r, calculate_circle_segments(hole_r));
        hole.reverse();
        profile.add_hole(hole);
    }

    profile
}

/// Slot outline of overall `length` along X; ends are semicircles of
/// diameter `width`. Degrades to a circle when length <= width.
pub fn create_stadium(length: f64, width: f64) -> Profile2D {
    let radius = width / 2.0;
    let straight = ((length - width) / 2.0).max(0.0);
    if straight <= f64::EPSILON {
        return create_circle(radius, None);
    }

    let half_segments = (calculate_circle_segments(radius) / 2).max(4);
    let mut outer = Vec::with_capacity(half_segments * 2 + 2);

    // Right end, from -90 deg to +90 deg
    for i in 0..=half_segments {
        let angle = -PI / 2.0 + PI * (i as f64) / (half_segments as f64);
        outer.push(Point2::new(straight + radius * angle.cos(), radius * angle.sin()));
    }
    // Left end, from +90 deg to +270 deg
    for i in 0..=half_segments {
        let angle = PI / 2.0 + PI * (i as f64) / (half_segments as f64);
        outer.push(Point2::new(-straight + radius * angle.cos(), radius * angle.sin()));
    }

    Profile2D::new(outer)
}

/// Points on a circle, counter-clockwise
pub fn circle_points(radius: f64, segments: usize) -> Vec<Point2<f64>> {
    (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (segments as f64);
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Calculate adaptive number of segments for a circle
/// Based on radius to maintain good visual quality
#[inline]
pub fn calculate_circle_segments(radius: f64) -> usize {
    let segments = (radius.abs().sqrt() * 8.0).ceil() as usize;

    // Clamp between 8 and 32 segments
    segments.clamp(8, 32)
}

/// Shoelace area, positive for counter-clockwise polygons
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        sum += p.x * q.y - q.x * p.y;
    }
    sum / 2.0
}

/// Expand a polyline whose vertices carry bulge factors into plain points.
///
/// The bulge on vertex `i` describes the arc from `i` to `i + 1`: it is the
/// tangent of a quarter of the included angle, positive for
/// counter-clockwise arcs. A bulge of zero is a straight segment.
pub fn expand_bulges(vertices: &[(f64, f64, f64)], closed: bool) -> Vec<Point2<f64>> {
    let n = vertices.len();
    let mut points = Vec::with_capacity(n * 2);
    let segment_count = if closed { n } else { n.saturating_sub(1) };

    for i in 0..n {
        let (x, y, bulge) = vertices[i];
        points.push(Point2::new(x, y));
        if i >= segment_count || bulge.abs() < 1e-9 {
            continue;
        }
        let (nx, ny, _) = vertices[(i + 1) % n];
        points.extend(arc_between(Point2::new(x, y), Point2::new(nx, ny), bulge));
    }

    points
}

/// Interior points of the arc from `start` to `end` (both excluded)
fn arc_between(start: Point2<f64>, end: Point2<f64>, bulge: f64) -> Vec<Point2<f64>> {
    let chord = end - start;
    let chord_len = chord.norm();
    if chord_len < 1e-9 {
        return Vec::new();
    }

    let sweep = 4.0 * bulge.atan();
    let radius = chord_len / (2.0 * (sweep / 2.0).sin()).abs();

    // Centre sits on the chord's perpendicular bisector
    let mid = Point2::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
    let sagitta_offset = (radius * radius - chord_len * chord_len / 4.0).max(0.0).sqrt();
    let left = nalgebra::Vector2::new(-chord.y, chord.x) / chord_len;
    let side = if (bulge > 0.0) == (sweep.abs() < PI) { 1.0 } else { -1.0 };
    let center = mid + left * sagitta_offset * side;

    let start_angle = (start.y - center.y).atan2(start.x - center.x);
    let segments = ((sweep.abs() / (2.0 * PI)) * calculate_circle_segments(radius) as f64)
        .ceil()
        .max(2.0) as usize;

    (1..segments)
        .map(|i| {
            let angle = start_angle + sweep * (i as f64) / (segments as f64);
            Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// True when two non-adjacent edges of the closed polygon cross
pub fn has_self_intersection(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }

    for i in 0..n {
        let a0 = points[i];
        let a1 = points[(i + 1) % n];
        for j in (i + 2)..n {
            // The first and last edge share a vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = points[j];
            let b1 = points[(j + 1) % n];
            if segments_cross(a0, a1, b0, b1) {
                return true;
            }
        }
    }
    false
}

fn segments_cross(a0: Point2<f64>, a1: Point2<f64>, b0: Point2<f64>, b1: Point2<f64>) -> bool {
    let orient = |p: Point2<f64>, q: Point2<f64>, r: Point2<f64>| {
        (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
    };
    let d1 = orient(b0, b1, a0);
    let d2 = orient(b0, b1, a1);
    let d3 = orient(a0, a1, b0);
    let d4 = orient(a0, a1, b1);
    const EPS: f64 = 1e-12;
    ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_profile() {
        let profile = create_rectangle(10.0, 5.0);
        assert_eq!(profile.outer.len(), 4);
        assert_eq!(profile.holes.len(), 0);
        assert_eq!(profile.outer[0], Point2::new(-5.0, -2.5));
        assert_eq!(profile.outer[2], Point2::new(5.0, 2.5));
        assert_relative_eq!(profile.signed_area(), 50.0);
    }

    #[test]
    fn test_circle_profile() {
        let profile = create_circle(5.0, None);
        assert!(profile.outer.len() >= 8);
        let first = profile.outer[0];
        let dist = (first.x * first.x + first.y * first.y).sqrt();
        assert!((dist - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_hollow_circle_hole_is_clockwise() {
        let profile = create_circle(10.0, Some(5.0));
        assert_eq!(profile.holes.len(), 1);
        assert!(signed_area(&profile.holes[0]) < 0.0);
    }

    #[test]
    fn test_i_shape_area() {
        // IPE300: 2 flanges of 150x10.7 plus a web of 7.1 x (300 - 21.4)
        let profile = create_i_shape(300.0, 150.0, 7.1, 10.7).unwrap();
        assert_eq!(profile.outer.len(), 12);
        let expected = 2.0 * 150.0 * 10.7 + 7.1 * (300.0 - 2.0 * 10.7);
        assert_relative_eq!(profile.signed_area(), expected, epsilon = 1e-6);

        let tri = profile.triangulate().unwrap();
        assert_eq!(tri.indices.len(), (12 - 2) * 3);
    }

    #[test]
    fn test_i_shape_rejects_impossible_flanges() {
        assert!(create_i_shape(20.0, 100.0, 5.0, 10.0).is_err());
        assert!(create_i_shape(200.0, 10.0, 12.0, 10.0).is_err());
    }

    #[test]
    fn test_rectangle_hollow() {
        let profile = create_rectangle_hollow(200.0, 100.0, 8.0).unwrap();
        assert_eq!(profile.holes.len(), 1);
        assert!(signed_area(&profile.holes[0]) < 0.0);
        let tri = profile.triangulate().unwrap();
        assert_eq!(tri.points.len(), 8);

        assert!(create_rectangle_hollow(200.0, 100.0, 60.0).is_err());
    }

    #[test]
    fn test_stadium() {
        let slot = create_stadium(50.0, 22.0);
        let area = slot.signed_area();
        let exact = (50.0 - 22.0) * 22.0 + PI * 11.0 * 11.0;
        assert!(area > 0.0);
        assert!((area - exact).abs() / exact < 0.05);

        let round = create_stadium(10.0, 22.0);
        assert_eq!(round.outer.len(), calculate_circle_segments(11.0));
    }

    #[test]
    fn test_circle_segments() {
        assert_eq!(calculate_circle_segments(1.0), 8);
        assert_eq!(calculate_circle_segments(4.0), 16);
        assert!(calculate_circle_segments(100.0) <= 32);
        assert!(calculate_circle_segments(0.1) >= 8);
    }

    #[test]
    fn test_expand_bulges() {
        let straight = expand_bulges(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (10.0, 10.0, 0.0)], true);
        assert_eq!(straight.len(), 3);

        // Semicircle from (0,0) to (10,0), bulge 1 = 180 deg counter-clockwise
        let arc = expand_bulges(&[(0.0, 0.0, 1.0), (10.0, 0.0, 0.0)], false);
        assert!(arc.len() > 2);
        for p in &arc {
            let r = ((p.x - 5.0).powi(2) + p.y.powi(2)).sqrt();
            assert_relative_eq!(r, 5.0, epsilon = 1e-6);
        }
        // Counter-clockwise from (0,0) to (10,0) passes below the chord
        assert!(arc[1].y < 0.0);
    }

    #[test]
    fn test_self_intersection() {
        let square = create_rectangle(10.0, 10.0).outer;
        assert!(!has_self_intersection(&square));

        let bow_tie = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(has_self_intersection(&bow_tie));
    }
}
