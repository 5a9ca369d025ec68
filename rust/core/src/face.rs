// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face resolution
//!
//! Exchange data often omits which face a feature belongs to. When no hint is
//! declared the face is inferred from the feature's through-thickness
//! coordinate (local Z, the height axis of the base solid):
//!
//! | category        | rule                                                  |
//! |-----------------|-------------------------------------------------------|
//! | BEAM            | `|z| < tolerance` web, `z >= tol` top flange, else bottom |
//! | PLATE / SHEET   | `z >= 0` top, else bottom                             |
//! | everything else | generic face (TOP)                                    |
//!
//! A value exactly at the tolerance is a flange. The tolerance is absolute
//! and not scaled by the profile's thickness.

use crate::element::MaterialCategory;
use crate::feature::Face;

/// Distance from the section mid-axis still classified as web
pub const WEB_TOLERANCE: f64 = 1.0;

/// Map a declared face hint to a face. Case, '-', '_' and spaces are
/// ignored; DSTV face letters are accepted (v/h = web, o = top flange,
/// u = bottom flange). Returns None for unrecognised hints.
pub fn parse_face_hint(hint: &str) -> Option<Face> {
    let key: String = hint
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect::<String>()
        .to_ascii_lowercase();

    let face = match key.as_str() {
        "web" | "v" | "h" => Face::Web,
        "topflange" | "o" => Face::TopFlange,
        "bottomflange" | "u" => Face::BottomFlange,
        "top" => Face::Top,
        "bottom" => Face::Bottom,
        "left" => Face::Left,
        "right" => Face::Right,
        "leftleg" => Face::LeftLeg,
        "rightleg" => Face::RightLeg,
        _ => return None,
    };
    Some(face)
}

/// Resolves faces with a configurable web tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceResolver {
    pub web_tolerance: f64,
}

impl FaceResolver {
    pub fn new(web_tolerance: f64) -> Self {
        Self { web_tolerance }
    }

    /// Pure function of (hint, position z, category)
    pub fn resolve(&self, position_z: f64, category: MaterialCategory, hint: Option<&str>) -> Face {
        if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
            return parse_face_hint(hint).unwrap_or(Face::GENERIC);
        }

        match category {
            MaterialCategory::Beam => {
                if position_z.abs() < self.web_tolerance {
                    Face::Web
                } else if position_z > 0.0 {
                    Face::TopFlange
                } else {
                    Face::BottomFlange
                }
            }
            c if c.is_flat() => {
                if position_z >= 0.0 {
                    Face::Top
                } else {
                    Face::Bottom
                }
            }
            _ => Face::GENERIC,
        }
    }
}

impl Default for FaceResolver {
    fn default() -> Self {
        Self::new(WEB_TOLERANCE)
    }
}

/// Resolve a face with the default tolerance
#[inline]
pub fn resolve_face(position_z: f64, category: MaterialCategory, hint: Option<&str>) -> Face {
    FaceResolver::default().resolve(position_z, category, hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beam_inference() {
        assert_eq!(resolve_face(0.0, MaterialCategory::Beam, None), Face::Web);
        assert_eq!(resolve_face(0.99, MaterialCategory::Beam, None), Face::Web);
        assert_eq!(resolve_face(-0.5, MaterialCategory::Beam, None), Face::Web);
        assert_eq!(resolve_face(140.0, MaterialCategory::Beam, None), Face::TopFlange);
        assert_eq!(resolve_face(-140.0, MaterialCategory::Beam, None), Face::BottomFlange);
    }

    #[test]
    fn test_tolerance_boundary_is_flange() {
        for _ in 0..3 {
            assert_eq!(resolve_face(1.0, MaterialCategory::Beam, None), Face::TopFlange);
            assert_eq!(resolve_face(-1.0, MaterialCategory::Beam, None), Face::BottomFlange);
        }
    }

    #[test]
    fn test_plate_inference() {
        assert_eq!(resolve_face(0.0, MaterialCategory::Plate, None), Face::Top);
        assert_eq!(resolve_face(5.0, MaterialCategory::Sheet, None), Face::Top);
        assert_eq!(resolve_face(-0.1, MaterialCategory::Plate, None), Face::Bottom);
    }

    #[test]
    fn test_other_categories_are_generic() {
        for category in [
            MaterialCategory::Tube,
            MaterialCategory::Angle,
            MaterialCategory::Bolt,
            MaterialCategory::Channel,
        ] {
            assert_eq!(resolve_face(50.0, category, None), Face::GENERIC);
            assert_eq!(resolve_face(-50.0, category, None), Face::GENERIC);
        }
    }

    #[test]
    fn test_hint_wins_over_position() {
        assert_eq!(resolve_face(140.0, MaterialCategory::Beam, Some("web")), Face::Web);
        assert_eq!(resolve_face(0.0, MaterialCategory::Beam, Some("Top-Flange")), Face::TopFlange);
        assert_eq!(resolve_face(0.0, MaterialCategory::Beam, Some("u")), Face::BottomFlange);
        assert_eq!(resolve_face(0.0, MaterialCategory::Angle, Some("left_leg")), Face::LeftLeg);
        assert_eq!(resolve_face(0.0, MaterialCategory::Beam, Some("sideways")), Face::GENERIC);
    }

    #[test]
    fn test_blank_hint_falls_back_to_inference() {
        assert_eq!(resolve_face(0.0, MaterialCategory::Beam, Some("  ")), Face::Web);
    }

    #[test]
    fn test_custom_tolerance() {
        let resolver = FaceResolver::new(5.0);
        assert_eq!(resolver.resolve(4.0, MaterialCategory::Beam, None), Face::Web);
        assert_eq!(resolver.resolve(5.0, MaterialCategory::Beam, None), Face::TopFlange);
    }
}
