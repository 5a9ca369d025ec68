// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature normalization
//!
//! Turns the loosely-typed exchange records of an element into an ordered list
//! of [`NormalizedFeature`]s. This is the only place that reads metadata bags
//! by key; everything after it matches on [`FeatureParams`].
//!
//! Normalization is total: unknown type tags become holes, missing numbers
//! take documented defaults and malformed entries never abort the list.
//! Present-but-invalid values (a negative diameter, say) are kept as-is so the
//! engine can report them against the feature id.

use crate::element::{MaterialCategory, StructuralElement};
use crate::face::FaceResolver;
use crate::feature::{
    ContourPoint, ContourType, CoordinateSystem, CopingType, FeatureKind, FeatureParams,
    NormalizedFeature, NotchType,
};
use crate::raw::{Metadata, RawContour, RawContourPoint, RawFeature, RawPoint};
use serde_json::Value;

pub const DEFAULT_HOLE_DIAMETER: f64 = 20.0;
pub const DEFAULT_SLOT_SIZE: (f64, f64) = (50.0, 22.0);
pub const DEFAULT_CUTOUT_SIZE: (f64, f64) = (100.0, 50.0);
pub const DEFAULT_NOTCH_SIZE: (f64, f64) = (50.0, 50.0);
pub const DEFAULT_MARKING_SIZE: (f64, f64) = (50.0, 1.0);
pub const DEFAULT_ENGRAVE_DEPTH: f64 = 0.5;
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_COPING_LENGTH: f64 = 100.0;
pub const DEFAULT_COPING_CLEARANCE: f64 = 2.0;
pub const DEFAULT_COUNTERSINK_ANGLE: f64 = 90.0;
pub const DEFAULT_THREAD_PITCH: f64 = 1.5;

/// ISO metric coarse thread pitches (nominal diameter, pitch)
const ISO_COARSE_PITCH: &[(f64, f64)] = &[
    (3.0, 0.5),
    (4.0, 0.7),
    (5.0, 0.8),
    (6.0, 1.0),
    (8.0, 1.25),
    (10.0, 1.5),
    (12.0, 1.75),
    (14.0, 2.0),
    (16.0, 2.0),
    (20.0, 2.5),
    (24.0, 3.0),
    (27.0, 3.0),
    (30.0, 3.5),
    (36.0, 4.0),
];

/// Classify a raw record. Total: every (tag, flags) pair maps to one kind.
///
/// Hole-like tags honour the `tapped`, `countersink` and `counterbore` flags
/// in that priority order. Unknown tags fall back to [`FeatureKind::Hole`].
pub fn classify(type_tag: &str, metadata: &Metadata) -> FeatureKind {
    match type_tag.trim().to_ascii_lowercase().as_str() {
        "hole" | "bo" | "bolt_hole" => {
            if meta_flag(metadata, &["tapped"]) {
                FeatureKind::TappedHole
            } else if meta_flag(metadata, &["countersink"]) {
                FeatureKind::Countersink
            } else if meta_flag(metadata, &["counterbore"]) {
                FeatureKind::Counterbore
            } else {
                FeatureKind::Hole
            }
        }
        "tapped_hole" => FeatureKind::TappedHole,
        "countersink" => FeatureKind::Countersink,
        "counterbore" => FeatureKind::Counterbore,
        "slot" => FeatureKind::Slot,
        "cutout" => FeatureKind::Cutout,
        "notch" => FeatureKind::Notch,
        "marking" | "ko" => FeatureKind::Marking,
        "text" | "si" => FeatureKind::Text,
        "coping" => FeatureKind::Coping,
        "contour" | "ak" | "ik" => FeatureKind::Contour,
        _ => FeatureKind::Hole,
    }
}

/// Coarse pitch for a nominal metric diameter, if it is a standard size
pub fn iso_coarse_pitch(diameter: f64) -> Option<f64> {
    ISO_COARSE_PITCH
        .iter()
        .find(|(d, _)| (d - diameter).abs() < 1e-6)
        .map(|&(_, pitch)| pitch)
}

/// Converts exchange records into typed features
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureNormalizer {
    face_resolver: FaceResolver,
}

impl FeatureNormalizer {
    pub fn new(face_resolver: FaceResolver) -> Self {
        Self { face_resolver }
    }

    pub fn with_web_tolerance(web_tolerance: f64) -> Self {
        Self::new(FaceResolver::new(web_tolerance))
    }

    #[inline]
    pub fn face_resolver(&self) -> &FaceResolver {
        &self.face_resolver
    }

    /// Normalize every feature record followed by every cutting contour,
    /// preserving input order
    pub fn normalize(&self, element: &StructuralElement) -> Vec<NormalizedFeature> {
        let metadata = &element.metadata;
        let mut features =
            Vec::with_capacity(metadata.cutting_features.len() + metadata.cutting_contours.len());

        for (index, raw) in metadata.cutting_features.iter().enumerate() {
            features.push(self.normalize_feature(raw, index, element.category));
        }
        for (index, raw) in metadata.cutting_contours.iter().enumerate() {
            features.push(self.normalize_contour(raw, index, element.category));
        }

        features
    }

    /// Normalize one feature record found at `index` in the element's list
    pub fn normalize_feature(
        &self,
        raw: &RawFeature,
        index: usize,
        category: MaterialCategory,
    ) -> NormalizedFeature {
        let meta = &raw.metadata;
        let tag = raw.feature_type.trim().to_ascii_lowercase();
        let kind = classify(&tag, meta);
        let position = raw.position.to_array();

        let rotation = raw
            .rotation
            .as_ref()
            .map(|r| r.angle_degrees())
            .or_else(|| meta_f64(meta, &["rotation"]))
            .unwrap_or(0.0);

        let hint = raw.face.as_deref().or_else(|| meta_str(meta, &["face"]));
        let face = self.face_resolver.resolve(position[2], category, hint);

        let id = if tag.is_empty() {
            format!("feature-{}", index)
        } else {
            format!("{}-{}", tag, index)
        };

        NormalizedFeature {
            id,
            kind,
            coordinate_system: coordinate_system(meta),
            position,
            rotation,
            face,
            params: feature_params(kind, &tag, raw),
            metadata: meta.clone(),
        }
    }

    /// Normalize one entry of the element's cutting contour list
    pub fn normalize_contour(
        &self,
        raw: &RawContour,
        index: usize,
        category: MaterialCategory,
    ) -> NormalizedFeature {
        let meta = &raw.metadata;
        let position = meta
            .get("position")
            .and_then(|v| serde_json::from_value::<RawPoint>(v.clone()).ok())
            .map(|p| p.to_array())
            .unwrap_or([0.0; 3]);

        let hint = raw.face.as_deref().or_else(|| meta_str(meta, &["face"]));
        let face = self.face_resolver.resolve(position[2], category, hint);

        let contour_type = raw
            .contour_type
            .as_deref()
            .or_else(|| meta_str(meta, &["contourType"]))
            .map(parse_contour_type)
            .unwrap_or(ContourType::Inner);

        NormalizedFeature {
            id: format!("cutting-contour-{}", index),
            kind: FeatureKind::Contour,
            coordinate_system: coordinate_system(meta),
            position,
            rotation: meta_f64(meta, &["rotation"]).unwrap_or(0.0),
            face,
            params: FeatureParams::Contour {
                points: raw.points.iter().filter_map(contour_point).collect(),
                closed: raw.closed.unwrap_or(true),
                depth: through_or_blind(raw.depth.or_else(|| meta_f64(meta, &["depth"]))),
                contour_type,
            },
            metadata: meta.clone(),
        }
    }
}

/// Normalize an element with the default face tolerance
pub fn normalize(element: &StructuralElement) -> Vec<NormalizedFeature> {
    FeatureNormalizer::default().normalize(element)
}

fn feature_params(kind: FeatureKind, tag: &str, raw: &RawFeature) -> FeatureParams {
    let meta = &raw.metadata;
    let diameter = number(raw.diameter, meta, &["diameter"]).unwrap_or(DEFAULT_HOLE_DIAMETER);
    let depth = through_or_blind(number(raw.depth, meta, &["depth"]));
    let length = number(raw.length, meta, &["length"]);
    let width = number(raw.width, meta, &["width"]);

    match kind {
        FeatureKind::Hole => FeatureParams::Hole {
            diameter,
            depth,
            bolt_hole: tag == "bolt_hole" || meta_flag(meta, &["boltHole", "bolt_hole"]),
        },
        FeatureKind::TappedHole => {
            let thread = nested_str(meta, "tapped", "thread")
                .or_else(|| meta_str(meta, &["thread", "threadType"]))
                .map(str::to_string)
                .unwrap_or_else(|| format!("M{}", diameter));
            let pitch = nested_f64(meta, "tapped", "pitch")
                .or_else(|| meta_f64(meta, &["pitch", "threadPitch"]))
                .or_else(|| iso_coarse_pitch(diameter))
                .unwrap_or(DEFAULT_THREAD_PITCH);
            FeatureParams::TappedHole {
                diameter,
                depth,
                thread,
                pitch,
            }
        }
        FeatureKind::Countersink => {
            let sink_diameter = nested_f64(meta, "countersink", "diameter")
                .or_else(|| meta_f64(meta, &["sinkDiameter", "countersinkDiameter"]))
                .unwrap_or(2.0 * diameter);
            let angle = nested_f64(meta, "countersink", "angle")
                .or_else(|| meta_f64(meta, &["sinkAngle", "countersinkAngle"]))
                .unwrap_or(DEFAULT_COUNTERSINK_ANGLE);
            let sink_depth = nested_f64(meta, "countersink", "depth")
                .or_else(|| meta_f64(meta, &["sinkDepth", "countersinkDepth"]))
                .unwrap_or_else(|| countersink_depth(diameter, sink_diameter, angle));
            FeatureParams::Countersink {
                diameter,
                depth,
                sink_diameter,
                sink_depth,
                angle,
            }
        }
        FeatureKind::Counterbore => FeatureParams::Counterbore {
            diameter,
            depth,
            bore_diameter: nested_f64(meta, "counterbore", "diameter")
                .or_else(|| meta_f64(meta, &["boreDiameter", "counterboreDiameter"]))
                .unwrap_or(1.6 * diameter),
            bore_depth: nested_f64(meta, "counterbore", "depth")
                .or_else(|| meta_f64(meta, &["boreDepth", "counterboreDepth"]))
                .unwrap_or(0.6 * diameter),
        },
        FeatureKind::Slot => FeatureParams::Slot {
            length: length.unwrap_or(DEFAULT_SLOT_SIZE.0),
            width: width.unwrap_or(DEFAULT_SLOT_SIZE.1),
            depth,
        },
        FeatureKind::Cutout => FeatureParams::Cutout {
            length: length.unwrap_or(DEFAULT_CUTOUT_SIZE.0),
            width: width.unwrap_or(DEFAULT_CUTOUT_SIZE.1),
            depth,
        },
        FeatureKind::Notch => FeatureParams::Notch {
            length: length.unwrap_or(DEFAULT_NOTCH_SIZE.0),
            width: width.unwrap_or(DEFAULT_NOTCH_SIZE.1),
            depth,
            notch_type: meta_str(meta, &["notchType"])
                .map(parse_notch_type)
                .unwrap_or(NotchType::Rectangular),
        },
        FeatureKind::Marking => FeatureParams::Marking {
            length: length.unwrap_or(DEFAULT_MARKING_SIZE.0),
            width: width.unwrap_or(DEFAULT_MARKING_SIZE.1),
            depth: depth.unwrap_or(DEFAULT_ENGRAVE_DEPTH),
        },
        FeatureKind::Text => FeatureParams::Text {
            text: meta_str(meta, &["text", "content"]).unwrap_or_default().to_string(),
            font_size: meta_f64(meta, &["fontSize", "size", "height"]).unwrap_or(DEFAULT_FONT_SIZE),
            depth: depth.unwrap_or(DEFAULT_ENGRAVE_DEPTH),
        },
        FeatureKind::Coping => FeatureParams::Coping {
            coping_type: meta_str(meta, &["copingType"])
                .map(parse_coping_type)
                .unwrap_or(CopingType::Cut),
            target_profile: meta_str(meta, &["targetProfile"])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            angle: meta_f64(meta, &["angle", "copingAngle"]).unwrap_or(0.0),
            clearance: meta_f64(meta, &["clearance"]).unwrap_or(DEFAULT_COPING_CLEARANCE),
            length: length.unwrap_or(DEFAULT_COPING_LENGTH),
            depth,
        },
        FeatureKind::Contour => {
            let points = meta
                .get("points")
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|v| serde_json::from_value::<RawContourPoint>(v.clone()).ok())
                        .filter_map(|p| contour_point(&p))
                        .collect()
                })
                .unwrap_or_default();
            let contour_type = match tag {
                "ak" => ContourType::Outer,
                "ik" => ContourType::Inner,
                _ => meta_str(meta, &["contourType"])
                    .map(parse_contour_type)
                    .unwrap_or(ContourType::Inner),
            };
            FeatureParams::Contour {
                points,
                closed: meta.get("closed").and_then(Value::as_bool).unwrap_or(true),
                depth,
                contour_type,
            }
        }
    }
}

/// Depth of a countersink cone from its two diameters and included angle
fn countersink_depth(diameter: f64, sink_diameter: f64, angle: f64) -> f64 {
    let half = (angle.to_radians() / 2.0).tan();
    if half <= f64::EPSILON {
        return 0.0;
    }
    ((sink_diameter - diameter) / 2.0 / half).max(0.0)
}

/// Depths of zero or below mean through (DSTV convention)
#[inline]
fn through_or_blind(depth: Option<f64>) -> Option<f64> {
    depth.filter(|d| *d > 0.0)
}

fn contour_point(raw: &RawContourPoint) -> Option<ContourPoint> {
    raw.to_tuple()
        .map(|(x, y, bulge)| ContourPoint::with_bulge(x, y, bulge))
}

fn coordinate_system(meta: &Metadata) -> CoordinateSystem {
    match meta_str(meta, &["coordinateSystem"]).map(compact_key).as_deref() {
        Some("dstv" | "memberstart" | "start") => CoordinateSystem::MemberStart,
        _ => CoordinateSystem::Local,
    }
}

fn parse_notch_type(value: &str) -> NotchType {
    match compact_key(value).as_str() {
        "radius" | "circular" | "round" => NotchType::Radius,
        "v" | "triangular" | "vnotch" => NotchType::Triangular,
        _ => NotchType::Rectangular,
    }
}

fn parse_coping_type(value: &str) -> CopingType {
    match compact_key(value).as_str() {
        "fit" | "weldfit" | "additive" | "union" => CopingType::Fit,
        _ => CopingType::Cut,
    }
}

fn parse_contour_type(value: &str) -> ContourType {
    match compact_key(value).as_str() {
        "outer" | "ak" => ContourType::Outer,
        _ => ContourType::Inner,
    }
}

/// Lower-case and drop separators
fn compact_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Record field first, then the metadata bag
#[inline]
fn number(field: Option<f64>, meta: &Metadata, keys: &[&str]) -> Option<f64> {
    field.filter(|v| v.is_finite()).or_else(|| meta_f64(meta, keys))
}

fn value_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn meta_f64(meta: &Metadata, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| meta.get(*key).and_then(value_f64))
}

fn meta_str<'a>(meta: &'a Metadata, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| meta.get(*key).and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
}

fn nested_f64(meta: &Metadata, flag: &str, key: &str) -> Option<f64> {
    meta.get(flag)
        .and_then(Value::as_object)
        .and_then(|obj| obj.get(key))
        .and_then(value_f64)
}

fn nested_str<'a>(meta: &'a Metadata, flag: &str, key: &str) -> Option<&'a str> {
    meta.get(flag)
        .and_then(Value::as_object)
        .and_then(|obj| obj.get(key))
        .and_then(Value::as_str)
}

/// Truthiness of a metadata flag: true, non-zero numbers, strings other than
/// "", "false" and "0", objects and arrays
fn meta_flag(meta: &Metadata, keys: &[&str]) -> bool {
    keys.iter().any(|key| match meta.get(*key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |v| v != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            !s.is_empty() && !s.eq_ignore_ascii_case("false") && s != "0"
        }
        Some(Value::Object(_)) | Some(Value::Array(_)) => true,
        Some(Value::Null) | None => false,
    })
}
