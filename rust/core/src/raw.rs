// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exchange-format feature records
//!
//! These mirror what the import layer produces from DSTV blocks: a type tag,
//! a position triplet, a few optional numbers and a free-form metadata bag.
//! Every field is optional and every shape variation we have seen in the
//! wild is accepted, so decoding a record never fails because of one odd
//! field. Interpretation happens in [`crate::normalize`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely-typed metadata bag
pub type Metadata = Map<String, Value>;

/// A 3D point as found in exchange data: `[x, y, z]`, `[x, y]` or `{x, y, z}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPoint {
    List(Vec<f64>),
    Object {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        z: f64,
    },
    Other(Value),
}

impl RawPoint {
    /// Convert to a triplet, padding missing components with zero
    pub fn to_array(&self) -> [f64; 3] {
        match self {
            Self::List(values) => {
                let get = |i: usize| {
                    values
                        .get(i)
                        .copied()
                        .filter(|v| v.is_finite())
                        .unwrap_or(0.0)
                };
                [get(0), get(1), get(2)]
            }
            Self::Object { x, y, z } => [finite_or_zero(*x), finite_or_zero(*y), finite_or_zero(*z)],
            Self::Other(_) => [0.0; 3],
        }
    }
}

impl Default for RawPoint {
    fn default() -> Self {
        Self::List(vec![0.0, 0.0, 0.0])
    }
}

impl From<[f64; 3]> for RawPoint {
    fn from(value: [f64; 3]) -> Self {
        Self::List(value.to_vec())
    }
}

/// Rotation as found in exchange data: a single angle in degrees about the
/// face normal, or an Euler triplet whose last component is that angle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRotation {
    Angle(f64),
    List(Vec<f64>),
    Other(Value),
}

impl RawRotation {
    /// Rotation about the face normal in degrees
    pub fn angle_degrees(&self) -> f64 {
        let angle = match self {
            Self::Angle(a) => *a,
            Self::List(values) => values.last().copied().unwrap_or(0.0),
            Self::Other(_) => 0.0,
        };
        finite_or_zero(angle)
    }
}

/// One raw machining feature record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFeature {
    /// Type tag ("hole", "slot", "cutout", ... or a DSTV block name)
    #[serde(rename = "type", alias = "featureType")]
    pub feature_type: String,
    pub position: RawPoint,
    pub rotation: Option<RawRotation>,
    pub diameter: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    /// Declared face hint, also accepted inside `metadata.face`
    pub face: Option<String>,
    pub metadata: Metadata,
}

impl RawFeature {
    /// Create a record with a type tag and position
    pub fn new(feature_type: impl Into<String>, position: [f64; 3]) -> Self {
        Self {
            feature_type: feature_type.into(),
            position: position.into(),
            ..Default::default()
        }
    }

    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = Some(diameter);
        self
    }

    pub fn with_size(mut self, length: f64, width: f64) -> Self {
        self.length = Some(length);
        self.width = Some(width);
        self
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_face(mut self, face: impl Into<String>) -> Self {
        self.face = Some(face.into());
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(RawRotation::Angle(degrees));
        self
    }

    /// Insert a metadata entry
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Contour vertex: `[x, y]`, `[x, y, bulge]` or `{x, y, bulge}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawContourPoint {
    List(Vec<f64>),
    Object {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        bulge: f64,
    },
    Other(Value),
}

impl RawContourPoint {
    /// Returns (x, y, bulge), or None for unusable entries
    pub fn to_tuple(&self) -> Option<(f64, f64, f64)> {
        match self {
            Self::List(values) if values.len() >= 2 => {
                let (x, y) = (values[0], values[1]);
                if !x.is_finite() || !y.is_finite() {
                    return None;
                }
                Some((x, y, finite_or_zero(values.get(2).copied().unwrap_or(0.0))))
            }
            Self::Object { x, y, bulge } if x.is_finite() && y.is_finite() => {
                Some((*x, *y, finite_or_zero(*bulge)))
            }
            _ => None,
        }
    }
}

/// Raw cutting contour (outer AK or inner IK outline)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawContour {
    pub points: Vec<RawContourPoint>,
    pub closed: Option<bool>,
    pub face: Option<String>,
    pub depth: Option<f64>,
    /// "inner"/"ik" or "outer"/"ak"
    #[serde(rename = "type", alias = "contourType")]
    pub contour_type: Option<String>,
    pub metadata: Metadata,
}

impl RawContour {
    /// Closed inner contour from plain (x, y) points
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            points: points
                .iter()
                .map(|&(x, y)| RawContourPoint::List(vec![x, y]))
                .collect(),
            closed: Some(true),
            ..Default::default()
        }
    }
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_shapes() {
        let list: RawPoint = serde_json::from_str("[1.0, 2.0, 3.0]").unwrap();
        assert_eq!(list.to_array(), [1.0, 2.0, 3.0]);

        let short: RawPoint = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(short.to_array(), [1.0, 2.0, 0.0]);

        let object: RawPoint = serde_json::from_str(r#"{"x": 5, "z": -2}"#).unwrap();
        assert_eq!(object.to_array(), [5.0, 0.0, -2.0]);

        let junk: RawPoint = serde_json::from_str(r#""nowhere""#).unwrap();
        assert_eq!(junk.to_array(), [0.0; 3]);
    }

    #[test]
    fn test_rotation_shapes() {
        let angle: RawRotation = serde_json::from_str("45").unwrap();
        assert_eq!(angle.angle_degrees(), 45.0);

        let euler: RawRotation = serde_json::from_str("[0, 0, 30]").unwrap();
        assert_eq!(euler.angle_degrees(), 30.0);

        let other: RawRotation = serde_json::from_str(r#"{"deg": 10}"#).unwrap();
        assert_eq!(other.angle_degrees(), 0.0);
    }

    #[test]
    fn test_feature_record_tolerates_partial_data() {
        let json = r#"{
            "type": "hole",
            "position": {"x": 100, "y": 20},
            "diameter": 22,
            "metadata": {"tapped": true, "pitch": "2.5"}
        }"#;
        let feature: RawFeature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.feature_type, "hole");
        assert_eq!(feature.position.to_array(), [100.0, 20.0, 0.0]);
        assert_eq!(feature.diameter, Some(22.0));
        assert!(feature.rotation.is_none());
        assert_eq!(feature.metadata.len(), 2);

        let empty: RawFeature = serde_json::from_str("{}").unwrap();
        assert!(empty.feature_type.is_empty());
    }

    #[test]
    fn test_contour_points() {
        let json = r#"{"points": [[0, 0], [100, 0, 0.5], {"x": 100, "y": 50}, "bad"], "type": "ak"}"#;
        let contour: RawContour = serde_json::from_str(json).unwrap();
        let tuples: Vec<_> = contour.points.iter().filter_map(|p| p.to_tuple()).collect();
        assert_eq!(tuples, vec![(0.0, 0.0, 0.0), (100.0, 0.0, 0.5), (100.0, 50.0, 0.0)]);
        assert_eq!(contour.contour_type.as_deref(), Some("ak"));
    }
}
