// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized, strongly-typed machining features
//!
//! Everything downstream of the normalizer works on these types; string keyed
//! metadata lookups stop at [`crate::normalize`].

use crate::raw::Metadata;
use serde::Serialize;
use std::fmt::{self, Write};

/// Closed set of feature kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureKind {
    Hole,
    TappedHole,
    Countersink,
    Counterbore,
    Slot,
    Cutout,
    Notch,
    Marking,
    Text,
    Coping,
    Contour,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hole => "HOLE",
            Self::TappedHole => "TAPPED_HOLE",
            Self::Countersink => "COUNTERSINK",
            Self::Counterbore => "COUNTERBORE",
            Self::Slot => "SLOT",
            Self::Cutout => "CUTOUT",
            Self::Notch => "NOTCH",
            Self::Marking => "MARKING",
            Self::Text => "TEXT",
            Self::Coping => "COPING",
            Self::Contour => "CONTOUR",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical face of a profile a feature sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Face {
    Web,
    TopFlange,
    BottomFlange,
    Top,
    Bottom,
    Left,
    Right,
    LeftLeg,
    RightLeg,
}

impl Face {
    /// Face used when nothing better can be determined
    pub const GENERIC: Face = Face::Top;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "WEB",
            Self::TopFlange => "TOP_FLANGE",
            Self::BottomFlange => "BOTTOM_FLANGE",
            Self::Top => "TOP",
            Self::Bottom => "BOTTOM",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::LeftLeg => "LEFT_LEG",
            Self::RightLeg => "RIGHT_LEG",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frame in which a feature position is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CoordinateSystem {
    /// Centred on the element's local origin (same frame as the base solid)
    #[default]
    Local,
    /// DSTV convention: x measured from the member start
    MemberStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotchType {
    Rectangular,
    Radius,
    Triangular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CopingType {
    /// Material removed to clear the target profile
    Cut,
    /// Fit piece added to the member
    Fit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContourType {
    /// Material inside the outline is removed
    Inner,
    /// Material outside the outline is removed
    Outer,
}

/// Contour vertex in face-plane coordinates; `bulge` describes the arc to the
/// next vertex (tan of a quarter of the included angle, 0 = straight)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl ContourPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    pub fn with_bulge(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }
}

/// Kind-specific parameters. `depth: None` means through.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FeatureParams {
    Hole {
        diameter: f64,
        depth: Option<f64>,
        bolt_hole: bool,
    },
    TappedHole {
        diameter: f64,
        depth: Option<f64>,
        thread: String,
        pitch: f64,
    },
    Countersink {
        diameter: f64,
        depth: Option<f64>,
        sink_diameter: f64,
        sink_depth: f64,
        angle: f64,
    },
    Counterbore {
        diameter: f64,
        depth: Option<f64>,
        bore_diameter: f64,
        bore_depth: f64,
    },
    Slot {
        length: f64,
        width: f64,
        depth: Option<f64>,
    },
    Cutout {
        length: f64,
        width: f64,
        depth: Option<f64>,
    },
    Notch {
        length: f64,
        width: f64,
        depth: Option<f64>,
        notch_type: NotchType,
    },
    Marking {
        length: f64,
        width: f64,
        depth: f64,
    },
    Text {
        text: String,
        font_size: f64,
        depth: f64,
    },
    Coping {
        coping_type: CopingType,
        target_profile: Option<String>,
        angle: f64,
        clearance: f64,
        length: f64,
        depth: Option<f64>,
    },
    Contour {
        points: Vec<ContourPoint>,
        closed: bool,
        depth: Option<f64>,
        contour_type: ContourType,
    },
}

impl FeatureParams {
    /// Kind these parameters belong to
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Hole { .. } => FeatureKind::Hole,
            Self::TappedHole { .. } => FeatureKind::TappedHole,
            Self::Countersink { .. } => FeatureKind::Countersink,
            Self::Counterbore { .. } => FeatureKind::Counterbore,
            Self::Slot { .. } => FeatureKind::Slot,
            Self::Cutout { .. } => FeatureKind::Cutout,
            Self::Notch { .. } => FeatureKind::Notch,
            Self::Marking { .. } => FeatureKind::Marking,
            Self::Text { .. } => FeatureKind::Text,
            Self::Coping { .. } => FeatureKind::Coping,
            Self::Contour { .. } => FeatureKind::Contour,
        }
    }

    fn write_signature(&self, out: &mut String) {
        // Writing to a String cannot fail
        let _ = match self {
            Self::Hole { diameter, depth, bolt_hole } => {
                write!(out, "d{:.3}:{}:{}", diameter, fmt_depth(*depth), bolt_hole)
            }
            Self::TappedHole { diameter, depth, thread, pitch } => write!(
                out,
                "d{:.3}:{}:{}:p{:.3}",
                diameter,
                fmt_depth(*depth),
                thread,
                pitch
            ),
            Self::Countersink { diameter, depth, sink_diameter, sink_depth, angle } => write!(
                out,
                "d{:.3}:{}:s{:.3}:{:.3}:a{:.3}",
                diameter,
                fmt_depth(*depth),
                sink_diameter,
                sink_depth,
                angle
            ),
            Self::Counterbore { diameter, depth, bore_diameter, bore_depth } => write!(
                out,
                "d{:.3}:{}:b{:.3}:{:.3}",
                diameter,
                fmt_depth(*depth),
                bore_diameter,
                bore_depth
            ),
            Self::Slot { length, width, depth } | Self::Cutout { length, width, depth } => {
                write!(out, "{:.3}x{:.3}:{}", length, width, fmt_depth(*depth))
            }
            Self::Notch { length, width, depth, notch_type } => write!(
                out,
                "{:.3}x{:.3}:{}:{:?}",
                length,
                width,
                fmt_depth(*depth),
                notch_type
            ),
            Self::Marking { length, width, depth } => {
                write!(out, "{:.3}x{:.3}:{:.3}", length, width, depth)
            }
            Self::Text { text, font_size, depth } => {
                write!(out, "{:?}:{:.3}:{:.3}", text, font_size, depth)
            }
            Self::Coping { coping_type, target_profile, angle, clearance, length, depth } => {
                write!(
                    out,
                    "{:?}:{}:a{:.3}:c{:.3}:l{:.3}:{}",
                    coping_type,
                    target_profile.as_deref().unwrap_or("-"),
                    angle,
                    clearance,
                    length,
                    fmt_depth(*depth)
                )
            }
            Self::Contour { points, closed, depth, contour_type } => {
                let _ = write!(out, "{:?}:{}:{}:", contour_type, closed, fmt_depth(*depth));
                for p in points {
                    let _ = write!(out, "({:.3},{:.3},{:.4})", p.x, p.y, p.bulge);
                }
                Ok(())
            }
        };
    }
}

fn fmt_depth(depth: Option<f64>) -> String {
    match depth {
        Some(d) => format!("{:.3}", d),
        None => "thru".to_string(),
    }
}

/// A face-qualified, strongly-typed feature
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFeature {
    /// Derived from type tag and index; stable across re-normalization
    pub id: String,
    pub kind: FeatureKind,
    pub coordinate_system: CoordinateSystem,
    pub position: [f64; 3],
    /// Degrees about the face normal
    pub rotation: f64,
    pub face: Face,
    pub params: FeatureParams,
    /// Original metadata bag, kept for renderers that want extra hints
    pub metadata: Metadata,
}

impl NormalizedFeature {
    /// Geometric signature: everything that influences the machined shape,
    /// excluding the id and metadata
    pub fn signature(&self) -> String {
        let mut out = String::with_capacity(64);
        let _ = write!(
            out,
            "{}@{}:{:?}:{:.3},{:.3},{:.3}:r{:.3}:",
            self.kind.as_str(),
            self.face.as_str(),
            self.coordinate_system,
            self.position[0],
            self.position[1],
            self.position[2],
            self.rotation
        );
        self.params.write_signature(&mut out);
        out
    }
}

/// Signature of a whole ordered feature list: the feature count followed by
/// every per-feature signature, `;`-separated. Order matters because boolean
/// results chain. Two lists share a signature only if they are geometrically
/// identical.
pub fn feature_set_signature(features: &[NormalizedFeature]) -> String {
    let mut out = format!("n{}", features.len());
    for feature in features {
        out.push(';');
        out.push_str(&feature.signature());
    }
    out
}
