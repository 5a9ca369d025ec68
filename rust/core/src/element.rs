// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural element records
//!
//! One element is one physical piece (beam, plate, tube, bolt, weld...).
//! Records are produced by the host's import/authoring layer and treated as
//! read-only snapshots for the duration of a build.

use crate::error::{Error, Result};
use crate::raw::{Metadata, RawContour, RawFeature, RawPoint};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Material / profile category of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaterialCategory {
    Beam,
    Plate,
    Sheet,
    Tube,
    Channel,
    Tee,
    Bar,
    Angle,
    Bolt,
    Nut,
    Washer,
    Weld,
}

impl MaterialCategory {
    pub const ALL: [MaterialCategory; 12] = [
        Self::Beam,
        Self::Plate,
        Self::Sheet,
        Self::Tube,
        Self::Channel,
        Self::Tee,
        Self::Bar,
        Self::Angle,
        Self::Bolt,
        Self::Nut,
        Self::Washer,
        Self::Weld,
    ];

    /// Parse a category name (case-insensitive). Unknown names map to `Bar`,
    /// which renders as a plain block.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "BEAM" => Self::Beam,
            "PLATE" => Self::Plate,
            "SHEET" => Self::Sheet,
            "TUBE" | "PIPE" => Self::Tube,
            "CHANNEL" => Self::Channel,
            "TEE" => Self::Tee,
            "BAR" => Self::Bar,
            "ANGLE" => Self::Angle,
            "BOLT" => Self::Bolt,
            "NUT" => Self::Nut,
            "WASHER" => Self::Washer,
            "WELD" => Self::Weld,
            _ => Self::Bar,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beam => "BEAM",
            Self::Plate => "PLATE",
            Self::Sheet => "SHEET",
            Self::Tube => "TUBE",
            Self::Channel => "CHANNEL",
            Self::Tee => "TEE",
            Self::Bar => "BAR",
            Self::Angle => "ANGLE",
            Self::Bolt => "BOLT",
            Self::Nut => "NUT",
            Self::Washer => "WASHER",
            Self::Weld => "WELD",
        }
    }

    /// Flat stock whose faces are simply top and bottom
    #[inline]
    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Plate | Self::Sheet)
    }
}

impl From<String> for MaterialCategory {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<MaterialCategory> for String {
    fn from(value: MaterialCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nominal dimensions; which ones matter depends on the category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub thickness: Option<f64>,
    pub diameter: Option<f64>,
}

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, value: f64) -> Self {
        self.length = Some(value);
        self
    }

    pub fn with_height(mut self, value: f64) -> Self {
        self.height = Some(value);
        self
    }

    pub fn with_width(mut self, value: f64) -> Self {
        self.width = Some(value);
        self
    }

    pub fn with_thickness(mut self, value: f64) -> Self {
        self.thickness = Some(value);
        self
    }

    pub fn with_diameter(mut self, value: f64) -> Self {
        self.diameter = Some(value);
        self
    }
}

/// Element metadata: profile designation, thickness overrides and the two
/// unstructured feature lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementMetadata {
    /// Profile designation such as "IPE300" or "RHS200x100x8"
    #[serde(alias = "profile", alias = "profileType")]
    pub profile_name: Option<String>,
    pub flange_thickness: Option<f64>,
    pub web_thickness: Option<f64>,
    /// Section height when `dimensions` leaves it out
    pub height: Option<f64>,
    /// Section width when `dimensions` leaves it out
    pub width: Option<f64>,
    pub cutting_features: Vec<RawFeature>,
    pub cutting_contours: Vec<RawContour>,
    /// Anything else the importer attached
    #[serde(flatten)]
    pub extra: Metadata,
}

/// A sub-part attached to an element (typically a weld)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assembly {
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    pub position: RawPoint,
    pub metadata: AssemblyMetadata,
}

impl Assembly {
    #[inline]
    pub fn is_weld(&self) -> bool {
        self.kind.trim().eq_ignore_ascii_case("weld")
    }
}

/// Weld parameters of an assembly. Importers disagree on the name of the
/// fillet leg, so all three spellings are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssemblyMetadata {
    pub size: Option<f64>,
    pub leg_length: Option<f64>,
    pub throat: Option<f64>,
    /// Bead length along the member
    pub length: Option<f64>,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl AssemblyMetadata {
    /// Fillet leg: the first positive of `size`, `legLength`, `throat`
    pub fn weld_size(&self) -> Option<f64> {
        [self.size, self.leg_length, self.throat]
            .into_iter()
            .flatten()
            .find(|v| v.is_finite() && *v > 0.0)
    }

    pub fn weld_length(&self) -> Option<f64> {
        self.length.filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// One physical piece of the structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralElement {
    pub id: String,
    #[serde(alias = "type", alias = "materialType")]
    pub category: MaterialCategory,
    pub dimensions: Dimensions,
    pub position: [f64; 3],
    /// Euler XYZ rotation in radians
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
    pub metadata: ElementMetadata,
    pub assemblies: Vec<Assembly>,
}

impl Default for StructuralElement {
    fn default() -> Self {
        Self {
            id: String::new(),
            category: MaterialCategory::Bar,
            dimensions: Dimensions::default(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            metadata: ElementMetadata::default(),
            assemblies: Vec::new(),
        }
    }
}

impl StructuralElement {
    /// Create an element with no dimensions or features
    pub fn new(id: impl Into<String>, category: MaterialCategory) -> Self {
        Self {
            id: id.into(),
            category,
            ..Default::default()
        }
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_profile(mut self, designation: impl Into<String>) -> Self {
        self.metadata.profile_name = Some(designation.into());
        self
    }

    pub fn with_feature(mut self, feature: RawFeature) -> Self {
        self.metadata.cutting_features.push(feature);
        self
    }

    pub fn with_contour(mut self, contour: RawContour) -> Self {
        self.metadata.cutting_contours.push(contour);
        self
    }

    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    /// Profile designation, if any non-blank one was supplied
    pub fn profile_designation(&self) -> Option<&str> {
        self.metadata
            .profile_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Decode one element from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let element: Self = serde_json::from_str(json)?;
        if element.id.trim().is_empty() {
            return Err(Error::InvalidElement("element id is empty".to_string()));
        }
        Ok(element)
    }

    /// Decode a list of elements, skipping records without an id
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        let elements: Vec<Self> = serde_json::from_str(json)?;
        Ok(elements
            .into_iter()
            .filter(|e| !e.id.trim().is_empty())
            .collect())
    }
}
