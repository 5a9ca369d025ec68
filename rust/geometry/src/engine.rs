// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature application engine
//!
//! Applies normalized features to a base solid in one of three modes.
//! Overlay leaves the base alone and returns one coloured tool mesh per
//! feature; Machining chains CSG booleans in feature order; Advanced machines
//! like Machining and lets the pipeline add caching and LOD on top.
//!
//! A feature that cannot be built or whose boolean degenerates is skipped
//! with a [`FeatureWarning`]; the rest of the list still applies.

use crate::base::BaseSection;
use crate::csg::BooleanProcessor;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::tools::{build_tools, ToolSolid};
use nc_lite_core::{FeatureKind, NormalizedFeature};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendering mode requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Overlay,
    #[default]
    Machining,
    Advanced,
}

impl RenderMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overlay" => Some(Self::Overlay),
            "machining" | "csg" => Some(Self::Machining),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overlay => "overlay",
            Self::Machining => "machining",
            Self::Advanced => "advanced",
        }
    }

    /// Modes whose output mesh is the machined solid
    #[inline]
    pub fn machines(&self) -> bool {
        !matches!(self, Self::Overlay)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RGBA overlay colour for a feature kind
pub fn overlay_color(kind: FeatureKind) -> [f32; 4] {
    match kind {
        FeatureKind::Hole => [0.20, 0.45, 0.90, 0.85],
        FeatureKind::TappedHole => [0.10, 0.70, 0.70, 0.85],
        FeatureKind::Countersink => [0.45, 0.35, 0.90, 0.85],
        FeatureKind::Counterbore => [0.60, 0.30, 0.85, 0.85],
        FeatureKind::Slot => [0.95, 0.60, 0.10, 0.85],
        FeatureKind::Cutout => [0.90, 0.25, 0.20, 0.85],
        FeatureKind::Notch => [0.85, 0.40, 0.15, 0.85],
        FeatureKind::Marking => [0.95, 0.90, 0.20, 0.90],
        FeatureKind::Text => [0.95, 0.95, 0.95, 0.90],
        FeatureKind::Coping => [0.30, 0.75, 0.30, 0.85],
        FeatureKind::Contour => [0.80, 0.20, 0.60, 0.85],
    }
}

/// Visual stand-in for one feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureOverlay {
    pub feature_id: String,
    pub kind: FeatureKind,
    pub color: [f32; 4],
    pub mesh: Mesh,
}

/// A feature that was skipped and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureWarning {
    pub feature_id: String,
    pub message: String,
}

impl fmt::Display for FeatureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.feature_id, self.message)
    }
}

/// Output of [`FeatureEngine::apply`]
#[derive(Debug, Clone)]
pub struct ApplyResult {
    pub mesh: Mesh,
    pub overlays: Vec<FeatureOverlay>,
    /// False only when every feature of a non-empty list was skipped
    pub success: bool,
    pub warnings: Vec<FeatureWarning>,
    /// Features that made it into the output
    pub applied: usize,
}

/// Applies feature lists to base solids
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngine {
    booleans: BooleanProcessor,
}

impl FeatureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `features` to `base` in the given mode.
    ///
    /// Only an empty base is an error; everything else degrades to warnings.
    pub fn apply(
        &self,
        base: Mesh,
        features: &[NormalizedFeature],
        section: &BaseSection,
        mode: RenderMode,
    ) -> Result<ApplyResult> {
        if base.is_empty() {
            return Err(Error::EmptyMesh(format!(
                "{} base solid has no geometry",
                section.category
            )));
        }

        if features.is_empty() {
            return Ok(ApplyResult {
                mesh: base,
                overlays: Vec::new(),
                success: true,
                warnings: Vec::new(),
                applied: 0,
            });
        }

        let result = match mode {
            RenderMode::Overlay => self.overlay(base, features, section),
            RenderMode::Machining | RenderMode::Advanced => self.machine(base, features, section),
        };

        tracing::debug!(
            mode = %mode,
            features = features.len(),
            applied = result.applied,
            warnings = result.warnings.len(),
            "Applied features"
        );

        Ok(result)
    }

    fn overlay(
        &self,
        base: Mesh,
        features: &[NormalizedFeature],
        section: &BaseSection,
    ) -> ApplyResult {
        let mut overlays = Vec::with_capacity(features.len());
        let mut warnings = Vec::new();

        for feature in features {
            match build_tools(feature, section) {
                Ok(tools) => {
                    let mut mesh = Mesh::new();
                    for tool in &tools {
                        mesh.merge(&tool.mesh);
                    }
                    overlays.push(FeatureOverlay {
                        feature_id: feature.id.clone(),
                        kind: feature.kind,
                        color: overlay_color(feature.kind),
                        mesh,
                    });
                }
                Err(e) => warnings.push(skip(feature, &e)),
            }
        }

        let applied = overlays.len();
        ApplyResult {
            mesh: base,
            overlays,
            success: applied > 0,
            warnings,
            applied,
        }
    }

    fn machine(
        &self,
        base: Mesh,
        features: &[NormalizedFeature],
        section: &BaseSection,
    ) -> ApplyResult {
        let mut current = base;
        let mut warnings = Vec::new();
        let mut applied = 0;

        for feature in features {
            let outcome = build_tools(feature, section)
                .and_then(|tools| self.apply_tools(&current, &tools));
            match outcome {
                Ok(mesh) => {
                    current = mesh;
                    applied += 1;
                }
                Err(e) => warnings.push(skip(feature, &e)),
            }
        }

        ApplyResult {
            mesh: current,
            overlays: Vec::new(),
            success: applied > 0,
            warnings,
            applied,
        }
    }

    /// All tools of one feature, or nothing
    fn apply_tools(&self, host: &Mesh, tools: &[ToolSolid]) -> Result<Mesh> {
        let mut iter = tools.iter();
        let first = iter
            .next()
            .ok_or_else(|| Error::InvalidFeature("feature produced no tool".to_string()))?;
        let mut result = self.booleans.apply(first.op, host, &first.mesh)?;
        for tool in iter {
            result = self.booleans.apply(tool.op, &result, &tool.mesh)?;
        }
        Ok(result)
    }
}

fn skip(feature: &NormalizedFeature, error: &Error) -> FeatureWarning {
    tracing::warn!(
        feature_id = %feature.id,
        kind = %feature.kind,
        error = %error,
        "Skipping feature"
    );
    FeatureWarning {
        feature_id: feature.id.clone(),
        message: error.to_string(),
    }
}
