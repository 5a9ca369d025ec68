// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Machining pipeline
//!
//! Composition root: owns the normalizer, engine, LOD selector and geometry
//! cache, and turns one [`StructuralElement`] into render-ready meshes.
//!
//! ```rust,ignore
//! let mut pipeline = MachiningPipeline::new(PipelineConfig::from_env());
//! let result = pipeline.build_mesh(&element, RenderMode::Machining)?;
//! let world = result.into_world(&element);
//! ```

use crate::base::{member_frame, resolve_section};
use crate::cache::{CacheKey, CacheStatistics, CachedGeometry, GeometryCache};
use crate::config::PipelineConfig;
use crate::engine::{FeatureEngine, FeatureOverlay, FeatureWarning, RenderMode};
use crate::error::Result;
use crate::extrusion::extrude_profile;
use crate::lod::{LodLevel, LodSelector};
use crate::mesh::Mesh;
use crate::profile::ProfileType;
use crate::transform::place_mesh;
use nalgebra::{Matrix4, Point2, Vector3};
use nc_lite_core::{Assembly, FeatureNormalizer, StructuralElement};

/// Default fillet-weld leg length
pub const DEFAULT_WELD_SIZE: f64 = 6.0;
/// Default weld bead length
pub const DEFAULT_WELD_LENGTH: f64 = 100.0;

/// Mesh of an attached sub-part, built next to the element mesh
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyMesh {
    pub assembly_id: String,
    pub kind: String,
    pub mesh: Mesh,
}

/// Everything produced for one element
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub mesh: Mesh,
    pub overlays: Vec<FeatureOverlay>,
    pub assemblies: Vec<AssemblyMesh>,
    pub success: bool,
    pub warnings: Vec<FeatureWarning>,
    pub from_cache: bool,
    pub lod_level: LodLevel,
}

impl BuildResult {
    /// Move every mesh from the element's local frame into world space
    pub fn into_world(mut self, element: &StructuralElement) -> Self {
        place_mesh(&mut self.mesh, element);
        for overlay in &mut self.overlays {
            place_mesh(&mut overlay.mesh, element);
        }
        for assembly in &mut self.assemblies {
            place_mesh(&mut assembly.mesh, element);
        }
        self
    }
}

/// Highlight state of one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    None,
    Hovered,
    Selected,
}

impl Highlight {
    /// RGBA tint, if any
    pub fn color(&self) -> Option<[f32; 4]> {
        match self {
            Self::None => None,
            Self::Hovered => Some([0.55, 0.75, 1.0, 1.0]),
            Self::Selected => Some([1.0, 0.55, 0.0, 1.0]),
        }
    }
}

/// Current selection and hover, owned by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: Option<String>,
    pub hovered: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, element_id: Option<&str>) {
        self.selected = element_id.map(str::to_string);
    }

    pub fn hover(&mut self, element_id: Option<&str>) {
        self.hovered = element_id.map(str::to_string);
    }

    /// Selection wins over hover
    pub fn highlight_for(&self, element_id: &str) -> Highlight {
        if self.selected.as_deref() == Some(element_id) {
            Highlight::Selected
        } else if self.hovered.as_deref() == Some(element_id) {
            Highlight::Hovered
        } else {
            Highlight::None
        }
    }
}

/// Builds machined meshes for structural elements
#[derive(Debug)]
pub struct MachiningPipeline {
    config: PipelineConfig,
    normalizer: FeatureNormalizer,
    engine: FeatureEngine,
    lod: LodSelector,
    cache: GeometryCache,
}

impl MachiningPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            normalizer: FeatureNormalizer::with_web_tolerance(config.web_tolerance),
            engine: FeatureEngine::new(),
            lod: LodSelector::new(config.lod),
            cache: GeometryCache::new(config.cache),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build at full detail
    pub fn build_mesh(
        &mut self,
        element: &StructuralElement,
        mode: RenderMode,
    ) -> Result<BuildResult> {
        self.build_mesh_at_distance(element, mode, 0.0)
    }

    /// Build for a camera at `camera_distance`.
    ///
    /// Only Advanced mode uses the cache and LOD. The full-detail outcome is
    /// cached together with its warnings, so a hit reports the same success
    /// and warnings as the build that filled it. Decimated subsets are
    /// recomputed from the full list each call and never cached.
    pub fn build_mesh_at_distance(
        &mut self,
        element: &StructuralElement,
        mode: RenderMode,
        camera_distance: f64,
    ) -> Result<BuildResult> {
        let features = self.normalizer.normalize(element);
        let advanced = mode == RenderMode::Advanced;
        let lod_level = if advanced {
            self.lod.level(camera_distance)
        } else {
            LodLevel::Full
        };
        let assemblies = assembly_meshes(&element.assemblies);

        let cache_key = (advanced && lod_level == LodLevel::Full)
            .then(|| CacheKey::for_element(element, &features));

        if let Some(key) = &cache_key {
            if let Some(cached) = self.cache.get(key) {
                tracing::debug!(element = %element.id, "Using cached mesh");
                return Ok(BuildResult {
                    mesh: cached.mesh,
                    overlays: Vec::new(),
                    assemblies,
                    success: cached.success,
                    warnings: cached.warnings,
                    from_cache: true,
                    lod_level,
                });
            }
        }

        let section = resolve_section(
            element.category,
            &element.dimensions,
            element.profile_designation(),
            &element.metadata,
        );
        let base = section.to_mesh();

        let subset;
        let features = if advanced && lod_level != LodLevel::Full {
            subset = self.lod.simplify(&features, camera_distance);
            &subset
        } else {
            &features
        };

        let applied = self.engine.apply(base, features, &section, mode)?;

        if let Some(key) = cache_key {
            let outcome = CachedGeometry::new(applied.mesh, applied.success, applied.warnings);
            self.cache.set(key, &outcome);
            return Ok(BuildResult {
                mesh: outcome.mesh,
                overlays: applied.overlays,
                assemblies,
                success: outcome.success,
                warnings: outcome.warnings,
                from_cache: false,
                lod_level,
            });
        }

        Ok(BuildResult {
            mesh: applied.mesh,
            overlays: applied.overlays,
            assemblies,
            success: applied.success,
            warnings: applied.warnings,
            from_cache: false,
            lod_level,
        })
    }

    pub fn cache_statistics(&self) -> CacheStatistics {
        self.cache.statistics()
    }

    pub fn cache_mut(&mut self) -> &mut GeometryCache {
        &mut self.cache
    }

    /// Apply a new configuration. The cache keeps its entries within the
    /// new limits.
    pub fn reconfigure(&mut self, config: PipelineConfig) {
        self.config = config;
        self.normalizer = FeatureNormalizer::with_web_tolerance(config.web_tolerance);
        self.lod = LodSelector::new(config.lod);
        self.cache.reconfigure(config.cache);
    }
}

impl Default for MachiningPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Weld beads for every weld assembly
fn assembly_meshes(assemblies: &[Assembly]) -> Vec<AssemblyMesh> {
    assemblies
        .iter()
        .filter(|a| a.is_weld())
        .filter_map(|assembly| match weld_bead(assembly) {
            Ok(mesh) => Some(AssemblyMesh {
                assembly_id: assembly.id.clone(),
                kind: assembly.kind.clone(),
                mesh,
            }),
            Err(e) => {
                tracing::warn!(assembly = %assembly.id, error = %e, "Skipping weld bead");
                None
            }
        })
        .collect()
}

/// Triangular fillet bead along X, centred on the assembly position
fn weld_bead(assembly: &Assembly) -> Result<Mesh> {
    let size = assembly.metadata.weld_size().unwrap_or(DEFAULT_WELD_SIZE);
    let length = assembly.metadata.weld_length().unwrap_or(DEFAULT_WELD_LENGTH);

    let half = size / 2.0;
    let profile = ProfileType::Polygon {
        points: vec![
            Point2::new(-half, -half),
            Point2::new(half, -half),
            Point2::new(-half, half),
        ],
    }
    .to_profile()?;

    let [x, y, z] = assembly.position.to_array();
    let placement = Matrix4::new_translation(&Vector3::new(x, y, z)) * member_frame(length);
    extrude_profile(&profile, length, Some(placement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nc_lite_core::{Dimensions, MaterialCategory, RawFeature};
    use serde_json::json;

    fn plate_with_holes(count: usize) -> StructuralElement {
        let mut element = StructuralElement::new("P1", MaterialCategory::Plate).with_dimensions(
            Dimensions::new()
                .with_length(1000.0)
                .with_width(300.0)
                .with_thickness(10.0),
        );
        for i in 0..count {
            element = element.with_feature(
                RawFeature::new("hole", [-400.0 + 100.0 * i as f64, 0.0, 5.0]).with_diameter(14.0),
            );
        }
        element
    }

    #[test]
    fn test_selection_highlight() {
        let mut selection = SelectionState::new();
        selection.hover(Some("a"));
        assert_eq!(selection.highlight_for("a"), Highlight::Hovered);
        selection.select(Some("a"));
        assert_eq!(selection.highlight_for("a"), Highlight::Selected);
        assert_eq!(selection.highlight_for("b"), Highlight::None);
        assert!(Highlight::None.color().is_none());
        assert_ne!(Highlight::Hovered.color(), Highlight::Selected.color());
    }

    #[test]
    fn test_machining_mode_bypasses_cache() {
        let mut pipeline = MachiningPipeline::default();
        let element = plate_with_holes(1);
        pipeline.build_mesh(&element, RenderMode::Machining).unwrap();
        pipeline.build_mesh(&element, RenderMode::Machining).unwrap();
        let stats = pipeline.cache_statistics();
        assert_eq!(stats.hits + stats.misses, 0);
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_lod_subsets_are_not_cached() {
        let mut pipeline = MachiningPipeline::default();
        let element = plate_with_holes(4);
        let far = pipeline
            .build_mesh_at_distance(&element, RenderMode::Advanced, 5000.0)
            .unwrap();
        assert_eq!(far.lod_level, LodLevel::Coarse);
        assert!(!far.from_cache);
        assert_eq!(pipeline.cache_statistics().entries, 0);

        let near = pipeline.build_mesh(&element, RenderMode::Advanced).unwrap();
        assert_eq!(near.lod_level, LodLevel::Full);
        assert_eq!(pipeline.cache_statistics().entries, 1);
    }

    #[test]
    fn test_weld_assembly_bead() {
        let mut element = plate_with_holes(0);
        element.assemblies.push(
            serde_json::from_value(json!({
                "id": "W1",
                "type": "weld",
                "position": [0, 150, 5],
                "metadata": {"length": 200, "size": 8}
            }))
            .unwrap(),
        );
        element.assemblies.push(
            serde_json::from_value(json!({"id": "S1", "type": "stiffener"})).unwrap(),
        );

        let result = MachiningPipeline::default()
            .build_mesh(&element, RenderMode::Machining)
            .unwrap();
        assert!(result.success);
        assert_eq!(result.assemblies.len(), 1);
        let (min, max) = result.assemblies[0].mesh.bounds();
        assert_relative_eq!(max.x - min.x, 200.0, epsilon = 0.01);
        assert_relative_eq!(max.y - min.y, 8.0, epsilon = 0.01);
        assert_relative_eq!((min.y + max.y) / 2.0, 150.0, epsilon = 0.01);
    }

    #[test]
    fn test_into_world_moves_all_meshes() {
        let element = plate_with_holes(2).with_position([0.0, 0.0, 1000.0]);
        let result = MachiningPipeline::default()
            .build_mesh(&element, RenderMode::Overlay)
            .unwrap()
            .into_world(&element);
        let (min, _) = result.mesh.bounds();
        assert_relative_eq!(min.z, 995.0, epsilon = 0.01);
        let (omin, _) = result.overlays[0].mesh.bounds();
        assert!(omin.z > 990.0);
    }

    #[test]
    fn test_outcome_with_warnings_is_cached() {
        let element = plate_with_holes(2)
            .with_feature(RawFeature::new("hole", [200.0, 0.0, 5.0]).with_diameter(-10.0));
        let mut pipeline = MachiningPipeline::default();

        let first = pipeline.build_mesh(&element, RenderMode::Advanced).unwrap();
        assert!(first.success);
        assert_eq!(first.warnings.len(), 1);
        assert_eq!(first.warnings[0].feature_id, "hole-2");

        let second = pipeline.build_mesh(&element, RenderMode::Advanced).unwrap();
        assert!(second.from_cache);
        assert_eq!(pipeline.cache_statistics().hits, 1);
        assert_eq!(second.warnings, first.warnings);
        assert_eq!(second.success, first.success);
        assert_eq!(second.mesh, first.mesh);
    }

    #[test]
    fn test_cache_mut_reaches_pipeline_cache() {
        let mut pipeline = MachiningPipeline::default();
        pipeline.build_mesh(&plate_with_holes(1), RenderMode::Advanced).unwrap();
        assert_eq!(pipeline.cache_mut().sweep_expired(), 0);
        pipeline.cache_mut().clear();
        assert_eq!(pipeline.cache_statistics().entries, 0);

        let rebuilt = pipeline.build_mesh(&plate_with_holes(1), RenderMode::Advanced).unwrap();
        assert!(!rebuilt.from_cache);
    }

    #[test]
    fn test_reconfigure_applies_limits() {
        let mut pipeline = MachiningPipeline::default();
        pipeline.build_mesh(&plate_with_holes(1), RenderMode::Advanced).unwrap();
        pipeline.build_mesh(&plate_with_holes(2), RenderMode::Advanced).unwrap();
        assert_eq!(pipeline.cache_statistics().entries, 2);

        let mut config = PipelineConfig::default();
        config.cache.max_entries = 1;
        config.lod.far = 800.0;
        pipeline.reconfigure(config);
        assert_eq!(pipeline.cache_statistics().entries, 1);
        assert_eq!(pipeline.config().lod.far, 800.0);
    }
}
