// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! NC-Lite Geometry
//!
//! Base solids, machining tools, CSG feature application, geometry caching
//! and level of detail for structural steel parts, using earcutr
//! triangulation, csgrs booleans and nalgebra for transformations.
//!
//! [`MachiningPipeline`] is the entry point; the other modules are usable on
//! their own.

pub mod base;
pub mod cache;
pub mod config;
pub mod csg;
pub mod engine;
pub mod error;
pub mod extrusion;
pub mod lod;
pub mod mesh;
pub mod pipeline;
pub mod profile;
pub mod tools;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use base::{generate_base, resolve_section, BaseSection, SectionShape};
pub use cache::{CacheConfig, CacheKey, CacheStatistics, CachedGeometry, GeometryCache};
pub use config::PipelineConfig;
pub use csg::{BooleanOp, BooleanProcessor};
pub use engine::{
    overlay_color, ApplyResult, FeatureEngine, FeatureOverlay, FeatureWarning, RenderMode,
};
pub use error::{Error, Result};
pub use extrusion::extrude_profile;
pub use lod::{LodConfig, LodLevel, LodSelector};
pub use mesh::Mesh;
pub use pipeline::{
    AssemblyMesh, BuildResult, Highlight, MachiningPipeline, SelectionState,
};
pub use profile::{Profile2D, ProfileType};
pub use tools::{build_tools, FaceFrame, ToolSolid};
pub use transform::element_transform;
pub use triangulation::triangulate_polygon;
