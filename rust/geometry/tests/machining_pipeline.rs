// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use nc_lite_core::{
    normalize, Dimensions, Face, FeatureKind, MaterialCategory, RawContour, RawFeature,
    StructuralElement,
};
use nc_lite_geometry::{
    LodLevel, LodSelector, MachiningPipeline, Mesh, PipelineConfig, RenderMode,
};

/// IPE300: 300 high, 150 wide, web 7.1, flange 10.7
const WEB_HALF: f32 = 7.1 / 2.0;
const FLANGE_INNER: f32 = 150.0 - 10.7;

fn ipe300_with_two_holes() -> StructuralElement {
    StructuralElement::new("B1", MaterialCategory::Beam)
        .with_profile("IPE300")
        .with_dimensions(Dimensions::new().with_length(6000.0))
        .with_feature(RawFeature::new("hole", [1000.0, 0.0, 0.0]).with_diameter(20.0))
        .with_feature(RawFeature::new("hole", [2000.0, 0.0, 140.0]).with_diameter(20.0))
}

fn plate(features: &[(f64, f64)]) -> StructuralElement {
    let mut element = StructuralElement::new("P1", MaterialCategory::Plate).with_dimensions(
        Dimensions::new()
            .with_length(800.0)
            .with_width(300.0)
            .with_thickness(12.0),
    );
    for &(x, diameter) in features {
        element = element.with_feature(RawFeature::new("hole", [x, 0.0, 6.0]).with_diameter(diameter));
    }
    element
}

fn vertices(mesh: &Mesh) -> impl Iterator<Item = (f32, f32, f32)> + '_ {
    mesh.positions.chunks_exact(3).map(|p| (p[0], p[1], p[2]))
}

fn center(mesh: &Mesh) -> (f32, f32, f32) {
    let (min, max) = mesh.bounds();
    (
        (min.x + max.x) / 2.0,
        (min.y + max.y) / 2.0,
        (min.z + max.z) / 2.0,
    )
}

#[test]
fn ipe300_two_holes_resolve_faces() {
    let features = normalize(&ipe300_with_two_holes());
    assert_eq!(features.len(), 2);
    assert_eq!(features[0].kind, FeatureKind::Hole);
    assert_eq!(features[0].face, Face::Web);
    assert_eq!(features[1].face, Face::TopFlange);
}

#[test]
fn ipe300_two_holes_machining() {
    let element = ipe300_with_two_holes();
    let mut pipeline = MachiningPipeline::default();

    let plain = pipeline
        .build_mesh(
            &StructuralElement::new("B0", MaterialCategory::Beam)
                .with_profile("IPE300")
                .with_dimensions(Dimensions::new().with_length(6000.0)),
            RenderMode::Machining,
        )
        .unwrap();
    let result = pipeline.build_mesh(&element, RenderMode::Machining).unwrap();

    assert!(result.success);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert!(result.overlays.is_empty());
    assert!(result.mesh.triangle_count() > plain.mesh.triangle_count());

    // Holes do not change the outer envelope
    let (min, max) = result.mesh.bounds();
    assert_relative_eq!(max.x - min.x, 6000.0, epsilon = 0.1);
    assert_relative_eq!(max.z - min.z, 300.0, epsilon = 0.1);

    // Web hole: a ring of radius 10 about (1000, 0) on both web faces
    let on_web_ring = |&(x, y, z): &(f32, f32, f32)| {
        (y.abs() - WEB_HALF).abs() < 0.01 && ((x - 1000.0).hypot(z) - 10.0).abs() < 0.01
    };
    assert_eq!(vertices(&plain.mesh).filter(on_web_ring).count(), 0);
    let web_ring: Vec<_> = vertices(&result.mesh).filter(on_web_ring).collect();
    assert!(web_ring.len() >= 16, "web ring has {} vertices", web_ring.len());
    assert!(web_ring.iter().any(|v| v.1 > 0.0) && web_ring.iter().any(|v| v.1 < 0.0));

    // Flange hole: a ring of radius 10 about (2000, 0) on both flange faces
    let on_flange_ring = |&(x, y, z): &(f32, f32, f32)| {
        ((z - 150.0).abs() < 0.01 || (z - FLANGE_INNER).abs() < 0.01)
            && ((x - 2000.0).hypot(y) - 10.0).abs() < 0.01
    };
    assert_eq!(vertices(&plain.mesh).filter(on_flange_ring).count(), 0);
    let flange_ring: Vec<_> = vertices(&result.mesh).filter(on_flange_ring).collect();
    assert!(flange_ring.len() >= 16, "flange ring has {} vertices", flange_ring.len());
    assert!(flange_ring.iter().any(|v| (v.2 - 150.0).abs() < 0.01));

    // Neither hole reaches the other's neighbourhood
    assert!(web_ring.iter().all(|v| (v.0 - 1000.0).abs() <= 10.01));
    assert!(flange_ring.iter().all(|v| (v.0 - 2000.0).abs() <= 10.01));
}

#[test]
fn flange_hole_leaves_web_intact() {
    let element = ipe300_with_two_holes();
    let result = MachiningPipeline::default()
        .build_mesh(&element, RenderMode::Machining)
        .unwrap();
    assert!(result.success);

    // Nothing is machined into the web below the top flange's inner face
    let pocket: Vec<_> = vertices(&result.mesh)
        .filter(|&(x, y, z)| {
            (x - 2000.0).abs() < 12.0
                && y.abs() <= WEB_HALF + 0.01
                && z < FLANGE_INNER - 0.01
                && z > FLANGE_INNER - 5.0
        })
        .collect();
    assert!(pocket.is_empty(), "web pocket vertices: {:?}", pocket);
}

#[test]
fn ipe300_two_holes_overlay() {
    let element = ipe300_with_two_holes();
    let result = MachiningPipeline::default()
        .build_mesh(&element, RenderMode::Overlay)
        .unwrap();

    assert!(result.success);
    assert_eq!(result.overlays.len(), 2);

    let web = &result.overlays[0];
    assert_eq!(web.kind, FeatureKind::Hole);
    let (x, y, z) = center(&web.mesh);
    assert_relative_eq!(x, 1000.0, epsilon = 0.01);
    assert_relative_eq!(y, 0.0, epsilon = 0.01);
    assert_relative_eq!(z, 0.0, epsilon = 0.01);
    let (min, max) = web.mesh.bounds();
    assert_relative_eq!(max.x - min.x, 20.0, epsilon = 0.01);

    assert_relative_eq!(max.y - min.y, 7.1 + 2.0, epsilon = 0.01);

    let flange = &result.overlays[1];
    let (x, y, _) = center(&flange.mesh);
    assert_relative_eq!(x, 2000.0, epsilon = 0.01);
    assert_relative_eq!(y, 0.0, epsilon = 0.01);
    let (min, max) = flange.mesh.bounds();
    assert_relative_eq!(max.x - min.x, 20.0, epsilon = 0.01);
    assert_relative_eq!(min.z, FLANGE_INNER, epsilon = 0.01);
    assert_relative_eq!(max.z, 151.0, epsilon = 0.01);
}

#[test]
fn advanced_mode_hits_cache() {
    let element = ipe300_with_two_holes();
    let mut pipeline = MachiningPipeline::default();

    let first = pipeline.build_mesh(&element, RenderMode::Advanced).unwrap();
    assert!(!first.from_cache);
    let hits_before = pipeline.cache_statistics().hits;

    let mut second = pipeline.build_mesh(&element, RenderMode::Advanced).unwrap();
    assert!(second.from_cache);
    assert_eq!(pipeline.cache_statistics().hits, hits_before + 1);
    assert_eq!(second.mesh.vertex_count(), first.mesh.vertex_count());

    // Mutating a returned copy leaves the cached entry intact
    second.mesh.positions.iter_mut().for_each(|p| *p = 0.0);
    let third = pipeline.build_mesh(&element, RenderMode::Advanced).unwrap();
    assert_eq!(third.mesh, first.mesh);
}

#[test]
fn lod_decimates_feature_lists() {
    let mut element = plate(&[]);
    for i in 0..8 {
        element = element
            .with_feature(RawFeature::new("hole", [-350.0 + 100.0 * i as f64, 0.0, 6.0]));
    }
    let features = normalize(&element);
    assert_eq!(features.len(), 8);

    let selector = LodSelector::default();
    let far = selector.simplify(&features, 3000.0);
    assert_eq!(far.len(), 2);
    assert_eq!(far[0].id, features[0].id);
    assert_eq!(far[1].id, features[4].id);
    assert_eq!(selector.simplify(&features, 100.0).len(), 8);

    let mut pipeline = MachiningPipeline::default();
    let result = pipeline
        .build_mesh_at_distance(&element, RenderMode::Advanced, 3000.0)
        .unwrap();
    assert_eq!(result.lod_level, LodLevel::Coarse);
    assert!(result.success);
}

#[test]
fn one_invalid_hole_yields_one_warning() {
    let element = plate(&[(-300.0, 14.0), (-150.0, 14.0), (0.0, -10.0), (150.0, 14.0), (300.0, 14.0)]);
    let result = MachiningPipeline::default()
        .build_mesh(&element, RenderMode::Machining)
        .unwrap();

    assert!(result.success);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].feature_id, "hole-2");
}

#[test]
fn every_feature_invalid_returns_base() {
    let element = plate(&[(0.0, -1.0), (100.0, 0.0)]);
    let base = MachiningPipeline::default()
        .build_mesh(&plate(&[]), RenderMode::Machining)
        .unwrap();
    let result = MachiningPipeline::default()
        .build_mesh(&element, RenderMode::Machining)
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.warnings.len(), 2);
    assert_eq!(result.mesh, base.mesh);
}

#[test]
fn builds_are_deterministic() {
    let element = ipe300_with_two_holes();
    let a = MachiningPipeline::default()
        .build_mesh(&element, RenderMode::Machining)
        .unwrap();
    let b = MachiningPipeline::default()
        .build_mesh(&element, RenderMode::Machining)
        .unwrap();
    assert_eq!(a.mesh, b.mesh);
    assert_eq!(normalize(&element), normalize(&element));
}

#[test]
fn cache_respects_entry_limit() {
    let mut config = PipelineConfig::default();
    config.cache.max_entries = 2;
    let mut pipeline = MachiningPipeline::new(config);

    for diameter in [10.0, 12.0, 14.0, 16.0] {
        let element = plate(&[(0.0, diameter)]);
        pipeline.build_mesh(&element, RenderMode::Advanced).unwrap();
        let stats = pipeline.cache_statistics();
        assert!(stats.entries <= 2);
        assert!(stats.size_mb <= stats.max_size_mb);
    }
    assert_eq!(pipeline.cache_statistics().evictions, 2);
}

#[test]
fn element_from_json_fixture() {
    let json = r#"{
        "id": "PL-7",
        "type": "PLATE",
        "dimensions": {"length": 600, "width": 400, "thickness": 15},
        "position": [0, 0, 0],
        "metadata": {
            "cuttingFeatures": [
                {"type": "hole", "position": [-200, -100, 7.5], "diameter": 18,
                 "metadata": {"countersink": {"diameter": 30}}},
                {"type": "slot", "position": [0, 100, 7.5], "length": 60, "width": 20,
                 "rotation": 90},
                {"type": "marking", "position": [200, 0, 7.5], "metadata": {"face": "top"}}
            ],
            "cuttingContours": [
                {"points": [[-50, -50], [50, -50, 0.4142], [50, 50], [-50, 50]], "closed": true}
            ]
        }
    }"#;
    let element = StructuralElement::from_json(json).unwrap();
    let features = normalize(&element);
    let kinds: Vec<FeatureKind> = features.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FeatureKind::Countersink,
            FeatureKind::Slot,
            FeatureKind::Marking,
            FeatureKind::Contour
        ]
    );
    assert_eq!(features[3].id, "cutting-contour-0");

    let result = MachiningPipeline::default()
        .build_mesh(&element, RenderMode::Machining)
        .unwrap();
    assert!(result.success);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn self_intersecting_contour_is_skipped() {
    let element = plate(&[(-200.0, 14.0)]).with_contour(RawContour::from_points(&[
        (0.0, 0.0),
        (100.0, 100.0),
        (100.0, 0.0),
        (0.0, 100.0),
    ]));
    let result = MachiningPipeline::default()
        .build_mesh(&element, RenderMode::Machining)
        .unwrap();
    assert!(result.success);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].message.contains("self-intersecting"));
}
