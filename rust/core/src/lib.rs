// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # NC-Lite Core
//!
//! Data model and feature normalization for machined structural steel parts.
//!
//! ## Overview
//!
//! - **Element model**: [`StructuralElement`] records as supplied by the host
//!   (category, nominal dimensions, profile designation, feature lists)
//! - **Exchange records**: loosely-typed [`RawFeature`] / [`RawContour`]
//!   records derived from DSTV blocks, decoded with serde
//! - **Normalization**: [`normalize`] turns raw records into typed
//!   [`NormalizedFeature`]s with a resolved [`Face`]
//! - **Designations**: prefix matching and a small catalog of I-sections
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nc_lite_core::{normalize, Dimensions, MaterialCategory, RawFeature, StructuralElement};
//!
//! let beam = StructuralElement::new("B1", MaterialCategory::Beam)
//!     .with_profile("IPE300")
//!     .with_dimensions(Dimensions::new().with_length(6000.0))
//!     .with_feature(RawFeature::new("hole", [1000.0, 0.0, 0.0]).with_diameter(20.0));
//!
//! for feature in normalize(&beam) {
//!     println!("{} {} on {}", feature.id, feature.kind, feature.face);
//! }
//! ```

pub mod designation;
pub mod element;
pub mod error;
pub mod face;
pub mod feature;
pub mod normalize;
pub mod raw;

pub use designation::{is_i_family, is_rectangular_tube, Designation, ISection, ShapeFamily};
pub use element::{
    Assembly, AssemblyMetadata, Dimensions, ElementMetadata, MaterialCategory, StructuralElement,
};
pub use error::{Error, Result};
pub use face::{parse_face_hint, resolve_face, FaceResolver, WEB_TOLERANCE};
pub use feature::{
    feature_set_signature, ContourPoint, ContourType, CoordinateSystem, CopingType, Face,
    FeatureKind, FeatureParams, NormalizedFeature, NotchType,
};
pub use normalize::{classify, normalize, FeatureNormalizer};
pub use raw::{Metadata, RawContour, RawContourPoint, RawFeature, RawPoint, RawRotation};
