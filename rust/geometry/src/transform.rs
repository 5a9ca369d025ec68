// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element placement
//!
//! Meshes are built in the element's local frame; these helpers move them
//! into world space using the element's position, Euler XYZ rotation and
//! scale.

use crate::extrusion::apply_transform;
use crate::mesh::Mesh;
use nalgebra::{Matrix4, Rotation3, Vector3};
use nc_lite_core::StructuralElement;

/// World matrix of an element: translation * rotation (XYZ) * scale
///
/// Zero or non-finite scale components fall back to 1 so the matrix stays
/// invertible.
pub fn element_transform(element: &StructuralElement) -> Matrix4<f64> {
    let [px, py, pz] = element.position.map(finite_or(0.0));
    let [rx, ry, rz] = element.rotation.map(finite_or(0.0));
    let scale = element
        .scale
        .map(|s| if s.is_finite() && s != 0.0 { s } else { 1.0 });

    // Intrinsic X then Y then Z
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), rz)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), ry)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), rx);

    Matrix4::new_translation(&Vector3::new(px, py, pz))
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(&Vector3::new(scale[0], scale[1], scale[2]))
}

/// True when the element sits at the origin unrotated and unscaled
pub fn is_identity_placement(element: &StructuralElement) -> bool {
    element.position == [0.0; 3] && element.rotation == [0.0; 3] && element.scale == [1.0; 3]
}

/// Move a local-frame mesh into world space in place
pub fn place_mesh(mesh: &mut Mesh, element: &StructuralElement) {
    if is_identity_placement(element) {
        return;
    }
    apply_transform(mesh, &element_transform(element));
}

fn finite_or(default: f64) -> impl Fn(f64) -> f64 {
    move |v| if v.is_finite() { v } else { default }
}
