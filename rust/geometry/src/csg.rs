// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG (Constructive Solid Geometry) Operations
//!
//! Boolean subtract / union / intersect between triangle meshes, backed by
//! csgrs. Operands are validated before the boolean runs and results are
//! validated after it; a degenerate outcome is an error so callers can keep
//! their previous mesh.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
use csgrs::mesh::Mesh as CSGMesh;
use nalgebra::{Point3, Vector3};

/// Minimum triangle count of a closed solid (a tetrahedron)
pub const MIN_SOLID_TRIANGLES: usize = 4;

/// Boolean operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Subtract,
    Union,
    Intersect,
}

impl BooleanOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subtract => "subtract",
            Self::Union => "union",
            Self::Intersect => "intersect",
        }
    }
}

/// CSG boolean processor
#[derive(Debug, Clone, Copy)]
pub struct BooleanProcessor {
    /// Triangles below this area are dropped before conversion
    pub epsilon: f64,
}

impl BooleanProcessor {
    pub fn new() -> Self {
        Self { epsilon: 1e-10 }
    }

    /// host - tool
    #[inline]
    pub fn subtract(&self, host: &Mesh, tool: &Mesh) -> Result<Mesh> {
        self.apply(BooleanOp::Subtract, host, tool)
    }

    /// host + tool
    #[inline]
    pub fn union(&self, host: &Mesh, tool: &Mesh) -> Result<Mesh> {
        self.apply(BooleanOp::Union, host, tool)
    }

    /// host & tool
    #[inline]
    pub fn intersect(&self, host: &Mesh, tool: &Mesh) -> Result<Mesh> {
        self.apply(BooleanOp::Intersect, host, tool)
    }

    /// Run one boolean and validate the result
    pub fn apply(&self, op: BooleanOp, host: &Mesh, tool: &Mesh) -> Result<Mesh> {
        use csgrs::traits::CSG;

        if !is_solid(host) {
            return Err(Error::BooleanFailed(format!(
                "{}: host mesh is not a valid solid",
                op.as_str()
            )));
        }
        if !is_solid(tool) {
            return Err(Error::BooleanFailed(format!(
                "{}: tool mesh is degenerate",
                op.as_str()
            )));
        }

        let host_csg = self.mesh_to_csgrs(host);
        let tool_csg = self.mesh_to_csgrs(tool);

        let result_csg = match op {
            BooleanOp::Subtract => host_csg.difference(&tool_csg),
            BooleanOp::Union => host_csg.union(&tool_csg),
            BooleanOp::Intersect => host_csg.intersection(&tool_csg),
        };

        let result = csgrs_to_mesh(&result_csg);
        if result.triangle_count() < MIN_SOLID_TRIANGLES || !result.is_valid() {
            return Err(Error::BooleanFailed(format!(
                "{} produced a degenerate mesh ({} triangles)",
                op.as_str(),
                result.triangle_count()
            )));
        }

        Ok(result)
    }

    /// Convert our Mesh format to csgrs Mesh format
    fn mesh_to_csgrs(&self, mesh: &Mesh) -> CSGMesh<()> {
        use csgrs::mesh::{polygon::Polygon, vertex::Vertex};
        use std::sync::OnceLock;

        if mesh.is_empty() {
            return CSGMesh {
                polygons: Vec::new(),
                bounding_box: OnceLock::new(),
                metadata: None,
            };
        }

        let mut polygons = Vec::with_capacity(mesh.triangle_count());

        for tri in mesh.indices.chunks_exact(3) {
            let [v0, v1, v2] = [tri[0], tri[1], tri[2]].map(|i| vertex_at(mesh, i as usize));

            // Face normal from winding; degenerate triangles would propagate NaN
            let face_normal = match (v1 - v0).cross(&(v2 - v0)).try_normalize(self.epsilon) {
                Some(n) => n,
                None => continue,
            };

            let vertices = vec![
                Vertex::new(v0, face_normal),
                Vertex::new(v1, face_normal),
                Vertex::new(v2, face_normal),
            ];

            polygons.push(Polygon::new(vertices, None));
        }

        CSGMesh::from_polygons(&polygons, None)
    }
}

impl Default for BooleanProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Closed-solid sanity check used before booleans
#[inline]
pub fn is_solid(mesh: &Mesh) -> bool {
    mesh.is_valid()
        && mesh.triangle_count() >= MIN_SOLID_TRIANGLES
        && mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count())
}

#[inline]
fn vertex_at(mesh: &Mesh, index: usize) -> Point3<f64> {
    Point3::new(
        mesh.positions[index * 3] as f64,
        mesh.positions[index * 3 + 1] as f64,
        mesh.positions[index * 3 + 2] as f64,
    )
}

/// Convert csgrs Mesh format back to our Mesh format
fn csgrs_to_mesh(csg_mesh: &CSGMesh<()>) -> Mesh {
    let mut mesh = Mesh::new();

    for polygon in &csg_mesh.polygons {
        let vertices = &polygon.vertices;
        if vertices.len() < 3 {
            continue;
        }

        let points_3d: Vec<Point3<f64>> = vertices
            .iter()
            .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
            .collect();

        // Winding normal; fall back to the stored vertex normal for slivers
        let normal = match calculate_polygon_normal(&points_3d).try_normalize(1e-10) {
            Some(n) if n.iter().all(|c| c.is_finite()) => n,
            _ => match Vector3::new(
                vertices[0].normal[0],
                vertices[0].normal[1],
                vertices[0].normal[2],
            )
            .try_normalize(1e-10)
            {
                Some(n) => n,
                None => continue,
            },
        };

        let base_idx = mesh.vertex_count() as u32;

        if points_3d.len() == 3 {
            for p in &points_3d {
                mesh.add_vertex(*p, normal);
            }
            mesh.add_triangle(base_idx, base_idx + 1, base_idx + 2);
            continue;
        }

        let (points_2d, _, _, _) = project_to_2d(&points_3d, &normal);
        let indices = match triangulate_polygon(&points_2d) {
            Ok(idx) => idx,
            Err(_) => continue,
        };

        for p in &points_3d {
            mesh.add_vertex(*p, normal);
        }

        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (points_2d[tri[0]], points_2d[tri[1]], points_2d[tri[2]]);
            let ccw = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x) >= 0.0;
            let (i0, i1, i2) = (
                base_idx + tri[0] as u32,
                base_idx + tri[1] as u32,
                base_idx + tri[2] as u32,
            );
            // Keep every triangle wound like its polygon
            if ccw {
                mesh.add_triangle(i0, i1, i2);
            } else {
                mesh.add_triangle(i0, i2, i1);
            }
        }
    }

    mesh
}
