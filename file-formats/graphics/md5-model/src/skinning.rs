//! Vertex skinning and tangent space for MD5 meshes
//!
//! Each vertex is the bias-weighted sum of its weight positions carried
//! through the matching joint matrices (linear blend skinning). Normals,
//! tangents and bitangents are then rebuilt from the deformed triangles of
//! the current frame, never from the bind pose.
//!
//! # Example
//!
//! ```rust,no_run
//! use md5_model::Model;
//! use md5_model::animation::bind_matrices;
//! use md5_model::skinning::{SkinnedMesh, Skinner, SkinningOptions};
//!
//! let model = Model::load("models/imp.md5mesh")?;
//!
//! let mut matrices = Vec::new();
//! bind_matrices(&model.joints, &mut matrices);
//!
//! let skinner = Skinner::new(SkinningOptions::default());
//! let mut out = SkinnedMesh::default();
//! let stats = skinner.skin_mesh(&model.meshes[0], &matrices, &mut out)?;
//!
//! for (i, vertex) in out.vertices.iter().enumerate() {
//!     println!("Vertex {}: {:?}", i, vertex.position);
//! }
//! println!("{} degenerate faces", stats.degenerate_faces);
//! # Ok::<(), md5_model::Md5Error>(())
//! ```

use crate::error::{Md5Error, Result};
use crate::math::JointMatrix;
use crate::mesh::Mesh;
use glam::{Vec2, Vec3};

#[cfg(feature = "serde-support")]
use serde::Serialize;

/// Options for controlling the skinning behavior
#[derive(Debug, Clone)]
pub struct SkinningOptions {
    /// Fail with [`Md5Error::DegenerateInput`] on a triangle whose normal or
    /// tangent frame has zero length instead of skipping it
    pub strict: bool,
    /// Used for a vertex whose accumulated normal has zero length
    pub fallback_normal: Vec3,
    /// Used for a vertex whose accumulated tangent has zero length
    pub fallback_tangent: Vec3,
    /// Used for a vertex whose accumulated bitangent has zero length
    pub fallback_bitangent: Vec3,
    /// Fill the debug color channel from the final normal
    pub vertex_colors: bool,
}

impl Default for SkinningOptions {
    fn default() -> Self {
        Self {
            strict: false,
            fallback_normal: Vec3::Z,
            fallback_tangent: Vec3::X,
            fallback_bitangent: Vec3::Y,
            vertex_colors: true,
        }
    }
}

/// A deformed vertex ready for a triangle renderer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize))]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub uv: Vec2,
    /// `0.5 + 0.5 * normal`, for debug display
    pub color: Vec3,
}

/// Vertex and index buffers for one mesh, reused across frames
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize))]
pub struct SkinnedMesh {
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
}

/// Counts of numerical fallbacks taken while skinning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize))]
pub struct SkinStats {
    /// Triangles with a zero-area position footprint
    pub degenerate_faces: usize,
    /// Triangles whose tangent or bitangent collapsed, usually from repeated UVs
    pub degenerate_tangents: usize,
    /// Vertices that needed at least one fallback vector
    pub fallback_vertices: usize,
}

impl SkinStats {
    pub fn merge(&mut self, other: &Self) {
        self.degenerate_faces += other.degenerate_faces;
        self.degenerate_tangents += other.degenerate_tangents;
        self.fallback_vertices += other.fallback_vertices;
    }

    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Linear blend skinning for MD5 meshes
#[derive(Debug, Clone, Default)]
pub struct Skinner {
    options: SkinningOptions,
}

impl Skinner {
    pub fn new(options: SkinningOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SkinningOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SkinningOptions) {
        self.options = options;
    }

    /// Deform positions and copy UVs and indices into `out`
    ///
    /// # Arguments
    ///
    /// * `mesh` - The mesh to deform
    /// * `matrices` - Model-space matrix per joint for the current pose
    /// * `out` - Buffers to overwrite; resized to the mesh
    pub fn skin_positions(&self, mesh: &Mesh, matrices: &[JointMatrix], out: &mut SkinnedMesh) -> Result<()> {
        out.vertices.clear();
        out.vertices.reserve(mesh.vertices.len());

        for (i, vertex) in mesh.vertices.iter().enumerate() {
            let weights = mesh.weights_for(vertex).ok_or_else(|| {
                Md5Error::Validation(format!(
                    "vertex {i} weight range {:?} exceeds {} weights",
                    vertex.weight_range(),
                    mesh.weights.len()
                ))
            })?;

            let mut position = Vec3::ZERO;
            for weight in weights {
                let matrix = matrices.get(weight.joint).ok_or_else(|| {
                    Md5Error::Validation(format!(
                        "vertex {i} is weighted to joint {} but only {} matrices were given",
                        weight.joint,
                        matrices.len()
                    ))
                })?;
                position += weight.bias * matrix.transform_point(weight.position);
            }

            out.vertices.push(SkinnedVertex {
                position,
                uv: vertex.uv,
                ..SkinnedVertex::default()
            });
        }

        out.indices.clear();
        out.indices
            .extend(mesh.triangles.iter().flat_map(|t| t.indices));
        Ok(())
    }

    /// Fully skin one mesh: positions, tangent space and debug colors
    ///
    /// # Returns
    ///
    /// The fallbacks taken while building the tangent space
    pub fn skin_mesh(&self, mesh: &Mesh, matrices: &[JointMatrix], out: &mut SkinnedMesh) -> Result<SkinStats> {
        self.skin_positions(mesh, matrices, out)?;
        let stats = compute_tangent_space(out, &self.options)?;
        if self.options.vertex_colors {
            compute_vertex_colors(out);
        }
        if !stats.is_clean() {
            log::warn!(
                "mesh '{}': {} degenerate faces, {} degenerate tangent frames, {} fallback vertices",
                mesh.shader,
                stats.degenerate_faces,
                stats.degenerate_tangents,
                stats.fallback_vertices
            );
        }
        Ok(stats)
    }
}

/// Rebuild normals, tangents and bitangents from the deformed triangles.
///
/// For a triangle `(a, b, c)` with `e0 = b - a` and `e1 = c - a` the face
/// normal is `normalize(e1 x e0)`. The tangent and bitangent come from the
/// UV deltas and are flipped when the signed UV area is negative so
/// mirrored UVs keep a consistent handedness. Unit face vectors are summed
/// into each corner and renormalised per vertex.
pub fn compute_tangent_space(mesh: &mut SkinnedMesh, options: &SkinningOptions) -> Result<SkinStats> {
    let mut stats = SkinStats::default();
    let vertex_count = mesh.vertices.len();

    for v in &mut mesh.vertices {
        v.normal = Vec3::ZERO;
        v.tangent = Vec3::ZERO;
        v.bitangent = Vec3::ZERO;
    }

    for (face, tri) in mesh.indices.chunks_exact(3).enumerate() {
        let [ia, ib, ic] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if ia >= vertex_count || ib >= vertex_count || ic >= vertex_count {
            return Err(Md5Error::Validation(format!(
                "triangle {face} references a vertex outside 0..{vertex_count}"
            )));
        }

        let (a, b, c) = (&mesh.vertices[ia], &mesh.vertices[ib], &mesh.vertices[ic]);
        let e0 = b.position - a.position;
        let e1 = c.position - a.position;
        let d0 = b.uv - a.uv;
        let d1 = c.uv - a.uv;

        let normal = e1.cross(e0).try_normalize();
        if normal.is_none() {
            if options.strict {
                return Err(Md5Error::DegenerateInput(format!(
                    "triangle {face} has zero area"
                )));
            }
            stats.degenerate_faces += 1;
        }

        let area = d0.x * d1.y - d0.y * d1.x;
        let sign = if area.is_sign_negative() { -1.0 } else { 1.0 };
        let tangent = (e0 * d1.y - e1 * d0.y).try_normalize().map(|t| t * sign);
        let bitangent = (e1 * d0.x - e0 * d1.x).try_normalize().map(|b| b * sign);
        if tangent.is_none() || bitangent.is_none() {
            if options.strict {
                return Err(Md5Error::DegenerateInput(format!(
                    "triangle {face} has a degenerate tangent frame"
                )));
            }
            stats.degenerate_tangents += 1;
        }

        let normal = normal.unwrap_or(Vec3::ZERO);
        let tangent = tangent.unwrap_or(Vec3::ZERO);
        let bitangent = bitangent.unwrap_or(Vec3::ZERO);
        for i in [ia, ib, ic] {
            let v = &mut mesh.vertices[i];
            v.normal += normal;
            v.tangent += tangent;
            v.bitangent += bitangent;
        }
    }

    for v in &mut mesh.vertices {
        let normal = v.normal.try_normalize();
        let tangent = v.tangent.try_normalize();
        let bitangent = v.bitangent.try_normalize();
        if normal.is_none() || tangent.is_none() || bitangent.is_none() {
            stats.fallback_vertices += 1;
        }
        v.normal = normal.unwrap_or(options.fallback_normal);
        v.tangent = tangent.unwrap_or(options.fallback_tangent);
        v.bitangent = bitangent.unwrap_or(options.fallback_bitangent);
    }

    Ok(stats)
}

/// Map each normal from `[-1, 1]` into a `[0, 1]` debug color
pub fn compute_vertex_colors(mesh: &mut SkinnedMesh) {
    for v in &mut mesh.vertices {
        v.color = Vec3::splat(0.5) + 0.5 * v.normal;
    }
}
