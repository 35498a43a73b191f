//! Skinned mesh data: vertices, weights and triangles

use crate::error::{Md5Error, Result};
use glam::{Vec2, Vec3};
use std::ops::Range;

/// A mesh vertex: texture coordinates and a range into the weight list
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub uv: Vec2,
    pub first_weight: usize,
    pub weight_count: usize,
}

impl Vertex {
    pub fn weight_range(&self) -> Range<usize> {
        self.first_weight..self.first_weight + self.weight_count
    }
}

/// One joint's influence on a vertex
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Weight {
    pub joint: usize,
    pub bias: f32,
    /// Position in the joint's local space
    pub position: Vec3,
}

/// Three vertex indices; winding order decides the face normal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [u32; 3],
}

/// A single `mesh { }` block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub shader: String,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub weights: Vec<Weight>,
}

impl Mesh {
    /// Weights for a vertex, or `None` if its range runs past the weight list
    pub fn weights_for(&self, vertex: &Vertex) -> Option<&[Weight]> {
        self.weights.get(vertex.weight_range())
    }

    /// Check weight ranges, weight joints and triangle indices
    pub fn check_indices(&self, joint_count: usize) -> Result<()> {
        for (i, vertex) in self.vertices.iter().enumerate() {
            let range = vertex.weight_range();
            if range.end > self.weights.len() {
                return Err(Md5Error::Validation(format!(
                    "vertex {i} uses weights {}..{} but the mesh has {}",
                    range.start,
                    range.end,
                    self.weights.len()
                )));
            }
        }

        for (i, weight) in self.weights.iter().enumerate() {
            if weight.joint >= joint_count {
                return Err(Md5Error::Validation(format!(
                    "weight {i} references joint {} but the skeleton has {joint_count}",
                    weight.joint
                )));
            }
        }

        let vertex_count = self.vertices.len();
        for (i, tri) in self.triangles.iter().enumerate() {
            if let Some(&bad) = tri.indices.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(Md5Error::Validation(format!(
                    "triangle {i} references vertex {bad} but the mesh has {vertex_count}"
                )));
            }
        }

        Ok(())
    }

    /// Check that each vertex's biases sum to one within `tolerance`
    pub fn check_weight_sums(&self, tolerance: f32) -> Result<()> {
        for (i, vertex) in self.vertices.iter().enumerate() {
            let Some(weights) = self.weights_for(vertex) else {
                continue;
            };
            let sum: f32 = weights.iter().map(|w| w.bias).sum();
            if (sum - 1.0).abs() > tolerance {
                return Err(Md5Error::Validation(format!(
                    "vertex {i} weights sum to {sum}, expected 1.0"
                )));
            }
        }
        Ok(())
    }
}
