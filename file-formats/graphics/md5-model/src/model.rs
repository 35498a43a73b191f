//! The loaded model: bind skeleton, meshes and the clips bound to them

use crate::anim::AnimationClip;
use crate::error::{Md5Error, Result};
use crate::joint::Joint;
use crate::mesh::Mesh;
use crate::parser::{ParseOptions, parse_mesh, read_source};
use std::path::Path;

/// A skinned model loaded from a `.md5mesh` file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// `MD5Version` header value
    pub version: i32,
    /// `commandline` header, empty if absent
    pub command_line: String,
    /// Bind-pose skeleton in model space
    pub joints: Vec<Joint>,
    /// Meshes in file order
    pub meshes: Vec<Mesh>,
    /// Clips in load order
    pub clips: Vec<AnimationClip>,
}

impl Model {
    /// Load a model with default parse options
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_options(path, &ParseOptions::default())
    }

    pub fn load_with_options<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let src = read_source(path)?;
        let model = parse_mesh(&src, options)?;
        log::info!(
            "Loaded {}: {} joints, {} meshes, {} vertices, {} triangles",
            path.display(),
            model.joints.len(),
            model.meshes.len(),
            model.vertex_count(),
            model.triangle_count()
        );
        Ok(model)
    }

    /// Bind a clip to this model's skeleton.
    ///
    /// The clip must have the same number of joints and, where both sides
    /// name them, the same names in the same order. On failure the model is
    /// left unchanged.
    pub fn add_clip(&mut self, clip: AnimationClip) -> Result<usize> {
        self.check_skeleton(&clip.name, clip.joints.iter().map(|j| j.name.as_str()))?;
        self.clips.push(clip);
        Ok(self.clips.len() - 1)
    }

    /// Load a `.md5anim` file and bind it to this model
    pub fn load_clip<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let clip = AnimationClip::load(path)?;
        self.add_clip(clip)
    }

    /// Append the meshes of another model built on the same skeleton.
    ///
    /// `name` only labels errors. Returns the index of the first appended
    /// mesh; on failure the model is left unchanged.
    pub fn add_meshes(&mut self, name: &str, other: Model) -> Result<usize> {
        self.check_skeleton(name, other.joints.iter().map(|j| j.name.as_str()))?;
        let first = self.meshes.len();
        self.meshes.extend(other.meshes);
        Ok(first)
    }

    /// Load another `.md5mesh` file sharing this skeleton and append its meshes
    pub fn load_meshes<P: AsRef<Path>>(&mut self, path: P, options: &ParseOptions) -> Result<usize> {
        let path = path.as_ref();
        let other = Self::load_with_options(path, options)?;
        self.add_meshes(&path.display().to_string(), other)
    }

    /// Compare joint names against the bind skeleton, by count and position
    fn check_skeleton<'a, I>(&self, asset: &str, names: I) -> Result<()>
    where
        I: ExactSizeIterator<Item = &'a str>,
    {
        if names.len() != self.joints.len() {
            return Err(Md5Error::TopologyMismatch {
                asset: asset.to_string(),
                reason: format!("has {} joints, model has {}", names.len(), self.joints.len()),
            });
        }

        let renamed = self
            .joints
            .iter()
            .zip(names)
            .enumerate()
            .find(|(_, (bind, other))| !bind.name.is_empty() && !other.is_empty() && bind.name != *other);
        if let Some((i, (bind, other))) = renamed {
            return Err(Md5Error::TopologyMismatch {
                asset: asset.to_string(),
                reason: format!("joint {i} is '{other}' but '{}' in the model", bind.name),
            });
        }
        Ok(())
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name == name)
    }

    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name == name)
    }

    /// Look up a clip index by name, as an error if missing
    pub fn require_clip(&self, name: &str) -> Result<usize> {
        self.clip_index(name)
            .ok_or_else(|| Md5Error::ClipNotFound(name.to_string()))
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangles.len()).sum()
    }

    pub fn weight_count(&self) -> usize {
        self.meshes.iter().map(|m| m.weights.len()).sum()
    }
}
