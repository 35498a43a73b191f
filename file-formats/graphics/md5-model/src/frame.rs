//! Per-frame evaluation: sample, solve the hierarchy, skin every mesh

use crate::animation::{
    AnimationSampler, FrameSample, HierarchyMode, HierarchySolver, Pose, SamplerOptions,
    bind_matrices,
};
use crate::error::{Md5Error, Result};
use crate::math::JointMatrix;
use crate::model::Model;
use crate::skinning::{SkinStats, SkinnedMesh, Skinner, SkinningOptions};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Output of one evaluation.
///
/// Every buffer is overwritten in place, so keeping two of these and
/// alternating between them gives a renderer a stable frame to read while
/// the next one is computed.
#[derive(Debug, Clone, Default)]
pub struct FrameState {
    /// Parent-relative joint transforms
    pub pose: Pose,
    /// Model-space matrix per joint
    pub matrices: Vec<JointMatrix>,
    /// One skinned mesh per model mesh, in model order
    pub meshes: Vec<SkinnedMesh>,
    /// Fallbacks summed over all meshes
    pub stats: SkinStats,
    /// Frames used, `None` for the bind pose
    pub sample: Option<FrameSample>,
}

/// Drives the whole pipeline for one model
#[derive(Debug, Clone, Default)]
pub struct Animator {
    pub sampler: AnimationSampler,
    pub hierarchy: HierarchyMode,
    pub skinner: Skinner,
}

impl Animator {
    pub fn new(sampler: SamplerOptions, hierarchy: HierarchyMode, skinning: SkinningOptions) -> Self {
        Self {
            sampler: AnimationSampler::new(sampler),
            hierarchy,
            skinner: Skinner::new(skinning),
        }
    }

    /// Evaluate `model` at `time` seconds into `state`.
    ///
    /// With `clip` set to `None` the bind pose is used and `time` is ignored.
    pub fn evaluate(
        &mut self,
        model: &Model,
        clip: Option<usize>,
        time: f32,
        state: &mut FrameState,
    ) -> Result<()> {
        match clip {
            Some(index) => {
                let clip = model
                    .clips
                    .get(index)
                    .ok_or_else(|| Md5Error::ClipNotFound(format!("#{index}")))?;
                if clip.joints.len() != model.joints.len() {
                    return Err(Md5Error::TopologyMismatch {
                        asset: clip.name.clone(),
                        reason: format!(
                            "clip has {} joints, model has {}",
                            clip.joints.len(),
                            model.joints.len()
                        ),
                    });
                }
                let sample = self.sampler.sample(clip, time, &mut state.pose)?;
                self.hierarchy.solve(&state.pose, &mut state.matrices)?;
                state.sample = Some(sample);
            }
            None => {
                state.pose = Pose::from_joints(&model.joints);
                bind_matrices(&model.joints, &mut state.matrices);
                state.sample = None;
            }
        }

        state
            .meshes
            .resize_with(model.meshes.len(), SkinnedMesh::default);
        state.stats = self.skin_all(model, &state.matrices, &mut state.meshes)?;
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn skin_all(&self, model: &Model, matrices: &[JointMatrix], out: &mut [SkinnedMesh]) -> Result<SkinStats> {
        let mut stats = SkinStats::default();
        for (mesh, skinned) in model.meshes.iter().zip(out.iter_mut()) {
            stats.merge(&self.skinner.skin_mesh(mesh, matrices, skinned)?);
        }
        Ok(stats)
    }

    #[cfg(feature = "parallel")]
    fn skin_all(&self, model: &Model, matrices: &[JointMatrix], out: &mut [SkinnedMesh]) -> Result<SkinStats> {
        model
            .meshes
            .par_iter()
            .zip(out.par_iter_mut())
            .map(|(mesh, skinned)| self.skinner.skin_mesh(mesh, matrices, skinned))
            .try_reduce(SkinStats::default, |mut a, b| {
                a.merge(&b);
                Ok(a)
            })
    }
}
