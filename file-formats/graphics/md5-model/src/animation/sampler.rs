//! Sampling a clip at an arbitrary time

use super::interpolation::{FrameSample, blend_poses};
use super::pose::Pose;
use crate::anim::AnimationClip;
use crate::error::{Md5Error, Result};

/// What to do with the root joint's animated translation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootMotion {
    /// Pin joint 0 to the origin so the clip plays in place
    #[default]
    Discard,
    /// Keep the translation stored in the clip
    Keep,
}

/// Options for controlling how clips are sampled
#[derive(Debug, Clone, Default)]
pub struct SamplerOptions {
    /// Frames per second used to map time to frames.
    /// `None` uses each clip's own `frameRate`.
    pub sample_rate: Option<f32>,
    pub root_motion: RootMotion,
}

/// Samples clips into a caller-owned [`Pose`].
///
/// Holds the two per-frame scratch poses so repeated sampling does not
/// allocate once they have grown to the skeleton size.
#[derive(Debug, Clone, Default)]
pub struct AnimationSampler {
    pub options: SamplerOptions,
    scratch: [Pose; 2],
}

impl AnimationSampler {
    pub fn new(options: SamplerOptions) -> Self {
        Self {
            options,
            scratch: Default::default(),
        }
    }

    /// Effective sample rate for `clip`
    pub fn rate_for(&self, clip: &AnimationClip) -> f32 {
        self.options.sample_rate.unwrap_or(clip.frame_rate)
    }

    /// The frames and blend weight `time` maps to in `clip`
    pub fn frame_sample(&self, clip: &AnimationClip, time: f32) -> Result<FrameSample> {
        let rate = self.rate_for(clip);
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(Md5Error::Validation(format!("invalid sample rate {rate}")));
        }
        FrameSample::at(time, rate, clip.num_frames)
    }

    /// Interpolated pose of `clip` at `time` seconds, written to `out`
    pub fn sample(&mut self, clip: &AnimationClip, time: f32, out: &mut Pose) -> Result<FrameSample> {
        let sample = self.frame_sample(clip, time)?;
        let root_motion = self.options.root_motion;
        let [from, to] = &mut self.scratch;

        clip.frame_pose(sample.frame0, root_motion, from)?;
        clip.frame_pose(sample.frame1, root_motion, to)?;
        blend_poses(from, to, sample.alpha, out)?;

        log::trace!(
            "clip '{}' t={time}: frames {} -> {} alpha {:.3}",
            clip.name,
            sample.frame0,
            sample.frame1,
            sample.alpha
        );
        Ok(sample)
    }
}
