//! Frame selection and pose blending

use super::pose::{Pose, PoseJoint};
use crate::error::{Md5Error, Result};
use crate::math::nlerp;

#[cfg(feature = "serde-support")]
use serde::Serialize;

/// Largest `f32` below 1.0
const MAX_ALPHA: f32 = 1.0 - f32::EPSILON / 2.0;

/// The pair of frames bracketing a sample time and the blend weight between them
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize))]
pub struct FrameSample {
    pub frame0: usize,
    pub frame1: usize,
    /// Weight of `frame1`, in `[0, 1)`
    pub alpha: f32,
}

impl FrameSample {
    /// Locate `time` (seconds) in a looping clip sampled at `sample_rate` frames per second.
    ///
    /// Times past the end wrap around, and negative times wrap backwards,
    /// so both frames are always below `num_frames`.
    pub fn at(time: f32, sample_rate: f32, num_frames: usize) -> Result<Self> {
        if num_frames == 0 {
            return Err(Md5Error::InvalidFrame {
                frame: 0,
                num_frames,
            });
        }

        let anim_time = f64::from(time) * f64::from(sample_rate);
        if !anim_time.is_finite() {
            return Err(Md5Error::InvalidTime(time));
        }

        let whole = anim_time.floor();
        let alpha = ((anim_time - whole) as f32).min(MAX_ALPHA);
        let frame0 = (whole as i64).rem_euclid(num_frames as i64) as usize;
        let frame1 = (frame0 + 1) % num_frames;

        Ok(Self {
            frame0,
            frame1,
            alpha,
        })
    }
}

/// Blend two poses of the same skeleton into `out`.
///
/// Translations are interpolated linearly and orientations with
/// [`nlerp`]. Parent links are taken from `from`.
pub fn blend_poses(from: &Pose, to: &Pose, alpha: f32, out: &mut Pose) -> Result<()> {
    if from.len() != to.len() {
        return Err(Md5Error::Validation(format!(
            "cannot blend poses with {} and {} joints",
            from.len(),
            to.len()
        )));
    }

    out.joints.clear();
    out.joints.extend(from.joints.iter().zip(&to.joints).map(|(a, b)| PoseJoint {
        parent: a.parent,
        translation: a.translation.lerp(b.translation, alpha),
        orientation: nlerp(a.orientation, b.orientation, alpha),
    }));
    Ok(())
}
