//! Keyframe animation clips loaded from `.md5anim` files

use crate::animation::pose::{Pose, PoseJoint};
use crate::animation::sampler::RootMotion;
use crate::error::{Md5Error, Result};
use crate::joint::ChannelMask;
use crate::math::compute_quat_w;
use crate::parser::{parse_anim, read_source};
use glam::{Quat, Vec3};
use std::path::Path;

#[cfg(feature = "serde-support")]
use serde::Serialize;

/// Axis-aligned bounding box of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize))]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

/// Hierarchy and baseframe entry for one joint of a clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedJoint {
    pub name: String,
    pub parent: Option<usize>,
    pub channels: ChannelMask,
    /// Offset of this joint's first animated value within a frame
    pub first_component: usize,
    pub base_translation: Vec3,
    pub base_orientation: Quat,
}

/// A keyframe animation bound to a skeleton by joint order
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Frames per second as stored in the file
    pub frame_rate: f32,
    pub num_frames: usize,
    pub num_animated_components: usize,
    pub joints: Vec<AnimatedJoint>,
    /// One box per frame; empty if the file had no bounds block
    pub bounds: Vec<Bounds>,
    /// `num_frames * num_animated_components` values, frame-major
    pub frame_data: Vec<f32>,
}

impl AnimationClip {
    /// Load a clip from disk, naming it after the file stem
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let src = read_source(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let clip = parse_anim(&name, &src)?;
        log::info!(
            "Loaded clip '{}' from {}: {} frames at {} fps, {} joints",
            clip.name,
            path.display(),
            clip.num_frames,
            clip.frame_rate,
            clip.joints.len()
        );
        Ok(clip)
    }

    /// Animated values for frame `index`
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let n = self.num_animated_components;
        let start = index.checked_mul(n)?;
        self.frame_data.get(start..start + n)
    }

    /// Length of one loop in seconds at the stored frame rate
    pub fn duration(&self) -> f32 {
        self.num_frames as f32 / self.frame_rate
    }

    /// Reconstruct the full pose of frame `index` into `out`.
    ///
    /// Each joint starts from its baseframe, then flagged channels are
    /// overwritten in tx, ty, tz, qx, qy, qz order and w is recomputed.
    /// With [`RootMotion::Discard`] joint 0 ends up at the origin.
    pub fn frame_pose(&self, index: usize, root_motion: RootMotion, out: &mut Pose) -> Result<()> {
        let values = self.frame(index).ok_or(Md5Error::InvalidFrame {
            frame: index,
            num_frames: self.num_frames,
        })?;

        out.joints.clear();
        out.joints.reserve(self.joints.len());

        for (i, joint) in self.joints.iter().enumerate() {
            let t = joint.base_translation;
            let q = joint.base_orientation;
            let mut components = [t.x, t.y, t.z, q.x, q.y, q.z];

            let start = joint.first_component;
            let end = start + joint.channels.component_count();
            let mut animated = values
                .get(start..end)
                .ok_or_else(|| {
                    Md5Error::Validation(format!(
                        "joint '{}' reads components {start}..{end} past the frame",
                        joint.name
                    ))
                })?
                .iter()
                .copied();

            for (slot, channel) in components.iter_mut().zip(ChannelMask::ORDER) {
                if joint.channels.contains(channel)
                    && let Some(v) = animated.next()
                {
                    *slot = v;
                }
            }

            let [tx, ty, tz, qx, qy, qz] = components;
            let translation = if i == 0 && root_motion == RootMotion::Discard {
                Vec3::ZERO
            } else {
                Vec3::new(tx, ty, tz)
            };

            out.joints.push(PoseJoint {
                parent: joint.parent,
                translation,
                orientation: Quat::from_xyzw(qx, qy, qz, compute_quat_w(qx, qy, qz)),
            });
        }

        log::trace!("clip '{}': built pose for frame {index}", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn clip() -> AnimationClip {
        AnimationClip {
            name: "sway".to_string(),
            frame_rate: 10.0,
            num_frames: 2,
            num_animated_components: 4,
            joints: vec![
                AnimatedJoint {
                    name: "origin".to_string(),
                    parent: None,
                    channels: ChannelMask::TX | ChannelMask::TZ,
                    first_component: 0,
                    base_translation: Vec3::new(9.0, 9.0, 9.0),
                    base_orientation: Quat::from_xyzw(0.0, 0.0, 0.0, -1.0),
                },
                AnimatedJoint {
                    name: "arm".to_string(),
                    parent: Some(0),
                    channels: ChannelMask::TY | ChannelMask::QZ,
                    first_component: 2,
                    base_translation: Vec3::new(0.0, 0.0, 1.0),
                    base_orientation: Quat::from_xyzw(0.0, 0.0, 0.0, -1.0),
                },
            ],
            bounds: Vec::new(),
            frame_data: vec![1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, FRAC_1_SQRT_2],
        }
    }

    #[test]
    fn test_frame_slices() {
        let clip = clip();
        assert_eq!(clip.frame(1), Some(&[4.0, 5.0, 6.0, FRAC_1_SQRT_2][..]));
        assert!(clip.frame(2).is_none());
        assert_eq!(clip.duration(), 0.2);
    }

    #[test]
    fn test_frame_pose_channel_order() {
        let clip = clip();
        let mut pose = Pose::default();
        clip.frame_pose(1, RootMotion::Keep, &mut pose).unwrap();

        // Root: TX and TZ animated, TY from the baseframe
        assert_eq!(pose.joints[0].translation, Vec3::new(4.0, 9.0, 5.0));
        // Arm: TY then QZ
        assert_eq!(pose.joints[1].translation, Vec3::new(0.0, 6.0, 1.0));
        let q = pose.joints[1].orientation;
        assert_eq!(q.z, FRAC_1_SQRT_2);
        assert!(q.w <= 0.0);
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_root_motion_discarded() {
        let clip = clip();
        let mut pose = Pose::default();
        for frame in 0..clip.num_frames {
            clip.frame_pose(frame, RootMotion::Discard, &mut pose).unwrap();
            assert_eq!(pose.joints[0].translation, Vec3::ZERO);
        }
    }

    #[test]
    fn test_invalid_frame() {
        let clip = clip();
        let mut pose = Pose::default();
        let err = clip.frame_pose(5, RootMotion::Discard, &mut pose).unwrap_err();
        assert!(matches!(err, Md5Error::InvalidFrame { frame: 5, num_frames: 2 }));
    }
}
