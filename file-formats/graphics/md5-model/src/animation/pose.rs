//! Per-frame joint poses

use crate::joint::Joint;
use crate::math::JointMatrix;
use glam::{Quat, Vec3};

/// Local transform of one joint in a pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseJoint {
    pub parent: Option<usize>,
    pub translation: Vec3,
    pub orientation: Quat,
}

impl Default for PoseJoint {
    fn default() -> Self {
        Self {
            parent: None,
            translation: Vec3::ZERO,
            // Stored (0, 0, 0) reconstructs to w = -1
            orientation: Quat::from_xyzw(0.0, 0.0, 0.0, -1.0),
        }
    }
}

impl PoseJoint {
    pub fn local_matrix(&self) -> JointMatrix {
        JointMatrix::from_rotation_translation(self.orientation, self.translation)
    }
}

/// Caller-owned scratch pose, overwritten on each evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    pub joints: Vec<PoseJoint>,
}

impl Pose {
    pub fn with_capacity(joint_count: usize) -> Self {
        Self {
            joints: Vec::with_capacity(joint_count),
        }
    }

    /// Pose holding the given skeleton's own transforms
    pub fn from_joints(joints: &[Joint]) -> Self {
        Self {
            joints: joints
                .iter()
                .map(|j| PoseJoint {
                    parent: j.parent,
                    translation: j.translation,
                    orientation: j.orientation,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}
