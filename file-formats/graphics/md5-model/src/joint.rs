//! Bind-pose skeleton joints

use crate::error::{Md5Error, Result};
use crate::math::{JointMatrix, quat_from_xyz};
use bitflags::bitflags;
use glam::{Quat, Vec3};

bitflags! {
    /// Animated degrees of freedom for a joint, as stored in `.md5anim` hierarchies.
    ///
    /// Animated values are consumed from a frame in bit order.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ChannelMask: u32 {
        /// Translation x
        const TX = 0x01;
        /// Translation y
        const TY = 0x02;
        /// Translation z
        const TZ = 0x04;
        /// Quaternion x
        const QX = 0x08;
        /// Quaternion y
        const QY = 0x10;
        /// Quaternion z
        const QZ = 0x20;
    }
}

impl ChannelMask {
    /// Channels in the order their values appear in a frame
    pub const ORDER: [Self; 6] = [Self::TX, Self::TY, Self::TZ, Self::QX, Self::QY, Self::QZ];

    /// Number of frame values this joint consumes
    pub fn component_count(self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Parse raw flags, rejecting bits outside the six known channels
    pub fn from_raw(bits: u32) -> Result<Self> {
        Self::from_bits(bits).ok_or_else(|| {
            Md5Error::Validation(format!("unknown animation channel flags 0x{bits:x}"))
        })
    }
}

/// A joint of the bind-pose skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint, `None` for a root
    pub parent: Option<usize>,
    pub channels: ChannelMask,
    pub translation: Vec3,
    /// Unit quaternion with w reconstructed from the stored vector part
    pub orientation: Quat,
}

impl Joint {
    /// Create a joint from the stored position and quaternion vector part
    pub fn new(name: impl Into<String>, parent: Option<usize>, translation: Vec3, q_xyz: Vec3) -> Self {
        Self {
            name: name.into(),
            parent,
            channels: ChannelMask::empty(),
            translation,
            orientation: quat_from_xyz(q_xyz),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The joint's own transform
    pub fn matrix(&self) -> JointMatrix {
        JointMatrix::from_rotation_translation(self.orientation, self.translation)
    }
}

/// Convert a stored parent index (`-1` for none) to an optional index
pub(crate) fn parent_from_raw(raw: i32) -> Result<Option<usize>> {
    match raw {
        -1 => Ok(None),
        p if p >= 0 => Ok(Some(p as usize)),
        p => Err(Md5Error::InvalidHierarchy(format!(
            "parent index {p} is negative"
        ))),
    }
}

/// Check that every parent link points at an earlier joint.
///
/// This rules out cycles and lets the hierarchy be solved in one pass.
pub fn validate_parents<I>(parents: I) -> Result<()>
where
    I: IntoIterator<Item = Option<usize>>,
{
    for (index, parent) in parents.into_iter().enumerate() {
        if let Some(parent) = parent
            && parent >= index
        {
            return Err(Md5Error::InvalidHierarchy(format!(
                "joint {index} has parent {parent}, which does not precede it"
            )));
        }
    }
    Ok(())
}
