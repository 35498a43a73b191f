//! Joint hierarchy composition
//!
//! Turns a [`Pose`] of parent-relative joint transforms into model-space
//! [`JointMatrix`]es. Two solvers share the [`HierarchySolver`] interface:
//!
//! - [`ParentChainSolver`] walks each joint's ancestor chain on its own. It
//!   needs no ordering guarantee and catches cycles, at O(joints x depth).
//! - [`TopDownSolver`] visits joints in index order and reuses the parent's
//!   already computed matrix, which is O(joints) but needs every parent to
//!   precede its children.
//!
//! Both multiply the chain from the root down, so they agree bit for bit on
//! any skeleton the top-down solver accepts.

use super::pose::Pose;
use crate::error::{Md5Error, Result};
use crate::joint::Joint;
use crate::math::JointMatrix;

/// Computes model-space matrices for every joint of a pose
pub trait HierarchySolver {
    /// Fill `out` with one model-space matrix per joint of `pose`
    fn solve(&self, pose: &Pose, out: &mut Vec<JointMatrix>) -> Result<()>;
}

/// Per-joint ancestor walk without memoisation
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentChainSolver;

/// Single pass in index order reusing each parent's result
#[derive(Debug, Clone, Copy, Default)]
pub struct TopDownSolver;

/// Runtime choice between the two solvers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HierarchyMode {
    ParentChain,
    #[default]
    TopDown,
}

impl HierarchySolver for ParentChainSolver {
    fn solve(&self, pose: &Pose, out: &mut Vec<JointMatrix>) -> Result<()> {
        out.clear();
        out.reserve(pose.len());
        let mut chain = Vec::new();
        for index in 0..pose.len() {
            out.push(chain_matrix(pose, index, &mut chain)?);
        }
        Ok(())
    }
}

impl HierarchySolver for TopDownSolver {
    fn solve(&self, pose: &Pose, out: &mut Vec<JointMatrix>) -> Result<()> {
        out.clear();
        out.reserve(pose.len());

        for (index, joint) in pose.joints.iter().enumerate() {
            let local = joint.local_matrix();
            let global = match joint.parent {
                None => local,
                Some(parent) if parent < index => out[parent].mul(&local),
                Some(parent) => {
                    return Err(Md5Error::InvalidHierarchy(format!(
                        "joint {index} has parent {parent}, which does not precede it"
                    )));
                }
            };
            out.push(global);
        }
        Ok(())
    }
}

impl HierarchySolver for HierarchyMode {
    fn solve(&self, pose: &Pose, out: &mut Vec<JointMatrix>) -> Result<()> {
        match self {
            Self::ParentChain => ParentChainSolver.solve(pose, out),
            Self::TopDown => TopDownSolver.solve(pose, out),
        }
    }
}

/// Model-space matrix of a single joint, found by walking its parent chain
pub fn global_matrix(pose: &Pose, index: usize) -> Result<JointMatrix> {
    chain_matrix(pose, index, &mut Vec::new())
}

/// Collect `index` and its ancestors into `chain`, then compose root first
fn chain_matrix(pose: &Pose, index: usize, chain: &mut Vec<usize>) -> Result<JointMatrix> {
    chain.clear();
    let mut current = Some(index);

    while let Some(i) = current {
        let joint = pose.joints.get(i).ok_or_else(|| {
            Md5Error::InvalidHierarchy(format!(
                "joint {index} reaches ancestor {i}, but the pose has {} joints",
                pose.len()
            ))
        })?;
        if chain.len() >= pose.len() {
            return Err(Md5Error::InvalidHierarchy(format!(
                "parent chain of joint {index} contains a cycle"
            )));
        }
        chain.push(i);
        current = joint.parent;
    }

    let mut joints = chain.iter().rev().map(|&i| pose.joints[i].local_matrix());
    let root = joints.next().unwrap_or_default();
    Ok(joints.fold(root, |acc, local| acc.mul(&local)))
}

/// Bind-pose matrices for a mesh skeleton.
///
/// Joints in a `.md5mesh` file are already expressed in model space, so each
/// joint's own transform is its bind matrix with no parent composition.
pub fn bind_matrices(joints: &[Joint], out: &mut Vec<JointMatrix>) {
    out.clear();
    out.extend(joints.iter().map(Joint::matrix));
}
