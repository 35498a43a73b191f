//! MD5 Animation System
//!
//! This module turns clips into model-space joint matrices:
//! - Per-frame pose reconstruction from the baseframe and animated channels
//! - Frame selection and NLerp blending between neighbouring frames
//! - Hierarchy composition with interchangeable solvers
//!
//! # Example
//!
//! ```rust,no_run
//! use md5_model::Model;
//! use md5_model::animation::{AnimationSampler, HierarchyMode, HierarchySolver, Pose};
//!
//! let mut model = Model::load("models/imp.md5mesh")?;
//! let clip = model.load_clip("models/imp_walk.md5anim")?;
//!
//! let mut sampler = AnimationSampler::default();
//! let mut pose = Pose::default();
//! sampler.sample(&model.clips[clip], 0.5, &mut pose)?;
//!
//! let mut matrices = Vec::new();
//! HierarchyMode::TopDown.solve(&pose, &mut matrices)?;
//! # Ok::<(), md5_model::Md5Error>(())
//! ```

mod hierarchy;
mod interpolation;
pub(crate) mod pose;
pub(crate) mod sampler;

pub use hierarchy::{
    HierarchyMode, HierarchySolver, ParentChainSolver, TopDownSolver, bind_matrices,
    global_matrix,
};
pub use interpolation::{FrameSample, blend_poses};
pub use pose::{Pose, PoseJoint};
pub use sampler::{AnimationSampler, RootMotion, SamplerOptions};
