// Re-export main components
pub mod anim;
pub mod animation;
pub mod error;
pub mod frame;
pub mod joint;
pub mod math;
pub mod mesh;
pub mod model;
pub mod parser;
pub mod skinning;

// Re-export common types
pub use anim::{AnimatedJoint, AnimationClip, Bounds};
pub use error::{Md5Error, Result};
pub use frame::{Animator, FrameState};
pub use joint::{ChannelMask, Joint};
pub use math::JointMatrix;
pub use mesh::{Mesh, Triangle, Vertex, Weight};
pub use model::Model;
pub use parser::{ParseOptions, parse_anim, parse_mesh};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
