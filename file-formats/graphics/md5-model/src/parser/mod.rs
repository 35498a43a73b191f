//! Text parsers for `.md5mesh` and `.md5anim` files

mod anim;
pub(crate) mod lexer;
mod mesh;

pub use anim::parse_anim;
pub use mesh::parse_mesh;

use crate::error::{Md5Error, Result};
use std::fs;
use std::path::Path;

/// Format version written by the id Tech 4 exporters
pub const MD5_VERSION: i32 = 10;

/// Options controlling mesh validation
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Allowed distance of a vertex's weight sum from 1.0
    pub weight_sum_tolerance: f32,
    /// Reject meshes whose vertex weights do not sum to 1.0
    pub validate_weight_sums: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            weight_sum_tolerance: 0.01,
            validate_weight_sums: true,
        }
    }
}

/// Read a whole asset file, mapping open failures to [`Md5Error::FileOpen`]
pub(crate) fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Md5Error::FileOpen {
        path: path.to_path_buf(),
        source,
    })
}

/// Check a version header, warning on anything other than [`MD5_VERSION`]
pub(crate) fn check_version(version: i32, line: usize) {
    if version != MD5_VERSION {
        log::warn!("line {line}: MD5Version {version} (expected {MD5_VERSION}), continuing");
    }
}
