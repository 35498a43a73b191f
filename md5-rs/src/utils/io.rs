//! Loading and path utilities

use anyhow::{Context, Result};
use md5_model::{Model, ParseOptions};
use std::path::Path;

/// Load a mesh and bind each animation to it, in order
pub fn load_model(mesh: &Path, anims: &[impl AsRef<Path>], options: &ParseOptions) -> Result<Model> {
    let mut model = Model::load_with_options(mesh, options)
        .with_context(|| format!("Failed to load mesh: {}", mesh.display()))?;

    for anim in anims {
        let anim = anim.as_ref();
        model
            .load_clip(anim)
            .with_context(|| format!("Failed to load animation: {}", anim.display()))?;
    }

    Ok(model)
}

/// File name of `path` for display, falling back to the full path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| path.display().to_string(), str::to_string)
}
