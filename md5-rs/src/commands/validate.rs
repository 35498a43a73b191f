//! `validate`: load with full checks and report the outcome

use anyhow::{Context, Result};
use console::style;
use md5_model::animation::{HierarchyMode, SamplerOptions};
use md5_model::skinning::SkinningOptions;
use md5_model::{Animator, FrameState, ParseOptions};
use std::path::{Path, PathBuf};

use crate::utils::{display_name, load_model};

pub fn execute(mesh: &Path, anims: &[PathBuf], tolerance: f32, strict: bool) -> Result<()> {
    let options = ParseOptions {
        weight_sum_tolerance: tolerance,
        validate_weight_sums: true,
    };

    let model = match load_model(mesh, anims, &options) {
        Ok(model) => model,
        Err(err) => anyhow::bail!("Validation failed: {err:#}"),
    };

    // Skin the bind pose and the first frame of every clip
    let mut animator = Animator::new(
        SamplerOptions::default(),
        HierarchyMode::default(),
        SkinningOptions {
            strict,
            ..SkinningOptions::default()
        },
    );
    let mut state = FrameState::default();

    animator
        .evaluate(&model, None, 0.0, &mut state)
        .context("Validation failed: bind pose")?;
    report_stats("bind pose", &state);

    for (i, clip) in model.clips.iter().enumerate() {
        animator
            .evaluate(&model, Some(i), 0.0, &mut state)
            .with_context(|| format!("Validation failed: animation '{}'", clip.name))?;
        report_stats(&clip.name, &state);
    }

    println!(
        "✓ '{}' is valid ({} joints, {} meshes, {} animations)",
        style(display_name(mesh)).cyan(),
        model.joints.len(),
        model.meshes.len(),
        model.clips.len()
    );
    Ok(())
}

fn report_stats(what: &str, state: &FrameState) {
    let stats = &state.stats;
    if !stats.is_clean() {
        println!(
            "{} {what}: {} degenerate triangles, {} degenerate tangent frames, {} vertices used fallbacks",
            style("warning:").yellow(),
            stats.degenerate_faces,
            stats.degenerate_tangents,
            stats.fallback_vertices
        );
    }
}
