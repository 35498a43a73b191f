//! `pose`: evaluate one frame of a clip and print or export it

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use md5_model::animation::{HierarchyMode, RootMotion, SamplerOptions};
use md5_model::skinning::{SkinStats, SkinnedMesh, SkinningOptions};
use md5_model::{Animator, FrameState, JointMatrix, Model, ParseOptions};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::utils::{add_table_row, create_table, format_parent, format_vec3, load_model};

#[derive(Args, Debug)]
pub struct PoseArgs {
    /// Path to the .md5mesh file
    pub mesh: PathBuf,

    /// Animation files to bind to the model
    #[arg(short, long = "anim", value_name = "FILE", required = true)]
    pub anims: Vec<PathBuf>,

    /// Animation to evaluate (defaults to the first one loaded)
    #[arg(short, long)]
    pub clip: Option<String>,

    /// Time in seconds
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub time: f32,

    /// Frames per second (defaults to the animation's frameRate)
    #[arg(long)]
    pub rate: Option<f32>,

    /// Keep the root joint's animated translation
    #[arg(long)]
    pub keep_root_motion: bool,

    /// Hierarchy solver
    #[arg(long, value_enum, default_value_t = Solver::TopDown)]
    pub solver: Solver,

    /// Fail on degenerate triangles instead of substituting fallbacks
    #[arg(long)]
    pub strict: bool,

    /// Write skinned meshes and joint matrices as JSON
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Solver {
    /// Walk each joint's parent chain
    ParentChain,
    /// Single pass in joint order
    TopDown,
}

impl From<Solver> for HierarchyMode {
    fn from(solver: Solver) -> Self {
        match solver {
            Solver::ParentChain => HierarchyMode::ParentChain,
            Solver::TopDown => HierarchyMode::TopDown,
        }
    }
}

/// JSON document written by `--output`
#[derive(Serialize)]
pub struct PoseExport<'a> {
    pub clip: &'a str,
    pub time: f32,
    pub frame0: usize,
    pub frame1: usize,
    pub alpha: f32,
    pub joints: Vec<JointExport<'a>>,
    pub meshes: &'a [SkinnedMesh],
    pub stats: SkinStats,
}

#[derive(Serialize)]
pub struct JointExport<'a> {
    pub name: &'a str,
    pub parent: Option<usize>,
    pub matrix: &'a JointMatrix,
}

pub fn execute(args: &PoseArgs) -> Result<()> {
    let model = load_model(&args.mesh, &args.anims, &ParseOptions::default())?;

    let clip_index = match &args.clip {
        Some(name) => model.require_clip(name)?,
        None => 0,
    };
    let clip = model
        .clips
        .get(clip_index)
        .context("No animation loaded")?;

    let sampler = SamplerOptions {
        sample_rate: args.rate,
        root_motion: if args.keep_root_motion {
            RootMotion::Keep
        } else {
            RootMotion::Discard
        },
    };
    let skinning = SkinningOptions {
        strict: args.strict,
        ..SkinningOptions::default()
    };

    let mut animator = Animator::new(sampler, args.solver.into(), skinning);
    let mut state = FrameState::default();
    animator
        .evaluate(&model, Some(clip_index), args.time, &mut state)
        .with_context(|| format!("Failed to evaluate '{}' at {}s", clip.name, args.time))?;

    if let Some(sample) = state.sample {
        println!(
            "{} @ {:.3}s: frame {} -> {} (alpha {:.3})",
            clip.name, args.time, sample.frame0, sample.frame1, sample.alpha
        );
    }
    println!();
    print_joints(&model, &state);
    println!();
    print_meshes(&model, &state);

    if let Some(output) = &args.output {
        write_json(output, &export(&model, clip_index, args.time, &state))?;
        println!();
        println!("Wrote {}", output.display());
    }

    Ok(())
}

fn print_joints(model: &Model, state: &FrameState) {
    let mut table = create_table(&["#", "Name", "Parent", "Position"]);
    for (i, (joint, matrix)) in model.joints.iter().zip(&state.matrices).enumerate() {
        add_table_row(
            &mut table,
            [
                i.to_string(),
                joint.name.clone(),
                format_parent(joint.parent),
                format_vec3(matrix.translation()),
            ],
        );
    }
    table.printstd();
}

fn print_meshes(model: &Model, state: &FrameState) {
    let mut table = create_table(&["#", "Shader", "Vertices", "Indices"]);
    for (i, (mesh, skinned)) in model.meshes.iter().zip(&state.meshes).enumerate() {
        add_table_row(
            &mut table,
            [
                i.to_string(),
                mesh.shader.clone(),
                skinned.vertices.len().to_string(),
                skinned.indices.len().to_string(),
            ],
        );
    }
    table.printstd();

    let stats = &state.stats;
    println!(
        "Degenerate triangles: {}, degenerate tangent frames: {}, fallback vertices: {}",
        stats.degenerate_faces, stats.degenerate_tangents, stats.fallback_vertices
    );
}

/// Collect a frame into its JSON shape
pub fn export<'a>(
    model: &'a Model,
    clip_index: usize,
    time: f32,
    state: &'a FrameState,
) -> PoseExport<'a> {
    let sample = state.sample.unwrap_or_default();
    PoseExport {
        clip: model
            .clips
            .get(clip_index)
            .map_or("", |clip| clip.name.as_str()),
        time,
        frame0: sample.frame0,
        frame1: sample.frame1,
        alpha: sample.alpha,
        joints: model
            .joints
            .iter()
            .zip(&state.matrices)
            .map(|(joint, matrix)| JointExport {
                name: &joint.name,
                parent: joint.parent,
                matrix,
            })
            .collect(),
        meshes: &state.meshes,
        stats: state.stats,
    }
}

fn write_json(path: &Path, export: &PoseExport<'_>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, export)
        .with_context(|| format!("Failed to write JSON: {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
