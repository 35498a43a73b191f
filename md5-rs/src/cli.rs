//! Root CLI structure for md5-rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::pose::PoseArgs;

#[derive(Parser)]
#[command(name = "md5-rs")]
#[command(about = "Command-line tools for id Tech 4 MD5 models and animations", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display information about a model and its animations
    Info {
        /// Path to the .md5mesh file
        mesh: PathBuf,

        /// Animation files to bind to the model
        #[arg(short, long = "anim", value_name = "FILE")]
        anims: Vec<PathBuf>,

        /// Show per-joint and per-clip detail
        #[arg(short, long)]
        detailed: bool,
    },

    /// Display the joint hierarchy and meshes as a tree
    Tree {
        /// Path to the .md5mesh file
        mesh: PathBuf,

        /// Animation files to list under the model
        #[arg(short, long = "anim", value_name = "FILE")]
        anims: Vec<PathBuf>,

        /// Maximum depth to display
        #[arg(long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show compact metadata inline
        #[arg(long)]
        compact: bool,
    },

    /// Load a model with full validation and report the result
    Validate {
        /// Path to the .md5mesh file
        mesh: PathBuf,

        /// Animation files that must bind to the model
        #[arg(short, long = "anim", value_name = "FILE")]
        anims: Vec<PathBuf>,

        /// Allowed deviation of each vertex's weight biases from 1.0
        #[arg(long, default_value_t = 0.01)]
        tolerance: f32,

        /// Fail on degenerate triangles in the bind pose
        #[arg(long)]
        strict: bool,
    },

    /// Evaluate one animation frame and report or export the result
    Pose(PoseArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
