//! Main entry point for the md5-rs CLI

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use std::io;

use md5_rs::cli::{Cli, Commands};
use md5_rs::commands;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Set verbosity
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    // Execute command
    match cli.command {
        Commands::Info {
            mesh,
            anims,
            detailed,
        } => commands::info::execute(&mesh, &anims, detailed),
        Commands::Tree {
            mesh,
            anims,
            depth,
            no_color,
            compact,
        } => commands::tree::execute(&mesh, &anims, depth, no_color, compact),
        Commands::Validate {
            mesh,
            anims,
            tolerance,
            strict,
        } => commands::validate::execute(&mesh, &anims, tolerance, strict),
        Commands::Pose(args) => commands::pose::execute(&args),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
