//! `info`: summary tables for a model and its clips

use anyhow::Result;
use md5_model::{Model, ParseOptions};
use std::path::{Path, PathBuf};

use crate::utils::{
    add_table_row, create_summary_table, create_table, display_name, format_parent, format_quat,
    format_seconds, format_vec3, load_model,
};

pub fn execute(mesh: &Path, anims: &[PathBuf], detailed: bool) -> Result<()> {
    let model = load_model(mesh, anims, &ParseOptions::default())?;

    println!("MD5 Model: {}", display_name(mesh));
    println!();
    print_summary(&model);

    if detailed {
        println!();
        println!("Joints:");
        print_joints(&model);
    }

    println!();
    println!("Meshes:");
    print_meshes(&model);

    if !model.clips.is_empty() {
        println!();
        println!("Animations:");
        print_clips(&model, detailed);
    }

    Ok(())
}

fn print_summary(model: &Model) {
    let command_line = if model.command_line.is_empty() {
        "-".to_string()
    } else {
        model.command_line.clone()
    };
    create_summary_table(&[
        ("Version", model.version.to_string()),
        ("Command line", command_line),
        ("Joints", model.joints.len().to_string()),
        ("Meshes", model.meshes.len().to_string()),
        ("Vertices", model.vertex_count().to_string()),
        ("Triangles", model.triangle_count().to_string()),
        ("Weights", model.weight_count().to_string()),
        ("Animations", model.clips.len().to_string()),
    ])
    .printstd();
}

fn print_joints(model: &Model) {
    let mut table = create_table(&["#", "Name", "Parent", "Position", "Orientation"]);
    for (i, joint) in model.joints.iter().enumerate() {
        add_table_row(
            &mut table,
            [
                i.to_string(),
                joint.name.clone(),
                format_parent(joint.parent),
                format_vec3(joint.translation),
                format_quat(joint.orientation),
            ],
        );
    }
    table.printstd();
}

fn print_meshes(model: &Model) {
    let mut table = create_table(&["#", "Shader", "Vertices", "Triangles", "Weights"]);
    for (i, mesh) in model.meshes.iter().enumerate() {
        add_table_row(
            &mut table,
            [
                i.to_string(),
                mesh.shader.clone(),
                mesh.vertices.len().to_string(),
                mesh.triangles.len().to_string(),
                mesh.weights.len().to_string(),
            ],
        );
    }
    table.printstd();
}

fn print_clips(model: &Model, detailed: bool) {
    let mut headers = vec!["#", "Name", "Frames", "Rate", "Duration"];
    if detailed {
        headers.extend(["Components", "Bounds"]);
    }

    let mut table = create_table(&headers);
    for (i, clip) in model.clips.iter().enumerate() {
        let mut row = vec![
            i.to_string(),
            clip.name.clone(),
            clip.num_frames.to_string(),
            format!("{}", clip.frame_rate),
            format_seconds(clip.duration()),
        ];
        if detailed {
            row.push(clip.num_animated_components.to_string());
            row.push(clip.bounds.len().to_string());
        }
        add_table_row(&mut table, row);
    }
    table.printstd();
}
