//! `tree`: the joint hierarchy, meshes and clips as a tree

use anyhow::Result;
use md5_model::{Model, ParseOptions};
use std::path::{Path, PathBuf};

use crate::utils::{
    NodeType, TreeNode, TreeOptions, display_name, format_seconds, format_vec3, load_model,
    render_tree,
};

pub fn execute(
    mesh: &Path,
    anims: &[PathBuf],
    depth: Option<usize>,
    no_color: bool,
    compact: bool,
) -> Result<()> {
    let model = load_model(mesh, anims, &ParseOptions::default())?;
    let root = build_tree(&display_name(mesh), &model);

    let options = TreeOptions {
        max_depth: depth,
        no_color,
        compact,
        ..TreeOptions::default()
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

/// Build the display tree for a loaded model
pub fn build_tree(name: &str, model: &Model) -> TreeNode {
    let mut children = vec![Vec::new(); model.joints.len()];
    let mut roots = Vec::new();
    for (i, joint) in model.joints.iter().enumerate() {
        match joint.parent {
            Some(parent) => children[parent].push(i),
            None => roots.push(i),
        }
    }

    let mut skeleton = TreeNode::new("Skeleton", NodeType::Group)
        .with_metadata("joints", model.joints.len());
    for &i in &roots {
        skeleton = skeleton.add_child(joint_node(model, &children, i));
    }

    let mut meshes = TreeNode::new("Meshes", NodeType::Group);
    for mesh in &model.meshes {
        meshes = meshes.add_child(
            TreeNode::new(mesh.shader.as_str(), NodeType::Mesh)
                .with_metadata("verts", mesh.vertices.len())
                .with_metadata("tris", mesh.triangles.len())
                .with_metadata("weights", mesh.weights.len()),
        );
    }

    let mut root = TreeNode::new(name, NodeType::Root)
        .with_metadata("version", model.version)
        .add_child(skeleton)
        .add_child(meshes);

    if !model.clips.is_empty() {
        let mut clips = TreeNode::new("Animations", NodeType::Group);
        for clip in &model.clips {
            clips = clips.add_child(
                TreeNode::new(clip.name.as_str(), NodeType::Clip)
                    .with_metadata("frames", clip.num_frames)
                    .with_metadata("rate", clip.frame_rate)
                    .with_metadata("duration", format_seconds(clip.duration())),
            );
        }
        root = root.add_child(clips);
    }

    root
}

fn joint_node(model: &Model, children: &[Vec<usize>], index: usize) -> TreeNode {
    let joint = &model.joints[index];
    let mut node = TreeNode::new(joint.name.as_str(), NodeType::Joint)
        .with_metadata("index", index)
        .with_metadata("pos", format_vec3(joint.translation));
    for &child in &children[index] {
        node = node.add_child(joint_node(model, children, child));
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use md5_model::Joint;

    #[test]
    fn test_joint_nesting() {
        let model = Model {
            joints: vec![
                Joint::new("root", None, Vec3::ZERO, Vec3::ZERO),
                Joint::new("spine", Some(0), Vec3::Z, Vec3::ZERO),
                Joint::new("head", Some(1), Vec3::Z, Vec3::ZERO),
                Joint::new("tail", Some(0), -Vec3::Z, Vec3::ZERO),
            ],
            ..Model::default()
        };

        let tree = build_tree("test", &model);
        let skeleton = &tree.children[0];
        assert_eq!(skeleton.children.len(), 1);

        let root = &skeleton.children[0];
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["spine", "tail"]);
        assert_eq!(root.children[0].children[0].name, "head");
    }
}
