//! Integration tests for MD5 mesh and animation parsing

use md5_model::{ChannelMask, Md5Error, Model, ParseOptions, parse_anim, parse_mesh};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use test_case::test_case;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn test_minimal_mesh() {
    let src = r#"
MD5Version 10
numJoints 1
numMeshes 1
joints {
    "origin" -1 ( 0 0 0 ) ( 0 0 0 )
}
mesh {
    shader "dot"
    numverts 1
    vert 0 ( 0 0 ) 0 1
    numtris 0
    numweights 1
    weight 0 0 1 ( 0 0 0 )
}
"#;
    let model = parse_mesh(src, &ParseOptions::default()).unwrap();
    assert_eq!(model.joints.len(), 1);
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.meshes[0].vertices.len(), 1);
    assert_eq!(model.meshes[0].triangles.len(), 0);
}

#[test]
fn test_bone_fixture() {
    let model = Model::load(data("bone.md5mesh")).unwrap();

    assert_eq!(model.version, 10);
    assert_eq!(model.command_line, "mesh models/test/bone.ma -game base");
    let names: Vec<&str> = model.joints.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["root", "arm"]);
    assert_eq!(model.joints[1].parent, Some(0));

    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.meshes[0].shader, "models/test/bone");
    assert_eq!(model.vertex_count(), 4);
    assert_eq!(model.triangle_count(), 2);
    assert_eq!(model.weight_count(), 5);
    assert_eq!(model.meshes[0].vertices[3].weight_range(), 3..5);
}

#[test]
fn test_wave_fixture() {
    let src = std::fs::read_to_string(data("wave.md5anim")).unwrap();
    let clip = parse_anim("wave", &src).unwrap();

    assert_eq!(clip.num_frames, 3);
    assert_eq!(clip.frame_rate, 24.0);
    assert_eq!(clip.joints.len(), 2);
    assert_eq!(clip.joints[0].channels, ChannelMask::TX | ChannelMask::TY | ChannelMask::TZ);
    assert_eq!(clip.joints[1].first_component, 3);
    assert_eq!(clip.bounds.len(), 3);
    assert_eq!(clip.frame(2).unwrap(), &[10.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_clip_bound_to_model() {
    let mut model = Model::load(data("bone.md5mesh")).unwrap();
    let index = model.load_clip(data("wave.md5anim")).unwrap();
    assert_eq!(index, 0);
    assert_eq!(model.clips[0].name, "wave");
    assert_eq!(model.require_clip("wave").unwrap(), 0);
}

#[test]
fn test_failed_clip_keeps_previous_assets() {
    let mut model = Model::load(data("bone.md5mesh")).unwrap();
    model.load_clip(data("wave.md5anim")).unwrap();

    let src = std::fs::read_to_string(data("wave.md5anim")).unwrap();
    let broken = src.replace("\"arm\"\t0 56 3", "\"hand\"\t0 56 3");
    let clip = parse_anim("broken", &broken).unwrap();

    let err = model.add_clip(clip).unwrap_err();
    assert!(matches!(err, Md5Error::TopologyMismatch { .. }));
    assert_eq!(model.clips.len(), 1);
    assert_eq!(model.clips[0].name, "wave");
}

#[test]
fn test_missing_file() {
    let err = Model::load(data("missing.md5mesh")).unwrap_err();
    match err {
        Md5Error::FileOpen { path, .. } => assert!(path.ends_with("missing.md5mesh")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test_case("numverts 4", "numverts 3" ; "vertex index past count")]
#[test_case("tri 1 1 2 3", "tri 1 1 2 4" ; "triangle index past vertex count")]
#[test_case("weight 2 1 1", "weight 2 2 1" ; "weight joint past skeleton")]
#[test_case("( 0 1 -1 )", "( 0 1 )" ; "short vector")]
#[test_case("numweights 5", "numweights five" ; "malformed count")]
#[test_case("joints {", "joints" ; "missing brace")]
fn test_corrupt_mesh_is_parse_error(from: &str, to: &str) {
    let src = std::fs::read_to_string(data("bone.md5mesh")).unwrap();
    assert!(src.contains(from));
    let corrupt = src.replace(from, to);
    let err = parse_mesh(&corrupt, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, Md5Error::Parse { .. }), "got {err:?}");
}

#[test]
fn test_weight_tolerance() {
    let src = std::fs::read_to_string(data("bone.md5mesh"))
        .unwrap()
        .replace("weight 4 1 0.5", "weight 4 1 0.495");

    assert!(parse_mesh(&src, &ParseOptions::default()).is_ok());

    let tight = ParseOptions {
        weight_sum_tolerance: 0.001,
        ..ParseOptions::default()
    };
    assert!(matches!(
        parse_mesh(&src, &tight),
        Err(Md5Error::Validation(_))
    ));
}

#[test]
fn test_load_from_written_files() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir().unwrap();
    let mesh_path = dir.path().join("copy.md5mesh");
    let anim_path = dir.path().join("idle.md5anim");
    std::fs::copy(data("bone.md5mesh"), &mesh_path).unwrap();
    std::fs::copy(data("wave.md5anim"), &anim_path).unwrap();

    let mut model = Model::load(&mesh_path).unwrap();
    let index = model.load_clip(&anim_path).unwrap();
    assert_eq!(model.clips[index].name, "idle");
    assert_eq!(model.clip_index("idle"), Some(index));
}

#[test]
fn test_truncated_file_is_parse_error() {
    let src = std::fs::read_to_string(data("bone.md5mesh")).unwrap();
    let cut = &src[..src.find("numweights").unwrap()];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.md5mesh");
    std::fs::write(&path, cut).unwrap();

    let err = Model::load(&path).unwrap_err();
    assert!(matches!(err, Md5Error::Parse { .. }), "got {err:?}");
}

#[test]
fn test_second_mesh_file_shares_skeleton() {
    let mut model = Model::load(data("bone.md5mesh")).unwrap();
    let first = model
        .load_meshes(data("bone.md5mesh"), &ParseOptions::default())
        .unwrap();
    assert_eq!(first, 1);
    assert_eq!(model.meshes.len(), 2);
    assert_eq!(model.vertex_count(), 8);
}

#[test]
fn test_second_mesh_file_with_other_skeleton() {
    let src = std::fs::read_to_string(data("bone.md5mesh"))
        .unwrap()
        .replace("\"arm\"", "\"leg\"");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legs.md5mesh");
    std::fs::write(&path, src).unwrap();

    let mut model = Model::load(data("bone.md5mesh")).unwrap();
    let err = model
        .load_meshes(&path, &ParseOptions::default())
        .unwrap_err();
    assert!(matches!(err, Md5Error::TopologyMismatch { .. }));
    assert_eq!(model.meshes.len(), 1);
}

#[test_case("mesh {\nnumverts 18446744073709551615\n}" ; "vertex count overflows")]
#[test_case("mesh {\nnumtris 1000000000000\n}" ; "triangle count past input")]
#[test_case("mesh {\nnumweights 18446744073709551615\n}" ; "weight count overflows")]
#[test_case("numJoints 18446744073709551615\njoints {\n}" ; "joint count overflows")]
fn test_oversized_mesh_count_is_parse_error(src: &str) {
    let err = parse_mesh(src, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, Md5Error::Parse { .. }), "got {err:?}");
}

#[test_case("numFrames 18446744073709551615" ; "frame count overflows")]
#[test_case("numFrames 1000000000000\nnumJoints 1" ; "frame count past input")]
fn test_oversized_anim_count_is_parse_error(src: &str) {
    let err = parse_anim("huge", src).unwrap_err();
    assert!(matches!(err, Md5Error::Parse { .. }), "got {err:?}");
}
