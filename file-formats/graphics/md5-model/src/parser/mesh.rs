use super::lexer::{Lexer, TokenKind};
use super::{ParseOptions, check_version};
use crate::error::Result;
use crate::joint::{Joint, parent_from_raw};
use crate::mesh::{Mesh, Triangle, Vertex, Weight};
use crate::model::Model;

// Fewest tokens each element can be written in
const JOINT_TOKENS: usize = 12;
const VERT_TOKENS: usize = 8;
const TRI_TOKENS: usize = 5;
const WEIGHT_TOKENS: usize = 9;

/// Parse the contents of a `.md5mesh` file.
///
/// Nothing is returned until every block has been read and checked, so a
/// failure never yields a partially built model.
pub fn parse_mesh(src: &str, options: &ParseOptions) -> Result<Model> {
    let mut lexer = Lexer::new(src)?;
    let mut model = Model::default();
    let mut declared_joints: Option<usize> = None;
    let mut declared_meshes: Option<usize> = None;

    while !lexer.is_eof() {
        let token = lexer.next_token()?;
        let TokenKind::Word(keyword) = token.kind else {
            log::debug!("line {}: skipping {}", token.line, token.kind);
            continue;
        };

        match keyword {
            "MD5Version" => {
                model.version = lexer.expect_i32()?;
                check_version(model.version, token.line);
            }
            "commandline" => {
                model.command_line = lexer.expect_string()?.to_string();
            }
            "numJoints" => {
                declared_joints = Some(lexer.expect_count("numJoints", JOINT_TOKENS)?);
            }
            "numMeshes" => {
                declared_meshes = Some(lexer.expect_usize()?);
            }
            "joints" => {
                let count = declared_joints
                    .ok_or_else(|| lexer.error("joints block before numJoints"))?;
                model.joints = parse_joints(&mut lexer, count)?;
            }
            "mesh" => {
                let mesh = parse_mesh_block(&mut lexer, model.joints.len())?;
                log::debug!(
                    "mesh '{}': {} verts, {} tris, {} weights",
                    mesh.shader,
                    mesh.vertices.len(),
                    mesh.triangles.len(),
                    mesh.weights.len()
                );
                model.meshes.push(mesh);
            }
            other => {
                log::debug!("line {}: skipping unknown keyword '{other}'", token.line);
            }
        }
    }

    if let Some(count) = declared_joints
        && model.joints.len() != count
    {
        return Err(lexer.error(format!(
            "numJoints is {count} but no joints block was found"
        )));
    }

    if let Some(count) = declared_meshes
        && count != model.meshes.len()
    {
        log::warn!(
            "numMeshes is {count} but {} meshes were found",
            model.meshes.len()
        );
    }

    if options.validate_weight_sums {
        for mesh in &model.meshes {
            mesh.check_weight_sums(options.weight_sum_tolerance)?;
        }
    }

    Ok(model)
}

/// `joints { "name" parent ( tx ty tz ) ( qx qy qz ) ... }`
fn parse_joints(lexer: &mut Lexer<'_>, count: usize) -> Result<Vec<Joint>> {
    lexer.expect_punct('{')?;
    let mut joints = Vec::new();

    while !lexer.at_punct('}') {
        if joints.len() == count {
            lexer.next_token()?;
            return Err(lexer.error(format!("more than numJoints ({count}) joints")));
        }
        let name = lexer.expect_string()?;
        let parent = parent_from_raw(lexer.expect_i32()?).map_err(|e| e.at_line(lexer.line()))?;
        let translation = lexer.expect_vec3()?;
        let q_xyz = lexer.expect_vec3()?;
        if let Some(p) = parent.filter(|&p| p >= joints.len()) {
            return Err(lexer.error(format!(
                "joint '{name}' has parent {p}, which does not precede it"
            )));
        }
        joints.push(Joint::new(name, parent, translation, q_xyz));
    }
    lexer.expect_punct('}')?;

    if joints.len() != count {
        return Err(lexer.error(format!(
            "joints block has {} entries, numJoints is {count}",
            joints.len()
        )));
    }
    Ok(joints)
}

/// Write an indexed element into its pre-sized slot list
fn store<T>(
    lexer: &Lexer<'_>,
    slots: &mut Option<Vec<Option<T>>>,
    what: &str,
    index: usize,
    value: T,
) -> Result<()> {
    let slots = slots
        .as_mut()
        .ok_or_else(|| lexer.error(format!("{what} before num{what}s")))?;
    let count = slots.len();
    let slot = slots
        .get_mut(index)
        .ok_or_else(|| lexer.error(format!("{what} {index} out of range (num{what}s {count})")))?;
    if slot.is_some() {
        log::warn!("line {}: {what} {index} defined twice", lexer.line());
    }
    *slot = Some(value);
    Ok(())
}

fn collect<T>(lexer: &Lexer<'_>, slots: Option<Vec<Option<T>>>, what: &str) -> Result<Vec<T>> {
    slots
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.ok_or_else(|| lexer.error(format!("{what} {i} is missing"))))
        .collect()
}

fn parse_mesh_block(lexer: &mut Lexer<'_>, joint_count: usize) -> Result<Mesh> {
    lexer.expect_punct('{')?;

    let mut shader = String::new();
    let mut vertices: Option<Vec<Option<Vertex>>> = None;
    let mut triangles: Option<Vec<Option<Triangle>>> = None;
    let mut weights: Option<Vec<Option<Weight>>> = None;

    loop {
        let token = lexer.next_token()?;
        let keyword = match token.kind {
            TokenKind::Punct('}') => break,
            TokenKind::Word(w) => w,
            other => {
                log::debug!("line {}: skipping {other} in mesh", token.line);
                continue;
            }
        };

        match keyword {
            "shader" => shader = lexer.expect_string()?.to_string(),
            "numverts" => {
                vertices = Some(vec![None; lexer.expect_count("numverts", VERT_TOKENS)?]);
            }
            "numtris" => {
                triangles = Some(vec![None; lexer.expect_count("numtris", TRI_TOKENS)?]);
            }
            "numweights" => {
                weights = Some(vec![None; lexer.expect_count("numweights", WEIGHT_TOKENS)?]);
            }
            "vert" => {
                let index = lexer.expect_usize()?;
                let uv = lexer.expect_vec2()?;
                let first_weight = lexer.expect_usize()?;
                let weight_count = lexer.expect_usize()?;
                let vertex = Vertex {
                    uv,
                    first_weight,
                    weight_count,
                };
                store(lexer, &mut vertices, "vert", index, vertex)?;
            }
            "tri" => {
                let index = lexer.expect_usize()?;
                let indices = [
                    lexer.expect_u32()?,
                    lexer.expect_u32()?,
                    lexer.expect_u32()?,
                ];
                store(lexer, &mut triangles, "tri", index, Triangle { indices })?;
            }
            "weight" => {
                let index = lexer.expect_usize()?;
                let joint = lexer.expect_usize()?;
                let bias = lexer.expect_f32()?;
                let position = lexer.expect_vec3()?;
                let weight = Weight {
                    joint,
                    bias,
                    position,
                };
                store(lexer, &mut weights, "weight", index, weight)?;
            }
            other => {
                log::debug!("line {}: skipping unknown mesh keyword '{other}'", token.line);
            }
        }
    }

    let mesh = Mesh {
        shader,
        vertices: collect(lexer, vertices, "vert")?,
        triangles: collect(lexer, triangles, "tri")?,
        weights: collect(lexer, weights, "weight")?,
    };
    mesh.check_indices(joint_count)
        .map_err(|e| e.at_line(lexer.line()))?;

    Ok(mesh)
}
