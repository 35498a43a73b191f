use super::check_version;
use super::lexer::{Lexer, TokenKind};
use crate::anim::{AnimatedJoint, AnimationClip, Bounds};
use crate::error::Result;
use crate::joint::{ChannelMask, parent_from_raw, validate_parents};
use crate::math::quat_from_xyz;
use glam::Vec3;

/// Frame rate assumed when a file omits `frameRate`
pub const DEFAULT_FRAME_RATE: f32 = 24.0;

/// `frame i { }` with no values
const FRAME_TOKENS: usize = 4;

/// A hierarchy entry before its baseframe has been read
struct HierarchyEntry {
    name: String,
    parent: Option<usize>,
    channels: ChannelMask,
    first_component: usize,
}

/// Parse the contents of a `.md5anim` file into a clip called `name`.
pub fn parse_anim(name: &str, src: &str) -> Result<AnimationClip> {
    let mut lexer = Lexer::new(src)?;

    let mut num_frames: Option<usize> = None;
    let mut num_joints: Option<usize> = None;
    let mut num_components: Option<usize> = None;
    let mut frame_rate: Option<f32> = None;

    let mut hierarchy: Option<Vec<HierarchyEntry>> = None;
    let mut baseframe: Option<Vec<(Vec3, Vec3)>> = None;
    let mut bounds: Vec<Bounds> = Vec::new();
    let mut frames: Vec<Option<Vec<f32>>> = Vec::new();

    while !lexer.is_eof() {
        let token = lexer.next_token()?;
        let TokenKind::Word(keyword) = token.kind else {
            log::debug!("line {}: skipping {}", token.line, token.kind);
            continue;
        };

        match keyword {
            "MD5Version" => check_version(lexer.expect_i32()?, token.line),
            "commandline" => {
                lexer.expect_string()?;
            }
            "numFrames" => {
                let n = lexer.expect_count("numFrames", FRAME_TOKENS)?;
                if n == 0 {
                    return Err(lexer.error("numFrames must be at least 1"));
                }
                num_frames = Some(n);
                frames = vec![None; n];
            }
            "numJoints" => num_joints = Some(lexer.expect_usize()?),
            "frameRate" => {
                let rate = lexer.expect_f32()?;
                if !(rate.is_finite() && rate > 0.0) {
                    return Err(lexer.error(format!("frameRate {rate} must be positive")));
                }
                frame_rate = Some(rate);
            }
            "numAnimatedComponents" => num_components = Some(lexer.expect_usize()?),
            "hierarchy" => {
                let joints = num_joints.ok_or_else(|| lexer.error("hierarchy before numJoints"))?;
                let components = num_components
                    .ok_or_else(|| lexer.error("hierarchy before numAnimatedComponents"))?;
                hierarchy = Some(parse_hierarchy(&mut lexer, joints, components)?);
            }
            "bounds" => {
                let count = num_frames.ok_or_else(|| lexer.error("bounds before numFrames"))?;
                bounds = parse_bounds(&mut lexer, count)?;
            }
            "baseframe" => {
                let joints = num_joints.ok_or_else(|| lexer.error("baseframe before numJoints"))?;
                baseframe = Some(parse_baseframe(&mut lexer, joints)?);
            }
            "frame" => {
                let components = num_components
                    .ok_or_else(|| lexer.error("frame before numAnimatedComponents"))?;
                let index = lexer.expect_usize()?;
                let count = frames.len();
                if count == 0 {
                    return Err(lexer.error("frame before numFrames"));
                }
                let values = parse_frame_values(&mut lexer, components)?;
                let slot = frames
                    .get_mut(index)
                    .ok_or_else(|| lexer.error(format!("frame {index} out of range (numFrames {count})")))?;
                if slot.is_some() {
                    log::warn!("line {}: frame {index} defined twice", token.line);
                }
                *slot = Some(values);
            }
            other => {
                log::debug!("line {}: skipping unknown keyword '{other}'", token.line);
            }
        }
    }

    let num_frames = num_frames.ok_or_else(|| lexer.error("missing numFrames"))?;
    let num_components =
        num_components.ok_or_else(|| lexer.error("missing numAnimatedComponents"))?;
    let hierarchy = hierarchy.ok_or_else(|| lexer.error("missing hierarchy block"))?;
    let baseframe = baseframe.ok_or_else(|| lexer.error("missing baseframe block"))?;

    let frame_rate = frame_rate.unwrap_or_else(|| {
        log::warn!("clip '{name}' has no frameRate, assuming {DEFAULT_FRAME_RATE}");
        DEFAULT_FRAME_RATE
    });

    if bounds.is_empty() {
        log::warn!("clip '{name}' has no bounds block");
    }

    let mut frame_data = Vec::new();
    for (i, frame) in frames.into_iter().enumerate() {
        let values = frame.ok_or_else(|| lexer.error(format!("frame {i} is missing")))?;
        frame_data.extend(values);
    }

    let joints = hierarchy
        .into_iter()
        .zip(baseframe)
        .map(|(entry, (translation, q_xyz))| AnimatedJoint {
            name: entry.name,
            parent: entry.parent,
            channels: entry.channels,
            first_component: entry.first_component,
            base_translation: translation,
            base_orientation: quat_from_xyz(q_xyz),
        })
        .collect();

    Ok(AnimationClip {
        name: name.to_string(),
        frame_rate,
        num_frames,
        num_animated_components: num_components,
        joints,
        bounds,
        frame_data,
    })
}

/// `hierarchy { "name" parent flags startIndex ... }`
fn parse_hierarchy(
    lexer: &mut Lexer<'_>,
    count: usize,
    num_components: usize,
) -> Result<Vec<HierarchyEntry>> {
    lexer.expect_punct('{')?;
    let mut entries: Vec<HierarchyEntry> = Vec::new();
    let mut cursor = 0;

    while !lexer.at_punct('}') {
        let name = lexer.expect_string()?.to_string();
        let parent = parent_from_raw(lexer.expect_i32()?).map_err(|e| e.at_line(lexer.line()))?;
        let channels =
            ChannelMask::from_raw(lexer.expect_u32()?).map_err(|e| e.at_line(lexer.line()))?;
        let start_index = lexer.expect_usize()?;

        if start_index != cursor {
            log::warn!(
                "line {}: joint '{name}' declares start index {start_index}, using {cursor}",
                lexer.line()
            );
        }
        let first_component = cursor;
        cursor += channels.component_count();
        if cursor > num_components {
            return Err(lexer.error(format!(
                "joint '{name}' needs components up to {cursor} but numAnimatedComponents is {num_components}"
            )));
        }

        entries.push(HierarchyEntry {
            name,
            parent,
            channels,
            first_component,
        });
    }
    lexer.expect_punct('}')?;

    if entries.len() != count {
        return Err(lexer.error(format!(
            "hierarchy has {} joints, numJoints is {count}",
            entries.len()
        )));
    }
    validate_parents(entries.iter().map(|e| e.parent)).map_err(|e| e.at_line(lexer.line()))?;

    Ok(entries)
}

/// `bounds { ( min ) ( max ) ... }`, one pair per frame
fn parse_bounds(lexer: &mut Lexer<'_>, count: usize) -> Result<Vec<Bounds>> {
    lexer.expect_punct('{')?;
    let mut bounds = Vec::new();
    while !lexer.at_punct('}') {
        let min = lexer.expect_vec3()?;
        let max = lexer.expect_vec3()?;
        bounds.push(Bounds { min, max });
    }
    lexer.expect_punct('}')?;

    if bounds.len() != count {
        return Err(lexer.error(format!(
            "bounds block has {} entries, numFrames is {count}",
            bounds.len()
        )));
    }
    Ok(bounds)
}

/// `baseframe { ( tx ty tz ) ( qx qy qz ) ... }`
fn parse_baseframe(lexer: &mut Lexer<'_>, count: usize) -> Result<Vec<(Vec3, Vec3)>> {
    lexer.expect_punct('{')?;
    let mut entries = Vec::new();
    while !lexer.at_punct('}') {
        let translation = lexer.expect_vec3()?;
        let q_xyz = lexer.expect_vec3()?;
        entries.push((translation, q_xyz));
    }
    lexer.expect_punct('}')?;

    if entries.len() != count {
        return Err(lexer.error(format!(
            "baseframe has {} joints, numJoints is {count}",
            entries.len()
        )));
    }
    Ok(entries)
}

/// `{ v0 v1 ... }` with exactly `count` values
fn parse_frame_values(lexer: &mut Lexer<'_>, count: usize) -> Result<Vec<f32>> {
    lexer.expect_punct('{')?;
    let mut values = Vec::new();
    while !lexer.at_punct('}') {
        values.push(lexer.expect_f32()?);
    }
    lexer.expect_punct('}')?;

    if values.len() != count {
        return Err(lexer.error(format!(
            "frame has {} values, numAnimatedComponents is {count}",
            values.len()
        )));
    }
    Ok(values)
}
