//! Formatting utilities

use glam::{Quat, Vec3};

/// Format a vector with three decimals per component
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Format a quaternion as `(x, y, z, w)`
pub fn format_quat(q: Quat) -> String {
    format!("({:.3}, {:.3}, {:.3}, {:.3})", q.x, q.y, q.z, q.w)
}

/// Format a parent link, `-` for roots
pub fn format_parent(parent: Option<usize>) -> String {
    parent.map_or_else(|| "-".to_string(), |p| p.to_string())
}

/// Format a duration in seconds
pub fn format_seconds(seconds: f32) -> String {
    format!("{seconds:.3}s")
}
