use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for MD5 asset loading and pose evaluation
#[derive(Error, Debug)]
pub enum Md5Error {
    /// The asset file could not be opened or read
    #[error("couldn't open file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error after the asset was opened
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or missing token, or an element index outside its declared count
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A clip or extra mesh file does not match the skeleton it is bound to
    #[error("Topology mismatch for '{asset}': {reason}")]
    TopologyMismatch { asset: String, reason: String },

    /// Parent links that do not form a forest with parents ahead of children
    #[error("Invalid joint hierarchy: {0}")]
    InvalidHierarchy(String),

    /// Data that parsed but breaks a model invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Zero-length normal or tangent while skinning in strict mode
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// No clip with the requested name or index
    #[error("Animation clip not found: {0}")]
    ClipNotFound(String),

    /// Frame index outside the clip
    #[error("Frame {frame} out of range (clip has {num_frames} frames)")]
    InvalidFrame { frame: usize, num_frames: usize },

    /// Sample time that does not map to a frame
    #[error("Invalid sample time: {0}")]
    InvalidTime(f32),
}

impl Md5Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Re-tag a validation failure as a parse error at `line`
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            Self::Validation(message) | Self::InvalidHierarchy(message) => {
                Self::Parse { line, message }
            }
            other => other,
        }
    }
}

/// Result type using Md5Error
pub type Result<T> = std::result::Result<T, Md5Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_retags_validation() {
        let err = Md5Error::Validation("weight 3 out of range".to_string()).at_line(42);
        match err {
            Md5Error::Parse { line, message } => {
                assert_eq!(line, 42);
                assert_eq!(message, "weight 3 out of range");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_at_line_keeps_other_errors() {
        let err = Md5Error::InvalidTime(f32::NAN).at_line(7);
        assert!(matches!(err, Md5Error::InvalidTime(_)));
    }

    #[test]
    fn test_display_includes_path() {
        let err = Md5Error::FileOpen {
            path: PathBuf::from("models/imp.md5mesh"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("models/imp.md5mesh"));
    }
}
