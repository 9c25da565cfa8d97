//! Gizmo error types

use crate::target::TargetKind;

/// Errors raised when binding the controller to a target
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    /// The target has no usable position, bounding volume or model matrix
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
    /// The target kind cannot carry a gizmo
    #[error("Unsupported target kind: {0:?}")]
    UnsupportedTarget(TargetKind),
}

/// Errors raised when loading or saving a gizmo configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration could not be encoded
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// The configuration text is malformed
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
