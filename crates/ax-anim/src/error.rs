//! Animation error types

/// Errors raised by the player's transport calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayerError {
    /// No clip with this name in the bound set
    #[error("Animation clip not found: {0}")]
    ClipNotFound(String),
}

/// Errors raised while parsing a binary clip asset.
///
/// A failed parse never touches clips that were already loaded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    /// Reading the file failed
    #[error("IO error: {0}")]
    Io(String),

    /// The container ends before a header or chunk it declares
    #[error("Truncated asset: need {needed} bytes, have {actual}")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes available
        actual: usize,
    },

    /// The file does not start with `glTF`
    #[error("Not a binary glTF container (bad magic)")]
    BadMagic,

    /// The first chunk is not JSON
    #[error("First chunk is not a JSON chunk")]
    MissingJsonChunk,

    /// Accessor data was needed but there is no BIN chunk
    #[error("Accessor data requested but the asset has no binary chunk")]
    MissingBinChunk,

    /// The JSON chunk does not describe a glTF document
    #[error("Invalid JSON chunk: {0}")]
    InvalidJson(String),

    /// Accessor index is missing or its bytes lie outside its view or chunk
    #[error("Accessor {0} is missing or its data lies outside the binary chunk")]
    AccessorOutOfRange(usize),

    /// Accessor components are not 32-bit floats
    #[error("Accessor {accessor} has component type {component_type}, expected FLOAT")]
    NonFloatAccessor {
        /// Accessor index
        accessor: usize,
        /// glTF component type code
        component_type: u32,
    },

    /// Accessor element type does not fit the channel
    #[error("Accessor {accessor} has type {kind}, expected {expected}")]
    UnsupportedAccessorType {
        /// Accessor index
        accessor: usize,
        /// Element type found
        kind: String,
        /// Element type required
        expected: &'static str,
    },

    /// A channel targets a node index the document does not have
    #[error("Animation '{animation}' channel {channel} targets missing node {node}")]
    MissingNode {
        /// Clip name
        animation: String,
        /// Channel index within the clip
        channel: usize,
        /// Node index
        node: usize,
    },

    /// A channel uses a sampler index the clip does not have
    #[error("Animation '{animation}' channel {channel} uses missing sampler {sampler}")]
    MissingSampler {
        /// Clip name
        animation: String,
        /// Channel index within the clip
        channel: usize,
        /// Sampler index
        sampler: usize,
    },
}

impl From<std::io::Error> for AssetError {
    fn from(e: std::io::Error) -> Self {
        AssetError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(e: serde_json::Error) -> Self {
        AssetError::InvalidJson(e.to_string())
    }
}
