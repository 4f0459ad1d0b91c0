use std::io;
use std::path::PathBuf;

use thiserror::Error;
use wbs_data::error::WowDataError;

use crate::chunk::ChunkId;

/// Error types for WMO reading, assembly and writing
#[derive(Error, Debug)]
pub enum WmoError {
    #[error("IO error: {0}")]
    Io(io::Error),

    /// The stream ended inside a fixed-size field
    #[error("Truncated input: stream ended inside a fixed-size field")]
    TruncatedInput,

    #[error("Unexpected chunk: expected {expected}, found {found}")]
    UnexpectedMagic { expected: ChunkId, found: ChunkId },

    /// The chunk after `MVER` is neither `MOHD` nor `MOGP`
    #[error("Unrecognized WMO file: leading chunk {found} is neither MOHD nor MOGP")]
    UnrecognizedFormat { found: ChunkId },

    #[error("Missing group file {index}: {}", .path.display())]
    MissingGroupFile { index: usize, path: PathBuf },

    #[error("Too many materials: {count} (at most 255, index 0xFF is reserved)")]
    MaterialLimitExceeded { count: usize },

    #[error("Too many vertices in one group: {count} (at most 65535)")]
    VertexLimitExceeded { count: usize },

    #[error("Corrupt {chunk} chunk: {reason}")]
    CorruptChunk { chunk: ChunkId, reason: String },

    #[error("Unsupported WMO version {0} (only 17 is supported)")]
    UnsupportedVersion(u32),

    #[error("BSP tree limit exceeded: {0}")]
    BspLimitExceeded(String),

    #[error("Doodad name offset {0} does not fit in 24 bits")]
    NameOffsetOverflow(u32),

    #[error("Group count mismatch: root declares {expected}, {found} supplied")]
    GroupCountMismatch { expected: usize, found: usize },

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
}

impl From<io::Error> for WmoError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedInput
        } else {
            Self::Io(err)
        }
    }
}

impl From<WowDataError> for WmoError {
    fn from(err: WowDataError) -> Self {
        match err {
            WowDataError::Io(err) => Self::Io(err),
            WowDataError::TruncatedInput => Self::TruncatedInput,
            WowDataError::InvalidValue { field, value } => Self::CorruptChunk {
                chunk: ChunkId::UNKNOWN,
                reason: format!("invalid value {value} for {field}"),
            },
        }
    }
}

/// Result type for WMO operations
pub type Result<T> = std::result::Result<T, WmoError>;
