use std::io;
use std::path::PathBuf;

use thiserror::Error;
use wbs_data::error::WowDataError;

/// Error types for M2, skin and `.anim` reading and writing
#[derive(Error, Debug)]
pub enum M2Error {
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The stream ended inside a fixed-size field or a referenced block
    #[error("Truncated input: stream ended inside a fixed-size field")]
    TruncatedInput,

    #[error(
        "Invalid magic number: expected '{}', got '{}'",
        .expected.escape_ascii(),
        .actual.escape_ascii()
    )]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    #[error("Unsupported M2 version {0} (only 264 is supported)")]
    UnsupportedVersion(u32),

    #[error("Invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: u32 },

    /// A block decoded but its contents are inconsistent
    #[error("Corrupt {block} block: {reason}")]
    CorruptBlock { block: &'static str, reason: String },

    #[error("Missing skin profile {index}: {}", .path.display())]
    MissingSkinFile { index: usize, path: PathBuf },
}

impl From<io::Error> for M2Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedInput
        } else {
            Self::Io(err)
        }
    }
}

impl From<WowDataError> for M2Error {
    fn from(err: WowDataError) -> Self {
        match err {
            WowDataError::Io(err) => Self::Io(err),
            WowDataError::TruncatedInput => Self::TruncatedInput,
            WowDataError::InvalidValue { field, value } => Self::InvalidValue { field, value },
        }
    }
}

/// Result type using M2Error
pub type Result<T> = std::result::Result<T, M2Error>;
