use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WowDataError {
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The stream ended before a fixed-size field could be read
    #[error("Truncated input: stream ended inside a fixed-size field")]
    TruncatedInput,

    #[error("Invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: u32 },
}

impl From<io::Error> for WowDataError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedInput
        } else {
            Self::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, WowDataError>;
