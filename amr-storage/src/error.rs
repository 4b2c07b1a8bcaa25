use thiserror::Error;

use crate::consts::Mode;
use crate::sniff::ContainerKind;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown container format, no AMR or AMR-WB magic header")]
    UnknownFormat,
    #[error("Malformed TOC, continuation chain exceeds {limit} entries")]
    MalformedToc { limit: usize },
    #[error("Truncated TOC, input ended after {entries} chained entries")]
    TruncatedToc { entries: usize },
    #[error("Invalid {kind} frame type index {index}")]
    InvalidFrameType { kind: ContainerKind, index: u8 },
    #[error("Payload length mismatch, TOC declares {declared} bytes but {available} remain")]
    PayloadLengthMismatch { declared: usize, available: usize },
    #[error("Codec engine returned an implausible record of {size} bytes")]
    EngineEncodeFailure { size: usize },
    #[error("Codec engine failure: {0}")]
    Engine(String),
    #[error("Invalid TOC chain length {0}")]
    InvalidChainLength(usize),
    #[error("Bitrate mode {mode} does not belong to {kind}")]
    ModeMismatch { mode: Mode, kind: ContainerKind },
    #[error("Unknown bitrate mode {0:?}")]
    InvalidMode(String),
    #[error("Invalid PCM length {got}, expecting a multiple of {frame}")]
    InvalidBlockLength { frame: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal condition met while walking a stream.
///
/// `at` is the byte offset of the TOC group for decoding and the PCM block
/// index for encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub at: usize,
    pub error: Error,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at {})", self.error, self.at)
    }
}

impl From<Error> for symphonia_core::errors::Error {
    fn from(err: Error) -> Self {
        use symphonia_core::errors::Error as SymphoniaError;

        match err {
            Error::UnknownFormat => SymphoniaError::Unsupported("amr: unknown container format"),
            Error::MalformedToc { .. } | Error::TruncatedToc { .. } => {
                SymphoniaError::DecodeError("amr: malformed toc chain")
            }
            Error::InvalidFrameType { .. } => SymphoniaError::DecodeError("amr: invalid frame type"),
            Error::PayloadLengthMismatch { .. } => {
                SymphoniaError::DecodeError("amr: payload length mismatch")
            }
            Error::Engine(_) | Error::EngineEncodeFailure { .. } => {
                SymphoniaError::DecodeError("amr: codec engine failure")
            }
            _ => SymphoniaError::DecodeError("amr: invalid codec parameters"),
        }
    }
}
