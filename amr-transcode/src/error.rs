use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] amr_storage::Error),
    #[error("Invalid WAV data: {0}")]
    Wav(&'static str),
    #[error("Unsupported WAV layout, {0}")]
    UnsupportedWav(String),
    #[error("Invalid sample rate {0}")]
    InvalidSampleRate(u32),
    #[error("Resampling failed: {0}")]
    Resample(String),
    #[error("MP3 decoding failed: {0}")]
    Mp3(#[from] symphonia::core::errors::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
