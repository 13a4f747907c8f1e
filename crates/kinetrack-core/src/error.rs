//! Error types for the Kinetrack engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient landmarks: need {required}, have {available}")]
    InsufficientLandmarks { required: usize, available: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
