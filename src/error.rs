use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComicError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Response error: {0}")]
    Response(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("File error: {0}")]
    File(String),
}

impl From<std::io::Error> for ComicError {
    fn from(e: std::io::Error) -> Self {
        ComicError::File(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ComicError>;
