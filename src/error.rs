use thiserror::Error;

/// Failures of a single user action. None of them end the session.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid mapping file: {0}")]
    Parse(String),

    #[error("{0}")]
    Resource(String),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MapError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
