use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// Remote catalog could not be reached or answered with a bad status.
    /// Recoverable: the caller may simply fetch again.
    #[error("{0}")]
    Fetch(String),
    #[error("malformed payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("{0}")]
    InvalidBook(String),
    #[error("{0}")]
    InvalidName(String),
}

pub type LibraryResult<T> = Result<T, LibraryError>;
