use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelfError {
    /// Malformed construction arguments (e.g. a negative copy count).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Patron not found: {0}")]
    PatronNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, ShelfError>;
