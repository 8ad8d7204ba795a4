use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl From<StoreError> for chime_core::ChimeError {
    fn from(e: StoreError) -> Self {
        chime_core::ChimeError::Store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
