use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted record '{key}': {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Whether retrying the same operation later could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            StorageError::Io(_) => true,
            StorageError::Unavailable(_) => true,
            StorageError::Serialization(_) => false,
            StorageError::Corrupted { .. } => false,
        }
    }
}
