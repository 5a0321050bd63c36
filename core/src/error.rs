use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to create store directory {}", path.display())]
    StoreDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("clipboard store unavailable at {}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Without a unique index on `content` every re-seed would insert a
    /// duplicate row instead of refreshing the existing one.
    #[error("clipboard_history has no unique constraint on content")]
    MissingUniqueConstraint,

    #[error("entry {index} is empty")]
    EmptyEntry { index: usize },

    #[error("failed to seed entry {index}")]
    Entry {
        index: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
