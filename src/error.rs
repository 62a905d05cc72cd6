use thiserror::Error;

/// Errors produced by the progress tracker and its store.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Juz ordinal outside `1..=30`.
    #[error("Invalid juz {0}: expected a number between 1 and 30")]
    InvalidJuz(u32),

    /// No user (or identity) with this id is known to the store.
    #[error("User not found: {0}")]
    NotFound(String),

    /// The store rejected or failed a read or write.
    #[error("Database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// The progress row changed between read and write, or another
    /// connection held the write lock past the busy timeout.
    #[error("Concurrent update ({0}); reload and try again")]
    Conflict(String),

    /// A stored row could not be decoded.
    #[error("Corrupt progress record: {0}")]
    Corrupt(String),

    #[error("Invalid display name: {0}")]
    InvalidName(String),

    /// Reading or writing the identity cache file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
