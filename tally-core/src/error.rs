use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(String),

    /// The chunk sequence is not contiguous from 0; the snapshot is
    /// partially synced or corrupted.
    #[error("snapshot chunk sequence broken: expected index {expected}, found {found}")]
    MissingChunk { expected: u64, found: u64 },

    #[error("duplicate chunk sequence index {0}")]
    AmbiguousOrder(u64),

    /// Zero chunks under the snapshot key. A legitimate "nothing loaded
    /// yet" state, not a backend fault.
    #[error("snapshot '{0}' has no chunks")]
    EmptySnapshot(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("format error: {0}")]
    Format(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, TallyError>;
