//! Error types raised by repository implementations.

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("record already exists: {0}")]
    Duplicate(String),

    #[error("record not found: {0}")]
    Missing(String),

    #[error("combat log of {session} is full ({capacity} entries)")]
    LogFull { session: String, capacity: usize },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
