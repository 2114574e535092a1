//! Error taxonomy for the RAID-6 stripe engine.

use thiserror::Error;

/// `RaidError` is the typed error surface returned by [`crate::engine::Engine`].
#[derive(Debug, Error)]
pub enum RaidError {
    /// A name-based operation referenced a file that does not exist.
    #[error("file not found: {0}")]
    NotFound(String),

    /// A stripe index at or beyond the write cursor's frontier was requested.
    #[error("stripe {0} is beyond the write frontier")]
    OutOfRange(u64),

    /// The host filesystem failed in a way that is not a recoverable disk loss.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Three or more simultaneous disk failures at one stripe, or a scrub
    /// mismatch after a completed reconstruction.
    #[error("unrecoverable corruption: {0}")]
    UnrecoverableCorruption(String),

    /// A constructor or call-site argument violates the engine's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A verification/scrub check failed.
    #[error("integrity error: {0}")]
    IntegrityError(String),
}

/// `RaidResult` is the engine's standard result alias.
pub type RaidResult<T> = Result<T, RaidError>;
