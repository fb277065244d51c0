//! Error types for the I/O and parsing boundary.
//!
//! The mutex engine and transaction worker are infallible by design: there is no
//! protocol-level error channel. Only the collaborators that touch the filesystem
//! or operator-supplied input ever return a `Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed input: {0}")]
    Input(String),

    #[error("malformed quorum file: {0}")]
    Quorum(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
