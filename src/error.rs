//! Error types shared by every puzzle model and solver.

use thiserror::Error;

/// Main error type for the puzzle engine.
///
/// Every variant is local to the call that produced it: no solver retries
/// internally and no caller-owned state is modified when one is returned.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("illegal move: {reason}")]
    IllegalMove { reason: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid disk count {disks} (must be between 1 and {max})")]
    InvalidDiskCount { disks: usize, max: usize },

    #[error("no solution found: {detail}")]
    NoSolutionFound { detail: String },

    #[error("no knight's tour found after searching {nodes} nodes")]
    NoTourFound { nodes: u64 },

    #[error("tour stopped at a dead end after visiting {visited} of 64 squares")]
    IncompleteTour { visited: usize },

    #[error("no moves available: the game is already over")]
    NoMovesAvailable,

    #[error("invalid board: {message}")]
    InvalidBoard { message: String },

    #[error("cannot parse '{input}': {message}")]
    Parse { input: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn illegal(reason: impl Into<String>) -> Self {
        Error::IllegalMove {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub(crate) fn board(message: impl Into<String>) -> Self {
        Error::InvalidBoard {
            message: message.into(),
        }
    }

    /// Builds a [`Error::Parse`] for text the caller supplied.
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            input: input.into(),
            message: message.into(),
        }
    }
}
