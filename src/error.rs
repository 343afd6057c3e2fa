use std::path::PathBuf;

use thiserror::Error;

/// Outcome of an authorization decision that rejected a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The SQL parser rejected the text, or the statement kind is unsupported.
    #[error("Unparsable statement: {0}")]
    UnparsableStatement(String),

    /// No rule targets the statement's table.
    #[error("Statement is not allowed: {0}")]
    StatementNotAllowed(String),

    /// A specific aspect check failed.
    #[error("{0}")]
    AspectViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read policy file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("cannot scan policy directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("policy scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
