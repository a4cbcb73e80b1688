use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{reason}: {}", path.display())]
    InvalidRoot { path: PathBuf, reason: RootProblem },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// Why a path cannot be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RootProblem {
    #[error("Path is empty")]
    Empty,
    #[error("Path does not exist")]
    Missing,
    #[error("Path is not a directory")]
    NotADirectory,
    #[error("Permission denied")]
    PermissionDenied,
}
