use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("stale operation: {reason}: {path:?}")]
    StaleOperation { path: PathBuf, reason: &'static str },
    #[error("conflict: {0:?} no longer matches the recorded state")]
    Conflict(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("other error: {0}")]
    Other(String),
}
