use std::path::PathBuf;
use thiserror::Error;

/// Failures that reach the reader as a user-visible message.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("could not open {}: {message}", path.display())]
    Extraction { path: PathBuf, message: String },
    #[error("{} contains no readable text", path.display())]
    EmptyDocument { path: PathBuf },
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ReaderResult<T> = Result<T, ReaderError>;
