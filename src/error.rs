use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run. Everything else degrades to a smaller tally.
#[derive(Debug, Error)]
pub enum LangLocError {
    #[error("root does not exist: {}", root.display())]
    RootNotFound { root: PathBuf },

    #[error("Invalid filespec pattern '{pattern}': {source}")]
    InvalidFilespec {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl LangLocError {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            LangLocError::RootNotFound { .. } | LangLocError::InvalidFilespec { .. } => 2,
            LangLocError::Output(_) => 1,
        }
    }
}
