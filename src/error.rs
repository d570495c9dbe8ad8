use thiserror::Error;

/// The one error type that crosses every module boundary in this crate.
/// Each variant names the boundary it comes from (I/O, DIMACS parsing, CLI
/// argument validation) so `main` can map it to the right exit code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed DIMACS input at byte offset {offset}: {message}")]
    Dimacs { offset: usize, message: String },

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
