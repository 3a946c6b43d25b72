use crate::submission::SubmitError;

/// Errors that can occur in the TUI layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An I/O error occurred (terminal, event reading, runtime setup).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The intake client could not be set up.
    #[error("Submission setup error: {0}")]
    Submit(#[from] SubmitError),
}
