use thiserror::Error;

/// Rejection of the target video URL, raised before anything touches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please navigate to a YouTube video page or use Manual URL mode")]
    NotAVideoPage,
    #[error("Please enter a YouTube video URL")]
    EmptyInput,
    #[error("Please enter a valid YouTube URL")]
    InvalidUrl,
}

/// Errors that reach the user. Everything else stays inside the component that saw it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("An extraction is already in progress")]
    ActiveJobExists,
    #[error("Failed to start extraction. Make sure the backend server is running.")]
    SubmissionRejected { reason: String },
    #[error("{0}")]
    JobFailed(String),
}
