use reqwest::StatusCode;

/// Errors that can occur while submitting a registration.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The intake endpoint answered with a non-2xx status.
    #[error("intake endpoint rejected the submission: {0}")]
    Rejected(StatusCode),

    /// The intake endpoint answered 2xx with a falsy body (`null`, `false`, zero, `""`).
    #[error("intake endpoint returned an empty response")]
    EmptyResponse,

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The attached photo carries a content type that is not a valid MIME type.
    #[error("invalid photo content type: {0}")]
    InvalidPhotoType(String),
}

impl SubmitError {
    /// Returns `true` when the endpoint answered but refused the record.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::EmptyResponse)
    }
}
