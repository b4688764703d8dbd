// Error types for the uploader.
//
// Every failure the library can produce is one of four kinds. Callers match
// on `UploadError::kind()` when they only care about the category (for
// example the CLI, which treats everything as fatal) and on the variants
// themselves when they want the details.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    /// The item is neither an existing file nor an `http` URL, or its
    /// content is not an image.
    #[error("{0}")]
    InvalidInput(String),

    /// Nothing to upload: missing local file or a failed remote fetch.
    #[error("{0}")]
    NotFound(String),

    /// The image host rejected the upload or answered with garbage.
    #[error(transparent)]
    UploadFailed(#[from] UploadFailure),

    /// Connection-level failure that survived every retry.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Details of a rejected upload. Both variants keep the raw response body
/// for diagnostics.
#[derive(Error, Debug)]
pub enum UploadFailure {
    #[error("Failed. Status {status}:\n{body}")]
    Status { status: u16, body: String },

    #[error("Failed decoding body:\n{source}\n{body:?}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

/// Coarse classification of an [`UploadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    UploadFailed,
    Transport,
}

pub type UploadResult<T> = Result<T, UploadError>;

impl UploadError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::InvalidInput(_) => ErrorKind::InvalidInput,
            UploadError::NotFound(_) => ErrorKind::NotFound,
            UploadError::UploadFailed(_) => ErrorKind::UploadFailed,
            UploadError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Status code returned by the image host, if the upload was rejected
    /// with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::UploadFailed(UploadFailure::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a rejected upload.
    pub fn body(&self) -> Option<&str> {
        match self {
            UploadError::UploadFailed(UploadFailure::Status { body, .. })
            | UploadError::UploadFailed(UploadFailure::Decode { body, .. }) => Some(body),
            _ => None,
        }
    }

    /// Only transport errors are worth another attempt; everything else,
    /// including a request that could not even be built, would fail the same
    /// way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, UploadError::Transport(e) if !e.is_builder())
    }
}
