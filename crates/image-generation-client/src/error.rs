use thiserror::Error;

/// Errors of the image generation client. A poll budget running out is not an error; see [`crate::PollOutcome::TimedOut`].
#[derive(Error, Debug)]
pub enum ImageClientError {
    /// Non-2xx status, malformed body, empty model list or a failed job.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base64 or image payload, or an image that cannot be re-encoded in its own format.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImageClientError>;
