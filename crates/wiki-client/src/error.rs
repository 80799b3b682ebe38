use thiserror::Error;

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("page not found: {0}")]
    NotFound(String),

    #[error("ambiguous title: {0}")]
    Ambiguous(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, WikiError>;
