//! Identifiers and payloads exchanged with the provider.

use serde::Deserialize;
use std::fmt;

/// Provider model identifier (numeric in the API, kept as text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId(pub String);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider-issued identifier of an asynchronous generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base64-encoded image as returned by the status endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage(pub String);

impl EncodedImage {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    /// Base64 payload without an optional `data:<mime>;base64,` prefix.
    pub fn payload(&self) -> &str {
        let data = self.0.trim();
        match data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => data,
        }
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedImage({} bytes)", self.0.len())
    }
}

/// Result of polling a job: the images, or an explicit signal that the attempt budget ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Done(Vec<EncodedImage>),
    TimedOut { attempts: u32 },
}

/// Model ids come back as numbers; accept strings too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for ModelId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => ModelId(n.to_string()),
            RawId::Text(s) => ModelId(s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelEntry {
    pub id: RawId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunResponse {
    pub uuid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// Newer pipeline responses nest images under `result.files`.
    #[serde(default)]
    pub result: Option<StatusResult>,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResult {
    #[serde(default)]
    pub files: Vec<String>,
}

impl StatusResponse {
    pub fn into_images(self) -> Vec<EncodedImage> {
        self.images
            .or_else(|| self.result.map(|r| r.files))
            .unwrap_or_default()
            .into_iter()
            .map(EncodedImage)
            .collect()
    }
}
