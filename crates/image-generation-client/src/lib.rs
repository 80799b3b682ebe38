//! FusionBrain (Kandinsky) text-to-image client
//!
//! Wraps the provider's asynchronous job protocol: list models, submit a job, poll its status,
//! then decode the returned base64 images locally.
//!
//! ```rust,no_run
//! use image_generation_client::{decode_and_store, ImageGenerationClient, PollOutcome};
//!
//! async fn example() -> Result<(), image_generation_client::ImageClientError> {
//!     let client = ImageGenerationClient::new("key".to_string(), "secret".to_string());
//!     let model = client.resolve_model().await?;
//!     let job = client.generate("a red fox in the snow", &model).await?;
//!     if let PollOutcome::Done(images) = client.wait(&job).await? {
//!         decode_and_store(&images[0], std::path::Path::new("fox.png"))?;
//!     }
//!     Ok(())
//! }
//! ```

mod decode;
mod error;
mod types;

pub use decode::decode_and_store;
pub use error::{ImageClientError, Result};
pub use types::{EncodedImage, JobId, ModelId, PollOutcome};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use types::{ModelEntry, RunResponse, StatusResponse};

pub const DEFAULT_BASE_URL: &str = "https://api-key.fusionbrain.ai/";
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(10);

const MODELS_PATH: &str = "key/api/v1/models";
const RUN_PATH: &str = "key/api/v1/text2image/run";
const STATUS_PATH: &str = "key/api/v1/text2image/status/";

/// Client for the FusionBrain job API. Cheap to clone (shares the HTTP connection pool).
#[derive(Clone)]
pub struct ImageGenerationClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
    width: u32,
    height: u32,
    max_attempts: u32,
    poll_delay: Duration,
}

impl ImageGenerationClient {
    /// Creates a client for the public endpoint with default size and poll budget.
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            secret_key,
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_delay: DEFAULT_POLL_DELAY,
        }
    }

    /// Uses another endpoint (e.g. a mock server). A trailing slash is added when missing.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Sets the image size used by [`Self::generate`].
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the poll budget used by [`Self::wait`].
    pub fn with_poll(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.poll_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn poll_delay(&self) -> Duration {
        self.poll_delay
    }

    /// Returns the first model the provider lists.
    #[instrument(skip(self))]
    pub async fn resolve_model(&self) -> Result<ModelId> {
        info!(api_key = %mask_secret(&self.api_key), "step: image models request");

        let response = self
            .authorized(self.client.get(self.url(MODELS_PATH)))
            .send()
            .await?;
        let models: Vec<ModelEntry> = read_json(response, "models").await?;

        let model: ModelId = models
            .into_iter()
            .next()
            .map(|m| m.id.into())
            .ok_or_else(|| ImageClientError::Provider("model list is empty".to_string()))?;

        info!(model_id = %model, "step: image model resolved");
        Ok(model)
    }

    /// Submits a job with the configured size and one image.
    pub async fn generate(&self, prompt: &str, model: &ModelId) -> Result<JobId> {
        self.submit(prompt, model, 1, self.width, self.height).await
    }

    /// Submits a generation job and returns its identifier.
    #[instrument(skip(self, prompt))]
    pub async fn submit(
        &self,
        prompt: &str,
        model: &ModelId,
        count: u32,
        width: u32,
        height: u32,
    ) -> Result<JobId> {
        info!(
            model_id = %model,
            count,
            width,
            height,
            prompt_preview = %prompt.chars().take(100).collect::<String>(),
            "step: image generation submit"
        );

        let params = generation_params(prompt, count, width, height);
        let form = Form::new()
            .text("model_id", model.to_string())
            .part(
                "params",
                Part::text(params.to_string()).mime_str("application/json")?,
            );

        let response = self
            .authorized(self.client.post(self.url(RUN_PATH)))
            .multipart(form)
            .send()
            .await?;
        let run: RunResponse = read_json(response, "submit").await?;

        info!(job_id = %run.uuid, "step: image generation job accepted");
        Ok(JobId(run.uuid))
    }

    /// Polls with the configured budget.
    pub async fn wait(&self, job: &JobId) -> Result<PollOutcome> {
        self.poll(job, self.max_attempts, self.poll_delay).await
    }

    /// Queries the job status up to `max_attempts` times, waiting `delay` between attempts.
    ///
    /// Returns [`PollOutcome::Done`] on `DONE` and [`PollOutcome::TimedOut`] once the budget is spent.
    /// A `FAIL` status ends polling with [`ImageClientError::Provider`].
    #[instrument(skip(self))]
    pub async fn poll(&self, job: &JobId, max_attempts: u32, delay: Duration) -> Result<PollOutcome> {
        let url = self.url(&format!("{}{}", STATUS_PATH, job));

        for attempt in 1..=max_attempts {
            let response = self.authorized(self.client.get(&url)).send().await?;
            let status: StatusResponse = read_json(response, "status").await?;

            match status.status.as_str() {
                "DONE" => {
                    let images = status.into_images();
                    info!(job_id = %job, attempt, images = images.len(), "step: image generation done");
                    return Ok(PollOutcome::Done(images));
                }
                "FAIL" => {
                    let reason = status
                        .error_description
                        .unwrap_or_else(|| "no description".to_string());
                    warn!(job_id = %job, attempt, reason = %reason, "Image generation job failed");
                    return Err(ImageClientError::Provider(format!(
                        "generation {} failed: {}",
                        job, reason
                    )));
                }
                other => debug!(job_id = %job, attempt, status = %other, "Image generation pending"),
            }

            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
            }
        }

        warn!(job_id = %job, attempts = max_attempts, "Image generation poll budget exhausted");
        Ok(PollOutcome::TimedOut {
            attempts: max_attempts,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Key", format!("Key {}", self.api_key))
            .header("X-Secret", format!("Secret {}", self.secret_key))
    }
}

/// JSON `params` part of the submit form.
fn generation_params(prompt: &str, count: u32, width: u32, height: u32) -> serde_json::Value {
    serde_json::json!({
        "type": "GENERATE",
        "numImages": count,
        "width": width,
        "height": height,
        "generateParams": {
            "query": prompt,
        },
    })
}

/// Checks the status code and parses the body, mapping both failures to [`ImageClientError::Provider`].
async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ImageClientError::Provider(format!(
            "{} request failed ({}): {}",
            what,
            status,
            body.chars().take(300).collect::<String>()
        )));
    }
    serde_json::from_str(&body)
        .map_err(|e| ImageClientError::Provider(format!("malformed {} response: {}", what, e)))
}

/// Masks a secret for logging: first 4 and last 2 characters, or `***` for short values.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
