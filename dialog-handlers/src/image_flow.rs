//! Image generation pipeline for one prompt: status message → model → job → poll → decode → photo → cleanup.

use anyhow::{anyhow, Context};
use dbot_core::{Bot, Chat};
use image_generation_client::{decode_and_store, ImageGenerationClient, PollOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::menu::MSG_GENERATING;

/// How a pipeline run ended when no error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFlowOutcome {
    /// The photo was sent to the chat.
    Delivered,
    /// The provider did not finish within the poll budget.
    TimedOut { attempts: u32 },
}

#[derive(Clone)]
pub struct ImageGenerationFlow {
    client: Arc<ImageGenerationClient>,
    bot: Arc<dyn Bot>,
    work_dir: PathBuf,
}

impl ImageGenerationFlow {
    /// `work_dir` holds the transient image file between decoding and upload.
    pub fn new(client: Arc<ImageGenerationClient>, bot: Arc<dyn Bot>, work_dir: PathBuf) -> Self {
        Self {
            client,
            bot,
            work_dir,
        }
    }

    /// Runs the pipeline. The "generating" status message is deleted on every path.
    #[instrument(skip(self, chat, prompt), fields(chat_id = chat.id))]
    pub async fn run(&self, chat: &Chat, prompt: &str) -> anyhow::Result<ImageFlowOutcome> {
        let status_id = self
            .bot
            .send_message_and_return_id(chat, MSG_GENERATING)
            .await
            .context("send generating status")?;

        let outcome = self.generate_and_send(chat, prompt).await;

        if let Err(e) = self.bot.delete_message(chat, &status_id).await {
            warn!(error = %e, message_id = %status_id, "Failed to delete status message");
        }
        outcome
    }

    async fn generate_and_send(&self, chat: &Chat, prompt: &str) -> anyhow::Result<ImageFlowOutcome> {
        let model = self.client.resolve_model().await.context("resolve model")?;
        let job = self
            .client
            .generate(prompt, &model)
            .await
            .context("submit generation job")?;

        let image = match self.client.wait(&job).await.context("poll generation job")? {
            PollOutcome::Done(images) => images
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("job {} finished without images", job))?,
            PollOutcome::TimedOut { attempts } => {
                return Ok(ImageFlowOutcome::TimedOut { attempts });
            }
        };

        // Telegram detects the actual format from the bytes; the name only has to be unique.
        let path = self.work_dir.join(format!("generated-{}.jpg", job));
        let decode_path = path.clone();
        let decoded = tokio::task::spawn_blocking(move || decode_and_store(&image, &decode_path))
            .await
            .context("decode task aborted")?;
        if let Err(e) = decoded {
            // A failed write may leave a partial file behind.
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e).context("decode generated image");
        }

        let sent = self.bot.send_photo(chat, &path).await;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(error = %e, path = %path.display(), "Failed to remove generated image");
        }
        sent.context("send photo")?;

        info!(job_id = %job, "step: generated image delivered");
        Ok(ImageFlowOutcome::Delivered)
    }
}
