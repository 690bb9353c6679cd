use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::GenerationError;

pub mod content;
pub mod image;

pub use content::{ContentGeneratorConfig, OpenAiContentGenerator};
pub use image::{ImageGeneratorConfig, OpenAiImageGenerator};

/// Structured article returned by the text-generation upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub body: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub read_time_minutes: i32,
    pub image_prompt: String,
}

#[async_trait]
pub trait ContentGenerator: Send + Sync + 'static {
    async fn generate(
        &self,
        topic: &str,
        category: &str,
        keywords: &[String],
    ) -> Result<GeneratedArticle, GenerationError>;

    /// Model identifier recorded in the generation log.
    fn model(&self) -> &str;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync + 'static {
    /// Returns the URL of the generated hero image.
    async fn generate_hero_image(
        &self,
        prompt: &str,
        category: &str,
    ) -> Result<String, GenerationError>;

    fn model(&self) -> &str;
}

/// Bounded retry with exponential backoff for upstream calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Runs `call` up to `policy.max_attempts` times. Only upstream errors
/// are retried; parse failures are deterministic and returned as-is.
pub(crate) async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let mut backoff = policy.initial_backoff;
    let mut attempt = 1;

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err @ GenerationError::Upstream(_)) if attempt < policy.max_attempts => {
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "Upstream call failed, retrying after backoff"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
