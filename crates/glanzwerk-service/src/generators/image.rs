use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ImageGenerator, RetryPolicy, with_retries};
use crate::categories::ServiceCategory;
use crate::errors::GenerationError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "dall-e-3";

/// Wide aspect ratio suited to hero banners.
const HERO_IMAGE_SIZE: &str = "1792x1024";

/// Style phrases appended per category. Unknown categories fall back to
/// the generic phrase.
const CATEGORY_STYLES: &[(ServiceCategory, &str)] = &[
    (
        ServiceCategory::Fensterreinigung,
        "floor-to-ceiling office windows, streak-free glass, squeegee in motion",
    ),
    (
        ServiceCategory::Bueroreinigung,
        "modern open-plan office, tidy desks, gleaming surfaces",
    ),
    (
        ServiceCategory::Unterhaltsreinigung,
        "bright commercial hallway, freshly mopped floor, maintenance cart",
    ),
    (
        ServiceCategory::Grundreinigung,
        "deep cleaning in progress, scrubbing machine on stone floor",
    ),
    (
        ServiceCategory::Treppenhausreinigung,
        "spotless apartment staircase, polished handrail, daylight",
    ),
    (
        ServiceCategory::Bauendreinigung,
        "finished construction site handover, dust-free rooms, clean windows",
    ),
];

const GENERIC_STYLE: &str = "spotless modern building interior, cleaning crew at work";

/// Already-present qualifiers that suppress the default photography
/// suffix (checked case-insensitively as substrings).
const QUALITY_QUALIFIERS: &[&str] = &["professional photography", "photorealistic", "photograph"];

const QUALITY_SUFFIX: &str = "professional photography, natural light, high resolution";

#[derive(Debug, Clone)]
pub struct ImageGeneratorConfig {
    /// Missing key disables the client; every call fails with an
    /// upstream error instead of preventing process startup.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub retry: RetryPolicy,
}

impl Default for ImageGeneratorConfig {
    fn default() -> Self {
        ImageGeneratorConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Image-generation client for hero banners.
pub struct OpenAiImageGenerator {
    client: reqwest::Client,
    config: ImageGeneratorConfig,
}

impl OpenAiImageGenerator {
    pub fn new(config: ImageGeneratorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn request_image(&self, api_key: &str, prompt: &str) -> Result<String, GenerationError> {
        let endpoint = format!(
            "{}/images/generations",
            self.config.base_url.trim_end_matches('/')
        );

        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "n": 1,
            "size": HERO_IMAGE_SIZE,
        });

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(api_key)
            .timeout(self.config.retry.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| GenerationError::Upstream(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream(format!(
                "image generation returned {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let payload: ImageResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::Upstream(format!("malformed response body: {err}")))?;

        payload
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Upstream("response contained no image URL".to_string())
            })
    }
}

#[async_trait::async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn generate_hero_image(
        &self,
        prompt: &str,
        category: &str,
    ) -> Result<String, GenerationError> {
        let Some(api_key) = self.config.api_key.clone() else {
            return Err(GenerationError::Upstream(
                "no image-generation API key configured".to_string(),
            ));
        };

        let styled = build_image_prompt(prompt, category);
        debug!(category, "Requesting hero image generation");

        with_retries(&self.config.retry, "image-generation", || {
            self.request_image(&api_key, &styled)
        })
        .await
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Appends the category style and, unless the prompt already carries a
/// photography qualifier, the default quality suffix.
fn build_image_prompt(prompt: &str, category: &str) -> String {
    let style = ServiceCategory::parse(category)
        .and_then(|parsed| {
            CATEGORY_STYLES
                .iter()
                .find(|(candidate, _)| *candidate == parsed)
                .map(|(_, style)| *style)
        })
        .unwrap_or(GENERIC_STYLE);

    let mut styled = format!("{}, {style}", prompt.trim());

    let lowered = styled.to_lowercase();
    if !QUALITY_QUALIFIERS
        .iter()
        .any(|qualifier| lowered.contains(qualifier))
    {
        styled.push_str(", ");
        styled.push_str(QUALITY_SUFFIX);
    }

    styled
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}
