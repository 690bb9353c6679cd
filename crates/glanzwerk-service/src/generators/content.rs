use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{ContentGenerator, GeneratedArticle, RetryPolicy, with_retries};
use crate::errors::GenerationError;
use crate::slug::slugify;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Reading speed used for the fallback read-time estimate.
const WORDS_PER_MINUTE: usize = 200;

const SYSTEM_PROMPT: &str = "Du bist Content-Redakteur für Glanzwerk, eine professionelle \
Gebäudereinigungsfirma. Du schreibst hilfreiche, SEO-optimierte Blogartikel auf Deutsch \
für Privat- und Geschäftskunden. Antworte ausschließlich mit einem einzelnen JSON-Objekt \
mit den Feldern: title, slug, excerpt, body (HTML mit <h2>/<h3>/<p>/<ul>-Struktur), \
metaDescription (max. 155 Zeichen), keywords (Array), readTime (Minuten als Zahl), \
imagePrompt (englische Bildbeschreibung für das Titelbild). Kein Markdown, keine \
Erklärungen außerhalb des JSON.";

#[derive(Debug, Clone)]
pub struct ContentGeneratorConfig {
    /// Missing key disables the client; every call fails with an
    /// upstream error instead of preventing process startup.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub retry: RetryPolicy,
}

impl Default for ContentGeneratorConfig {
    fn default() -> Self {
        ContentGeneratorConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Chat-completions client for article generation.
pub struct OpenAiContentGenerator {
    client: reqwest::Client,
    config: ContentGeneratorConfig,
}

impl OpenAiContentGenerator {
    pub fn new(config: ContentGeneratorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn request_completion(
        &self,
        api_key: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError> {
        let endpoint = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": 0.7,
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
                "text generation returned {status}: {}",
                truncate(&detail, 200)
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::Upstream(format!("malformed response body: {err}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Upstream("response contained no completion text".to_string())
            })
    }
}

#[async_trait::async_trait]
impl ContentGenerator for OpenAiContentGenerator {
    #[instrument(skip(self, keywords), fields(model = %self.config.model))]
    async fn generate(
        &self,
        topic: &str,
        category: &str,
        keywords: &[String],
    ) -> Result<GeneratedArticle, GenerationError> {
        let Some(api_key) = self.config.api_key.clone() else {
            return Err(GenerationError::Upstream(
                "no text-generation API key configured".to_string(),
            ));
        };

        let user_prompt = build_user_prompt(topic, category, keywords);
        debug!(topic, category, "Requesting article generation");

        let raw = with_retries(&self.config.retry, "chat-completions", || {
            self.request_completion(&api_key, &user_prompt)
        })
        .await?;

        parse_article(&raw)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn build_user_prompt(topic: &str, category: &str, keywords: &[String]) -> String {
    format!(
        "Schreibe einen Blogartikel zum Thema \"{topic}\" in der Kategorie \
         \"{category}\". Baue diese Keywords natürlich ein: {}.",
        keywords.join(", ")
    )
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// The model's JSON, before validation. Every field is optional here so
/// that missing required fields become typed parse errors instead of
/// serde noise.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    slug: Option<String>,
    excerpt: Option<String>,
    body: Option<String>,
    meta_description: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    read_time: Option<i32>,
    image_prompt: Option<String>,
}

/// Strict decode of the completion text into a [`GeneratedArticle`].
///
/// Models wrap JSON in markdown fences often enough that stripping them
/// first is required behavior, not a workaround.
fn parse_article(raw: &str) -> Result<GeneratedArticle, GenerationError> {
    let stripped = strip_code_fences(raw);

    let parsed: RawArticle =
        serde_json::from_str(stripped).map_err(|err| GenerationError::Parse {
            reason: format!("completion is not a JSON object: {err}"),
            raw: raw.to_string(),
        })?;

    let title = require_field(parsed.title, "title", raw)?;
    let slug_source = require_field(parsed.slug, "slug", raw)?;
    let body = require_field(parsed.body, "body", raw)?;

    // Model-provided slugs are not trusted to be URL-safe.
    let mut slug = slugify(&slug_source);
    if slug.is_empty() {
        slug = slugify(&title);
    }

    let excerpt = parsed
        .excerpt
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| plain_excerpt(&body, 200));
    let meta_description = parsed
        .meta_description
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| truncate(&excerpt, 155).to_string());
    let read_time_minutes = parsed
        .read_time
        .filter(|minutes| *minutes > 0)
        .unwrap_or_else(|| estimate_read_time(&body));
    let image_prompt = parsed
        .image_prompt
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| title.clone());

    Ok(GeneratedArticle {
        title,
        slug,
        excerpt,
        body,
        meta_description,
        keywords: parsed.keywords,
        read_time_minutes,
        image_prompt,
    })
}

fn require_field(
    value: Option<String>,
    field: &str,
    raw: &str,
) -> Result<String, GenerationError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| GenerationError::Parse {
            reason: format!("missing required field `{field}`"),
            raw: raw.to_string(),
        })
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(without_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the rest of the fence line ("json", "JSON", or nothing)
    let without_open = match without_open.find('\n') {
        Some(index) => &without_open[index + 1..],
        None => without_open,
    };
    without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn estimate_read_time(body: &str) -> i32 {
    let words = body.split_whitespace().count();
    (words.div_ceil(WORDS_PER_MINUTE)).max(1) as i32
}

fn plain_excerpt(body: &str, max_chars: usize) -> String {
    let mut text = String::with_capacity(body.len());
    let mut in_tag = false;
    for ch in body.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                if !text.ends_with(' ') && !text.is_empty() {
                    text.push(' ');
                }
            }
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars).to_string()
}

fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
