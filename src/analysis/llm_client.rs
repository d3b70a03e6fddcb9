// src/analysis/llm_client.rs
use crate::core::config_manager::{LlmProvider, ServiceConfig};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-1.5-flash";
const GEMINI_KEY_HEADER: &str = "x-goog-api-key";
const GROQ_BASE_URL: &str = "https://api.groq.com";
const GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Single prompt, single reply. No retries, no caching.
pub struct LlmClient {
    client: Client,
    provider: LlmProvider,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GroqResponse {
    #[serde(default)]
    choices: Vec<GroqChoice>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: GroqReply,
}

#[derive(Deserialize)]
struct GroqReply {
    content: String,
}

impl LlmClient {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let api_key = match config.llm_provider {
            LlmProvider::Gemini => config.gemini_api_key.clone(),
            LlmProvider::Groq => config.groq_api_key.clone(),
        }
        .ok_or_else(|| {
            anyhow::anyhow!("No API key configured for LLM provider {:?}", config.llm_provider)
        })?;

        Self::new(config.llm_provider, api_key, config.timeout_seconds)
    }

    pub fn new(provider: LlmProvider, api_key: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let (base_url, model) = match provider {
            LlmProvider::Gemini => (GEMINI_BASE_URL, GEMINI_MODEL),
            LlmProvider::Groq => (GROQ_BASE_URL, GROQ_MODEL),
        };

        Ok(Self {
            client,
            provider,
            api_key,
            base_url: base_url.to_string(),
            model: model.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        info!("Sending completion request to {:?} ({})", self.provider, self.model);

        let request = match self.provider {
            LlmProvider::Gemini => self
                .client
                .post(format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.base_url, self.model
                ))
                .header(GEMINI_KEY_HEADER, &self.api_key)
                .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] })),
            LlmProvider::Groq => self
                .client
                .post(format!("{}/openai/v1/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&json!({
                    "model": self.model,
                    "messages": [{ "role": "user", "content": prompt }],
                })),
        };

        let response = request
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to send request to {:?}", self.provider))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("{:?} API error {}: {}", self.provider, status, error_text);
            anyhow::bail!("{:?} API returned error {}: {}", self.provider, status, error_text);
        }

        let text = match self.provider {
            LlmProvider::Gemini => {
                let body: GeminiResponse = response
                    .json()
                    .await
                    .map_err(reqwest::Error::without_url)
                    .context("Failed to parse Gemini response")?;
                body.candidates
                    .into_iter()
                    .next()
                    .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<String>())
            }
            LlmProvider::Groq => {
                let body: GroqResponse = response
                    .json()
                    .await
                    .map_err(reqwest::Error::without_url)
                    .context("Failed to parse Groq response")?;
                body.choices.into_iter().next().map(|c| c.message.content)
            }
        };

        let text = text.ok_or_else(|| anyhow::anyhow!("{:?} returned no candidates", self.provider))?;
        info!("Received completion from {:?}", self.provider);
        Ok(text)
    }
}
