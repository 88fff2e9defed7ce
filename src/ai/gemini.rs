//! Google Gemini `generateContent` over HTTPS.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{AiError, CompletionProvider};
use crate::config::AiConfig;

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(config: &AiConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(AiError::MissingCredential);
        };

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = self.url();
        tracing::debug!(url = %url, prompt_chars = prompt.len(), "gemini generateContent");

        let response = self
            .client
            .post(format!("{url}?key={key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Network(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| AiError::Network(e.without_url().to_string()))?;

        if status == 429 {
            tracing::warn!(model = %self.model, "gemini rate limit hit");
            return Err(AiError::RateLimited);
        }
        if !(200..300).contains(&status) {
            tracing::warn!(status, model = %self.model, "gemini API error");
            return Err(AiError::Http {
                status,
                message: error_message(&body_text),
            });
        }

        extract_text(&body_text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Text of the first candidate's parts, concatenated.
fn extract_text(body: &str) -> Result<String, AiError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AiError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AiError::MalformedResponse("response has no candidate text".into()));
    }
    Ok(text)
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => crate::memory::truncate_preview(body.trim(), 200),
    }
}
