//! Generative-AI layer.
//!
//! Provides the [`CompletionProvider`] trait, a Gemini implementation, the
//! prompt builders, and [`AiGateway`], which turns completions into features.
//! The provider is created via [`create_provider`] from configuration.

pub mod gateway;
pub mod gemini;
pub mod parse;
pub mod prompts;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use thiserror::Error;

use crate::config::AiConfig;
use crate::memory::settings;

pub use gateway::AiGateway;

/// Failure of a single completion call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("AI API key not configured; set it with `recallrift setting set {key} <KEY>` or RECALLRIFT_AI_KEY", key = settings::AI_API_KEY)]
    MissingCredential,
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited by the AI provider; try again later")]
    RateLimited,
    #[error("AI provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("malformed AI response: {0}")]
    MalformedResponse(String),
}

/// A text-completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one prompt and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;

    fn name(&self) -> &'static str;

    fn model(&self) -> &str;
}

/// Create a completion provider from config.
///
/// Currently only `"gemini"` is supported. A missing key is not an error
/// here; calls fail with [`AiError::MissingCredential`] instead.
pub fn create_provider(config: &AiConfig, api_key: Option<String>) -> Result<Box<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "gemini" => {
            let provider = gemini::GeminiProvider::new(config, api_key)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown AI provider: {other}. Supported: gemini"),
    }
}

/// API key from config (or `RECALLRIFT_AI_KEY`), else the stored setting.
pub fn resolve_api_key(config: &AiConfig, conn: &Connection) -> Result<Option<String>> {
    if let Some(key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        return Ok(Some(key.to_string()));
    }
    let stored = settings::get_setting(conn, settings::AI_API_KEY)?;
    Ok(stored.filter(|k| !k.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_config_key_wins_over_setting() {
        let conn = db::open_memory_database().unwrap();
        settings::set_setting(&conn, settings::AI_API_KEY, "from-settings").unwrap();

        let mut config = AiConfig::default();
        assert_eq!(
            resolve_api_key(&config, &conn).unwrap().as_deref(),
            Some("from-settings")
        );

        config.api_key = Some("from-config".into());
        assert_eq!(
            resolve_api_key(&config, &conn).unwrap().as_deref(),
            Some("from-config")
        );
    }

    #[test]
    fn test_blank_key_is_none() {
        let conn = db::open_memory_database().unwrap();
        settings::set_setting(&conn, settings::AI_API_KEY, "  ").unwrap();
        assert!(resolve_api_key(&AiConfig::default(), &conn).unwrap().is_none());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = AiConfig {
            provider: "nope".into(),
            ..Default::default()
        };
        let err = create_provider(&config, None).err().unwrap();
        assert!(err.to_string().contains("unknown AI provider"));
    }
}
