//! AI features over a [`CompletionProvider`].
//!
//! Interactive features (`ask`, `summarize`, `insights`, `test_connection`)
//! return the provider error to the caller. Background features
//! (`suggest_tags`, `suggest_collection`, `productivity_insights`,
//! `personalized_templates`) never fail: on a provider error or an
//! unparseable response they log a warning and return a fallback value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::parse::{parse_json, JsonShape};
use super::{prompts, AiError, CompletionProvider};
use crate::memory::analytics::rank;
use crate::memory::collections::{CollectionSuggestion, Criteria};
use crate::memory::types::{parse_tag_list, Memory};

/// Common words that say nothing about a memory's subject.
pub(crate) const STOP_WORDS: &[&str] = &[
    "this", "that", "with", "have", "will", "from", "they", "been", "would", "could", "should",
    "what", "about", "when", "where", "which", "there", "their", "your", "does", "were", "into",
];

const FALLBACK_CATEGORY: &str = "Personal";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductivityInsights {
    pub recommendations: Vec<String>,
    pub growth_areas: Vec<String>,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalizedTemplate {
    pub name: String,
    pub description: String,
    pub structure: String,
}

#[derive(Clone)]
pub struct AiGateway {
    provider: Arc<dyn CompletionProvider>,
    context_limit: usize,
}

impl AiGateway {
    pub fn new(provider: Arc<dyn CompletionProvider>, context_limit: usize) -> Self {
        Self {
            provider,
            context_limit: context_limit.max(1),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    // ── Interactive ──────────────────────────────────────────────────────────

    /// Answer a question against the first `context_limit` memories.
    pub async fn ask(&self, query: &str, memories: &[Memory]) -> Result<String, AiError> {
        let prompt = prompts::ask(query, memories, self.context_limit);
        self.provider.complete(&prompt).await
    }

    pub async fn summarize(&self, memory: &Memory) -> Result<String, AiError> {
        self.provider.complete(&prompts::summarize(memory)).await
    }

    pub async fn insights(&self, memories: &[Memory]) -> Result<String, AiError> {
        self.provider.complete(&prompts::insights(memories)).await
    }

    pub async fn test_connection(&self) -> Result<String, AiError> {
        self.provider.complete(prompts::TEST_PROMPT).await
    }

    // ── Background ───────────────────────────────────────────────────────────

    /// Comma-separated tags from the model, lowercased. Empty on failure.
    pub async fn suggest_tags(&self, content: &str) -> Vec<String> {
        match self.provider.complete(&prompts::suggest_tags(content)).await {
            Ok(text) => parse_tag_list(&text),
            Err(e) => {
                tracing::warn!(error = %e, "tag suggestion failed");
                Vec::new()
            }
        }
    }

    pub async fn suggest_collection(&self, memories: &[Memory]) -> CollectionSuggestion {
        let categories = category_patterns(memories);
        let tags = tag_patterns(memories);
        let themes = content_patterns(memories);
        let prompt = prompts::collection_suggestion(&categories, &tags, &themes, memories.len());

        let fallback = || CollectionSuggestion {
            name: "Recent Thoughts".into(),
            description: "Your most recent memories and ideas".into(),
            criteria: Criteria {
                tags: tags.iter().take(3).cloned().collect(),
                categories: categories.iter().take(2).cloned().collect(),
                keywords: Vec::new(),
            },
            color: "purple".into(),
            estimated_count: memories.len().min(20),
        };

        match self.provider.complete(&prompt).await {
            Ok(text) => parse_json::<CollectionSuggestion>(&text, JsonShape::Object)
                .filter(|s| !s.name.trim().is_empty())
                .unwrap_or_else(|| {
                    tracing::warn!("unparseable collection suggestion, using fallback");
                    fallback()
                }),
            Err(e) => {
                tracing::warn!(error = %e, "collection suggestion failed, using fallback");
                fallback()
            }
        }
    }

    pub async fn productivity_insights(
        &self,
        memories: &[Memory],
        now: DateTime<Utc>,
    ) -> ProductivityInsights {
        let fallback = || {
            let recent = prompts::recent_memories(memories, now).len();
            ProductivityInsights {
                recommendations: vec![
                    "Consider setting daily memory goals to maintain consistency".into(),
                    "Try using templates for common memory types".into(),
                    "Review and favorite your most important memories regularly".into(),
                ],
                growth_areas: vec![
                    "Increase categorization for better organization".into(),
                    "Add more detailed tags to improve searchability".into(),
                ],
                patterns: vec![
                    format!("You've created {recent} memories in the last 30 days"),
                    format!(
                        "Your most active category appears to be {}",
                        most_frequent_category(memories)
                    ),
                ],
            }
        };

        match self.provider.complete(&prompts::productivity(memories, now)).await {
            Ok(text) => parse_json(&text, JsonShape::Object).unwrap_or_else(|| {
                tracing::warn!("unparseable productivity insights, using fallback");
                fallback()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "productivity insights failed, using fallback");
                fallback()
            }
        }
    }

    pub async fn personalized_templates(&self, memories: &[Memory]) -> Vec<PersonalizedTemplate> {
        match self
            .provider
            .complete(&prompts::personalized_templates(memories))
            .await
        {
            Ok(text) => parse_json(&text, JsonShape::Array).unwrap_or_else(|| {
                tracing::warn!("unparseable template suggestions, returning none");
                Vec::new()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "template suggestions failed");
                Vec::new()
            }
        }
    }
}

// ── Local analysis ────────────────────────────────────────────────────────────

/// Up to 5 most used categories.
pub fn category_patterns(memories: &[Memory]) -> Vec<String> {
    rank(
        memories
            .iter()
            .filter_map(|m| m.category.as_deref())
            .filter(|c| !c.is_empty()),
        5,
    )
    .into_iter()
    .map(|(c, _)| c)
    .collect()
}

/// Up to 10 most used tags.
pub fn tag_patterns(memories: &[Memory]) -> Vec<String> {
    rank(memories.iter().flat_map(|m| m.tags.iter().map(String::as_str)), 10)
        .into_iter()
        .map(|(t, _)| t)
        .collect()
}

/// Up to 10 most frequent content words longer than four characters.
pub fn content_patterns(memories: &[Memory]) -> Vec<String> {
    let words: Vec<String> = memories
        .iter()
        .flat_map(|m| m.content.split_whitespace())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > 4 && !STOP_WORDS.contains(&w.as_str()))
        .collect();
    rank(words.iter().map(String::as_str), 10)
        .into_iter()
        .map(|(w, _)| w)
        .collect()
}

pub fn most_frequent_category(memories: &[Memory]) -> String {
    category_patterns(memories)
        .into_iter()
        .next()
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses in order and records every prompt.
    struct Scripted {
        responses: Mutex<VecDeque<Result<String, AiError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<String, AiError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for Scripted {
        async fn complete(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(AiError::Network("script exhausted".into())))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()
    }

    fn memory(title: &str, category: Option<&str>, tags: &[&str], age_days: i64) -> Memory {
        let created = now() - Duration::days(age_days);
        Memory {
            id: title.into(),
            title: title.into(),
            content: format!("{title} about gardening tomatoes"),
            category: category.map(String::from),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_favorite: false,
            created_at: created,
            updated_at: created,
        }
    }

    fn gateway(provider: Arc<Scripted>) -> AiGateway {
        AiGateway::new(provider, 10)
    }

    #[tokio::test]
    async fn test_ask_surfaces_errors() {
        let provider = Scripted::new(vec![Ok("answer".into()), Err(AiError::RateLimited)]);
        let gw = gateway(provider.clone());
        let memories = vec![memory("Garden", None, &[], 1)];

        assert_eq!(gw.ask("what grows?", &memories).await.unwrap(), "answer");
        assert_eq!(
            gw.ask("again", &memories).await.unwrap_err(),
            AiError::RateLimited
        );
        assert!(provider.prompts.lock().unwrap()[0].contains("Title: Garden"));
    }

    #[tokio::test]
    async fn test_suggest_tags_splits_and_falls_back() {
        let provider = Scripted::new(vec![
            Ok(" Gardening, Food ,, Summer\n".into()),
            Err(AiError::MissingCredential),
        ]);
        let gw = gateway(provider);
        assert_eq!(
            gw.suggest_tags("tomatoes").await,
            vec!["gardening", "food", "summer"]
        );
        assert!(gw.suggest_tags("tomatoes").await.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_collection_parses_json() {
        let reply = "Here you go:\n{\"name\":\"Garden Log\",\"description\":\"Plants\",\
                     \"criteria\":{\"tags\":[\"garden\"]},\"color\":\"green\",\"estimatedCount\":3}";
        let gw = gateway(Scripted::new(vec![Ok(reply.into())]));
        let suggestion = gw.suggest_collection(&[memory("a", None, &["garden"], 1)]).await;
        assert_eq!(suggestion.name, "Garden Log");
        assert_eq!(suggestion.criteria.tags, vec!["garden"]);
        assert_eq!(suggestion.estimated_count, 3);
    }

    #[tokio::test]
    async fn test_suggest_collection_fallback_uses_local_patterns() {
        let memories = vec![
            memory("a", Some("Work"), &["x", "y"], 1),
            memory("b", Some("Ideas"), &["y", "z", "w"], 2),
            memory("c", Some("Work"), &["y"], 3),
        ];
        let gw = gateway(Scripted::new(vec![Ok("no json here".into())]));
        let suggestion = gw.suggest_collection(&memories).await;

        assert_eq!(suggestion.name, "Recent Thoughts");
        assert_eq!(suggestion.color, "purple");
        assert_eq!(suggestion.criteria.tags, vec!["y", "x", "z"]);
        assert_eq!(suggestion.criteria.categories, vec!["Work", "Ideas"]);
        assert!(suggestion.criteria.keywords.is_empty());
        assert_eq!(suggestion.estimated_count, 3);
    }

    #[tokio::test]
    async fn test_productivity_fallback_patterns() {
        let memories = vec![
            memory("a", Some("Learning"), &[], 1),
            memory("b", None, &[], 45),
        ];
        let gw = gateway(Scripted::new(vec![Err(AiError::Network("down".into()))]));
        let insights = gw.productivity_insights(&memories, now()).await;

        assert_eq!(insights.recommendations.len(), 3);
        assert_eq!(insights.growth_areas.len(), 2);
        assert_eq!(
            insights.patterns,
            vec![
                "You've created 1 memories in the last 30 days".to_string(),
                "Your most active category appears to be Learning".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_personalized_templates_parse_or_empty() {
        let gw = gateway(Scripted::new(vec![
            Ok("[{\"name\":\"Log\",\"description\":\"d\",\"structure\":\"{x}\"}]".into()),
            Ok("sorry".into()),
        ]));
        let templates = gw.personalized_templates(&[]).await;
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Log");
        assert!(gw.personalized_templates(&[]).await.is_empty());
    }

    #[test]
    fn test_content_patterns_skip_short_and_stop_words() {
        let mut m = memory("a", None, &[], 0);
        m.content = "Would would tomatoes tomatoes basil garden garden garden".into();
        assert_eq!(content_patterns(&[m]), vec!["garden", "tomatoes", "basil"]);
    }

    #[test]
    fn test_most_frequent_category_default() {
        assert_eq!(most_frequent_category(&[]), "Personal");
    }
}
