//! MCP `ask_memories` tool parameter definition and context selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::ai::gateway::STOP_WORDS;
use crate::memory::search::score_memory;
use crate::memory::types::Memory;

/// Words shorter than this are not used to pick context.
const MIN_KEYWORD_CHARS: usize = 4;

/// Parameters for the `ask_memories` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AskMemoriesParams {
    #[schemars(description = "Question to answer using the stored memories")]
    pub question: String,

    #[schemars(description = "Optional category to restrict the context to")]
    pub category: Option<String>,
}

/// Memories most relevant to `question`, best first.
///
/// Each keyword of the question, minus stop words, is fuzzily scored against every memory and
/// the best keyword score counts. When nothing matches, all memories are
/// returned in their original order so the model still sees recent context.
pub fn select_context(memories: &[Memory], question: &str, threshold: f64) -> Vec<Memory> {
    let keywords: Vec<String> = question
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS && !STOP_WORDS.contains(&w.as_str()))
        .collect();

    let mut scored: Vec<(f64, &Memory)> = memories
        .iter()
        .filter_map(|m| {
            keywords
                .iter()
                .filter_map(|k| score_memory(m, k, threshold))
                .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
                .map(|score| (score, m))
        })
        .collect();

    if scored.is_empty() {
        return memories.to_vec();
    }

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, m)| m.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn memory(id: &str, title: &str, content: &str) -> Memory {
        let now = Utc::now();
        Memory {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            category: None,
            tags: Vec::new(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_relevant_memories_first() {
        let memories = vec![
            memory("a", "Groceries", "milk and eggs"),
            memory("b", "Kubernetes", "cluster upgrade notes"),
            memory("c", "Trip", "kubernetes meetup in Berlin"),
        ];
        let picked = select_context(&memories, "What about kubernetes?", 0.0);
        let ids: Vec<&str> = picked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_no_match_falls_back_to_all() {
        let memories = vec![memory("a", "Groceries", "milk"), memory("b", "Gym", "legs")];
        let picked = select_context(&memories, "zzzzqqqq?", 0.0);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].id, "a");
    }

    #[test]
    fn test_short_words_ignored() {
        let memories = vec![memory("a", "is it", "on"), memory("b", "x", "y")];
        let picked = select_context(&memories, "is it on", 0.0);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_stop_words_do_not_pick_context() {
        let memories = vec![
            memory("a", "What about lunch", "ideas about what to cook"),
            memory("b", "Garden", "tomatoes need water"),
        ];
        let picked = select_context(&memories, "What about tomatoes?", 0.0);
        let ids: Vec<&str> = picked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }
}
