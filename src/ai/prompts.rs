//! Deterministic prompt builders.
//!
//! Every builder caps how many memories, and how much of each, reaches the
//! model, so prompt size is bounded regardless of corpus size.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use crate::memory::truncate_preview;
use crate::memory::types::Memory;

pub const INSIGHTS_SAMPLE: usize = 20;
pub const INSIGHTS_PREVIEW_CHARS: usize = 200;
pub const PRODUCTIVITY_SAMPLE: usize = 5;
pub const PRODUCTIVITY_PREVIEW_CHARS: usize = 100;
pub const TEMPLATES_SAMPLE: usize = 10;

pub const TEST_PROMPT: &str = "Say \"Hello, RecallRift!\" to test the connection.";

/// One block per memory (title, date, category, tags, content), at most `limit`.
pub fn memory_context(memories: &[Memory], limit: usize) -> String {
    memories
        .iter()
        .take(limit)
        .map(|m| {
            format!(
                "Title: {}\nDate: {}\nCategory: {}\nTags: {}\nContent: {}\n---",
                m.title,
                m.created_at.format("%Y-%m-%d"),
                m.category.as_deref().unwrap_or("none"),
                join_or(&m.tags, "none"),
                m.content,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn ask(query: &str, memories: &[Memory], limit: usize) -> String {
    format!(
        "You are an AI assistant helping users search through their personal memories.\n\
         Based on the user's query, find the most relevant memories and provide a helpful response.\n\n\
         User's memories:\n{context}\n\n\
         User's query: \"{query}\"\n\n\
         Please:\n\
         1. Identify the most relevant memories\n\
         2. Provide a conversational response\n\
         3. Include specific details from the memories\n\
         4. If no relevant memories are found, suggest alternative searches\n\n\
         Format your response naturally, as if you're having a conversation with the user.\n",
        context = memory_context(memories, limit),
    )
}

pub fn summarize(memory: &Memory) -> String {
    format!(
        "Please provide a brief, insightful summary of this memory:\n\n\
         Title: {}\nContent: {}\nCategory: {}\nTags: {}\nCreated: {}\n\n\
         Create a 1-2 sentence summary that captures the key insight or main point.\n",
        memory.title,
        memory.content,
        memory.category.as_deref().unwrap_or("None"),
        join_or(&memory.tags, "None"),
        memory.created_at.format("%Y-%m-%d"),
    )
}

pub fn suggest_tags(content: &str) -> String {
    format!(
        "Based on the following content, suggest 3-5 relevant tags that would help categorize \
         and find this memory later.\n\
         Return only the tags, separated by commas, without any additional text.\n\n\
         Content: {content}\n"
    )
}

pub fn insights(memories: &[Memory]) -> String {
    let recent = memories
        .iter()
        .take(INSIGHTS_SAMPLE)
        .map(|m| format!("{}: {}", m.title, truncate_preview(&m.content, INSIGHTS_PREVIEW_CHARS)))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Analyze these recent memories and provide insights about patterns, themes, or \
         interesting observations:\n\n{recent}\n\n\
         Please provide:\n\
         1. Common themes or topics\n\
         2. Notable patterns in thinking\n\
         3. Interesting connections between ideas\n\
         4. Suggestions for future exploration\n\n\
         Keep the response conversational and insightful.\n"
    )
}

pub fn collection_suggestion(
    categories: &[String],
    tags: &[String],
    themes: &[String],
    total: usize,
) -> String {
    format!(
        "Based on the following memory analysis, suggest 1-3 smart collections that would help \
         organize these memories:\n\n\
         Categories: {categories}\nTags: {tags}\nContent Themes: {themes}\n\n\
         Total memories: {total}\n\n\
         Please suggest collections with:\n\
         1. A descriptive name\n\
         2. A brief description\n\
         3. Smart criteria (tags, categories, keywords)\n\
         4. A suitable color (blue, green, purple, red, yellow, indigo, pink, gray)\n\
         5. Estimated memory count\n\n\
         Format as JSON with structure:\n\
         {{\n  \"name\": \"Collection Name\",\n  \"description\": \"Brief description\",\n  \
         \"criteria\": {{\n    \"tags\": [\"tag1\", \"tag2\"],\n    \"categories\": [\"category1\"],\n    \
         \"keywords\": [\"keyword1\", \"keyword2\"]\n  }},\n  \"color\": \"blue\",\n  \"estimatedCount\": 10\n}}\n",
        categories = json_list(categories),
        tags = json_list(tags),
        themes = json_list(themes),
    )
}

/// Memories created in the 30 days before `now`, in input order.
pub fn recent_memories(memories: &[Memory], now: DateTime<Utc>) -> Vec<&Memory> {
    let cutoff = now - Duration::days(30);
    memories.iter().filter(|m| m.created_at > cutoff).collect()
}

pub fn productivity(memories: &[Memory], now: DateTime<Utc>) -> String {
    let recent = recent_memories(memories, now);
    let categories: HashSet<Option<&str>> =
        memories.iter().map(|m| m.category.as_deref()).collect();
    let tags: HashSet<&str> = memories
        .iter()
        .flat_map(|m| m.tags.iter().map(String::as_str))
        .collect();
    let favorites = memories.iter().filter(|m| m.is_favorite).count();
    let sample = recent
        .iter()
        .take(PRODUCTIVITY_SAMPLE)
        .map(|m| format!("- {}: {}", m.title, truncate_preview(&m.content, PRODUCTIVITY_PREVIEW_CHARS)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze these memory creation patterns and provide productivity insights:\n\n\
         Total memories: {total}\n\
         Recent memories (30 days): {recent}\n\
         Categories used: {categories}\n\
         Tags used: {tags}\n\
         Favorites: {favorites}\n\n\
         Sample recent memories:\n{sample}\n\n\
         Provide insights about:\n\
         1. Memory creation patterns\n\
         2. Areas of focus\n\
         3. Productivity trends\n\
         4. Recommendations for improvement\n\n\
         Format as JSON:\n\
         {{\n  \"recommendations\": [\"recommendation1\", \"recommendation2\"],\n  \
         \"growthAreas\": [\"area1\", \"area2\"],\n  \"patterns\": [\"pattern1\", \"pattern2\"]\n}}\n",
        total = memories.len(),
        recent = recent.len(),
        categories = categories.len(),
        tags = tags.len(),
    )
}

pub fn personalized_templates(memories: &[Memory]) -> String {
    let examples = memories
        .iter()
        .take(TEMPLATES_SAMPLE)
        .map(|m| format!("Title: {}\nContent: {}", m.title, m.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Based on these memory examples, create 2-3 personalized templates that match the \
         user's writing style:\n\n{examples}\n\n\
         Create templates that:\n\
         1. Match the user's typical structure and style\n\
         2. Include placeholder text that guides content creation\n\
         3. Are practical for the user's common themes\n\n\
         Format as JSON array:\n\
         [\n  {{\n    \"name\": \"Template Name\",\n    \"description\": \"Template description\",\n    \
         \"structure\": \"Template with {{placeholders}}\"\n  }}\n]\n"
    )
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn memory(i: usize) -> Memory {
        let created = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        Memory {
            id: i.to_string(),
            title: format!("Memory {i}"),
            content: "x".repeat(300),
            category: None,
            tags: Vec::new(),
            is_favorite: false,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_context_is_capped() {
        let memories: Vec<Memory> = (0..25).map(memory).collect();
        let context = memory_context(&memories, 10);
        assert_eq!(context.matches("Title: ").count(), 10);
        assert!(context.contains("Category: none"));
        assert!(context.contains("Tags: none"));
        assert!(context.contains("Date: 2024-02-01"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let memories: Vec<Memory> = (0..3).map(memory).collect();
        assert_eq!(ask("q", &memories, 10), ask("q", &memories, 10));
        assert!(ask("where?", &memories, 10).contains("User's query: \"where?\""));
    }

    #[test]
    fn test_insights_truncate_content() {
        let memories: Vec<Memory> = (0..30).map(memory).collect();
        let prompt = insights(&memories);
        assert_eq!(prompt.matches("Memory ").count(), INSIGHTS_SAMPLE);
        assert!(!prompt.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_collection_prompt_embeds_json_lists() {
        let prompt = collection_suggestion(&["Work".into()], &["rust".into()], &[], 4);
        assert!(prompt.contains("Categories: [\"Work\"]"));
        assert!(prompt.contains("Content Themes: []"));
        assert!(prompt.contains("\"estimatedCount\": 10"));
    }

    #[test]
    fn test_productivity_counts_recent() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let memories: Vec<Memory> = (0..8).map(memory).collect();
        let prompt = productivity(&memories, now);
        assert!(prompt.contains("Recent memories (30 days): 8"));
        assert_eq!(prompt.matches("- Memory ").count(), PRODUCTIVITY_SAMPLE);
    }
}
