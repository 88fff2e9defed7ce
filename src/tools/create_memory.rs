//! MCP `create_memory` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::memory::types::{normalize_tags, NewMemory};

/// Parameters for the `create_memory` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateMemoryParams {
    #[schemars(description = "Short title of the memory")]
    pub title: String,

    #[schemars(description = "The body text of the memory")]
    pub content: String,

    #[schemars(description = "Optional category name, e.g. 'Work' or 'Ideas'")]
    pub category: Option<String>,

    #[schemars(description = "Optional tags. Lowercased and de-duplicated.")]
    pub tags: Option<Vec<String>>,

    #[schemars(
        description = "If true and no tags are given, ask the AI provider to suggest tags. Defaults to false."
    )]
    pub suggest_tags: Option<bool>,
}

impl CreateMemoryParams {
    /// Validated input for the store.
    pub fn to_new_memory(&self) -> Result<NewMemory, String> {
        let mut new = NewMemory::new(self.title.trim(), self.content.clone())
            .with_tags(normalize_tags(self.tags.iter().flatten()));
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            new = new.with_category(category);
        }
        new.validate().map_err(|e| e.to_string())?;
        Ok(new)
    }

    pub fn wants_suggestions(&self) -> bool {
        self.suggest_tags.unwrap_or(false) && self.tags.as_ref().is_none_or(|t| t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(title: &str, content: &str) -> CreateMemoryParams {
        CreateMemoryParams {
            title: title.into(),
            content: content.into(),
            category: Some("  ".into()),
            tags: Some(vec!["Rust".into(), "rust".into(), " cli ".into()]),
            suggest_tags: Some(true),
        }
    }

    #[test]
    fn test_normalizes_input() {
        let new = params(" Title ", "Body").to_new_memory().unwrap();
        assert_eq!(new.title, "Title");
        assert!(new.category.is_none());
        assert_eq!(new.tags, vec!["rust", "cli"]);
    }

    #[test]
    fn test_rejects_blank_content() {
        let err = params("Title", "   ").to_new_memory().unwrap_err();
        assert!(err.contains("content"));
    }

    #[test]
    fn test_suggestions_only_without_tags() {
        assert!(!params("t", "c").wants_suggestions());
        let mut p = params("t", "c");
        p.tags = None;
        assert!(p.wants_suggestions());
    }
}
