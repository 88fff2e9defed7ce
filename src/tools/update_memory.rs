//! MCP `update_memory` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::memory::types::{normalize_tags, MemoryUpdate};

/// Parameters for the `update_memory` MCP tool. Omitted fields are left as is.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct UpdateMemoryParams {
    #[schemars(description = "ID of the memory to edit")]
    pub id: String,

    #[schemars(description = "New title")]
    pub title: Option<String>,

    #[schemars(description = "New body text")]
    pub content: Option<String>,

    #[schemars(description = "New category. An empty string clears the category.")]
    pub category: Option<String>,

    #[schemars(description = "Replacement tag list")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Set or clear the favorite flag")]
    pub is_favorite: Option<bool>,
}

impl UpdateMemoryParams {
    pub fn to_update(&self) -> Result<MemoryUpdate, String> {
        let update = MemoryUpdate {
            title: self.title.as_ref().map(|t| t.trim().to_string()),
            content: self.content.clone(),
            category: self.category.as_ref().map(|c| {
                let c = c.trim();
                (!c.is_empty()).then(|| c.to_string())
            }),
            tags: self.tags.as_ref().map(normalize_tags),
            is_favorite: self.is_favorite,
        };
        if update.is_empty() {
            return Err("nothing to update".into());
        }
        update.validate().map_err(|e| e.to_string())?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_category_clears() {
        let params = UpdateMemoryParams {
            id: "x".into(),
            category: Some("".into()),
            ..Default::default()
        };
        assert_eq!(params.to_update().unwrap().category, Some(None));
    }

    #[test]
    fn test_nothing_to_update() {
        let params = UpdateMemoryParams {
            id: "x".into(),
            ..Default::default()
        };
        assert!(params.to_update().is_err());
    }

    #[test]
    fn test_blank_title_rejected() {
        let params = UpdateMemoryParams {
            id: "x".into(),
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(params.to_update().unwrap_err().contains("title"));
    }
}
