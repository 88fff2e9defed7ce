//! Core record type definitions.
//!
//! Defines [`Memory`] (a user-authored note), [`Category`] (a named, colored
//! label), [`Setting`] (a key/value pair), and the edge-side input types
//! [`NewMemory`] and [`MemoryUpdate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default display color for new categories.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// A memory record, matching the `memories` table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    /// UUID v7 primary key, assigned by the store.
    pub id: String,
    pub title: String,
    pub content: String,
    /// Soft reference to a [`Category`] name. Not enforced by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Lowercase tags in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl Memory {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A named, colored label for memories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// A generic key/value setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Rejected input at the system edge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("content must not be empty")]
    EmptyContent,
    #[error("category name must not be empty")]
    EmptyCategoryName,
}

/// Input for creating a memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMemory {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewMemory {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Title and content must be non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Partial update of a memory. `None` leaves a field untouched;
/// `category: Some(None)` clears the category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

impl MemoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.is_favorite.is_none()
    }

    /// Edited title/content must stay non-blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::EmptyTitle);
        }
        if matches!(self.content.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err(ValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Normalize user-supplied tags: trim, lowercase, drop blanks and repeats.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Parse a comma-separated tag list (`"rust, Notes ,cli"`).
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_blank_fields() {
        assert_eq!(
            NewMemory::new("  ", "body").validate(),
            Err(ValidationError::EmptyTitle)
        );
        assert_eq!(
            NewMemory::new("title", "").validate(),
            Err(ValidationError::EmptyContent)
        );
        assert!(NewMemory::new("title", "body").validate().is_ok());
    }

    #[test]
    fn update_validation_only_checks_present_fields() {
        assert!(MemoryUpdate::default().validate().is_ok());
        let update = MemoryUpdate {
            content: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(update.validate(), Err(ValidationError::EmptyContent));
    }

    #[test]
    fn tags_are_normalized() {
        assert_eq!(
            parse_tag_list("Rust, notes ,, rust,CLI"),
            vec!["rust", "notes", "cli"]
        );
    }

    #[test]
    fn memory_serializes_camel_case() {
        let now = Utc::now();
        let memory = Memory {
            id: "1".into(),
            title: "t".into(),
            content: "c".into(),
            category: None,
            tags: vec!["a".into()],
            is_favorite: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&memory).unwrap();
        assert_eq!(json["isFavorite"], true);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("category").is_none());
    }
}
