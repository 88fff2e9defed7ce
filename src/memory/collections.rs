//! Saved collections: named criteria evaluated against memories.
//!
//! The full list is stored as one JSON array under the
//! [`COLLECTIONS_KEY`] setting and rewritten on every change.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::settings;
use super::types::{normalize_tags, Memory};
use super::now_millis;

pub const COLLECTIONS_KEY: &str = "smart_collections";
pub const DEFAULT_COLOR: &str = "blue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    #[default]
    Manual,
    Smart,
}

/// Match rules. A memory matches when any rule hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
}

impl Criteria {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.categories.is_empty() && self.keywords.is_empty()
    }

    /// Empty criteria match nothing.
    pub fn matches(&self, memory: &Memory) -> bool {
        if self.tags.iter().any(|t| memory.has_tag(t)) {
            return true;
        }
        if let Some(category) = memory.category.as_deref() {
            if self.categories.iter().any(|c| c == category) {
                return true;
            }
        }
        let title = memory.title.to_lowercase();
        let content = memory.content.to_lowercase();
        self.keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .any(|k| title.contains(&k) || content.contains(&k))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: CollectionKind,
    #[serde(default)]
    pub criteria: Criteria,
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A proposed smart collection, as produced by the AI layer or its local
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionSuggestion {
    pub name: String,
    pub description: String,
    pub criteria: Criteria,
    pub color: String,
    pub estimated_count: usize,
}

/// Input for [`create_collection`].
#[derive(Debug, Clone, Default)]
pub struct NewCollection {
    pub name: String,
    pub description: String,
    pub kind: CollectionKind,
    pub criteria: Criteria,
    pub color: Option<String>,
}

impl NewCollection {
    /// Model-proposed tags are normalized like user input so they can match.
    pub fn from_suggestion(suggestion: CollectionSuggestion) -> Self {
        let criteria = Criteria {
            tags: normalize_tags(&suggestion.criteria.tags),
            ..suggestion.criteria
        };
        Self {
            name: suggestion.name,
            description: suggestion.description,
            kind: CollectionKind::Smart,
            criteria,
            color: Some(suggestion.color).filter(|c| !c.is_empty()),
        }
    }
}

// ── Persistence ───────────────────────────────────────────────────────────────

pub fn load_collections(conn: &Connection) -> Result<Vec<Collection>> {
    match settings::get_setting(conn, COLLECTIONS_KEY)? {
        Some(raw) => serde_json::from_str(&raw).context("stored collections are not valid JSON"),
        None => Ok(Vec::new()),
    }
}

pub fn save_collections(conn: &Connection, collections: &[Collection]) -> Result<()> {
    let raw = serde_json::to_string(collections)?;
    settings::set_setting(conn, COLLECTIONS_KEY, &raw)
}

pub fn create_collection(conn: &Connection, new: NewCollection) -> Result<Collection> {
    let name = new.name.trim();
    if name.is_empty() {
        bail!("collection name must not be empty");
    }

    let collection = Collection {
        id: uuid::Uuid::now_v7().to_string(),
        name: name.to_string(),
        description: new.description.trim().to_string(),
        kind: new.kind,
        criteria: new.criteria,
        color: new.color.unwrap_or_else(default_color),
        created_at: now_millis(),
    };

    let mut all = load_collections(conn)?;
    all.push(collection.clone());
    save_collections(conn, &all)?;

    tracing::debug!(id = %collection.id, name = %collection.name, "collection created");
    Ok(collection)
}

/// Create a smart collection from a suggestion.
pub fn from_suggestion(conn: &Connection, suggestion: CollectionSuggestion) -> Result<Collection> {
    create_collection(conn, NewCollection::from_suggestion(suggestion))
}

/// Look up a collection by ID, or by exact name if no ID matches.
pub fn find_collection(conn: &Connection, id_or_name: &str) -> Result<Option<Collection>> {
    let all = load_collections(conn)?;
    let found = all
        .iter()
        .find(|c| c.id == id_or_name)
        .or_else(|| all.iter().find(|c| c.name == id_or_name))
        .cloned();
    Ok(found)
}

/// Returns `false` if no collection had this ID.
pub fn delete_collection(conn: &Connection, id: &str) -> Result<bool> {
    let mut all = load_collections(conn)?;
    let before = all.len();
    all.retain(|c| c.id != id);
    if all.len() == before {
        return Ok(false);
    }
    save_collections(conn, &all)?;
    Ok(true)
}

/// Memories in `memories` matching the collection's criteria, order kept.
pub fn collection_members(collection: &Collection, memories: &[Memory]) -> Vec<Memory> {
    memories
        .iter()
        .filter(|m| collection.criteria.matches(m))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn memory(title: &str, category: Option<&str>, tags: &[&str]) -> Memory {
        let now = now_millis();
        Memory {
            id: title.into(),
            title: title.into(),
            content: format!("{title} body"),
            category: category.map(String::from),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_criteria_match_nothing() {
        let m = memory("anything", Some("Work"), &["a"]);
        assert!(!Criteria::default().matches(&m));
    }

    #[test]
    fn criteria_match_any_rule() {
        let criteria = Criteria {
            tags: vec!["travel".into()],
            categories: vec!["Work".into()],
            keywords: vec!["Habits".into()],
        };
        assert!(criteria.matches(&memory("x", None, &["travel"])));
        assert!(criteria.matches(&memory("x", Some("Work"), &[])));
        assert!(criteria.matches(&memory("Atomic habits", None, &[])));
        assert!(!criteria.matches(&memory("x", Some("work"), &["food"])));
    }

    #[test]
    fn test_create_list_delete() {
        let conn = db::open_memory_database().unwrap();
        assert!(load_collections(&conn).unwrap().is_empty());

        let created = create_collection(
            &conn,
            NewCollection {
                name: "Trips".into(),
                criteria: Criteria {
                    tags: vec!["travel".into()],
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(created.color, DEFAULT_COLOR);
        assert_eq!(created.kind, CollectionKind::Manual);

        let found = find_collection(&conn, "Trips").unwrap().unwrap();
        assert_eq!(found, created);

        assert!(delete_collection(&conn, &created.id).unwrap());
        assert!(!delete_collection(&conn, &created.id).unwrap());
        assert!(load_collections(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let conn = db::open_memory_database().unwrap();
        let err = create_collection(&conn, NewCollection::default()).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_from_suggestion_is_smart() {
        let conn = db::open_memory_database().unwrap();
        let suggestion = CollectionSuggestion {
            name: "Recent Thoughts".into(),
            color: "purple".into(),
            criteria: Criteria {
                categories: vec!["Ideas".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let collection = from_suggestion(&conn, suggestion).unwrap();
        assert_eq!(collection.kind, CollectionKind::Smart);
        assert_eq!(collection.color, "purple");

        let members = collection_members(
            &collection,
            &[memory("a", Some("Ideas"), &[]), memory("b", Some("Work"), &[])],
        );
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].title, "a");
    }

    #[test]
    fn test_suggested_tags_are_normalized() {
        let conn = db::open_memory_database().unwrap();
        let suggestion = CollectionSuggestion {
            name: "Travel".into(),
            criteria: Criteria {
                tags: vec!["Travel".into(), " travel ".into(), "Japan".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let collection = from_suggestion(&conn, suggestion).unwrap();
        assert_eq!(collection.criteria.tags, vec!["travel", "japan"]);

        let members = collection_members(&collection, &[memory("kyoto", None, &["japan"])]);
        assert_eq!(members.len(), 1);
    }
}
