//! JSON export, full backup, and import with validation and merge policies.
//!
//! The interchange document:
//!
//! ```json
//! { "metadata": { "version": "1.0", "exportDate": "...", "totalMemories": 2, "kind": "export" },
//!   "memories": [ { "title": "...", "content": "...", "tags": [], "createdAt": "..." } ],
//!   "categories": [ { "name": "Work", "color": "#EF4444" } ] }
//! ```
//!
//! Import validates the whole payload before writing anything. Once writing
//! starts, a failing item is counted and skipped.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Category, Memory, NewMemory, DEFAULT_CATEGORY_COLOR};
use super::{categories, now_millis, store};

pub const FORMAT_VERSION: &str = "1.0";

// ── Document types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    #[default]
    Export,
    FullBackup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub total_memories: usize,
    #[serde(default, alias = "type")]
    pub kind: ExportKind,
}

/// A memory as it appears in the interchange document. Every field is
/// lenient on the way in so that validation can report what is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub is_favorite: bool,
}

impl MemoryRecord {
    fn from_memory(memory: &Memory, include_metadata: bool) -> Self {
        Self {
            id: include_metadata.then(|| memory.id.clone()),
            title: memory.title.clone(),
            content: memory.content.clone(),
            category: memory.category.clone(),
            tags: memory.tags.clone(),
            created_at: include_metadata.then_some(memory.created_at),
            updated_at: include_metadata.then_some(memory.updated_at),
            is_favorite: memory.is_favorite,
        }
    }

    /// Name of the first required field that is missing or blank.
    fn missing_field(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some("title")
        } else if self.content.trim().is_empty() {
            Some("content")
        } else if self.created_at.is_none() {
            Some("createdAt")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&Category> for CategoryRecord {
    fn from(category: &Category) -> Self {
        Self {
            id: Some(category.id.clone()),
            name: category.name.clone(),
            color: Some(category.color.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub memories: Vec<MemoryRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryRecord>>,
}

/// Import side of the document. `memories` stays optional so that a
/// payload without it can be rejected by validation rather than by the parser.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImportDocument {
    memories: Option<Vec<MemoryRecord>>,
    categories: Option<Vec<CategoryRecord>>,
}

// ── Export ────────────────────────────────────────────────────────────────────

/// Which memories to export, by `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportRange {
    #[default]
    All,
    Last30,
    Last90,
    /// Both bounds inclusive; a missing bound is open.
    Custom {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl ExportRange {
    fn contains(&self, ts: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let (start, end) = match *self {
            Self::All => return true,
            Self::Last30 => (Some(now - Duration::days(30)), Some(now)),
            Self::Last90 => (Some(now - Duration::days(90)), Some(now)),
            Self::Custom { start, end } => (start, end),
        };
        start.is_none_or(|s| ts >= s) && end.is_none_or(|e| ts <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub range: ExportRange,
    /// Keep memories in any of these categories. Empty keeps all.
    pub categories: Vec<String>,
    /// Keep memories carrying any of these tags. Empty keeps all.
    pub tags: Vec<String>,
    /// When false, `id`, `createdAt` and `updatedAt` are left out.
    pub include_metadata: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            range: ExportRange::All,
            categories: Vec::new(),
            tags: Vec::new(),
            include_metadata: true,
        }
    }
}

/// Build an export document. Categories are included only when the export
/// is not restricted to particular categories.
pub fn export(conn: &Connection, options: &ExportOptions, now: DateTime<Utc>) -> Result<ExportDocument> {
    let memories: Vec<MemoryRecord> = store::list_memories(conn)?
        .iter()
        .filter(|m| options.range.contains(m.created_at, now))
        .filter(|m| {
            options.categories.is_empty()
                || m.category
                    .as_ref()
                    .is_some_and(|c| options.categories.contains(c))
        })
        .filter(|m| options.tags.is_empty() || m.tags.iter().any(|t| options.tags.contains(t)))
        .map(|m| MemoryRecord::from_memory(m, options.include_metadata))
        .collect();

    let categories = if options.categories.is_empty() {
        Some(
            categories::list_categories(conn)?
                .iter()
                .map(CategoryRecord::from)
                .collect(),
        )
    } else {
        None
    };

    tracing::info!(memories = memories.len(), "export prepared");
    Ok(ExportDocument {
        metadata: ExportMetadata {
            version: FORMAT_VERSION.to_string(),
            export_date: now,
            total_memories: memories.len(),
            kind: ExportKind::Export,
        },
        memories,
        categories,
    })
}

/// Everything, with metadata, tagged as a full backup.
pub fn backup(conn: &Connection, now: DateTime<Utc>) -> Result<ExportDocument> {
    let mut document = export(conn, &ExportOptions::default(), now)?;
    document.metadata.kind = ExportKind::FullBackup;
    Ok(document)
}

// ── Import ────────────────────────────────────────────────────────────────────

/// What to do when an incoming memory's ID already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Keep the stored record.
    #[default]
    Skip,
    /// Overwrite the stored record with the incoming one.
    Replace,
    /// Field-level merge: the newer `updatedAt` wins text fields, tags are
    /// unioned, and the favorite flag is OR-ed.
    Merge,
}

impl std::str::FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(format!("unknown merge mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub merge_mode: MergeMode,
    /// Keep incoming IDs for new records instead of assigning fresh ones.
    pub preserve_ids: bool,
    /// Reject the whole payload if any memory lacks title, content or createdAt.
    pub validate: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            merge_mode: MergeMode::Skip,
            preserve_ids: false,
            validate: true,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total: usize,
    pub categories_created: usize,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid import data: {0}")]
    Validation(String),
}

enum Outcome {
    Imported,
    Skipped,
}

pub fn import(conn: &Connection, json: &str, options: &ImportOptions) -> Result<ImportReport, TransferError> {
    import_with_progress(conn, json, options, |_| {})
}

/// Import, calling `on_item` with the running count after each memory.
pub fn import_with_progress(
    conn: &Connection,
    json: &str,
    options: &ImportOptions,
    mut on_item: impl FnMut(usize),
) -> Result<ImportReport, TransferError> {
    let document: ImportDocument = serde_json::from_str(json)?;

    if options.validate {
        validate(&document)?;
    }

    let memories = document.memories.unwrap_or_default();
    let mut report = ImportReport {
        total: memories.len(),
        ..Default::default()
    };

    for (i, record) in memories.iter().enumerate() {
        match import_one(conn, record, options) {
            Ok(Outcome::Imported) => report.imported += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(e) => {
                tracing::warn!(index = i, error = %e, "failed to import memory");
                report.errors += 1;
            }
        }
        on_item(i + 1);
    }

    for record in document.categories.unwrap_or_default() {
        match import_category(conn, &record) {
            Ok(true) => report.categories_created += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!(name = %record.name, error = %e, "failed to import category"),
        }
    }

    tracing::info!(
        imported = report.imported,
        skipped = report.skipped,
        errors = report.errors,
        "import complete"
    );
    Ok(report)
}

fn validate(document: &ImportDocument) -> Result<(), TransferError> {
    let Some(memories) = &document.memories else {
        return Err(TransferError::Validation("missing `memories` array".into()));
    };
    for (i, record) in memories.iter().enumerate() {
        if let Some(field) = record.missing_field() {
            return Err(TransferError::Validation(format!(
                "memory #{} is missing `{field}`",
                i + 1
            )));
        }
    }
    Ok(())
}

fn import_one(conn: &Connection, record: &MemoryRecord, options: &ImportOptions) -> Result<Outcome> {
    NewMemory::new(record.title.clone(), record.content.clone()).validate()?;

    let existing = match record.id.as_deref() {
        Some(id) => store::get_memory(conn, id)?,
        None => None,
    };

    match (existing, options.merge_mode) {
        (Some(_), MergeMode::Skip) => Ok(Outcome::Skipped),
        (Some(existing), MergeMode::Replace) => {
            store::replace_memory(conn, &to_memory(record, existing.id))?;
            Ok(Outcome::Imported)
        }
        (Some(existing), MergeMode::Merge) => {
            store::replace_memory(conn, &merge(existing, record))?;
            Ok(Outcome::Imported)
        }
        (None, _) => {
            let id = record
                .id
                .clone()
                .filter(|id| options.preserve_ids && !id.is_empty())
                .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
            store::insert_memory(conn, &to_memory(record, id))?;
            Ok(Outcome::Imported)
        }
    }
}

/// Materialize a record with `id`. Missing timestamps default to now.
fn to_memory(record: &MemoryRecord, id: String) -> Memory {
    let created_at = record.created_at.unwrap_or_else(now_millis);
    Memory {
        id,
        title: record.title.clone(),
        content: record.content.clone(),
        category: record.category.clone().filter(|c| !c.is_empty()),
        tags: record.tags.clone(),
        is_favorite: record.is_favorite,
        created_at,
        updated_at: record.updated_at.unwrap_or(created_at),
    }
}

fn merge(existing: Memory, record: &MemoryRecord) -> Memory {
    let incoming = to_memory(record, existing.id.clone());
    let incoming_newer = incoming.updated_at > existing.updated_at;
    let (newer, older) = if incoming_newer {
        (incoming, existing)
    } else {
        (existing, incoming)
    };

    let mut tags = older.tags.clone();
    for tag in &newer.tags {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }

    Memory {
        category: newer.category.clone().or(older.category.clone()),
        tags,
        is_favorite: newer.is_favorite || older.is_favorite,
        created_at: newer.created_at.min(older.created_at),
        ..newer
    }
}

/// Create the category unless one with this name exists.
fn import_category(conn: &Connection, record: &CategoryRecord) -> Result<bool> {
    let name = record.name.trim();
    if name.is_empty() || categories::get_category_by_name(conn, name)?.is_some() {
        return Ok(false);
    }
    let color = record.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR);
    categories::create_category(conn, name, Some(color))?;
    Ok(true)
}
