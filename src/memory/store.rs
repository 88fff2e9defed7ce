//! Memory persistence: create, read, update, delete, favorite toggle, and
//! bulk removal over the `memories` table.
//!
//! The store trusts its input; title/content validation happens at the edge
//! via [`NewMemory::validate`](super::types::NewMemory::validate).

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::types::{Memory, MemoryUpdate, NewMemory};
use super::{now_millis, timestamp_from_sql, timestamp_to_sql};

const MEMORY_COLUMNS: &str =
    "id, title, content, category, tags, is_favorite, created_at, updated_at";

/// Outcome of a best-effort bulk delete.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub deleted: usize,
    pub missing: usize,
    pub errors: usize,
}

/// Create a memory with a fresh UUID v7. `is_favorite` starts false and both
/// timestamps are set to now.
pub fn create_memory(conn: &Connection, new: &NewMemory) -> Result<Memory> {
    let now = now_millis();
    let memory = Memory {
        id: uuid::Uuid::now_v7().to_string(),
        title: new.title.clone(),
        content: new.content.clone(),
        category: new.category.clone().filter(|c| !c.is_empty()),
        tags: new.tags.clone(),
        is_favorite: false,
        created_at: now,
        updated_at: now,
    };
    insert_memory(conn, &memory)?;

    tracing::debug!(id = %memory.id, "memory created");
    Ok(memory)
}

/// Insert a fully-formed record as-is (id and timestamps included). Used by
/// import and seeding.
pub fn insert_memory(conn: &Connection, memory: &Memory) -> Result<()> {
    let tags_json = serde_json::to_string(&memory.tags)?;
    conn.execute(
        &format!("INSERT INTO memories ({MEMORY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            memory.id,
            memory.title,
            memory.content,
            memory.category,
            tags_json,
            memory.is_favorite,
            timestamp_to_sql(&memory.created_at),
            timestamp_to_sql(&memory.updated_at),
        ],
    )
    .with_context(|| format!("failed to insert memory {}", memory.id))?;
    Ok(())
}

/// Overwrite every mutable column of an existing record, keeping its id.
pub fn replace_memory(conn: &Connection, memory: &Memory) -> Result<()> {
    let tags_json = serde_json::to_string(&memory.tags)?;
    let rows = conn.execute(
        "UPDATE memories SET title = ?1, content = ?2, category = ?3, tags = ?4, \
         is_favorite = ?5, created_at = ?6, updated_at = ?7 WHERE id = ?8",
        params![
            memory.title,
            memory.content,
            memory.category,
            tags_json,
            memory.is_favorite,
            timestamp_to_sql(&memory.created_at),
            timestamp_to_sql(&memory.updated_at),
            memory.id,
        ],
    )?;
    if rows == 0 {
        bail!("memory not found: {}", memory.id);
    }
    Ok(())
}

/// Fetch a memory by ID.
pub fn get_memory(conn: &Connection, id: &str) -> Result<Option<Memory>> {
    let memory = conn
        .query_row(
            &format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"),
            params![id],
            memory_from_row,
        )
        .optional()?;
    Ok(memory)
}

/// All memories, newest first. Ties keep reverse insertion order.
pub fn list_memories(conn: &Connection) -> Result<Vec<Memory>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMORY_COLUMNS} FROM memories ORDER BY created_at DESC, rowid DESC"
    ))?;
    let memories = stmt
        .query_map([], memory_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(memories)
}

/// Memories whose category equals `category` exactly, newest first.
pub fn memories_by_category(conn: &Connection, category: &str) -> Result<Vec<Memory>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMORY_COLUMNS} FROM memories WHERE category = ?1 \
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let memories = stmt
        .query_map(params![category], memory_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(memories)
}

pub fn count_memories(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
    Ok(count as usize)
}

/// Apply a partial update and refresh `updated_at`. Returns the updated record.
pub fn update_memory(conn: &Connection, id: &str, update: &MemoryUpdate) -> Result<Memory> {
    let Some(mut memory) = get_memory(conn, id)? else {
        bail!("memory not found: {id}");
    };

    if let Some(ref title) = update.title {
        memory.title = title.clone();
    }
    if let Some(ref content) = update.content {
        memory.content = content.clone();
    }
    if let Some(ref category) = update.category {
        memory.category = category.clone().filter(|c| !c.is_empty());
    }
    if let Some(ref tags) = update.tags {
        memory.tags = tags.clone();
    }
    if let Some(favorite) = update.is_favorite {
        memory.is_favorite = favorite;
    }
    memory.updated_at = now_millis();

    replace_memory(conn, &memory)?;
    tracing::debug!(id = %id, "memory updated");
    Ok(memory)
}

/// Flip the favorite flag. Returns `None` if the memory does not exist.
pub fn toggle_favorite(conn: &Connection, id: &str) -> Result<Option<Memory>> {
    let Some(mut memory) = get_memory(conn, id)? else {
        return Ok(None);
    };
    memory.is_favorite = !memory.is_favorite;
    memory.updated_at = now_millis();
    conn.execute(
        "UPDATE memories SET is_favorite = ?1, updated_at = ?2 WHERE id = ?3",
        params![memory.is_favorite, timestamp_to_sql(&memory.updated_at), id],
    )?;
    Ok(Some(memory))
}

/// Delete a memory. Returns `false` if it did not exist.
pub fn delete_memory(conn: &Connection, id: &str) -> Result<bool> {
    let rows = conn.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

/// Delete many memories, continuing past per-item failures.
pub fn delete_memories(conn: &Connection, ids: &[String]) -> BulkDeleteReport {
    let mut report = BulkDeleteReport::default();
    for id in ids {
        match delete_memory(conn, id) {
            Ok(true) => report.deleted += 1,
            Ok(false) => report.missing += 1,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "bulk delete item failed");
                report.errors += 1;
            }
        }
    }
    report
}

/// Remove every memory. Categories and settings are left alone.
pub fn clear_memories(conn: &Connection) -> Result<usize> {
    let rows = conn.execute("DELETE FROM memories", [])?;
    tracing::info!(deleted = rows, "all memories cleared");
    Ok(rows)
}

fn memory_from_row(row: &Row<'_>) -> rusqlite::Result<Memory> {
    let tags_json: String = row.get(4)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(Memory {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        tags,
        is_favorite: row.get(5)?,
        created_at: timestamp_from_sql(6, &created_at)?,
        updated_at: timestamp_from_sql(7, &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn sample(title: &str) -> NewMemory {
        NewMemory::new(title, format!("{title} body"))
            .with_category("Work")
            .with_tags(["rust", "notes"])
    }

    #[test]
    fn test_create_and_get() {
        let conn = test_db();
        let created = create_memory(&conn, &sample("First")).unwrap();

        assert!(!created.is_favorite);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = get_memory(&conn, &created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.tags, vec!["rust", "notes"]);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let conn = test_db();
        assert!(get_memory(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_empty_category_is_stored_as_none() {
        let conn = test_db();
        let created = create_memory(&conn, &NewMemory::new("t", "c").with_category("")).unwrap();
        assert!(created.category.is_none());
    }

    #[test]
    fn test_list_is_newest_first() {
        let conn = test_db();
        let a = create_memory(&conn, &sample("A")).unwrap();
        let b = create_memory(&conn, &sample("B")).unwrap();
        let c = create_memory(&conn, &sample("C")).unwrap();

        let ids: Vec<String> = list_memories(&conn).unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[test]
    fn test_memories_by_category_is_exact() {
        let conn = test_db();
        create_memory(&conn, &sample("Work item")).unwrap();
        create_memory(&conn, &NewMemory::new("Lower", "x").with_category("work")).unwrap();

        let found = memories_by_category(&conn, "Work").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Work item");
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let conn = test_db();
        let created = create_memory(&conn, &sample("Edit me")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        let update = MemoryUpdate {
            title: Some("Edited".into()),
            category: Some(None),
            ..Default::default()
        };
        let updated = update_memory(&conn, &created.id, &update).unwrap();

        assert_eq!(updated.title, "Edited");
        assert!(updated.category.is_none());
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[test]
    fn test_update_missing_fails() {
        let conn = test_db();
        let err = update_memory(&conn, "missing", &MemoryUpdate::default()).unwrap_err();
        assert!(err.to_string().contains("memory not found"));
    }

    #[test]
    fn test_toggle_favorite() {
        let conn = test_db();
        let created = create_memory(&conn, &sample("Fav")).unwrap();

        let toggled = toggle_favorite(&conn, &created.id).unwrap().unwrap();
        assert!(toggled.is_favorite);
        let toggled = toggle_favorite(&conn, &created.id).unwrap().unwrap();
        assert!(!toggled.is_favorite);

        assert!(toggle_favorite(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_delete_and_bulk_delete() {
        let conn = test_db();
        let a = create_memory(&conn, &sample("A")).unwrap();
        let b = create_memory(&conn, &sample("B")).unwrap();
        let c = create_memory(&conn, &sample("C")).unwrap();

        assert!(delete_memory(&conn, &a.id).unwrap());
        assert!(!delete_memory(&conn, &a.id).unwrap());

        let report = delete_memories(&conn, &[b.id.clone(), "ghost".into(), c.id.clone()]);
        assert_eq!(
            report,
            BulkDeleteReport {
                deleted: 2,
                missing: 1,
                errors: 0
            }
        );
        assert_eq!(count_memories(&conn).unwrap(), 0);
    }

    #[test]
    fn test_clear_leaves_categories() {
        let conn = test_db();
        create_memory(&conn, &sample("A")).unwrap();
        crate::memory::categories::create_category(&conn, "Work", None).unwrap();

        assert_eq!(clear_memories(&conn).unwrap(), 1);
        assert_eq!(count_memories(&conn).unwrap(), 0);
        assert_eq!(crate::memory::categories::list_categories(&conn).unwrap().len(), 1);
    }
}
