//! Category storage.
//!
//! Category names are a soft reference from `memories.category`: names are
//! not unique and deleting a category leaves memories that mention it alone.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::{Category, ValidationError, DEFAULT_CATEGORY_COLOR};
use super::{now_millis, timestamp_from_sql, timestamp_to_sql};

/// Create a category. `color` defaults to [`DEFAULT_CATEGORY_COLOR`].
pub fn create_category(conn: &Connection, name: &str, color: Option<&str>) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategoryName.into());
    }

    let category = Category {
        id: uuid::Uuid::now_v7().to_string(),
        name: name.to_string(),
        color: color.unwrap_or(DEFAULT_CATEGORY_COLOR).to_string(),
        created_at: now_millis(),
    };
    insert_category(conn, &category)?;
    Ok(category)
}

/// Insert a fully-formed category row.
pub fn insert_category(conn: &Connection, category: &Category) -> Result<()> {
    conn.execute(
        "INSERT INTO categories (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            category.id,
            category.name,
            category.color,
            timestamp_to_sql(&category.created_at)
        ],
    )?;
    Ok(())
}

/// All categories ordered by name.
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, color, created_at FROM categories ORDER BY name, created_at",
    )?;
    let rows = stmt
        .query_map([], category_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// First category (oldest) with exactly this name.
pub fn get_category_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            "SELECT id, name, color, created_at FROM categories WHERE name = ?1 \
             ORDER BY created_at LIMIT 1",
            params![name],
            category_from_row,
        )
        .optional()?;
    Ok(category)
}

/// Delete a category by ID. Returns `false` if it did not exist.
pub fn delete_category(conn: &Connection, id: &str) -> Result<bool> {
    let rows = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
    if rows > 0 {
        tracing::debug!(id = %id, "category deleted; memories keep their category text");
    }
    Ok(rows > 0)
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    let created_at: String = row.get(3)?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        created_at: timestamp_from_sql(3, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::memory::store;
    use crate::memory::types::NewMemory;

    #[test]
    fn test_create_defaults_color_and_lists_by_name() {
        let conn = db::open_memory_database().unwrap();
        create_category(&conn, "Work", Some("#EF4444")).unwrap();
        let ideas = create_category(&conn, "Ideas", None).unwrap();
        assert_eq!(ideas.color, DEFAULT_CATEGORY_COLOR);

        let names: Vec<String> = list_categories(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ideas", "Work"]);
    }

    #[test]
    fn test_blank_name_rejected() {
        let conn = db::open_memory_database().unwrap();
        assert!(create_category(&conn, "   ", None).is_err());
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let conn = db::open_memory_database().unwrap();
        let first = create_category(&conn, "Work", None).unwrap();
        create_category(&conn, "Work", None).unwrap();
        assert_eq!(list_categories(&conn).unwrap().len(), 2);
        assert_eq!(get_category_by_name(&conn, "Work").unwrap().unwrap().id, first.id);
    }

    #[test]
    fn test_delete_leaves_dangling_memory_category() {
        let conn = db::open_memory_database().unwrap();
        let cat = create_category(&conn, "Work", None).unwrap();
        let memory =
            store::create_memory(&conn, &NewMemory::new("t", "c").with_category("Work")).unwrap();

        assert!(delete_category(&conn, &cat.id).unwrap());
        assert!(!delete_category(&conn, &cat.id).unwrap());

        let still = store::get_memory(&conn, &memory.id).unwrap().unwrap();
        assert_eq!(still.category.as_deref(), Some("Work"));
    }
}
