#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use recallrift::db;
use recallrift::memory::store;
use recallrift::memory::types::Memory;
use rusqlite::Connection;

/// Open a fresh in-memory database with the schema applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// A fixed "now" so date arithmetic in tests is deterministic:
/// Wednesday 2024-05-15 15:00:00 UTC.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 15, 15, 0, 0).unwrap()
}

/// Build an unsaved memory created (and last updated) at `created_at`.
pub fn memory_at(title: &str, created_at: DateTime<Utc>) -> Memory {
    Memory {
        id: uuid::Uuid::now_v7().to_string(),
        title: title.to_string(),
        content: format!("{title} content"),
        category: None,
        tags: Vec::new(),
        is_favorite: false,
        created_at,
        updated_at: created_at,
    }
}

pub fn memory_days_ago(title: &str, now: DateTime<Utc>, days: i64) -> Memory {
    memory_at(title, now - Duration::days(days))
}

/// Insert a fully-formed memory (keeping its timestamps) and return it.
pub fn insert(conn: &Connection, memory: Memory) -> Memory {
    store::insert_memory(conn, &memory).unwrap();
    memory
}
