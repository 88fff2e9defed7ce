//! Terminal commands. Each submodule backs one `recallrift` subcommand or
//! subcommand group; all of them print to stdout and log to stderr.

pub mod ai;
pub mod analytics;
pub mod categories;
pub mod collections;
pub mod doctor;
pub mod export;
pub mod import;
pub mod memories;
pub mod reset;
pub mod search;
pub mod seed;
pub mod settings;
pub mod templates;

use anyhow::Result;
use rusqlite::Connection;

use crate::config::RecallConfig;
use crate::memory::types::Memory;
use crate::memory::truncate_preview;

const PREVIEW_CHARS: usize = 100;

/// Open (and initialize if needed) the configured database.
pub(crate) fn open_store(config: &RecallConfig) -> Result<Connection> {
    let db_path = config.resolved_db_path();
    crate::db::open_database(&db_path)
}

/// One-entry listing: star, id, title, category, tags, then a preview line.
pub(crate) fn print_memory_line(index: usize, memory: &Memory) {
    let star = if memory.is_favorite { "*" } else { " " };
    println!(
        "  {}. {star} {} ({})",
        index + 1,
        memory.title,
        memory.category.as_deref().unwrap_or("uncategorized"),
    );
    println!("     id: {}  created: {}", memory.id, memory.created_at.format("%Y-%m-%d %H:%M"));
    if !memory.tags.is_empty() {
        println!("     tags: {}", memory.tags.join(", "));
    }
    println!("     {}", truncate_preview(&memory.content, PREVIEW_CHARS));
    println!();
}
