//! CLI `reset` command: delete all memories after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use crate::config::RecallConfig;
use crate::memory::store;

/// Delete all memories. Categories, settings and collections are kept.
pub fn reset(config: &RecallConfig, yes: bool) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !yes {
        println!("WARNING: This will permanently delete ALL memories.");
        println!("Database: {}", db_path.display());
        println!("Consider `recallrift backup > backup.json` first.");
        print!("\nType YES to confirm: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if input.trim() != "YES" {
            bail!("reset cancelled");
        }
    }

    let conn = super::open_store(config)?;
    let deleted = store::clear_memories(&conn)?;

    println!("Deleted {deleted} memories. Database reset complete.");
    Ok(())
}
