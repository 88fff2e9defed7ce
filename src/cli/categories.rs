//! CLI `category add|list|delete` commands.

use anyhow::{bail, Result};

use crate::config::RecallConfig;
use crate::memory::{categories, store};

pub fn add(config: &RecallConfig, name: &str, color: Option<&str>) -> Result<()> {
    let conn = super::open_store(config)?;
    if categories::get_category_by_name(&conn, name.trim())?.is_some() {
        eprintln!("Note: a category named {:?} already exists.", name.trim());
    }
    let category = categories::create_category(&conn, name, color)?;
    println!("Created category {} ({}) {}", category.name, category.color, category.id);
    Ok(())
}

/// List categories with how many memories reference each name.
pub fn list(config: &RecallConfig) -> Result<()> {
    let conn = super::open_store(config)?;
    let all = categories::list_categories(&conn)?;
    if all.is_empty() {
        println!("No categories.");
        return Ok(());
    }

    let memories = store::list_memories(&conn)?;
    println!("{:<24} {:<10} {:>8}  ID", "Name", "Color", "Memories");
    for category in &all {
        let count = memories
            .iter()
            .filter(|m| m.category.as_deref() == Some(category.name.as_str()))
            .count();
        println!(
            "{:<24} {:<10} {:>8}  {}",
            category.name, category.color, count, category.id
        );
    }
    Ok(())
}

/// Delete by ID, or by name when the name is unambiguous. Memories keep
/// their category text.
pub fn delete(config: &RecallConfig, id_or_name: &str) -> Result<()> {
    let conn = super::open_store(config)?;

    if categories::delete_category(&conn, id_or_name)? {
        println!("Deleted category {id_or_name}");
        return Ok(());
    }

    let matching: Vec<_> = categories::list_categories(&conn)?
        .into_iter()
        .filter(|c| c.name == id_or_name)
        .collect();
    match matching.as_slice() {
        [] => bail!("category not found: {id_or_name}"),
        [only] => {
            categories::delete_category(&conn, &only.id)?;
            println!("Deleted category {} ({})", only.name, only.id);
            Ok(())
        }
        many => bail!(
            "{} categories are named {id_or_name:?}; delete by ID instead",
            many.len()
        ),
    }
}
