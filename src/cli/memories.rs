//! CLI `add`, `show`, `edit`, `delete` and `favorite` commands.

use anyhow::{bail, Context, Result};

use crate::config::RecallConfig;
use crate::memory::store;
use crate::memory::types::{parse_tag_list, MemoryUpdate, NewMemory};

/// Create a memory. With `suggest`, untagged memories get AI tags.
pub async fn add(
    config: &RecallConfig,
    title: &str,
    content: &str,
    category: Option<&str>,
    tags: Option<&str>,
    suggest: bool,
) -> Result<()> {
    let conn = super::open_store(config)?;

    let mut new = NewMemory::new(title.trim(), content)
        .with_tags(tags.map(parse_tag_list).unwrap_or_default());
    if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
        new = new.with_category(category);
    }
    new.validate()?;

    if suggest && new.tags.is_empty() {
        let gateway = crate::server::build_gateway(config, &conn)?;
        new.tags = gateway.suggest_tags(&new.content).await;
        if new.tags.is_empty() {
            eprintln!("No tags suggested.");
        }
    }

    let memory = store::create_memory(&conn, &new)?;
    println!("Created memory {}", memory.id);
    if !memory.tags.is_empty() {
        println!("  tags: {}", memory.tags.join(", "));
    }
    Ok(())
}

/// Display full details for a single memory.
pub fn show(config: &RecallConfig, id: &str) -> Result<()> {
    let conn = super::open_store(config)?;
    let Some(m) = store::get_memory(&conn, id)? else {
        bail!("memory not found: {id}");
    };

    println!("Memory: {}", m.id);
    println!("{}", "=".repeat(50));
    println!("  Title:          {}", m.title);
    println!("  Category:       {}", m.category.as_deref().unwrap_or("(none)"));
    println!("  Tags:           {}", m.tags.join(", "));
    println!("  Favorite:       {}", if m.is_favorite { "yes" } else { "no" });
    println!("  Created:        {}", m.created_at.to_rfc3339());
    println!("  Updated:        {}", m.updated_at.to_rfc3339());
    println!();
    println!("{}", m.content);
    Ok(())
}

/// Apply a partial edit. `category = Some("")` clears the category.
pub fn edit(
    config: &RecallConfig,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    let update = MemoryUpdate {
        title: title.map(|t| t.trim().to_string()),
        content,
        category: category.map(|c| {
            let c = c.trim();
            (!c.is_empty()).then(|| c.to_string())
        }),
        tags: tags.as_deref().map(parse_tag_list),
        is_favorite: None,
    };
    if update.is_empty() {
        bail!("nothing to update; pass --title, --content, --category or --tags");
    }
    update.validate()?;

    let conn = super::open_store(config)?;
    let memory = store::update_memory(&conn, id, &update)?;
    println!("Updated memory {} at {}", memory.id, memory.updated_at.to_rfc3339());
    Ok(())
}

/// Delete one or more memories, reporting missing IDs.
pub fn delete(config: &RecallConfig, ids: &[String]) -> Result<()> {
    let conn = super::open_store(config)?;
    let report = store::delete_memories(&conn, ids);

    println!("Deleted: {}", report.deleted);
    if report.missing > 0 {
        println!("Not found: {}", report.missing);
    }
    if report.errors > 0 {
        println!("Failed: {} (see log)", report.errors);
    }
    Ok(())
}

pub fn favorite(config: &RecallConfig, id: &str) -> Result<()> {
    let conn = super::open_store(config)?;
    let memory = store::toggle_favorite(&conn, id)?
        .with_context(|| format!("memory not found: {id}"))?;
    let state = if memory.is_favorite { "added to" } else { "removed from" };
    println!("{} {state} favorites", memory.title);
    Ok(())
}
