//! CLI `collection list|add|show|delete|suggest` commands.

use anyhow::{bail, Result};

use crate::config::RecallConfig;
use crate::memory::collections::{self, CollectionKind, Criteria, NewCollection};
use crate::memory::store;
use crate::memory::types::parse_tag_list;

pub fn list(config: &RecallConfig) -> Result<()> {
    let conn = super::open_store(config)?;
    let all = collections::load_collections(&conn)?;
    if all.is_empty() {
        println!("No collections. Try `recallrift collection suggest`.");
        return Ok(());
    }

    let memories = store::list_memories(&conn)?;
    for collection in &all {
        let count = collections::collection_members(collection, &memories).len();
        println!(
            "  {} [{}] {} memories  ({})",
            collection.name,
            collection.color,
            count,
            collection.id
        );
        if !collection.description.is_empty() {
            println!("     {}", collection.description);
        }
    }
    Ok(())
}

/// Create a smart collection from comma-separated criteria lists.
pub fn add(
    config: &RecallConfig,
    name: &str,
    description: Option<&str>,
    tags: Option<&str>,
    categories: Option<&str>,
    keywords: Option<&str>,
    color: Option<&str>,
) -> Result<()> {
    let criteria = Criteria {
        tags: tags.map(parse_tag_list).unwrap_or_default(),
        categories: split_list(categories),
        keywords: split_list(keywords),
    };
    if criteria.is_empty() {
        bail!("a collection needs at least one of --tags, --categories or --keywords");
    }

    let conn = super::open_store(config)?;
    let collection = collections::create_collection(
        &conn,
        NewCollection {
            name: name.to_string(),
            description: description.unwrap_or_default().to_string(),
            kind: CollectionKind::Smart,
            criteria,
            color: color.map(String::from),
        },
    )?;
    println!("Created collection {} ({})", collection.name, collection.id);
    Ok(())
}

/// Print a collection's criteria and matching memories.
pub fn show(config: &RecallConfig, id_or_name: &str) -> Result<()> {
    let conn = super::open_store(config)?;
    let Some(collection) = collections::find_collection(&conn, id_or_name)? else {
        bail!("collection not found: {id_or_name}");
    };

    println!("Collection: {}", collection.name);
    println!("{}", "=".repeat(50));
    if !collection.description.is_empty() {
        println!("  {}", collection.description);
    }
    println!("  Tags:        {}", collection.criteria.tags.join(", "));
    println!("  Categories:  {}", collection.criteria.categories.join(", "));
    println!("  Keywords:    {}", collection.criteria.keywords.join(", "));
    println!();

    let members = collections::collection_members(&collection, &store::list_memories(&conn)?);
    if members.is_empty() {
        println!("No matching memories.");
    }
    for (i, memory) in members.iter().enumerate() {
        super::print_memory_line(i, memory);
    }
    Ok(())
}

pub fn delete(config: &RecallConfig, id_or_name: &str) -> Result<()> {
    let conn = super::open_store(config)?;
    let Some(collection) = collections::find_collection(&conn, id_or_name)? else {
        bail!("collection not found: {id_or_name}");
    };
    collections::delete_collection(&conn, &collection.id)?;
    println!("Deleted collection {}", collection.name);
    Ok(())
}

/// Ask the AI for a collection; `save` stores it.
pub async fn suggest(config: &RecallConfig, save: bool) -> Result<()> {
    let conn = super::open_store(config)?;
    let memories = store::list_memories(&conn)?;
    let gateway = crate::server::build_gateway(config, &conn)?;

    let suggestion = gateway.suggest_collection(&memories).await;
    println!("Suggested collection: {}", suggestion.name);
    println!("  {}", suggestion.description);
    println!("  Tags:        {}", suggestion.criteria.tags.join(", "));
    println!("  Categories:  {}", suggestion.criteria.categories.join(", "));
    println!("  Keywords:    {}", suggestion.criteria.keywords.join(", "));
    println!("  Estimated:   {} memories", suggestion.estimated_count);

    if save {
        let collection = collections::from_suggestion(&conn, suggestion)?;
        println!();
        println!("Saved as {}", collection.id);
    }
    Ok(())
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|r| {
        r.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
