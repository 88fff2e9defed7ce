//! CLI `template list|use|suggest` commands.

use anyhow::{bail, Result};
use chrono::Local;

use crate::config::RecallConfig;
use crate::memory::store;
use crate::memory::templates::{self, TEMPLATES};

pub fn list() -> Result<()> {
    for template in TEMPLATES {
        println!("  {:<16} {:<22} {}", template.id, template.name, template.description);
    }
    Ok(())
}

/// Create a memory from a built-in template. `{date}` is today's local date.
pub fn use_template(config: &RecallConfig, id: &str, title: Option<&str>) -> Result<()> {
    let Some(template) = templates::find_template(id) else {
        bail!("unknown template: {id}. Run `recallrift template list`");
    };

    let new = templates::instantiate(template, title.unwrap_or_default(), Local::now().date_naive());
    new.validate()?;

    let conn = super::open_store(config)?;
    let memory = store::create_memory(&conn, &new)?;
    println!("Created \"{}\" from template {} ({})", memory.title, template.name, memory.id);
    println!("Fill it in with `recallrift edit {} --content ...`", memory.id);
    Ok(())
}

/// AI-proposed templates based on the user's own memories.
pub async fn suggest(config: &RecallConfig) -> Result<()> {
    let conn = super::open_store(config)?;
    let memories = store::list_memories(&conn)?;
    let gateway = crate::server::build_gateway(config, &conn)?;

    let suggestions = gateway.personalized_templates(&memories).await;
    if suggestions.is_empty() {
        println!("No template suggestions right now.");
        return Ok(());
    }
    for suggestion in suggestions {
        println!("{}: {}", suggestion.name, suggestion.description);
        println!("{}", suggestion.structure);
        println!();
    }
    Ok(())
}
