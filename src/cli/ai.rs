//! CLI `ask`, `summarize` and `insights` commands.

use anyhow::{bail, Result};
use chrono::Utc;

use crate::config::RecallConfig;
use crate::memory::store;
use crate::server::build_gateway;
use crate::tools::ask_memories::select_context;

/// Ask a question about stored memories.
pub async fn ask(config: &RecallConfig, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        bail!("question must not be empty");
    }
    let conn = super::open_store(config)?;
    let gateway = build_gateway(config, &conn)?;

    let memories = store::list_memories(&conn)?;
    let context = select_context(&memories, question, config.search.fuzzy_threshold);
    let answer = gateway.ask(question, &context).await?;

    println!("{}", answer.trim());
    Ok(())
}

/// Summarize one memory.
pub async fn summarize(config: &RecallConfig, id: &str) -> Result<()> {
    let conn = super::open_store(config)?;
    let Some(memory) = store::get_memory(&conn, id)? else {
        bail!("memory not found: {id}");
    };
    let gateway = build_gateway(config, &conn)?;

    let summary = gateway.summarize(&memory).await?;
    println!("Summary of \"{}\":", memory.title);
    println!();
    println!("{}", summary.trim());
    Ok(())
}

/// Free-form insights, plus structured productivity advice with
/// `productivity`.
pub async fn insights(config: &RecallConfig, productivity: bool) -> Result<()> {
    let conn = super::open_store(config)?;
    let memories = store::list_memories(&conn)?;
    if memories.is_empty() {
        println!("No memories yet. Add some first (or run `recallrift seed`).");
        return Ok(());
    }
    let gateway = build_gateway(config, &conn)?;

    if !productivity {
        let text = gateway.insights(&memories).await?;
        println!("{}", text.trim());
        return Ok(());
    }

    let insights = gateway.productivity_insights(&memories, Utc::now()).await;
    print_section("Patterns", &insights.patterns);
    print_section("Recommendations", &insights.recommendations);
    print_section("Growth areas", &insights.growth_areas);
    Ok(())
}

fn print_section(title: &str, items: &[String]) {
    println!("{title}:");
    for item in items {
        println!("  - {item}");
    }
    println!();
}
