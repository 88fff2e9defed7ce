//! CLI `search` command: the filter pipeline from the terminal.

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Args;

use crate::config::RecallConfig;
use crate::memory::search::{self, FilterSpec, SortField, SortOrder};
use crate::memory::store;
use crate::memory::types::parse_tag_list;

#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    /// Free-text query, matched fuzzily
    pub query: Option<String>,
    /// Exact category name
    #[arg(short, long)]
    pub category: Option<String>,
    /// Comma-separated tags; a memory matches if it has any of them
    #[arg(short, long)]
    pub tags: Option<String>,
    /// Only favorites
    #[arg(short, long)]
    pub favorites: bool,
    /// today, week, month, quarter or year
    #[arg(short, long)]
    pub range: Option<String>,
    /// Custom range start (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub start: Option<String>,
    /// Custom range end, inclusive
    #[arg(long)]
    pub end: Option<String>,
    /// created, updated, title or category
    #[arg(long, default_value = "created")]
    pub sort: String,
    /// asc or desc
    #[arg(long, default_value = "desc")]
    pub order: String,
    /// Maximum results to print (defaults to [search].default_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Print JSON instead of a listing
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    fn to_filter(&self) -> Result<FilterSpec> {
        Ok(FilterSpec {
            query: self.query.clone(),
            category: self.category.clone(),
            tags: self.tags.as_deref().map(parse_tag_list).unwrap_or_default(),
            favorites: self.favorites,
            date_range: search::date_range_from_parts(
                self.range.as_deref(),
                self.start.as_deref(),
                self.end.as_deref(),
                &Local,
            )
            .map_err(|e| anyhow!(e))?,
            sort_by: SortField::parse_or_default(&self.sort),
            sort_order: SortOrder::parse_or_default(&self.order),
        })
    }
}

/// Run a search from the terminal.
pub fn search(config: &RecallConfig, args: &SearchArgs) -> Result<()> {
    let filter = args.to_filter()?;
    let conn = super::open_store(config)?;

    let all = store::list_memories(&conn)?;
    let results = search::apply(&all, &filter, &Local::now(), config.search.fuzzy_threshold);
    let limit = args.limit.unwrap_or(config.search.default_limit);

    if args.json {
        let shown: Vec<_> = results.iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!(
        "Found {} of {} memories (sorted by {} {})\n",
        results.len(),
        all.len(),
        filter.sort_by,
        filter.sort_order.as_str(),
    );
    for (i, memory) in results.iter().take(limit).enumerate() {
        super::print_memory_line(i, memory);
    }
    if results.len() > limit {
        println!("  ... {} more (use --limit)", results.len() - limit);
    }

    Ok(())
}
