//! MCP `search_memories` tool parameter definition and execution.

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use rusqlite::Connection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::memory::search::{self, FilterSpec, SortField, SortOrder};
use crate::memory::store;
use crate::memory::types::{normalize_tags, Memory};

/// Parameters for the `search_memories` MCP tool.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchMemoriesParams {
    #[schemars(description = "Free-text query, matched fuzzily against title, content, tags and category")]
    pub query: Option<String>,

    #[schemars(description = "Exact category name to filter by")]
    pub category: Option<String>,

    #[schemars(description = "Keep memories having any of these tags")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "If true, only favorites")]
    pub favorites: Option<bool>,

    #[schemars(description = "Date bucket: 'today', 'week', 'month', 'quarter', 'year'")]
    pub date_range: Option<String>,

    #[schemars(description = "Custom range start (YYYY-MM-DD or RFC 3339). Overrides date_range.")]
    pub start: Option<String>,

    #[schemars(description = "Custom range end, inclusive (YYYY-MM-DD or RFC 3339). Overrides date_range.")]
    pub end: Option<String>,

    #[schemars(description = "Sort field: 'created' (default), 'updated', 'title', 'category'")]
    pub sort_by: Option<String>,

    #[schemars(description = "Sort direction: 'desc' (default) or 'asc'")]
    pub sort_order: Option<String>,

    #[schemars(description = "Maximum number of results. Defaults to the configured limit.")]
    pub limit: Option<usize>,
}

/// Response from `search_memories`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub memories: Vec<Memory>,
}

impl SearchMemoriesParams {
    pub fn to_filter<Tz: TimeZone>(&self, tz: &Tz) -> Result<FilterSpec, String> {
        Ok(FilterSpec {
            query: self.query.clone(),
            category: self.category.clone(),
            tags: self.tags.as_ref().map(normalize_tags).unwrap_or_default(),
            favorites: self.favorites.unwrap_or(false),
            date_range: search::date_range_from_parts(
                self.date_range.as_deref(),
                self.start.as_deref(),
                self.end.as_deref(),
                tz,
            )?,
            sort_by: self
                .sort_by
                .as_deref()
                .map(SortField::parse_or_default)
                .unwrap_or_default(),
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse_or_default)
                .unwrap_or_default(),
        })
    }
}

/// Run the filter pipeline over the whole store and cap the result.
pub fn execute<Tz: TimeZone>(
    conn: &Connection,
    filter: &FilterSpec,
    now: &DateTime<Tz>,
    threshold: f64,
    limit: usize,
) -> Result<SearchResponse> {
    let all = store::list_memories(conn)?;
    let mut memories = search::apply(&all, filter, now, threshold);
    let total = memories.len();
    memories.truncate(limit);
    Ok(SearchResponse { total, memories })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::memory::types::NewMemory;
    use crate::tools::create_memory::CreateMemoryParams;
    use chrono::Utc;

    #[test]
    fn test_params_to_filter() {
        let params = SearchMemoriesParams {
            query: Some("rust".into()),
            tags: Some(vec!["a".into()]),
            date_range: Some("month".into()),
            sort_by: Some("updatedAt".into()),
            sort_order: Some("asc".into()),
            ..Default::default()
        };
        let filter = params.to_filter(&Utc).unwrap();
        assert_eq!(filter.sort_by, SortField::Updated);
        assert_eq!(filter.sort_order, SortOrder::Asc);
        assert_eq!(filter.date_range, Some(search::DateRange::Month));
        assert!(!filter.favorites);
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let params = SearchMemoriesParams {
            start: Some("yesterday-ish".into()),
            ..Default::default()
        };
        assert!(params.to_filter(&Utc).is_err());
    }

    #[test]
    fn test_execute_reports_total_before_limit() {
        let conn = db::open_memory_database().unwrap();
        for i in 0..5 {
            store::create_memory(&conn, &NewMemory::new(format!("Note {i}"), "body")).unwrap();
        }
        let response = execute(&conn, &FilterSpec::default(), &Utc::now(), 0.6, 2).unwrap();
        assert_eq!(response.total, 5);
        assert_eq!(response.memories.len(), 2);
    }

    #[test]
    fn test_tag_filter_matches_stored_case() {
        let conn = db::open_memory_database().unwrap();
        let created = CreateMemoryParams {
            title: "Borrow checker".into(),
            content: "Lifetimes finally clicked".into(),
            category: None,
            tags: Some(vec!["Rust".into()]),
            suggest_tags: None,
        };
        store::create_memory(&conn, &created.to_new_memory().unwrap()).unwrap();

        let params = SearchMemoriesParams {
            tags: Some(vec![" Rust ".into()]),
            ..Default::default()
        };
        let filter = params.to_filter(&Utc).unwrap();
        assert_eq!(filter.tags, vec!["rust"]);

        let response = execute(&conn, &filter, &Utc::now(), 0.6, 10).unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.memories[0].title, "Borrow checker");
    }
}
