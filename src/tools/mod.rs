pub mod ask_memories;
pub mod create_memory;
pub mod delete_memory;
pub mod memory_analytics;
pub mod search_memories;
pub mod suggest_tags;
pub mod toggle_favorite;
pub mod update_memory;

use ask_memories::AskMemoriesParams;
use create_memory::CreateMemoryParams;
use delete_memory::DeleteMemoryParams;
use memory_analytics::MemoryAnalyticsParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use rusqlite::Connection;
use search_memories::SearchMemoriesParams;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use suggest_tags::SuggestTagsParams;
use toggle_favorite::ToggleFavoriteParams;
use update_memory::UpdateMemoryParams;

use crate::ai::AiGateway;
use crate::config::RecallConfig;
use crate::memory::{analytics, store};

/// The RecallRift MCP tool handler. Holds shared state (db connection, AI
/// gateway, config) and exposes all MCP tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct RecallTools {
    tool_router: ToolRouter<Self>,
    db: Arc<Mutex<Connection>>,
    ai: AiGateway,
    config: Arc<RecallConfig>,
}

#[tool_router]
impl RecallTools {
    pub fn new(db: Arc<Mutex<Connection>>, ai: AiGateway, config: Arc<RecallConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            db,
            ai,
            config,
        }
    }

    /// Create a memory, optionally asking the AI for tags.
    #[tool(description = "Create a memory with a title, content, optional category and tags. Set suggest_tags=true to let the AI propose tags when none are given.")]
    async fn create_memory(
        &self,
        Parameters(params): Parameters<CreateMemoryParams>,
    ) -> Result<String, String> {
        let mut new = params.to_new_memory()?;

        // Suggestions never fail; an empty list just leaves the memory untagged.
        if params.wants_suggestions() {
            new.tags = self.ai.suggest_tags(&new.content).await;
        }

        tracing::info!(
            title_len = new.title.len(),
            tags = new.tags.len(),
            "create_memory called"
        );

        let memory = self
            .with_db(move |conn| store::create_memory(conn, &new))
            .await?;
        tracing::info!(id = %memory.id, "memory created");
        to_json(&memory)
    }

    /// Filter and sort memories.
    #[tool(description = "Search memories with fuzzy text matching and filters (category, tags, favorites, date range). Results are sorted by created date, newest first, unless sort_by/sort_order say otherwise.")]
    async fn search_memories(
        &self,
        Parameters(params): Parameters<SearchMemoriesParams>,
    ) -> Result<String, String> {
        let now = chrono::Local::now();
        let filter = params.to_filter(&now.timezone())?;
        let limit = params.limit.unwrap_or(self.config.search.default_limit);
        let threshold = self.config.search.fuzzy_threshold;

        tracing::info!(query = ?filter.query, limit, "search_memories called");

        let response = self
            .with_db(move |conn| search_memories::execute(conn, &filter, &now, threshold, limit))
            .await?;
        to_json(&response)
    }

    #[tool(description = "Edit a memory. Only the given fields change; an empty category clears it.")]
    async fn update_memory(
        &self,
        Parameters(params): Parameters<UpdateMemoryParams>,
    ) -> Result<String, String> {
        let update = params.to_update()?;
        let id = params.id;
        tracing::info!(id = %id, "update_memory called");

        let memory = self
            .with_db(move |conn| store::update_memory(conn, &id, &update))
            .await?;
        to_json(&memory)
    }

    #[tool(description = "Delete one or more memories by ID. Returns counts of deleted, missing and failed IDs.")]
    async fn delete_memory(
        &self,
        Parameters(params): Parameters<DeleteMemoryParams>,
    ) -> Result<String, String> {
        if params.ids.is_empty() {
            return Err("ids must not be empty".into());
        }
        tracing::info!(count = params.ids.len(), "delete_memory called");

        let ids = params.ids;
        let report = self
            .with_db(move |conn| Ok(store::delete_memories(conn, &ids)))
            .await?;
        to_json(&report)
    }

    #[tool(description = "Flip the favorite flag of a memory and return the updated memory.")]
    async fn toggle_favorite(
        &self,
        Parameters(params): Parameters<ToggleFavoriteParams>,
    ) -> Result<String, String> {
        let id = params.id;
        let lookup = id.clone();
        let memory = self
            .with_db(move |conn| store::toggle_favorite(conn, &lookup))
            .await?
            .ok_or_else(|| format!("memory not found: {id}"))?;
        to_json(&memory)
    }

    /// Analytics snapshot over all memories, or one category.
    #[tool(description = "Get memory analytics: totals, recent activity, top tags and categories, daily and monthly series, streak, productivity score, peak hours and goal progress.")]
    async fn memory_analytics(
        &self,
        Parameters(params): Parameters<MemoryAnalyticsParams>,
    ) -> Result<String, String> {
        let category = params.category.filter(|c| !c.trim().is_empty());
        let memories = self
            .with_db(move |conn| match category.as_deref() {
                Some(c) => store::memories_by_category(conn, c),
                None => store::list_memories(conn),
            })
            .await?;

        let snapshot = analytics::aggregate(&memories, &chrono::Local::now());
        to_json(&snapshot)
    }

    /// Answer a question from the memories most relevant to it.
    #[tool(description = "Ask a natural-language question about your memories. The AI answers using the most relevant memories as context.")]
    async fn ask_memories(
        &self,
        Parameters(params): Parameters<AskMemoriesParams>,
    ) -> Result<String, String> {
        if params.question.trim().is_empty() {
            return Err("question must not be empty".into());
        }
        tracing::info!(provider = self.ai.provider_name(), "ask_memories called");

        let category = params.category.filter(|c| !c.trim().is_empty());
        let memories = self
            .with_db(move |conn| match category.as_deref() {
                Some(c) => store::memories_by_category(conn, c),
                None => store::list_memories(conn),
            })
            .await?;

        let context = ask_memories::select_context(
            &memories,
            &params.question,
            self.config.search.fuzzy_threshold,
        );
        let answer = self
            .ai
            .ask(&params.question, &context)
            .await
            .map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "answer": answer,
            "contextMemories": context.len().min(self.config.ai.context_limit),
        })
        .to_string())
    }

    #[tool(description = "Suggest up to five lowercase tags for a piece of text. Returns an empty list if the AI is unavailable.")]
    async fn suggest_tags(
        &self,
        Parameters(params): Parameters<SuggestTagsParams>,
    ) -> Result<String, String> {
        if params.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }
        let tags = self.ai.suggest_tags(&params.content).await;
        to_json(&serde_json::json!({ "tags": tags }))
    }
}

impl RecallTools {
    /// Run a synchronous store operation on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            op(&conn)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("{e:#}"))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

#[tool_handler]
impl ServerHandler for RecallTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "RecallRift is a personal memory store. Use create_memory to save notes, \
                 search_memories to find them, memory_analytics for activity stats, and \
                 ask_memories to ask questions about what you have stored."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
