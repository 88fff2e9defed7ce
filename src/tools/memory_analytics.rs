//! MCP `memory_analytics` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `memory_analytics` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MemoryAnalyticsParams {
    /// Restrict the snapshot to one category.
    #[schemars(description = "Optional category to compute analytics for")]
    pub category: Option<String>,
}
