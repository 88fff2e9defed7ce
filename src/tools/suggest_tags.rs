//! MCP `suggest_tags` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SuggestTagsParams {
    #[schemars(description = "Text to suggest tags for")]
    pub content: String,
}
