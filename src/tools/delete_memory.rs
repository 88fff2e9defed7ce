//! MCP `delete_memory` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteMemoryParams {
    #[schemars(description = "IDs of the memories to delete. Missing IDs are counted, not fatal.")]
    pub ids: Vec<String>,
}
