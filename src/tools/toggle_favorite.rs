//! MCP `toggle_favorite` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ToggleFavoriteParams {
    #[schemars(description = "ID of the memory whose favorite flag is flipped")]
    pub id: String,
}
