use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryIntent {
    Question,
    Action,
    Search,
    Analysis,
    Utility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub schema: Value,
}

/// Declarative tool metadata (spec §3 "Tool"). The full name is
/// `app_name.tool_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub app_name: String,
    pub tool_name: String,
    pub description: String,
    pub llm_description: String,
    pub parameters: Vec<ToolParameter>,
    pub args_schema: Value,
    pub examples: Vec<String>,
    pub tags: Vec<String>,
    pub primary_intent: PrimaryIntent,
    pub when_to_use: Vec<String>,
    pub when_not_to_use: Vec<String>,
    pub typical_queries: Vec<String>,
    pub essential: bool,
}

impl ToolMetadata {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.app_name, self.tool_name)
    }
}
