use crate::constants::SIMPLE_HISTORY_DEPTH;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub tool_call_id: Option<String>,
    pub name: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into(), tool_call_id: None, name: None }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into(), tool_call_id: None, name: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into(), tool_call_id: None, name: None }
    }

    pub fn tool(tool_call_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: MessageRole::Tool, content: content.into(), tool_call_id: Some(tool_call_id.into()), name: Some(name.into()) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocationRecord {
    pub tool_call_id: String,
    pub name: String,
    pub output: Value,
    pub fingerprint: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalBlock {
    pub block_id: String,
    pub number: usize,
    pub content: String,
}

/// The agent loop's working state (spec §4.J): `{ messages, tool_results,
/// iteration, pending_tool_calls, user_info, retrieval_blocks, errors }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub messages: Vec<Message>,
    pub tool_results: Vec<ToolInvocationRecord>,
    pub iteration: u32,
    pub pending_tool_calls: Vec<ToolCall>,
    pub user_info: Option<Value>,
    pub retrieval_blocks: Vec<RetrievalBlock>,
    pub errors: Vec<String>,
    pub history_depth: usize,
    pub needs_retrieval: bool,
    pub final_reason: Option<String>,
}

impl AgentState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(query)],
            history_depth: SIMPLE_HISTORY_DEPTH,
            ..Default::default()
        }
    }
}
