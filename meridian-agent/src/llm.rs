use crate::error::Result;
use crate::state::{Message, ToolCall};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

/// The model seam the `agent` node calls through. `tool_schemas` is the
/// per-request active-tool list from [`meridian_tool::ToolLoader`],
/// rendered as provider-agnostic `{name, description, parameters}` objects.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Whether `final` should stream at the native ~10ms floor or fall back
    /// to ~20ms (spec §4.J "Streaming").
    fn streams_natively(&self) -> bool {
        false
    }

    async fn complete(&self, messages: &[Message], tool_schemas: &[Value]) -> Result<LlmResponse>;
}
