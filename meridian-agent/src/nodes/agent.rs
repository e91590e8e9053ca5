use crate::constants::MAX_ITERATIONS;
use crate::context::AgentContext;
use crate::error::Result;
use crate::graph::{Node, NodeOutcome};
use crate::state::{AgentState, Message};
use crate::truncate::truncate_context;
use async_trait::async_trait;
use meridian_tool::ToolWrapper;
use serde_json::{json, Value};
use std::sync::Arc;

/// Calls the LLM with the current transcript window and the active tool
/// schemas. Emits tool calls or a final assistant message (spec §4.J).
/// Checked against the iteration cap *before* incrementing, so a run that
/// is capped at iteration 15 still reports `iteration == 15`, matching the
/// literal count of agent/execute_tools cycles actually performed.
pub struct AgentNode;

fn tool_schema(tool: &Arc<ToolWrapper>) -> Value {
    let metadata = tool.metadata();
    json!({
        "name": metadata.full_name(),
        "description": metadata.llm_description,
        "parameters": metadata.args_schema,
    })
}

#[async_trait]
impl Node for AgentNode {
    fn name(&self) -> &str {
        "agent"
    }

    async fn execute(&self, state: &mut AgentState, ctx: &AgentContext) -> Result<NodeOutcome> {
        if state.iteration >= MAX_ITERATIONS {
            state.final_reason = Some(format!("hit iteration limit ({MAX_ITERATIONS})"));
            return Ok(NodeOutcome::Next("final".to_string()));
        }
        state.iteration += 1;

        truncate_context(state);

        let depth = state.history_depth.max(1);
        let window_start = state.messages.len().saturating_sub(depth);
        let window = &state.messages[window_start..];
        let schemas: Vec<Value> = ctx.tools.iter().map(tool_schema).collect();

        let response = ctx.llm.complete(window, &schemas).await?;

        if response.tool_calls.is_empty() {
            state.messages.push(Message::assistant(response.content));
            state.pending_tool_calls.clear();
            Ok(NodeOutcome::Next("final".to_string()))
        } else {
            state.pending_tool_calls = response.tool_calls;
            Ok(NodeOutcome::Next("execute_tools".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LanguageModel, LlmResponse};
    use crate::state::ToolCall;
    use crate::testutil::test_context;

    struct StubLlm {
        tool_call: bool,
    }

    #[async_trait]
    impl LanguageModel for StubLlm {
        async fn complete(&self, _messages: &[Message], _tool_schemas: &[Value]) -> Result<LlmResponse> {
            if self.tool_call {
                Ok(LlmResponse { content: String::new(), tool_calls: vec![ToolCall { id: "1".to_string(), name: "echo".to_string(), arguments: json!({}) }] })
            } else {
                Ok(LlmResponse { content: "done".to_string(), tool_calls: vec![] })
            }
        }
    }

    #[tokio::test]
    async fn no_tool_calls_goes_straight_to_final() {
        let mut state = AgentState::new("hi");
        let mut ctx = test_context();
        ctx.llm = Arc::new(StubLlm { tool_call: false });
        let outcome = AgentNode.execute(&mut state, &ctx).await.unwrap();
        assert!(matches!(outcome, NodeOutcome::Next(next) if next == "final"));
        assert_eq!(state.messages.last().unwrap().content, "done");
    }

    #[tokio::test]
    async fn tool_calls_route_to_execute_tools() {
        let mut state = AgentState::new("hi");
        let mut ctx = test_context();
        ctx.llm = Arc::new(StubLlm { tool_call: true });
        let outcome = AgentNode.execute(&mut state, &ctx).await.unwrap();
        assert!(matches!(outcome, NodeOutcome::Next(next) if next == "execute_tools"));
        assert_eq!(state.pending_tool_calls.len(), 1);
        assert_eq!(state.iteration, 1);
    }

    #[tokio::test]
    async fn oversized_tool_output_from_a_prior_cycle_is_truncated_before_the_next_call() {
        let mut state = AgentState::new("hi");
        state.messages.push(crate::state::Message::tool("1", "echo", format!("summary\n{}", "x".repeat(150_000))));
        let mut ctx = test_context();
        ctx.llm = Arc::new(StubLlm { tool_call: false });
        AgentNode.execute(&mut state, &ctx).await.unwrap();
        let tool_message = state.messages.iter().find(|m| m.role == crate::state::MessageRole::Tool).unwrap();
        assert!(tool_message.content.len() < 150_000);
        assert!(tool_message.content.ends_with("...[truncated]"));
    }

    #[tokio::test]
    async fn iteration_cap_short_circuits_without_calling_the_llm() {
        let mut state = AgentState::new("hi");
        state.iteration = MAX_ITERATIONS;
        let ctx = test_context();
        let outcome = AgentNode.execute(&mut state, &ctx).await.unwrap();
        assert!(matches!(outcome, NodeOutcome::Next(next) if next == "final"));
        assert_eq!(state.iteration, MAX_ITERATIONS);
        assert!(state.final_reason.as_deref().unwrap().contains("iteration limit"));
    }
}
