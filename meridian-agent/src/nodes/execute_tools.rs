use crate::constants::{MAX_TOOLS_PER_ITERATION, MAX_TOOL_RETRIES};
use crate::context::AgentContext;
use crate::error::Result;
use crate::graph::{Node, NodeOutcome};
use crate::loop_detection::loop_detected;
use crate::state::{AgentState, Message, ToolCall, ToolInvocationRecord};
use async_trait::async_trait;
use meridian_tool::ToolInvocationOutcome;
use serde_json::json;

/// Executes at most [`MAX_TOOLS_PER_ITERATION`] pending tool calls in
/// parallel, retrying a failed call up to [`MAX_TOOL_RETRIES`] times before
/// recording it as failed (spec §4.J). Excess calls beyond the per-iteration
/// cap are dropped with a warning rather than deferred, since the spec does
/// not define a carry-over queue for them.
pub struct ExecuteToolsNode;

async fn execute_one(call: ToolCall, ctx: &AgentContext) -> ToolInvocationRecord {
    let Some(wrapper) = ctx.tools.iter().find(|tool| tool.full_name() == call.name) else {
        return ToolInvocationRecord {
            tool_call_id: call.id,
            name: call.name,
            output: json!({"error": "tool not found"}),
            fingerprint: "missing-tool".to_string(),
            succeeded: false,
        };
    };

    let mut attempt = 0;
    loop {
        match wrapper.invoke(call.arguments.clone()).await {
            ToolInvocationOutcome::Success(value) => {
                let fingerprint = meridian_core::canonical_hash(&value);
                return ToolInvocationRecord { tool_call_id: call.id, name: call.name, output: value, fingerprint, succeeded: true };
            }
            ToolInvocationOutcome::Denied => {
                return ToolInvocationRecord {
                    tool_call_id: call.id,
                    name: call.name,
                    output: json!({"error": "permission denied"}),
                    fingerprint: "denied".to_string(),
                    succeeded: false,
                };
            }
            ToolInvocationOutcome::MissingParameter(param) => {
                return ToolInvocationRecord {
                    tool_call_id: call.id,
                    name: call.name,
                    output: json!({"error": format!("missing required parameter '{param}'")}),
                    fingerprint: "missing-parameter".to_string(),
                    succeeded: false,
                };
            }
            ToolInvocationOutcome::Failed(message) if attempt < MAX_TOOL_RETRIES => {
                attempt += 1;
                tracing::warn!(tool = %call.name, attempt, %message, "tool call failed, retrying");
            }
            ToolInvocationOutcome::Failed(message) => {
                return ToolInvocationRecord {
                    tool_call_id: call.id,
                    name: call.name,
                    output: json!({"error": message}),
                    fingerprint: "failed".to_string(),
                    succeeded: false,
                };
            }
        }
    }
}

#[async_trait]
impl Node for ExecuteToolsNode {
    fn name(&self) -> &str {
        "execute_tools"
    }

    async fn execute(&self, state: &mut AgentState, ctx: &AgentContext) -> Result<NodeOutcome> {
        let pending: Vec<ToolCall> = std::mem::take(&mut state.pending_tool_calls);
        if pending.len() > MAX_TOOLS_PER_ITERATION {
            tracing::warn!(requested = pending.len(), cap = MAX_TOOLS_PER_ITERATION, "dropping tool calls beyond the per-iteration cap");
        }
        let batch: Vec<ToolCall> = pending.into_iter().take(MAX_TOOLS_PER_ITERATION).collect();

        let records = futures::future::join_all(batch.into_iter().map(|call| execute_one(call, ctx))).await;

        for record in records {
            let content = serde_json::to_string(&record.output).unwrap_or_default();
            state.messages.push(Message::tool(record.tool_call_id.clone(), record.name.clone(), content));
            state.tool_results.push(record);
        }

        if loop_detected(&state.tool_results) {
            state.final_reason = Some("suspected loop: repeated tool calls returned identical results".to_string());
            return Ok(NodeOutcome::Next("final".to_string()));
        }

        Ok(NodeOutcome::Next("agent".to_string()))
    }
}
