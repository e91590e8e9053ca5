use crate::context::AgentContext;
use crate::error::{AgentError, Result};
use crate::graph::Graph;
use crate::nodes::{AgentNode, AnalyzeNode, ConditionalRetrieveNode, ExecuteToolsNode, FinalNode, GetUserNode, PreparePromptNode};
use crate::state::{AgentState, Message, ToolInvocationRecord};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a completed (or cancelled) run produced: the closing assistant
/// text, why the loop stopped early if it did, and enough of the
/// transcript/tool history for a caller to inspect or stream.
#[derive(Debug, Clone)]
pub struct AgentRunOutcome {
    pub final_text: String,
    pub reason: Option<String>,
    pub iteration: u32,
    pub messages: Vec<Message>,
    pub tool_results: Vec<ToolInvocationRecord>,
}

/// Wires the six named nodes (spec §4.J) into a [`Graph`] and drives one
/// request's worth of state through it.
pub struct AgentLoop {
    graph: Graph,
}

impl Default for AgentLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentLoop {
    pub fn new() -> Self {
        let mut graph = Graph::new("analyze");
        graph.add_node(Arc::new(AnalyzeNode));
        graph.add_node(Arc::new(ConditionalRetrieveNode));
        graph.add_node(Arc::new(GetUserNode));
        graph.add_node(Arc::new(PreparePromptNode));
        graph.add_node(Arc::new(AgentNode));
        graph.add_node(Arc::new(ExecuteToolsNode));
        graph.add_node(Arc::new(FinalNode));
        Self { graph }
    }

    pub async fn run(&self, query: impl Into<String>, ctx: &AgentContext, cancel: &CancellationToken) -> Result<AgentRunOutcome> {
        let mut state = AgentState::new(query);

        match self.graph.run(&mut state, ctx, cancel).await {
            Ok(()) => {}
            Err(AgentError::Cancelled) => {
                return Ok(AgentRunOutcome {
                    final_text: String::new(),
                    reason: Some("cancelled".to_string()),
                    iteration: state.iteration,
                    messages: state.messages,
                    tool_results: state.tool_results,
                });
            }
            Err(other) => return Err(other),
        }

        let final_text = state.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(AgentRunOutcome {
            final_text,
            reason: state.final_reason.clone(),
            iteration: state.iteration,
            messages: state.messages,
            tool_results: state.tool_results,
        })
    }
}
