use crate::constants::{COMPLEX_HISTORY_DEPTH, SIMPLE_HISTORY_DEPTH};
use crate::context::AgentContext;
use crate::error::Result;
use crate::graph::{Node, NodeOutcome};
use crate::state::AgentState;
use async_trait::async_trait;

/// Classifies the inbound query as simple/complex to pick the
/// message-history depth the `agent` node's LLM call will see, and whether
/// retrieval is worth attempting at all (spec §4.J). The original graph
/// delegates this to an LLM call; here it is a cheap heuristic over the
/// query text so the node stays a non-suspending, CPU-bound step (spec §5).
pub struct AnalyzeNode;

#[async_trait]
impl Node for AnalyzeNode {
    fn name(&self) -> &str {
        "analyze"
    }

    async fn execute(&self, state: &mut AgentState, _ctx: &AgentContext) -> Result<NodeOutcome> {
        let query = state.messages.first().map(|m| m.content.as_str()).unwrap_or_default();
        let is_complex = query.len() > 200 || query.matches('?').count() > 1;
        state.history_depth = if is_complex { COMPLEX_HISTORY_DEPTH } else { SIMPLE_HISTORY_DEPTH };
        state.needs_retrieval = !query.trim().is_empty();
        Ok(NodeOutcome::Next("conditional_retrieve".to_string()))
    }
}
