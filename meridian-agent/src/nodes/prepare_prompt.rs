use crate::context::AgentContext;
use crate::error::Result;
use crate::graph::{Node, NodeOutcome};
use crate::state::{AgentState, Message, MessageRole};
use async_trait::async_trait;

/// Folds retrieved blocks into a leading system message (once). The
/// context-size cap (spec §4.J) is enforced on every `agent` cycle, not
/// just here, since tool output keeps accumulating after this node runs.
pub struct PreparePromptNode;

#[async_trait]
impl Node for PreparePromptNode {
    fn name(&self) -> &str {
        "prepare_prompt"
    }

    async fn execute(&self, state: &mut AgentState, _ctx: &AgentContext) -> Result<NodeOutcome> {
        let already_has_context = state.messages.iter().any(|m| m.role == MessageRole::System);
        if !state.retrieval_blocks.is_empty() && !already_has_context {
            let context = state
                .retrieval_blocks
                .iter()
                .map(|block| format!("[{}] {}", block.number, block.content))
                .collect::<Vec<_>>()
                .join("\n\n");
            state.messages.insert(0, Message::system(format!("Use the following retrieved context:\n{context}")));
        }

        Ok(NodeOutcome::Next("agent".to_string()))
    }
}
