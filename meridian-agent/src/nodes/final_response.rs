use crate::context::AgentContext;
use crate::error::Result;
use crate::graph::{Node, NodeOutcome};
use crate::state::{AgentState, Message, MessageRole};
use async_trait::async_trait;

/// Appends the reason (if any) the loop exited early for — an iteration-cap
/// or suspected-loop exit never produced an assistant message, so one is
/// synthesized here; a normal exit just gets the reason appended to the
/// LLM's own closing message (spec §4.J).
pub struct FinalNode;

#[async_trait]
impl Node for FinalNode {
    fn name(&self) -> &str {
        "final"
    }

    async fn execute(&self, state: &mut AgentState, _ctx: &AgentContext) -> Result<NodeOutcome> {
        let has_assistant_reply = matches!(state.messages.last(), Some(message) if message.role == MessageRole::Assistant);

        if has_assistant_reply {
            if let Some(reason) = state.final_reason.clone() {
                if let Some(last) = state.messages.last_mut() {
                    last.content = format!("{} (reason: {reason})", last.content);
                }
            }
        } else {
            let mut content = "I wasn't able to finish answering this request.".to_string();
            if let Some(reason) = &state.final_reason {
                content = format!("{content} (reason: {reason})");
            }
            state.messages.push(Message::assistant(content));
        }

        Ok(NodeOutcome::End)
    }
}
