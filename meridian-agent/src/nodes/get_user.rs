use crate::context::AgentContext;
use crate::error::Result;
use crate::graph::{Node, NodeOutcome};
use crate::state::AgentState;
use async_trait::async_trait;

/// Resolves the requesting user's profile; a lookup failure is recorded but
/// never aborts the request (spec §4.J state field `user_info`).
pub struct GetUserNode;

#[async_trait]
impl Node for GetUserNode {
    fn name(&self) -> &str {
        "get_user"
    }

    async fn execute(&self, state: &mut AgentState, ctx: &AgentContext) -> Result<NodeOutcome> {
        match ctx.user_info.user_info(&ctx.user_id).await {
            Ok(info) => state.user_info = Some(info),
            Err(error) => {
                tracing::warn!(%error, "user info lookup failed, continuing without it");
                state.errors.push(error.to_string());
            }
        }
        Ok(NodeOutcome::Next("prepare_prompt".to_string()))
    }
}
