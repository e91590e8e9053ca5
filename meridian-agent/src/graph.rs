use crate::context::AgentContext;
use crate::error::{AgentError, Result};
use crate::state::AgentState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum NodeOutcome {
    Next(String),
    End,
}

/// A node in the agent graph (spec §4.J's `analyze -> conditional_retrieve
/// -> get_user -> prepare_prompt -> agent <-> execute_tools -> final`).
/// Generalizes the single-node placeholder graph the teacher ships into the
/// six named nodes plus the agent/execute_tools cycle.
#[async_trait]
pub trait Node: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, state: &mut AgentState, ctx: &AgentContext) -> Result<NodeOutcome>;
}

/// Drives a fixed set of named nodes from an entry point, following each
/// node's chosen successor until one returns [`NodeOutcome::End`] or the
/// cancellation token fires (spec §4.J "Cancellation").
pub struct Graph {
    nodes: HashMap<String, Arc<dyn Node>>,
    entry_point: String,
}

impl Graph {
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self { nodes: HashMap::new(), entry_point: entry_point.into() }
    }

    pub fn add_node(&mut self, node: Arc<dyn Node>) {
        self.nodes.insert(node.name().to_string(), node);
    }

    pub async fn run(&self, state: &mut AgentState, ctx: &AgentContext, cancel: &CancellationToken) -> Result<()> {
        let mut current = self.entry_point.clone();
        loop {
            if cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }
            let node = self.nodes.get(&current).unwrap_or_else(|| panic!("agent graph edge names unregistered node '{current}'"));
            tracing::debug!(node = node.name(), iteration = state.iteration, "executing agent graph node");
            match node.execute(state, ctx).await? {
                NodeOutcome::Next(next) => current = next,
                NodeOutcome::End => return Ok(()),
            }
        }
    }
}
