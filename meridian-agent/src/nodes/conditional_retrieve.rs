use crate::context::AgentContext;
use crate::error::Result;
use crate::graph::{Node, NodeOutcome};
use crate::state::{AgentState, RetrievalBlock};
use async_trait::async_trait;
use std::collections::HashSet;

/// Runs every configured retriever in parallel, merges and deduplicates
/// the results by block identity, assigns stable block numbers, and caches
/// the merged set under the retrieval cache (spec §4.J).
pub struct ConditionalRetrieveNode;

#[async_trait]
impl Node for ConditionalRetrieveNode {
    fn name(&self) -> &str {
        "conditional_retrieve"
    }

    async fn execute(&self, state: &mut AgentState, ctx: &AgentContext) -> Result<NodeOutcome> {
        if !state.needs_retrieval || ctx.retrievers.is_empty() {
            return Ok(NodeOutcome::Next("get_user".to_string()));
        }

        let query = state.messages.first().map(|m| m.content.clone()).unwrap_or_default();
        let cache_key = meridian_cache::cache_key(&("retrieval", &query));

        let lookup = ctx.cache.retrieval_cache.get(&cache_key);
        if let Some(cached) = lookup.value {
            state.retrieval_blocks = serde_json::from_value(cached).unwrap_or_default();
            return Ok(NodeOutcome::Next("get_user".to_string()));
        }

        let results = futures::future::join_all(ctx.retrievers.iter().map(|retriever| retriever.retrieve(&query))).await;

        let mut merged: Vec<RetrievalBlock> = Vec::new();
        let mut seen = HashSet::new();
        for result in results {
            match result {
                Ok(blocks) => {
                    for block in blocks {
                        if seen.insert(block.block_id.clone()) {
                            merged.push(block);
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "retrieval call failed, continuing with partial results");
                    state.errors.push(error.to_string());
                }
            }
        }
        for (index, block) in merged.iter_mut().enumerate() {
            block.number = index + 1;
        }

        if let Ok(value) = serde_json::to_value(&merged) {
            ctx.cache.retrieval_cache.put(cache_key, value);
        }
        state.retrieval_blocks = merged;
        Ok(NodeOutcome::Next("get_user".to_string()))
    }
}
