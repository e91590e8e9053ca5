use crate::error::Result;
use crate::state::RetrievalBlock;
use async_trait::async_trait;

/// One retrieval backend consulted in parallel by `conditional_retrieve`
/// (spec §4.J). `block_id`/`number` are filled in by the caller before
/// returning them as part of the merged result; implementations only need
/// to set `block_id` and `content`.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalBlock>>;
}
