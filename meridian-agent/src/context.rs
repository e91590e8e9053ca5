use crate::llm::LanguageModel;
use crate::retrieval::Retriever;
use crate::user_info::UserInfoProvider;
use meridian_cache::CacheManager;
use meridian_core::UserId;
use meridian_tool::ToolWrapper;
use std::sync::Arc;

/// Everything a node needs that is not part of the per-run [`crate::state::AgentState`]:
/// the model, the retrieval/user-info backends, the active tool set, and the
/// shared cache facade.
pub struct AgentContext {
    pub llm: Arc<dyn LanguageModel>,
    pub retrievers: Vec<Arc<dyn Retriever>>,
    pub user_info: Arc<dyn UserInfoProvider>,
    pub user_id: UserId,
    pub tools: Vec<Arc<ToolWrapper>>,
    pub cache: Arc<CacheManager>,
}
