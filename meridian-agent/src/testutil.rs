#![cfg(test)]

use crate::context::AgentContext;
use crate::error::Result;
use crate::llm::{LanguageModel, LlmResponse};
use crate::state::Message;
use crate::user_info::UserInfoProvider;
use async_trait::async_trait;
use meridian_cache::CacheManager;
use meridian_core::UserId;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub struct EmptyLlm;

#[async_trait]
impl LanguageModel for EmptyLlm {
    async fn complete(&self, _messages: &[Message], _tool_schemas: &[Value]) -> Result<LlmResponse> {
        Ok(LlmResponse::default())
    }
}

pub struct EmptyUserInfo;

#[async_trait]
impl UserInfoProvider for EmptyUserInfo {
    async fn user_info(&self, _user_id: &UserId) -> Result<Value> {
        Ok(json!({}))
    }
}

pub fn test_context() -> AgentContext {
    AgentContext {
        llm: Arc::new(EmptyLlm),
        retrievers: Vec::new(),
        user_info: Arc::new(EmptyUserInfo),
        user_id: UserId::from("user-1".to_string()),
        tools: Vec::new(),
        cache: Arc::new(CacheManager::new(100, Duration::from_secs(60), 100, Duration::from_secs(60), 100, Duration::from_secs(60))),
    }
}
