use crate::tool::Tool;
use meridian_auth::PermissionManager;
use meridian_cache::CacheManager;
use meridian_core::{OrgKey, UserId};
use serde_json::Value;
use std::sync::Arc;

/// The per-request identity a wrapped tool call is evaluated against:
/// who is asking, and on whose org's behalf (spec §4.I/§4.L).
#[derive(Debug, Clone)]
pub struct ChatState {
    pub user_id: UserId,
    pub org_key: OrgKey,
}

impl ChatState {
    pub fn new(user_id: impl Into<String>, org_key: impl Into<String>) -> Self {
        Self { user_id: UserId::from(user_id.into()), org_key: OrgKey::from(org_key.into()) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocationOutcome {
    Success(Value),
    Denied,
    MissingParameter(String),
    Failed(String),
}

/// Closes a registered [`Tool`] over one request's [`ChatState`] so the
/// agent loop can invoke it without re-threading identity, permissions, or
/// caching through every call site (spec §4.I).
pub struct ToolWrapper {
    tool: Arc<dyn Tool>,
    state: ChatState,
    permissions: Arc<PermissionManager>,
    cache: Option<Arc<CacheManager>>,
}

impl ToolWrapper {
    pub fn new(tool: Arc<dyn Tool>, state: ChatState, permissions: Arc<PermissionManager>) -> Self {
        Self { tool, state, permissions, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn full_name(&self) -> String {
        self.tool.metadata().full_name()
    }

    pub fn metadata(&self) -> &meridian_core::ToolMetadata {
        self.tool.metadata()
    }

    fn missing_required_parameter(&self, arguments: &Value) -> Option<String> {
        self.tool.metadata().parameters.iter().find_map(|param| {
            let present = arguments.get(&param.name).is_some();
            (param.required && !present).then(|| param.name.clone())
        })
    }

    /// Permission check, then required-parameter validation, then (if a
    /// cache was attached) a tool-cache lookup keyed on
    /// `(full_name, arguments, org_key)`, then the underlying call.
    /// A permission denial or a missing required parameter never reaches
    /// [`Tool::call`] (spec §4.L: "denial short-circuits ... without
    /// invoking the underlying tool").
    pub async fn invoke(&self, arguments: Value) -> ToolInvocationOutcome {
        let full_name = self.full_name();

        if !self.permissions.user_allowed(self.state.user_id.as_str(), &full_name) {
            tracing::warn!(user_id = %self.state.user_id, tool = %full_name, "tool invocation denied");
            return ToolInvocationOutcome::Denied;
        }

        if let Some(missing) = self.missing_required_parameter(&arguments) {
            return ToolInvocationOutcome::MissingParameter(missing);
        }

        let Some(cache) = &self.cache else {
            return self.call_tool(arguments).await;
        };

        let key = meridian_cache::cache_key(&(full_name.as_str(), &arguments, self.state.org_key.as_str()));
        let lookup = cache.tool_cache.get(&key);
        if let Some(value) = lookup.value {
            return ToolInvocationOutcome::Success(value);
        }

        let outcome = self.call_tool(arguments).await;
        if let ToolInvocationOutcome::Success(value) = &outcome {
            cache.tool_cache.put(key, value.clone());
        }
        outcome
    }

    async fn call_tool(&self, arguments: Value) -> ToolInvocationOutcome {
        match self.tool.call(arguments).await {
            Ok(value) => ToolInvocationOutcome::Success(value),
            Err(error) => {
                tracing::warn!(tool = %self.full_name(), %error, "tool execution failed");
                ToolInvocationOutcome::Failed(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meridian_auth::Role;
    use meridian_core::{PrimaryIntent, ToolMetadata, ToolParameter};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingTool {
        metadata: ToolMetadata,
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingTool {
        fn new(fail: bool) -> Self {
            Self {
                metadata: ToolMetadata {
                    app_name: "slack".to_string(),
                    tool_name: "send_message".to_string(),
                    description: String::new(),
                    llm_description: String::new(),
                    parameters: vec![ToolParameter {
                        name: "channel".to_string(),
                        description: String::new(),
                        required: true,
                        schema: json!({"type": "string"}),
                    }],
                    args_schema: json!({}),
                    examples: vec![],
                    tags: vec![],
                    primary_intent: PrimaryIntent::Action,
                    when_to_use: vec![],
                    when_not_to_use: vec![],
                    typical_queries: vec![],
                    essential: false,
                },
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }
        async fn call(&self, arguments: Value) -> crate::error::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::error::ToolError::Execution("boom".to_string()));
            }
            Ok(json!({"echo": arguments}))
        }
    }

    fn allow_all() -> Arc<PermissionManager> {
        let pm = PermissionManager::new();
        pm.add_role(Role::new("member").allow("*"));
        pm.assign("alice", "member");
        Arc::new(pm)
    }

    #[tokio::test]
    async fn denies_when_permission_manager_rejects() {
        let pm = Arc::new(PermissionManager::new());
        let tool = Arc::new(CountingTool::new(false));
        let wrapper = ToolWrapper::new(tool.clone(), ChatState::new("alice", "org1"), pm);
        let outcome = wrapper.invoke(json!({"channel": "#general"})).await;
        assert_eq!(outcome, ToolInvocationOutcome::Denied);
        assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_required_parameter_short_circuits() {
        let tool = Arc::new(CountingTool::new(false));
        let wrapper = ToolWrapper::new(tool.clone(), ChatState::new("alice", "org1"), allow_all());
        let outcome = wrapper.invoke(json!({})).await;
        assert_eq!(outcome, ToolInvocationOutcome::MissingParameter("channel".to_string()));
        assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_call_passes_through_result() {
        let tool = Arc::new(CountingTool::new(false));
        let wrapper = ToolWrapper::new(tool, ChatState::new("alice", "org1"), allow_all());
        let outcome = wrapper.invoke(json!({"channel": "#general"})).await;
        assert_eq!(outcome, ToolInvocationOutcome::Success(json!({"echo": {"channel": "#general"}})));
    }

    #[tokio::test]
    async fn failed_call_is_reported_without_panicking() {
        let tool = Arc::new(CountingTool::new(true));
        let wrapper = ToolWrapper::new(tool, ChatState::new("alice", "org1"), allow_all());
        let outcome = wrapper.invoke(json!({"channel": "#general"})).await;
        assert!(matches!(outcome, ToolInvocationOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn repeated_identical_calls_hit_the_cache() {
        let tool = Arc::new(CountingTool::new(false));
        let cache = Arc::new(CacheManager::new(10, Duration::from_secs(60), 10, Duration::from_secs(60), 10, Duration::from_secs(60)));
        let wrapper = ToolWrapper::new(tool.clone(), ChatState::new("alice", "org1"), allow_all()).with_cache(cache);

        wrapper.invoke(json!({"channel": "#general"})).await;
        wrapper.invoke(json!({"channel": "#general"})).await;

        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_org_scopes_do_not_share_a_cache_entry() {
        let tool = Arc::new(CountingTool::new(false));
        let cache = Arc::new(CacheManager::new(10, Duration::from_secs(60), 10, Duration::from_secs(60), 10, Duration::from_secs(60)));
        let wrapper_a = ToolWrapper::new(tool.clone(), ChatState::new("alice", "org1"), allow_all()).with_cache(cache.clone());
        let wrapper_b = ToolWrapper::new(tool.clone(), ChatState::new("alice", "org2"), allow_all()).with_cache(cache);

        wrapper_a.invoke(json!({"channel": "#general"})).await;
        wrapper_b.invoke(json!({"channel": "#general"})).await;

        assert_eq!(tool.calls.load(Ordering::SeqCst), 2);
    }
}
