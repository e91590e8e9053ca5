use crate::error::{Result, ToolError};
use crate::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

/// Process-wide catalogue of every [`Tool`] the platform knows about, keyed
/// by `app_name.tool_name`. Registration is rejected on collision rather
/// than silently overwriting, matching the original registry's behavior.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<()> {
        let full_name = tool.metadata().full_name();
        let mut tools = self.tools.write().unwrap();
        if tools.contains_key(&full_name) {
            return Err(ToolError::AlreadyRegistered(full_name));
        }
        tools.insert(full_name, tool);
        Ok(())
    }

    pub fn get(&self, full_name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().unwrap().get(full_name).cloned()
    }

    pub fn list_names(&self) -> Vec<String> {
        self.tools.read().unwrap().keys().cloned().collect()
    }

    pub fn all(&self) -> Vec<(String, Arc<dyn Tool>)> {
        self.tools.read().unwrap().iter().map(|(name, tool)| (name.clone(), tool.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meridian_core::{PrimaryIntent, ToolMetadata};
    use serde_json::{json, Value};

    struct Stub(ToolMetadata);

    impl Stub {
        fn new(app_name: &str, tool_name: &str) -> Self {
            Self(ToolMetadata {
                app_name: app_name.to_string(),
                tool_name: tool_name.to_string(),
                description: String::new(),
                llm_description: String::new(),
                parameters: vec![],
                args_schema: json!({}),
                examples: vec![],
                tags: vec![],
                primary_intent: PrimaryIntent::Utility,
                when_to_use: vec![],
                when_not_to_use: vec![],
                typical_queries: vec![],
                essential: false,
            })
        }
    }

    #[async_trait]
    impl Tool for Stub {
        fn metadata(&self) -> &ToolMetadata {
            &self.0
        }

        async fn call(&self, _arguments: Value) -> crate::error::Result<Value> {
            Ok(json!(null))
        }
    }

    #[test]
    fn registering_duplicate_full_name_is_rejected() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Stub::new("slack", "send_message"))).unwrap();
        let error = registry.register(Arc::new(Stub::new("slack", "send_message"))).unwrap_err();
        assert!(matches!(error, ToolError::AlreadyRegistered(name) if name == "slack.send_message"));
    }

    #[test]
    fn distinct_apps_can_reuse_a_tool_name() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Stub::new("slack", "search"))).unwrap();
        registry.register(Arc::new(Stub::new("drive", "search"))).unwrap();
        assert_eq!(registry.list_names().len(), 2);
    }

    #[test]
    fn get_returns_none_for_unknown_tool() {
        let registry = ToolRegistry::new();
        assert!(registry.get("nope.nope").is_none());
    }
}
