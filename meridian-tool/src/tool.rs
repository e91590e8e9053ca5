use crate::error::Result;
use async_trait::async_trait;
use meridian_core::ToolMetadata;
use serde_json::Value;

/// A callable capability exposed to the agent loop. Implementations own the
/// side-effecting call (an HTTP request, a KV read, ...); everything
/// cross-cutting (permission gating, caching, parameter validation) lives in
/// [`crate::wrapper::ToolWrapper`] instead, so a `Tool` impl only has to
/// know how to do its one thing.
#[async_trait]
pub trait Tool: Send + Sync {
    fn metadata(&self) -> &ToolMetadata;

    async fn call(&self, arguments: Value) -> Result<Value>;
}
