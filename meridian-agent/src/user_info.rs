use crate::error::Result;
use async_trait::async_trait;
use meridian_core::UserId;
use serde_json::Value;

/// Resolves the identity/profile blob the `get_user` node attaches to the
/// agent state (spec §4.J).
#[async_trait]
pub trait UserInfoProvider: Send + Sync {
    async fn user_info(&self, user_id: &UserId) -> Result<Value>;
}
