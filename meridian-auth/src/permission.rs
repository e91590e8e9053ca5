//! Permission Manager (spec 4.L): role → tool allow-list evaluation,
//! kept to the original's simpler union-of-roles model rather than the
//! deny-precedence `AccessControl` shape used elsewhere in the corpus.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

const WILDCARD: &str = "*";

#[derive(Debug, Clone, Default)]
pub struct Role {
    pub name: String,
    allowed_tools: HashSet<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), allowed_tools: HashSet::new() }
    }

    pub fn allow(mut self, tool_name: impl Into<String>) -> Self {
        self.allowed_tools.insert(tool_name.into());
        self
    }

    fn permits(&self, tool_name: &str) -> bool {
        self.allowed_tools.contains(WILDCARD) || self.allowed_tools.contains(tool_name)
    }
}

/// `user_allowed(user_id, tool_name) → bool`: true iff any role assigned to
/// `user_id` allows `tool_name` or `"*"`.
#[derive(Default)]
pub struct PermissionManager {
    roles: RwLock<HashMap<String, Role>>,
    assignments: RwLock<HashMap<String, HashSet<String>>>,
}

impl PermissionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_role(&self, role: Role) {
        self.roles.write().unwrap().insert(role.name.clone(), role);
    }

    pub fn assign(&self, user_id: impl Into<String>, role_name: impl Into<String>) {
        self.assignments.write().unwrap().entry(user_id.into()).or_default().insert(role_name.into());
    }

    /// Consulted by the tool wrapper before each invocation; denial
    /// short-circuits to a "permission denied" tool result without calling
    /// the underlying tool.
    pub fn user_allowed(&self, user_id: &str, tool_name: &str) -> bool {
        let assignments = self.assignments.read().unwrap();
        let Some(role_names) = assignments.get(user_id) else {
            return false;
        };
        let roles = self.roles.read().unwrap();
        role_names.iter().filter_map(|name| roles.get(name)).any(|role| role.permits(tool_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_with_no_roles_is_denied() {
        let pm = PermissionManager::new();
        assert!(!pm.user_allowed("alice", "search"));
    }

    #[test]
    fn user_allowed_for_explicitly_listed_tool() {
        let pm = PermissionManager::new();
        pm.add_role(Role::new("reader").allow("search"));
        pm.assign("alice", "reader");
        assert!(pm.user_allowed("alice", "search"));
        assert!(!pm.user_allowed("alice", "delete"));
    }

    #[test]
    fn wildcard_role_allows_any_tool() {
        let pm = PermissionManager::new();
        pm.add_role(Role::new("admin").allow("*"));
        pm.assign("alice", "admin");
        assert!(pm.user_allowed("alice", "anything"));
    }

    #[test]
    fn multiple_roles_union_their_allow_lists() {
        let pm = PermissionManager::new();
        pm.add_role(Role::new("reader").allow("search"));
        pm.add_role(Role::new("writer").allow("write"));
        pm.assign("alice", "reader");
        pm.assign("alice", "writer");
        assert!(pm.user_allowed("alice", "search"));
        assert!(pm.user_allowed("alice", "write"));
    }
}
