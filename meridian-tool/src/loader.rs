use crate::registry::ToolRegistry;
use crate::tool::Tool;
use std::collections::HashSet;
use std::sync::Arc;

/// `None` or an empty filter means "load everything"; otherwise a tool is
/// loaded when it is tagged essential, or its full name, bare tool name, or
/// app name appears in the filter (spec §4.I).
fn normalize_filter(filter: Option<&[String]>) -> Option<HashSet<&str>> {
    match filter {
        None => None,
        Some(names) if names.is_empty() => None,
        Some(names) => Some(names.iter().map(String::as_str).collect()),
    }
}

fn should_load(full_name: &str, essential: bool, filter: &Option<HashSet<&str>>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    if essential {
        return true;
    }
    let (app_name, tool_name) = full_name.split_once('.').unwrap_or(("default", full_name));
    filter.contains(full_name) || filter.contains(tool_name) || filter.contains(app_name)
}

/// Resolves which registered tools a given request should see, given an
/// optional user-supplied filter (tool names, app names, or full names).
pub struct ToolLoader {
    registry: Arc<ToolRegistry>,
}

impl ToolLoader {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn active_tools(&self, filter: Option<&[String]>) -> Vec<Arc<dyn Tool>> {
        let normalized = normalize_filter(filter);
        let selected: Vec<Arc<dyn Tool>> = self
            .registry
            .all()
            .into_iter()
            .filter(|(full_name, tool)| should_load(full_name, tool.metadata().essential, &normalized))
            .map(|(_, tool)| tool)
            .collect();
        tracing::info!(available = self.registry.list_names().len(), loaded = selected.len(), "loaded tools for request");
        selected
    }
}
