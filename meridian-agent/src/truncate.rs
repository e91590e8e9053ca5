use crate::constants::{MAX_CONTEXT_CHARS, TRUNCATED_TOOL_OUTPUT_CHARS};
use crate::state::{AgentState, MessageRole};

/// Keeps the transcript under the ~100k character cap (spec §4.J) by
/// shrinking older tool-role messages, oldest first, to a summary line
/// (the first line of the original output) plus a short result preview.
/// Non-tool messages are never touched.
pub fn truncate_context(state: &mut AgentState) {
    let total: usize = state.messages.iter().map(|m| m.content.len()).sum();
    if total <= MAX_CONTEXT_CHARS {
        return;
    }

    let mut freed = 0usize;
    let needed = total - MAX_CONTEXT_CHARS;
    for message in state.messages.iter_mut() {
        if freed >= needed {
            break;
        }
        if message.role != MessageRole::Tool || message.content.len() <= TRUNCATED_TOOL_OUTPUT_CHARS {
            continue;
        }
        let original_len = message.content.len();
        let summary_line = message.content.lines().next().unwrap_or_default().to_string();
        let preview: String = message.content.chars().take(TRUNCATED_TOOL_OUTPUT_CHARS).collect();
        message.content = format!("{summary_line}\n{preview}...[truncated]");
        freed += original_len.saturating_sub(message.content.len());
    }
}
