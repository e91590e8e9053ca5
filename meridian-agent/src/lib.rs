//! Bounded, ReAct-style tool-calling agent loop (spec component 4.J):
//! `analyze -> conditional_retrieve -> get_user -> prepare_prompt -> agent
//! <-> execute_tools -> final`, with loop detection, a hard iteration cap,
//! and streaming output.

pub mod constants;
pub mod context;
pub mod error;
pub mod graph;
pub mod llm;
pub mod loop_detection;
pub mod loop_runner;
pub mod nodes;
pub mod retrieval;
pub mod state;
pub mod streaming;
pub mod truncate;
pub mod user_info;

#[cfg(test)]
mod testutil;

pub use context::AgentContext;
pub use error::{AgentError, Result};
pub use graph::{Graph, Node, NodeOutcome};
pub use llm::{LanguageModel, LlmResponse};
pub use loop_runner::{AgentLoop, AgentRunOutcome};
pub use retrieval::Retriever;
pub use state::{AgentState, Message, MessageRole, RetrievalBlock, ToolCall, ToolInvocationRecord};
pub use streaming::stream_response;
pub use user_info::UserInfoProvider;
