pub mod agent;
pub mod analyze;
pub mod conditional_retrieve;
pub mod execute_tools;
pub mod final_response;
pub mod get_user;
pub mod prepare_prompt;

pub use agent::AgentNode;
pub use analyze::AnalyzeNode;
pub use conditional_retrieve::ConditionalRetrieveNode;
pub use execute_tools::ExecuteToolsNode;
pub use final_response::FinalNode;
pub use get_user::GetUserNode;
pub use prepare_prompt::PreparePromptNode;
