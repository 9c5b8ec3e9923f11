use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::AgentResult;
use crate::models::content::{CallToolResult, ResourceContents};
use crate::models::prompt::{PromptInfo, PromptMessage};
use crate::models::tool::Tool;

/// A connected session with something that serves tools, prompts and resources to the agent.
///
/// The agent only ever reads from or invokes a system, so implementations are shared
/// behind an `Arc` across turns. Whoever connects the system owns its lifecycle and
/// must call [`System::shutdown`] when done with it.
#[async_trait]
pub trait System: Send + Sync {
    /// Get the name of the system
    fn name(&self) -> &str;

    /// Get the tools this system currently offers
    async fn list_tools(&self) -> AgentResult<Vec<Tool>>;

    /// Call a tool with the given arguments. `None` means the system ran the tool but
    /// produced no result.
    async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<Option<CallToolResult>>;

    /// Get the prompt templates this system offers
    async fn list_prompts(&self) -> AgentResult<Vec<PromptInfo>>;

    /// Render a prompt template with the given arguments
    async fn get_prompt(
        &self,
        name: &str,
        arguments: HashMap<String, String>,
    ) -> AgentResult<Vec<PromptMessage>>;

    /// Read a resource from a URI. The URI scheme indicates how to handle the resource,
    /// for example `docs://documents` for a document catalog.
    async fn read_resource(&self, uri: &str) -> AgentResult<Vec<ResourceContents>>;

    /// Release whatever the session holds. Called once by the owner on exit.
    async fn shutdown(&self) -> AgentResult<()> {
        Ok(())
    }
}
