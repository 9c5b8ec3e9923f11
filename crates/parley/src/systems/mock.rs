use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{document_uri, System, DOCUMENTS_URI};
use crate::errors::{AgentError, AgentResult};
use crate::models::content::{CallToolResult, Content, ResourceContents};
use crate::models::prompt::{PromptInfo, PromptMessage};
use crate::models::tool::Tool;

enum ToolBehavior {
    Returns(CallToolResult),
    ReturnsNothing,
    Fails(String),
    Delayed(Duration, CallToolResult),
    Hangs,
}

/// A scripted system that records every operation it receives, for testing
pub struct MockSystem {
    name: String,
    tools: Vec<(Tool, ToolBehavior)>,
    documents: Vec<(String, String)>,
    prompts: Vec<(PromptInfo, Vec<PromptMessage>)>,
    fail_listing: bool,
    calls: Mutex<Vec<String>>,
}

impl MockSystem {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tools: Vec::new(),
            documents: Vec::new(),
            prompts: Vec::new(),
            fail_listing: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn tool(name: &str, owner: &str) -> Tool {
        Tool::new(
            name,
            format!("{} from {}", name, owner),
            json!({"type": "object", "properties": {}}),
        )
    }

    /// A tool that answers with the given text items
    pub fn with_tool(mut self, name: &str, texts: &[&str]) -> Self {
        let content = texts.iter().map(|t| Content::text(*t)).collect();
        let tool = Self::tool(name, &self.name);
        self.tools
            .push((tool, ToolBehavior::Returns(CallToolResult::success(content))));
        self
    }

    /// A tool that runs but reports an error through its result
    pub fn with_erroring_tool(mut self, name: &str, text: &str) -> Self {
        let tool = Self::tool(name, &self.name);
        self.tools.push((
            tool,
            ToolBehavior::Returns(CallToolResult::error(vec![Content::text(text)])),
        ));
        self
    }

    /// A tool whose call produces no result at all
    pub fn with_silent_tool(mut self, name: &str) -> Self {
        let tool = Self::tool(name, &self.name);
        self.tools.push((tool, ToolBehavior::ReturnsNothing));
        self
    }

    /// A tool whose invocation fails in the session itself
    pub fn with_failing_tool(mut self, name: &str, error: &str) -> Self {
        let tool = Self::tool(name, &self.name);
        self.tools.push((tool, ToolBehavior::Fails(error.to_string())));
        self
    }

    /// A tool that answers after sleeping, recording `done:<name>` when it finishes
    pub fn with_slow_tool(mut self, name: &str, texts: &[&str], delay: Duration) -> Self {
        let content = texts.iter().map(|t| Content::text(*t)).collect();
        let tool = Self::tool(name, &self.name);
        self.tools.push((
            tool,
            ToolBehavior::Delayed(delay, CallToolResult::success(content)),
        ));
        self
    }

    /// A tool whose call never completes
    pub fn with_hanging_tool(mut self, name: &str) -> Self {
        let tool = Self::tool(name, &self.name);
        self.tools.push((tool, ToolBehavior::Hangs));
        self
    }

    pub fn with_document(mut self, id: &str, text: &str) -> Self {
        self.documents.push((id.to_string(), text.to_string()));
        self
    }

    /// A prompt that requires `doc_id` and renders to the given blocks
    pub fn with_prompt(mut self, name: &str, blocks: Vec<PromptMessage>) -> Self {
        let info = PromptInfo::new(name, format!("{} prompt", name)).with_argument(
            "doc_id",
            "Document to use",
            true,
        );
        self.prompts.push((info, blocks));
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    /// Every operation received so far, e.g. `list_tools` or `read_resource:docs://documents`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl System for MockSystem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> AgentResult<Vec<Tool>> {
        self.record("list_tools".to_string());
        if self.fail_listing {
            return Err(AgentError::Internal("session closed".to_string()));
        }
        Ok(self.tools.iter().map(|(tool, _)| tool.clone()).collect())
    }

    async fn call_tool(&self, name: &str, _arguments: Value) -> AgentResult<Option<CallToolResult>> {
        self.record(format!("call_tool:{}", name));
        match self.tools.iter().find(|(tool, _)| tool.name == name) {
            Some((_, ToolBehavior::Returns(result))) => Ok(Some(result.clone())),
            Some((_, ToolBehavior::ReturnsNothing)) => Ok(None),
            Some((_, ToolBehavior::Fails(error))) => Err(AgentError::ExecutionError(error.clone())),
            Some((_, ToolBehavior::Delayed(delay, result))) => {
                tokio::time::sleep(*delay).await;
                self.record(format!("done:{}", name));
                Ok(Some(result.clone()))
            }
            Some((_, ToolBehavior::Hangs)) => futures::future::pending().await,
            None => Err(AgentError::ToolNotFound(name.to_string())),
        }
    }

    async fn list_prompts(&self) -> AgentResult<Vec<PromptInfo>> {
        self.record("list_prompts".to_string());
        if self.fail_listing {
            return Err(AgentError::Internal("session closed".to_string()));
        }
        Ok(self.prompts.iter().map(|(info, _)| info.clone()).collect())
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: HashMap<String, String>,
    ) -> AgentResult<Vec<PromptMessage>> {
        self.record(format!("get_prompt:{}", name));
        let (_, blocks) = self
            .prompts
            .iter()
            .find(|(info, _)| info.name == name)
            .ok_or_else(|| AgentError::PromptNotFound(name.to_string()))?;
        if !arguments.contains_key("doc_id") {
            return Err(AgentError::InvalidParameters("doc_id is required".to_string()));
        }
        Ok(blocks.clone())
    }

    async fn read_resource(&self, uri: &str) -> AgentResult<Vec<ResourceContents>> {
        self.record(format!("read_resource:{}", uri));
        if self.fail_listing {
            return Err(AgentError::Internal("session closed".to_string()));
        }
        if uri == DOCUMENTS_URI {
            let ids: Vec<&str> = self.documents.iter().map(|(id, _)| id.as_str()).collect();
            return Ok(vec![ResourceContents::json(uri, &json!(ids))]);
        }
        self.documents
            .iter()
            .find(|(id, _)| document_uri(id) == uri)
            .map(|(_, text)| vec![ResourceContents::text(uri, text.clone())])
            .ok_or_else(|| AgentError::ResourceNotFound(uri.to_string()))
    }
}
