use async_trait::async_trait;
use indoc::indoc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::commands::DOC_ID_ARGUMENT;
use crate::errors::{AgentError, AgentResult};
use crate::models::content::{CallToolResult, Content, ResourceContents};
use crate::models::prompt::{PromptInfo, PromptMessage};
use crate::models::tool::Tool;
use crate::prompt_template::render_builtin;
use crate::systems::{System, DOCUMENTS_URI};

const DEFAULT_DOCUMENTS: [(&str, &str); 6] = [
    (
        "deposition.md",
        "This deposition covers the testimony of Angela Smith, P.E.",
    ),
    (
        "report.pdf",
        "The report details the state of a 20m condenser tower.",
    ),
    (
        "financials.docx",
        "These financials outline the project's budget and expenditures.",
    ),
    (
        "outlook.pdf",
        "This document presents the projected future performance of the system.",
    ),
    (
        "plan.md",
        "The plan outlines the steps for the project's implementation.",
    ),
    (
        "spec.txt",
        "These specifications define the technical requirements for the equipment.",
    ),
];

/// Which document resource a URI points at
#[derive(Debug, PartialEq)]
enum DocumentResource {
    Catalog,
    Document(String),
}

fn parse_resource_uri(uri: &str) -> AgentResult<DocumentResource> {
    let not_found = || AgentError::ResourceNotFound(uri.to_string());
    let url = Url::parse(uri).map_err(|_| not_found())?;
    let catalog = Url::parse(DOCUMENTS_URI).map_err(|e| AgentError::Internal(e.to_string()))?;
    if url.scheme() != catalog.scheme()
        || url.host_str() != catalog.host_str()
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return Err(not_found());
    }

    match url.path().trim_start_matches('/') {
        "" => Ok(DocumentResource::Catalog),
        id if id.contains('/') => Err(not_found()),
        id => urlencoding::decode(id)
            .map(|id| DocumentResource::Document(id.into_owned()))
            .map_err(|_| not_found()),
    }
}

/// An in-process system serving a small store of text documents.
///
/// Documents keep their insertion order, which is the order of the catalog.
pub struct DocumentSystem {
    tools: Vec<Tool>,
    prompts: Vec<PromptInfo>,
    documents: RwLock<Vec<(String, String)>>,
}

impl Default for DocumentSystem {
    fn default() -> Self {
        Self::new(
            DEFAULT_DOCUMENTS
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
        )
    }
}

impl DocumentSystem {
    pub fn new(documents: Vec<(String, String)>) -> Self {
        let read_tool = Tool::new(
            "read_doc_contents",
            "Reads the contents of a document given its ID and return it as a string. \
            The document ID is the filename of the document.",
            json!({
                "type": "object",
                "required": ["doc_id"],
                "properties": {
                    "doc_id": {
                        "type": "string",
                        "description": "The ID of the document to read."
                    }
                }
            }),
        );

        let edit_tool = Tool::new(
            "edit_doc_contents",
            indoc! {"
                Edits the contents of a document given its ID and new content.
                Every occurrence of old_content is replaced with new_content.
                Returns the updated content of the document.
            "}
            .trim(),
            json!({
                "type": "object",
                "required": ["doc_id", "old_content", "new_content"],
                "properties": {
                    "doc_id": {
                        "type": "string",
                        "description": "The ID of the document to edit."
                    },
                    "old_content": {
                        "type": "string",
                        "description": "The old content of the document."
                    },
                    "new_content": {
                        "type": "string",
                        "description": "The new content to write to the document."
                    }
                }
            }),
        );

        let prompts = vec![
            PromptInfo::new("format", "Rewrites the contents of the document in Markdown format.")
                .with_argument(DOC_ID_ARGUMENT, "Id of the document to format", true),
            PromptInfo::new("summarize", "Summarizes the contents of the document.")
                .with_argument(DOC_ID_ARGUMENT, "Id of the document to summarize", true),
        ];

        Self {
            tools: vec![read_tool, edit_tool],
            prompts,
            documents: RwLock::new(documents),
        }
    }

    /// Load every readable text file in a directory, ordered by file name
    pub fn from_dir(dir: impl AsRef<Path>) -> AgentResult<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AgentError::Internal(format!("failed to read {}: {}", dir.display(), e))
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            let Some(id) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(text) => documents.push((id.to_string(), text)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable document"),
            }
        }
        debug!(dir = %dir.display(), documents = documents.len(), "loaded documents");
        Ok(Self::new(documents))
    }

    async fn document(&self, id: &str) -> Option<String> {
        self.documents
            .read()
            .await
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, text)| text.clone())
    }

    async fn ids(&self) -> Vec<String> {
        self.documents
            .read()
            .await
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    async fn read_doc_contents(&self, params: Value) -> AgentResult<CallToolResult> {
        let doc_id = required_str(&params, "doc_id")?;
        Ok(match self.document(doc_id).await {
            Some(text) => CallToolResult::success(vec![Content::text(text)]),
            None => missing_document(doc_id),
        })
    }

    async fn edit_doc_contents(&self, params: Value) -> AgentResult<CallToolResult> {
        let doc_id = required_str(&params, "doc_id")?;
        let old_content = required_str(&params, "old_content")?;
        let new_content = required_str(&params, "new_content")?;
        if old_content.is_empty() {
            return Err(AgentError::InvalidParameters(
                "old_content must not be empty".to_string(),
            ));
        }

        let mut documents = self.documents.write().await;
        let Some((_, text)) = documents.iter_mut().find(|(id, _)| id.as_str() == doc_id) else {
            return Ok(missing_document(doc_id));
        };
        *text = text.replace(old_content, new_content);
        debug!(document = doc_id, "edited document");
        Ok(CallToolResult::success(vec![Content::text(text.clone())]))
    }
}

fn required_str<'a>(params: &'a Value, key: &str) -> AgentResult<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AgentError::InvalidParameters(format!("Missing '{}' parameter", key)))
}

fn missing_document(doc_id: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!(
        "Document with ID '{}' not found.",
        doc_id
    ))])
}

#[async_trait]
impl System for DocumentSystem {
    fn name(&self) -> &str {
        "documents"
    }

    async fn list_tools(&self) -> AgentResult<Vec<Tool>> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<Option<CallToolResult>> {
        let result = match name {
            "read_doc_contents" => self.read_doc_contents(arguments).await?,
            "edit_doc_contents" => self.edit_doc_contents(arguments).await?,
            _ => return Err(AgentError::ToolNotFound(name.to_string())),
        };
        Ok(Some(result))
    }

    async fn list_prompts(&self) -> AgentResult<Vec<PromptInfo>> {
        Ok(self.prompts.clone())
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: HashMap<String, String>,
    ) -> AgentResult<Vec<PromptMessage>> {
        if !self.prompts.iter().any(|prompt| prompt.name == name) {
            return Err(AgentError::PromptNotFound(name.to_string()));
        }
        let doc_id = arguments.get(DOC_ID_ARGUMENT).ok_or_else(|| {
            AgentError::InvalidParameters(format!("/{} requires a document id", name))
        })?;
        let text = self
            .document(doc_id)
            .await
            .ok_or_else(|| AgentError::ResourceNotFound(doc_id.clone()))?;

        let context = HashMap::from([("doc_id", doc_id.as_str()), ("text", text.as_str())]);
        let rendered = render_builtin(name, &context)
            .map_err(|e| AgentError::Internal(format!("failed to render '{}': {}", name, e)))?;
        Ok(vec![PromptMessage::text("user", rendered)])
    }

    async fn read_resource(&self, uri: &str) -> AgentResult<Vec<ResourceContents>> {
        match parse_resource_uri(uri)? {
            DocumentResource::Catalog => {
                let ids = self.ids().await;
                Ok(vec![ResourceContents::json(DOCUMENTS_URI, &json!(ids))])
            }
            DocumentResource::Document(id) => {
                let text = self
                    .document(&id)
                    .await
                    .ok_or_else(|| AgentError::ResourceNotFound(uri.to_string()))?;
                Ok(vec![ResourceContents::text(uri, text)])
            }
        }
    }
}
