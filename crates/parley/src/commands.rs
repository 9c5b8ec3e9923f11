use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::models::prompt::{PromptInfo, PromptMessage};
use crate::resolver::MENTION_MARKER;
use crate::systems::System;

/// The marker that starts a command query
pub const COMMAND_MARKER: char = '/';

/// The prompt argument that receives a command's first parameter
pub const DOC_ID_ARGUMENT: &str = "doc_id";

/// A parsed `/name arg` query
#[derive(Debug, Clone, PartialEq)]
pub struct Command<'a> {
    pub name: &'a str,
    pub doc_id: Option<&'a str>,
}

impl<'a> Command<'a> {
    /// Parse a query as a command. Returns `None` when the query is not a command.
    pub fn parse(query: &'a str) -> Option<Self> {
        if !query.starts_with(COMMAND_MARKER) {
            return None;
        }
        let mut words = query.split_whitespace();
        let name = words
            .next()
            .map(|word| word.trim_start_matches(COMMAND_MARKER))
            .unwrap_or_default();
        // a completed mention may stand in for the document id
        let doc_id = words
            .next()
            .map(|word| word.strip_prefix(MENTION_MARKER).unwrap_or(word))
            .filter(|word| !word.is_empty());
        Some(Self { name, doc_id })
    }
}

/// Expands `/command arg` queries into prompt templates served by a system.
pub struct CommandProcessor {
    system: Option<Arc<dyn System>>,
}

impl CommandProcessor {
    pub fn new(system: Option<Arc<dyn System>>) -> Self {
        Self { system }
    }

    fn system(&self) -> AgentResult<&Arc<dyn System>> {
        self.system
            .as_ref()
            .ok_or_else(|| AgentError::InvalidCommand("no system serves prompts".to_string()))
    }

    /// The prompts available as commands
    pub async fn list_commands(&self) -> AgentResult<Vec<PromptInfo>> {
        self.system()?.list_prompts().await
    }

    /// Render the prompt a command refers to.
    ///
    /// Returns `Ok(None)` for queries that are not commands. Any failure to render a
    /// command is an error, so a malformed command is never treated as chat text.
    pub async fn try_expand(&self, query: &str) -> AgentResult<Option<Vec<Message>>> {
        let Some(command) = Command::parse(query) else {
            return Ok(None);
        };
        if command.name.is_empty() {
            return Err(AgentError::InvalidCommand(format!(
                "missing command name in '{}'",
                query.trim()
            )));
        }

        let mut arguments = HashMap::new();
        if let Some(doc_id) = command.doc_id {
            arguments.insert(DOC_ID_ARGUMENT.to_string(), doc_id.to_string());
        }

        let blocks = self.system()?.get_prompt(command.name, arguments).await?;
        debug!(command = command.name, blocks = blocks.len(), "expanded command");
        Ok(Some(blocks.into_iter().map(PromptMessage::into_message).collect()))
    }
}
