use serde::{Deserialize, Serialize};

use super::content::Content;
use super::message::{Message, MessageContent};
use super::role::Role;

/// An argument accepted by a prompt template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// A prompt template advertised by a system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub arguments: Vec<PromptArgument>,
}

impl PromptInfo {
    pub fn new<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument<N: Into<String>, D: Into<String>>(
        mut self,
        name: N,
        description: D,
        required: bool,
    ) -> Self {
        self.arguments.push(PromptArgument {
            name: name.into(),
            description: Some(description.into()),
            required,
        });
        self
    }
}

/// The body of one rendered prompt block, a single content item or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptContent {
    Single(Content),
    Multiple(Vec<Content>),
}

/// One role-tagged block of a rendered prompt template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// The role as reported by the system, e.g. "user" or "assistant"
    pub role: String,
    pub content: PromptContent,
}

impl PromptMessage {
    pub fn text<R: Into<String>, T: Into<String>>(role: R, text: T) -> Self {
        Self {
            role: role.into(),
            content: PromptContent::Single(Content::text(text)),
        }
    }

    /// Convert into a conversation message. Text items become text parts in order,
    /// anything else is dropped.
    pub fn into_message(self) -> Message {
        let message = match Role::from_prompt_role(&self.role) {
            Role::User => Message::user(),
            Role::Model => Message::model(),
        };
        let contents = match self.content {
            PromptContent::Single(content) => vec![content],
            PromptContent::Multiple(contents) => contents,
        };
        contents
            .into_iter()
            .filter_map(|content| match content {
                Content::Text(text) => Some(MessageContent::text(text.text)),
                Content::Image(_) => None,
            })
            .fold(message, Message::with_content)
    }
}
