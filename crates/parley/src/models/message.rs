use chrono::Utc;
use serde_json::Value;

use super::role::Role;

/// A request from the model to invoke a tool
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Value,
}

impl FunctionCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// The answer to a FunctionCall, matched to it by name
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    /// Serialized tool output
    pub content: String,
    pub is_error: bool,
}

impl FunctionResponse {
    pub fn success<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// Content passed inside a message, which can be both simple content and tool content
pub enum MessageContent {
    Text(TextContent),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn function_call<S: Into<String>>(name: S, arguments: Value) -> Self {
        MessageContent::FunctionCall(FunctionCall::new(name, arguments))
    }

    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        if let MessageContent::FunctionCall(ref call) = self {
            Some(call)
        } else {
            None
        }
    }

    pub fn as_function_response(&self) -> Option<&FunctionResponse> {
        if let MessageContent::FunctionResponse(ref response) = self {
            Some(response)
        } else {
            None
        }
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Message {
            role: Role::User,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Create a new model message with the current timestamp
    pub fn model() -> Self {
        Message {
            role: Role::Model,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Add a function call to the message
    pub fn with_function_call<S: Into<String>>(self, name: S, arguments: Value) -> Self {
        self.with_content(MessageContent::function_call(name, arguments))
    }

    /// Add a function response to the message
    pub fn with_function_response(self, response: FunctionResponse) -> Self {
        self.with_content(MessageContent::FunctionResponse(response))
    }

    /// All function calls in this message, in order
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.content
            .iter()
            .filter_map(MessageContent::as_function_call)
            .collect()
    }

    pub fn has_function_calls(&self) -> bool {
        self.content
            .iter()
            .any(|content| matches!(content, MessageContent::FunctionCall(_)))
    }

    /// The text parts of this message joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
