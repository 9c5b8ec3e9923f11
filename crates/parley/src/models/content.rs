use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// Content returned by a system, either from a tool call or inside a prompt template
pub enum Content {
    Text(TextContent),
    Image(ImageContent),
}

impl Content {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Content::Text(TextContent { text: text.into() })
    }

    pub fn image<S: Into<String>, T: Into<String>>(data: S, mime_type: T) -> Self {
        Content::Image(ImageContent {
            data: data.into(),
            mime_type: mime_type.into(),
        })
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(&text.text),
            Content::Image(_) => None,
        }
    }
}

/// The outcome of a tool invocation as reported by the system that ran it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    pub fn success(content: Vec<Content>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(content: Vec<Content>) -> Self {
        Self {
            content,
            is_error: true,
        }
    }

    /// The text items of the result, in order. Images and other content are skipped.
    pub fn texts(&self) -> Vec<&str> {
        self.content.iter().filter_map(Content::as_text).collect()
    }
}

/// The contents of a resource read from a system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    pub text: String,
}

fn default_mime_type() -> String {
    "text/plain".to_string()
}

impl ResourceContents {
    pub fn text<U: Into<String>, T: Into<String>>(uri: U, text: T) -> Self {
        Self {
            uri: uri.into(),
            mime_type: default_mime_type(),
            text: text.into(),
        }
    }

    pub fn json<U: Into<String>>(uri: U, value: &serde_json::Value) -> Self {
        Self {
            uri: uri.into(),
            mime_type: "application/json".to_string(),
            text: value.to_string(),
        }
    }
}
