use anyhow::{anyhow, Result};
use serde_json::{json, Map, Value};

use super::base::Usage;
use crate::models::message::{Message, MessageContent};
use crate::models::tool::Tool;

/// JSON schema keywords the Gemini function declaration format rejects
const UNSUPPORTED_SCHEMA_KEYS: [&str; 4] = ["$schema", "additionalProperties", "title", "default"];

/// Convert internal Message format to Gemini's `contents` specification
///
/// Messages without any sendable part are skipped, the API rejects empty `parts`.
pub fn messages_to_gemini_spec(messages: &[Message]) -> Vec<Value> {
    let mut contents = Vec::new();

    for message in messages {
        let mut parts = Vec::new();
        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        parts.push(json!({ "text": text.text }));
                    }
                }
                MessageContent::FunctionCall(call) => {
                    parts.push(json!({
                        "functionCall": {
                            "name": call.name,
                            "args": call.arguments,
                        }
                    }));
                }
                MessageContent::FunctionResponse(response) => {
                    parts.push(json!({
                        "functionResponse": {
                            "name": response.name,
                            "response": {
                                "content": response.content,
                                "is_error": response.is_error,
                            }
                        }
                    }));
                }
            }
        }

        if !parts.is_empty() {
            contents.push(json!({
                "role": message.role.as_str(),
                "parts": parts,
            }));
        }
    }

    contents
}

/// Convert internal Tool format to Gemini's function declarations
pub fn tools_to_gemini_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "name": tool.name,
            "description": tool.description,
            "parameters": sanitize_schema(&tool.input_schema),
        }));
    }

    Ok(result)
}

/// Strip the schema keywords Gemini does not accept, recursively
pub fn sanitize_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .iter()
                .filter(|(key, _)| !UNSUPPORTED_SCHEMA_KEYS.contains(&key.as_str()))
                .map(|(key, value)| {
                    // property names are user data, only their schemas get cleaned
                    let value = if key == "properties" {
                        match value {
                            Value::Object(properties) => Value::Object(
                                properties
                                    .iter()
                                    .map(|(name, property)| (name.clone(), sanitize_schema(property)))
                                    .collect(),
                            ),
                            other => other.clone(),
                        }
                    } else {
                        sanitize_schema(value)
                    };
                    (key.clone(), value)
                })
                .collect();
            Value::Object(cleaned)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize_schema).collect()),
        other => other.clone(),
    }
}

/// Convert Gemini's API response to internal Message format
pub fn gemini_response_to_message(response: &Value) -> Result<Message> {
    let candidate = response
        .get("candidates")
        .and_then(|candidates| candidates.as_array())
        .and_then(|candidates| candidates.first())
        .ok_or_else(|| match response["promptFeedback"]["blockReason"].as_str() {
            Some(reason) => anyhow!("Prompt blocked by Gemini: {}", reason),
            None => anyhow!("Invalid response format from Gemini API: no candidates"),
        })?;

    let mut message = Message::model();
    let parts = candidate["content"]["parts"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    for part in parts {
        if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
            message = message.with_text(text);
        } else if let Some(call) = part.get("functionCall") {
            let name = call
                .get("name")
                .and_then(|n| n.as_str())
                .ok_or_else(|| anyhow!("Gemini function call without a name"))?;
            let arguments = call.get("args").cloned().unwrap_or_else(|| json!({}));
            message = message.with_function_call(name, arguments);
        }
    }

    Ok(message)
}

/// Read the token counts Gemini reports alongside a response
pub fn get_usage(response: &Value) -> Usage {
    let metadata = &response["usageMetadata"];
    let read = |key: &str| metadata.get(key).and_then(|v| v.as_i64()).map(|v| v as i32);

    let input_tokens = read("promptTokenCount");
    let output_tokens = read("candidatesTokenCount");
    let total_tokens = read("totalTokenCount").or(match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    });

    Usage::new(input_tokens, output_tokens, total_tokens)
}
