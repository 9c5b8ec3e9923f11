use serde_json::json;
use tracing::{info, warn};

use crate::errors::AgentError;
use crate::models::message::{FunctionCall, FunctionResponse};
use crate::registry::ToolRegistry;

/// Runs the function calls of one model response against the systems in a registry.
pub struct ToolDispatcher<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// Execute every request and return one response per request, in request order.
    ///
    /// Calls run concurrently. A missing tool or a failing system yields an error
    /// response for that request only.
    pub async fn execute(&self, requests: &[FunctionCall]) -> Vec<FunctionResponse> {
        let futures: Vec<_> = requests.iter().map(|request| self.dispatch(request)).collect();
        futures::future::join_all(futures).await
    }

    async fn dispatch(&self, request: &FunctionCall) -> FunctionResponse {
        let Some(system) = self.registry.resolve(&request.name) else {
            warn!(tool = %request.name, "model requested an unknown tool");
            return error_response(&request.name, AgentError::ToolNotFound(request.name.clone()).to_string());
        };

        info!(tool = %request.name, system = system.name(), "calling tool");
        match system.call_tool(&request.name, request.arguments.clone()).await {
            Ok(Some(result)) => {
                let content = json!(result.texts()).to_string();
                FunctionResponse {
                    name: request.name.clone(),
                    content,
                    is_error: result.is_error,
                }
            }
            Ok(None) => FunctionResponse::success(&request.name, "[]"),
            Err(e) => {
                let message = format!("Error executing tool '{}': {}", request.name, e);
                warn!("{}", message);
                error_response(&request.name, message)
            }
        }
    }
}

fn error_response(name: &str, message: String) -> FunctionResponse {
    FunctionResponse::error(name, json!({ "error": message }).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::mock::MockSystem;
    use crate::systems::System;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    async fn registry_for(system: MockSystem) -> (ToolRegistry, Arc<MockSystem>) {
        let system = Arc::new(system);
        let systems: Vec<Arc<dyn System>> = vec![system.clone()];
        (ToolRegistry::aggregate(&systems).await, system)
    }

    fn call(name: &str) -> FunctionCall {
        FunctionCall::new(name, json!({}))
    }

    #[tokio::test]
    async fn test_missing_tool_does_not_block_others() {
        let (registry, _) = registry_for(MockSystem::new("docs").with_tool("f1", &["hello"])).await;

        let responses = ToolDispatcher::new(&registry)
            .execute(&[call("f1"), call("f2")])
            .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0], FunctionResponse::success("f1", r#"["hello"]"#));
        assert_eq!(responses[1].name, "f2");
        assert!(responses[1].is_error);
        let payload: Value = serde_json::from_str(&responses[1].content).unwrap();
        assert_eq!(payload["error"], "tool not found: f2");
    }

    #[tokio::test]
    async fn test_text_items_serialized_as_json_array() {
        let (registry, _) =
            registry_for(MockSystem::new("docs").with_tool("list", &["a", "b \"quoted\""])).await;

        let responses = ToolDispatcher::new(&registry).execute(&[call("list")]).await;
        let items: Vec<String> = serde_json::from_str(&responses[0].content).unwrap();
        assert_eq!(items, vec!["a", "b \"quoted\""]);
        assert!(!responses[0].is_error);
    }

    #[tokio::test]
    async fn test_error_flag_comes_from_system() {
        let (registry, _) =
            registry_for(MockSystem::new("docs").with_erroring_tool("edit", "no such text")).await;

        let responses = ToolDispatcher::new(&registry).execute(&[call("edit")]).await;
        assert_eq!(responses[0], FunctionResponse::error("edit", r#"["no such text"]"#));
    }

    #[tokio::test]
    async fn test_failed_invocation_becomes_error_response() {
        let (registry, system) = registry_for(
            MockSystem::new("docs")
                .with_failing_tool("boom", "pipe closed")
                .with_tool("ok", &["fine"]),
        )
        .await;

        let responses = ToolDispatcher::new(&registry)
            .execute(&[call("boom"), call("ok")])
            .await;

        assert!(responses[0].is_error);
        let payload: Value = serde_json::from_str(&responses[0].content).unwrap();
        let message = payload["error"].as_str().unwrap();
        assert!(message.starts_with("Error executing tool 'boom':"));
        assert!(message.contains("pipe closed"));
        assert_eq!(responses[1], FunctionResponse::success("ok", r#"["fine"]"#));

        let calls = system.calls();
        assert!(calls.contains(&"call_tool:boom".to_string()));
        assert!(calls.contains(&"call_tool:ok".to_string()));
    }

    #[tokio::test]
    async fn test_empty_result_is_empty_array() {
        let (registry, _) = registry_for(MockSystem::new("docs").with_silent_tool("noop")).await;

        let responses = ToolDispatcher::new(&registry).execute(&[call("noop")]).await;
        assert_eq!(responses[0], FunctionResponse::success("noop", "[]"));
    }

    #[tokio::test]
    async fn test_order_follows_requests() {
        let (registry, _) = registry_for(
            MockSystem::new("docs")
                .with_tool("a", &["1"])
                .with_tool("b", &["2"])
                .with_tool("c", &["3"]),
        )
        .await;

        let responses = ToolDispatcher::new(&registry)
            .execute(&[call("c"), call("a"), call("b"), call("a")])
            .await;
        let names: Vec<&str> = responses.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b", "a"]);
    }

    #[tokio::test]
    async fn test_order_ignores_completion_order() {
        let (registry, system) = registry_for(
            MockSystem::new("docs")
                .with_slow_tool("slow", &["late"], Duration::from_millis(50))
                .with_tool("fast", &["early"]),
        )
        .await;

        let responses = ToolDispatcher::new(&registry)
            .execute(&[call("slow"), call("fast")])
            .await;

        assert_eq!(
            responses,
            vec![
                FunctionResponse::success("slow", r#"["late"]"#),
                FunctionResponse::success("fast", r#"["early"]"#),
            ]
        );
        // both calls started before the slow one finished
        assert_eq!(
            system.calls(),
            vec!["list_tools", "call_tool:slow", "call_tool:fast", "done:slow"]
        );
    }
}
