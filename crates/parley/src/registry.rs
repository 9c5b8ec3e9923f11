use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::tool::Tool;
use crate::systems::System;

/// A snapshot of every tool offered by a set of systems.
///
/// Systems are queried in registration order. When two systems offer a tool with the
/// same name, the first one owns it and the later tool is left out of the catalog.
pub struct ToolRegistry {
    tools: Vec<Tool>,
    owners: HashMap<String, Arc<dyn System>>,
}

impl ToolRegistry {
    /// Query each system's tool list and build the catalog. A system whose listing
    /// fails contributes no tools.
    pub async fn aggregate(systems: &[Arc<dyn System>]) -> Self {
        let mut tools = Vec::new();
        let mut owners: HashMap<String, Arc<dyn System>> = HashMap::new();

        for system in systems {
            let listed = match system.list_tools().await {
                Ok(listed) => listed,
                Err(e) => {
                    warn!(system = system.name(), error = %e, "failed to list tools");
                    continue;
                }
            };

            for tool in listed {
                if owners.contains_key(&tool.name) {
                    debug!(
                        system = system.name(),
                        tool = %tool.name,
                        "tool shadowed by an earlier system"
                    );
                    continue;
                }
                owners.insert(tool.name.clone(), Arc::clone(system));
                tools.push(tool);
            }
        }

        Self { tools, owners }
    }

    /// The aggregated catalog in registration order
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Find the system that owns a tool
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn System>> {
        self.owners.get(name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::mock::MockSystem;

    fn systems(list: Vec<MockSystem>) -> Vec<Arc<dyn System>> {
        list.into_iter()
            .map(|system| Arc::new(system) as Arc<dyn System>)
            .collect()
    }

    #[tokio::test]
    async fn test_aggregate_concatenates_in_registration_order() {
        let systems = systems(vec![
            MockSystem::new("docs")
                .with_tool("read_doc_contents", &["a"])
                .with_tool("edit_doc_contents", &["b"]),
            MockSystem::new("web").with_tool("fetch", &["c"]),
        ]);

        let registry = ToolRegistry::aggregate(&systems).await;
        let names: Vec<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["read_doc_contents", "edit_doc_contents", "fetch"]);
        assert_eq!(registry.resolve("fetch").unwrap().name(), "web");
    }

    #[tokio::test]
    async fn test_first_registered_system_wins() {
        let systems = systems(vec![
            MockSystem::new("first").with_tool("search", &["1"]),
            MockSystem::new("second")
                .with_tool("search", &["2"])
                .with_tool("other", &["3"]),
        ]);

        let registry = ToolRegistry::aggregate(&systems).await;
        assert_eq!(registry.resolve("search").unwrap().name(), "first");
        assert_eq!(registry.resolve("other").unwrap().name(), "second");
        assert_eq!(registry.tools().len(), 2);
        assert_eq!(registry.tools()[0].description, "search from first");
    }

    #[tokio::test]
    async fn test_resolve_unknown_is_none() {
        let registry =
            ToolRegistry::aggregate(&systems(vec![MockSystem::new("docs").with_tool("a", &[])])).await;
        assert!(registry.resolve("b").is_none());
    }

    #[tokio::test]
    async fn test_failed_listing_is_skipped() {
        let systems = systems(vec![
            MockSystem::new("broken").failing_listing(),
            MockSystem::new("docs").with_tool("read_doc_contents", &[]),
        ]);

        let registry = ToolRegistry::aggregate(&systems).await;
        assert_eq!(registry.tools().len(), 1);
        assert_eq!(registry.resolve("read_doc_contents").unwrap().name(), "docs");
    }

    #[tokio::test]
    async fn test_no_systems_is_empty() {
        let registry = ToolRegistry::aggregate(&[]).await;
        assert!(registry.is_empty());
    }
}
