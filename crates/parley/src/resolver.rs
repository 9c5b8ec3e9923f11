use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{AgentError, AgentResult};
use crate::systems::{document_uri, System, DOCUMENTS_URI};

/// The marker that starts a document mention in a query
pub const MENTION_MARKER: char = '@';

/// A document pulled into the conversation by a mention
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentBlock {
    pub id: String,
    pub text: String,
}

impl DocumentBlock {
    /// Render the block the way it is shown to the model
    pub fn render(&self) -> String {
        format!("\n<document id=\"{}\">\n{}\n</document>\n", self.id, self.text)
    }
}

/// The ids mentioned in a query, in the order they appear
pub fn mentions(query: &str) -> Vec<&str> {
    query
        .split_whitespace()
        .filter_map(|word| word.strip_prefix(MENTION_MARKER))
        .collect()
}

/// Expands `@id` mentions into the documents a system serves.
pub struct ResourceResolver {
    system: Arc<dyn System>,
}

impl ResourceResolver {
    pub fn new(system: Arc<dyn System>) -> Self {
        Self { system }
    }

    /// The ids of every document the system serves
    pub async fn catalog(&self) -> AgentResult<Vec<String>> {
        let contents = self.system.read_resource(DOCUMENTS_URI).await?;
        let first = contents
            .first()
            .ok_or_else(|| AgentError::ResourceNotFound(DOCUMENTS_URI.to_string()))?;
        serde_json::from_str(&first.text).map_err(|e| {
            AgentError::Internal(format!("malformed document catalog: {}", e))
        })
    }

    async fn read_document(&self, id: &str) -> AgentResult<String> {
        let uri = document_uri(id);
        let contents = self.system.read_resource(&uri).await?;
        Ok(contents
            .into_iter()
            .map(|content| content.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Fetch every catalog document mentioned in the query.
    ///
    /// Blocks follow catalog order and each document appears at most once. Mentions
    /// that match nothing are dropped. Read failures are logged and leave the
    /// affected documents out. A query without a marker does no I/O.
    pub async fn expand(&self, query: &str) -> Vec<DocumentBlock> {
        if !query.contains(MENTION_MARKER) {
            return Vec::new();
        }
        let mentioned: HashSet<&str> = mentions(query).into_iter().collect();
        if mentioned.is_empty() {
            return Vec::new();
        }

        let catalog = match self.catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "failed to read document catalog");
                return Vec::new();
            }
        };

        let mut blocks = Vec::new();
        for id in catalog {
            if !mentioned.contains(id.as_str()) {
                continue;
            }
            match self.read_document(&id).await {
                Ok(text) => blocks.push(DocumentBlock { id, text }),
                Err(e) => warn!(document = %id, error = %e, "failed to read document"),
            }
        }
        debug!(mentioned = mentioned.len(), found = blocks.len(), "expanded mentions");
        blocks
    }
}
