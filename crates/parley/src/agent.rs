use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::commands::{CommandProcessor, COMMAND_MARKER};
use crate::conversation::Conversation;
use crate::dispatch::ToolDispatcher;
use crate::errors::{AgentError, AgentResult};
use crate::models::message::{FunctionCall, Message};
use crate::models::tool::Tool;
use crate::providers::base::Provider;
use crate::registry::ToolRegistry;
use crate::resolver::{ResourceResolver, MENTION_MARKER};
use crate::systems::System;

/// Returned in place of an answer when the model produced no text
pub const EMPTY_ANSWER: &str = "The model did not return usable text.";

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;

/// When the tool catalog is offered to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolPolicy {
    /// Only for queries that start with a command or mention a document
    #[default]
    OnDemand,
    /// On every model call
    Always,
}

/// Progress reported while a turn is still running
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Text the model wrote alongside its tool calls
    Interim(String),
    /// A tool call about to be dispatched
    ToolCall(FunctionCall),
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub max_tool_rounds: usize,
    pub tool_policy: ToolPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            tool_policy: ToolPolicy::default(),
        }
    }
}

/// Agent integrates a foundational LLM with the systems it needs to pilot
///
/// The agent owns its conversation. Systems are shared with whoever connected
/// them, and that owner is responsible for shutting them down.
pub struct Agent {
    provider: Box<dyn Provider>,
    systems: Vec<Arc<dyn System>>,
    resolver: Option<ResourceResolver>,
    commands: CommandProcessor,
    conversation: Conversation,
    config: AgentConfig,
    events: Option<UnboundedSender<AgentEvent>>,
}

impl Agent {
    /// Create a new Agent with the specified provider
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            systems: Vec::new(),
            resolver: None,
            commands: CommandProcessor::new(None),
            conversation: Conversation::new(),
            config: AgentConfig::default(),
            events: None,
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a system for `@id` mentions and `/command` prompts
    pub fn with_documents(mut self, system: Arc<dyn System>) -> Self {
        self.resolver = Some(ResourceResolver::new(Arc::clone(&system)));
        self.commands = CommandProcessor::new(Some(system));
        self
    }

    /// Report interim text and tool calls to a channel while turns run
    pub fn set_events(&mut self, events: UnboundedSender<AgentEvent>) {
        self.events = Some(events);
    }

    /// Add a system whose tools the model may call. Earlier systems win tool name clashes.
    pub fn add_system(&mut self, system: Arc<dyn System>) {
        self.systems.push(system);
    }

    pub fn systems(&self) -> &[Arc<dyn System>] {
        &self.systems
    }

    pub fn resolver(&self) -> Option<&ResourceResolver> {
        self.resolver.as_ref()
    }

    pub fn commands(&self) -> &CommandProcessor {
        &self.commands
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run one turn for a raw user query and return the model's final answer.
    ///
    /// The turn works on a copy of the conversation that replaces the stored one only
    /// when the turn completes. An error, or dropping the returned future, leaves the
    /// conversation as it was before the query.
    pub async fn run(&mut self, query: &str) -> AgentResult<String> {
        let mut conversation = self.conversation.clone();
        let answer = self.run_turn(&mut conversation, query).await?;
        self.conversation = conversation;
        Ok(answer)
    }

    fn emit(&self, event: AgentEvent) {
        if let Some(events) = &self.events {
            // a closed receiver only means nobody is listening
            let _ = events.send(event);
        }
    }

    fn wants_tools(&self, query: &str) -> bool {
        match self.config.tool_policy {
            ToolPolicy::Always => true,
            ToolPolicy::OnDemand => {
                query.starts_with(COMMAND_MARKER) || query.contains(MENTION_MARKER)
            }
        }
    }

    /// The query text followed by one part per mentioned document
    async fn expand_query(&self, query: &str) -> Message {
        let mut message = Message::user().with_text(query);
        if let Some(resolver) = &self.resolver {
            for block in resolver.expand(query).await {
                message = message.with_text(block.render());
            }
        }
        message
    }

    async fn run_turn(&self, conversation: &mut Conversation, query: &str) -> AgentResult<String> {
        match self.commands.try_expand(query).await? {
            Some(messages) => conversation.extend(messages),
            None => conversation.append(self.expand_query(query).await),
        }

        let attach_tools = self.wants_tools(query);
        let mut registry = if attach_tools {
            Some(ToolRegistry::aggregate(&self.systems).await)
        } else {
            None
        };

        let mut rounds = 0;
        loop {
            let tools: &[Tool] = match (&registry, attach_tools) {
                (Some(registry), true) => registry.tools(),
                _ => &[],
            };
            let (response, usage) = self
                .provider
                .complete(conversation.snapshot(), tools)
                .await
                .map_err(|e| AgentError::Provider(e.to_string()))?;
            debug!(
                input_tokens = ?usage.input_tokens,
                output_tokens = ?usage.output_tokens,
                "model responded"
            );

            let requests: Vec<FunctionCall> =
                response.function_calls().into_iter().cloned().collect();
            let interim = response.text();
            conversation.append(response);

            if requests.is_empty() {
                if interim.trim().is_empty() {
                    return Ok(EMPTY_ANSWER.to_string());
                }
                return Ok(interim);
            }

            if rounds >= self.config.max_tool_rounds {
                return Err(AgentError::ToolRoundLimitExceeded(rounds));
            }
            rounds += 1;

            // the model may call tools it was not offered this turn
            let catalog = match registry.take() {
                Some(catalog) => catalog,
                None => ToolRegistry::aggregate(&self.systems).await,
            };
            info!(round = rounds, calls = requests.len(), "running tool round");
            if !interim.trim().is_empty() {
                self.emit(AgentEvent::Interim(interim));
            }
            for request in &requests {
                self.emit(AgentEvent::ToolCall(request.clone()));
            }
            let responses = ToolDispatcher::new(&catalog).execute(&requests).await;
            registry = Some(catalog);

            conversation.append(
                responses
                    .into_iter()
                    .fold(Message::user(), Message::with_function_response),
            );
        }
    }
}
