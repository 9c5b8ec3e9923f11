use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::warn;

use crate::prompt::{InputType, Prompt};

use parley::agent::{Agent, AgentEvent};

pub struct Session<'a> {
    agent: Agent,
    prompt: Box<dyn Prompt + 'a>,
    events: UnboundedReceiver<AgentEvent>,
}

impl<'a> Session<'a> {
    pub fn new(mut agent: Agent, prompt: Box<dyn Prompt + 'a>) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        agent.set_events(sender);
        Session {
            agent,
            prompt,
            events,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub async fn start(&mut self) -> Result<()> {
        self.announce().await;
        self.prompt.parley_ready();

        loop {
            let input = self.prompt.get_input()?;
            let content = match input.input_type {
                InputType::Exit => break,
                InputType::AskAgain => continue,
                InputType::Message => match input.content {
                    Some(content) => content,
                    None => continue,
                },
            };

            self.prompt.show_busy();
            let turn = self.agent.run(&content);
            tokio::pin!(turn);
            let interrupted = tokio::signal::ctrl_c();
            tokio::pin!(interrupted);
            let outcome = loop {
                tokio::select! {
                    result = &mut turn => break Some(result),
                    _ = &mut interrupted => break None,
                    Some(event) = self.events.recv() => {
                        self.prompt.hide_busy();
                        render_event(self.prompt.as_mut(), event);
                        self.prompt.show_busy();
                    }
                }
            };
            self.prompt.hide_busy();
            while let Ok(event) = self.events.try_recv() {
                render_event(self.prompt.as_mut(), event);
            }

            match outcome {
                Some(Ok(answer)) => self.prompt.render(&answer),
                Some(Err(e)) => self.prompt.render_error(&e.to_string()),
                None => self
                    .prompt
                    .render_error("Interrupted. The conversation is unchanged."),
            }
        }
        self.prompt.close();
        Ok(())
    }

    /// List the documents and commands on offer. Failures are reported and the session
    /// starts without them.
    async fn announce(&mut self) {
        let documents = match self.agent.resolver() {
            Some(resolver) => match resolver.catalog().await {
                Ok(documents) => documents,
                Err(e) => {
                    warn!(error = %e, "failed to list documents");
                    self.prompt
                        .render_error(&format!("Could not list documents: {}", e));
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let commands = match self.agent.commands().list_commands().await {
            Ok(prompts) => prompts.into_iter().map(|prompt| prompt.name).collect(),
            Err(e) => {
                warn!(error = %e, "failed to list prompts");
                Vec::new()
            }
        };

        let mut overview = String::new();
        if !documents.is_empty() {
            overview.push_str("**Documents:** ");
            overview.push_str(
                &documents
                    .iter()
                    .map(|id| format!("@{}", id))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            overview.push('\n');
        }
        if !commands.is_empty() {
            overview.push_str("**Commands:** ");
            overview.push_str(
                &commands
                    .iter()
                    .map(|name| format!("/{}", name))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            overview.push('\n');
        }
        if !overview.is_empty() {
            self.prompt.render(&overview);
        }

        self.prompt.set_completions(documents, commands);
    }
}

fn render_event<P: Prompt + ?Sized>(prompt: &mut P, event: AgentEvent) {
    match event {
        AgentEvent::Interim(text) => prompt.render(&text),
        AgentEvent::ToolCall(call) => prompt.render_tool_call(&call),
    }
}
