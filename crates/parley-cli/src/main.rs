use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use parley::agent::{Agent, AgentConfig, ToolPolicy, DEFAULT_MAX_TOOL_ROUNDS};
use parley::documents::DocumentSystem;
use parley::providers::gemini::GeminiProvider;
use parley::systems::System;

mod configuration;
mod error;
mod prompt;
mod session;

use configuration::Settings;
use prompt::rustyline::RustylinePrompt;
use prompt::Theme;
use session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Maximum number of tool rounds the model may run for one query
    #[arg(long, default_value_t = DEFAULT_MAX_TOOL_ROUNDS)]
    max_tool_rounds: usize,

    /// Offer the tool catalog on every model call, not only for @mentions and /commands
    #[arg(long)]
    always_attach_tools: bool,

    /// Serve the files in this directory as documents instead of the built-in samples
    #[arg(long, value_name = "DIR")]
    docs: Option<PathBuf>,

    /// Color theme for rendered answers
    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    theme: Theme,
}

impl Cli {
    fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            max_tool_rounds: self.max_tool_rounds,
            tool_policy: if self.always_attach_tools {
                ToolPolicy::Always
            } else {
                ToolPolicy::OnDemand
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;
    println!(
        "{} {}",
        style("parley").bold(),
        style(format!("- model {}", settings.model())).dim()
    );
    let provider = GeminiProvider::new(settings.into_provider_config())?;

    let documents: Arc<dyn System> = match &cli.docs {
        Some(dir) => Arc::new(
            DocumentSystem::from_dir(dir)
                .with_context(|| format!("Failed to load documents from {}", dir.display()))?,
        ),
        None => Arc::new(DocumentSystem::default()),
    };

    let mut agent = Agent::new(Box::new(provider))
        .with_config(cli.agent_config())
        .with_documents(Arc::clone(&documents));
    agent.add_system(documents);

    let mut session = Session::new(agent, Box::new(RustylinePrompt::new(cli.theme)?));
    let result = session.start().await;

    for system in session.agent().systems() {
        if let Err(e) = system.shutdown().await {
            warn!(system = system.name(), error = %e, "failed to shut down system");
        }
    }
    result
}
