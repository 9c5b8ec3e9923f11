use anyhow::Result;
use parley::models::message::FunctionCall;

pub mod completion;
pub mod rustyline;

pub trait Prompt {
    /// Render model output or status text as markdown
    fn render(&mut self, content: &str);
    fn render_error(&mut self, error: &str);
    /// Show a tool call the model made before its result is known
    fn render_tool_call(&mut self, call: &FunctionCall);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&self);
    fn close(&self);
    /// Replace the document ids and command names offered for completion
    fn set_completions(&mut self, documents: Vec<String>, commands: Vec<String>);
    fn parley_ready(&self) {
        println!("\n");
        println!("Parley is running! Ask a question, mention a document with @id, or run a /command.");
        println!("\n");
    }
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Optional content as sometimes the user may be issuing a command eg. (Exit)
}

impl Input {
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            input_type: InputType::Message,
            content: Some(content.into()),
        }
    }

    pub fn control(input_type: InputType) -> Self {
        Self {
            input_type,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// The bat theme used to highlight markdown
    pub fn bat_theme(&self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

/// Handle the inputs the CLI answers itself instead of sending them to the agent
pub fn builtin_input(text: &str) -> Option<Input> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Input::control(InputType::AskAgain));
    }
    if text.eq_ignore_ascii_case("/exit") || text.eq_ignore_ascii_case("/quit") {
        return Some(Input::control(InputType::Exit));
    }
    if text.eq_ignore_ascii_case("/?") || text.eq_ignore_ascii_case("/help") {
        print_help();
        return Some(Input::control(InputType::AskAgain));
    }
    None
}

fn print_help() {
    println!("Commands:");
    println!("/exit | /quit - Exit the session");
    println!("/? | /help - Display this help message");
    println!("/<prompt> <doc_id> - Run a prompt from the document server, e.g. /summarize plan.md");
    println!("@<doc_id> - Include a document in your question, e.g. what is in @spec.txt?");
    println!("Ctrl+C - Interrupt the model (resets the interaction to before the interrupted request)");
}
