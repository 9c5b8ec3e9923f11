use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use serde_json::Value;

use parley::models::message::FunctionCall;

use super::completion::ParleyHelper;
use super::{builtin_input, Input, InputType, Prompt, Theme};

const PROMPT: &str = "\x1b[1m\x1b[38;5;30m( @/)> \x1b[0m";
const INDENT: &str = "    ";
const MAX_STRING_LENGTH: usize = 120;

pub struct RustylinePrompt {
    editor: Editor<ParleyHelper, DefaultHistory>,
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl RustylinePrompt {
    pub fn new(theme: Theme) -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(ParleyHelper::default()));
        Ok(RustylinePrompt {
            editor,
            spinner: spinner(),
            theme,
        })
    }
}

fn print_markdown(content: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if printed.is_err() {
        println!("{}", content);
    }
}

fn print_params(value: &Value, depth: usize) {
    let indent = INDENT.repeat(depth);
    let Value::Object(map) = value else {
        println!("{}{}", indent, style(value).dim());
        return;
    };
    for (key, val) in map {
        match val {
            Value::Object(_) | Value::Array(_) => {
                println!("{}{}:", indent, style(key).dim());
                print_params(val, depth + 1);
            }
            Value::String(s) if s.chars().count() > MAX_STRING_LENGTH => {
                println!("{}{}: {}", indent, style(key).dim(), style("...").dim());
            }
            Value::String(s) => println!("{}{}: {}", indent, style(key).dim(), style(s).green()),
            other => println!("{}{}: {}", indent, style(key).dim(), style(other).blue()),
        }
    }
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, content: &str) {
        print_markdown(content, self.theme.bat_theme());
        println!();
        let _ = io::stdout().flush();
    }

    fn render_error(&mut self, error: &str) {
        println!("{} {}", style("error:").red().bold(), error);
        println!();
    }

    fn render_tool_call(&mut self, call: &FunctionCall) {
        println!();
        println!(
            "─── {} | {} ──────────────────────────",
            style(&call.name),
            style("tool").magenta().dim()
        );
        print_params(&call.arguments, 0);
        println!();
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner.start("awaiting reply...");
    }

    fn hide_busy(&self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        let message_text = match self.editor.readline(PROMPT) {
            Ok(text) => text,
            Err(e) => {
                match e {
                    ReadlineError::Interrupted | ReadlineError::Eof => (),
                    _ => eprintln!("Input error: {}", e),
                }
                return Ok(Input::control(InputType::Exit));
            }
        };

        let message_text = message_text.trim();
        if !message_text.is_empty() {
            self.editor.add_history_entry(message_text)?;
        }

        Ok(builtin_input(message_text).unwrap_or_else(|| Input::message(message_text)))
    }

    fn set_completions(&mut self, documents: Vec<String>, commands: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.update(documents, commands);
        }
    }

    fn close(&self) {
        println!("{}", style("Closing session.").dim());
    }
}
