use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Completes `@` document mentions and `/` commands
#[derive(Default)]
pub struct ParleyHelper {
    documents: Vec<String>,
    commands: Vec<String>,
}

impl ParleyHelper {
    pub fn update(&mut self, documents: Vec<String>, commands: Vec<String>) {
        self.documents = documents;
        self.commands = commands;
    }
}

/// Completion candidates for the text before the cursor, with the position they replace from.
///
/// After an `@` the text since the last marker is matched case-insensitively against
/// document ids. A line starting with `/` is matched against command names.
pub fn complete_line(
    line: &str,
    documents: &[String],
    commands: &[String],
) -> (usize, Vec<Pair>) {
    if let Some(marker) = line.rfind('@') {
        let start = marker + 1;
        let prefix = line[start..].to_lowercase();
        let candidates = documents
            .iter()
            .filter(|id| id.to_lowercase().starts_with(&prefix))
            .map(|id| Pair {
                display: id.clone(),
                replacement: id.clone(),
            })
            .collect();
        return (start, candidates);
    }

    if let Some(prefix) = line.strip_prefix('/') {
        let candidates = commands
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| Pair {
                display: format!("/{}", name),
                replacement: name.clone(),
            })
            .collect();
        return (1, candidates);
    }

    (line.len(), Vec::new())
}

impl Completer for ParleyHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(complete_line(&line[..pos], &self.documents, &self.commands))
    }
}

impl Hinter for ParleyHelper {
    type Hint = String;
}

impl Highlighter for ParleyHelper {}

impl Validator for ParleyHelper {}

impl Helper for ParleyHelper {}
