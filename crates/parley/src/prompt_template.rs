use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// Built-in prompt templates, keyed by the prompt name they render
const TEMPLATES: [(&str, &str); 2] = [
    ("format", include_str!("prompts/format.md")),
    ("summarize", include_str!("prompts/summarize.md")),
];

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render one of the built-in templates by name
pub fn render_builtin<T: Serialize>(name: &str, context_data: &T) -> Result<String, TeraError> {
    let template = builtin(name)
        .ok_or_else(|| TeraError::msg(format!("Template '{}' not found", name)))?;
    load_prompt(template, context_data)
}

/// The source of a built-in template
pub fn builtin(name: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(template_name, _)| *template_name == name)
        .map(|(_, template)| *template)
}
