pub mod agent;
pub mod commands;
pub mod conversation;
pub mod dispatch;
pub mod documents;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod registry;
pub mod resolver;
pub mod systems;
