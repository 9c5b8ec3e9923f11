//! These models represent the objects passed around by the agent
//!
//! There are several related formats we need to interact with:
//! - gemini contents/parts, sent from the agent to the LLM
//! - system requests, sent from the agent to the systems providing tools, prompts and resources
//! - prompt templates, returned by systems and replayed into the conversation
//!
//! We always immediately convert those formats into the internal structs using to/from
//! helpers, so the agent only ever matches on the closed variants defined here.
pub mod content;
pub mod message;
pub mod prompt;
pub mod role;
pub mod tool;
