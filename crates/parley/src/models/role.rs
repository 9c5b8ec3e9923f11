use serde::{Deserialize, Serialize};

/// The author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Map a role name as reported by a system. Only "user" is a user, everything else
    /// is attributed to the model.
    pub fn from_prompt_role(role: &str) -> Self {
        if role == "user" {
            Role::User
        } else {
            Role::Model
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}
