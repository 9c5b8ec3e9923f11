use thiserror::Error;

/// Prefix shared by every environment variable the CLI reads
pub const ENV_PREFIX: &str = "GEMINI";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },
    #[error("Environment variable {env_var} is set but empty")]
    EmptyValue { env_var: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// The environment variable a settings field is read from
pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.to_uppercase())
}
