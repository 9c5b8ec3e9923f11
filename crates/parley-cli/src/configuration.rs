use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use parley::providers::configs::{GeminiProviderConfig, GEMINI_HOST, GEMINI_TEMPERATURE};
use serde::Deserialize;
use std::fmt;

/// Settings for the model endpoint, read from `GEMINI_*` environment variables
#[derive(Deserialize)]
pub struct Settings {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("temperature", f64::from(default_temperature()))?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            match &err {
                config::ConfigError::NotFound(field) => ConfigError::MissingEnvVar {
                    env_var: to_env_var(field),
                },
                _ => ConfigError::Other(err),
            }
        })?;

        required("model", &settings.model)?;
        required("api_key", &settings.api_key)?;
        Ok(settings)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or_default()
    }

    /// Convert to the provider configuration
    pub fn into_provider_config(self) -> GeminiProviderConfig {
        GeminiProviderConfig {
            host: self.host,
            api_key: self.api_key.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn required(field: &str, value: &Option<String>) -> Result<(), ConfigError> {
    match value {
        None => Err(ConfigError::MissingEnvVar {
            env_var: to_env_var(field),
        }),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue {
            env_var: to_env_var(field),
        }),
        Some(_) => Ok(()),
    }
}

fn default_host() -> String {
    GEMINI_HOST.to_string()
}

fn default_temperature() -> f32 {
    GEMINI_TEMPERATURE
}
