//! Configuration management for the avatar agent
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (AVATAR_AGENT__ prefix)
//!
//! Credentials additionally fall back to the conventional `GEMINI_API_KEY`
//! and `ELEVEN_LABS_API_KEY` variables.

pub mod prompts;
pub mod settings;

pub use prompts::{CannedReply, PromptLibrary, SystemInstruction};
pub use settings::{
    load_settings, ModelSettings, ObservabilityConfig, PipelineSettings, RuntimeEnvironment,
    ServerConfig, Settings, SpeechSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
