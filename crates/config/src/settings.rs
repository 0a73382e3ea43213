//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - permissive CORS, human-readable logs
    #[default]
    Development,
    /// Production mode - explicit CORS origins expected
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
///
/// Built once at process start and passed by reference into the backend
/// constructors; pipeline logic never reads configuration ambiently.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Language model vendor configuration
    #[serde(default)]
    pub model: ModelSettings,

    /// Speech synthesis vendor configuration
    #[serde(default)]
    pub speech: SpeechSettings,

    /// Response pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Whether both vendor credentials are configured.
    ///
    /// When this is false the pipeline short-circuits to the canned
    /// configuration-error reply without touching the network.
    pub fn credentials_present(&self) -> bool {
        self.model.has_api_key() && self.speech.has_api_key()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.model.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.max_retries".to_string(),
                message: "At least one attempt is required".to_string(),
            });
        }

        if self.speech.voice_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "speech.voice_id".to_string(),
                message: "Voice id cannot be empty".to_string(),
            });
        }

        if self.pipeline.response_deadline_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.response_deadline_secs".to_string(),
                message: "Deadline must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production()
            && self.server.cors_enabled
            && self.server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Language model vendor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// API key; falls back to the GEMINI_API_KEY environment variable
    #[serde(default = "default_model_api_key")]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model_name")]
    pub model: String,

    /// API endpoint
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,

    /// Maximum attempts for one generation call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base in milliseconds; the wait before attempt n+1 is n * base
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_model_api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())
}
fn default_model_name() -> String {
    "gemini-1.5-pro".to_string()
}
fn default_model_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_model_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    1000
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_key: default_model_api_key(),
            model: default_model_name(),
            endpoint: default_model_endpoint(),
            timeout_seconds: default_model_timeout(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl ModelSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Speech synthesis vendor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// API key; falls back to the ELEVEN_LABS_API_KEY environment variable
    #[serde(default = "default_speech_api_key")]
    pub api_key: Option<String>,

    /// Fixed voice identity used for every segment
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// API endpoint
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,

    /// Directory where audio artifacts are written
    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,

    /// Request timeout in seconds
    #[serde(default = "default_speech_timeout")]
    pub timeout_seconds: u64,
}

fn default_speech_api_key() -> Option<String> {
    std::env::var("ELEVEN_LABS_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}
fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}
fn default_speech_endpoint() -> String {
    "https://api.elevenlabs.io".to_string()
}
fn default_audio_dir() -> String {
    "audios".to_string()
}
fn default_speech_timeout() -> u64 {
    30
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            api_key: default_speech_api_key(),
            voice_id: default_voice_id(),
            endpoint: default_speech_endpoint(),
            audio_dir: default_audio_dir(),
            timeout_seconds: default_speech_timeout(),
        }
    }
}

impl SpeechSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Response pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Overall deadline for the generate/parse/synthesize path in seconds
    #[serde(default = "default_response_deadline")]
    pub response_deadline_secs: u64,
}

fn default_response_deadline() -> u64 {
    30
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            response_deadline_secs: default_response_deadline(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (AVATAR_AGENT__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("AVATAR_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
