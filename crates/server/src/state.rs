//! Application state
//!
//! Wires the vendor backends and the response pipeline from settings once at
//! startup. Handlers share this state; no per-request construction.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use avatar_agent_config::{PromptLibrary, Settings};
use avatar_agent_core::{LanguageModel, SpeechSynthesizer};
use avatar_agent_llm::{GeminiBackend, GeminiConfig};
use avatar_agent_pipeline::{
    ElevenLabsConfig, ElevenLabsSynthesizer, PipelineConfig, ResponsePipeline,
};

use crate::ServerError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub prompts: Arc<PromptLibrary>,
    pub pipeline: Arc<ResponsePipeline>,
    pub llm: Arc<dyn LanguageModel>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    /// Build backends and pipeline from settings.
    pub fn new(settings: Settings) -> Result<Self, ServerError> {
        let prompts = PromptLibrary::default();

        let model_config = GeminiConfig {
            model: settings.model.model.clone(),
            endpoint: settings.model.endpoint.clone(),
            api_key: settings.model.api_key.clone().unwrap_or_default(),
            timeout: Duration::from_secs(settings.model.timeout_seconds),
            max_retries: settings.model.max_retries,
            backoff_base: Duration::from_millis(settings.model.backoff_ms),
            ..Default::default()
        };
        let llm: Arc<dyn LanguageModel> = Arc::new(
            GeminiBackend::new(model_config).map_err(|e| ServerError::Internal(e.to_string()))?,
        );

        let speech_config = ElevenLabsConfig {
            api_key: settings.speech.api_key.clone().unwrap_or_default(),
            voice_id: settings.speech.voice_id.clone(),
            endpoint: settings.speech.endpoint.clone(),
            timeout: Duration::from_secs(settings.speech.timeout_seconds),
            audio_dir: PathBuf::from(&settings.speech.audio_dir),
            ..Default::default()
        };
        let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(
            ElevenLabsSynthesizer::new(speech_config)
                .map_err(|e| ServerError::Internal(e.to_string()))?,
        );

        let pipeline_config = PipelineConfig {
            response_deadline: Duration::from_secs(settings.pipeline.response_deadline_secs),
            credentials_present: settings.credentials_present(),
        };
        let pipeline = Arc::new(ResponsePipeline::new(
            llm.clone(),
            synthesizer.clone(),
            prompts.clone(),
            pipeline_config,
        ));

        Ok(Self {
            config: Arc::new(settings),
            prompts: Arc::new(prompts),
            pipeline,
            llm,
            synthesizer,
        })
    }
}
