//! ElevenLabs speech synthesis adapter
//!
//! Posts segment text to the vendor, writes the returned audio to the
//! artifact directory as `message_{index}.mp3`, verifies the artifact
//! exists, and returns its bytes. Transport encoding (base64) is the HTTP
//! layer's concern.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use avatar_agent_core::{SpeechSynthesizer, SynthesisError, VoiceInfo};

/// ElevenLabs adapter configuration
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API key
    pub api_key: String,
    /// Fixed voice identity used for every segment
    pub voice_id: String,
    /// API endpoint
    pub endpoint: String,
    /// Synthesis model
    pub model_id: String,
    /// Voice stability setting
    pub stability: f32,
    /// Voice similarity boost setting
    pub similarity_boost: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Directory where audio artifacts are written
    pub audio_dir: PathBuf,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            endpoint: "https://api.elevenlabs.io".to_string(),
            model_id: "eleven_monolingual_v1".to_string(),
            stability: 0.5,
            similarity_boost: 0.5,
            timeout: Duration::from_secs(30),
            audio_dir: PathBuf::from("audios"),
        }
    }
}

/// ElevenLabs text-to-speech backend
pub struct ElevenLabsSynthesizer {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsSynthesizer {
    /// Create a new ElevenLabs synthesizer
    pub fn new(config: ElevenLabsConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                SynthesisError::VendorRejected(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    fn artifact_path(&self, segment_index: usize) -> PathBuf {
        self.config
            .audio_dir
            .join(format!("message_{}.mp3", segment_index))
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        segment_index: usize,
    ) -> Result<Vec<u8>, SynthesisError> {
        tracing::debug!(segment_index, chars = text.len(), "synthesizing segment");

        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.endpoint, self.config.voice_id
        );
        let request = TtsRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SynthesisError::VendorRejected(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::VendorRejected(format!(
                "{}: {}",
                status, body
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::VendorRejected(format!("truncated audio body: {}", e)))?;

        let path = self.artifact_path(segment_index);
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| SynthesisError::ArtifactMissing(format!("{}: {}", path.display(), e)))?;

        read_artifact(&path).await
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let url = format!("{}/v1/voices", self.config.endpoint);
        let response = self
            .client
            .get(&url)
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| SynthesisError::VendorRejected(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::VendorRejected(format!(
                "{}: {}",
                status, body
            )));
        }

        let voices: VoicesResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::VendorRejected(format!("undecodable voice list: {}", e)))?;

        Ok(voices.voices.into_iter().map(VoiceInfo::from).collect())
    }

    fn voice_id(&self) -> &str {
        &self.config.voice_id
    }
}

/// Verify the artifact landed on disk, then hand back its bytes.
async fn read_artifact(path: &Path) -> Result<Vec<u8>, SynthesisError> {
    if tokio::fs::metadata(path).await.is_err() {
        return Err(SynthesisError::ArtifactMissing(path.display().to_string()));
    }

    tokio::fs::read(path)
        .await
        .map_err(|e| SynthesisError::ArtifactMissing(format!("{}: {}", path.display(), e)))
}

// ElevenLabs API types

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceWire>,
}

#[derive(Debug, Deserialize)]
struct VoiceWire {
    voice_id: String,
    name: String,
    #[serde(default)]
    category: Option<String>,
}

impl From<VoiceWire> for VoiceInfo {
    fn from(wire: VoiceWire) -> Self {
        Self {
            voice_id: wire.voice_id,
            name: wire.name,
            category: wire.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};

    const AUDIO_BYTES: &[u8] = b"ID3\x03mock mp3 payload";

    async fn spawn_vendor(ok: bool) -> String {
        let app = axum::Router::new()
            .route(
                "/v1/text-to-speech/:voice_id",
                post(move || async move {
                    if ok {
                        (StatusCode::OK, AUDIO_BYTES.to_vec())
                    } else {
                        (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
                    }
                }),
            )
            .route(
                "/v1/voices",
                get(|| async {
                    (
                        StatusCode::OK,
                        r#"{"voices":[{"voice_id":"21m00Tcm4TlvDq8ikWAM","name":"Rachel","category":"premade"}]}"#,
                    )
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn test_config(endpoint: String, audio_dir: PathBuf) -> ElevenLabsConfig {
        ElevenLabsConfig {
            api_key: "test-key".to_string(),
            endpoint,
            audio_dir,
            ..Default::default()
        }
    }

    #[test]
    fn test_artifact_naming() {
        let synth = ElevenLabsSynthesizer::new(ElevenLabsConfig::default()).unwrap();
        assert_eq!(
            synth.artifact_path(2),
            PathBuf::from("audios").join("message_2.mp3")
        );
    }

    #[tokio::test]
    async fn test_synthesize_writes_and_returns_artifact_bytes() {
        let endpoint = spawn_vendor(true).await;
        let dir = tempfile::tempdir().unwrap();
        let synth =
            ElevenLabsSynthesizer::new(test_config(endpoint, dir.path().to_path_buf())).unwrap();

        let audio = synth.synthesize("hello there", 1).await.unwrap();

        assert_eq!(audio, AUDIO_BYTES);
        let on_disk = std::fs::read(dir.path().join("message_1.mp3")).unwrap();
        assert_eq!(on_disk, AUDIO_BYTES);
    }

    #[tokio::test]
    async fn test_vendor_error_is_rejected() {
        let endpoint = spawn_vendor(false).await;
        let dir = tempfile::tempdir().unwrap();
        let synth =
            ElevenLabsSynthesizer::new(test_config(endpoint, dir.path().to_path_buf())).unwrap();

        let err = synth.synthesize("hello", 0).await.unwrap_err();

        assert!(matches!(err, SynthesisError::VendorRejected(_)));
        assert!(!dir.path().join("message_0.mp3").exists());
    }

    #[tokio::test]
    async fn test_unwritable_artifact_dir_is_artifact_missing() {
        let endpoint = spawn_vendor(true).await;
        let missing = PathBuf::from("/nonexistent/avatar-agent-audios");
        let synth = ElevenLabsSynthesizer::new(test_config(endpoint, missing)).unwrap();

        let err = synth.synthesize("hello", 0).await.unwrap_err();
        assert!(matches!(err, SynthesisError::ArtifactMissing(_)));
    }

    #[tokio::test]
    async fn test_list_voices() {
        let endpoint = spawn_vendor(true).await;
        let dir = tempfile::tempdir().unwrap();
        let synth =
            ElevenLabsSynthesizer::new(test_config(endpoint, dir.path().to_path_buf())).unwrap();

        let voices = synth.list_voices().await.unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].name, "Rachel");
        assert_eq!(voices[0].category.as_deref(), Some("premade"));
    }
}
